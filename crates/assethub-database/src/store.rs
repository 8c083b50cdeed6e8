//! PostgreSQL-backed [`HostedStore`].

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};
use uuid::Uuid;

use assethub_core::config::FolderDeletePolicy;
use assethub_core::error::{AppError, ErrorKind};
use assethub_core::events::Table;
use assethub_core::result::AppResult;
use assethub_core::types::{AssetId, AssetQuery, FolderId, FolderScope, ProjectId};
use assethub_entity::{Asset, Folder, NewAsset, NewFolder, NewProject, Project};
use assethub_store::{ChangeFeed, ChangeStream, HostedStore};

const ASSET_COLUMNS: &str = "id, project_id, folder_id, name, type, size, data, upload_date";

/// Hosted store over the `projects`, `folders`, and `assets` tables.
///
/// Change events arrive through the LISTEN/NOTIFY bridge started by
/// [`PgStore::start_listener`], so mutations made by other processes are
/// observed too.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
    feed: Arc<ChangeFeed>,
    folder_policy: FolderDeletePolicy,
}

impl PgStore {
    /// Create a store over an already migrated pool.
    pub fn new(pool: PgPool, folder_policy: FolderDeletePolicy, channel_buffer_size: usize) -> Self {
        Self {
            pool,
            feed: Arc::new(ChangeFeed::new(channel_buffer_size)),
            folder_policy,
        }
    }

    /// The feed that the notification bridge publishes into.
    pub fn feed(&self) -> Arc<ChangeFeed> {
        Arc::clone(&self.feed)
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn folder_project(&self, folder_id: FolderId) -> AppResult<ProjectId> {
        sqlx::query_scalar::<_, ProjectId>("SELECT project_id FROM folders WHERE id = $1")
            .bind(folder_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))
    }
}

fn db_error(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::not_found(format!("{message}: referenced row does not exist"))
        }
        _ => AppError::with_source(ErrorKind::Database, message, e),
    }
}

#[async_trait]
impl HostedStore for PgStore {
    fn provider_type(&self) -> &str {
        "postgres"
    }

    async fn list_projects(&self) -> AppResult<Vec<Project>> {
        sqlx::query_as::<_, Project>(
            "SELECT id, name, description, color, created_at FROM projects \
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list projects"))
    }

    async fn insert_project(&self, data: &NewProject) -> AppResult<Project> {
        let project = sqlx::query_as::<_, Project>(
            "INSERT INTO projects (id, name, description, color) VALUES ($1, $2, $3, $4) \
             RETURNING id, name, description, color, created_at",
        )
        .bind(ProjectId::new())
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.color)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create project"))?;

        info!(project_id = %project.id, name = %project.name, "Project created");
        Ok(project)
    }

    async fn delete_project(&self, id: ProjectId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete project"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Project {id} not found")));
        }
        info!(project_id = %id, "Project deleted");
        Ok(())
    }

    async fn list_folders(&self, project_id: Option<ProjectId>) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT id, project_id, parent_id, name, created_at FROM folders \
             WHERE ($1::uuid IS NULL OR project_id = $1) ORDER BY created_at ASC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list folders"))
    }

    async fn insert_folder(&self, data: &NewFolder) -> AppResult<Folder> {
        if let Some(parent_id) = data.parent_id {
            if self.folder_project(parent_id).await? != data.project_id {
                return Err(AppError::conflict(
                    "Parent folder belongs to a different project",
                ));
            }
        }

        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (id, project_id, parent_id, name) VALUES ($1, $2, $3, $4) \
             RETURNING id, project_id, parent_id, name, created_at",
        )
        .bind(FolderId::new())
        .bind(data.project_id)
        .bind(data.parent_id)
        .bind(&data.name)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create folder"))
    }

    async fn delete_folder(&self, id: FolderId) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        if self.folder_policy == FolderDeletePolicy::Detach {
            let detached = sqlx::query(
                "WITH RECURSIVE tree AS ( \
                    SELECT id FROM folders WHERE id = $1 \
                    UNION ALL \
                    SELECT f.id FROM folders f INNER JOIN tree t ON f.parent_id = t.id \
                 ) UPDATE assets SET folder_id = NULL WHERE folder_id IN (SELECT id FROM tree)",
            )
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to detach folder assets"))?;
            debug!(folder_id = %id, rows = detached.rows_affected(), "Detached folder assets");
        }

        let result = sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete folder"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Folder {id} not found")));
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit folder delete"))?;
        info!(folder_id = %id, policy = ?self.folder_policy, "Folder deleted");
        Ok(())
    }

    async fn list_assets(&self, query: &AssetQuery) -> AppResult<Vec<Asset>> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {ASSET_COLUMNS} FROM assets WHERE TRUE"));

        if let Some(project_id) = query.project_id {
            qb.push(" AND project_id = ").push_bind(project_id);
        }
        match query.folder {
            FolderScope::Any => {}
            FolderScope::Unfiled => {
                qb.push(" AND folder_id IS NULL");
            }
            FolderScope::In(folder_id) => {
                qb.push(" AND folder_id = ").push_bind(folder_id);
            }
        }
        if let Some(name) = &query.name {
            qb.push(" AND name = ").push_bind(name.clone());
        }

        let direction = query.direction.as_sql();
        qb.push(format!(
            " ORDER BY upload_date {direction}, seq {direction}"
        ));
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ").push_bind(i64::from(limit));
        }

        qb.build_query_as::<Asset>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list assets"))
    }

    async fn insert_asset(&self, data: &NewAsset) -> AppResult<Asset> {
        if let Some(folder_id) = data.folder_id {
            if Some(self.folder_project(folder_id).await?) != data.project_id {
                return Err(AppError::conflict("Folder belongs to a different project"));
            }
        }

        let asset = sqlx::query_as::<_, Asset>(&format!(
            "INSERT INTO assets (id, project_id, folder_id, name, type, size, data) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {ASSET_COLUMNS}"
        ))
        .bind(AssetId::new())
        .bind(data.project_id)
        .bind(data.folder_id)
        .bind(&data.name)
        .bind(&data.mime_type)
        .bind(data.size)
        .bind(&data.data)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to store asset"))?;

        debug!(asset_id = %asset.id, name = %asset.name, size = asset.size, "Asset stored");
        Ok(asset)
    }

    async fn delete_asset(&self, id: AssetId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete asset"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Asset {id} not found")));
        }
        Ok(())
    }

    async fn delete_assets(&self, ids: &[AssetId]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let ids: Vec<Uuid> = ids.iter().map(|id| id.into_uuid()).collect();
        let result = sqlx::query("DELETE FROM assets WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete assets"))?;
        Ok(result.rows_affected())
    }

    async fn count_assets(&self, project_id: Option<ProjectId>) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM assets WHERE ($1::uuid IS NULL OR project_id = $1)",
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count assets"))?;
        Ok(count.max(0) as u64)
    }

    async fn total_asset_bytes(&self) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(size), 0)::BIGINT FROM assets")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to sum asset sizes"))?;
        Ok(total.max(0) as u64)
    }

    async fn subscribe(&self, table: Table) -> AppResult<ChangeStream> {
        Ok(self.feed.subscribe(table).await)
    }
}
