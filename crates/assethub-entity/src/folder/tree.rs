//! Folder tree index for navigation and cascade queries.

use std::collections::{HashMap, HashSet, VecDeque};

use assethub_core::types::{FolderId, ProjectId};

use super::model::Folder;

/// An owned index over a set of folders.
///
/// Sibling order is the order folders were supplied in, which for store
/// listings is creation order.
#[derive(Debug, Clone, Default)]
pub struct FolderTree {
    folders: HashMap<FolderId, Folder>,
    children: HashMap<(ProjectId, Option<FolderId>), Vec<FolderId>>,
}

impl FolderTree {
    /// Build an index from folders in creation order.
    pub fn new<'a>(folders: impl IntoIterator<Item = &'a Folder>) -> Self {
        let mut tree = Self::default();
        for folder in folders {
            tree.children
                .entry((folder.project_id, folder.parent_id))
                .or_default()
                .push(folder.id);
            tree.folders.insert(folder.id, folder.clone());
        }
        tree
    }

    /// Number of indexed folders.
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Look up a folder.
    pub fn get(&self, id: FolderId) -> Option<&Folder> {
        self.folders.get(&id)
    }

    /// Direct children of `parent` in a project (`None` lists root folders).
    pub fn children(&self, project_id: ProjectId, parent: Option<FolderId>) -> Vec<&Folder> {
        self.children
            .get(&(project_id, parent))
            .map(|ids| ids.iter().filter_map(|id| self.folders.get(id)).collect())
            .unwrap_or_default()
    }

    /// Whether the folder has at least one child folder.
    pub fn has_children(&self, id: FolderId) -> bool {
        self.folders.get(&id).is_some_and(|folder| {
            self.children
                .get(&(folder.project_id, Some(id)))
                .is_some_and(|ids| !ids.is_empty())
        })
    }

    /// Whether the id names a known root folder.
    pub fn is_root(&self, id: FolderId) -> bool {
        self.folders.get(&id).is_some_and(Folder::is_root)
    }

    /// The chain from the root down to `id`, inclusive.
    ///
    /// Stops at a missing parent or a repeated id.
    pub fn ancestry(&self, id: FolderId) -> Vec<&Folder> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if !seen.insert(current) {
                break;
            }
            let Some(folder) = self.folders.get(&current) else {
                break;
            };
            chain.push(folder);
            cursor = folder.parent_id;
        }
        chain.reverse();
        chain
    }

    /// Slash-joined folder names from the root, e.g. `Logos/2024`.
    pub fn path(&self, id: FolderId) -> String {
        self.ancestry(id)
            .iter()
            .map(|folder| folder.name.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Find the folder addressed by a slash-joined path within a project.
    pub fn resolve_path(&self, project_id: ProjectId, path: &str) -> Option<FolderId> {
        let mut parent = None;
        for segment in path.split('/').map(str::trim).filter(|s| !s.is_empty()) {
            let next = self
                .children(project_id, parent)
                .into_iter()
                .find(|folder| folder.name == segment)?;
            parent = Some(next.id);
        }
        parent
    }

    /// The folder and every folder below it, breadth first.
    pub fn subtree(&self, id: FolderId) -> Vec<FolderId> {
        let Some(root) = self.folders.get(&id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([(root.project_id, id)]);
        while let Some((project_id, current)) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            out.push(current);
            if let Some(ids) = self.children.get(&(project_id, Some(current))) {
                queue.extend(ids.iter().map(|child| (project_id, *child)));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn folder(project_id: ProjectId, parent_id: Option<FolderId>, name: &str) -> Folder {
        Folder {
            id: FolderId::new(),
            project_id,
            parent_id,
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_paths_and_resolution() {
        let project = ProjectId::new();
        let logos = folder(project, None, "Logos");
        let year = folder(project, Some(logos.id), "2024");
        let other = folder(ProjectId::new(), None, "Logos");
        let tree = FolderTree::new([&logos, &year, &other]);

        assert_eq!(tree.path(year.id), "Logos/2024");
        assert_eq!(tree.resolve_path(project, "Logos/2024"), Some(year.id));
        assert_eq!(tree.resolve_path(project, "Logos"), Some(logos.id));
        assert_eq!(tree.resolve_path(project, "Logos/2023"), None);
        assert!(tree.is_root(logos.id));
        assert!(!tree.is_root(year.id));
        assert!(tree.has_children(logos.id));
        assert!(!tree.has_children(year.id));
        assert_eq!(tree.children(project, None).len(), 1);
    }

    #[test]
    fn test_subtree_includes_all_descendants() {
        let project = ProjectId::new();
        let a = folder(project, None, "a");
        let b = folder(project, Some(a.id), "b");
        let c = folder(project, Some(b.id), "c");
        let d = folder(project, None, "d");
        let tree = FolderTree::new([&a, &b, &c, &d]);

        let subtree = tree.subtree(a.id);
        assert_eq!(subtree, vec![a.id, b.id, c.id]);
        assert!(tree.subtree(FolderId::new()).is_empty());
    }
}
