//! Asset entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use assethub_core::result::AppResult;
use assethub_core::types::{AssetId, FolderId, ProjectId};

use crate::data_url;

/// An uploaded image stored inline as a `data:` URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Asset {
    /// Unique asset identifier.
    pub id: AssetId,
    /// Owning project (absent in the local variant).
    pub project_id: Option<ProjectId>,
    /// Containing folder.
    pub folder_id: Option<FolderId>,
    /// File name including extension.
    pub name: String,
    /// MIME type.
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub mime_type: String,
    /// Size of the original file in bytes.
    pub size: i64,
    /// Inline `data:` URL.
    pub data: String,
    /// When the asset was uploaded.
    pub upload_date: DateTime<Utc>,
}

impl Asset {
    /// Decode the inline payload back into the uploaded bytes.
    pub fn decode_bytes(&self) -> AppResult<Vec<u8>> {
        data_url::parse(&self.data).map(|url| url.bytes)
    }

    /// Bytes this asset occupies in a serialized blob store.
    pub fn encoded_len(&self) -> u64 {
        self.data.len() as u64
    }

    /// Whether this asset sits at the given location.
    pub fn is_at(&self, project_id: Option<ProjectId>, folder_id: Option<FolderId>) -> bool {
        self.project_id == project_id && self.folder_id == folder_id
    }
}

/// Data required to create a new asset record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAsset {
    /// Target project.
    pub project_id: Option<ProjectId>,
    /// Target folder.
    pub folder_id: Option<FolderId>,
    /// File name.
    pub name: String,
    /// MIME type.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Original size in bytes.
    pub size: i64,
    /// Inline `data:` URL.
    pub data: String,
}

impl NewAsset {
    /// Encode file bytes into a create payload.
    pub fn from_bytes(
        project_id: Option<ProjectId>,
        folder_id: Option<FolderId>,
        name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Self {
        Self {
            project_id,
            folder_id,
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size: bytes.len() as i64,
            data: data_url::encode(mime_type, bytes),
        }
    }

    /// Materialize the record with a fresh id and upload timestamp.
    pub fn into_asset(self) -> Asset {
        Asset {
            id: AssetId::new(),
            project_id: self.project_id,
            folder_id: self.folder_id,
            name: self.name,
            mime_type: self.mime_type,
            size: self.size,
            data: self.data,
            upload_date: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_survive_encoding() {
        let bytes = b"\x89PNG\r\n\x1a\nfake".to_vec();
        let asset = NewAsset::from_bytes(None, None, "logo.png", "image/png", &bytes).into_asset();
        assert_eq!(asset.size, bytes.len() as i64);
        assert_eq!(asset.decode_bytes().expect("decode"), bytes);
        assert_eq!(asset.encoded_len(), asset.data.len() as u64);
    }

    #[test]
    fn test_serializes_mime_as_type() {
        let asset = NewAsset::from_bytes(None, None, "a.gif", "image/gif", b"GIF89a").into_asset();
        let json = serde_json::to_value(&asset).expect("serialize");
        assert_eq!(json["type"], "image/gif");
        assert!(json.get("mime_type").is_none());
    }
}
