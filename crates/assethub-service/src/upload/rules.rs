//! Per-file upload validation.

use serde::{Deserialize, Serialize};

use assethub_core::config::UploadConfig;

use crate::format::format_limit;

/// A file offered for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Why a file was turned away before any write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    UnsupportedType { name: String },
    TooLarge { name: String, limit_bytes: u64 },
}

impl Rejection {
    pub fn name(&self) -> &str {
        match self {
            Self::UnsupportedType { name } | Self::TooLarge { name, .. } => name,
        }
    }

    /// Message shown to the user.
    pub fn message(&self) -> String {
        match self {
            Self::UnsupportedType { name } => format!("\"{name}\" is not a supported format"),
            Self::TooLarge { name, limit_bytes } => {
                format!("\"{name}\" exceeds {} limit", format_limit(*limit_bytes))
            }
        }
    }
}

/// Accepted MIME types and the size ceiling.
#[derive(Debug, Clone)]
pub struct UploadRules {
    max_file_size_bytes: u64,
    allowed_types: Vec<String>,
}

impl UploadRules {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            max_file_size_bytes: config.max_file_size_bytes,
            allowed_types: config.allowed_types.clone(),
        }
    }

    pub fn check(&self, file: &CandidateFile) -> Result<(), Rejection> {
        if !self.allowed_types.iter().any(|t| t == &file.mime_type) {
            return Err(Rejection::UnsupportedType {
                name: file.name.clone(),
            });
        }
        if file.size() > self.max_file_size_bytes {
            return Err(Rejection::TooLarge {
                name: file.name.clone(),
                limit_bytes: self.max_file_size_bytes,
            });
        }
        Ok(())
    }

    /// Split a batch into accepted files (in order) and rejections.
    pub fn partition(&self, files: Vec<CandidateFile>) -> (Vec<CandidateFile>, Vec<Rejection>) {
        let mut accepted = Vec::with_capacity(files.len());
        let mut rejected = Vec::new();
        for file in files {
            match self.check(&file) {
                Ok(()) => accepted.push(file),
                Err(rejection) => rejected.push(rejection),
            }
        }
        (accepted, rejected)
    }
}

impl Default for UploadRules {
    fn default() -> Self {
        Self::new(&UploadConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unsupported_type() {
        let rules = UploadRules::default();
        let file = CandidateFile::new("notes.pdf", "application/pdf", vec![1, 2, 3]);
        let rejection = rules.check(&file).unwrap_err();
        assert_eq!(rejection.message(), "\"notes.pdf\" is not a supported format");
    }

    #[test]
    fn test_size_ceiling_is_inclusive() {
        let rules = UploadRules::default();
        let at_limit = CandidateFile::new("a.png", "image/png", vec![0; 2 * 1024 * 1024]);
        assert!(rules.check(&at_limit).is_ok());

        let over = CandidateFile::new("b.png", "image/png", vec![0; 2 * 1024 * 1024 + 1]);
        assert_eq!(
            rules.check(&over).unwrap_err().message(),
            "\"b.png\" exceeds 2MB limit"
        );
    }

    #[test]
    fn test_partition_keeps_order() {
        let rules = UploadRules::default();
        let (accepted, rejected) = rules.partition(vec![
            CandidateFile::new("one.webp", "image/webp", vec![1]),
            CandidateFile::new("bad.bmp", "image/bmp", vec![1]),
            CandidateFile::new("two.svg", "image/svg+xml", b"<svg/>".to_vec()),
        ]);
        let names: Vec<&str> = accepted.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["one.webp", "two.svg"]);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].name(), "bad.bmp");
    }
}
