use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrdError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Attachment not found: {0}")]
    AttachmentNotFound(String),

    #[error("Storage quota exceeded: {needed} bytes needed, {available} bytes available")]
    QuotaExceeded { needed: u64, available: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Restore(#[from] RestoreError),

    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Api Error: {0}")]
    Api(String),
}

impl PrdError {
    /// True when the backing medium refused a write for lack of space.
    pub fn is_storage_full(&self) -> bool {
        matches!(
            self,
            PrdError::QuotaExceeded { .. } | PrdError::Save(SaveError::StorageFull)
        )
    }
}

pub type Result<T> = std::result::Result<T, PrdError>;

/// Failure of a write against the backing medium.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    #[error("Document has no id")]
    MissingId,

    #[error("Storage quota exceeded")]
    StorageFull,

    #[error("Save failed: {0}")]
    Failed(String),
}

impl SaveError {
    pub fn code(&self) -> &'static str {
        match self {
            SaveError::StorageFull => "STORAGE_FULL",
            SaveError::MissingId | SaveError::Failed(_) => "SAVE_ERROR",
        }
    }
}

impl From<PrdError> for SaveError {
    fn from(err: PrdError) -> Self {
        match err {
            PrdError::QuotaExceeded { .. } => SaveError::StorageFull,
            PrdError::Save(inner) => inner,
            other => SaveError::Failed(other.to_string()),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid sections structure")]
    InvalidSections,

    #[error("Document is not a JSON object")]
    NotAnObject,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        "VALIDATION_ERROR"
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("Invalid import data: {0}")]
    Malformed(String),

    #[error(transparent)]
    Save(#[from] SaveError),
}

impl ImportError {
    pub fn code(&self) -> &'static str {
        match self {
            ImportError::Malformed(_) => "IMPORT_MALFORMED",
            ImportError::Save(inner) => inner.code(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RestoreError {
    #[error("Invalid backup data: {0}")]
    Invalid(String),

    #[error("Failed to restore key {key}: {message}")]
    Write { key: String, message: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttachmentError {
    #[error("{name} exceeds {limit_label} limit")]
    TooLarge {
        name: String,
        size: u64,
        limit_label: String,
    },

    #[error("{name} already uploaded")]
    Duplicate { name: String },

    #[error("Failed to process {name}: {message}")]
    Read { name: String, message: String },
}

impl AttachmentError {
    pub fn code(&self) -> &'static str {
        match self {
            AttachmentError::TooLarge { .. } | AttachmentError::Duplicate { .. } => {
                "DUPLICATE_OR_OVERSIZE_FILE"
            }
            AttachmentError::Read { .. } => "ATTACHMENT_READ_ERROR",
        }
    }

    pub fn file_name(&self) -> &str {
        match self {
            AttachmentError::TooLarge { name, .. }
            | AttachmentError::Duplicate { name }
            | AttachmentError::Read { name, .. } => name,
        }
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("{0} library not available in this build")]
    LibraryUnavailable(&'static str),

    #[error("Failed to render {format}: {message}")]
    Render {
        format: &'static str,
        message: String,
    },

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    pub fn code(&self) -> &'static str {
        match self {
            ExportError::LibraryUnavailable(_) => "EXPORT_LIBRARY_UNAVAILABLE",
            ExportError::Render { .. } | ExportError::Io(_) => "EXPORT_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_errors_map_to_storage_full() {
        let err = PrdError::QuotaExceeded {
            needed: 10,
            available: 2,
        };
        assert!(err.is_storage_full());
        let save: SaveError = err.into();
        assert_eq!(save, SaveError::StorageFull);
        assert_eq!(save.code(), "STORAGE_FULL");
    }

    #[test]
    fn test_other_errors_map_to_save_error() {
        let save: SaveError = PrdError::Store("disk on fire".into()).into();
        assert_eq!(save.code(), "SAVE_ERROR");
        assert!(save.to_string().contains("disk on fire"));
    }

    #[test]
    fn test_attachment_errors_share_rejection_code() {
        let big = AttachmentError::TooLarge {
            name: "a.bin".into(),
            size: 1,
            limit_label: "5 MB".into(),
        };
        let dup = AttachmentError::Duplicate {
            name: "a.bin".into(),
        };
        assert_eq!(big.code(), dup.code());
        assert_eq!(big.to_string(), "a.bin exceeds 5 MB limit");
        assert_eq!(dup.to_string(), "a.bin already uploaded");
    }
}
