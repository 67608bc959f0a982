/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Uniqueness constraints enforced by storage.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UniqueKey {
    StaffId,
    StaffEmail,
    AttendancePerDay,
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Duplicate entry for {0:?}")]
    Duplicate(UniqueKey),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Stored document could not be decoded: {0}")]
    Corrupt(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for RepositoryError {
    fn from(e: serde_json::Error) -> Self {
        RepositoryError::Corrupt(e.to_string())
    }
}
