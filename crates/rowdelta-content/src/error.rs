/// Errors produced by the diff coordinator.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The delivery task has stopped and cannot accept snapshots.
    #[error("delta content is shut down")]
    Shutdown,

    /// The diff worker failed.
    #[error("diff worker failed: {0}")]
    Worker(String),
}

/// Convenience alias used throughout the content crate.
pub type Result<T> = std::result::Result<T, ContentError>;
