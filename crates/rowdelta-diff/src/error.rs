//! Error types for the diff crate.

/// Errors that can occur during diff operations.
///
/// The engine is total over well-formed input; the only error is a contract
/// violation by the item model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// Two items matched by identity but `compare_to` classified them as
    /// `Different`.
    #[error(
        "inconsistent comparison: old item {old_index} matched new item {new_index} by identity but compared as different"
    )]
    InconsistentComparison { old_index: usize, new_index: usize },
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
