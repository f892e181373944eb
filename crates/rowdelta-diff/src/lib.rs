//! Diff engine for rowdelta.
//!
//! Reconciles two ordered snapshots of comparable items and produces an edit
//! script: insertions, deletions, in-place reloads and moves.
//!
//! # Key Types
//!
//! - [`diff`] / [`try_diff`] -- Item-level diff of two ordered lists
//! - [`ComparisonResult`] -- Index sets and item lists produced by one diff
//! - [`diff_sections`] / [`SectionDiff`] -- Per-section item diffs plus the section-level diff
//! - [`DeltaMatrix`] -- Sparse (old, new) scratch table used during matching

pub mod error;
pub mod list_diff;
pub mod matrix;
pub mod result;
pub mod section_diff;

pub use error::{DiffError, DiffResult};
pub use list_diff::{diff, try_diff};
pub use matrix::DeltaMatrix;
pub use result::{ComparisonResult, IndexMap};
pub use section_diff::{diff_sections, SectionDiff};
