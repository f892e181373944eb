//! Foundation types for rowdelta.
//!
//! This crate defines the contract every item and section must satisfy before
//! it can be diffed: a stable identity and a content comparison producing a
//! tri-state verdict. Every other rowdelta crate depends on `rowdelta-types`.
//!
//! # Key Types
//!
//! - [`ComparisonLevel`] — Verdict of comparing two items (same / different / changed)
//! - [`ComparisonChanges`] — Field-level change set carried by a `Changed` verdict
//! - [`ComparableItem`] — Identity + content comparison capability
//! - [`ComparableSection`] — A comparable item that owns an ordered list of sub-items

pub mod comparison;
pub mod item;

pub use comparison::{ComparisonChanges, ComparisonLevel};
pub use item::{identity_hash_of, ComparableItem, ComparableSection};
