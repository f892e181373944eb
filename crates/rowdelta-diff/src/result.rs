//! The output of a single diff invocation.

use std::collections::BTreeMap;

/// Old index → new index.
pub type IndexMap = BTreeMap<usize, usize>;

/// The result of comparing two ordered collections.
///
/// Index sets are ascending. Insertions refer to positions in the new
/// collection, deletions to positions in the old one. Reload and move maps
/// are keyed by old index and only ever contain pairs that passed the
/// identity match.
#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonResult<T> {
    /// New positions with no matching old item.
    pub insertion_indexes: Vec<usize>,
    /// Old positions with no surviving match.
    pub deletion_indexes: Vec<usize>,
    /// New positions claimed by more than one old item, or sharing an
    /// identity with another new item. `None` unless duplicate detection
    /// was requested.
    pub duplicated_indexes: Option<Vec<usize>>,
    /// Matched pairs whose content changed.
    pub reload_index_map: IndexMap,
    /// Matched pairs whose relative position changed.
    pub move_index_map: IndexMap,
    /// Every matched pair.
    pub match_index_map: IndexMap,
    /// The old collection as given.
    pub old_items: Vec<T>,
    /// Matched items in old order, carrying their new content.
    pub unmoved_items: Vec<T>,
    /// The new collection as given.
    pub new_items: Vec<T>,
}

impl<T> ComparisonResult<T> {
    /// Returns `true` if applying this result changes nothing.
    pub fn is_empty(&self) -> bool {
        self.insertion_indexes.is_empty()
            && self.deletion_indexes.is_empty()
            && self.reload_index_map.is_empty()
            && self.move_index_map.is_empty()
    }

    /// Every surviving `(old, new)` pair in ascending old order.
    pub fn matched_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.match_index_map.iter().map(|(old, new)| (*old, *new))
    }

    /// Returns `true` if duplicate detection ran and found duplicates.
    pub fn has_duplicates(&self) -> bool {
        self.duplicated_indexes
            .as_ref()
            .is_some_and(|indexes| !indexes.is_empty())
    }
}
