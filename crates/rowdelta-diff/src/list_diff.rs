//! Item-level diff: compare two ordered lists of comparable items.
//!
//! Items are matched by identity, matched pairs are classified by their
//! content verdict, and pairs whose relative order changed are reported as
//! moves.

use std::collections::{BTreeSet, HashMap};

use rowdelta_types::{ComparableItem, ComparisonLevel};

use crate::error::{DiffError, DiffResult};
use crate::matrix::DeltaMatrix;
use crate::result::{ComparisonResult, IndexMap};

/// Identity lookup over one collection.
///
/// Items that expose an identity hash are bucketed by it; lookups for items
/// without a hash fall back to a scan of the whole collection.
pub(crate) struct IdentityIndex {
    hashed: HashMap<u64, Vec<usize>>,
}

impl IdentityIndex {
    pub(crate) fn build<T: ComparableItem>(items: &[T]) -> Self {
        let mut hashed: HashMap<u64, Vec<usize>> = HashMap::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            if let Some(hash) = item.identity_hash() {
                hashed.entry(hash).or_default().push(index);
            }
        }
        Self { hashed }
    }

    /// Positions in `items` whose identity equals `probe`, ascending.
    pub(crate) fn candidates<T: ComparableItem>(&self, items: &[T], probe: &T) -> Vec<usize> {
        match probe.identity_hash() {
            Some(hash) => self
                .hashed
                .get(&hash)
                .map(|bucket| {
                    bucket
                        .iter()
                        .copied()
                        .filter(|&index| items[index].identity_eq(probe))
                        .collect()
                })
                .unwrap_or_default(),
            None => items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.identity_eq(probe))
                .map(|(index, _)| index)
                .collect(),
        }
    }
}

/// Compare two ordered collections and produce a [`ComparisonResult`].
///
/// Every old item is paired with the first new item sharing its identity.
/// When a new position was already claimed by an earlier old item, the later
/// old item is treated as deleted. With `find_duplicates` set, such positions
/// (and any further candidates sharing an identity) are reported in
/// [`ComparisonResult::duplicated_indexes`].
///
/// A pair is a move when its rank among matched pairs differs between old
/// and new order; a pair is a reload when its verdict is `Changed`.
///
/// # Errors
///
/// [`DiffError::InconsistentComparison`] if a pair that matched by identity
/// is classified as `Different` by `compare_to`.
pub fn try_diff<T: ComparableItem>(
    old: &[T],
    new: &[T],
    find_duplicates: bool,
) -> DiffResult<ComparisonResult<T>> {
    let index = IdentityIndex::build(new);
    let mut verdicts: DeltaMatrix<ComparisonLevel> = DeltaMatrix::new();
    // claimed[new_index] = old index paired with it
    let mut claimed: Vec<Option<usize>> = vec![None; new.len()];
    let mut deletion_indexes = Vec::new();
    let mut duplicates = BTreeSet::new();

    for (old_index, old_item) in old.iter().enumerate() {
        let candidates = index.candidates(new, old_item);
        let Some(&new_index) = candidates.first() else {
            deletion_indexes.push(old_index);
            continue;
        };

        if find_duplicates {
            duplicates.extend(candidates[1..].iter().copied());
        }

        // First old item wins the slot.
        if claimed[new_index].is_some() {
            deletion_indexes.push(old_index);
            if find_duplicates {
                duplicates.insert(new_index);
            }
            continue;
        }

        let verdict = old_item.compare_to(&new[new_index]);
        if !verdict.is_same() {
            return Err(DiffError::InconsistentComparison {
                old_index,
                new_index,
            });
        }
        claimed[new_index] = Some(old_index);
        verdicts.insert(old_index, new_index, verdict);
    }

    let insertion_indexes: Vec<usize> = claimed
        .iter()
        .enumerate()
        .filter(|(_, owner)| owner.is_none())
        .map(|(new_index, _)| new_index)
        .collect();

    let match_index_map: IndexMap = claimed
        .iter()
        .enumerate()
        .filter_map(|(new_index, owner)| owner.map(|old_index| (old_index, new_index)))
        .collect();

    let reload_index_map: IndexMap = match_index_map
        .iter()
        .filter(|(old_index, new_index)| {
            verdicts
                .get(**old_index, **new_index)
                .is_some_and(ComparisonLevel::is_changed)
        })
        .map(|(old_index, new_index)| (*old_index, *new_index))
        .collect();

    // Rank of each matched old item in new order.
    let mut new_rank = vec![0usize; old.len()];
    for (rank, old_index) in claimed.iter().flatten().enumerate() {
        new_rank[*old_index] = rank;
    }
    let move_index_map: IndexMap = match_index_map
        .iter()
        .enumerate()
        .filter(|(old_rank, (old_index, _))| new_rank[**old_index] != *old_rank)
        .map(|(_, (old_index, new_index))| (*old_index, *new_index))
        .collect();

    let unmoved_items = match_index_map
        .values()
        .map(|new_index| new[*new_index].clone())
        .collect();

    Ok(ComparisonResult {
        insertion_indexes,
        deletion_indexes,
        duplicated_indexes: find_duplicates.then(|| duplicates.into_iter().collect()),
        reload_index_map,
        move_index_map,
        match_index_map,
        old_items: old.to_vec(),
        unmoved_items,
        new_items: new.to_vec(),
    })
}

/// Compare two ordered collections, treating an inconsistent item model as a
/// fatal error.
///
/// # Panics
///
/// Panics when [`try_diff`] reports [`DiffError::InconsistentComparison`].
pub fn diff<T: ComparableItem>(old: &[T], new: &[T], find_duplicates: bool) -> ComparisonResult<T> {
    match try_diff(old, new, find_duplicates) {
        Ok(result) => result,
        Err(err) => panic!("{err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowdelta_types::identity_hash_of;

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        id: &'static str,
        value: u32,
    }

    fn row(id: &'static str, value: u32) -> Row {
        Row { id, value }
    }

    impl ComparableItem for Row {
        fn identity_eq(&self, other: &Self) -> bool {
            self.id == other.id
        }

        fn compare_to(&self, other: &Self) -> ComparisonLevel {
            if self.id != other.id {
                ComparisonLevel::Different
            } else if self.value == other.value {
                ComparisonLevel::Same
            } else {
                ComparisonLevel::changed([("value", true)])
            }
        }

        fn identity_hash(&self) -> Option<u64> {
            Some(identity_hash_of(self.id))
        }
    }

    /// Same as `Row` but without an identity hash.
    #[derive(Clone, Debug, PartialEq)]
    struct PlainRow(Row);

    impl ComparableItem for PlainRow {
        fn identity_eq(&self, other: &Self) -> bool {
            self.0.identity_eq(&other.0)
        }

        fn compare_to(&self, other: &Self) -> ComparisonLevel {
            self.0.compare_to(&other.0)
        }
    }

    /// Claims every item is the same identity but always compares different.
    #[derive(Clone, Debug)]
    struct Liar;

    impl ComparableItem for Liar {
        fn identity_eq(&self, _other: &Self) -> bool {
            true
        }

        fn compare_to(&self, _other: &Self) -> ComparisonLevel {
            ComparisonLevel::Different
        }
    }

    fn map(pairs: &[(usize, usize)]) -> IndexMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn reload_move_insert_delete() {
        let old = vec![row("A", 1), row("B", 1), row("C", 1)];
        let new = vec![row("B", 2), row("A", 1), row("D", 1)];

        let result = diff(&old, &new, false);
        assert_eq!(result.deletion_indexes, vec![2]);
        assert_eq!(result.insertion_indexes, vec![2]);
        assert_eq!(result.reload_index_map, map(&[(1, 0)]));
        assert_eq!(result.move_index_map, map(&[(0, 1), (1, 0)]));
        assert_eq!(result.unmoved_items, vec![row("A", 1), row("B", 2)]);
        assert_eq!(result.new_items, new);
        assert_eq!(result.old_items, old);
        assert_eq!(result.duplicated_indexes, None);
    }

    #[test]
    fn identical_lists_produce_empty_result() {
        let items = vec![row("A", 1), row("B", 2), row("C", 3)];
        let result = diff(&items, &items, true);
        assert!(result.is_empty());
        assert_eq!(result.matched_pairs().count(), 3);
        assert_eq!(result.duplicated_indexes, Some(Vec::new()));
    }

    #[test]
    fn empty_inputs() {
        let empty: Vec<Row> = Vec::new();
        let items = vec![row("A", 1), row("B", 1)];

        let inserted = diff(&empty, &items, false);
        assert_eq!(inserted.insertion_indexes, vec![0, 1]);
        assert!(inserted.deletion_indexes.is_empty());
        assert!(inserted.unmoved_items.is_empty());

        let deleted = diff(&items, &empty, false);
        assert_eq!(deleted.deletion_indexes, vec![0, 1]);
        assert!(deleted.insertion_indexes.is_empty());

        assert!(diff(&empty, &empty, false).is_empty());
    }

    #[test]
    fn insertion_at_front_is_not_a_move() {
        let old = vec![row("A", 1), row("B", 1)];
        let new = vec![row("X", 1), row("A", 1), row("B", 1)];

        let result = diff(&old, &new, false);
        assert_eq!(result.insertion_indexes, vec![0]);
        assert!(result.move_index_map.is_empty());
        assert_eq!(result.match_index_map, map(&[(0, 1), (1, 2)]));
    }

    #[test]
    fn deletion_in_middle_is_not_a_move() {
        let old = vec![row("A", 1), row("B", 1), row("C", 1)];
        let new = vec![row("A", 1), row("C", 1)];

        let result = diff(&old, &new, false);
        assert_eq!(result.deletion_indexes, vec![1]);
        assert!(result.move_index_map.is_empty());
    }

    #[test]
    fn rotation_moves_every_item() {
        let old = vec![row("A", 1), row("B", 1), row("C", 1)];
        let new = vec![row("B", 1), row("C", 1), row("A", 1)];

        let result = diff(&old, &new, false);
        assert_eq!(result.move_index_map, map(&[(0, 2), (1, 0), (2, 1)]));
        assert!(result.reload_index_map.is_empty());
    }

    #[test]
    fn changed_in_place_is_reload_only() {
        let old = vec![row("A", 1), row("B", 1)];
        let new = vec![row("A", 1), row("B", 5)];

        let result = diff(&old, &new, false);
        assert_eq!(result.reload_index_map, map(&[(1, 1)]));
        assert!(result.move_index_map.is_empty());
        assert_eq!(result.unmoved_items[1].value, 5);
    }

    #[test]
    fn duplicate_old_identities_first_wins() {
        let old = vec![row("A", 1), row("A", 2)];
        let new = vec![row("A", 1)];

        let result = diff(&old, &new, true);
        assert_eq!(result.match_index_map, map(&[(0, 0)]));
        assert_eq!(result.deletion_indexes, vec![1]);
        assert_eq!(result.duplicated_indexes, Some(vec![0]));
        assert!(result.has_duplicates());
    }

    #[test]
    fn duplicate_new_identities_are_reported() {
        let old = vec![row("A", 1)];
        let new = vec![row("A", 1), row("A", 1)];

        let result = diff(&old, &new, true);
        assert_eq!(result.match_index_map, map(&[(0, 0)]));
        assert_eq!(result.insertion_indexes, vec![1]);
        assert_eq!(result.duplicated_indexes, Some(vec![1]));
    }

    #[test]
    fn duplicates_not_reported_without_detection() {
        let old = vec![row("A", 1), row("A", 2)];
        let new = vec![row("A", 1)];

        let result = diff(&old, &new, false);
        assert_eq!(result.duplicated_indexes, None);
        assert_eq!(result.deletion_indexes, vec![1]);
    }

    #[test]
    fn items_without_hash_use_full_scan() {
        let old: Vec<PlainRow> = vec![row("A", 1), row("B", 1), row("C", 1)]
            .into_iter()
            .map(PlainRow)
            .collect();
        let new: Vec<PlainRow> = vec![row("B", 2), row("A", 1), row("D", 1)]
            .into_iter()
            .map(PlainRow)
            .collect();

        let result = diff(&old, &new, false);
        assert_eq!(result.deletion_indexes, vec![2]);
        assert_eq!(result.insertion_indexes, vec![2]);
        assert_eq!(result.reload_index_map, map(&[(1, 0)]));
        assert_eq!(result.move_index_map, map(&[(0, 1), (1, 0)]));
    }

    #[test]
    fn inconsistent_item_model_is_an_error() {
        let err = try_diff(&[Liar], &[Liar], false).unwrap_err();
        assert_eq!(
            err,
            DiffError::InconsistentComparison {
                old_index: 0,
                new_index: 0
            }
        );
    }

    #[test]
    #[should_panic(expected = "inconsistent comparison")]
    fn diff_panics_on_inconsistent_item_model() {
        diff(&[Liar], &[Liar], false);
    }
}
