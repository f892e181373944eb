//! Section-level diff: diff the section list and the items of every section
//! that survives into the new snapshot.

use std::collections::BTreeMap;

use rowdelta_types::ComparableSection;

use crate::error::DiffResult;
use crate::list_diff::{try_diff, IdentityIndex};
use crate::result::ComparisonResult;

/// Item diffs for every paired section plus the diff of the sections
/// themselves.
#[derive(Clone, Debug)]
pub struct SectionDiff<S: ComparableSection> {
    /// Old section index → diff of that section's items against its partner
    /// in the new snapshot. Ascending by old index.
    pub item_diffs: BTreeMap<usize, ComparisonResult<S::Item>>,
    /// Diff of the section list.
    pub sections: ComparisonResult<S>,
}

impl<S: ComparableSection> SectionDiff<S> {
    /// Returns `true` if neither the sections nor any of their items changed.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.item_diffs.values().all(ComparisonResult::is_empty)
    }

    /// Total number of duplicate indexes reported across all levels.
    pub fn duplicate_count(&self) -> usize {
        let items: usize = self
            .item_diffs
            .values()
            .filter_map(|d| d.duplicated_indexes.as_ref())
            .map(Vec::len)
            .sum();
        items + self.sections.duplicated_indexes.as_ref().map_or(0, Vec::len)
    }
}

/// Diff two snapshots of sections.
///
/// Each old section is paired with the first new section sharing its
/// identity, regardless of position, and their sub-items are diffed. Old
/// sections without a partner get no item diff; their removal is reported by
/// the section-level result.
///
/// # Errors
///
/// Propagates [`crate::DiffError::InconsistentComparison`] from either level.
pub fn diff_sections<S: ComparableSection>(
    old_sections: &[S],
    new_sections: &[S],
    find_duplicates: bool,
) -> DiffResult<SectionDiff<S>> {
    let index = IdentityIndex::build(new_sections);
    let mut item_diffs = BTreeMap::new();

    for (old_index, old_section) in old_sections.iter().enumerate() {
        let Some(&new_index) = index.candidates(new_sections, old_section).first() else {
            continue;
        };
        let items = try_diff(
            old_section.subitems(),
            new_sections[new_index].subitems(),
            find_duplicates,
        )?;
        item_diffs.insert(old_index, items);
    }

    let sections = try_diff(old_sections, new_sections, find_duplicates)?;

    Ok(SectionDiff {
        item_diffs,
        sections,
    })
}
