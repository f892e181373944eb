use std::fmt;
use std::hash::{Hash, Hasher};

use crate::comparison::ComparisonLevel;

/// Capability every diffable item must provide.
///
/// Implementations must be deterministic: within one snapshot no two distinct
/// items may compare identity-equal, and `compare_to` is only meaningful for
/// items whose identities match. Violating this is a contract error; the
/// diff engine does not try to detect it beyond the obvious case of a
/// matched pair reported as [`ComparisonLevel::Different`].
///
/// Items are cloned into immutable snapshots that cross to a worker thread,
/// hence the `Send + Sync + 'static` bound.
pub trait ComparableItem: Clone + fmt::Debug + Send + Sync + 'static {
    /// Returns `true` if `other` is the same logical item.
    fn identity_eq(&self, other: &Self) -> bool;

    /// Classify the content of two identity-equal items.
    fn compare_to(&self, other: &Self) -> ComparisonLevel;

    /// Hash of the identity key, used to index candidates.
    ///
    /// Items returning `None` are matched by a linear scan. When provided, two
    /// identity-equal items must return the same hash.
    fn identity_hash(&self) -> Option<u64> {
        None
    }
}

/// A comparable item that owns an ordered list of sub-items (a table section
/// with its rows).
pub trait ComparableSection: ComparableItem {
    type Item: ComparableItem;

    /// The ordered sub-items of this section.
    fn subitems(&self) -> &[Self::Item];
}

/// Compute an identity hash for any hashable key.
///
/// Backed by BLAKE3, so the value is stable across processes and toolchain
/// versions.
pub fn identity_hash_of<K: Hash + ?Sized>(key: &K) -> u64 {
    let mut hasher = IdentityHasher(blake3::Hasher::new());
    key.hash(&mut hasher);
    hasher.finish()
}

struct IdentityHasher(blake3::Hasher);

impl Hasher for IdentityHasher {
    fn finish(&self) -> u64 {
        let digest = self.0.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.as_bytes()[..8]);
        u64::from_le_bytes(head)
    }

    fn write(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }
}
