use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field-level change set: field name → whether that field changed.
pub type ComparisonChanges = BTreeMap<String, bool>;

/// The verdict of comparing two items.
///
/// `Different` means the two items do not share an identity and are never
/// paired. `Same` and `Changed` both describe a pair with matching identity;
/// `Changed` additionally records which fields differ.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonLevel {
    /// Identity and content are equal.
    #[default]
    Same,
    /// Distinct identities.
    Different,
    /// Same identity, content changed.
    Changed(ComparisonChanges),
}

impl ComparisonLevel {
    /// Build a `Changed` verdict from `(field, changed)` pairs.
    pub fn changed<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<String>,
    {
        Self::Changed(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Returns `true` when both items share an identity (`Same` or `Changed`).
    pub fn is_same(&self) -> bool {
        !matches!(self, Self::Different)
    }

    /// Returns `true` only for `Changed`.
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }

    /// Whether the named field changed.
    ///
    /// `Same` never reports a change and `Different` always does. For
    /// `Changed`, a field absent from the change set is reported as changed.
    ///
    /// ```
    /// use rowdelta_types::ComparisonLevel;
    ///
    /// let verdict = ComparisonLevel::changed([("title", true), ("subtitle", false)]);
    /// assert!(verdict.property_did_change("title"));
    /// assert!(!verdict.property_did_change("subtitle"));
    /// assert!(verdict.property_did_change("icon"));
    /// ```
    pub fn property_did_change(&self, property: &str) -> bool {
        match self {
            Self::Same => false,
            Self::Changed(changes) => changes.get(property).copied().unwrap_or(true),
            Self::Different => true,
        }
    }
}
