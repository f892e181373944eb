//! Sparse two-dimensional scratch table.

use std::collections::BTreeMap;

/// A sparse `(row, col) → T` table.
///
/// Rows index the old collection and columns the new one. Only cells that
/// were explicitly written exist; an absent cell means no relation was
/// computed for that pair. Scoped to a single diff invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeltaMatrix<T> {
    rows: BTreeMap<usize, BTreeMap<usize, T>>,
    len: usize,
}

impl<T> Default for DeltaMatrix<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            len: 0,
        }
    }
}

impl<T> DeltaMatrix<T> {
    /// Create an empty matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// The value stored at `(row, col)`, if any.
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        self.rows.get(&row).and_then(|cols| cols.get(&col))
    }

    /// Store `value` at `(row, col)`, returning the previous value.
    pub fn insert(&mut self, row: usize, col: usize, value: T) -> Option<T> {
        let previous = self.rows.entry(row).or_default().insert(col, value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Remove and return the value at `(row, col)`.
    pub fn remove(&mut self, row: usize, col: usize) -> Option<T> {
        let cols = self.rows.get_mut(&row)?;
        let removed = cols.remove(&col);
        if cols.is_empty() {
            self.rows.remove(&row);
        }
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Returns `true` if a value is stored at `(row, col)`.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_some()
    }

    /// Populated cells of `row` in ascending column order.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, &T)> {
        self.rows
            .get(&row)
            .into_iter()
            .flat_map(|cols| cols.iter().map(|(col, value)| (*col, value)))
    }

    /// Number of populated cells.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no cell is populated.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove every cell.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_cells_are_none() {
        let matrix: DeltaMatrix<u8> = DeltaMatrix::new();
        assert!(matrix.is_empty());
        assert_eq!(matrix.get(0, 0), None);
        assert!(!matrix.contains(3, 7));
    }

    #[test]
    fn insert_overwrites_without_growing() {
        let mut matrix = DeltaMatrix::new();
        assert_eq!(matrix.insert(2, 5, "a"), None);
        assert_eq!(matrix.insert(2, 5, "b"), Some("a"));
        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix.get(2, 5), Some(&"b"));
    }

    #[test]
    fn row_iterates_in_column_order() {
        let mut matrix = DeltaMatrix::new();
        matrix.insert(1, 9, 'z');
        matrix.insert(1, 3, 'a');
        matrix.insert(2, 0, 'x');

        let row: Vec<_> = matrix.row(1).collect();
        assert_eq!(row, vec![(3, &'a'), (9, &'z')]);
        assert_eq!(matrix.row(7).count(), 0);
    }

    #[test]
    fn remove_and_clear() {
        let mut matrix = DeltaMatrix::new();
        matrix.insert(0, 0, 1);
        matrix.insert(0, 1, 2);
        assert_eq!(matrix.remove(0, 0), Some(1));
        assert_eq!(matrix.remove(0, 0), None);
        assert_eq!(matrix.remove(4, 4), None);
        assert_eq!(matrix.len(), 1);

        matrix.clear();
        assert!(matrix.is_empty());
        assert!(!matrix.contains(0, 1));
    }
}
