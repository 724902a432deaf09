//! Compressed sparse row matrix for document vectors

use cherry_core::{Error, Result};

/// Row-major sparse matrix: one row per document, one column per feature.
///
/// Zero values are never stored, so every entry yielded by [`SparseMatrix::row`]
/// is non-zero.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl SparseMatrix {
    /// Create an empty matrix with a fixed column count
    pub fn new(n_cols: usize) -> Self {
        Self {
            n_cols,
            indptr: vec![0],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Build from rows of `(column, value)` entries.
    ///
    /// Entries within a row are sorted by column; duplicate columns are summed
    /// and zeros dropped.
    pub fn from_rows<I, R>(n_cols: usize, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (usize, f64)>,
    {
        let mut matrix = Self::new(n_cols);
        for row in rows {
            matrix.push_row(row)?;
        }
        Ok(matrix)
    }

    /// Append one row. The matrix is left unchanged if a column is out of range.
    pub fn push_row<R>(&mut self, row: R) -> Result<()>
    where
        R: IntoIterator<Item = (usize, f64)>,
    {
        let mut entries: Vec<(usize, f64)> = row.into_iter().collect();
        entries.sort_by_key(|(col, _)| *col);

        if let Some((col, _)) = entries.last().filter(|(col, _)| *col >= self.n_cols) {
            return Err(Error::vectorizer(format!(
                "column {} out of range for {} features",
                col, self.n_cols
            )));
        }

        let mut last: Option<usize> = None;
        for (col, value) in entries {
            if last == Some(col) {
                if let Some(v) = self.data.last_mut() {
                    *v += value;
                }
                continue;
            }
            self.indices.push(col);
            self.data.push(value);
            last = Some(col);
        }

        // Drop zeros produced by summing or supplied explicitly
        let start = *self.indptr.last().unwrap_or(&0);
        let mut write = start;
        for read in start..self.data.len() {
            if self.data[read] != 0.0 {
                self.indices[write] = self.indices[read];
                self.data[write] = self.data[read];
                write += 1;
            }
        }
        self.indices.truncate(write);
        self.data.truncate(write);
        self.indptr.push(write);
        Ok(())
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.indptr.len() - 1
    }

    /// Number of columns
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Number of stored (non-zero) entries
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Iterate the non-zero `(column, value)` entries of one row
    pub fn row(&self, index: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let (start, end) = if index < self.n_rows() {
            (self.indptr[index], self.indptr[index + 1])
        } else {
            (0, 0)
        };
        self.indices[start..end]
            .iter()
            .copied()
            .zip(self.data[start..end].iter().copied())
    }

    /// Number of non-zero entries in one row
    pub fn row_nnz(&self, index: usize) -> usize {
        if index < self.n_rows() {
            self.indptr[index + 1] - self.indptr[index]
        } else {
            0
        }
    }

    /// Materialize one row as a dense vector
    pub fn to_dense_row(&self, index: usize) -> Vec<f64> {
        let mut dense = vec![0.0; self.n_cols];
        for (col, value) in self.row(index) {
            dense[col] = value;
        }
        dense
    }

    /// Dot product of one row with a dense weight vector.
    ///
    /// Returns `None` if `weights` is narrower than a stored column.
    pub fn row_dot(&self, index: usize, weights: &[f64]) -> Option<f64> {
        self.row(index)
            .map(|(col, value)| weights.get(col).map(|w| value * w))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_sorts_and_merges() {
        let matrix =
            SparseMatrix::from_rows(4, vec![vec![(3, 1.0), (0, 2.0), (3, 1.0)], vec![]]).unwrap();

        assert_eq!(matrix.n_rows(), 2);
        assert_eq!(matrix.n_cols(), 4);
        assert_eq!(matrix.nnz(), 2);
        assert_eq!(matrix.row(0).collect::<Vec<_>>(), vec![(0, 2.0), (3, 2.0)]);
        assert_eq!(matrix.row_nnz(1), 0);
    }

    #[test]
    fn test_zeros_are_dropped() {
        let matrix =
            SparseMatrix::from_rows(3, vec![vec![(0, 0.0), (1, 1.5), (2, 1.0), (2, -1.0)]])
                .unwrap();

        assert_eq!(matrix.row(0).collect::<Vec<_>>(), vec![(1, 1.5)]);
        assert_eq!(matrix.to_dense_row(0), vec![0.0, 1.5, 0.0]);
    }

    #[test]
    fn test_row_dot() {
        let matrix = SparseMatrix::from_rows(3, vec![vec![(0, 1.0), (2, 2.0)]]).unwrap();
        assert_eq!(matrix.row_dot(0, &[0.5, 10.0, 0.25]), Some(1.0));
        assert_eq!(matrix.row_dot(0, &[0.5]), None);
    }

    #[test]
    fn test_out_of_range_column_is_rejected() {
        let mut matrix = SparseMatrix::from_rows(2, vec![vec![(1, 1.0)]]).unwrap();

        let err = matrix.push_row(vec![(0, 1.0), (2, 1.0)]).unwrap_err();

        assert!(matches!(err, Error::Vectorizer(_)));
        assert_eq!(matrix.n_rows(), 1);
        assert_eq!(matrix.nnz(), 1);
        assert!(SparseMatrix::from_rows(1, vec![vec![(5, 1.0)]]).is_err());
    }

    #[test]
    fn test_out_of_range_row_is_empty() {
        let matrix = SparseMatrix::new(2);
        assert_eq!(matrix.n_rows(), 0);
        assert_eq!(matrix.row(5).count(), 0);
    }
}
