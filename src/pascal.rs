//! Pascal's triangle in one flat allocation.
//!
//! Row `i` has `i + 1` entries and starts at offset `i * (i + 1) / 2`, so rows
//! `0..=n` occupy `(n + 1) * (n + 2) / 2` contiguous `u64`s. Each interior entry
//! is the sum of the two entries above it.
//!
//! The largest row that fits `u64` is [`MAX_ROW`]; the central entry of the next
//! row, `C(68, 34)`, exceeds `u64::MAX`.

use crate::error::{AlgoError, Result};

/// Last row whose binomial coefficients all fit in `u64`.
pub const MAX_ROW: usize = 67;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PascalTriangle {
    last_row: usize,
    values: Vec<u64>,
}

#[inline]
fn row_start(row: usize) -> usize {
    row * (row + 1) / 2
}

impl PascalTriangle {
    /// Builds rows `0..=last_row`.
    pub fn new(last_row: usize) -> Result<Self> {
        // Anything past MAX_ROW fails at MAX_ROW + 1, so never reserve beyond it.
        let mut values: Vec<u64> = Vec::with_capacity(row_start(last_row.min(MAX_ROW) + 1));
        values.push(1);
        for row in 1..=last_row {
            let above = row_start(row - 1);
            values.push(1);
            for k in 1..row {
                let v = values[above + k - 1]
                    .checked_add(values[above + k])
                    .ok_or(AlgoError::Overflow { row })?;
                values.push(v);
            }
            values.push(1);
        }

        Ok(Self { last_row, values })
    }

    /// Number of rows stored (`last_row + 1`).
    pub fn rows(&self) -> usize {
        self.last_row + 1
    }

    pub fn row(&self, i: usize) -> Option<&[u64]> {
        (i <= self.last_row).then(|| &self.values[row_start(i)..row_start(i + 1)])
    }

    /// Binomial coefficient `C(n, k)`.
    pub fn get(&self, n: usize, k: usize) -> Option<u64> {
        self.row(n)?.get(k).copied()
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[u64]> + '_ {
        (0..=self.last_row).map(|i| &self.values[row_start(i)..row_start(i + 1)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_rows() {
        let t = PascalTriangle::new(4).unwrap();
        assert_eq!(t.rows(), 5);
        let rows: Vec<&[u64]> = t.iter_rows().collect();
        assert_eq!(
            rows,
            vec![
                &[1][..],
                &[1, 1][..],
                &[1, 2, 1][..],
                &[1, 3, 3, 1][..],
                &[1, 4, 6, 4, 1][..],
            ]
        );
        assert_eq!(t.row(5), None);
        assert_eq!(t.get(4, 2), Some(6));
        assert_eq!(t.get(4, 5), None);
    }

    #[test]
    fn overflow_boundary() {
        let t = PascalTriangle::new(MAX_ROW).unwrap();
        assert_eq!(t.get(67, 33), Some(14_226_520_737_620_288_370));
        assert_eq!(
            PascalTriangle::new(MAX_ROW + 1),
            Err(AlgoError::Overflow { row: 68 })
        );
        assert_eq!(
            PascalTriangle::new(200),
            Err(AlgoError::Overflow { row: 68 })
        );
    }

    #[test]
    fn rows_sum_to_powers_of_two() {
        let t = PascalTriangle::new(MAX_ROW).unwrap();
        for (i, row) in t.iter_rows().enumerate() {
            let sum: u128 = row.iter().map(|&v| u128::from(v)).sum();
            assert_eq!(sum, 1u128 << i, "row {i}");
        }
    }

    proptest! {
        #[test]
        fn edges_and_symmetry(n in 0usize..=MAX_ROW) {
            let t = PascalTriangle::new(n).unwrap();
            let row = t.row(n).unwrap();
            prop_assert_eq!(row.len(), n + 1);
            prop_assert_eq!(row[0], 1);
            prop_assert_eq!(row[n], 1);
            for k in 0..=n {
                prop_assert_eq!(row[k], row[n - k]);
            }
        }
    }
}
