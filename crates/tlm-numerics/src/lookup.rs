//! One-dimensional lookup table with linear interpolation.

use serde::{Deserialize, Serialize};

use crate::csv::CsvParser;
use crate::error::{NumericsError, NumericsResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Monotonicity {
    StrictlyIncreasing,
    StrictlyDecreasing,
    NotStrictlyMonotonic,
}

/// Index column plus one or more value columns.
///
/// The index is strictly increasing once the table is built. Lookups
/// outside the index range hold the boundary rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LookupTable1D {
    index: Vec<f64>,
    columns: Vec<Vec<f64>>,
}

fn monotonicity(index: &[f64]) -> Monotonicity {
    let pairs = || index.windows(2);
    if pairs().all(|w| w[0] < w[1]) {
        Monotonicity::StrictlyIncreasing
    } else if pairs().all(|w| w[0] > w[1]) {
        Monotonicity::StrictlyDecreasing
    } else {
        Monotonicity::NotStrictlyMonotonic
    }
}

impl LookupTable1D {
    pub fn from_columns(index: Vec<f64>, values: Vec<f64>, auto_sort: bool) -> NumericsResult<Self> {
        Self::from_multi_columns(index, vec![values], auto_sort)
    }

    pub fn from_multi_columns(
        index: Vec<f64>,
        columns: Vec<Vec<f64>>,
        auto_sort: bool,
    ) -> NumericsResult<Self> {
        if index.is_empty() || columns.is_empty() {
            return Err(NumericsError::EmptyTable);
        }
        for col in &columns {
            if col.len() != index.len() {
                return Err(NumericsError::LengthMismatch {
                    index: index.len(),
                    values: col.len(),
                });
            }
        }
        if index.iter().chain(columns.iter().flatten()).any(|v| v.is_nan()) {
            return Err(NumericsError::InvalidArg {
                what: "lookup table contains NaN",
            });
        }
        let mut table = Self { index, columns };
        match table.check_monotonicity() {
            Monotonicity::StrictlyIncreasing => {}
            _ if !auto_sort => return Err(NumericsError::NonMonotonicTable),
            Monotonicity::StrictlyDecreasing => table.reverse(),
            Monotonicity::NotStrictlyMonotonic => {
                table.sort();
                if table.check_monotonicity() != Monotonicity::StrictlyIncreasing {
                    return Err(NumericsError::UnsortableTable);
                }
            }
        }
        Ok(table)
    }

    pub fn from_csv(
        parser: &CsvParser,
        in_col: usize,
        out_col: usize,
        auto_sort: bool,
    ) -> NumericsResult<Self> {
        Self::from_columns(parser.column(in_col)?, parser.column(out_col)?, auto_sort)
    }

    pub fn from_csv_multi(
        parser: &CsvParser,
        in_col: usize,
        out_cols: &[usize],
        auto_sort: bool,
    ) -> NumericsResult<Self> {
        let columns = out_cols
            .iter()
            .map(|&c| parser.column(c))
            .collect::<NumericsResult<Vec<_>>>()?;
        Self::from_multi_columns(parser.column(in_col)?, columns, auto_sort)
    }

    pub fn check_monotonicity(&self) -> Monotonicity {
        monotonicity(&self.index)
    }

    fn reverse(&mut self) {
        self.index.reverse();
        for col in &mut self.columns {
            col.reverse();
        }
    }

    fn sort(&mut self) {
        let mut order: Vec<usize> = (0..self.index.len()).collect();
        order.sort_by(|&a, &b| self.index[a].total_cmp(&self.index[b]));
        self.index = order.iter().map(|&i| self.index[i]).collect();
        for col in &mut self.columns {
            *col = order.iter().map(|&i| col[i]).collect();
        }
    }

    pub fn index(&self) -> &[f64] {
        &self.index
    }

    pub fn values(&self) -> &[f64] {
        &self.columns[0]
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Interpolate the first value column.
    pub fn interpolate(&self, x: f64) -> f64 {
        interpolate_in(&self.index, &self.columns[0], x)
    }

    /// Interpolate value column `out_col`; `None` if there is no such column.
    pub fn interpolate_col(&self, x: f64, out_col: usize) -> Option<f64> {
        self.columns
            .get(out_col)
            .map(|col| interpolate_in(&self.index, col, x))
    }
}

fn interpolate_in(index: &[f64], values: &[f64], x: f64) -> f64 {
    let last = index.len() - 1;
    if x < index[0] {
        return values[0];
    }
    if x >= index[last] {
        return values[last];
    }
    // index[lo] <= x < index[hi]
    let (mut lo, mut hi) = (0, last);
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if x >= index[mid] {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let (i1, i2) = (index[lo], index[hi]);
    let (v1, v2) = (values[lo], values[hi]);
    v1 + (x - i1) * (v2 - v1) / (i2 - i1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::CsvOptions;

    fn table() -> LookupTable1D {
        LookupTable1D::from_columns(vec![0.0, 1.0, 3.0], vec![0.0, 10.0, 30.0], false).unwrap()
    }

    #[test]
    fn interpolates_between_rows() {
        let t = table();
        assert_eq!(t.interpolate(0.5), 5.0);
        assert_eq!(t.interpolate(2.0), 20.0);
    }

    #[test]
    fn exact_hits_and_boundaries() {
        let t = table();
        assert_eq!(t.interpolate(1.0), 10.0);
        assert_eq!(t.interpolate(-5.0), 0.0);
        assert_eq!(t.interpolate(3.0), 30.0);
        assert_eq!(t.interpolate(100.0), 30.0);
    }

    #[test]
    fn single_row_table_is_constant() {
        let t = LookupTable1D::from_columns(vec![2.0], vec![7.0], false).unwrap();
        assert_eq!(t.interpolate(0.0), 7.0);
        assert_eq!(t.interpolate(9.0), 7.0);
    }

    #[test]
    fn decreasing_table_reversed_with_auto_sort() {
        let t = LookupTable1D::from_columns(vec![3.0, 1.0, 0.0], vec![30.0, 10.0, 0.0], true)
            .unwrap();
        assert_eq!(t.index(), &[0.0, 1.0, 3.0]);
        assert_eq!(t.interpolate(2.0), 20.0);
    }

    #[test]
    fn shuffled_table_sorted_with_auto_sort() {
        let t = LookupTable1D::from_columns(vec![1.0, 3.0, 0.0], vec![10.0, 30.0, 0.0], true)
            .unwrap();
        assert_eq!(t.values(), &[0.0, 10.0, 30.0]);
    }

    #[test]
    fn non_monotonic_rejected_without_auto_sort() {
        let err = LookupTable1D::from_columns(vec![1.0, 0.0, 2.0], vec![0.0; 3], false)
            .unwrap_err();
        assert_eq!(err, NumericsError::NonMonotonicTable);
    }

    #[test]
    fn duplicates_are_unsortable() {
        let err = LookupTable1D::from_columns(vec![1.0, 0.0, 1.0], vec![0.0; 3], true)
            .unwrap_err();
        assert_eq!(err, NumericsError::UnsortableTable);
    }

    #[test]
    fn shape_errors() {
        assert_eq!(
            LookupTable1D::from_columns(vec![], vec![], false).unwrap_err(),
            NumericsError::EmptyTable
        );
        assert_eq!(
            LookupTable1D::from_columns(vec![0.0, 1.0], vec![0.0], false).unwrap_err(),
            NumericsError::LengthMismatch { index: 2, values: 1 }
        );
    }

    #[test]
    fn monotonicity_classification() {
        let mk = |idx: Vec<f64>| LookupTable1D {
            columns: vec![vec![0.0; idx.len()]],
            index: idx,
        };
        assert_eq!(
            mk(vec![0.0, 1.0]).check_monotonicity(),
            Monotonicity::StrictlyIncreasing
        );
        assert_eq!(
            mk(vec![1.0, 0.0]).check_monotonicity(),
            Monotonicity::StrictlyDecreasing
        );
        assert_eq!(
            mk(vec![0.0, 0.0]).check_monotonicity(),
            Monotonicity::NotStrictlyMonotonic
        );
    }

    #[test]
    fn multi_column_from_csv() {
        let p = CsvParser::from_text("0,0,100\n1,10,200\n", &CsvOptions::default()).unwrap();
        let t = LookupTable1D::from_csv_multi(&p, 0, &[1, 2], false).unwrap();
        assert_eq!(t.num_columns(), 2);
        assert_eq!(t.interpolate_col(0.5, 0), Some(5.0));
        assert_eq!(t.interpolate_col(0.5, 1), Some(150.0));
        assert_eq!(t.interpolate_col(0.5, 2), None);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn lookup_at_index_returns_row_value(
            steps in prop::collection::vec(0.01_f64..10.0, 1..40),
            values_seed in -1e3_f64..1e3,
        ) {
            let mut index = Vec::with_capacity(steps.len());
            let mut acc = 0.0;
            for s in &steps {
                acc += s;
                index.push(acc);
            }
            let values: Vec<f64> = index.iter().map(|x| values_seed * x.sin()).collect();
            let t = LookupTable1D::from_columns(index.clone(), values.clone(), false).unwrap();
            for (x, v) in index.iter().zip(&values) {
                prop_assert_eq!(t.interpolate(*x), *v);
            }
        }

        #[test]
        fn interpolation_stays_within_neighbours(
            x in -5.0_f64..15.0,
        ) {
            let t = LookupTable1D::from_columns(
                vec![0.0, 2.0, 5.0, 10.0],
                vec![1.0, -3.0, 4.0, 4.5],
                false,
            ).unwrap();
            let y = t.interpolate(x);
            prop_assert!((-3.0..=4.5).contains(&y));
        }
    }
}
