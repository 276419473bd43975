//! Dense row-major matrix used for the parameter tables and the DP tables.
use crate::error::{HmmError, Result, Table};

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    columns: usize,
    mem: Vec<f64>,
}

impl Matrix {
    /// (rows x columns) matrix filled by `fill`.
    pub fn new(rows: usize, columns: usize, fill: f64) -> Self {
        Self {
            rows,
            columns,
            mem: vec![fill; rows * columns],
        }
    }
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Self::new(rows, columns, 0f64)
    }
    /// Build a matrix from nested rows. Every row should have the same length.
    /// `table` is only used to report a ragged input.
    pub fn from_rows<T: AsRef<[f64]>>(rows: &[T], table: Table) -> Result<Self> {
        let columns = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut mem = Vec::with_capacity(rows.len() * columns);
        for row in rows.iter().map(|r| r.as_ref()) {
            if row.len() != columns {
                return Err(HmmError::ShapeMismatch {
                    table,
                    expected: (rows.len(), columns),
                    found: (rows.len(), row.len()),
                });
            }
            mem.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            columns,
            mem,
        })
    }
    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn columns(&self) -> usize {
        self.columns
    }
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }
    pub fn get(&self, i: usize, j: usize) -> Option<&f64> {
        if i < self.rows && j < self.columns {
            self.mem.get(i * self.columns + j)
        } else {
            None
        }
    }
    pub fn get_mut(&mut self, i: usize, j: usize) -> Option<&mut f64> {
        if i < self.rows && j < self.columns {
            self.mem.get_mut(i * self.columns + j)
        } else {
            None
        }
    }
    pub fn row(&self, i: usize) -> &[f64] {
        &self.mem[i * self.columns..(i + 1) * self.columns]
    }
    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.mem[i * self.columns..(i + 1) * self.columns]
    }
    pub fn iter_rows(&self) -> std::slice::ChunksExact<'_, f64> {
        // chunks_exact(0) panics.
        self.mem.chunks_exact(self.columns.max(1))
    }
    /// Sum of each row.
    pub fn row_sums(&self) -> Vec<f64> {
        (0..self.rows).map(|i| self.row(i).iter().sum()).collect()
    }
    /// Column `j` as a new vector.
    pub fn column(&self, j: usize) -> Vec<f64> {
        (0..self.rows).map(|i| self[(i, j)]).collect()
    }
    pub fn as_slice(&self) -> &[f64] {
        &self.mem
    }
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.iter_rows().map(|r| r.to_vec()).collect()
    }
    /// Element-wise square sum of the difference. None if the shapes differ.
    pub fn dist(&self, other: &Self) -> Option<f64> {
        (self.shape() == other.shape()).then(|| {
            self.mem
                .iter()
                .zip(other.mem.iter())
                .map(|(x, y)| (x - y).powi(2))
                .sum()
        })
    }
}

impl std::ops::Index<(usize, usize)> for Matrix {
    type Output = f64;
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        self.get(i, j).unwrap()
    }
}

impl std::ops::IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        self.get_mut(i, j).unwrap()
    }
}

impl std::fmt::Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.iter_rows() {
            let row: Vec<_> = row.iter().map(|x| format!("{:.3}", x)).collect();
            writeln!(f, "{}", row.join("\t"))?;
        }
        Ok(())
    }
}

/// Index of the maximum. The first one wins on ties. Zero on an empty slice.
pub fn argmax(xs: &[f64]) -> usize {
    let mut arg = 0;
    for (i, &x) in xs.iter().enumerate().skip(1) {
        if xs[arg] < x {
            arg = i;
        }
    }
    arg
}

/// Maximum of `xs` together with its first index.
pub fn max_with_arg(xs: &[f64]) -> (usize, f64) {
    let arg = argmax(xs);
    (arg, xs.get(arg).copied().unwrap_or(f64::NEG_INFINITY))
}

pub(crate) fn normalize(xs: &mut [f64]) -> f64 {
    let sum: f64 = xs.iter().sum();
    xs.iter_mut().for_each(|x| *x /= sum);
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn index_test() {
        let mut m = Matrix::zeros(2, 3);
        m[(1, 2)] = 4f64;
        assert_eq!(m.row(1), &[0f64, 0f64, 4f64]);
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.get(0, 3), None);
        assert_eq!(m.row_sums(), vec![0f64, 4f64]);
        assert_eq!(m.column(2), vec![0f64, 4f64]);
    }
    #[test]
    fn from_rows_test() {
        let m = Matrix::from_rows(&[vec![0.5, 0.5], vec![0.1, 0.9]], Table::Transition).unwrap();
        assert_eq!(m.shape(), (2, 2));
        assert_eq!(m.to_rows(), vec![vec![0.5, 0.5], vec![0.1, 0.9]]);
        let ragged = Matrix::from_rows(&[vec![0.5, 0.5], vec![1.0]], Table::Emission);
        assert!(matches!(ragged, Err(HmmError::ShapeMismatch { .. })));
    }
    #[test]
    fn argmax_test() {
        assert_eq!(argmax(&[0.1, 0.3, 0.3, 0.2]), 1);
        assert_eq!(argmax(&[0f64, 0f64]), 0);
        assert_eq!(argmax(&[]), 0);
        assert_eq!(max_with_arg(&[0.2, 0.7, 0.1]), (1, 0.7));
    }
    #[test]
    fn normalize_test() {
        let mut xs = vec![1f64, 3f64];
        let sum = normalize(&mut xs);
        assert_eq!(sum, 4f64);
        assert_eq!(xs, vec![0.25, 0.75]);
    }
}
