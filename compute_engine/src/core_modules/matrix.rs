// THEORY:
// Dense multiplication of two rectangular matrices with the textbook triple loop:
// C[i][j] = Σ_k A[i][k] * B[k][j].
//
// Validation happens in a fixed order, and each step runs against both operands
// before the next step starts:
//   1. Shape: every row of a matrix has the same length, and there is at least
//      one row and one column. Otherwise `MalformedMatrix`.
//   2. Compatibility: cols(A) == rows(B). Otherwise `DimensionMismatch`.
//
// Element type is decided once per request. If every cell of both operands is an
// integer the product is computed over `i64` with checked arithmetic, so the
// result is either exact or an error naming the overflowing cell. A single
// decimal anywhere promotes both operands to `f64`.

use crate::core_modules::errors::{ComputeError, ComputeResult};
use crate::core_modules::numeric::{Scalar, split_tokens};

/// Arithmetic the multiplication loop needs from a cell type.
pub trait MatrixElement: Copy {
    const ZERO: Self;

    /// Returns `accumulator + a * b`, or `None` if the result is not representable.
    fn multiply_accumulate(accumulator: Self, a: Self, b: Self) -> Option<Self>;
}

impl MatrixElement for i64 {
    const ZERO: Self = 0;

    fn multiply_accumulate(accumulator: Self, a: Self, b: Self) -> Option<Self> {
        a.checked_mul(b).and_then(|product| accumulator.checked_add(product))
    }
}

impl MatrixElement for f64 {
    const ZERO: Self = 0.0;

    fn multiply_accumulate(accumulator: Self, a: Self, b: Self) -> Option<Self> {
        Some(accumulator + a * b)
    }
}

/// A row-major rectangular matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: MatrixElement> Matrix<T> {
    /// Builds a matrix from nested rows, rejecting ragged or empty input.
    pub fn from_rows(rows: Vec<Vec<T>>) -> ComputeResult<Self> {
        let row_count = rows.len();
        let col_count = rows.first().map(Vec::len).unwrap_or(0);
        if row_count == 0 || col_count == 0 {
            return Err(ComputeError::MalformedMatrix(
                "matrix must have at least one row and one column".to_string(),
            ));
        }
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != col_count) {
            return Err(ComputeError::MalformedMatrix(format!(
                "row {} has {} values, expected {}",
                index,
                row.len(),
                col_count
            )));
        }

        let data = rows.into_iter().flatten().collect();
        Ok(Matrix {
            rows: row_count,
            cols: col_count,
            data,
        })
    }

    /// The n×n identity.
    pub fn identity(n: usize) -> ComputeResult<Self>
    where
        T: From<u8>,
    {
        let rows = (0..n)
            .map(|i| (0..n).map(|j| T::from(u8::from(i == j))).collect())
            .collect();
        Self::from_rows(rows)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row < self.rows && col < self.cols {
            self.data.get(row * self.cols + col).copied()
        } else {
            None
        }
    }

    /// Computes `self × other`.
    pub fn multiply(&self, other: &Matrix<T>) -> ComputeResult<Matrix<T>> {
        if self.cols != other.rows {
            return Err(ComputeError::DimensionMismatch(format!(
                "cannot multiply {}x{} by {}x{}: columns of A ({}) must equal rows of B ({})",
                self.rows, self.cols, other.rows, other.cols, self.cols, other.rows
            )));
        }

        let mut data = Vec::with_capacity(self.rows * other.cols);
        for i in 0..self.rows {
            let row = &self.data[i * self.cols..(i + 1) * self.cols];
            for j in 0..other.cols {
                let mut accumulator = T::ZERO;
                for (k, &a) in row.iter().enumerate() {
                    let b = other.data[k * other.cols + j];
                    accumulator = T::multiply_accumulate(accumulator, a, b).ok_or_else(|| {
                        ComputeError::InvalidInput(format!(
                            "integer overflow computing cell ({}, {})",
                            i, j
                        ))
                    })?;
                }
                data.push(accumulator);
            }
        }

        Ok(Matrix {
            rows: self.rows,
            cols: other.cols,
            data,
        })
    }

    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.data.chunks(self.cols).map(<[T]>::to_vec).collect()
    }
}

/// A validated operand in the arithmetic chosen for its request.
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixOperand {
    Integer(Matrix<i64>),
    Decimal(Matrix<f64>),
}

impl MatrixOperand {
    /// Validates `rows`, keeping integers exact unless a decimal is present.
    pub fn from_scalars(rows: Vec<Vec<Scalar>>) -> ComputeResult<Self> {
        if rows.iter().flatten().all(|cell| cell.is_integer()) {
            let integers = rows
                .into_iter()
                .map(|row| row.into_iter().map(integer_of).collect())
                .collect();
            Ok(MatrixOperand::Integer(Matrix::from_rows(integers)?))
        } else {
            Ok(MatrixOperand::Decimal(Matrix::from_rows(decimals_of(rows))?))
        }
    }

    pub fn rows(&self) -> usize {
        match self {
            MatrixOperand::Integer(matrix) => matrix.rows(),
            MatrixOperand::Decimal(matrix) => matrix.rows(),
        }
    }

    pub fn cols(&self) -> usize {
        match self {
            MatrixOperand::Integer(matrix) => matrix.cols(),
            MatrixOperand::Decimal(matrix) => matrix.cols(),
        }
    }

    fn into_decimal(self) -> Matrix<f64> {
        match self {
            MatrixOperand::Decimal(matrix) => matrix,
            MatrixOperand::Integer(matrix) => Matrix {
                rows: matrix.rows,
                cols: matrix.cols,
                data: matrix.data.into_iter().map(|value| value as f64).collect(),
            },
        }
    }

    /// Multiplies, promoting to decimal arithmetic when either side is decimal.
    pub fn multiply(self, other: MatrixOperand) -> ComputeResult<MatrixProduct> {
        match (self, other) {
            (MatrixOperand::Integer(a), MatrixOperand::Integer(b)) => {
                let product = a.multiply(&b)?;
                Ok(MatrixProduct::from_matrix(&product, Scalar::Integer))
            }
            (a, b) => {
                let product = a.into_decimal().multiply(&b.into_decimal())?;
                Ok(MatrixProduct::from_matrix(&product, Scalar::Decimal))
            }
        }
    }
}

fn integer_of(cell: Scalar) -> i64 {
    match cell {
        Scalar::Integer(value) => value,
        Scalar::Decimal(value) => value as i64,
    }
}

fn decimals_of(rows: Vec<Vec<Scalar>>) -> Vec<Vec<f64>> {
    rows.into_iter()
        .map(|row| row.into_iter().map(Scalar::as_f64).collect())
        .collect()
}

/// The product of a multiplication, ready for a boundary to render.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MatrixProduct {
    pub rows: usize,
    pub cols: usize,
    pub matrix: Vec<Vec<Scalar>>,
}

impl MatrixProduct {
    fn from_matrix<T: MatrixElement>(matrix: &Matrix<T>, wrap: fn(T) -> Scalar) -> Self {
        MatrixProduct {
            rows: matrix.rows(),
            cols: matrix.cols(),
            matrix: matrix
                .to_rows()
                .into_iter()
                .map(|row| row.into_iter().map(wrap).collect())
                .collect(),
        }
    }
}

/// Validates both operands, then multiplies A × B.
pub fn multiply_matrices(
    matrix_a: Vec<Vec<Scalar>>,
    matrix_b: Vec<Vec<Scalar>>,
) -> ComputeResult<MatrixProduct> {
    let a = MatrixOperand::from_scalars(matrix_a).map_err(|error| labelled("matrix A", error))?;
    let b = MatrixOperand::from_scalars(matrix_b).map_err(|error| labelled("matrix B", error))?;
    a.multiply(b)
}

fn labelled(label: &str, error: ComputeError) -> ComputeError {
    match error {
        ComputeError::MalformedMatrix(message) => {
            ComputeError::MalformedMatrix(format!("{}: {}", label, message))
        }
        other => other,
    }
}

/// Parses the text form: rows separated by newlines or `;`, values by commas or
/// whitespace. Blank rows are skipped.
pub fn parse_matrix_text(text: &str) -> ComputeResult<Vec<Vec<Scalar>>> {
    text.split(|c| c == '\n' || c == ';')
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(row_index, line)| {
            split_tokens(line)
                .map(|token| {
                    Scalar::parse(token).ok_or_else(|| {
                        ComputeError::MalformedMatrix(format!(
                            "row {}: '{}' is not a number",
                            row_index, token
                        ))
                    })
                })
                .collect::<ComputeResult<Vec<Scalar>>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn ints(rows: &[&[i64]]) -> Vec<Vec<Scalar>> {
        rows.iter()
            .map(|row| row.iter().map(|&v| Scalar::Integer(v)).collect())
            .collect()
    }

    #[test]
    fn multiplies_two_by_three_and_three_by_two() {
        let a = ints(&[&[1, 2, 3], &[4, 5, 6]]);
        let b = ints(&[&[7, 8], &[9, 10], &[11, 12]]);
        let product = multiply_matrices(a, b).unwrap();
        assert_eq!((product.rows, product.cols), (2, 2));
        assert_eq!(product.matrix, ints(&[&[58, 64], &[139, 154]]));
    }

    #[test]
    fn identity_is_neutral() {
        let a = Matrix::from_rows(vec![vec![2i64, -1, 0], vec![4, 3, 7]]).unwrap();
        let identity = Matrix::<i64>::identity(3).unwrap();
        assert_eq!(a.multiply(&identity).unwrap(), a);
    }

    #[test]
    fn decimal_anywhere_promotes_both_operands() {
        let a = vec![vec![Scalar::Decimal(0.5), Scalar::Integer(2)]];
        let b = ints(&[&[4], &[1]]);
        let product = multiply_matrices(a, b).unwrap();
        assert_eq!(product.matrix, vec![vec![Scalar::Decimal(4.0)]]);
    }

    #[test]
    fn ragged_rows_are_malformed() {
        let a = ints(&[&[1, 2], &[3]]);
        let b = ints(&[&[1], &[2]]);
        let error = multiply_matrices(a, b).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MalformedMatrix);
        assert!(error.message().starts_with("matrix A"));
    }

    #[test]
    fn malformed_is_reported_before_mismatch() {
        // A is 1x3 and B is ragged: B's shape error wins over the mismatch.
        let a = ints(&[&[1, 2, 3]]);
        let b = ints(&[&[1, 2], &[3]]);
        let error = multiply_matrices(a, b).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MalformedMatrix);
        assert!(error.message().starts_with("matrix B"));
    }

    #[test]
    fn incompatible_shapes_mismatch() {
        let a = ints(&[&[1, 2], &[3, 4]]);
        let b = ints(&[&[1, 2, 3]]);
        let error = multiply_matrices(a, b).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DimensionMismatch);
    }

    #[test]
    fn empty_matrices_are_malformed() {
        assert_eq!(
            multiply_matrices(vec![], ints(&[&[1]])).unwrap_err().kind(),
            ErrorKind::MalformedMatrix
        );
        assert_eq!(
            multiply_matrices(vec![vec![]], ints(&[&[1]])).unwrap_err().kind(),
            ErrorKind::MalformedMatrix
        );
    }

    #[test]
    fn integer_overflow_names_the_cell() {
        let a = ints(&[&[i64::MAX, 1]]);
        let b = ints(&[&[2], &[0]]);
        let error = multiply_matrices(a, b).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        assert!(error.message().contains("(0, 0)"));
    }

    #[test]
    fn parses_text_form() {
        let rows = parse_matrix_text("1, 2 3\n4,5,6;\n\n7 8 9.5").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec![Scalar::Integer(1), Scalar::Integer(2), Scalar::Integer(3)]);
        assert_eq!(rows[2][2], Scalar::Decimal(9.5));
        let error = parse_matrix_text("1 2\n3 x").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MalformedMatrix);
    }

    #[test]
    fn accessors() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.get(1, 0), Some(3.0));
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.to_rows(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }
}
