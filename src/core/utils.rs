//! Complex linear algebra kernel for small quantum registers.
//!
//! This module contains helper functions for:
//! - Checked matrix operations (tensor product, products, adjoint, trace, tolerance equality).
//! - Operator expansion from a few target qubits to the whole register.
//! - Partial trace, positive square root and state fidelity.
//! - Completeness checks for measurements and channels.

use crate::core::errors::MatrixError;
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Computes the Kronecker (Tensor) product of two matrices.
///
/// If `A` is an $m \times n$ matrix and `B` is a $p \times q$ matrix,
/// the result is an $mp \times nq$ matrix.
pub fn kronecker_product(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    let (m, n) = a.dim();
    let (p, q) = b.dim();

    Array2::from_shape_fn((m * p, n * q), |(row, col)| {
        a[[row / p, col / q]] * b[[row % p, col % q]]
    })
}

/// Tensor product of two state vectors.
pub fn kronecker_vector(a: &Array1<Complex64>, b: &Array1<Complex64>) -> Array1<Complex64> {
    let p = b.len();
    Array1::from_shape_fn(a.len() * p, |i| a[i / p] * b[i % p])
}

/// Matrix-matrix product `A · B`.
pub fn matmul(
    a: &Array2<Complex64>,
    b: &Array2<Complex64>,
) -> Result<Array2<Complex64>, MatrixError> {
    if a.ncols() != b.nrows() {
        return Err(MatrixError::DimensionMismatch {
            op: "matmul",
            left: a.dim(),
            right: b.dim(),
        });
    }
    Ok(a.dot(b))
}

/// Matrix-vector product `M · v`.
pub fn matvec(m: &Array2<Complex64>, v: &Array1<Complex64>) -> Result<Array1<Complex64>, MatrixError> {
    if m.ncols() != v.len() {
        return Err(MatrixError::DimensionMismatch {
            op: "matvec",
            left: m.dim(),
            right: (v.len(), 1),
        });
    }
    Ok(m.dot(v))
}

/// Conjugate transpose $M^\dagger$.
pub fn dagger(m: &Array2<Complex64>) -> Array2<Complex64> {
    m.t().mapv(|c| c.conj())
}

/// Computes the trace of a square matrix (sum of diagonal elements).
pub fn trace(matrix: &Array2<Complex64>) -> Result<Complex64, MatrixError> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(MatrixError::NotSquare((rows, cols)));
    }
    Ok(matrix.diag().sum())
}

/// Element-wise equality within `tol` (absolute, on the complex modulus).
pub fn approx_eq(
    a: &Array2<Complex64>,
    b: &Array2<Complex64>,
    tol: f64,
) -> Result<bool, MatrixError> {
    if a.dim() != b.dim() {
        return Err(MatrixError::DimensionMismatch {
            op: "approx_eq",
            left: a.dim(),
            right: b.dim(),
        });
    }
    Ok(a.iter().zip(b.iter()).all(|(x, y)| (x - y).norm() <= tol))
}

/// Generates the full operator matrix ($2^N \times 2^N$) for the whole system.
///
/// It expands a local operator acting on `targets` (and controlled by `controls`)
/// to an operator on the full system of `num_total_qubits`. Local bit `i` of the
/// operator maps onto qubit `targets[i]`.
///
/// # Arguments
///
/// * `num_total_qubits` - Total number of qubits in the system.
/// * `matrix` - The matrix representation of the local operator.
/// * `targets` - Indices of the target qubits.
/// * `controls` - Indices of the control qubits.
pub(crate) fn expand_operator(
    num_total_qubits: usize,
    matrix: &Array2<Complex64>,
    targets: &[usize],
    controls: &[usize],
) -> Array2<Complex64> {
    let dim = 1 << num_total_qubits;
    let mut full_matrix = Array2::<Complex64>::zeros((dim, dim));

    let control_mask = controls.iter().fold(0usize, |mask, &c| mask | (1 << c));
    let target_mask = targets.iter().fold(0usize, |mask, &t| mask | (1 << t));
    let passive_mask = !target_mask;

    for col_idx in 0..dim {
        // Basis states with an inactive control pass through untouched
        if (col_idx & control_mask) != control_mask {
            full_matrix[[col_idx, col_idx]] = Complex64::new(1.0, 0.0);
            continue;
        }

        let small_col = extract_bits(col_idx, targets);
        for small_row in 0..matrix.nrows() {
            let val = matrix[[small_row, small_col]];
            if val.norm_sqr() < f64::EPSILON * f64::EPSILON {
                continue;
            }
            let row_idx = (col_idx & passive_mask) | deposit_bits(small_row, targets);
            full_matrix[[row_idx, col_idx]] = val;
        }
    }
    full_matrix
}

/// Extracts the bits in positions `indices` of `value` into a compact integer.
fn extract_bits(value: usize, indices: &[usize]) -> usize {
    indices
        .iter()
        .enumerate()
        .filter(|&(_, &pos)| (value >> pos) & 1 == 1)
        .fold(0, |acc, (i, _)| acc | (1 << i))
}

/// Scatters bit `i` of `compact_value` to bit position `indices[i]`.
fn deposit_bits(compact_value: usize, indices: &[usize]) -> usize {
    indices
        .iter()
        .enumerate()
        .filter(|&(i, _)| (compact_value >> i) & 1 == 1)
        .fold(0, |acc, (_, &pos)| acc | (1 << pos))
}

/// Find duplicate in a slice of usize
pub fn find_duplicate(indices: &[usize]) -> Option<usize> {
    let mut seen = std::collections::HashSet::new();
    indices.iter().find(|&&idx| !seen.insert(idx)).copied()
}

/// Checks completeness relation for measurement or Kraus operators.
///
/// Verifies if $\sum M_k^\dagger M_k = I$.
pub fn check_completeness(ops: &[Array2<Complex64>], dim: usize) -> bool {
    let sum = ops
        .iter()
        .fold(Array2::<Complex64>::zeros((dim, dim)), |acc, op| {
            acc + dagger(op).dot(op)
        });
    is_identity(&sum, 1e-9)
}

/// Checks POVM completeness relation.
///
/// Verifies if $\sum E_k = I$.
pub fn check_povm_completeness(ops: &[Array2<Complex64>], dim: usize) -> bool {
    let mut sum = Array2::<Complex64>::zeros((dim, dim));
    for op in ops {
        sum += op;
    }
    is_identity(&sum, 1e-9)
}

fn is_identity(mat: &Array2<Complex64>, tol: f64) -> bool {
    let eye = Array2::<Complex64>::eye(mat.nrows());
    mat.iter().zip(eye.iter()).all(|(a, b)| (a - b).norm() < tol)
}

/// Computes the outer product of two vectors $|a\rangle\langle b|$.
pub fn outer_product(a: &Array1<Complex64>, b: &Array1<Complex64>) -> Array2<Complex64> {
    Array2::from_shape_fn((a.len(), b.len()), |(i, j)| a[i] * b[j].conj())
}

/// Reduced density matrix of qubit `keep`, tracing out every other qubit.
pub fn partial_trace(rho: &Array2<Complex64>, keep: usize) -> Result<Array2<Complex64>, MatrixError> {
    let (rows, cols) = rho.dim();
    if rows != cols || !rows.is_power_of_two() {
        return Err(MatrixError::NotSquare((rows, cols)));
    }
    let num_qubits = rows.trailing_zeros() as usize;
    if keep >= num_qubits {
        return Err(MatrixError::IndexOutOfRange {
            index: keep,
            len: num_qubits,
        });
    }

    let mask = 1 << keep;
    let mut reduced = Array2::<Complex64>::zeros((2, 2));
    for i in 0..rows {
        for j in 0..cols {
            if (i & !mask) == (j & !mask) {
                reduced[[(i >> keep) & 1, (j >> keep) & 1]] += rho[[i, j]];
            }
        }
    }
    Ok(reduced)
}

/// Finds the square root of a positive semi-definite matrix.
///
/// Uses spectral decomposition $M = V D V^\dagger$ to compute $\sqrt{M} = V \sqrt{D} V^\dagger$.
pub fn sqrt_positive_matrix(mat: &Array2<Complex64>) -> Array2<Complex64> {
    let (rows, cols) = mat.dim();

    if rows == 2 && cols == 2 {
        return sqrt_2x2_analytical(mat);
    }

    sqrt_nxn_nalgebra(mat)
}

/// sqrt(A) = (A + sqrt(det)I) / sqrt(tr + 2sqrt(det))
fn sqrt_2x2_analytical(mat: &Array2<Complex64>) -> Array2<Complex64> {
    let tr = mat[[0, 0]] + mat[[1, 1]];
    let det = mat[[0, 0]] * mat[[1, 1]] - mat[[0, 1]] * mat[[1, 0]];

    let clean_det = if det.norm() < 1e-12 {
        Complex64::new(0.0, 0.0)
    } else {
        det
    };
    let sqrt_det = clean_det.sqrt();

    let s = (tr + Complex64::new(2.0, 0.0) * sqrt_det).sqrt();
    if s.norm() < 1e-12 {
        return Array2::zeros((2, 2));
    }

    let identity = Array2::<Complex64>::eye(2);
    let numerator = mat + &identity.mapv(|x| x * sqrt_det);
    numerator.mapv(|x| x / s)
}

fn sqrt_nxn_nalgebra(mat: &Array2<Complex64>) -> Array2<Complex64> {
    let (rows, cols) = mat.dim();

    let na_mat = DMatrix::from_fn(rows, cols, |r, c| mat[[r, c]]);
    let eigen = na_mat.symmetric_eigen();

    // Negative eigenvalues are round-off on a PSD input
    let mut sqrt_eigenvals = DMatrix::<Complex64>::zeros(rows, rows);
    for i in 0..rows {
        let val = eigen.eigenvalues[i].max(0.0);
        sqrt_eigenvals[(i, i)] = Complex64::new(val.sqrt(), 0.0);
    }

    let v = &eigen.eigenvectors;
    let result_na = v * sqrt_eigenvals * v.adjoint();

    Array2::from_shape_fn((rows, cols), |(r, c)| result_na[(r, c)])
}

/// Smallest eigenvalue of a Hermitian matrix.
///
/// Closed form for 2x2, nalgebra `symmetric_eigen` otherwise.
pub fn min_hermitian_eigenvalue(mat: &Array2<Complex64>) -> f64 {
    let (rows, cols) = mat.dim();

    if rows == 2 && cols == 2 {
        let (a, d) = (mat[[0, 0]].re, mat[[1, 1]].re);
        let half_gap = (a - d) / 2.0;
        return (a + d) / 2.0 - (half_gap * half_gap + mat[[0, 1]].norm_sqr()).sqrt();
    }

    let na_mat = DMatrix::from_fn(rows, cols, |r, c| mat[[r, c]]);
    na_mat
        .symmetric_eigen()
        .eigenvalues
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min)
}

/// Uhlmann fidelity $F(\rho, \sigma) = (\mathrm{tr}\sqrt{\sqrt\rho\,\sigma\sqrt\rho})^2$.
pub fn fidelity(rho: &Array2<Complex64>, sigma: &Array2<Complex64>) -> Result<f64, MatrixError> {
    if rho.dim() != sigma.dim() {
        return Err(MatrixError::DimensionMismatch {
            op: "fidelity",
            left: rho.dim(),
            right: sigma.dim(),
        });
    }
    let sqrt_rho = sqrt_positive_matrix(rho);
    let inner = sqrt_rho.dot(sigma).dot(&sqrt_rho);
    let root_trace = trace(&sqrt_positive_matrix(&inner))?.re;
    Ok((root_trace * root_trace).clamp(0.0, 1.0))
}

/// Fidelity between a pure state and a density matrix, $\langle\psi|\rho|\psi\rangle$.
pub fn pure_state_fidelity(
    psi: &Array1<Complex64>,
    rho: &Array2<Complex64>,
) -> Result<f64, MatrixError> {
    let rho_psi = matvec(rho, psi)?;
    let overlap: Complex64 = psi.iter().zip(rho_psi.iter()).map(|(a, b)| a.conj() * b).sum();
    Ok(overlap.re)
}

/// Checks if a matrix is Hermitian
pub fn is_hermitian(mat: &Array2<Complex64>, tol: f64) -> bool {
    mat.iter()
        .zip(mat.t().iter())
        .all(|(a, b)| (a - b.conj()).norm() < tol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_kronecker_product_shape_and_values() {
        let x = array![[c(0.0, 0.0), c(1.0, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]];
        let eye = Array2::<Complex64>::eye(2);
        let k = kronecker_product(&x, &eye);
        assert_eq!(k.dim(), (4, 4));
        // X on the high bit flips |00> into |10>
        assert_eq!(k[[2, 0]], c(1.0, 0.0));
        assert_eq!(k[[0, 0]], c(0.0, 0.0));
    }

    #[test]
    fn test_matmul_rejects_incompatible_shapes() {
        let a = Array2::<Complex64>::zeros((2, 3));
        let b = Array2::<Complex64>::zeros((2, 2));
        let err = matmul(&a, &b).unwrap_err();
        assert!(matches!(err, MatrixError::DimensionMismatch { op: "matmul", .. }));
        assert!(matvec(&b, &Array1::zeros(3)).is_err());
        assert!(approx_eq(&a, &b, 1e-9).is_err());
    }

    #[test]
    fn test_trace_and_dagger() {
        let m = array![[c(1.0, 0.0), c(0.0, 2.0)], [c(3.0, 0.0), c(4.0, -1.0)]];
        assert_eq!(trace(&m).unwrap(), c(5.0, -1.0));
        let d = dagger(&m);
        assert_eq!(d[[0, 1]], c(3.0, 0.0));
        assert_eq!(d[[1, 0]], c(0.0, -2.0));
        assert!(trace(&Array2::<Complex64>::zeros((2, 3))).is_err());
    }

    #[test]
    fn test_expand_operator_targets_qubit_one() {
        let x = array![[c(0.0, 0.0), c(1.0, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]];
        let full = expand_operator(2, &x, &[1], &[]);
        // |00> (index 0) -> |q1=1> (index 2)
        assert_eq!(full[[2, 0]], c(1.0, 0.0));
        assert_eq!(full[[3, 1]], c(1.0, 0.0));
        assert!(check_completeness(&[full], 4));
    }

    #[test]
    fn test_partial_trace_of_bell_state_is_maximally_mixed() {
        let h = 1.0 / 2.0_f64.sqrt();
        let psi = array![c(h, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(h, 0.0)];
        let rho = outer_product(&psi, &psi);
        for keep in 0..2 {
            let reduced = partial_trace(&rho, keep).unwrap();
            assert_relative_eq!(reduced[[0, 0]].re, 0.5, epsilon = 1e-12);
            assert_relative_eq!(reduced[[1, 1]].re, 0.5, epsilon = 1e-12);
            assert_relative_eq!(reduced[[0, 1]].norm(), 0.0, epsilon = 1e-12);
        }
        assert!(matches!(
            partial_trace(&rho, 2),
            Err(MatrixError::IndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_sqrt_positive_matrix_squares_back() {
        let m = array![[c(0.75, 0.0), c(0.25, 0.1)], [c(0.25, -0.1), c(0.25, 0.0)]];
        let root = sqrt_positive_matrix(&m);
        assert!(approx_eq(&root.dot(&root), &m, 1e-9).unwrap());

        let big = Array2::from_diag(&array![c(0.25, 0.0), c(0.25, 0.0), c(0.5, 0.0), c(0.0, 0.0)]);
        let root = sqrt_positive_matrix(&big);
        assert!(approx_eq(&root.dot(&root), &big, 1e-9).unwrap());
    }

    #[test]
    fn test_fidelity_bounds() {
        let zero = array![c(1.0, 0.0), c(0.0, 0.0)];
        let one = array![c(0.0, 0.0), c(1.0, 0.0)];
        let rho0 = outer_product(&zero, &zero);
        let rho1 = outer_product(&one, &one);
        let mixed = Array2::<Complex64>::eye(2).mapv(|x| x * 0.5);

        assert_relative_eq!(fidelity(&rho0, &rho0).unwrap(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(fidelity(&rho0, &rho1).unwrap(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(fidelity(&rho0, &mixed).unwrap(), 0.5, epsilon = 1e-9);
        assert_relative_eq!(pure_state_fidelity(&zero, &mixed).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_min_hermitian_eigenvalue() {
        let diag = array![[c(1.5, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(-0.5, 0.0)]];
        assert_relative_eq!(min_hermitian_eigenvalue(&diag), -0.5, epsilon = 1e-12);

        // |+><+| has eigenvalues 0 and 1
        let plus = Array2::from_elem((2, 2), c(0.5, 0.0));
        assert_relative_eq!(min_hermitian_eigenvalue(&plus), 0.0, epsilon = 1e-12);

        let mut big = Array2::<Complex64>::eye(4).mapv(|z| z * 0.25);
        big[[3, 3]] = c(-0.1, 0.0);
        assert_relative_eq!(min_hermitian_eigenvalue(&big), -0.1, epsilon = 1e-12);
    }
}
