//! Dense direct solver for the kernel system.

use crate::error::ReconstructionError;
use crate::Real;
use na::{DMatrix, DVector};

/// Pivots below this magnitude make the system count as singular.
pub(crate) const MIN_PIVOT: Real = 1.0e-12;

/// Solves `a * x = b` by Gaussian elimination with partial pivoting.
///
/// At each elimination step the row with the largest-magnitude entry in the
/// pivot column (from the current step downward) is swapped into place. If
/// the best available pivot falls below [`MIN_PIVOT`], the solve fails with
/// [`ReconstructionError::SingularSystem`]; no partial solution is produced.
pub fn solve_partial_pivoting(
    mut a: DMatrix<Real>,
    mut b: DVector<Real>,
) -> Result<DVector<Real>, ReconstructionError> {
    let n = b.len();
    assert_eq!(a.nrows(), n);
    assert_eq!(a.ncols(), n);

    for k in 0..n {
        let mut piv = k;
        let mut best = a[(k, k)].abs();

        for i in k + 1..n {
            let v = a[(i, k)].abs();
            if v > best {
                best = v;
                piv = i;
            }
        }

        if best < MIN_PIVOT {
            return Err(ReconstructionError::SingularSystem {
                step: k,
                pivot: best,
            });
        }

        if piv != k {
            a.swap_rows(k, piv);
            b.swap_rows(k, piv);
        }

        let akk = a[(k, k)];

        for i in k + 1..n {
            let factor = a[(i, k)] / akk;
            if factor == 0.0 {
                continue;
            }

            a[(i, k)] = 0.0;
            for j in k + 1..n {
                a[(i, j)] -= factor * a[(k, j)];
            }
            b[i] -= factor * b[k];
        }
    }

    // Back substitution.
    let mut x = DVector::zeros(n);

    for i in (0..n).rev() {
        let mut s = b[i];
        for j in i + 1..n {
            s -= a[(i, j)] * x[j];
        }
        x[i] = s / a[(i, i)];
    }

    Ok(x)
}

#[cfg(test)]
mod test {
    use super::*;
    use na::{dmatrix, dvector};

    #[test]
    fn solves_a_known_system() {
        let a = dmatrix![2.0, 1.0; 1.0, 3.0];
        let b = dvector![3.0, 5.0];
        let x = solve_partial_pivoting(a, b).unwrap();
        assert!((x[0] - 0.8).abs() < 1.0e-12);
        assert!((x[1] - 1.4).abs() < 1.0e-12);
    }

    #[test]
    fn pivoting_handles_a_zero_diagonal() {
        // Without the row swap the first pivot would be 0.
        let a = dmatrix![0.0, 1.0; 1.0, 0.0];
        let b = dvector![2.0, 3.0];
        let x = solve_partial_pivoting(a, b).unwrap();
        assert!((x[0] - 3.0).abs() < 1.0e-12);
        assert!((x[1] - 2.0).abs() < 1.0e-12);
    }

    #[test]
    fn one_by_one_system() {
        let a = dmatrix![4.0];
        let b = dvector![2.0];
        let x = solve_partial_pivoting(a, b).unwrap();
        assert_eq!(x[0], 0.5);
    }

    #[test]
    fn singular_system_fails() {
        let a = dmatrix![1.0, 1.0; 1.0, 1.0];
        let b = dvector![1.0, 2.0];
        match solve_partial_pivoting(a, b) {
            Err(ReconstructionError::SingularSystem { step, .. }) => assert_eq!(step, 1),
            other => panic!("expected a singular failure, got {other:?}"),
        }
    }
}
