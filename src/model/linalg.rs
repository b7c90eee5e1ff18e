//! Regularised least squares via accumulated normal equations.

const PIVOT_TOLERANCE: f64 = 1e-12;

/// Accumulates `XᵀX` and `Xᵀy` row by row, so the design matrix is never materialised.
pub(crate) struct NormalEquations {
    size: usize,
    xtx: Vec<f64>,
    xty: Vec<f64>,
}

impl NormalEquations {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            size,
            xtx: vec![0.0; size * size],
            xty: vec![0.0; size],
        }
    }

    pub(crate) fn add_row(&mut self, features: &[f64], target: f64) {
        debug_assert_eq!(features.len(), self.size);
        for (i, fi) in features.iter().enumerate() {
            if *fi == 0.0 {
                continue;
            }
            self.xty[i] += fi * target;
            let row = &mut self.xtx[i * self.size..(i + 1) * self.size];
            // Lower triangle only.
            for (cell, fj) in row.iter_mut().zip(features).take(i + 1) {
                *cell += fi * fj;
            }
        }
    }

    /// Adds `penalty * β_i²` to the objective.
    pub(crate) fn add_penalty(&mut self, index: usize, penalty: f64) {
        self.xtx[index * self.size + index] += penalty;
    }

    /// Solves `(XᵀX + Λ) β = Xᵀy` by Cholesky decomposition.
    ///
    /// Returns `None` if the system is not positive definite.
    pub(crate) fn solve(mut self) -> Option<Vec<f64>> {
        let n = self.size;
        // In-place lower-triangular factor L with XᵀX = L Lᵀ.
        let a = &mut self.xtx;
        for j in 0..n {
            let original = a[j * n + j];
            let mut diagonal = original;
            for k in 0..j {
                diagonal -= a[j * n + k] * a[j * n + k];
            }
            if !diagonal.is_finite() || diagonal <= original.abs() * PIVOT_TOLERANCE {
                return None;
            }
            let diagonal = diagonal.sqrt();
            a[j * n + j] = diagonal;
            for i in (j + 1)..n {
                let mut sum = a[i * n + j];
                for k in 0..j {
                    sum -= a[i * n + k] * a[j * n + k];
                }
                a[i * n + j] = sum / diagonal;
            }
        }

        // Forward substitution: L z = Xᵀy.
        let mut z = self.xty;
        for i in 0..n {
            let mut sum = z[i];
            for k in 0..i {
                sum -= a[i * n + k] * z[k];
            }
            z[i] = sum / a[i * n + i];
        }
        // Back substitution: Lᵀ β = z.
        for i in (0..n).rev() {
            let mut sum = z[i];
            for k in (i + 1)..n {
                sum -= a[k * n + i] * z[k];
            }
            z[i] = sum / a[i * n + i];
        }

        z.iter().all(|v| v.is_finite()).then_some(z)
    }
}
