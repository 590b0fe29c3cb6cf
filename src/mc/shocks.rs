//! Correlated Gaussian shocks for two-factor path simulation.

use ndarray::{Array3, ArrayView2, ArrayViewMut2, Axis, s};
use rand_distr::{Distribution, StandardNormal};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::{SmileError, SmileResult};
use crate::math::pearson_correlation;
use crate::math::rng::{resolve_seed, stream_rng};

/// `N x M x 2` standard-normal draws; `[.., .., 0]` drives the price,
/// `[.., .., 1]` the variance, with pairwise correlation `rho`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShockTensor {
    data: Array3<f64>,
    rho: f64,
    seed: u64,
}

impl ShockTensor {
    /// Wraps pre-drawn shocks, e.g. for replaying a scenario. The last axis must have length 2.
    pub fn from_array(data: Array3<f64>, rho: f64, seed: u64) -> SmileResult<Self> {
        check_rho(rho)?;
        if data.dim().2 != 2 {
            return Err(SmileError::InvalidConfiguration(format!(
                "shock tensor needs a last axis of length 2, got {:?}",
                data.dim()
            )));
        }
        Ok(Self { data, rho, seed })
    }

    pub fn n_steps(&self) -> usize {
        self.data.dim().0
    }

    pub fn n_paths(&self) -> usize {
        self.data.dim().1
    }

    pub fn rho(&self) -> f64 {
        self.rho
    }

    /// Base seed the shocks were drawn from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn as_array(&self) -> &Array3<f64> {
        &self.data
    }

    /// Price shocks, `N x M`.
    pub fn price_shocks(&self) -> ArrayView2<'_, f64> {
        self.data.slice(s![.., .., 0])
    }

    /// Variance shocks, `N x M`.
    pub fn variance_shocks(&self) -> ArrayView2<'_, f64> {
        self.data.slice(s![.., .., 1])
    }

    /// Pearson correlation between the two components over every step and path.
    pub fn sample_correlation(&self) -> Option<f64> {
        pearson_correlation(
            self.data
                .lanes(Axis(2))
                .into_iter()
                .map(|pair| (pair[0], pair[1])),
        )
    }
}

/// Draws an `n_steps x n_paths x 2` tensor of correlated standard normals.
///
/// Each pair is `(e1, rho * e1 + sqrt(1 - rho^2) * e2)` for iid `e1, e2 ~ N(0, 1)`,
/// the Cholesky factor of `[[1, rho], [rho, 1]]`. Row `i` is driven by its own
/// sub-stream of `seed`, so the tensor is identical with or without the
/// `parallel` feature. Without a seed one is drawn from entropy and recorded on
/// the tensor.
pub fn generate_shocks(
    n_steps: usize,
    n_paths: usize,
    rho: f64,
    seed: Option<u64>,
) -> SmileResult<ShockTensor> {
    if n_steps == 0 || n_paths == 0 {
        return Err(SmileError::InvalidConfiguration(format!(
            "shock tensor needs n_steps >= 1 and n_paths >= 1, got {n_steps} x {n_paths}"
        )));
    }
    check_rho(rho)?;

    let base_seed = resolve_seed(seed);
    let rho_bar = (1.0 - rho * rho).max(0.0).sqrt();
    tracing::debug!(n_steps, n_paths, rho, seed = base_seed, "drawing correlated shocks");

    let mut data = Array3::<f64>::zeros((n_steps, n_paths, 2));

    #[cfg(feature = "parallel")]
    data.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, row)| fill_row(row, base_seed, i, rho, rho_bar));
    #[cfg(not(feature = "parallel"))]
    data.axis_iter_mut(Axis(0))
        .enumerate()
        .for_each(|(i, row)| fill_row(row, base_seed, i, rho, rho_bar));

    Ok(ShockTensor {
        data,
        rho,
        seed: base_seed,
    })
}

fn check_rho(rho: f64) -> SmileResult<()> {
    if !rho.is_finite() || !(-1.0..=1.0).contains(&rho) {
        return Err(SmileError::InvalidConfiguration(format!(
            "rho must lie in [-1, 1], got {rho}"
        )));
    }
    Ok(())
}

fn fill_row(mut row: ArrayViewMut2<'_, f64>, base_seed: u64, step: usize, rho: f64, rho_bar: f64) {
    let mut rng = stream_rng(base_seed, step);
    for mut pair in row.outer_iter_mut() {
        let e1: f64 = StandardNormal.sample(&mut rng);
        let e2: f64 = StandardNormal.sample(&mut rng);
        pair[0] = e1;
        pair[1] = rho * e1 + rho_bar * e2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn shape_and_seed_are_recorded() {
        let shocks = generate_shocks(12, 34, 0.3, Some(5)).unwrap();
        assert_eq!(shocks.as_array().dim(), (12, 34, 2));
        assert_eq!(shocks.n_steps(), 12);
        assert_eq!(shocks.n_paths(), 34);
        assert_eq!(shocks.seed(), 5);
        assert_eq!(shocks.price_shocks().dim(), (12, 34));
    }

    #[test]
    fn same_seed_is_bit_identical() {
        let a = generate_shocks(20, 50, -0.7, Some(99)).unwrap();
        let b = generate_shocks(20, 50, -0.7, Some(99)).unwrap();
        assert_eq!(a, b);
        let c = generate_shocks(20, 50, -0.7, Some(100)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn unseeded_draws_record_their_seed_for_replay() {
        let a = generate_shocks(4, 8, 0.1, None).unwrap();
        let replay = generate_shocks(4, 8, 0.1, Some(a.seed())).unwrap();
        assert_eq!(a, replay);
    }

    #[test]
    fn perfect_correlation_copies_the_price_shock() {
        let up = generate_shocks(3, 10, 1.0, Some(1)).unwrap();
        assert_eq!(up.price_shocks(), up.variance_shocks());
        let down = generate_shocks(3, 10, -1.0, Some(1)).unwrap();
        assert_eq!(down.price_shocks(), down.variance_shocks().mapv(|z| -z));
    }

    #[test]
    fn moments_are_standard_normal() {
        let shocks = generate_shocks(10, 20_000, 0.5, Some(11)).unwrap();
        for view in [shocks.price_shocks(), shocks.variance_shocks()] {
            let n = view.len() as f64;
            let mean = view.sum() / n;
            let var = view.mapv(|z| (z - mean).powi(2)).sum() / (n - 1.0);
            assert!(mean.abs() < 0.01, "mean={mean}");
            assert_relative_eq!(var, 1.0, epsilon = 0.02);
        }
    }

    #[test]
    fn rejects_bad_dimensions_and_correlation() {
        assert!(generate_shocks(0, 10, 0.0, Some(1)).is_err());
        assert!(generate_shocks(10, 0, 0.0, Some(1)).is_err());
        assert!(generate_shocks(10, 10, 1.5, Some(1)).is_err());
        assert!(generate_shocks(10, 10, f64::NAN, Some(1)).is_err());
        assert!(ShockTensor::from_array(Array3::zeros((2, 2, 3)), 0.0, 0).is_err());
    }
}
