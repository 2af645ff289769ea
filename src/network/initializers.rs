//! Random weight and input initialisation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal, Uniform};

/// Seeded generator when a seed is given, OS entropy otherwise.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Glorot (Xavier) uniform kernel of `fan_out` rows by `fan_in` columns.
///
/// Values are drawn from `U(-limit, limit)` with `limit = sqrt(6 / (fan_in + fan_out))`.
pub fn glorot_uniform<R: Rng + ?Sized>(
    fan_in: usize,
    fan_out: usize,
    rng: &mut R,
) -> Vec<Vec<f32>> {
    let limit = (6.0 / (fan_in + fan_out) as f64).sqrt() as f32;
    let distribution = Uniform::new_inclusive(-limit, limit);
    (0..fan_out)
        .map(|_| (0..fan_in).map(|_| distribution.sample(rng)).collect())
        .collect()
}

/// `len` values drawn from the standard normal distribution N(0, 1).
pub fn random_normal<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<f32> {
    (0..len)
        .map(|_| -> f32 { StandardNormal.sample(rng) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glorot_shape_and_bounds() {
        let mut rng = rng_from_seed(Some(7));
        let kernel = glorot_uniform(1, 315, &mut rng);
        let limit = (6.0f32 / 316.0).sqrt();

        assert_eq!(kernel.len(), 315);
        assert!(kernel.iter().all(|row| row.len() == 1));
        assert!(kernel.iter().flatten().all(|w| w.abs() <= limit + 1e-6));
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = random_normal(16, &mut rng_from_seed(Some(42)));
        let b = random_normal(16, &mut rng_from_seed(Some(42)));
        let c = random_normal(16, &mut rng_from_seed(Some(43)));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_random_normal_moments() {
        let values = random_normal(20_000, &mut rng_from_seed(Some(1)));
        let mean = values.iter().sum::<f32>() / values.len() as f32;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / values.len() as f32;
        assert!(mean.abs() < 0.05);
        assert!((var - 1.0).abs() < 0.05);
    }
}
