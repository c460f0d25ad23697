//! Stochastic commodity price realizations.
//!
//! Every function takes an explicit random generator so a Monte Carlo run
//! owns its stream and repeated runs with the same seed reproduce exactly.

use rand::Rng;
use rand_distr::{Distribution, Poisson, StandardNormal};

/// Price process attached to a commodity, resolved from its table entry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum PriceModel {
    /// Base price, unchanged.
    #[default]
    Fixed,
    /// Geometric Brownian motion with drift `mu` and volatility `sigma` (per year).
    Gbm { mu: f64, sigma: f64 },
    /// GBM with a compound Poisson jump component.
    JumpDiffusion {
        mu: f64,
        sigma: f64,
        /// Expected jumps per year.
        lambda_jump: f64,
        /// Standard deviation of the log jump size.
        sigma_jump: f64,
    },
}

impl PriceModel {
    /// Realizes a price `t_years` into the future starting from `base_price`.
    pub fn realize<R: Rng + ?Sized>(&self, base_price: f64, t_years: f64, rng: &mut R) -> f64 {
        match *self {
            Self::Fixed => base_price,
            Self::Gbm { mu, sigma } => gbm(base_price, mu, sigma, t_years, rng),
            Self::JumpDiffusion {
                mu,
                sigma,
                lambda_jump,
                sigma_jump,
            } => jump_diffusion(base_price, mu, sigma, t_years, lambda_jump, sigma_jump, rng),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Gbm { .. } => "gbm",
            Self::JumpDiffusion { .. } => "jump_diffusion",
        }
    }
}

/// Closed-form GBM terminal value for a given standard normal draw `z`.
///
/// `S(T) = S0 * exp((mu - sigma^2 / 2) * T + sigma * sqrt(T) * z)`
pub fn gbm_with_draw(s0: f64, mu: f64, sigma: f64, t_years: f64, z: f64) -> f64 {
    s0 * ((mu - 0.5 * sigma * sigma) * t_years + sigma * t_years.sqrt() * z).exp()
}

/// One GBM realization at horizon `t_years`.
pub fn gbm<R: Rng + ?Sized>(s0: f64, mu: f64, sigma: f64, t_years: f64, rng: &mut R) -> f64 {
    let z: f64 = StandardNormal.sample(rng);
    gbm_with_draw(s0, mu, sigma, t_years, z)
}

/// One jump-diffusion realization at horizon `t_years`.
///
/// Draws the GBM component first, then `N ~ Poisson(lambda_jump * T)` jumps,
/// each scaling the price by `exp(J)` with `J ~ N(0, sigma_jump^2)`. With no
/// jumps the result is the GBM value for the same draw.
pub fn jump_diffusion<R: Rng + ?Sized>(
    s0: f64,
    mu: f64,
    sigma: f64,
    t_years: f64,
    lambda_jump: f64,
    sigma_jump: f64,
    rng: &mut R,
) -> f64 {
    let mut price = gbm(s0, mu, sigma, t_years, rng);
    let jumps = jump_count(lambda_jump * t_years, rng);
    for _ in 0..jumps {
        let z: f64 = StandardNormal.sample(rng);
        price *= (sigma_jump * z).exp();
    }
    price
}

/// Poisson jump count; zero without drawing when the mean is not positive.
fn jump_count<R: Rng + ?Sized>(mean: f64, rng: &mut R) -> u64 {
    if !mean.is_finite() || mean <= 0.0 {
        return 0;
    }
    match Poisson::new(mean) {
        Ok(poisson) => {
            let n: f64 = poisson.sample(rng);
            n as u64
        }
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn fixed_ignores_parameters() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(PriceModel::Fixed.realize(123.0, 10.0, &mut rng), 123.0);
    }

    #[test]
    fn gbm_zero_sigma_is_deterministic() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let model = PriceModel::Gbm {
            mu: 0.03,
            sigma: 0.0,
        };
        let t = 2.5;
        assert_eq!(model.realize(100.0, t, &mut rng), 100.0 * (0.03_f64 * t).exp());
    }

    #[test]
    fn gbm_at_time_zero_is_base_price() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(gbm(80.0, 0.05, 0.4, 0.0, &mut rng), 80.0);
    }

    #[test]
    fn jump_diffusion_without_jumps_matches_gbm() {
        let mut rng_a = ChaCha8Rng::seed_from_u64(99);
        let mut rng_b = ChaCha8Rng::seed_from_u64(99);
        let jd = jump_diffusion(50.0, 0.02, 0.2, 3.0, 0.0, 0.5, &mut rng_a);
        let plain = gbm(50.0, 0.02, 0.2, 3.0, &mut rng_b);
        assert_eq!(jd, plain);
    }

    #[test]
    fn same_seed_same_realization() {
        let model = PriceModel::JumpDiffusion {
            mu: 0.01,
            sigma: 0.2,
            lambda_jump: 2.0,
            sigma_jump: 0.3,
        };
        let mut rng_a = ChaCha8Rng::seed_from_u64(5);
        let mut rng_b = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(
            model.realize(10.0, 4.0, &mut rng_a),
            model.realize(10.0, 4.0, &mut rng_b)
        );
    }

    #[test]
    fn consecutive_draws_differ() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let a = gbm(100.0, 0.0, 0.3, 1.0, &mut rng);
        let b = gbm(100.0, 0.0, 0.3, 1.0, &mut rng);
        assert_ne!(a, b);
    }

    proptest! {
        #[test]
        fn realizations_stay_positive(
            seed in any::<u64>(),
            s0 in 1.0f64..10_000.0,
            sigma in 0.0f64..1.0,
            t in 0.0f64..30.0,
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let p = jump_diffusion(s0, 0.02, sigma, t, 1.0, 0.2, &mut rng);
            prop_assert!(p > 0.0);
            prop_assert!(p.is_finite());
        }
    }
}
