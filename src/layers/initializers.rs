//! The module that contains the parameter initializers used when building a
//! [Dense](crate::layers::Dense) layer.

use fuelnet_macros::FromForAllUnnamedVariants;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// The constant every bias starts at, so no unit begins uniformly inactive.
pub const DEFAULT_BIAS: f32 = 0.01;

/// A trait that is implemented for all of the parameter initializers.
pub trait InitializerTrait
where
    Self: std::fmt::Debug,
{
    /// Generates just one number for a layer with `fan_in` inputs.
    fn initialize_0d<R: Rng + ?Sized>(&self, fan_in: usize, rng: &mut R) -> f32;

    /// Generates a Vec of `count` numbers.
    fn initialize_1d<R: Rng + ?Sized>(&self, count: usize, fan_in: usize, rng: &mut R) -> Vec<f32> {
        (0..count).map(|_| self.initialize_0d(fan_in, &mut *rng)).collect()
    }

    /// Generates a `(rows x cols)` matrix.
    fn initialize_2d<R: Rng + ?Sized>(
        &self,
        shape: (usize, usize),
        fan_in: usize,
        rng: &mut R,
    ) -> Vec<Vec<f32>> {
        (0..shape.0)
            .map(|_| self.initialize_1d(shape.1, fan_in, &mut *rng))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Initializes every parameter with the same constant.
pub struct ConstantInitializer {
    /// The constant that all the parameters will be
    pub constant: f32,
}

impl ConstantInitializer {
    /// Creates a new Constant initializer
    pub fn new(constant: f32) -> Self {
        ConstantInitializer { constant }
    }
}

impl InitializerTrait for ConstantInitializer {
    fn initialize_0d<R: Rng + ?Sized>(&self, _fan_in: usize, _rng: &mut R) -> f32 {
        self.constant
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Draws from a zero-mean normal distribution with a standard deviation of
/// **sqrt(2.0 / fan_in)**, which keeps rectified units from dying out early.
pub struct HeNormalInitializer;

impl HeNormalInitializer {
    /// Creates a new He Normal initializer
    pub fn new() -> Self {
        HeNormalInitializer
    }

    /// The standard deviation used for a layer with `fan_in` inputs.
    pub fn standard_deviation(fan_in: usize) -> f32 {
        (2.0_f32 / fan_in as f32).sqrt()
    }
}

impl InitializerTrait for HeNormalInitializer {
    fn initialize_0d<R: Rng + ?Sized>(&self, fan_in: usize, rng: &mut R) -> f32 {
        let standard: f32 = StandardNormal.sample(rng);
        standard * Self::standard_deviation(fan_in)
    }
}

#[derive(Debug, Clone, PartialEq, FromForAllUnnamedVariants)]
/// The enum that contains all of the possible Initializers
pub enum Initializer {
    /// The Constant initializer
    Constant(ConstantInitializer),
    /// The He Normal initializer
    HeNormal(HeNormalInitializer),
}

impl InitializerTrait for Initializer {
    fn initialize_0d<R: Rng + ?Sized>(&self, fan_in: usize, rng: &mut R) -> f32 {
        match self {
            Initializer::Constant(i) => i.initialize_0d(fan_in, rng),
            Initializer::HeNormal(i) => i.initialize_0d(fan_in, rng),
        }
    }
}

impl Initializer {
    /// The initializer used for every weight matrix by default.
    pub fn weights() -> Self {
        HeNormalInitializer::new().into()
    }

    /// The initializer used for every bias row by default.
    pub fn biases() -> Self {
        ConstantInitializer::new(DEFAULT_BIAS).into()
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn constant_should_fill_every_value() {
        let mut rng = StdRng::seed_from_u64(7);
        let biases = Initializer::biases().initialize_2d((1, 5), 3, &mut rng);

        assert_eq!(biases, vec![vec![0.01; 5]]);
    }

    #[test]
    fn he_normal_should_scale_with_fan_in() {
        let mut rng = StdRng::seed_from_u64(42);
        let fan_in = 8;
        let values = HeNormalInitializer::new().initialize_1d(20_000, fan_in, &mut rng);

        let mean = values.iter().sum::<f32>() / values.len() as f32;
        let variance =
            values.iter().map(|x| (x - mean).powi(2)).sum::<f32>() / values.len() as f32;

        assert!(mean.abs() < 0.02, "mean was {}", mean);
        assert!(
            (variance - 2.0 / fan_in as f32).abs() < 0.02,
            "variance was {}",
            variance
        );
    }

    #[test]
    fn same_seed_should_give_same_weights() {
        let initializer = Initializer::weights();
        let first = initializer.initialize_2d((3, 4), 3, &mut StdRng::seed_from_u64(1));
        let second = initializer.initialize_2d((3, 4), 3, &mut StdRng::seed_from_u64(1));

        assert_eq!(first, second);
    }
}
