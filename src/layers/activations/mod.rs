//! The module that contains the activations a [Dense](crate::layers::Dense) layer can apply:
//!
//! - Leaky ReLU, used by every hidden layer
//! - Identity, normally used by the output layer of a regression network

pub mod leaky_relu;

pub use leaky_relu::{leaky_relu, leaky_relu_derivative, LEAKY_RELU_SLOPE};

use crate::utils::MatrixOperations;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// The activation applied on top of a layer's affine transform.
pub enum Activation {
    /// `f(x) = x` for `x > 0`, `0.01 * x` otherwise.
    #[default]
    LeakyReLU,
    /// `f(x) = x`.
    Identity,
}

impl Activation {
    /// Applies the activation to a single pre-activation value.
    pub fn function(&self, x: f32) -> f32 {
        match self {
            Activation::LeakyReLU => leaky_relu(x),
            Activation::Identity => x,
        }
    }

    /// The derivative of the activation with respect to its input, which must be the
    /// pre-activation `Z` and never the activated value.
    pub fn differential(&self, x: f32) -> f32 {
        match self {
            Activation::LeakyReLU => leaky_relu_derivative(x),
            Activation::Identity => 1.0,
        }
    }

    /// Applies the activation to every value of a batch of pre-activations.
    pub fn activate(&self, pre_activations: &[Vec<f32>]) -> Vec<Vec<f32>> {
        let activation = *self;
        pre_activations.map_values(move |x| activation.function(x))
    }

    /// The derivatives for every value of a batch of pre-activations.
    pub fn differentials(&self, pre_activations: &[Vec<f32>]) -> Vec<Vec<f32>> {
        let activation = *self;
        pre_activations.map_values(move |x| activation.differential(x))
    }
}
