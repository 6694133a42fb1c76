//! The module that contains the layers a [Network](crate::Network) is stacked from.

pub mod activations;
pub mod dense;
pub mod initializers;

pub use activations::Activation;
pub use dense::{Dense, LayerParameters};
pub use initializers::{Initializer, InitializerTrait};

/// A layer can be defined basically as function receiving some input
/// and giving an output, something can be called a 'Layer' if it does that
pub trait Layer {
    /// Gets the last input samples that were used in the 'propagate' method,
    /// having this getter forces a struct that implements Layer to save its
    /// inputs on propagate
    fn get_last_inputs(&self) -> &[Vec<f32>];

    /// Gets the pre-activation values `Z` computed in the last 'propagate'
    fn get_last_pre_activations(&self) -> &[Vec<f32>];

    /// Gets the last output samples that were the result in the 'propagate' method
    fn get_last_outputs(&self) -> &[Vec<f32>];

    /// Gets the amount of inputs this layer is expected to receive
    fn get_inputs_amount(&self) -> usize;

    /// Gets the amount of outputs this layer results in on propagation
    fn get_outputs_amount(&self) -> usize;

    /// Calculates the outputs of the layer for a batch of `m >= 1` input samples and
    /// caches everything that the following 'back_propagate' needs.
    fn propagate(&mut self, inputs: &[Vec<f32>]) -> Vec<Vec<f32>>;

    /// Calculates the same outputs as 'propagate' without touching the cache, so that
    /// a shared layer can serve predictions.
    fn evaluate(&self, inputs: &[Vec<f32>]) -> Vec<Vec<f32>>;

    /// The activation's derivatives over the cached pre-activations, `f'(Z)`.
    fn activation_derivatives(&self) -> Vec<Vec<f32>>;

    /// Should calculate and apply the gradients,
    /// receiving the derivatives of the loss with respect to the pre-activations
    /// (the delta) and then return the derivatives of the loss with respect to the inputs.
    ///
    /// dE/dI <- back_propagate <- dE/dZ
    ///
    /// The returned derivatives are computed with the weights as they were *before*
    /// this update, and the returning part can be disabled when there is no other layer
    /// before this one.
    ///
    /// Only valid right after a 'propagate' over the same batch.
    fn back_propagate(
        &mut self,
        should_calculate_input_to_error_derivative: bool,
        layer_delta: &[Vec<f32>],
        learning_rate: f32,
        weight_decay: f32,
    ) -> Option<Vec<Vec<f32>>>;
}
