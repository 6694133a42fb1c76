//! The module that contains the loss functions used to train and validate a
//! [Network](crate::Network).

pub mod mean_squared;

pub use mean_squared::MeanSquared;

use std::fmt::Debug;

use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

/// A trait representing the definitions of a function
/// for computing the loss/cost/error of a Network
pub trait LossFunction
where
    Self: Sync + Send + Debug,
{
    /// Computes the loss of a single sample
    fn compute_loss(&self, outputs: &[f32], expected_outputs: &[f32]) -> f32;

    /// Computes the derivative of the error with respect to one of the Network's outputs,
    ///
    /// dE/dO
    fn compute_loss_derivative_with_respect_to_output(
        &self,
        output: f32,
        expected_output: f32,
    ) -> f32;

    /// Computes the average of the loss for all of the samples.
    ///
    /// The per sample losses are computed in parallel but summed in order, so the same
    /// batch always yields the same loss.
    fn average_loss_for_samples(
        &self,
        sample_outputs: &[Vec<f32>],
        sample_expected_outputs: &[Vec<f32>],
    ) -> f32 {
        let samples_amount = sample_outputs.len();
        assert_eq!(samples_amount, sample_expected_outputs.len());

        let losses = sample_outputs
            .par_iter()
            .zip(sample_expected_outputs)
            .map(|(outputs, expected_outputs)| self.compute_loss(outputs, expected_outputs))
            .collect::<Vec<f32>>();

        losses.iter().sum::<f32>() / samples_amount as f32
    }

    /// Computes dE/dO for every output of every sample.
    fn loss_derivatives_for_samples(
        &self,
        sample_outputs: &[Vec<f32>],
        sample_expected_outputs: &[Vec<f32>],
    ) -> Vec<Vec<f32>> {
        assert_eq!(sample_outputs.len(), sample_expected_outputs.len());

        sample_outputs
            .par_iter()
            .zip(sample_expected_outputs)
            .map(|(outputs, expected_outputs)| {
                outputs
                    .iter()
                    .zip(expected_outputs)
                    .map(|(output, expected_output)| {
                        self.compute_loss_derivative_with_respect_to_output(
                            *output,
                            *expected_output,
                        )
                    })
                    .collect::<Vec<f32>>()
            })
            .collect::<Vec<Vec<f32>>>()
    }
}
