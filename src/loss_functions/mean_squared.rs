use super::LossFunction;

#[derive(Debug, Clone, Copy, Default)]
/// The mean squared error, the only loss a [Network](crate::Network) is trained on.
pub struct MeanSquared;

impl MeanSquared {
    /// Creates a new Mean Squared loss function
    pub fn new() -> Self {
        MeanSquared
    }
}

impl LossFunction for MeanSquared {
    fn compute_loss(&self, outputs: &[f32], expected_outputs: &[f32]) -> f32 {
        let outputs_amount = outputs.len();
        assert_eq!(outputs_amount, expected_outputs.len());

        outputs
            .iter()
            .zip(expected_outputs)
            .map(|(output, expected)| (output - expected).powi(2))
            .sum::<f32>()
            / outputs_amount as f32
    }

    /// The raw residual `output - expected`.
    ///
    /// The factor of two from differentiating the square is left out on purpose and is
    /// absorbed by the learning rate; weights trained so far depend on this scaling.
    fn compute_loss_derivative_with_respect_to_output(
        &self,
        output: f32,
        expected_output: f32,
    ) -> f32 {
        output - expected_output
    }
}
