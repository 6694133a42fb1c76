//! The leaky rectified linear unit.

/// The slope applied to non-positive inputs.
pub const LEAKY_RELU_SLOPE: f32 = 0.01;

/// `x` when `x > 0`, `0.01 * x` otherwise.
pub fn leaky_relu(x: f32) -> f32 {
    if x > 0.0 {
        x
    } else {
        LEAKY_RELU_SLOPE * x
    }
}

/// The derivative of [`leaky_relu`], evaluated on the pre-activation.
pub fn leaky_relu_derivative(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else {
        LEAKY_RELU_SLOPE
    }
}
