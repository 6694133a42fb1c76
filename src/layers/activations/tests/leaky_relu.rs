use crate::layers::activations::{leaky_relu, leaky_relu_derivative, Activation};

#[test]
fn should_be_x_when_x_is_positive() {
    for x in [1e-6_f32, 0.3, 1.0, 21.0, 4000.0] {
        assert_eq!(leaky_relu(x), x);
    }
}

#[test]
fn should_be_a_hundredth_of_x_when_x_is_not_positive() {
    for x in [-30.0_f32, -40.0, -1.0, -0.3, -0.99, 0.0] {
        assert_eq!(leaky_relu(x), 0.01 * x);
    }
}

#[test]
fn derivative_should_match_the_piecewise_definition() {
    let x: Vec<f32> = Vec::from([-30.0, 40.0, 21.0, -0.3, -0.99, 0.0]);
    let expected_derivatives: Vec<f32> = Vec::from([0.01, 1.0, 1.0, 0.01, 0.01, 0.01]);

    for (value, expected) in x.iter().zip(&expected_derivatives) {
        assert_eq!(leaky_relu_derivative(*value), *expected);
        assert_eq!(Activation::LeakyReLU.differential(*value), *expected);
    }
}

#[test]
fn should_activate_whole_batches() {
    let pre_activations = vec![vec![-2.0_f32, 3.0], vec![0.5, -0.5]];

    let activated = Activation::LeakyReLU.activate(&pre_activations);
    let differentials = Activation::LeakyReLU.differentials(&pre_activations);

    assert_eq!(activated, vec![vec![-0.02, 3.0], vec![0.5, -0.005]]);
    assert_eq!(differentials, vec![vec![0.01, 1.0], vec![1.0, 0.01]]);
}

#[test]
fn should_be_the_default_activation() {
    assert_eq!(Activation::default(), Activation::LeakyReLU);
}
