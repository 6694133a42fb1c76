/// Element-wise helpers over `[f32]`, used for bias rows.
pub trait VectorOperations {
    fn subtract(&self, against: &[f32]) -> Vec<f32>;

    fn multiply_number(&self, factor: f32) -> Vec<f32>;

    fn divide_number(&self, factor: f32) -> Vec<f32>;
}

impl VectorOperations for [f32] {
    fn subtract(&self, against: &[f32]) -> Vec<f32> {
        self.iter().zip(against).map(|(a, b)| a - b).collect()
    }

    fn multiply_number(&self, factor: f32) -> Vec<f32> {
        self.iter().map(|x| x * factor).collect()
    }

    fn divide_number(&self, factor: f32) -> Vec<f32> {
        self.iter().map(|x| x / factor).collect()
    }
}

#[test]
fn should_apply_element_wise_operations() {
    let biases: Vec<f32> = vec![1.0, -2.0, 0.5];

    assert_eq!(biases.subtract(&[0.5, 0.5, 0.5]), vec![0.5, -2.5, 0.0]);
    assert_eq!(biases.multiply_number(2.0), vec![2.0, -4.0, 1.0]);
    assert_eq!(biases.divide_number(4.0), vec![0.25, -0.5, 0.125]);
}
