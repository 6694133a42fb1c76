use rand::{rngs::StdRng, SeedableRng};

use crate::{
    layers::initializers::ConstantInitializer,
    network::{Network, Topology},
};

#[test]
fn should_fit_a_linear_relation_and_extrapolate() {
    // starts out as f(x) = 2x + 0.07 with every unit active for x >= 0
    let mut network = Network::with_initializers(
        Topology::new(1, 1, 1, 4),
        &ConstantInitializer::new(0.5).into(),
        &ConstantInitializer::new(0.01).into(),
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap();

    let inputs: Vec<Vec<f32>> = (0..5).map(|x| vec![x as f32]).collect();
    let outputs: Vec<Vec<f32>> = (0..5).map(|x| vec![3.0 * x as f32]).collect();

    let mut checkpoints = Vec::new();
    let mut last_loss = f32::INFINITY;
    for iteration in 0..3000 {
        last_loss = network.backward(&inputs, &outputs, 1e-3, 1e-4).unwrap();
        if iteration % 250 == 0 {
            checkpoints.push(last_loss);
        }
    }

    for pair in checkpoints.windows(2) {
        assert!(pair[1] < pair[0], "loss went from {} to {}", pair[0], pair[1]);
    }
    assert!(last_loss < 1e-3, "loss was still {}", last_loss);

    let extrapolated = network.feed_forward(&[vec![15.0]]).unwrap()[0][0];
    assert!(
        (extrapolated - 45.0).abs() < 0.5,
        "predicted {} for 15",
        extrapolated
    );
}
