mod batch_skipping;
mod linear_regression;
mod registry;
mod weights;
