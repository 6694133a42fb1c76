//! Just a module with a few utilities that make writing code easier through out fuelnet

pub mod approx_eq;
pub mod matrix_operations;
pub mod vector_operations;

pub use matrix_operations::MatrixOperations;
pub use vector_operations::VectorOperations;
