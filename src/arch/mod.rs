pub mod activations;
pub mod forward;
pub mod loss;

pub use forward::{evaluate, evaluate_one};
