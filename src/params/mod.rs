//! The bounded parameter space of the network.
//!
//! Four blocks make up a [`ParamSnapshot`]: the hidden weights and bias feeding the softplus
//! layer, and the output weights and bias feeding the logistic layer. [`ParameterSpace`] picks
//! and applies single-scalar perturbations while keeping every entry inside its block's bounds.

mod block;
mod snapshot;
mod space;

pub use block::{Block, Coord, HIDDEN, INPUTS, OUTPUTS, SCALAR_COUNT};
pub use snapshot::ParamSnapshot;
pub use space::{Applied, ParameterSpace, Perturbation};
