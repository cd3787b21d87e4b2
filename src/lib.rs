//! Picks a dark or light font for a background color.
//!
//! A two-layer network (3 inputs, 3 softplus hidden units, 2 logistic outputs) is fitted to
//! labeled colors with simulated annealing: one bounded scalar is nudged per iteration and the
//! move is kept or undone by the Metropolis test under a linearly cooling temperature.

pub mod annealing;
pub mod arch;
pub mod config;
pub mod dataset;
pub mod error;
pub mod params;
pub mod predict;

pub use annealing::{SearchLoop, SearchOutcome};
pub use config::SearchConfig;
pub use dataset::{ColorRecord, TrainingSet};
pub use error::{FontError, Result};
pub use params::ParamSnapshot;
pub use predict::{FontShade, predict, predict_probability};
