//! Simulated annealing over the parameter space.
//!
//! [`Schedule`] owns the linear temperature curve and the Metropolis test, [`SearchLoop`] drives
//! the perturb / score / accept-or-revert cycle and keeps the best snapshot it has seen.

mod schedule;
mod search;

pub use schedule::{MIN_TEMPERATURE, Schedule, acceptance_probability, metropolis};
pub use search::{SearchLoop, SearchOutcome, SearchState, SearchStats, StepOutcome};
