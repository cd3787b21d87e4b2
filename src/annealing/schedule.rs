use std::num::NonZeroUsize;

use rand::Rng;

use crate::error::{FontError, Result};

/// Temperatures at or below this value only accept strict improvements.
pub const MIN_TEMPERATURE: f64 = 1e-12;

/// Probability of moving from `current` to `candidate` at `temperature`.
///
/// Strict improvements are always taken. Otherwise `exp(-(candidate - current) / temperature)`,
/// which collapses to 0 once the temperature reaches [`MIN_TEMPERATURE`].
pub fn acceptance_probability(current: f64, candidate: f64, temperature: f64) -> f64 {
    if candidate < current {
        1.
    } else if temperature <= MIN_TEMPERATURE {
        0.
    } else {
        (-(candidate - current) / temperature).exp()
    }
}

/// The Metropolis test for a uniform `draw` in `[0, 1)`.
#[inline]
pub fn metropolis(current: f64, candidate: f64, temperature: f64, draw: f64) -> bool {
    draw < acceptance_probability(current, candidate, temperature)
}

/// A linear cooling schedule.
///
/// Starts at `initial_temperature` and loses `initial_temperature / total_steps` on every
/// [`Schedule::advance`], reaching zero after `total_steps` advances. It is never reset.
#[derive(Debug, Clone)]
pub struct Schedule {
    initial: f64,
    decrement: f64,
    steps: usize,
    temperature: f64,
}

impl Schedule {
    /// Creates a new `Schedule`.
    ///
    /// # Arguments
    /// * `initial_temperature` - The temperature of the first step.
    /// * `total_steps` - The amount of steps until the temperature reaches zero.
    ///
    /// # Returns
    /// An error if `initial_temperature` is not finite and strictly positive.
    pub fn new(initial_temperature: f64, total_steps: NonZeroUsize) -> Result<Self> {
        if !(initial_temperature.is_finite() && initial_temperature > 0.) {
            return Err(FontError::InvalidConfig(format!(
                "initial_temperature must be finite and > 0, got {initial_temperature}"
            )));
        }

        Ok(Self {
            initial: initial_temperature,
            decrement: initial_temperature / total_steps.get() as f64,
            steps: 0,
            temperature: initial_temperature,
        })
    }

    #[inline]
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    #[inline]
    pub fn initial_temperature(&self) -> f64 {
        self.initial
    }

    #[inline]
    pub fn decrement(&self) -> f64 {
        self.decrement
    }

    /// Moves one step down the curve. Never goes below zero.
    pub fn advance(&mut self) {
        self.steps += 1;
        // Recomputed from the step count so rounding does not accumulate.
        self.temperature = (self.initial - self.decrement * self.steps as f64).max(0.);
    }

    /// Decides whether to keep a move at the current temperature.
    ///
    /// A uniform number is drawn from `rng` only when the outcome is actually random, i.e.
    /// for non-improving moves above [`MIN_TEMPERATURE`].
    pub fn accept<R: Rng>(&self, current: f64, candidate: f64, rng: &mut R) -> bool {
        if candidate < current {
            return true;
        }
        if self.temperature <= MIN_TEMPERATURE {
            return false;
        }

        let draw: f64 = rng.random();
        metropolis(current, candidate, self.temperature, draw)
    }
}
