use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};
use rand::{SeedableRng, rngs::StdRng};

use super::Schedule;
use crate::{
    arch::{
        self,
        loss::{LossFn, Mse},
    },
    config::SearchConfig,
    dataset::TrainingSet,
    error::{FontError, Result},
    params::{ParamSnapshot, ParameterSpace},
};

/// The scalar state of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchState {
    /// Iterations completed so far.
    pub iteration: usize,
    /// Temperature the next iteration will use.
    pub temperature: f64,
    /// Loss of the currently accepted snapshot.
    pub current_loss: f64,
    /// Lowest loss observed so far.
    pub best_loss: f64,
}

/// What a single iteration did with its perturbation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Kept, and it beats every loss seen so far.
    NewBest,
    /// Kept because it improves on the current loss.
    Improved,
    /// Kept although it is worse, the annealing test let it through.
    AcceptedWorse,
    /// Undone.
    Reverted,
}

/// Per-outcome counters of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub new_best: usize,
    pub improved: usize,
    pub accepted_worse: usize,
    pub reverted: usize,
}

impl SearchStats {
    fn record(&mut self, outcome: StepOutcome) {
        match outcome {
            StepOutcome::NewBest => self.new_best += 1,
            StepOutcome::Improved => self.improved += 1,
            StepOutcome::AcceptedWorse => self.accepted_worse += 1,
            StepOutcome::Reverted => self.reverted += 1,
        }
    }

    /// Total amount of recorded iterations.
    pub fn total(&self) -> usize {
        self.new_best + self.improved + self.accepted_worse + self.reverted
    }
}

/// The result of a finished (or interrupted) run.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// The best snapshot seen, not necessarily the last accepted one.
    pub best: ParamSnapshot,
    pub best_loss: f64,
    /// Loss of the snapshot the search started from.
    pub initial_loss: f64,
    pub state: SearchState,
    pub stats: SearchStats,
    /// True if the stop flag ended the run before the budget was spent.
    pub stopped_early: bool,
}

/// Drives simulated annealing over a [`ParamSnapshot`].
///
/// Owns both the snapshot being perturbed in place and a deep copy of the best one seen. The
/// forward pass and the loss only ever get shared borrows of them.
pub struct SearchLoop<'a, L: LossFn = Mse> {
    config: SearchConfig,
    data: &'a TrainingSet,
    loss_fn: L,
    space: ParameterSpace,
    schedule: Schedule,
    rng: StdRng,
    current: ParamSnapshot,
    best: ParamSnapshot,
    state: SearchState,
    initial_loss: f64,
    stats: SearchStats,
}

impl<'a> SearchLoop<'a, Mse> {
    /// Creates a new search scored with the mean squared error.
    ///
    /// The starting snapshot is drawn from the seeded generator, so the same configuration
    /// always produces the same run.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the starting loss is not finite.
    pub fn new(config: SearchConfig, data: &'a TrainingSet) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let start = ParamSnapshot::random(&mut rng);
        Self::build(config, data, Mse::new(), rng, start)
    }

    /// Creates a new search starting from a given snapshot instead of a random one.
    ///
    /// The generator seeded from `config.seed` only drives the search, so the perturbations
    /// differ from those of [`SearchLoop::new`] with the same seed.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid, `start` is outside the block bounds or
    /// its loss is not finite.
    pub fn with_snapshot(
        config: SearchConfig,
        data: &'a TrainingSet,
        start: ParamSnapshot,
    ) -> Result<Self> {
        let rng = StdRng::seed_from_u64(config.seed);
        Self::build(config, data, Mse::new(), rng, start)
    }
}

impl<'a, L: LossFn> SearchLoop<'a, L> {
    /// Creates a new search scored with a custom loss function.
    pub fn with_loss(config: SearchConfig, data: &'a TrainingSet, loss_fn: L) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let start = ParamSnapshot::random(&mut rng);
        Self::build(config, data, loss_fn, rng, start)
    }

    fn build(
        config: SearchConfig,
        data: &'a TrainingSet,
        loss_fn: L,
        rng: StdRng,
        start: ParamSnapshot,
    ) -> Result<Self> {
        config.validate()?;
        if data.is_empty() {
            return Err(FontError::EmptyTrainingSet);
        }
        if !start.within_bounds() {
            return Err(FontError::InvalidSnapshot(
                "starting snapshot is outside the block bounds".to_owned(),
            ));
        }

        let space = ParameterSpace::new(config.learning_rate)?;
        let schedule = Schedule::new(config.initial_temperature, config.iterations)?;

        let initial_loss = score(&loss_fn, data, &start);
        if !initial_loss.is_finite() {
            return Err(FontError::NonFiniteLoss {
                iteration: 0,
                loss: initial_loss,
            });
        }

        let state = SearchState {
            iteration: 0,
            temperature: schedule.temperature(),
            current_loss: initial_loss,
            best_loss: initial_loss,
        };

        Ok(Self {
            config,
            data,
            loss_fn,
            space,
            schedule,
            rng,
            best: start.clone(),
            current: start,
            state,
            initial_loss,
            stats: SearchStats::default(),
        })
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The snapshot currently being perturbed.
    pub fn current(&self) -> &ParamSnapshot {
        &self.current
    }

    /// The best snapshot seen so far.
    pub fn best(&self) -> &ParamSnapshot {
        &self.best
    }

    pub fn initial_loss(&self) -> f64 {
        self.initial_loss
    }

    /// True once the iteration budget has been spent.
    pub fn is_finished(&self) -> bool {
        self.state.iteration >= self.config.iterations.get()
    }

    /// Runs exactly one perturb / score / accept-or-revert iteration.
    ///
    /// Stepping past the budget keeps working, at zero temperature.
    ///
    /// # Errors
    /// Returns `FontError::NonFiniteLoss` if the perturbed snapshot scores NaN or infinity.
    /// The perturbation is reverted first, so the snapshots stay consistent.
    pub fn step(&mut self) -> Result<StepOutcome> {
        let iteration = self.state.iteration;
        let current_loss = self.state.current_loss;

        let perturbation = self.space.select_perturbation(&mut self.rng);
        let applied = self.space.apply_clamped(&mut self.current, perturbation);
        let candidate = score(&self.loss_fn, self.data, &self.current);

        if !candidate.is_finite() {
            self.space.revert(&mut self.current, &applied);
            return Err(FontError::NonFiniteLoss {
                iteration,
                loss: candidate,
            });
        }

        let outcome = if candidate < self.state.best_loss {
            debug!(
                iteration = iteration, temperature = self.schedule.temperature();
                "new best loss {current_loss} -> {candidate}"
            );
            self.best.clone_from(&self.current);
            self.state.best_loss = candidate;
            self.state.current_loss = candidate;
            StepOutcome::NewBest
        } else if candidate < current_loss {
            self.state.current_loss = candidate;
            StepOutcome::Improved
        } else if self.schedule.accept(current_loss, candidate, &mut self.rng) {
            self.state.current_loss = candidate;
            StepOutcome::AcceptedWorse
        } else {
            self.space.revert(&mut self.current, &applied);
            StepOutcome::Reverted
        };

        self.stats.record(outcome);
        self.schedule.advance();
        self.state.iteration += 1;
        self.state.temperature = self.schedule.temperature();

        Ok(outcome)
    }

    /// Spends the whole remaining budget.
    pub fn run(self) -> Result<SearchOutcome> {
        self.run_until(&AtomicBool::new(false))
    }

    /// Spends the remaining budget, or stops early once `stop` is set.
    ///
    /// The flag is only checked between iterations, so the returned snapshots are always fully
    /// applied or fully reverted.
    pub fn run_until(mut self, stop: &AtomicBool) -> Result<SearchOutcome> {
        info!(
            "annealing {} parameters over {} samples: iterations={} temperature={} lr={} seed={}",
            crate::params::SCALAR_COUNT,
            self.data.len(),
            self.config.iterations,
            self.config.initial_temperature,
            self.config.learning_rate,
            self.config.seed,
        );
        info!("initial loss {}", self.initial_loss);

        let mut stopped_early = false;
        while !self.is_finished() {
            if stop.load(Ordering::Relaxed) {
                warn!("stop requested after {} iterations", self.state.iteration);
                stopped_early = true;
                break;
            }

            self.step()?;

            let due = self
                .config
                .progress_every
                .is_some_and(|every| self.state.iteration % every.get() == 0);

            if due {
                let SearchState {
                    iteration,
                    temperature,
                    current_loss,
                    best_loss,
                } = self.state;
                info!(
                    iteration = iteration, temperature = temperature;
                    "current loss {current_loss}, best loss {best_loss}"
                );
            }
        }

        info!(
            "search finished: best loss {} (started at {}), stats {:?}",
            self.state.best_loss, self.initial_loss, self.stats
        );

        Ok(self.into_outcome(stopped_early))
    }

    fn into_outcome(self, stopped_early: bool) -> SearchOutcome {
        SearchOutcome {
            best: self.best,
            best_loss: self.state.best_loss,
            initial_loss: self.initial_loss,
            state: self.state,
            stats: self.stats,
            stopped_early,
        }
    }
}

/// Evaluates `snapshot` over the whole training set.
pub(crate) fn score<L: LossFn>(loss_fn: &L, data: &TrainingSet, snapshot: &ParamSnapshot) -> f64 {
    let y_pred = arch::evaluate(snapshot, data.inputs());
    loss_fn.loss(y_pred.view(), data.targets())
}
