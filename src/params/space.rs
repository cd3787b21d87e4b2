use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use super::{Coord, ParamSnapshot, SCALAR_COUNT};
use crate::error::{FontError, Result};

/// A proposed change of a single scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perturbation {
    pub coord: Coord,
    pub delta: f64,
}

/// The record of a perturbation that was written into a snapshot.
///
/// Holds everything needed to undo it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Applied {
    pub coord: Coord,
    /// The change actually made, smaller in magnitude than requested when clamped.
    pub effective_delta: f64,
    /// The value the scalar held before the perturbation.
    pub previous: f64,
}

/// Proposes, applies and undoes single-scalar moves inside the block bounds.
#[derive(Debug, Clone, Copy)]
pub struct ParameterSpace {
    learning_rate: f64,
}

impl ParameterSpace {
    /// Creates a new `ParameterSpace`.
    ///
    /// # Arguments
    /// * `learning_rate` - Scale applied to the standard normal step.
    ///
    /// # Returns
    /// An error if `learning_rate` is not finite and strictly positive.
    pub fn new(learning_rate: f64) -> Result<Self> {
        if !(learning_rate.is_finite() && learning_rate > 0.) {
            return Err(FontError::InvalidConfig(format!(
                "learning_rate must be finite and > 0, got {learning_rate}"
            )));
        }

        Ok(Self { learning_rate })
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Picks one of the twenty scalars uniformly and a normally distributed step.
    ///
    /// Every block is therefore chosen with a probability proportional to its size.
    pub fn select_perturbation<R: Rng>(&self, rng: &mut R) -> Perturbation {
        let index = rng.random_range(0..SCALAR_COUNT);
        let Some(coord) = Coord::from_flat(index) else {
            unreachable!("flat index {index} is below {SCALAR_COUNT}");
        };

        let step: f64 = StandardNormal.sample(rng);
        Perturbation {
            coord,
            delta: step * self.learning_rate,
        }
    }

    /// Adds the perturbation to its scalar, clamping the result to the block's bounds.
    ///
    /// # Returns
    /// The record needed by [`ParameterSpace::revert`].
    pub fn apply_clamped(&self, snapshot: &mut ParamSnapshot, perturbation: Perturbation) -> Applied {
        let Perturbation { coord, delta } = perturbation;
        let (low, high) = coord.block.bounds();

        let cell = &mut snapshot.block_mut(coord.block)[[coord.row, coord.col]];
        let previous = *cell;
        let updated = (previous + delta).clamp(low, high);
        *cell = updated;

        Applied {
            coord,
            effective_delta: updated - previous,
            previous,
        }
    }

    /// Undoes an applied perturbation.
    ///
    /// The prior value is restored bit for bit, floating point subtraction of the effective
    /// delta is only checked against it.
    pub fn revert(&self, snapshot: &mut ParamSnapshot, applied: &Applied) {
        let coord = applied.coord;
        let cell = &mut snapshot.block_mut(coord.block)[[coord.row, coord.col]];

        debug_assert!(
            ((*cell - applied.effective_delta) - applied.previous).abs() <= 1e-9,
            "snapshot drifted at {coord:?}: {} - {} != {}",
            *cell,
            applied.effective_delta,
            applied.previous
        );

        *cell = applied.previous;
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::params::Block;

    fn space() -> ParameterSpace {
        ParameterSpace::new(0.01).unwrap()
    }

    fn snapshot() -> ParamSnapshot {
        ParamSnapshot::from_blocks(
            Array2::from_elem((3, 3), 0.25),
            Array2::from_elem((2, 3), 0.25),
            Array2::from_elem((3, 1), 0.5),
            Array2::from_elem((2, 1), 0.5),
        )
        .unwrap()
    }

    fn coord(block: Block, row: usize, col: usize) -> Coord {
        Coord { block, row, col }
    }

    #[test]
    fn rejects_invalid_learning_rate() {
        assert!(ParameterSpace::new(0.).is_err());
        assert!(ParameterSpace::new(-0.1).is_err());
        assert!(ParameterSpace::new(f64::NAN).is_err());
        assert!(ParameterSpace::new(f64::INFINITY).is_err());
    }

    #[test]
    fn unclamped_step_is_applied_in_full() {
        let mut snap = snapshot();
        let c = coord(Block::HiddenWeight, 1, 2);
        let before = snap.get(c);

        let applied = space().apply_clamped(&mut snap, Perturbation { coord: c, delta: 1e-3 });

        assert_eq!(applied.previous, before);
        assert_eq!(snap.get(c), before + 1e-3);
        assert_eq!(applied.effective_delta, snap.get(c) - before);
    }

    #[test]
    fn weight_is_clamped_to_upper_and_lower_bound() {
        let mut snap = snapshot();
        let c = coord(Block::OutputWeight, 0, 1);
        let before = snap.get(c);

        let applied = space().apply_clamped(&mut snap, Perturbation { coord: c, delta: 5. });
        assert_eq!(snap.get(c), 1.);
        assert_eq!(applied.effective_delta, 1. - before);

        let applied = space().apply_clamped(&mut snap, Perturbation { coord: c, delta: -7. });
        assert_eq!(snap.get(c), -1.);
        assert_eq!(applied.effective_delta, -2.);
    }

    #[test]
    fn bias_is_clamped_to_zero() {
        let mut snap = snapshot();
        let c = coord(Block::HiddenBias, 2, 0);

        space().apply_clamped(&mut snap, Perturbation { coord: c, delta: -3. });
        assert_eq!(snap.get(c), 0.);
    }

    #[test]
    fn revert_restores_exact_value_for_any_delta() {
        let space = space();
        let mut rng = StdRng::seed_from_u64(11);
        let deltas = [0., 1e-300, -1e-300, 1e-3, -0.5, 0.999, 2., -2., 1e6, -1e6];

        for index in 0..SCALAR_COUNT {
            let c = Coord::from_flat(index).unwrap();
            for &delta in &deltas {
                let mut snap = ParamSnapshot::random(&mut rng);
                let original = snap.clone();

                let applied = space.apply_clamped(&mut snap, Perturbation { coord: c, delta });
                assert!(snap.within_bounds());
                space.revert(&mut snap, &applied);

                assert_eq!(snap, original, "drift at {c:?} with delta {delta}");
                assert_eq!(snap.get(c).to_bits(), original.get(c).to_bits());
            }
        }
    }

    #[test]
    fn revert_restores_values_sitting_on_a_bound() {
        let space = space();
        let mut snap = snapshot();
        let c = coord(Block::OutputBias, 1, 0);

        space.apply_clamped(&mut snap, Perturbation { coord: c, delta: 10. });
        assert_eq!(snap.get(c), 1.);

        let applied = space.apply_clamped(&mut snap, Perturbation { coord: c, delta: 0.4 });
        assert_eq!(applied.effective_delta, 0.);
        space.revert(&mut snap, &applied);
        assert_eq!(snap.get(c), 1.);
    }

    #[test]
    fn selection_is_proportional_to_block_size() {
        const DRAWS: usize = 200_000;

        let space = space();
        let mut rng = StdRng::seed_from_u64(99);
        let mut counts = [0usize; 4];

        for _ in 0..DRAWS {
            let p = space.select_perturbation(&mut rng);
            let idx = Block::ALL.iter().position(|b| *b == p.coord.block).unwrap();
            counts[idx] += 1;
        }

        for (block, count) in Block::ALL.into_iter().zip(counts) {
            let expected = block.len() as f64 / SCALAR_COUNT as f64;
            let observed = count as f64 / DRAWS as f64;
            assert!(
                (observed - expected).abs() < 0.01,
                "{block:?}: observed {observed}, expected {expected}"
            );
        }
    }

    #[test]
    fn step_size_scales_with_learning_rate() {
        let space = ParameterSpace::new(1e-3).unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        let mean_abs = (0..10_000)
            .map(|_| space.select_perturbation(&mut rng).delta.abs())
            .sum::<f64>()
            / 10_000.;

        // E|N(0, 1)| = sqrt(2 / pi) ~ 0.798
        assert!((mean_abs / 1e-3 - 0.798).abs() < 0.05, "mean |delta| {mean_abs}");
    }

    #[test]
    fn bounds_hold_after_many_cycles() {
        let space = ParameterSpace::new(0.5).unwrap();
        let mut rng = StdRng::seed_from_u64(21);
        let mut snap = snapshot();

        for i in 0..10_000 {
            let p = space.select_perturbation(&mut rng);
            let applied = space.apply_clamped(&mut snap, p);
            if i % 3 == 0 {
                space.revert(&mut snap, &applied);
            }
            assert!(snap.within_bounds());
        }
    }
}
