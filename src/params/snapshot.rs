use ndarray::Array2;
use rand::Rng;

use super::{Block, Coord};
use crate::error::{FontError, Result};

/// One complete assignment of values to every tunable parameter.
///
/// `Clone` is a deep copy, which is how the search keeps its best-ever solution apart from the
/// snapshot it perturbs in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSnapshot {
    pub(crate) hidden_weights: Array2<f64>,
    pub(crate) output_weights: Array2<f64>,
    pub(crate) hidden_bias: Array2<f64>,
    pub(crate) output_bias: Array2<f64>,
}

impl ParamSnapshot {
    /// Samples every entry uniformly in `[0, 1)`, which lies inside every block's bounds.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let mut sample =
            |block: Block| Array2::from_shape_simple_fn(block.shape(), || rng.random::<f64>());

        Self {
            hidden_weights: sample(Block::HiddenWeight),
            output_weights: sample(Block::OutputWeight),
            hidden_bias: sample(Block::HiddenBias),
            output_bias: sample(Block::OutputBias),
        }
    }

    /// Builds a snapshot from explicit blocks.
    ///
    /// # Errors
    /// Returns `FontError::InvalidSnapshot` if a block has the wrong shape or an entry that is
    /// not finite or lies outside the block's bounds.
    pub fn from_blocks(
        hidden_weights: Array2<f64>,
        output_weights: Array2<f64>,
        hidden_bias: Array2<f64>,
        output_bias: Array2<f64>,
    ) -> Result<Self> {
        let snapshot = Self {
            hidden_weights,
            output_weights,
            hidden_bias,
            output_bias,
        };

        for block in Block::ALL {
            let array = snapshot.block(block);
            if array.dim() != block.shape() {
                return Err(FontError::InvalidSnapshot(format!(
                    "{} has shape {:?}, expected {:?}",
                    block.name(),
                    array.dim(),
                    block.shape()
                )));
            }

            let (low, high) = block.bounds();
            if let Some(v) = array.iter().find(|v| !(low..=high).contains(*v)) {
                return Err(FontError::InvalidSnapshot(format!(
                    "{} holds {v}, expected a value in [{low}, {high}]",
                    block.name()
                )));
            }
        }

        Ok(snapshot)
    }

    /// Returns a read-only view of a whole block.
    pub fn block(&self, block: Block) -> &Array2<f64> {
        match block {
            Block::HiddenWeight => &self.hidden_weights,
            Block::OutputWeight => &self.output_weights,
            Block::HiddenBias => &self.hidden_bias,
            Block::OutputBias => &self.output_bias,
        }
    }

    pub(crate) fn block_mut(&mut self, block: Block) -> &mut Array2<f64> {
        match block {
            Block::HiddenWeight => &mut self.hidden_weights,
            Block::OutputWeight => &mut self.output_weights,
            Block::HiddenBias => &mut self.hidden_bias,
            Block::OutputBias => &mut self.output_bias,
        }
    }

    /// Returns the scalar at `coord`.
    ///
    /// Panics if the coordinate is outside the block's shape.
    #[inline]
    pub fn get(&self, coord: Coord) -> f64 {
        self.block(coord.block)[[coord.row, coord.col]]
    }

    /// True if every entry lies inside its block's bounds.
    pub fn within_bounds(&self) -> bool {
        Block::ALL.into_iter().all(|block| {
            let (low, high) = block.bounds();
            self.block(block).iter().all(|v| (low..=high).contains(v))
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn random_snapshot_has_block_shapes_and_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let snapshot = ParamSnapshot::random(&mut rng);

        for block in Block::ALL {
            assert_eq!(snapshot.block(block).dim(), block.shape());
        }
        assert!(snapshot.within_bounds());
    }

    #[test]
    fn same_seed_same_snapshot() {
        let a = ParamSnapshot::random(&mut StdRng::seed_from_u64(7));
        let b = ParamSnapshot::random(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn from_blocks_rejects_bad_shape() {
        let res = ParamSnapshot::from_blocks(
            Array2::zeros((3, 3)),
            Array2::zeros((3, 2)),
            Array2::zeros((3, 1)),
            Array2::zeros((2, 1)),
        );
        assert!(matches!(res, Err(FontError::InvalidSnapshot(_))));
    }

    #[test]
    fn from_blocks_rejects_out_of_bounds_bias() {
        let res = ParamSnapshot::from_blocks(
            Array2::from_elem((3, 3), -1.),
            Array2::from_elem((2, 3), 1.),
            Array2::from_elem((3, 1), -0.5),
            Array2::zeros((2, 1)),
        );
        assert!(matches!(res, Err(FontError::InvalidSnapshot(_))));
    }

    #[test]
    fn from_blocks_accepts_bound_values() {
        let snapshot = ParamSnapshot::from_blocks(
            Array2::from_elem((3, 3), -1.),
            Array2::from_elem((2, 3), 1.),
            Array2::zeros((3, 1)),
            Array2::ones((2, 1)),
        )
        .unwrap();
        assert!(snapshot.within_bounds());
    }
}
