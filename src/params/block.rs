/// Number of input features (red, green, blue).
pub const INPUTS: usize = 3;
/// Width of the softplus layer.
pub const HIDDEN: usize = 3;
/// Number of output channels (dark, light).
pub const OUTPUTS: usize = 2;

/// Total amount of tunable scalars across all blocks.
pub const SCALAR_COUNT: usize = Block::ALL[0].len()
    + Block::ALL[1].len()
    + Block::ALL[2].len()
    + Block::ALL[3].len();

/// One of the four parameter blocks of the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Block {
    HiddenWeight,
    OutputWeight,
    HiddenBias,
    OutputBias,
}

impl Block {
    /// Every block, in flattening order.
    pub const ALL: [Block; 4] = [
        Block::HiddenWeight,
        Block::OutputWeight,
        Block::HiddenBias,
        Block::OutputBias,
    ];

    /// Returns the `(rows, cols)` shape of the block.
    pub const fn shape(self) -> (usize, usize) {
        match self {
            Block::HiddenWeight => (HIDDEN, INPUTS),
            Block::OutputWeight => (OUTPUTS, HIDDEN),
            Block::HiddenBias => (HIDDEN, 1),
            Block::OutputBias => (OUTPUTS, 1),
        }
    }

    /// Returns the amount of scalars in the block.
    pub const fn len(self) -> usize {
        let (rows, cols) = self.shape();
        rows * cols
    }

    /// Returns the inclusive `(low, high)` range every entry must stay in.
    pub const fn bounds(self) -> (f64, f64) {
        match self {
            Block::HiddenWeight | Block::OutputWeight => (-1., 1.),
            Block::HiddenBias | Block::OutputBias => (0., 1.),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Block::HiddenWeight => "hidden_weights",
            Block::OutputWeight => "output_weights",
            Block::HiddenBias => "hidden_bias",
            Block::OutputBias => "output_bias",
        }
    }
}

/// The position of one scalar inside a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub block: Block,
    pub row: usize,
    pub col: usize,
}

impl Coord {
    /// Maps a flat index in `0..SCALAR_COUNT` to a coordinate.
    ///
    /// Blocks are laid out back to back in [`Block::ALL`] order, each one row-major,
    /// so a uniform flat index selects every scalar with the same probability.
    ///
    /// # Returns
    /// `None` if `index >= SCALAR_COUNT`.
    pub fn from_flat(mut index: usize) -> Option<Self> {
        for block in Block::ALL {
            if index < block.len() {
                let (_, cols) = block.shape();
                return Some(Self {
                    block,
                    row: index / cols,
                    col: index % cols,
                });
            }
            index -= block.len();
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn scalar_count_covers_all_blocks() {
        assert_eq!(SCALAR_COUNT, 20);
        assert_eq!(Block::HiddenWeight.len(), 9);
        assert_eq!(Block::OutputWeight.len(), 6);
        assert_eq!(Block::HiddenBias.len(), 3);
        assert_eq!(Block::OutputBias.len(), 2);
    }

    #[test]
    fn flat_index_is_a_bijection() {
        let coords: HashSet<_> = (0..SCALAR_COUNT)
            .map(|i| Coord::from_flat(i).unwrap())
            .collect();

        assert_eq!(coords.len(), SCALAR_COUNT);
        for c in &coords {
            let (rows, cols) = c.block.shape();
            assert!(c.row < rows && c.col < cols, "{c:?} out of shape");
        }

        assert!(Coord::from_flat(SCALAR_COUNT).is_none());
    }

    #[test]
    fn flat_offsets_follow_block_order() {
        let first_output_weight = Coord::from_flat(9).unwrap();
        assert_eq!(first_output_weight.block, Block::OutputWeight);
        assert_eq!((first_output_weight.row, first_output_weight.col), (0, 0));

        let last = Coord::from_flat(19).unwrap();
        assert_eq!(last.block, Block::OutputBias);
        assert_eq!((last.row, last.col), (1, 0));
    }
}
