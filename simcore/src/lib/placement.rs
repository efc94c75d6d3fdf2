//! The four textbook placement policies.
//!
//! Each one is a pure function over the allocator's block sequence: it
//! looks at blocks that are free *and* large enough, and returns the index
//! of the one it likes, or `None`. Nothing is mutated; splitting and
//! labelling is the allocator's business.
use std::cmp::Reverse;

use crate::utils::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlacementAlgo {
    /// Lowest-addressed block that fits.
    FirstFit,
    /// Smallest block that fits.
    BestFit,
    /// Largest block that fits.
    WorstFit,
    /// First fit, but starting from where the last allocation left off.
    NextFit,
}

impl PlacementAlgo {
    pub const ALL: [PlacementAlgo; 4] = [
        PlacementAlgo::FirstFit,
        PlacementAlgo::BestFit,
        PlacementAlgo::WorstFit,
        PlacementAlgo::NextFit,
    ];

    /// The tag by which front ends name the policy.
    pub fn tag(&self) -> &'static str {
        match self {
            PlacementAlgo::FirstFit => "firstFit",
            PlacementAlgo::BestFit  => "bestFit",
            PlacementAlgo::WorstFit => "worstFit",
            PlacementAlgo::NextFit  => "nextFit",
        }
    }

    /// Dispatches to the policy's search. `cursor` only matters to
    /// [`PlacementAlgo::NextFit`].
    pub fn find(&self, blocks: &[MemoryBlock], size: Units, cursor: usize) -> Option<usize> {
        match self {
            PlacementAlgo::FirstFit => first_fit(blocks, size),
            PlacementAlgo::BestFit  => best_fit(blocks, size),
            PlacementAlgo::WorstFit => worst_fit(blocks, size),
            PlacementAlgo::NextFit  => next_fit(blocks, size, cursor),
        }
    }
}

impl fmt::Display for PlacementAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for PlacementAlgo {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = fold_tag(s);
        PlacementAlgo::ALL
            .into_iter()
            .find(|a| fold_tag(a.tag()) == folded)
            .ok_or_else(|| SimError::UnknownAlgorithm(s.to_owned()))
    }
}

fn candidates<'a>(
    blocks: &'a [MemoryBlock],
    size:   Units
) -> impl Iterator<Item = (usize, &'a MemoryBlock)> + 'a {
    blocks.iter()
        .enumerate()
        .filter(move |(_, b)| b.fits(size))
}

pub fn first_fit(blocks: &[MemoryBlock], size: Units) -> Option<usize> {
    blocks.iter()
        .position(|b| b.fits(size))
}

pub fn best_fit(blocks: &[MemoryBlock], size: Units) -> Option<usize> {
    // `min_by_key` keeps the first of equal minima.
    candidates(blocks, size)
        .min_by_key(|(_, b)| b.size)
        .map(|(idx, _)| idx)
}

pub fn worst_fit(blocks: &[MemoryBlock], size: Units) -> Option<usize> {
    // `max_by_key` keeps the *last* of equal maxima, hence the
    // reversed index in the key.
    candidates(blocks, size)
        .max_by_key(|(idx, b)| (b.size, Reverse(*idx)))
        .map(|(idx, _)| idx)
}

/// Scans every index exactly once, starting at `cursor` and wrapping
/// around the end of the sequence.
pub fn next_fit(blocks: &[MemoryBlock], size: Units, cursor: usize) -> Option<usize> {
    let n = blocks.len();
    (0..n)
        .map(|step| (cursor + step) % n)
        .find(|&idx| blocks[idx].fits(size))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(shape: &[(Units, bool)]) -> Vec<MemoryBlock> {
        shape.iter()
            .enumerate()
            .map(|(idx, &(size, taken))| {
                let mut b = MemoryBlock::free(idx as BlockId + 1, size);
                if taken {
                    b.claim(&format!("P{}", idx));
                }
                b
            })
            .collect()
    }

    #[test]
    fn first_fit_takes_lowest_index() {
        let blocks = layout(&[(10, false), (50, true), (30, false), (80, false)]);
        assert_eq!(first_fit(&blocks, 5), Some(0));
        assert_eq!(first_fit(&blocks, 20), Some(2));
        assert_eq!(first_fit(&blocks, 60), Some(3));
        assert_eq!(first_fit(&blocks, 90), None);
    }

    #[test]
    fn best_fit_prefers_smallest_then_lowest() {
        let blocks = layout(&[(40, false), (25, false), (25, false), (20, true)]);
        assert_eq!(best_fit(&blocks, 20), Some(1));
        assert_eq!(best_fit(&blocks, 26), Some(0));
        assert_eq!(best_fit(&blocks, 41), None);
    }

    #[test]
    fn worst_fit_prefers_largest_then_lowest() {
        let blocks = layout(&[(30, false), (70, true), (50, false), (50, false)]);
        assert_eq!(worst_fit(&blocks, 10), Some(2));
        assert_eq!(worst_fit(&blocks, 51), None);
    }

    #[test]
    fn next_fit_wraps_around_once() {
        let blocks = layout(&[(30, false), (10, true), (10, false), (20, false)]);
        assert_eq!(next_fit(&blocks, 15, 1), Some(3));
        assert_eq!(next_fit(&blocks, 25, 1), Some(0));
        assert_eq!(next_fit(&blocks, 5, 3), Some(3));
        assert_eq!(next_fit(&blocks, 31, 2), None);
        assert_eq!(next_fit(&[], 1, 0), None);
    }

    #[test]
    fn searches_leave_blocks_alone() {
        let blocks = layout(&[(30, false), (10, true), (60, false)]);
        let before = blocks.clone();
        for algo in PlacementAlgo::ALL {
            algo.find(&blocks, 20, 1);
        }
        assert_eq!(blocks, before);
    }

    #[test]
    fn tags_parse_in_either_spelling() {
        assert_eq!("firstFit".parse::<PlacementAlgo>(), Ok(PlacementAlgo::FirstFit));
        assert_eq!("best-fit".parse::<PlacementAlgo>(), Ok(PlacementAlgo::BestFit));
        assert_eq!("WorstFit".parse::<PlacementAlgo>(), Ok(PlacementAlgo::WorstFit));
        assert_eq!("next_fit".parse::<PlacementAlgo>(), Ok(PlacementAlgo::NextFit));
        assert_eq!(
            "buddy".parse::<PlacementAlgo>(),
            Err(SimError::UnknownAlgorithm("buddy".into()))
        );
        for algo in PlacementAlgo::ALL {
            assert_eq!(algo.tag().parse::<PlacementAlgo>(), Ok(algo));
        }
    }
}
