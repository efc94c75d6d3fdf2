//! Argument types shared by the binaries.
use crate::utils::*;

/// Placement policy, as spelled on the command line.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlacementArg {
    FirstFit,
    BestFit,
    WorstFit,
    NextFit,
}

impl From<PlacementArg> for PlacementAlgo {
    fn from(arg: PlacementArg) -> Self {
        match arg {
            PlacementArg::FirstFit  => PlacementAlgo::FirstFit,
            PlacementArg::BestFit   => PlacementAlgo::BestFit,
            PlacementArg::WorstFit  => PlacementAlgo::WorstFit,
            PlacementArg::NextFit   => PlacementAlgo::NextFit,
        }
    }
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReplacementArg {
    Fifo,
    Lru,
    Optimal,
    Clock,
}

impl From<ReplacementArg> for ReplacementAlgo {
    fn from(arg: ReplacementArg) -> Self {
        match arg {
            ReplacementArg::Fifo    => ReplacementAlgo::Fifo,
            ReplacementArg::Lru     => ReplacementAlgo::Lru,
            ReplacementArg::Optimal => ReplacementAlgo::Optimal,
            ReplacementArg::Clock   => ReplacementAlgo::Clock,
        }
    }
}

/// Each `-v` raises the level by one step, starting from warnings.
pub fn verbosity(count: u8) -> LevelFilter {
    match count {
        0   => LevelFilter::Warn,
        1   => LevelFilter::Info,
        2   => LevelFilter::Debug,
        _   => LevelFilter::Trace,
    }
}
