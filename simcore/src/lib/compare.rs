//! Side-by-side runs of the same workload under every policy.
//!
//! The engines are single-threaded, but nothing stops us from running
//! independent instances at once. Each run owns its engine outright.
use crate::utils::*;
use crate::allocator::{AllocStats, PartitionAllocator, RegionLayout, Request};
use crate::paging::{PagingSimulator, PagingStats};
use crate::placement::PlacementAlgo;
use crate::replacement::ReplacementAlgo;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReplacementSummary {
    pub algo:   ReplacementAlgo,
    pub stats:  PagingStats,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlacementSummary {
    pub algo:       PlacementAlgo,
    pub rejected:   usize,
    pub stats:      AllocStats,
}

/// Faults observed for one frame count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CurvePoint {
    pub frames: usize,
    pub faults: usize,
}

/// Runs `refs` to completion under each replacement policy, in the
/// order of [`ReplacementAlgo::ALL`].
pub fn compare_replacement(num_frames: usize, refs: &[PageNum]) -> SimResult<Vec<ReplacementSummary>> {
    ReplacementAlgo::ALL[..]
        .par_iter()
        .map(|&algo| -> SimResult<ReplacementSummary> {
            let mut sim = PagingSimulator::new(num_frames, refs.to_vec(), algo)?;
            sim.run_all();
            Ok(ReplacementSummary { algo, stats: sim.stats() })
        })
        .collect()
}

/// Fault counts for every frame count in `frames`, ascending.
pub fn fault_curve(
    algo:   ReplacementAlgo,
    refs:   &[PageNum],
    frames: RangeInclusive<usize>,
) -> SimResult<Vec<CurvePoint>> {
    frames
        .into_par_iter()
        .map(|n| -> SimResult<CurvePoint> {
            let mut sim = PagingSimulator::new(n, refs.to_vec(), algo)?;
            sim.run_all();
            Ok(CurvePoint { frames: n, faults: sim.stats().faults })
        })
        .collect()
}

/// Points of a fault curve where adding a frame made things *worse*.
/// FIFO is the usual suspect; stack algorithms (LRU, Optimal) never
/// show up here.
pub fn belady_anomalies(curve: &[CurvePoint]) -> Vec<CurvePoint> {
    curve.iter()
        .tuple_windows()
        .filter(|(fewer, more)| more.faults > fewer.faults)
        .map(|(_, more)| *more)
        .collect()
}

/// Replays `script` on a fresh region once per placement policy. Rejected
/// requests are counted and otherwise skipped, as a user would.
pub fn compare_placement(layout: &RegionLayout, script: &[Request]) -> SimResult<Vec<PlacementSummary>> {
    PlacementAlgo::ALL[..]
        .par_iter()
        .map(|&algo| -> SimResult<PlacementSummary> {
            let mut region = PartitionAllocator::new(layout.clone())?;
            let rejected = script.iter()
                .map(|req| region.apply(req, algo))
                .filter(Result::is_err)
                .count();
            Ok(PlacementSummary { algo, rejected, stats: region.stats() })
        })
        .collect()
}
