//! Welcome to `simcore`!
//!
//! Two small engines that replay, one step at a time, the memory
//! management policies found in every operating systems textbook:
//!
//! 1. A [`PartitionAllocator`] carving a fixed region into blocks under
//!    first/best/worst/next-fit placement, with splitting on allocation
//!    and coalescing on deallocation.
//! 2. A [`PagingSimulator`] driving a frame table through a reference
//!    string under FIFO, LRU, Optimal or Clock replacement, keeping a
//!    snapshot of every step.
//!
//! The engines share nothing. Each one is owned by a single controller,
//! which configures it, pokes it, and reads results back.

mod block;
pub mod utils;
pub mod placement;
pub mod allocator;
pub mod replacement;
pub mod paging;
pub mod compare;

use crate::utils::*;

pub use crate::{
    allocator::{AllocStats, Outcome, PartitionAllocator, RegionLayout, Request},
    paging::{PagingSimulator, PagingStats, StepRecord},
    placement::PlacementAlgo,
    replacement::{Policy, ReplacementAlgo},
    utils::{BlockId, FrameTable, PageNum, SimError, SimResult, Units},
};

/// A contiguous span of the simulated region.
///
/// Blocks live in a [`PartitionAllocator`]'s address-ordered sequence. The
/// [`id`](MemoryBlock::id) is handed out once, from a monotonic counter, and
/// never reused: a block keeps it through splits (the left half keeps it)
/// and merges (the leftmost block of a free run keeps it). It says nothing
/// about where the block sits.
///
/// [`owner`](MemoryBlock::owner) is `Some` exactly when
/// [`is_allocated`](MemoryBlock::is_allocated) holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryBlock {
    pub id:             BlockId,
    pub size:           Units,
    pub is_allocated:   bool,
    #[serde(rename = "ownerId")]
    pub owner:          Option<String>,
}
