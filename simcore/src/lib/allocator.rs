//! Contiguous, partitioned allocation over a fixed region.
use crate::utils::*;
use crate::placement::PlacementAlgo;

/// How the region is carved up before the first request arrives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RegionLayout {
    /// One free block spanning the whole region.
    Uniform(Units),
    /// Several free blocks, in address order. Their sum becomes
    /// the region's size.
    Partitioned(Vec<Units>),
}

/// What a successful [`PartitionAllocator`] operation reports back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub block_id:   BlockId,
    pub size:       Units,
    pub message:    String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocStats {
    pub total:                      Units,
    pub used:                       Units,
    pub free:                       Units,
    pub utilization_pct:            f64,
    pub external_fragmentation:     Units,
    pub largest_free_block:         Units,
    pub free_block_count:           usize,
    pub block_count:                usize,
    pub success_rate_pct:           f64,
}

/// A single allocation script entry. Scripts let the same workload be
/// replayed under different placement policies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "op")]
pub enum Request {
    Alloc { owner: String, size: Units },
    Free { owner: String },
}

/// Owns the region and everything that happens to it.
///
/// The block sequence is kept in address order and always sums up to
/// [`total_size`](PartitionAllocator::total_size). After every
/// deallocation no two neighbouring blocks are both free.
#[derive(Clone, Debug)]
pub struct PartitionAllocator {
    total_size:     Units,
    blocks:         Vec<MemoryBlock>,
    next_id:        BlockId,
    // Where next-fit resumes. Moved by *every* successful allocation,
    // whatever the policy that served it.
    cursor:         usize,
    attempted:      u32,
    successful:     u32,
}

impl PartitionAllocator {
    /// The gatekeeper: a zero-sized region or an empty/zero partition
    /// is refused, everything else is accepted as given.
    pub fn new(layout: RegionLayout) -> SimResult<Self> {
        let sizes = match layout {
            RegionLayout::Uniform(total)        => vec![total],
            RegionLayout::Partitioned(sizes)    => sizes,
        };
        if sizes.is_empty() {
            return Err(SimError::BadConfig(String::from("no partitions given")));
        }
        if let Some(pos) = sizes.iter().position(|&s| s == 0) {
            return Err(SimError::BadConfig(format!("partition {} has zero size", pos + 1)));
        }
        let blocks: Vec<MemoryBlock> = sizes.iter()
            .zip(1..)
            .map(|(&size, id)| MemoryBlock::free(id, size))
            .collect();
        let total_size: Units = sizes.iter().sum();
        info!(
            "Region of {} units initialized as [{}]",
            total_size,
            sizes.iter().join(", ")
        );

        Ok(Self {
            total_size,
            next_id:    blocks.len() as BlockId + 1,
            blocks,
            cursor:     0,
            attempted:  0,
            successful: 0,
        })
    }

    pub fn uniform(total: Units) -> SimResult<Self> {
        Self::new(RegionLayout::Uniform(total))
    }

    pub fn partitioned(sizes: &[Units]) -> SimResult<Self> {
        Self::new(RegionLayout::Partitioned(sizes.to_vec()))
    }

    pub fn total_size(&self) -> Units {
        self.total_size
    }

    /// Current blocks, in address order.
    pub fn blocks(&self) -> &[MemoryBlock] {
        &self.blocks
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// `(attempted, successful)` allocation counts.
    pub fn attempts(&self) -> (u32, u32) {
        (self.attempted, self.successful)
    }

    pub fn find_owner(&self, owner: &str) -> Option<&MemoryBlock> {
        self.blocks.iter()
            .find(|b| b.is_owned_by(owner))
    }

    /// Serves `size` units to `owner` from the block `algo` picks.
    ///
    /// The attempt is counted even when it fails; nothing else changes
    /// on failure. On success, an oversized block is split: it shrinks
    /// to `size` and the remainder becomes a new free block right after
    /// it.
    pub fn allocate(&mut self, owner: &str, size: Units, algo: PlacementAlgo) -> SimResult<Outcome> {
        self.admit(owner, size)?;
        self.place(owner, size, algo)
    }

    /// Same as [`allocate`](Self::allocate), with the policy given by its
    /// tag. The tag is only read once the owner has been admitted, and an
    /// unknown tag still counts as an attempt.
    pub fn allocate_tagged(&mut self, owner: &str, size: Units, tag: &str) -> SimResult<Outcome> {
        self.admit(owner, size)?;
        let algo: PlacementAlgo = tag.parse()?;
        self.place(owner, size, algo)
    }

    // Counts the attempt, turning away empty requests and live owners.
    fn admit(&mut self, owner: &str, size: Units) -> SimResult<()> {
        if size == 0 {
            return Err(SimError::BadConfig(String::from("requested size must be positive")));
        }
        self.attempted += 1;
        if self.find_owner(owner).is_some() {
            warn!("Rejected allocation for {}: owner already holds a block", owner);
            return Err(SimError::DuplicateOwner(owner.to_owned()));
        }

        Ok(())
    }

    fn place(&mut self, owner: &str, size: Units, algo: PlacementAlgo) -> SimResult<Outcome> {
        let Some(idx) = algo.find(&self.blocks, size, self.cursor) else {
            warn!("Rejected allocation of {} units for {}: nothing fits under {}", size, owner, algo);
            return Err(SimError::NoFit(algo.tag().to_owned()));
        };

        self.successful += 1;
        if self.blocks[idx].size > size {
            let rest = MemoryBlock::free(self.next_id, self.blocks[idx].size - size);
            self.next_id += 1;
            debug!(
                "Splitting block {} into {} + {} (new block {})",
                self.blocks[idx].id, size, rest.size, rest.id
            );
            self.blocks[idx].size = size;
            self.blocks.insert(idx + 1, rest);
        }
        let block = &mut self.blocks[idx];
        block.claim(owner);
        let block_id = block.id;
        self.cursor = (idx + 1) % self.blocks.len();
        debug!("{} took block {} at index {} via {}", owner, block_id, idx, algo);
        self.check_sanity();

        Ok(Outcome {
            block_id,
            size,
            message: format!("Allocated {}KB for {} at Block {}.", size, owner, block_id),
        })
    }

    /// Frees `owner`'s block and coalesces every run of free neighbours.
    pub fn deallocate(&mut self, owner: &str) -> SimResult<Outcome> {
        let Some(idx) = self.blocks.iter().position(|b| b.is_owned_by(owner)) else {
            warn!("Rejected deallocation: {} holds no block", owner);
            return Err(SimError::OwnerNotFound(owner.to_owned()));
        };
        let block = &mut self.blocks[idx];
        block.release();
        let (block_id, size) = (block.id, block.size);

        self.coalesce();
        if self.cursor >= self.blocks.len() {
            self.cursor = 0;
        }
        debug!("{} released block {} ({} units)", owner, block_id, size);
        self.check_sanity();

        Ok(Outcome {
            block_id,
            size,
            message: format!("Deallocated {} ({}KB).", owner, size),
        })
    }

    /// Runs one script entry under `algo`.
    pub fn apply(&mut self, req: &Request, algo: PlacementAlgo) -> SimResult<Outcome> {
        match req {
            Request::Alloc { owner, size }  => self.allocate(owner, *size, algo),
            Request::Free { owner }         => self.deallocate(owner),
        }
    }

    // One left-to-right pass. After absorbing its right neighbour a block
    // is looked at again, so runs of any length collapse into their
    // leftmost member.
    fn coalesce(&mut self) {
        let mut idx = 0;
        while idx + 1 < self.blocks.len() {
            if self.blocks[idx].is_free() && self.blocks[idx + 1].is_free() {
                let absorbed = self.blocks.remove(idx + 1);
                debug!("Merging block {} into block {}", absorbed.id, self.blocks[idx].id);
                self.blocks[idx].size += absorbed.size;
            } else {
                idx += 1;
            }
        }
    }

    pub fn stats(&self) -> AllocStats {
        let (used, free) = self.blocks.iter()
            .fold((0, 0), |(used, free), b| {
                if b.is_allocated { (used + b.size, free) } else { (used, free + b.size) }
            });
        let largest_free_block = self.blocks.iter()
            .filter(|b| b.is_free())
            .map(|b| b.size)
            .max()
            .unwrap_or(0);
        // A region nobody has touched yet reports no fragmentation, even
        // when it was created pre-partitioned.
        let external_fragmentation = if used == 0 { 0 } else { free - largest_free_block };
        let success_rate_pct = if self.attempted == 0 {
            100.0
        } else {
            percent(self.successful as usize, self.attempted as usize)
        };

        AllocStats {
            total:              self.total_size,
            used,
            free,
            utilization_pct:    percent(used, self.total_size),
            external_fragmentation,
            largest_free_block,
            free_block_count:   self.blocks.iter().filter(|b| b.is_free()).count(),
            block_count:        self.blocks.len(),
            success_rate_pct,
        }
    }

    fn check_sanity(&self) {
        debug_assert_eq!(
            self.blocks.iter().map(|b| b.size).sum::<Units>(),
            self.total_size,
            "Block sizes drifted from region size"
        );
        debug_assert!(
            self.blocks.iter().all(|b| b.is_allocated == b.owner.is_some()),
            "Ownership label out of sync"
        );
    }
}
