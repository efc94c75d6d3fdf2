//! Victim selection for the paging simulator.
//!
//! A [`Policy`] is the replacement algorithm *together with* the side
//! state it needs: FIFO remembers load order, LRU remembers last use,
//! Clock keeps one reference bit per frame and a hand. Optimal needs
//! nothing but the future, which the simulator passes in.
//!
//! Policies are only asked for a victim once the frame table is full.
use crate::utils::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplacementAlgo {
    Fifo,
    Lru,
    Optimal,
    Clock,
}

impl ReplacementAlgo {
    pub const ALL: [ReplacementAlgo; 4] = [
        ReplacementAlgo::Fifo,
        ReplacementAlgo::Lru,
        ReplacementAlgo::Optimal,
        ReplacementAlgo::Clock,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            ReplacementAlgo::Fifo       => "fifo",
            ReplacementAlgo::Lru        => "lru",
            ReplacementAlgo::Optimal    => "optimal",
            ReplacementAlgo::Clock      => "clock",
        }
    }

    /// How the policy is named in step justifications.
    pub fn label(&self) -> &'static str {
        match self {
            ReplacementAlgo::Fifo       => "FIFO",
            ReplacementAlgo::Lru        => "LRU",
            ReplacementAlgo::Optimal    => "Optimal",
            ReplacementAlgo::Clock      => "Clock",
        }
    }

    // Why the policy picked its victim, phrased after "Page N (Frame F)".
    fn rationale(&self) -> &'static str {
        match self {
            ReplacementAlgo::Fifo       => "is oldest",
            ReplacementAlgo::Lru        => "was least recently used",
            ReplacementAlgo::Optimal    => "won't be used longest",
            ReplacementAlgo::Clock      => "has ref bit 0",
        }
    }

    pub(crate) fn eviction_reason(&self, evicted: PageNum, frame: usize, placed: PageNum) -> String {
        format!(
            "{}: Page {} (Frame {}) {} → evicted, placed Page {}",
            self.label(), evicted, frame, self.rationale(), placed
        )
    }
}

impl fmt::Display for ReplacementAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ReplacementAlgo {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = fold_tag(s);
        ReplacementAlgo::ALL
            .into_iter()
            .find(|a| a.tag() == folded)
            .ok_or_else(|| SimError::UnknownAlgorithm(s.to_owned()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Policy {
    /// Frame indices in load order, oldest first. A frame appears at
    /// most once.
    Fifo { queue: VecDeque<usize> },
    /// Step at which each frame was last touched.
    Lru { stamps: Vec<usize> },
    Optimal,
    /// Second chance.
    Clock { bits: Vec<bool>, hand: usize },
}

impl Policy {
    pub fn new(algo: ReplacementAlgo, num_frames: usize) -> Self {
        match algo {
            ReplacementAlgo::Fifo       => Policy::Fifo { queue: VecDeque::with_capacity(num_frames) },
            ReplacementAlgo::Lru        => Policy::Lru { stamps: vec![0; num_frames] },
            ReplacementAlgo::Optimal    => Policy::Optimal,
            ReplacementAlgo::Clock      => Policy::Clock { bits: vec![false; num_frames], hand: 0 },
        }
    }

    pub fn algo(&self) -> ReplacementAlgo {
        match self {
            Policy::Fifo { .. }     => ReplacementAlgo::Fifo,
            Policy::Lru { .. }      => ReplacementAlgo::Lru,
            Policy::Optimal         => ReplacementAlgo::Optimal,
            Policy::Clock { .. }    => ReplacementAlgo::Clock,
        }
    }

    /// The page in `frame` was referenced again at step `now`.
    /// Load order is unaffected by hits.
    pub fn on_hit(&mut self, frame: usize, now: usize) {
        match self {
            Policy::Lru { stamps }      => stamps[frame] = now,
            Policy::Clock { bits, .. }  => bits[frame] = true,
            Policy::Fifo { .. } | Policy::Optimal => {}
        }
    }

    /// A page was just written into `frame` at step `now`, be it into
    /// an empty slot or over a victim.
    pub fn on_load(&mut self, frame: usize, now: usize) {
        match self {
            Policy::Fifo { queue }  => {
                queue.retain(|&f| f != frame);
                queue.push_back(frame);
            },
            Policy::Lru { stamps }  => stamps[frame] = now,
            Policy::Clock { bits, hand }   => {
                bits[frame] = true;
                *hand = (frame + 1) % bits.len();
            },
            Policy::Optimal         => {}
        }
    }

    /// Picks the frame to evict from a full table. `future` holds the
    /// references that come *after* the one being served.
    pub fn pick_victim(&mut self, frames: &[Option<PageNum>], future: &[PageNum]) -> usize {
        match self {
            Policy::Fifo { queue }          => fifo_victim(queue),
            Policy::Lru { stamps }          => lru_victim(stamps),
            Policy::Optimal                 => optimal_victim(frames, future),
            Policy::Clock { bits, hand }    => clock_victim(bits, hand),
        }
    }

    /// Reference bits, if this is a Clock policy.
    pub fn clock_bits(&self) -> Option<&[bool]> {
        match self {
            Policy::Clock { bits, .. }  => Some(bits.as_slice()),
            _                           => None,
        }
    }
}

/// The frame loaded longest ago. A full table always has a non-empty
/// queue; the `0` fallback is never reached by the simulator.
pub fn fifo_victim(queue: &VecDeque<usize>) -> usize {
    queue.front()
        .copied()
        .unwrap_or(0)
}

/// Smallest stamp wins; ties go to the lowest frame.
pub fn lru_victim(stamps: &[usize]) -> usize {
    stamps.iter()
        .position_min()
        .unwrap_or(0)
}

/// Belady's clairvoyant choice: a page never used again is evicted on
/// the spot, otherwise the one whose next use lies farthest ahead.
/// Ties go to the lowest frame.
pub fn optimal_victim(frames: &[Option<PageNum>], future: &[PageNum]) -> usize {
    let mut victim = 0;
    let mut farthest = None;
    for (idx, page) in frames.iter().enumerate() {
        match future.iter().position(|p| Some(*p) == *page) {
            None            => return idx,
            Some(next_use)  => {
                if farthest.map_or(true, |f| next_use > f) {
                    farthest = Some(next_use);
                    victim = idx;
                }
            }
        }
    }

    victim
}

/// Sweeps from `hand`, clearing set bits, until it meets a clear one.
/// That frame is the victim and the hand is left pointing at it.
/// Within one revolution every bit has been cleared, so the sweep
/// always ends.
pub fn clock_victim(bits: &mut [bool], hand: &mut usize) -> usize {
    loop {
        if !bits[*hand] {
            break *hand;
        }
        bits[*hand] = false;
        *hand = (*hand + 1) % bits.len();
    }
}
