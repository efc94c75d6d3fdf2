//! Demand paging over a fixed frame table, one reference at a time.
use crate::utils::*;
use crate::replacement::{Policy, ReplacementAlgo};

/// Everything that happened while serving one reference.
///
/// On a hit, [`frame`](StepRecord::frame) is where the page already
/// lived; on a fault, it is where the page was written.
/// [`frames`](StepRecord::frames) is the full table *after* the step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub reference:  PageNum,
    pub hit:        bool,
    pub evicted:    Option<PageNum>,
    pub frame:      usize,
    pub frames:     FrameTable,
    pub reason:     String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingStats {
    pub total_refs:         usize,
    pub hits:               usize,
    pub faults:             usize,
    pub hit_ratio_pct:      f64,
    pub fault_ratio_pct:    f64,
}

/// Owns the frame table, the reference string and the full history of a
/// run.
///
/// `history.len()` always equals the number of references served, and the
/// last record's snapshot always matches the live frame table.
#[derive(Clone, Debug)]
pub struct PagingSimulator {
    frames:         FrameTable,
    refs:           Vec<PageNum>,
    policy:         Policy,
    current_step:   usize,
    hits:           usize,
    faults:         usize,
    history:        Vec<StepRecord>,
}

impl PagingSimulator {
    /// All frames start empty. At least one frame is required.
    pub fn new(num_frames: usize, refs: Vec<PageNum>, algo: ReplacementAlgo) -> SimResult<Self> {
        if num_frames == 0 {
            return Err(SimError::BadConfig(String::from("at least one frame is needed")));
        }
        info!(
            "Paging {} references through {} frames under {}",
            refs.len(), num_frames, algo.label()
        );

        Ok(Self {
            frames:         vec![None; num_frames],
            history:        Vec::with_capacity(refs.len()),
            refs,
            policy:         Policy::new(algo, num_frames),
            current_step:   0,
            hits:           0,
            faults:         0,
        })
    }

    /// Same as [`new`](Self::new), with the policy given by its tag.
    pub fn with_tag(num_frames: usize, refs: Vec<PageNum>, tag: &str) -> SimResult<Self> {
        Self::new(num_frames, refs, tag.parse()?)
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[Option<PageNum>] {
        &self.frames
    }

    pub fn reference_string(&self) -> &[PageNum] {
        &self.refs
    }

    pub fn algo(&self) -> ReplacementAlgo {
        self.policy.algo()
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn is_done(&self) -> bool {
        self.current_step >= self.refs.len()
    }

    pub fn history(&self) -> &[StepRecord] {
        &self.history
    }

    /// Serves the next reference. Returns `None` once the reference
    /// string is exhausted, as many times as it is asked.
    pub fn step(&mut self) -> Option<&StepRecord> {
        let now = self.current_step;
        let reference = *self.refs.get(now)?;

        let record = match self.frames.iter().position(|f| *f == Some(reference)) {
            Some(frame) => {
                self.hits += 1;
                self.policy.on_hit(frame, now);
                StepRecord {
                    reference,
                    hit:        true,
                    evicted:    None,
                    frame,
                    frames:     self.frames.clone(),
                    reason:     format!("Page {} is already in Frame {} → HIT", reference, frame),
                }
            },
            None        => {
                self.faults += 1;
                let (frame, reason) = match self.frames.iter().position(Option::is_none) {
                    Some(empty) => {
                        (empty, format!("Frame {} is empty → placed Page {}", empty, reference))
                    },
                    None        => {
                        let victim = self.policy.pick_victim(&self.frames, &self.refs[now + 1..]);
                        // Full table, so the victim frame holds a page.
                        let evicted = self.frames[victim].unwrap_or_default();
                        (victim, self.algo().eviction_reason(evicted, victim, reference))
                    }
                };
                let evicted = self.frames[frame].replace(reference);
                self.policy.on_load(frame, now);
                StepRecord {
                    reference,
                    hit:        false,
                    evicted,
                    frame,
                    frames:     self.frames.clone(),
                    reason,
                }
            }
        };
        debug!("Step {}: {}", now + 1, record.reason);

        self.current_step += 1;
        self.history.push(record);
        debug_assert_eq!(self.history.len(), self.current_step);

        self.history.last()
    }

    /// Steps until the reference string runs out and returns the whole
    /// history. Indistinguishable from calling [`step`](Self::step) by hand.
    pub fn run_all(&mut self) -> &[StepRecord] {
        while self.step().is_some() {}

        &self.history
    }

    /// Counts cover the references served so far.
    pub fn stats(&self) -> PagingStats {
        let total_refs = self.current_step;

        PagingStats {
            total_refs,
            hits:               self.hits,
            faults:             self.faults,
            hit_ratio_pct:      percent(self.hits, total_refs),
            fault_ratio_pct:    percent(self.faults, total_refs),
        }
    }
}
