//! Session controllers.
//!
//! A session owns at most one engine. Configuring builds a fresh one,
//! resetting drops it; the engine is never shared or handed out mutably.
//! Every outcome, good or bad, lands in the session's [`EventLog`].
use crate::utils::*;
use crate::input::{check_frames, Command};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    System,
    Alloc,
    Dealloc,
    Hit,
    Fault,
    Fail,
}

impl EventKind {
    pub fn tag(&self) -> &'static str {
        match self {
            EventKind::System   => "system",
            EventKind::Alloc    => "alloc",
            EventKind::Dealloc  => "dealloc",
            EventKind::Hit      => "hit",
            EventKind::Fault    => "fault",
            EventKind::Fail     => "fail",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Event {
    pub seq:        usize,
    pub kind:       EventKind,
    pub message:    String,
}

/// Append-only. Entries are numbered from 1 in arrival order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct EventLog {
    entries: Vec<Event>,
}

impl EventLog {
    pub fn push(&mut self, kind: EventKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            EventKind::Fail => warn!("{}", message),
            _               => info!("{}", message),
        }
        self.entries.push(Event {
            seq: self.entries.len() + 1,
            kind,
            message,
        });
    }

    pub fn entries(&self) -> &[Event] {
        &self.entries
    }

    pub fn last(&self) -> Option<&Event> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//---START PARTITIONED MEMORY---
pub struct MemorySession {
    region:     Option<PartitionAllocator>,
    layout:     Option<RegionLayout>,
    algo:       PlacementAlgo,
    log:        EventLog,
    // Utilization after configuration and after every successful
    // operation, oldest first.
    timeline:   Vec<f64>,
}

impl Default for MemorySession {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySession {
    pub fn new() -> Self {
        Self {
            region:     None,
            layout:     None,
            algo:       PlacementAlgo::FirstFit,
            log:        EventLog::default(),
            timeline:   vec![],
        }
    }

    /// Replaces whatever region existed with a brand new one.
    pub fn configure(&mut self, layout: RegionLayout) -> Result<&PartitionAllocator, CtlError> {
        let message = match &layout {
            RegionLayout::Uniform(total)        => {
                format!("Initializing with total size: {} KB", total)
            },
            RegionLayout::Partitioned(sizes)    => {
                format!("Initializing with custom partitions: {}", sizes.iter().join(", "))
            },
        };
        let region = PartitionAllocator::new(layout.clone())?;
        self.log.push(EventKind::System, message);
        self.timeline.clear();
        self.timeline.push(region.stats().utilization_pct);
        self.layout = Some(layout);

        Ok(self.region.insert(region))
    }

    /// Forgets the region. [`restart`](Self::restart) can bring the
    /// previous layout back.
    pub fn reset(&mut self) {
        self.region = None;
        self.timeline.clear();
        self.log.push(EventKind::System, "System reset. Ready for initialization.");
    }

    /// Rebuilds the region from the last layout it was configured with.
    pub fn restart(&mut self) -> Result<&PartitionAllocator, CtlError> {
        let layout = self.layout.clone().ok_or(CtlError::NotConfigured)?;
        self.configure(layout)
    }

    pub fn select(&mut self, algo: PlacementAlgo) {
        self.algo = algo;
    }

    pub fn selected(&self) -> PlacementAlgo {
        self.algo
    }

    /// Allocates under the selected policy.
    pub fn allocate(&mut self, owner: &str, size: Units) -> Result<Outcome, CtlError> {
        self.allocate_with(owner, size, self.algo)
    }

    pub fn allocate_with(&mut self, owner: &str, size: Units, algo: PlacementAlgo) -> Result<Outcome, CtlError> {
        let owner = crate::input::parse_owner(owner)?;
        if size == 0 {
            return Err(CtlError::BadSize);
        }
        let region = self.region.as_mut().ok_or(CtlError::NotConfigured)?;
        let res = region.allocate(owner, size, algo);
        self.record(res, EventKind::Alloc)
    }

    pub fn deallocate(&mut self, owner: &str) -> Result<Outcome, CtlError> {
        let owner = crate::input::parse_owner(owner)?;
        let region = self.region.as_mut().ok_or(CtlError::NotConfigured)?;
        let res = region.deallocate(owner);
        self.record(res, EventKind::Dealloc)
    }

    /// Runs one parsed script line. Display-only commands are no-ops.
    pub fn execute(&mut self, cmd: &Command) -> Result<Option<Outcome>, CtlError> {
        match cmd {
            Command::Alloc { owner, size, algo }  => {
                self.allocate_with(owner, *size, algo.unwrap_or(self.algo)).map(Some)
            },
            Command::Free { owner }     => self.deallocate(owner).map(Some),
            Command::Use(algo)          => {
                self.select(*algo);
                Ok(None)
            },
            Command::Reset              => {
                self.reset();
                self.restart().map(|_| None)
            },
            Command::Show | Command::Stats  => Ok(None),
        }
    }

    fn record(&mut self, res: SimResult<Outcome>, kind: EventKind) -> Result<Outcome, CtlError> {
        match res {
            Ok(out) => {
                self.log.push(kind, out.message.clone());
                if let Some(stats) = self.stats() {
                    self.timeline.push(stats.utilization_pct);
                }
                Ok(out)
            },
            Err(e)  => {
                self.log.push(EventKind::Fail, e.to_string());
                Err(e.into())
            }
        }
    }

    pub fn region(&self) -> Option<&PartitionAllocator> {
        self.region.as_ref()
    }

    pub fn stats(&self) -> Option<AllocStats> {
        self.region.as_ref().map(PartitionAllocator::stats)
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn timeline(&self) -> &[f64] {
        &self.timeline
    }
}
//---END PARTITIONED MEMORY---

//---START PAGING---
pub struct PagingSession {
    sim:        Option<PagingSimulator>,
    frames:     usize,
    refs:       Vec<PageNum>,
    algo:       ReplacementAlgo,
    log:        EventLog,
}

impl PagingSession {
    pub fn new(frames: usize, refs: Vec<PageNum>, algo: ReplacementAlgo) -> Result<Self, CtlError> {
        let mut res = Self {
            sim:        None,
            frames:     0,
            refs:       vec![],
            algo,
            log:        EventLog::default(),
        };
        res.configure(frames, refs, algo)?;

        Ok(res)
    }

    /// Validates the parameters and keeps them for the next run. Any
    /// simulator in flight is dropped. A rejected call changes nothing.
    pub fn configure(&mut self, frames: usize, refs: Vec<PageNum>, algo: ReplacementAlgo) -> Result<(), CtlError> {
        let frames = check_frames(frames)?;
        if refs.is_empty() {
            return Err(CtlError::NoReferences);
        }
        self.frames = frames;
        self.refs = refs;
        self.algo = algo;
        self.sim = None;

        Ok(())
    }

    fn build(&mut self) -> Result<&mut PagingSimulator, CtlError> {
        let sim = PagingSimulator::new(self.frames, self.refs.clone(), self.algo)?;
        Ok(self.sim.insert(sim))
    }

    /// Serves one reference, building the simulator on first use.
    pub fn step(&mut self) -> Result<StepRecord, CtlError> {
        if self.sim.is_none() {
            self.build()?;
            self.log.push(
                EventKind::System,
                format!("Initialized {} with {} frames.", self.algo.tag().to_uppercase(), self.frames),
            );
        }
        let step = self.sim
            .as_mut()
            .and_then(|sim| sim.step().cloned());
        match step {
            Some(rec)   => {
                let kind = if rec.hit { EventKind::Hit } else { EventKind::Fault };
                self.log.push(kind, rec.reason.clone());
                Ok(rec)
            },
            None        => {
                self.log.push(EventKind::Fail, CtlError::Exhausted.to_string());
                Err(CtlError::Exhausted)
            }
        }
    }

    /// Starts over and runs the whole reference string.
    pub fn run_all(&mut self) -> Result<&[StepRecord], CtlError> {
        let (algo, refs, frames) = (self.algo, self.refs.len(), self.frames);
        self.build()?.run_all();
        self.log.push(
            EventKind::System,
            format!("Ran {} on {} references with {} frames.", algo.tag().to_uppercase(), refs, frames),
        );

        Ok(self.history())
    }

    /// Changes the policy. A session that already produced history is
    /// re-run from scratch under the new policy; returns whether that
    /// happened.
    pub fn switch_algorithm(&mut self, algo: ReplacementAlgo) -> Result<bool, CtlError> {
        self.algo = algo;
        let has_history = self.sim
            .as_ref()
            .is_some_and(|sim| !sim.history().is_empty());
        if !has_history {
            self.sim = None;
            return Ok(false);
        }
        self.build()?.run_all();
        self.log.push(
            EventKind::System,
            format!("Switched to {}. Re-ran simulation.", algo.tag().to_uppercase()),
        );

        Ok(true)
    }

    pub fn reset(&mut self) {
        self.sim = None;
        self.log.push(EventKind::System, "Reset. Ready for new simulation.");
    }

    pub fn simulator(&self) -> Option<&PagingSimulator> {
        self.sim.as_ref()
    }

    pub fn history(&self) -> &[StepRecord] {
        self.sim
            .as_ref()
            .map(PagingSimulator::history)
            .unwrap_or_default()
    }

    pub fn stats(&self) -> Option<PagingStats> {
        self.sim.as_ref().map(PagingSimulator::stats)
    }

    pub fn algo(&self) -> ReplacementAlgo {
        self.algo
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }
}
//---END PAGING---
