use simcore::*;
use simcore::compare::*;
use rand::prelude::*;
use rand::rngs::StdRng;

const SILBERSCHATZ: [PageNum; 20] = [7, 0, 1, 2, 0, 3, 0, 4, 2, 3, 0, 3, 2, 1, 2, 0, 1, 7, 0, 1];
const BELADY: [PageNum; 12] = [1, 2, 3, 4, 1, 2, 5, 1, 2, 3, 4, 5];

fn shape(region: &PartitionAllocator) -> Vec<(Units, Option<&str>)> {
    region.blocks()
        .iter()
        .map(|b| (b.size, b.owner.as_deref()))
        .collect()
}

fn no_free_neighbours(region: &PartitionAllocator) -> bool {
    region.blocks()
        .windows(2)
        .all(|w| w[0].is_allocated || w[1].is_allocated)
}

fn run(num_frames: usize, refs: &[PageNum], algo: ReplacementAlgo) -> PagingSimulator {
    let mut sim = PagingSimulator::new(num_frames, refs.to_vec(), algo).unwrap();
    sim.run_all();
    sim
}

fn evictions(sim: &PagingSimulator) -> Vec<Option<PageNum>> {
    sim.history()
        .iter()
        .map(|r| r.evicted)
        .collect()
}

//---START PARTITION ALLOCATOR---
#[test]
fn split_exact_fill_and_release() {
    let mut region = PartitionAllocator::uniform(100).unwrap();

    let out = region.allocate("P1", 40, PlacementAlgo::FirstFit).unwrap();
    assert_eq!((out.block_id, out.size), (1, 40));
    assert_eq!(out.message, "Allocated 40KB for P1 at Block 1.");
    assert_eq!(shape(&region), vec![(40, Some("P1")), (60, None)]);

    let out = region.allocate("P2", 60, PlacementAlgo::BestFit).unwrap();
    assert_eq!(out.block_id, 2);
    assert_eq!(shape(&region), vec![(40, Some("P1")), (60, Some("P2"))]);

    let out = region.deallocate("P1").unwrap();
    assert_eq!(out.message, "Deallocated P1 (40KB).");
    assert_eq!(shape(&region), vec![(40, None), (60, Some("P2"))]);
    assert_eq!(region.stats().used, 60);
}

#[test]
fn block_ids_survive_splits_and_merges() {
    let mut region = PartitionAllocator::uniform(100).unwrap();
    region.allocate("A", 10, PlacementAlgo::FirstFit).unwrap();
    region.allocate("B", 20, PlacementAlgo::FirstFit).unwrap();
    region.allocate("C", 30, PlacementAlgo::FirstFit).unwrap();
    let ids: Vec<BlockId> = region.blocks().iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);

    region.deallocate("A").unwrap();
    region.deallocate("B").unwrap();
    // A's block absorbs B's.
    let ids: Vec<BlockId> = region.blocks().iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![1, 3, 4]);
    assert_eq!(shape(&region), vec![(30, None), (30, Some("C")), (40, None)]);

    // New splits never hand out an id seen before.
    region.allocate("D", 5, PlacementAlgo::FirstFit).unwrap();
    assert_eq!(region.blocks()[1].id, 5);
}

#[test]
fn release_coalesces_both_sides() {
    let mut region = PartitionAllocator::partitioned(&[10, 20, 30, 40]).unwrap();
    for (owner, size) in [("A", 10), ("B", 20), ("C", 30), ("D", 40)] {
        region.allocate(owner, size, PlacementAlgo::FirstFit).unwrap();
    }
    region.deallocate("A").unwrap();
    region.deallocate("C").unwrap();
    assert_eq!(region.stats().block_count, 4);
    region.deallocate("B").unwrap();
    assert_eq!(shape(&region), vec![(60, None), (40, Some("D"))]);
    assert_eq!(region.blocks()[0].id, 1);
    assert!(no_free_neighbours(&region));
}

#[test]
fn duplicate_owner_changes_nothing_but_the_count() {
    let mut region = PartitionAllocator::uniform(100).unwrap();
    region.allocate("P1", 30, PlacementAlgo::FirstFit).unwrap();
    let before = region.blocks().to_vec();

    let err = region.allocate("P1", 10, PlacementAlgo::WorstFit).unwrap_err();
    assert_eq!(err, SimError::DuplicateOwner("P1".into()));
    assert_eq!(err.to_string(), "Process ID P1 already exists.");
    assert_eq!(region.blocks(), &before[..]);
    assert_eq!(region.attempts(), (2, 1));
    assert_eq!(region.stats().success_rate_pct, 50.0);
}

#[test]
fn live_owner_is_refused_before_the_tag_is_read() {
    let mut region = PartitionAllocator::uniform(50).unwrap();
    region.allocate("P1", 10, PlacementAlgo::FirstFit).unwrap();

    let err = region.allocate_tagged("P1", 10, "buddy").unwrap_err();
    assert_eq!(err, SimError::DuplicateOwner("P1".into()));
    assert_eq!(region.attempts(), (2, 1));
    let err = region.allocate_tagged("P2", 10, "buddy").unwrap_err();
    assert_eq!(err, SimError::UnknownAlgorithm("buddy".into()));
    assert_eq!(region.attempts(), (3, 1));
    assert_eq!(region.blocks().len(), 2);
}

#[test]
fn failures_are_reported_not_fatal() {
    let mut region = PartitionAllocator::uniform(50).unwrap();
    assert_eq!(region.stats().success_rate_pct, 100.0);

    let err = region.allocate("Big", 80, PlacementAlgo::NextFit).unwrap_err();
    assert_eq!(err.to_string(), "Allocation failed: No suitable block found using nextFit.");
    let err = region.deallocate("Ghost").unwrap_err();
    assert_eq!(err, SimError::OwnerNotFound("Ghost".into()));
    let err = region.allocate_tagged("P1", 10, "buddy").unwrap_err();
    assert_eq!(err, SimError::UnknownAlgorithm("buddy".into()));

    assert_eq!(region.attempts(), (2, 0));
    assert_eq!(region.stats().success_rate_pct, 0.0);
    region.allocate_tagged("P1", 10, "first-fit").unwrap();
    assert_eq!(region.stats().success_rate_pct, 33.3);
}

#[test]
fn success_rate_only_falls_while_failing() {
    let mut region = PartitionAllocator::uniform(10).unwrap();
    region.allocate("Fill", 10, PlacementAlgo::FirstFit).unwrap();
    let mut last = region.stats().success_rate_pct;
    for n in 0..5 {
        let _ = region.allocate(&format!("X{}", n), 1, PlacementAlgo::BestFit);
        let now = region.stats().success_rate_pct;
        assert!(now < last);
        last = now;
    }
}

#[test]
fn fresh_partitions_report_no_fragmentation() {
    let mut region = PartitionAllocator::partitioned(&[100, 200, 50]).unwrap();
    let stats = region.stats();
    assert_eq!(stats.total, 350);
    assert_eq!(stats.largest_free_block, 200);
    assert_eq!(stats.external_fragmentation, 0);
    assert_eq!(stats.free_block_count, 3);

    region.allocate("P1", 20, PlacementAlgo::BestFit).unwrap();
    let stats = region.stats();
    // 30 + 100 + 200 free, largest 200.
    assert_eq!(stats.external_fragmentation, 130);
    assert_eq!(stats.utilization_pct, 5.7);
    assert_eq!(stats.block_count, 4);
}

#[test]
fn next_fit_resumes_after_any_allocation() {
    let mut region = PartitionAllocator::partitioned(&[50, 50, 50]).unwrap();
    // Best-fit fills the first block exactly; the shared cursor moves past it.
    region.allocate("A", 50, PlacementAlgo::BestFit).unwrap();
    assert_eq!(region.cursor(), 1);
    let out = region.allocate("B", 10, PlacementAlgo::NextFit).unwrap();
    assert_eq!(out.block_id, 2);
    let out = region.allocate("C", 10, PlacementAlgo::NextFit).unwrap();
    assert_eq!(out.block_id, 4);
    assert_eq!(shape(&region), vec![
        (50, Some("A")),
        (10, Some("B")),
        (10, Some("C")),
        (30, None),
        (50, None),
    ]);
}

#[test]
fn next_fit_wraps_before_giving_up() {
    let mut region = PartitionAllocator::partitioned(&[30, 10, 10]).unwrap();
    region.allocate("A", 10, PlacementAlgo::BestFit).unwrap();
    assert_eq!(region.cursor(), 2);
    // Nothing at or past the cursor fits, so the scan wraps to the front.
    let out = region.allocate("B", 25, PlacementAlgo::NextFit).unwrap();
    assert_eq!(out.block_id, 1);
    assert!(region.allocate("C", 25, PlacementAlgo::NextFit).is_err());
}

#[test]
fn cursor_resets_when_blocks_vanish() {
    let mut region = PartitionAllocator::uniform(100).unwrap();
    region.allocate("A", 30, PlacementAlgo::FirstFit).unwrap();
    region.allocate("B", 30, PlacementAlgo::FirstFit).unwrap();
    assert_eq!(region.cursor(), 2);
    region.deallocate("A").unwrap();
    assert_eq!(region.cursor(), 2);
    region.deallocate("B").unwrap();
    assert_eq!(region.blocks().len(), 1);
    assert_eq!(region.cursor(), 0);
}

#[test]
fn random_workloads_keep_invariants() {
    let mut rng = StdRng::seed_from_u64(0xB10C);
    for algo in PlacementAlgo::ALL {
        let mut region = PartitionAllocator::partitioned(&[64, 128, 256, 512]).unwrap();
        let mut live: Vec<String> = vec![];
        for n in 0..500 {
            if live.is_empty() || rng.gen_bool(0.6) {
                let owner = format!("P{}", n);
                if region.allocate(&owner, rng.gen_range(1..200), algo).is_ok() {
                    live.push(owner);
                }
            } else {
                let owner = live.swap_remove(rng.gen_range(0..live.len()));
                region.deallocate(&owner).unwrap();
                assert!(no_free_neighbours(&region));
            }
            let sum: Units = region.blocks().iter().map(|b| b.size).sum();
            assert_eq!(sum, 960);
            assert_eq!(region.blocks().iter().filter(|b| b.is_allocated).count(), live.len());
            assert!(region.cursor() < region.blocks().len());
        }
    }
}

#[test]
fn bad_regions_are_refused() {
    assert!(matches!(PartitionAllocator::uniform(0), Err(SimError::BadConfig(_))));
    assert!(matches!(PartitionAllocator::partitioned(&[]), Err(SimError::BadConfig(_))));
    assert!(matches!(PartitionAllocator::partitioned(&[10, 0]), Err(SimError::BadConfig(_))));
}

#[test]
fn blocks_serialize_for_consumers() {
    let region = PartitionAllocator::uniform(8).unwrap();
    let json = serde_json::to_value(region.blocks()).unwrap();
    assert_eq!(json, serde_json::json!([
        { "id": 1, "size": 8, "isAllocated": false, "ownerId": null }
    ]));
}
//---END PARTITION ALLOCATOR---

//---START PAGING SIMULATOR---
#[test]
fn fifo_hand_trace() {
    let sim = run(3, &[1, 2, 3, 4, 1, 2, 5], ReplacementAlgo::Fifo);
    let h = sim.history();
    assert!(h.iter().all(|r| !r.hit));
    assert_eq!(evictions(&sim), vec![None, None, None, Some(1), Some(2), Some(3), Some(4)]);
    assert_eq!(h[0].frames, vec![Some(1), None, None]);
    assert_eq!(h[0].reason, "Frame 0 is empty → placed Page 1");
    assert_eq!(h[3].frames, vec![Some(4), Some(2), Some(3)]);
    assert_eq!(h[3].reason, "FIFO: Page 1 (Frame 0) is oldest → evicted, placed Page 4");
    assert_eq!(h[4].frames, vec![Some(4), Some(1), Some(3)]);
    assert_eq!(h[6].frames, vec![Some(5), Some(1), Some(2)]);
    assert_eq!(sim.stats().faults, 7);
}

#[test]
fn lru_and_fifo_part_ways_on_a_hit() {
    let refs = [1, 2, 1, 3, 4];
    let fifo = run(3, &refs, ReplacementAlgo::Fifo);
    let lru = run(3, &refs, ReplacementAlgo::Lru);
    assert!(fifo.history()[2].hit && lru.history()[2].hit);
    assert_eq!(fifo.history()[2].reason, "Page 1 is already in Frame 0 → HIT");
    assert_eq!(fifo.frames(), &[Some(4), Some(2), Some(3)]);
    assert_eq!(lru.frames(), &[Some(1), Some(4), Some(3)]);
    assert_eq!(
        lru.history()[4].reason,
        "LRU: Page 2 (Frame 1) was least recently used → evicted, placed Page 4"
    );
}

#[test]
fn optimal_hand_trace() {
    let sim = run(3, &[1, 2, 3, 4, 1, 2, 5], ReplacementAlgo::Optimal);
    assert_eq!(evictions(&sim), vec![None, None, None, Some(3), None, None, Some(1)]);
    assert_eq!(sim.frames(), &[Some(5), Some(2), Some(4)]);
    let stats = sim.stats();
    assert_eq!((stats.hits, stats.faults), (2, 5));
    assert_eq!(stats.hit_ratio_pct, 28.6);
    assert_eq!(stats.fault_ratio_pct, 71.4);
}

#[test]
fn clock_hand_trace() {
    let sim = run(3, &[1, 2, 3, 4, 1, 2, 5], ReplacementAlgo::Clock);
    assert_eq!(evictions(&sim), vec![None, None, None, Some(1), Some(2), Some(3), Some(4)]);
    assert_eq!(
        sim.history()[3].reason,
        "Clock: Page 1 (Frame 0) has ref bit 0 → evicted, placed Page 4"
    );
}

#[test]
fn textbook_fault_counts() {
    let faults = |algo| run(3, &SILBERSCHATZ, algo).stats().faults;
    assert_eq!(faults(ReplacementAlgo::Fifo), 15);
    assert_eq!(faults(ReplacementAlgo::Lru), 12);
    assert_eq!(faults(ReplacementAlgo::Optimal), 9);
}

#[test]
fn optimal_never_loses_to_lru() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..50 {
        let refs: Vec<PageNum> = (0..30).map(|_| rng.gen_range(0..6)).collect();
        for frames in 1..=4 {
            let opt = run(frames, &refs, ReplacementAlgo::Optimal).stats().faults;
            let lru = run(frames, &refs, ReplacementAlgo::Lru).stats().faults;
            assert!(opt <= lru);
        }
    }
}

#[test]
fn run_all_matches_stepping() {
    for algo in ReplacementAlgo::ALL {
        let bulk = run(3, &SILBERSCHATZ, algo);
        let mut manual = PagingSimulator::new(3, SILBERSCHATZ.to_vec(), algo).unwrap();
        for _ in 0..SILBERSCHATZ.len() {
            assert!(manual.step().is_some());
        }
        assert_eq!(bulk.history(), manual.history());
        assert_eq!(bulk.stats(), manual.stats());
    }
}

#[test]
fn history_tracks_frame_table() {
    let mut sim = PagingSimulator::new(2, SILBERSCHATZ.to_vec(), ReplacementAlgo::Clock).unwrap();
    while let Some(rec) = sim.step().cloned() {
        assert_eq!(rec.frames, sim.frames());
        assert_eq!(sim.history().len(), sim.current_step());
        let mut seen: Vec<PageNum> = sim.frames().iter().flatten().copied().collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), sim.frames().iter().flatten().count());
    }
}

#[test]
fn done_is_sticky() {
    let mut sim = PagingSimulator::new(2, vec![3, 3], ReplacementAlgo::Lru).unwrap();
    assert!(sim.step().is_some());
    assert!(sim.step().is_some());
    assert!(sim.is_done());
    for _ in 0..3 {
        assert!(sim.step().is_none());
    }
    assert_eq!(sim.history().len(), 2);
    assert_eq!(sim.stats().hits, 1);

    let empty = PagingSimulator::new(4, vec![], ReplacementAlgo::Optimal).unwrap();
    assert_eq!(empty.stats().hit_ratio_pct, 0.0);
    assert_eq!(empty.stats().fault_ratio_pct, 0.0);
}

#[test]
fn clock_only_evicts_clear_bits() {
    let mut rng = StdRng::seed_from_u64(7);
    let refs: Vec<PageNum> = (0..200).map(|_| rng.gen_range(0..9)).collect();
    let mut sim = PagingSimulator::new(4, refs, ReplacementAlgo::Clock).unwrap();
    loop {
        let (bits, hand) = match sim.policy() {
            Policy::Clock { bits, hand }    => (bits.clone(), *hand),
            _                               => unreachable!(),
        };
        let Some(rec) = sim.step().cloned() else { break };
        if rec.evicted.is_none() {
            continue;
        }
        let expected = if bits.iter().all(|b| *b) {
            hand
        } else {
            let mut idx = hand;
            while bits[idx] {
                idx = (idx + 1) % bits.len();
            }
            idx
        };
        assert_eq!(rec.frame, expected);
    }
}

#[test]
fn clock_bits_follow_the_hand() {
    let warm = run(3, &[1, 2, 3], ReplacementAlgo::Clock);
    assert_eq!(warm.policy().clock_bits(), Some(&[true, true, true][..]));
    // A full sweep clears every bit before frame 0 is reused.
    let swept = run(3, &[1, 2, 3, 4], ReplacementAlgo::Clock);
    assert_eq!(swept.policy().clock_bits(), Some(&[true, false, false][..]));
    assert_eq!(run(3, &[1], ReplacementAlgo::Fifo).policy().clock_bits(), None);
}

#[test]
fn tags_and_frames_are_checked() {
    assert!(matches!(
        PagingSimulator::with_tag(3, vec![1], "random"),
        Err(SimError::UnknownAlgorithm(_))
    ));
    assert!(matches!(
        PagingSimulator::new(0, vec![1], ReplacementAlgo::Fifo),
        Err(SimError::BadConfig(_))
    ));
    let sim = PagingSimulator::with_tag(3, vec![1], "Clock").unwrap();
    assert_eq!(sim.algo(), ReplacementAlgo::Clock);
}
//---END PAGING SIMULATOR---

//---START COMPARISONS---
#[test]
fn all_policies_side_by_side() {
    let summary = compare_replacement(3, &SILBERSCHATZ).unwrap();
    let algos: Vec<ReplacementAlgo> = summary.iter().map(|s| s.algo).collect();
    assert_eq!(algos, ReplacementAlgo::ALL.to_vec());
    let faults: Vec<usize> = summary.iter().map(|s| s.stats.faults).collect();
    assert_eq!(&faults[..3], &[15, 12, 9]);
    assert!(summary.iter().all(|s| s.stats.total_refs == 20));
}

#[test]
fn fifo_shows_beladys_anomaly() {
    let curve = fault_curve(ReplacementAlgo::Fifo, &BELADY, 1..=5).unwrap();
    let faults: Vec<usize> = curve.iter().map(|p| p.faults).collect();
    assert_eq!(faults, vec![12, 12, 9, 10, 5]);
    assert_eq!(belady_anomalies(&curve), vec![CurvePoint { frames: 4, faults: 10 }]);

    let lru = fault_curve(ReplacementAlgo::Lru, &BELADY, 1..=5).unwrap();
    assert!(belady_anomalies(&lru).is_empty());
}

#[test]
fn placement_policies_side_by_side() {
    let script = vec![
        Request::Alloc { owner: "A".into(), size: 30 },
        Request::Alloc { owner: "B".into(), size: 20 },
        Request::Alloc { owner: "C".into(), size: 30 },
        Request::Free { owner: "B".into() },
        Request::Alloc { owner: "D".into(), size: 15 },
        Request::Alloc { owner: "E".into(), size: 25 },
    ];
    let summary = compare_placement(&RegionLayout::Uniform(110), &script).unwrap();
    let algos: Vec<PlacementAlgo> = summary.iter().map(|s| s.algo).collect();
    assert_eq!(algos, PlacementAlgo::ALL.to_vec());
    // First and best fit drop D into B's old hole and keep the tail for E.
    for s in &summary[..2] {
        assert_eq!(s.rejected, 0);
        assert_eq!(s.stats.used, 100);
        assert_eq!(s.stats.external_fragmentation, 5);
    }
    // Worst and next fit spend the tail on D, leaving no room for E.
    for s in &summary[2..] {
        assert_eq!(s.rejected, 1);
        assert_eq!(s.stats.used, 75);
        assert_eq!(s.stats.external_fragmentation, 15);
    }
}
//---END COMPARISONS---
