//! Plain-text and JSON renderings of engine state.
use crate::utils::*;
use crate::session::EventLog;
use simcore::compare::{CurvePoint, PlacementSummary, ReplacementSummary};

// Left-aligned row labels, right-aligned cells, all cells one width.
fn render(rows: &[(String, Vec<String>)]) -> String {
    let label_w = rows.iter()
        .map(|(label, _)| label.len())
        .max()
        .unwrap_or(0);
    let cell_w = rows.iter()
        .flat_map(|(_, cells)| cells.iter().map(String::len))
        .max()
        .unwrap_or(0);

    rows.iter()
        .map(|(label, cells)| {
            let body = cells.iter()
                .map(|c| format!("{:>w$}", c, w = cell_w))
                .join(" ");
            format!("{:<w$} | {}", label, body, w = label_w)
                .trim_end()
                .to_owned()
        })
        .join("\n")
}

/// One line per block, in address order.
pub fn block_table(blocks: &[MemoryBlock]) -> String {
    let header = format!("{:>4} {:>8}  {:<9}  {}", "Id", "Size", "Status", "Owner");
    let lines = blocks.iter()
        .map(|b| {
            let status = if b.is_allocated { "Allocated" } else { "Free" };
            format!(
                "{:>4} {:>6}KB  {:<9}  {}",
                b.id, b.size, status, b.owner.as_deref().unwrap_or("-")
            )
            .trim_end()
            .to_owned()
        });

    std::iter::once(header).chain(lines).join("\n")
}

pub fn alloc_summary(stats: &AllocStats) -> String {
    [
        format!("Total: {}KB  Used: {}KB  Free: {}KB", stats.total, stats.used, stats.free),
        format!("Utilization: {:.1}%", stats.utilization_pct),
        format!("External fragmentation: {}KB", stats.external_fragmentation),
        format!("Largest free block: {}KB", stats.largest_free_block),
        format!("Free blocks: {} of {}", stats.free_block_count, stats.block_count),
        format!("Success rate: {:.1}%", stats.success_rate_pct),
    ].join("\n")
}

/// The textbook table: one column per served reference, one row per
/// frame. A page written by a fault shows as `[p]`, the page that
/// satisfied a hit as `(p)`, an empty frame as `-`.
pub fn paging_grid(history: &[StepRecord], num_frames: usize) -> String {
    let mut rows = Vec::with_capacity(num_frames + 2);
    rows.push((
        String::from("Reference"),
        history.iter().map(|r| r.reference.to_string()).collect(),
    ));
    for f in 0..num_frames {
        let cells = history.iter()
            .map(|r| match r.frames.get(f).copied().flatten() {
                None                                => String::from("-"),
                Some(p) if r.frame == f && r.hit    => format!("({})", p),
                Some(p) if r.frame == f             => format!("[{}]", p),
                Some(p)                             => p.to_string(),
            })
            .collect();
        rows.push((format!("Frame {}", f), cells));
    }
    rows.push((
        String::from("Status"),
        history.iter()
            .map(|r| String::from(if r.hit { "HIT" } else { "MISS" }))
            .collect(),
    ));

    render(&rows)
}

pub fn paging_summary(stats: &PagingStats) -> String {
    [
        format!("References: {}", stats.total_refs),
        format!("Hits: {} ({:.1}%)", stats.hits, stats.hit_ratio_pct),
        format!("Faults: {} ({:.1}%)", stats.faults, stats.fault_ratio_pct),
    ].join("\n")
}

/// Step-by-step justifications, numbered from 1.
pub fn step_reasons(history: &[StepRecord]) -> String {
    history.iter()
        .enumerate()
        .map(|(i, r)| format!("{:>3}. {}", i + 1, r.reason))
        .join("\n")
}

pub fn event_log(log: &EventLog) -> String {
    log.entries()
        .iter()
        .map(|e| format!("[{:>3}] {:<7} {}", e.seq, e.kind.tag(), e.message))
        .join("\n")
}

pub fn timeline(points: &[f64]) -> String {
    points.iter()
        .map(|p| format!("{:.1}%", p))
        .join(" -> ")
}

pub fn replacement_table(summaries: &[ReplacementSummary]) -> String {
    let header = format!("{:<8} {:>6} {:>6} {:>8}", "Policy", "Hits", "Faults", "Hit %");
    let lines = summaries.iter()
        .map(|s| format!(
            "{:<8} {:>6} {:>6} {:>7.1}%",
            s.algo.label(), s.stats.hits, s.stats.faults, s.stats.hit_ratio_pct
        ));

    std::iter::once(header).chain(lines).join("\n")
}

pub fn placement_table(summaries: &[PlacementSummary]) -> String {
    let header = format!(
        "{:<9} {:>8} {:>8} {:>10} {:>8}",
        "Policy", "Rejected", "Used", "Ext. frag", "Success"
    );
    let lines = summaries.iter()
        .map(|s| format!(
            "{:<9} {:>8} {:>6}KB {:>8}KB {:>7.1}%",
            s.algo.tag(), s.rejected, s.stats.used, s.stats.external_fragmentation, s.stats.success_rate_pct
        ));

    std::iter::once(header).chain(lines).join("\n")
}

/// Fault counts per frame count. Points that break monotonicity are
/// flagged.
pub fn curve_table(curve: &[CurvePoint], anomalies: &[CurvePoint]) -> String {
    let header = format!("{:>6} {:>6}", "Frames", "Faults");
    let lines = curve.iter()
        .map(|p| {
            let flag = if anomalies.contains(p) { "  <- Belady" } else { "" };
            format!("{:>6} {:>6}{}", p.frames, p.faults, flag)
        });

    std::iter::once(header).chain(lines).join("\n")
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}
