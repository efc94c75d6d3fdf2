//! Seeded synthetic workloads.
//!
//! Same seed, same workload: comparisons and tests stay reproducible.
use crate::utils::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// How far back a local reference may reach.
pub const LOCALITY_WINDOW: usize = 4;

/// Share of script entries that free a live owner, once one exists.
const FREE_RATIO: f64 = 0.35;

/// A fixed seed gives a reproducible stream; `None` draws one from the OS.
pub fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None    => StdRng::from_entropy(),
    }
}

/// `len` references to pages `0..pages`.
///
/// With probability `locality` a reference repeats one of the last
/// [`LOCALITY_WINDOW`] references; otherwise it is drawn uniformly.
/// `locality` is clamped to `[0, 1]`.
pub fn reference_string<R: Rng>(rng: &mut R, len: usize, pages: usize, locality: f64) -> Vec<PageNum> {
    let pages = pages.max(1);
    let locality = if locality.is_nan() { 0.0 } else { locality.clamp(0.0, 1.0) };
    let mut refs: Vec<PageNum> = Vec::with_capacity(len);
    for _ in 0..len {
        let recent = refs.len().min(LOCALITY_WINDOW);
        let page = if recent > 0 && rng.gen_bool(locality) {
            refs[refs.len() - 1 - rng.gen_range(0..recent)]
        } else {
            rng.gen_range(0..pages)
        };
        refs.push(page);
    }
    debug!("Generated {} references over {} pages", refs.len(), pages);

    refs
}

/// `ops` requests for owners `P1`, `P2`, ... with sizes in
/// `1..=max_size`. Frees only ever name an owner that is live at that
/// point of the script.
pub fn alloc_script<R: Rng>(rng: &mut R, ops: usize, max_size: Units) -> Vec<Request> {
    let max_size = max_size.max(1);
    let mut live: Vec<String> = vec![];
    let mut next = 1;

    (0..ops)
        .map(|_| {
            if !live.is_empty() && rng.gen_bool(FREE_RATIO) {
                let owner = live.swap_remove(rng.gen_range(0..live.len()));
                Request::Free { owner }
            } else {
                let owner = format!("P{}", next);
                next += 1;
                live.push(owner.clone());
                Request::Alloc { owner, size: rng.gen_range(1..=max_size) }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_references() {
        let a = reference_string(&mut rng(Some(7)), 64, 8, 0.6);
        let b = reference_string(&mut rng(Some(7)), 64, 8, 0.6);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.iter().all(|&p| p < 8));
    }

    #[test]
    fn full_locality_sticks_to_first_page() {
        let refs = reference_string(&mut rng(Some(1)), 20, 50, 1.0);
        assert!(refs.iter().all(|&p| p == refs[0]));
    }

    #[test]
    fn frees_name_live_owners() {
        let script = alloc_script(&mut rng(Some(42)), 200, 64);
        let mut live = std::collections::HashSet::new();
        for req in &script {
            match req {
                Request::Alloc { owner, size }  => {
                    assert!((1..=64).contains(size));
                    assert!(live.insert(owner.clone()));
                },
                Request::Free { owner }         => assert!(live.remove(owner)),
            }
        }
    }
}
