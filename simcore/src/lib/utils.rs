pub use std::{
    collections::VecDeque,
    fmt,
    ops::RangeInclusive,
    str::FromStr,
};
pub use thiserror::Error;
pub use itertools::Itertools;
pub use rayon::prelude::*;
pub use serde::Serialize;
pub use log::{debug, info, warn};

pub use crate::MemoryBlock;

/// The unit in which block sizes are measured. The engines attach no
/// meaning to it; messages call it "KB" because that is what the
/// classroom examples use.
pub type Units = usize;

/// Block identifiers start at 1 and only ever grow.
pub type BlockId = u32;

/// Page numbers are opaque symbols. No address translation happens
/// anywhere, so any non-negative integer will do.
pub type PageNum = usize;

/// Contents of the frame table, slot by slot. `None` is an empty frame.
pub type FrameTable = Vec<Option<PageNum>>;

/// Every way an engine operation can be turned down. None of these are
/// fatal: the engine is left exactly as it was (bar the allocator's
/// attempt counter) and the caller may carry on.
///
/// The `Display` output is the message meant for the end user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("Process ID {0} already exists.")]
    DuplicateOwner(String),
    #[error("Allocation failed: No suitable block found using {0}.")]
    NoFit(String),
    #[error("Process ID {0} not found.")]
    OwnerNotFound(String),
    #[error("Unknown algorithm: {0}.")]
    UnknownAlgorithm(String),
    /// The engine was handed a configuration it cannot simulate. Front
    /// ends are supposed to catch these first.
    #[error("Invalid configuration: {0}")]
    BadConfig(String),
}

pub type SimResult<T> = Result<T, SimError>;

/// `count / total` as a percentage, rounded to one decimal place.
/// An empty total yields `0.0`.
pub fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (count as f64 / total as f64 * 1000.0).round() / 10.0
    }
}

/// Normalizes an algorithm tag so that `firstFit`, `first-fit`,
/// `first_fit` and `FIRST FIT` all compare equal.
pub(crate) fn fold_tag(tag: &str) -> String {
    tag.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_to_one_decimal() {
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(1, 3), 33.3);
        assert_eq!(percent(2, 3), 66.7);
        assert_eq!(percent(60, 100), 60.0);
        assert_eq!(percent(7, 7), 100.0);
    }

    #[test]
    fn tags_fold_across_spellings() {
        assert_eq!(fold_tag("firstFit"), "firstfit");
        assert_eq!(fold_tag("first-fit"), "firstfit");
        assert_eq!(fold_tag("FIRST_FIT"), "firstfit");
    }
}
