pub use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
};
pub use thiserror::Error;
pub use itertools::Itertools;
pub use serde::Serialize;
pub use log::{debug, info, warn, LevelFilter};
pub use clap::{Parser, ValueEnum};
pub use simcore::*;

/// Frame counts outside this range are refused before a simulator is
/// ever built.
pub const MAX_FRAMES: usize = 10;

/// Whatever keeps a front-end request from reaching, or getting through,
/// an engine. Displayed as-is to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CtlError {
    #[error("Please enter a valid memory size.")]
    BadTotal,
    #[error("Please enter partition sizes.")]
    NoPartitions,
    #[error("Invalid partition sizes. Use positive numbers separated by commas.")]
    BadPartitions,
    #[error("Please enter a Process ID.")]
    NoOwner,
    #[error("Please enter a valid Process Size.")]
    BadSize,
    #[error("Number of frames must be between 1 and 10.")]
    FramesOutOfRange,
    #[error("Please enter a reference string.")]
    NoReferences,
    #[error("Reference string must contain non-negative integers separated by spaces or commas.")]
    BadReferences,
    #[error("Unrecognized command: {0}")]
    UnknownCommand(String),
    #[error("Memory has not been initialized.")]
    NotConfigured,
    #[error("All references have been processed. Reset to start over.")]
    Exhausted,
    #[error(transparent)]
    Engine(#[from] SimError),
}
