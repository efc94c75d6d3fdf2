//! Front-end plumbing for `simcore`.
//!
//! Everything a user-facing driver needs and the engines deliberately
//! leave out: turning raw text into validated parameters, holding one
//! engine per session, keeping a human-readable event log, generating
//! workloads and rendering results as text or JSON.

pub mod utils;
pub mod input;
pub mod session;
pub mod report;
pub mod workload;
pub mod logger;
pub mod cli;

pub use crate::{
    input::Command,
    session::{Event, EventKind, EventLog, MemorySession, PagingSession},
    utils::CtlError,
};
