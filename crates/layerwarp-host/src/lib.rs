//! # Layerwarp Host
//!
//! A simulated host application for layerwarp. It implements the document
//! query, command channel and history contracts by interpreting action
//! descriptors against an in-memory document, and records every call so
//! tests can assert on exact command sequences.

pub mod document;
pub mod region;
pub mod simulated;

pub use document::{AppliedTransform, EditTarget, SimDocument, SimLayer};
pub use region::Region;
pub use simulated::{HistoryCall, SimulatedHost};
