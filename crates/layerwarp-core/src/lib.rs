//! # Layerwarp Core
//!
//! Core types, traits, and utilities for layerwarp.
//! Provides the document/layer snapshot model, the action descriptors
//! exchanged with the host, the host service contracts, and the
//! error and event types shared by the other crates.

pub mod data;
pub mod descriptor;
pub mod error;
pub mod events;
pub mod host;
pub mod units;

pub use data::{
    DocumentId, DocumentSnapshot, LayerId, LayerInfo, LayerKind, OperationState, TransformKind,
    TransformTarget,
};

pub use descriptor::{Descriptor, DescriptorResult};

pub use error::{HostError, Result};

pub use events::{EventDispatcher, TransformEvent};

pub use host::{CommandChannel, DocumentQuery, HistoryControl, Host, SuspensionToken};

pub use units::{ScaleUnit, TransformCenter};
