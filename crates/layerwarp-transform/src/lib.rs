//! # Layerwarp Transform
//!
//! Applies one geometric transform to every selected layer of a document
//! while preserving the user's selection.
//!
//! ## Components
//!
//! - **descriptors**: pure builders for the host action descriptors
//! - **target**: pixels-or-mask resolution per layer
//! - **snapshot**: selection capture through a temporary carrier layer
//! - **orchestrator**: the run state machine
//! - **transaction**: history suspension around a run
//! - **gate**: one run per document at a time
//! - **params**: panel input translation
//!
//! [`MultiLayerTransform`] is the usual entry point.

pub mod command;
pub mod descriptors;
pub mod error;
mod exec;
pub mod gate;
pub mod multi_layer;
pub mod orchestrator;
pub mod params;
pub mod snapshot;
pub mod target;
pub mod transaction;

pub use command::TransformCommand;
pub use descriptors::DescriptorTarget;
pub use error::{Result, TransformError};
pub use gate::{OperationGate, OperationPermit};
pub use multi_layer::MultiLayerTransform;
pub use orchestrator::{ProcessedLayer, TransformOrchestrator, TransformReport, TransformRequest};
pub use params::{MoveDirection, RotateDirection};
pub use snapshot::{SelectionSnapshot, SnapshotState};
pub use target::{resolve_target, target_for};
pub use transaction::with_suspended_history;
