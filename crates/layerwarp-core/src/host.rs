//! Host service contracts
//!
//! The orchestrator never touches the host document directly. It reads a
//! snapshot of the active document once, sends descriptors through the
//! command channel one at a time, and brackets the whole run in a history
//! suspension so the host records a single undo step.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::{DocumentId, DocumentSnapshot};
use crate::descriptor::{Descriptor, DescriptorResult};
use crate::error::Result;

/// Opaque handle returned by a history suspension
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SuspensionToken(pub String);

impl fmt::Display for SuspensionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only access to the host document model
pub trait DocumentQuery: Send + Sync {
    /// The active document with its active layers, or `None` if nothing is open
    fn active_document(&self) -> Option<DocumentSnapshot>;
}

/// Channel that applies one descriptor and returns one result
///
/// Completion is awaited before the next descriptor is sent; callers never
/// keep two mutating descriptors in flight.
#[async_trait]
pub trait CommandChannel: Send + Sync {
    /// Apply a descriptor
    async fn execute(&self, descriptor: &Descriptor) -> Result<DescriptorResult>;
}

/// Host undo-grouping primitive
#[async_trait]
pub trait HistoryControl: Send + Sync {
    /// Stop recording individual history states for a document
    async fn suspend_history(
        &self,
        document: DocumentId,
        label: &str,
    ) -> Result<SuspensionToken>;

    /// Resume recording; everything since the suspension becomes one step
    async fn resume_history(&self, token: SuspensionToken) -> Result<()>;
}

/// Everything the orchestrator needs from the host
pub trait Host: DocumentQuery + CommandChannel + HistoryControl {}

impl<T> Host for T where T: DocumentQuery + CommandChannel + HistoryControl {}
