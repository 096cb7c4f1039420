//! Event system for transform runs
//!
//! Provides:
//! - Event types for orchestrator state changes and per-layer outcomes
//! - Event dispatcher for publishing events to subscribers

use crate::data::{DocumentId, LayerId, OperationState, TransformKind, TransformTarget};
use tokio::sync::broadcast;

/// Transform event types
#[derive(Debug, Clone, PartialEq)]
pub enum TransformEvent {
    /// A run started against a document
    Started {
        /// Document being edited.
        document: DocumentId,
        /// Transform being applied.
        kind: TransformKind,
    },
    /// Orchestrator state changed
    StateChanged {
        /// Previous state.
        from: OperationState,
        /// New state.
        to: OperationState,
    },
    /// A layer received the primary transform
    LayerTransformed {
        /// Layer that was transformed.
        layer: LayerId,
        /// Whether pixels or mask were transformed.
        target: TransformTarget,
    },
    /// A layer had neither editable pixels nor a mask
    LayerSkipped {
        /// Layer that was skipped.
        layer: LayerId,
    },
    /// The run finished
    Completed {
        /// Number of layers transformed.
        processed: usize,
        /// Number of layers skipped.
        skipped: usize,
    },
    /// The run failed
    Failed {
        /// Error description.
        reason: String,
    },
}

impl std::fmt::Display for TransformEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformEvent::Started { document, kind } => {
                write!(f, "Started {} on {}", kind, document)
            }
            TransformEvent::StateChanged { from, to } => write!(f, "State: {} -> {}", from, to),
            TransformEvent::LayerTransformed { layer, target } => {
                write!(f, "Transformed {} ({})", layer, target)
            }
            TransformEvent::LayerSkipped { layer } => write!(f, "Skipped {}", layer),
            TransformEvent::Completed { processed, skipped } => {
                write!(f, "Completed: {} transformed, {} skipped", processed, skipped)
            }
            TransformEvent::Failed { reason } => write!(f, "Failed: {}", reason),
        }
    }
}

/// Event dispatcher for publishing events to subscribers
#[derive(Clone)]
pub struct EventDispatcher {
    /// Broadcast sender channel for transform events.
    tx: broadcast::Sender<TransformEvent>,
}

impl EventDispatcher {
    /// Create a new event dispatcher
    ///
    /// # Arguments
    /// * `buffer_size` - Size of the broadcast buffer (default 100)
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer_size);
        Self { tx }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<TransformEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all subscribers
    ///
    /// Returns the number of subscribers reached; zero when nobody listens.
    pub fn publish(&self, event: TransformEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Get number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(100)
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
