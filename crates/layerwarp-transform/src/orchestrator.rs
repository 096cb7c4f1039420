//! Multi-layer transform orchestrator
//!
//! Drives one transform across every target layer of the active document:
//!
//! ```text
//! Init -> Snapshotting -> ProcessingLayers -> Restoring -> Done
//!   \________________________________________________/
//!                         |
//!                       Failed
//! ```
//!
//! Host commands are awaited strictly in sequence. All layers share one
//! selection and one active-layer state in the document, so per-layer work
//! is never overlapped.

use layerwarp_core::{
    DocumentId, DocumentSnapshot, EventDispatcher, Host, HostError, LayerId, LayerInfo,
    OperationState, TransformEvent, TransformKind, TransformTarget,
};
use layerwarp_settings::TransformConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::Instrument;

use crate::command::TransformCommand;
use crate::descriptors;
use crate::error::{Result, TransformError};
use crate::exec::{execute, execute_all};
use crate::gate::OperationPermit;
use crate::snapshot::SelectionSnapshot;
use crate::target::resolve_target;
use crate::transaction::with_suspended_history;

/// Parameters of one run as collected from the UI
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformRequest {
    /// Transform to apply
    pub command: TransformCommand,
    /// Transform hidden active layers too
    pub include_hidden_layers: bool,
}

impl TransformRequest {
    /// Request that skips hidden layers
    pub fn new(command: TransformCommand) -> Self {
        Self {
            command,
            include_hidden_layers: false,
        }
    }

    /// Set whether hidden layers are transformed
    pub fn with_hidden_layers(mut self, include: bool) -> Self {
        self.include_hidden_layers = include;
        self
    }
}

/// A layer that received the primary transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedLayer {
    /// Layer id
    pub layer: LayerId,
    /// Pixels or mask
    pub target: TransformTarget,
}

/// Outcome of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformReport {
    /// Document that was edited
    pub document: DocumentId,
    /// Transform kind
    pub kind: TransformKind,
    /// Transformed layers, in processing order
    pub processed: Vec<ProcessedLayer>,
    /// Layers with neither editable pixels nor a mask
    pub skipped: Vec<LayerId>,
    /// Whether a selection existed before the run
    pub had_selection: bool,
    /// Carrier layer used to hold the selection
    pub carrier: Option<LayerId>,
    /// Final orchestrator state
    pub state: OperationState,
}

impl TransformReport {
    fn new(document: DocumentId, kind: TransformKind) -> Self {
        Self {
            document,
            kind,
            processed: Vec::new(),
            skipped: Vec::new(),
            had_selection: false,
            carrier: None,
            state: OperationState::Init,
        }
    }

    /// Whether the run touched the host at all
    pub fn is_noop(&self) -> bool {
        self.carrier.is_none() && self.processed.is_empty() && self.skipped.is_empty()
    }
}

fn is_valid_transition(from: OperationState, to: OperationState) -> bool {
    use OperationState::*;
    matches!(
        (from, to),
        (Init, Snapshotting)
            | (Init, Done)
            | (Snapshotting, ProcessingLayers)
            | (ProcessingLayers, Restoring)
            | (Restoring, Done)
    ) || (to == Failed && !from.is_terminal())
}

/// One-shot state machine for a single multi-layer transform
pub struct TransformOrchestrator<H: Host> {
    host: Arc<H>,
    config: TransformConfig,
    command: TransformCommand,
    document: DocumentSnapshot,
    targets: Vec<LayerInfo>,
    state: OperationState,
    events: EventDispatcher,
    permit: Option<OperationPermit>,
}

impl<H: Host> TransformOrchestrator<H> {
    /// Snapshot the active document and compute the target layers
    ///
    /// The document is read once here and never re-queried.
    pub fn new(host: Arc<H>, request: TransformRequest, config: TransformConfig) -> Result<Self> {
        let document = host
            .active_document()
            .ok_or(TransformError::Host(HostError::NoActiveDocument))?;
        let targets = document.target_layers(request.include_hidden_layers);
        Ok(Self {
            host,
            config,
            command: request.command,
            document,
            targets,
            state: OperationState::Init,
            events: EventDispatcher::default(),
            permit: None,
        })
    }

    /// Hold `permit` until the run finishes
    ///
    /// The permit must have been acquired before this orchestrator was
    /// created, so the snapshot never observes another run's scaffolding.
    pub fn with_permit(mut self, permit: OperationPermit) -> Self {
        self.permit = Some(permit);
        self
    }

    /// Publish progress on `events`
    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    /// Current state
    pub fn state(&self) -> OperationState {
        self.state
    }

    /// Document snapshot taken at construction
    pub fn document(&self) -> &DocumentSnapshot {
        &self.document
    }

    /// Layers that will be considered for the transform
    pub fn target_layers(&self) -> &[LayerInfo] {
        &self.targets
    }

    fn transition(&mut self, to: OperationState) -> Result<()> {
        if !is_valid_transition(self.state, to) {
            return Err(TransformError::invalid_transition(
                self.state,
                format!("enter {}", to),
            ));
        }
        tracing::debug!("{} -> {}", self.state, to);
        self.events.publish(TransformEvent::StateChanged {
            from: self.state,
            to,
        });
        self.state = to;
        Ok(())
    }

    fn mark_failed(&mut self) {
        if self.state != OperationState::Failed {
            self.events.publish(TransformEvent::StateChanged {
                from: self.state,
                to: OperationState::Failed,
            });
            self.state = OperationState::Failed;
        }
    }

    /// Run the transform to completion
    pub async fn run(mut self) -> Result<TransformReport> {
        let span = tracing::info_span!(
            "transform",
            document = %self.document.id,
            kind = %self.command.kind()
        );
        async move { self.run_inner().await }.instrument(span).await
    }

    async fn run_inner(&mut self) -> Result<TransformReport> {
        let document = self.document.id;
        let mut report = TransformReport::new(document, self.command.kind());

        if self.targets.is_empty() {
            tracing::info!("No target layers, nothing to do");
            self.transition(OperationState::Done)?;
            report.state = self.state;
            return Ok(report);
        }

        if let Some(permit) = &self.permit {
            if permit.document() != document {
                return Err(TransformError::invalid_transition(
                    self.state,
                    format!("run {} under a permit for {}", document, permit.document()),
                ));
            }
        }

        tracing::info!(
            "Applying {} to {} layer(s)",
            self.command,
            self.targets.len()
        );
        self.events.publish(TransformEvent::Started {
            document,
            kind: self.command.kind(),
        });

        let host = Arc::clone(&self.host);
        let label = self.config.history_label.clone();
        let outcome =
            with_suspended_history(host.as_ref(), document, &label, self.drive(&mut report)).await;

        match outcome {
            Ok(()) => {
                report.state = self.state;
                tracing::info!(
                    "Transformed {} layer(s), skipped {}",
                    report.processed.len(),
                    report.skipped.len()
                );
                self.events.publish(TransformEvent::Completed {
                    processed: report.processed.len(),
                    skipped: report.skipped.len(),
                });
                Ok(report)
            }
            Err(e) => {
                self.mark_failed();
                tracing::error!("Transform failed: {}", e);
                self.events.publish(TransformEvent::Failed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Everything inside the history suspension
    async fn drive(&mut self, report: &mut TransformReport) -> Result<()> {
        self.transition(OperationState::Snapshotting)?;

        let carrier_name = self
            .config
            .carrier_name(chrono::Utc::now().timestamp_millis());
        let mut snapshot = SelectionSnapshot::new(self.document.id, carrier_name);

        let result = self.drive_with_snapshot(&mut snapshot, report).await;
        if result.is_err() {
            self.cleanup(&mut snapshot).await;
        }
        result
    }

    async fn drive_with_snapshot(
        &mut self,
        snapshot: &mut SelectionSnapshot,
        report: &mut TransformReport,
    ) -> Result<()> {
        let host = Arc::clone(&self.host);
        let host = host.as_ref();
        let document = self.document.id;

        let (carrier, had_selection) = snapshot.snapshot(host).await?;
        report.carrier = Some(carrier);
        report.had_selection = had_selection;

        self.transition(OperationState::ProcessingLayers)?;
        let primary = self.command.primary();
        for layer in &self.targets {
            let Some(target) = resolve_target(host, document, layer).await? else {
                tracing::warn!("Skipping {} ({}): no pixels or mask to edit", layer.id, layer.kind);
                report.skipped.push(layer.id);
                self.events
                    .publish(TransformEvent::LayerSkipped { layer: layer.id });
                continue;
            };

            snapshot.reload(host).await?;
            let select = match target {
                TransformTarget::LayerMask => descriptors::select_layer_mask(layer.id),
                TransformTarget::LayerPixels => descriptors::select_layer(layer.id, false),
            };
            execute(host, &select).await?;
            execute(host, &primary).await?;

            tracing::debug!("Transformed {} ({})", layer.id, target);
            report.processed.push(ProcessedLayer {
                layer: layer.id,
                target,
            });
            self.events.publish(TransformEvent::LayerTransformed {
                layer: layer.id,
                target,
            });
        }

        self.transition(OperationState::Restoring)?;
        let follow_up = self.command.selection_equivalent();
        snapshot.restore(host, Some(&follow_up)).await?;
        execute_all(
            host,
            &descriptors::select_layers(&self.document.active_layer_ids()),
        )
        .await?;

        self.transition(OperationState::Done)
    }

    /// Undo the run's scaffolding after a failure
    async fn cleanup(&self, snapshot: &mut SelectionSnapshot) {
        let Some(carrier) = snapshot.carrier() else {
            if self.config.cleanup_on_failure {
                snapshot.discard(self.host.as_ref()).await;
            }
            return;
        };

        if !self.config.cleanup_on_failure {
            tracing::warn!(
                "Carrier layer {} ({}) left in the document",
                carrier,
                snapshot.carrier_name()
            );
            return;
        }

        tracing::info!("Cleaning up carrier {} after failure", carrier);
        snapshot.discard(self.host.as_ref()).await;
        let reselect = descriptors::select_layers(&self.document.active_layer_ids());
        if let Err(e) = execute_all(self.host.as_ref(), &reselect).await {
            tracing::warn!("Could not reselect original layers: {}", e);
        }
    }
}

impl<H: Host> std::fmt::Debug for TransformOrchestrator<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformOrchestrator")
            .field("document", &self.document.id)
            .field("command", &self.command)
            .field("targets", &self.targets.len())
            .field("state", &self.state)
            .finish()
    }
}
