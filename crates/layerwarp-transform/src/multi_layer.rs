//! Entry points for panel buttons
//!
//! [`MultiLayerTransform`] owns everything that outlives a single run: the
//! host handle, configuration, event dispatcher and per-document gate. Each
//! call waits for the document's permit, then takes a fresh document
//! snapshot and runs one orchestrator.

use layerwarp_core::{
    EventDispatcher, Host, HostError, ScaleUnit, TransformCenter, TransformEvent,
};
use layerwarp_settings::TransformConfig;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::command::TransformCommand;
use crate::error::{Result, TransformError};
use crate::gate::OperationGate;
use crate::orchestrator::{TransformOrchestrator, TransformReport, TransformRequest};

/// Applies transforms to every active layer of the host's document
pub struct MultiLayerTransform<H: Host> {
    host: Arc<H>,
    config: TransformConfig,
    events: EventDispatcher,
    gate: Arc<OperationGate>,
}

impl<H: Host> MultiLayerTransform<H> {
    /// Create the entry point for `host`
    pub fn new(host: Arc<H>, config: TransformConfig) -> Self {
        let gate = Arc::new(OperationGate::new(config.reentrancy));
        Self {
            host,
            config,
            events: EventDispatcher::default(),
            gate,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Host handle
    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// Event dispatcher shared by all runs
    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    /// Subscribe to progress events of subsequent runs
    pub fn subscribe(&self) -> broadcast::Receiver<TransformEvent> {
        self.events.subscribe()
    }

    /// Move every target layer by `(dh, dv)` pixels
    pub async fn translate(&self, dh: f64, dv: f64) -> Result<TransformReport> {
        self.apply(TransformCommand::Move { dh, dv }).await
    }

    /// Rotate every target layer by `angle` degrees about `center`
    pub async fn rotate(&self, angle: f64, center: TransformCenter) -> Result<TransformReport> {
        self.apply(TransformCommand::Rotate { angle, center }).await
    }

    /// Scale every target layer to `width` x `height` in `unit` about `center`
    pub async fn scale(
        &self,
        width: f64,
        height: f64,
        unit: ScaleUnit,
        center: TransformCenter,
    ) -> Result<TransformReport> {
        self.apply(TransformCommand::Scale {
            width,
            height,
            unit,
            center,
        })
        .await
    }

    /// Run `command` with the configured hidden-layer filter
    pub async fn apply(&self, command: TransformCommand) -> Result<TransformReport> {
        let request =
            TransformRequest::new(command).with_hidden_layers(self.config.include_hidden_layers);
        self.apply_request(request).await
    }

    /// Run an explicit request
    ///
    /// The document is snapshotted only once its permit is held, so a queued
    /// run sees the layers as the previous run left them.
    pub async fn apply_request(&self, request: TransformRequest) -> Result<TransformReport> {
        let mut document = self
            .host
            .active_document()
            .ok_or(TransformError::Host(HostError::NoActiveDocument))?
            .id;
        loop {
            let permit = self.gate.acquire(document).await?;
            let orchestrator =
                TransformOrchestrator::new(Arc::clone(&self.host), request, self.config.clone())?;
            if orchestrator.document().id == document {
                return orchestrator
                    .with_permit(permit)
                    .with_events(self.events.clone())
                    .run()
                    .await;
            }
            // The user switched documents while this run was waiting
            document = orchestrator.document().id;
        }
    }
}

impl<H: Host> std::fmt::Debug for MultiLayerTransform<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiLayerTransform")
            .field("config", &self.config)
            .field("gate", &self.gate)
            .finish()
    }
}
