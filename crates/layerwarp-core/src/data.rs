//! Data models for documents, layers, and operation state
//!
//! This module provides:
//! - Document and layer identifiers as assigned by the host
//! - Layer kinds and the read-only layer snapshot taken at operation start
//! - The document snapshot with its active-layer and target-layer sets
//! - Transform kinds, transform targets and orchestrator states

use serde::{Deserialize, Serialize};
use std::fmt;

/// Host-assigned document identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub i64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

/// Host-assigned layer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub i64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

/// Layer kind as reported by the host document model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerKind {
    /// Pixel layer whose content can be cut and offset directly
    Normal,
    /// Text layer
    Text,
    /// Smart object layer
    SmartObject,
    /// Solid color, gradient or pattern fill layer
    Fill,
    /// Adjustment layer
    Adjustment,
    /// Layer group
    Group,
    /// Any other kind the host reports
    Other,
}

impl LayerKind {
    /// Whether the layer's pixels can be edited directly
    pub fn is_normal(&self) -> bool {
        matches!(self, LayerKind::Normal)
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKind::Normal => write!(f, "normal"),
            LayerKind::Text => write!(f, "text"),
            LayerKind::SmartObject => write!(f, "smartObject"),
            LayerKind::Fill => write!(f, "fill"),
            LayerKind::Adjustment => write!(f, "adjustment"),
            LayerKind::Group => write!(f, "group"),
            LayerKind::Other => write!(f, "other"),
        }
    }
}

/// Read-only view of a layer at the moment the operation was constructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerInfo {
    /// Host identifier
    pub id: LayerId,
    /// Layer kind
    pub kind: LayerKind,
    /// Whether the layer is visible
    pub visible: bool,
}

impl LayerInfo {
    /// Create a layer snapshot
    pub fn new(id: LayerId, kind: LayerKind, visible: bool) -> Self {
        Self { id, kind, visible }
    }
}

/// Snapshot of the active document taken once at operation construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    /// Document identifier
    pub id: DocumentId,
    /// Active layers, in the order the host reported them
    pub active_layers: Vec<LayerInfo>,
}

impl DocumentSnapshot {
    /// Create a snapshot
    pub fn new(id: DocumentId, active_layers: Vec<LayerInfo>) -> Self {
        Self { id, active_layers }
    }

    /// Identifiers of the active layers, order preserved
    pub fn active_layer_ids(&self) -> Vec<LayerId> {
        self.active_layers.iter().map(|layer| layer.id).collect()
    }

    /// Layers to transform
    ///
    /// Hidden layers are dropped unless `include_hidden` is set. The result
    /// is always a subset of the active layers, in the same order.
    pub fn target_layers(&self, include_hidden: bool) -> Vec<LayerInfo> {
        self.active_layers
            .iter()
            .filter(|layer| include_hidden || layer.visible)
            .cloned()
            .collect()
    }
}

/// Geometric transform kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformKind {
    /// Translation by a pixel offset
    Move,
    /// Rotation about an anchor
    Rotate,
    /// Scaling about an anchor
    Scale,
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformKind::Move => write!(f, "move"),
            TransformKind::Rotate => write!(f, "rotate"),
            TransformKind::Scale => write!(f, "scale"),
        }
    }
}

/// What a transform is applied to on a given layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformTarget {
    /// The layer's pixel content
    LayerPixels,
    /// The layer's user mask
    LayerMask,
}

impl fmt::Display for TransformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformTarget::LayerPixels => write!(f, "pixels"),
            TransformTarget::LayerMask => write!(f, "mask"),
        }
    }
}

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationState {
    /// Constructed, nothing sent to the host yet
    Init,
    /// Capturing the selection into the carrier layer
    Snapshotting,
    /// Transforming target layers one by one
    ProcessingLayers,
    /// Restoring the selection and layer focus
    Restoring,
    /// Finished successfully
    Done,
    /// Aborted by an error
    Failed,
}

impl OperationState {
    /// Whether no further transitions can happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationState::Done | OperationState::Failed)
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationState::Init => write!(f, "Init"),
            OperationState::Snapshotting => write!(f, "Snapshotting"),
            OperationState::ProcessingLayers => write!(f, "ProcessingLayers"),
            OperationState::Restoring => write!(f, "Restoring"),
            OperationState::Done => write!(f, "Done"),
            OperationState::Failed => write!(f, "Failed"),
        }
    }
}
