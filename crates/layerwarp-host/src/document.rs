//! In-memory document model of the simulated host

use layerwarp_core::{DocumentId, DocumentSnapshot, LayerId, LayerInfo, LayerKind};
use serde::{Deserialize, Serialize};

use crate::region::Region;

/// A transform the host applied to a layer's pixels or mask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppliedTransform {
    /// Cut-and-offset by a pixel delta
    Offset {
        /// Horizontal delta
        dh: f64,
        /// Vertical delta
        dv: f64,
    },
    /// Rotation about an anchor
    Rotate {
        /// Angle in degrees
        angle: f64,
        /// Host `quadCenterState` value
        center: String,
    },
    /// Scale about an anchor
    Scale {
        /// Width value
        width: f64,
        /// Height value
        height: f64,
        /// Host `_unit` value
        unit: String,
        /// Host `quadCenterState` value
        center: String,
    },
}

/// What edits currently apply to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// The layer's pixel content
    Pixels(LayerId),
    /// The layer's mask channel
    Mask(LayerId),
}

impl EditTarget {
    /// Layer the target belongs to
    pub fn layer(&self) -> LayerId {
        match self {
            EditTarget::Pixels(id) | EditTarget::Mask(id) => *id,
        }
    }
}

/// A layer in the simulated document
#[derive(Debug, Clone, PartialEq)]
pub struct SimLayer {
    /// Host identifier
    pub id: LayerId,
    /// Layer name
    pub name: String,
    /// Layer kind
    pub kind: LayerKind,
    /// Visibility
    pub visible: bool,
    /// User mask, if any
    pub mask: Option<Region>,
    /// Transforms applied to the pixels
    pub pixel_transforms: Vec<AppliedTransform>,
    /// Transforms applied to the mask
    pub mask_transforms: Vec<AppliedTransform>,
}

impl SimLayer {
    /// Create a layer without a mask
    pub fn new(id: LayerId, name: impl Into<String>, kind: LayerKind, visible: bool) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            visible,
            mask: None,
            pixel_transforms: Vec::new(),
            mask_transforms: Vec::new(),
        }
    }
}

/// The open document of the simulated host
#[derive(Debug, Clone)]
pub struct SimDocument {
    /// Document identifier
    pub id: DocumentId,
    /// Canvas width in pixels
    pub width: f64,
    /// Canvas height in pixels
    pub height: f64,
    /// Layers, bottom to top
    pub layers: Vec<SimLayer>,
    /// Active (selected) layers, in selection order
    pub active: Vec<LayerId>,
    /// Current edit target
    pub target: Option<EditTarget>,
    /// Current selection
    pub selection: Option<Region>,
}

impl SimDocument {
    /// Create an empty document
    pub fn new(id: DocumentId, width: f64, height: f64) -> Self {
        Self {
            id,
            width,
            height,
            layers: Vec::new(),
            active: Vec::new(),
            target: None,
            selection: None,
        }
    }

    /// Region covering the whole canvas
    pub fn canvas(&self) -> Region {
        Region::new(0.0, 0.0, self.width, self.height)
    }

    /// Find a layer
    pub fn layer(&self, id: LayerId) -> Option<&SimLayer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    /// Find a layer mutably
    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut SimLayer> {
        self.layers.iter_mut().find(|layer| layer.id == id)
    }

    /// Snapshot of the active layers as the host's layer query reports them
    pub fn snapshot(&self) -> DocumentSnapshot {
        let active_layers = self
            .active
            .iter()
            .filter_map(|id| self.layer(*id))
            .map(|layer| LayerInfo::new(layer.id, layer.kind, layer.visible))
            .collect();
        DocumentSnapshot::new(self.id, active_layers)
    }
}
