//! Host descriptor builders
//!
//! Pure functions producing the action descriptors sent through the command
//! channel. Nothing here talks to the host or can fail.

use layerwarp_core::{Descriptor, DocumentId, LayerId, ScaleUnit, TransformCenter};
use serde_json::{json, Value};

/// What a rotate or scale descriptor applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorTarget {
    /// The current target layer or mask
    CurrentLayer,
    /// The document selection
    Selection,
}

impl DescriptorTarget {
    fn reference(&self) -> Value {
        match self {
            Self::CurrentLayer => current_layer_ref(),
            Self::Selection => selection_ref(),
        }
    }
}

fn selection_ref() -> Value {
    json!([{ "_property": "selection", "_ref": "channel" }])
}

fn current_layer_ref() -> Value {
    json!([{ "_enum": "ordinal", "_ref": "layer", "_value": "targetEnum" }])
}

fn mask_channel_ref() -> Value {
    json!({ "_enum": "channel", "_ref": "channel", "_value": "mask" })
}

fn pixels(value: f64) -> Value {
    unit_value(value, "pixelsUnit")
}

fn unit_value(value: f64, unit: &str) -> Value {
    json!({ "_unit": unit, "_value": value })
}

fn offset(dh: f64, dv: f64) -> Value {
    json!({
        "_obj": "offset",
        "horizontal": pixels(dh),
        "vertical": pixels(dv),
    })
}

/// Append the transform-center and bicubic interpolation options
fn with_transform_options(mut command: Value, center: TransformCenter) -> Descriptor {
    if let Value::Object(map) = &mut command {
        map.insert(
            "freeTransformCenterState".to_string(),
            json!({ "_enum": "quadCenterState", "_value": center.quad_center_state() }),
        );
        map.insert(
            "interfaceIconFrameDimmed".to_string(),
            json!({ "_enum": "interpolationType", "_value": "bicubic" }),
        );
    }
    Descriptor::new(command)
}

/// Query whether the document has a selection
///
/// The result carries a `selection` property only when one exists.
pub fn selection_exists_query(document: DocumentId) -> Descriptor {
    Descriptor::new(json!({
        "_obj": "get",
        "_target": {
            "_ref": [
                { "_property": "selection" },
                { "_ref": "document", "_id": document.0 }
            ]
        }
    }))
}

/// Query a layer; the result carries `hasUserMask`
pub fn layer_mask_query(document: DocumentId, layer: LayerId) -> Descriptor {
    Descriptor::new(json!({
        "_obj": "get",
        "_target": [
            { "_ref": "layer", "_id": layer.0 },
            { "_ref": "document", "_id": document.0 }
        ]
    }))
}

/// Create a normal layer; the result carries `layerID`
pub fn make_layer(name: &str) -> Descriptor {
    Descriptor::new(json!({
        "_obj": "make",
        "_target": [{ "_ref": "layer" }],
        "using": { "_obj": "layer", "name": name }
    }))
}

/// Add a mask revealing the current selection to the current layer
pub fn make_mask_from_selection() -> Descriptor {
    Descriptor::new(json!({
        "_obj": "make",
        "at": mask_channel_ref(),
        "new": { "_class": "channel" },
        "using": { "_enum": "userMaskEnabled", "_value": "revealSelection" }
    }))
}

/// Load a layer's mask as the selection
pub fn load_selection_from_mask(layer: LayerId) -> Descriptor {
    Descriptor::new(json!({
        "_obj": "set",
        "_target": selection_ref(),
        "to": {
            "_ref": [mask_channel_ref(), { "_id": layer.0, "_ref": "layer" }]
        }
    }))
}

fn set_selection_ordinal(value: &str) -> Descriptor {
    Descriptor::new(json!({
        "_obj": "set",
        "_target": selection_ref(),
        "to": { "_enum": "ordinal", "_value": value }
    }))
}

/// Select the whole canvas
pub fn select_all() -> Descriptor {
    set_selection_ordinal("allEnum")
}

/// Drop the selection
pub fn select_none() -> Descriptor {
    set_selection_ordinal("none")
}

/// Select a layer, replacing or extending the active layers
pub fn select_layer(layer: LayerId, additive: bool) -> Descriptor {
    let mut command = json!({
        "_obj": "select",
        "makeVisible": false,
        "_target": [{ "_ref": "layer", "_id": layer.0 }]
    });
    if additive {
        command["selectionModifier"] =
            json!({ "_enum": "selectionModifierType", "_value": "addToSelection" });
    }
    Descriptor::new(command)
}

/// Descriptors that make `layers` the active set, in order
///
/// One plain select followed by additive selects for the rest.
pub fn select_layers(layers: &[LayerId]) -> Vec<Descriptor> {
    layers
        .iter()
        .enumerate()
        .map(|(i, layer)| select_layer(*layer, i > 0))
        .collect()
}

/// Make a layer's mask channel the edit target
pub fn select_layer_mask(layer: LayerId) -> Descriptor {
    Descriptor::new(json!({
        "_obj": "select",
        "_target": [mask_channel_ref(), { "_id": layer.0, "_ref": "layer" }],
        "makeVisible": false
    }))
}

/// Delete the active layer
pub fn delete_current_layer() -> Descriptor {
    Descriptor::new(json!({
        "_obj": "delete",
        "_target": current_layer_ref()
    }))
}

/// Cut the selected content of the current target and offset it
pub fn cut_and_offset(dh: f64, dv: f64) -> Descriptor {
    Descriptor::new(json!({
        "_obj": "cut",
        "to": offset(dh, dv),
        "_target": selection_ref()
    }))
}

/// Move the selection outline itself
pub fn offset_selection(dh: f64, dv: f64) -> Descriptor {
    Descriptor::new(json!({
        "_obj": "move",
        "_target": selection_ref(),
        "to": offset(dh, dv)
    }))
}

/// Rotate by `angle` degrees about `center`
pub fn rotate(angle: f64, center: TransformCenter, target: DescriptorTarget) -> Descriptor {
    with_transform_options(
        json!({
            "_obj": "transform",
            "angle": unit_value(angle, "angleUnit"),
            "_target": target.reference()
        }),
        center,
    )
}

/// Scale to `width` x `height` in `unit` about `center`
pub fn scale(
    width: f64,
    height: f64,
    unit: ScaleUnit,
    center: TransformCenter,
    target: DescriptorTarget,
) -> Descriptor {
    with_transform_options(
        json!({
            "_obj": "transform",
            "width": unit_value(width, unit.host_unit()),
            "height": unit_value(height, unit.host_unit()),
            "_target": target.reference()
        }),
        center,
    )
}
