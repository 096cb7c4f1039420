//! Per-layer transform target resolution
//!
//! A layer's mask wins over its pixels whenever one exists. Layers that are
//! not normal pixel layers and carry no mask are skipped.

use layerwarp_core::{CommandChannel, DocumentId, LayerInfo, LayerKind, TransformTarget};

use crate::descriptors;
use crate::error::Result;
use crate::exec::execute;

/// Decide where a layer's transform goes, or `None` to skip it
pub fn target_for(kind: LayerKind, has_mask: bool) -> Option<TransformTarget> {
    if has_mask {
        Some(TransformTarget::LayerMask)
    } else if kind.is_normal() {
        Some(TransformTarget::LayerPixels)
    } else {
        None
    }
}

/// Query the host for mask presence and resolve the layer's target
pub async fn resolve_target<C>(
    channel: &C,
    document: DocumentId,
    layer: &LayerInfo,
) -> Result<Option<TransformTarget>>
where
    C: CommandChannel + ?Sized,
{
    let result = execute(channel, &descriptors::layer_mask_query(document, layer.id)).await?;
    let has_mask = result.bool_field("get", "hasUserMask")?;
    Ok(target_for(layer.kind, has_mask))
}
