//! Simulated host implementation
//!
//! Interprets the action descriptors layerwarp sends against a
//! [`SimDocument`]. Inapplicable descriptors are rejected the way a real host
//! would reject them: loading a selection from a layer without a mask,
//! cutting pixels without a selection, editing pixels of a text layer, and so
//! on. Every descriptor and history call is recorded.
//!
//! Like the real host, transforming a layer while a selection is active also
//! moves the selection, which is why callers reload the selection before each
//! layer.

use async_trait::async_trait;
use layerwarp_core::{
    CommandChannel, Descriptor, DescriptorResult, DocumentId, DocumentQuery, DocumentSnapshot,
    HistoryControl, HostError, LayerId, LayerKind, SuspensionToken,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;

use crate::document::{AppliedTransform, EditTarget, SimDocument, SimLayer};
use crate::region::Region;

/// A recorded call to the history primitive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryCall {
    /// History suspended
    Suspend {
        /// Document the suspension applies to.
        document: DocumentId,
        /// History entry label.
        label: String,
        /// Token handed back to the caller.
        token: SuspensionToken,
    },
    /// History resumed
    Resume {
        /// Token that was resumed.
        token: SuspensionToken,
    },
}

/// Fail the n-th call (1-based) of a verb
#[derive(Debug, Clone)]
struct FailureRule {
    verb: String,
    occurrence: usize,
}

#[derive(Debug, Default)]
struct SimState {
    document: Option<SimDocument>,
    next_layer_id: i64,
    executed: Vec<Descriptor>,
    history: Vec<HistoryCall>,
    open_suspensions: Vec<SuspensionToken>,
    failures: Vec<FailureRule>,
    call_counts: HashMap<String, usize>,
}

/// In-memory host that applies descriptors to a simulated document
pub struct SimulatedHost {
    state: Mutex<SimState>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl SimulatedHost {
    /// Create a host with an empty open document
    pub fn new(document: DocumentId, width: f64, height: f64) -> Self {
        Self::with_state(SimState {
            document: Some(SimDocument::new(document, width, height)),
            next_layer_id: 1,
            ..Default::default()
        })
    }

    /// Create a host with no open document
    pub fn without_document() -> Self {
        Self::with_state(SimState {
            next_layer_id: 1,
            ..Default::default()
        })
    }

    fn with_state(state: SimState) -> Self {
        Self {
            state: Mutex::new(state),
            latency: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Delay every descriptor by `latency` before applying it
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Add an unmasked layer on top of the stack
    pub fn add_layer(&self, name: &str, kind: LayerKind, visible: bool) -> LayerId {
        self.insert_layer(name, kind, visible, None)
    }

    /// Add a layer carrying a user mask
    pub fn add_masked_layer(
        &self,
        name: &str,
        kind: LayerKind,
        visible: bool,
        mask: Region,
    ) -> LayerId {
        self.insert_layer(name, kind, visible, Some(mask))
    }

    fn insert_layer(
        &self,
        name: &str,
        kind: LayerKind,
        visible: bool,
        mask: Option<Region>,
    ) -> LayerId {
        let mut state = self.state.lock();
        let id = LayerId(state.next_layer_id);
        state.next_layer_id += 1;
        if let Some(doc) = state.document.as_mut() {
            let mut layer = SimLayer::new(id, name, kind, visible);
            layer.mask = mask;
            doc.layers.push(layer);
        }
        id
    }

    /// Replace the active-layer set
    pub fn set_active_layers(&self, ids: &[LayerId]) {
        if let Some(doc) = self.state.lock().document.as_mut() {
            doc.active = ids.to_vec();
            doc.target = ids.first().map(|id| EditTarget::Pixels(*id));
        }
    }

    /// Replace the selection
    pub fn set_selection(&self, selection: Option<Region>) {
        if let Some(doc) = self.state.lock().document.as_mut() {
            doc.selection = selection;
        }
    }

    /// Make the `occurrence`-th call (1-based) of `verb` fail
    ///
    /// `verb` is a descriptor `_obj` value, or `suspendHistory` /
    /// `resumeHistory` for the history primitive.
    pub fn fail_on(&self, verb: &str, occurrence: usize) {
        self.state.lock().failures.push(FailureRule {
            verb: verb.to_string(),
            occurrence,
        });
    }

    /// Every descriptor received, including rejected ones
    pub fn executed(&self) -> Vec<Descriptor> {
        self.state.lock().executed.clone()
    }

    /// Verbs of every descriptor received
    pub fn executed_verbs(&self) -> Vec<String> {
        self.state
            .lock()
            .executed
            .iter()
            .map(|d| d.verb().to_string())
            .collect()
    }

    /// Recorded history calls
    pub fn history_calls(&self) -> Vec<HistoryCall> {
        self.state.lock().history.clone()
    }

    /// Number of suspensions not yet resumed
    pub fn open_suspensions(&self) -> usize {
        self.state.lock().open_suspensions.len()
    }

    /// Copy of a layer
    pub fn layer(&self, id: LayerId) -> Option<SimLayer> {
        self.state
            .lock()
            .document
            .as_ref()
            .and_then(|doc| doc.layer(id).cloned())
    }

    /// Copy of all layers, bottom to top
    pub fn layers(&self) -> Vec<SimLayer> {
        self.state
            .lock()
            .document
            .as_ref()
            .map(|doc| doc.layers.clone())
            .unwrap_or_default()
    }

    /// Current selection
    pub fn selection(&self) -> Option<Region> {
        self.state
            .lock()
            .document
            .as_ref()
            .and_then(|doc| doc.selection)
    }

    /// Current active-layer set
    pub fn active_layer_ids(&self) -> Vec<LayerId> {
        self.state
            .lock()
            .document
            .as_ref()
            .map(|doc| doc.active.clone())
            .unwrap_or_default()
    }

    /// Highest number of descriptors that were ever in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for SimulatedHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SimulatedHost")
            .field("document", &state.document.as_ref().map(|d| d.id))
            .field("executed", &state.executed.len())
            .field("open_suspensions", &state.open_suspensions.len())
            .finish()
    }
}

impl DocumentQuery for SimulatedHost {
    fn active_document(&self) -> Option<DocumentSnapshot> {
        self.state.lock().document.as_ref().map(SimDocument::snapshot)
    }
}

#[async_trait]
impl CommandChannel for SimulatedHost {
    async fn execute(&self, descriptor: &Descriptor) -> Result<DescriptorResult, HostError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let result = self.state.lock().execute(descriptor);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match &result {
            Ok(_) => tracing::trace!("sim applied {}", descriptor.verb()),
            Err(err) => tracing::debug!("sim rejected {}: {}", descriptor.verb(), err),
        }
        result
    }
}

#[async_trait]
impl HistoryControl for SimulatedHost {
    async fn suspend_history(
        &self,
        document: DocumentId,
        label: &str,
    ) -> Result<SuspensionToken, HostError> {
        let mut state = self.state.lock();
        if let Some(reason) = state.injected_failure("suspendHistory") {
            return Err(HostError::History { reason });
        }
        if state.document.as_ref().map(|d| d.id) != Some(document) {
            return Err(HostError::History {
                reason: format!("{} is not open", document),
            });
        }
        let token = SuspensionToken(Uuid::new_v4().to_string());
        state.open_suspensions.push(token.clone());
        state.history.push(HistoryCall::Suspend {
            document,
            label: label.to_string(),
            token: token.clone(),
        });
        Ok(token)
    }

    async fn resume_history(&self, token: SuspensionToken) -> Result<(), HostError> {
        let mut state = self.state.lock();
        if let Some(reason) = state.injected_failure("resumeHistory") {
            return Err(HostError::History { reason });
        }
        let Some(pos) = state.open_suspensions.iter().position(|t| *t == token) else {
            return Err(HostError::History {
                reason: format!("unknown suspension {}", token),
            });
        };
        state.open_suspensions.remove(pos);
        state.history.push(HistoryCall::Resume { token });
        Ok(())
    }
}

impl SimState {
    fn injected_failure(&mut self, verb: &str) -> Option<String> {
        let count = self.call_counts.entry(verb.to_string()).or_insert(0);
        *count += 1;
        let count = *count;
        self.failures
            .iter()
            .any(|rule| rule.verb == verb && rule.occurrence == count)
            .then(|| format!("injected failure on call {} of '{}'", count, verb))
    }

    fn execute(&mut self, descriptor: &Descriptor) -> Result<DescriptorResult, HostError> {
        self.executed.push(descriptor.clone());
        let verb = descriptor.verb().to_string();

        if let Some(reason) = self.injected_failure(&verb) {
            return Err(HostError::rejected(verb, reason));
        }

        let next_layer_id = self.next_layer_id;
        let doc = self
            .document
            .as_mut()
            .ok_or_else(|| HostError::rejected(&verb, "no document open"))?;

        match verb.as_str() {
            "get" => get(doc, descriptor),
            "make" => {
                if descriptor.get("at").is_some() {
                    make_mask(doc)
                } else {
                    let result = make_layer(doc, descriptor, LayerId(next_layer_id));
                    if result.is_ok() {
                        self.next_layer_id += 1;
                    }
                    result
                }
            }
            "set" => set_selection(doc, descriptor),
            "select" => select(doc, descriptor),
            "delete" => delete(doc, descriptor),
            "cut" => cut(doc, descriptor),
            "move" => move_selection(doc, descriptor),
            "transform" => transform(doc, descriptor),
            _ => Err(HostError::rejected(&verb, "unsupported verb")),
        }
    }
}

fn reject(verb: &str, reason: impl Into<String>) -> HostError {
    HostError::rejected(verb, reason)
}

fn layer_ref_id(reference: &Value) -> Option<LayerId> {
    if reference.get("_ref").and_then(Value::as_str) == Some("layer") {
        reference.get("_id").and_then(Value::as_i64).map(LayerId)
    } else {
        None
    }
}

fn is_mask_channel(reference: &Value) -> bool {
    reference.get("_ref").and_then(Value::as_str) == Some("channel")
        && reference.get("_value").and_then(Value::as_str) == Some("mask")
}

fn number(value: Option<&Value>) -> Option<f64> {
    value.and_then(|v| v.get("_value")).and_then(Value::as_f64)
}

fn target_refs<'a>(verb: &str, descriptor: &'a Descriptor) -> Result<&'a Vec<Value>, HostError> {
    descriptor
        .target()
        .and_then(Value::as_array)
        .ok_or_else(|| reject(verb, "missing _target reference"))
}

fn region_json(region: &Region) -> Value {
    json!({
        "left": region.x,
        "top": region.y,
        "right": region.x + region.width,
        "bottom": region.y + region.height,
        "angle": region.rotation,
    })
}

fn get(doc: &SimDocument, descriptor: &Descriptor) -> Result<DescriptorResult, HostError> {
    match descriptor.target() {
        Some(Value::Object(reference)) => {
            let is_selection = reference
                .get("_ref")
                .and_then(Value::as_array)
                .and_then(|refs| refs.first())
                .and_then(|first| first.get("_property"))
                .and_then(Value::as_str)
                == Some("selection");
            if !is_selection {
                return Err(reject("get", "unsupported property query"));
            }
            Ok(match &doc.selection {
                Some(region) => DescriptorResult::empty().with("selection", region_json(region)),
                None => DescriptorResult::empty(),
            })
        }
        Some(Value::Array(refs)) => {
            let id = refs
                .first()
                .and_then(layer_ref_id)
                .ok_or_else(|| reject("get", "unsupported reference"))?;
            let layer = doc
                .layer(id)
                .ok_or_else(|| reject("get", format!("{} does not exist", id)))?;
            Ok(DescriptorResult::empty()
                .with("layerID", layer.id.0)
                .with("name", layer.name.clone())
                .with("visible", layer.visible)
                .with("hasUserMask", layer.mask.is_some()))
        }
        _ => Err(reject("get", "missing _target reference")),
    }
}

fn make_layer(
    doc: &mut SimDocument,
    descriptor: &Descriptor,
    id: LayerId,
) -> Result<DescriptorResult, HostError> {
    let refs = target_refs("make", descriptor)?;
    if refs.first().and_then(|r| r.get("_ref")).and_then(Value::as_str) != Some("layer") {
        return Err(reject("make", "unsupported class"));
    }
    let name = descriptor
        .get("using")
        .and_then(|using| using.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("Layer");
    doc.layers.push(SimLayer::new(id, name, LayerKind::Normal, true));
    doc.active = vec![id];
    doc.target = Some(EditTarget::Pixels(id));
    Ok(DescriptorResult::empty().with("layerID", id.0))
}

fn make_mask(doc: &mut SimDocument) -> Result<DescriptorResult, HostError> {
    let id = doc
        .target
        .map(|t| t.layer())
        .ok_or_else(|| reject("make", "no target layer"))?;
    let selection = doc
        .selection
        .ok_or_else(|| reject("make", "no selection to reveal"))?;
    let layer = doc
        .layer_mut(id)
        .ok_or_else(|| reject("make", format!("{} does not exist", id)))?;
    if layer.mask.is_some() {
        return Err(reject("make", format!("{} already has a mask", id)));
    }
    layer.mask = Some(selection);
    doc.target = Some(EditTarget::Mask(id));
    Ok(DescriptorResult::empty())
}

fn set_selection(
    doc: &mut SimDocument,
    descriptor: &Descriptor,
) -> Result<DescriptorResult, HostError> {
    if !descriptor.targets_selection() {
        return Err(reject("set", "only the selection can be set"));
    }
    let to = descriptor
        .get("to")
        .ok_or_else(|| reject("set", "missing 'to'"))?;

    if to.get("_enum").and_then(Value::as_str) == Some("ordinal") {
        doc.selection = match to.get("_value").and_then(Value::as_str) {
            Some("allEnum") => Some(doc.canvas()),
            Some("none") => None,
            _ => return Err(reject("set", "unknown ordinal")),
        };
        return Ok(DescriptorResult::empty());
    }

    let refs = to
        .get("_ref")
        .and_then(Value::as_array)
        .ok_or_else(|| reject("set", "unsupported selection source"))?;
    match (refs.first(), refs.get(1).and_then(layer_ref_id)) {
        (Some(channel), Some(id)) if is_mask_channel(channel) => {
            let layer = doc
                .layer(id)
                .ok_or_else(|| reject("set", format!("{} does not exist", id)))?;
            let mask = layer
                .mask
                .ok_or_else(|| reject("set", format!("{} has no mask", id)))?;
            doc.selection = Some(mask);
            Ok(DescriptorResult::empty())
        }
        _ => Err(reject("set", "unsupported selection source")),
    }
}

fn select(doc: &mut SimDocument, descriptor: &Descriptor) -> Result<DescriptorResult, HostError> {
    let refs = target_refs("select", descriptor)?;
    let first = refs
        .first()
        .ok_or_else(|| reject("select", "empty reference"))?;

    if let Some(id) = layer_ref_id(first) {
        if doc.layer(id).is_none() {
            return Err(reject("select", format!("{} does not exist", id)));
        }
        let additive = descriptor
            .get("selectionModifier")
            .and_then(|m| m.get("_value"))
            .and_then(Value::as_str)
            == Some("addToSelection");
        if additive {
            if !doc.active.contains(&id) {
                doc.active.push(id);
            }
            if doc.target.is_none() {
                doc.target = Some(EditTarget::Pixels(id));
            }
        } else {
            doc.active = vec![id];
            doc.target = Some(EditTarget::Pixels(id));
        }
        return Ok(DescriptorResult::empty());
    }

    if is_mask_channel(first) {
        let id = refs
            .get(1)
            .and_then(layer_ref_id)
            .ok_or_else(|| reject("select", "mask reference without layer"))?;
        let layer = doc
            .layer(id)
            .ok_or_else(|| reject("select", format!("{} does not exist", id)))?;
        if layer.mask.is_none() {
            return Err(reject("select", format!("{} has no mask", id)));
        }
        doc.active = vec![id];
        doc.target = Some(EditTarget::Mask(id));
        return Ok(DescriptorResult::empty());
    }

    Err(reject("select", "unsupported reference"))
}

fn delete(doc: &mut SimDocument, descriptor: &Descriptor) -> Result<DescriptorResult, HostError> {
    let refs = target_refs("delete", descriptor)?;
    let ordinal_layer = refs.first().is_some_and(|r| {
        r.get("_ref").and_then(Value::as_str) == Some("layer")
            && r.get("_enum").and_then(Value::as_str) == Some("ordinal")
    });
    if !ordinal_layer {
        return Err(reject("delete", "unsupported reference"));
    }
    if doc.active.is_empty() {
        return Err(reject("delete", "no active layer"));
    }
    let doomed = std::mem::take(&mut doc.active);
    doc.layers.retain(|layer| !doomed.contains(&layer.id));
    doc.target = None;
    Ok(DescriptorResult::empty())
}

fn parse_offset(verb: &str, descriptor: &Descriptor) -> Result<(f64, f64), HostError> {
    let to = descriptor
        .get("to")
        .filter(|to| to.get("_obj").and_then(Value::as_str) == Some("offset"))
        .ok_or_else(|| reject(verb, "missing offset"))?;
    let dh = number(to.get("horizontal")).ok_or_else(|| reject(verb, "missing horizontal"))?;
    let dv = number(to.get("vertical")).ok_or_else(|| reject(verb, "missing vertical"))?;
    Ok((dh, dv))
}

fn parse_transform(descriptor: &Descriptor) -> Result<AppliedTransform, HostError> {
    let center = descriptor
        .get("freeTransformCenterState")
        .and_then(|c| c.get("_value"))
        .and_then(Value::as_str)
        .unwrap_or("QCSAverage")
        .to_string();
    if let Some(angle) = number(descriptor.get("angle")) {
        return Ok(AppliedTransform::Rotate { angle, center });
    }
    match (number(descriptor.get("width")), number(descriptor.get("height"))) {
        (Some(width), Some(height)) => {
            let unit = descriptor
                .get("width")
                .and_then(|w| w.get("_unit"))
                .and_then(Value::as_str)
                .unwrap_or("percentUnit")
                .to_string();
            Ok(AppliedTransform::Scale {
                width,
                height,
                unit,
                center,
            })
        }
        _ => Err(reject("transform", "no angle or size given")),
    }
}

fn transform_region(region: &Region, op: &AppliedTransform) -> Result<Region, HostError> {
    Ok(match op {
        AppliedTransform::Offset { dh, dv } => region.translated(*dh, *dv),
        AppliedTransform::Rotate { angle, center } => region.rotated(*angle, center),
        AppliedTransform::Scale {
            width,
            height,
            unit,
            center,
        } => {
            let (sx, sy) = if unit == "pixelsUnit" {
                if region.width == 0.0 || region.height == 0.0 {
                    return Err(reject("transform", "cannot scale an empty region"));
                }
                (width / region.width, height / region.height)
            } else {
                (width / 100.0, height / 100.0)
            };
            region.scaled(sx, sy, center)
        }
    })
}

/// Apply a transform to the current edit target; an active selection follows it
fn apply_to_target(
    doc: &mut SimDocument,
    verb: &str,
    op: AppliedTransform,
) -> Result<DescriptorResult, HostError> {
    let target = doc
        .target
        .ok_or_else(|| reject(verb, "no target layer"))?;
    let selection = match &doc.selection {
        Some(region) => Some(transform_region(region, &op)?),
        None => None,
    };
    let layer = doc
        .layer_mut(target.layer())
        .ok_or_else(|| reject(verb, format!("{} does not exist", target.layer())))?;

    match target {
        EditTarget::Pixels(id) => {
            if layer.kind != LayerKind::Normal {
                return Err(reject(
                    verb,
                    format!("{} ({}) is not directly editable", id, layer.kind),
                ));
            }
            layer.pixel_transforms.push(op);
        }
        EditTarget::Mask(id) => {
            let mask = layer
                .mask
                .ok_or_else(|| reject(verb, format!("{} has no mask", id)))?;
            layer.mask = Some(transform_region(&mask, &op)?);
            layer.mask_transforms.push(op);
        }
    }

    if selection.is_some() {
        doc.selection = selection;
    }
    Ok(DescriptorResult::empty())
}

fn cut(doc: &mut SimDocument, descriptor: &Descriptor) -> Result<DescriptorResult, HostError> {
    let (dh, dv) = parse_offset("cut", descriptor)?;
    if doc.selection.is_none() {
        return Err(reject("cut", "no selection"));
    }
    apply_to_target(doc, "cut", AppliedTransform::Offset { dh, dv })
}

fn move_selection(
    doc: &mut SimDocument,
    descriptor: &Descriptor,
) -> Result<DescriptorResult, HostError> {
    if !descriptor.targets_selection() {
        return Err(reject("move", "only the selection can be moved"));
    }
    let (dh, dv) = parse_offset("move", descriptor)?;
    let selection = doc
        .selection
        .ok_or_else(|| reject("move", "no selection"))?;
    doc.selection = Some(selection.translated(dh, dv));
    Ok(DescriptorResult::empty())
}

fn transform(
    doc: &mut SimDocument,
    descriptor: &Descriptor,
) -> Result<DescriptorResult, HostError> {
    let op = parse_transform(descriptor)?;
    if descriptor.targets_selection() {
        let selection = doc
            .selection
            .ok_or_else(|| reject("transform", "no selection"))?;
        doc.selection = Some(transform_region(&selection, &op)?);
        return Ok(DescriptorResult::empty());
    }
    apply_to_target(doc, "transform", op)
}
