//! End-to-end runs of the orchestrator against the simulated host

use layerwarp_core::{
    DocumentId, LayerId, LayerKind, OperationState, ScaleUnit, TransformCenter, TransformEvent,
    TransformTarget,
};
use layerwarp_host::{AppliedTransform, HistoryCall, Region, SimulatedHost};
use layerwarp_settings::TransformConfig;
use layerwarp_transform::{
    MultiLayerTransform, ProcessedLayer, TransformCommand, TransformOrchestrator, TransformRequest,
};
use std::sync::Arc;
use std::time::Duration;

struct Fixture {
    host: Arc<SimulatedHost>,
    a: LayerId,
    b: LayerId,
    c: LayerId,
}

/// A: normal, B: normal with mask, C: text without mask; all active
fn three_layers(selection: Option<Region>) -> Fixture {
    let host = Arc::new(SimulatedHost::new(DocumentId(1), 400.0, 300.0));
    let a = host.add_layer("A", LayerKind::Normal, true);
    let b = host.add_masked_layer(
        "B",
        LayerKind::Normal,
        true,
        Region::new(50.0, 50.0, 100.0, 100.0),
    );
    let c = host.add_layer("C", LayerKind::Text, true);
    host.set_active_layers(&[a, b, c]);
    host.set_selection(selection);
    Fixture { host, a, b, c }
}

fn facade(host: &Arc<SimulatedHost>) -> MultiLayerTransform<SimulatedHost> {
    MultiLayerTransform::new(Arc::clone(host), TransformConfig::default())
}

#[tokio::test]
async fn move_without_selection_transforms_pixels_and_masks() {
    let Fixture { host, a, b, c } = three_layers(None);

    let report = facade(&host).translate(10.0, -5.0).await.unwrap();

    assert_eq!(report.state, OperationState::Done);
    assert_eq!(
        report.processed,
        vec![
            ProcessedLayer {
                layer: a,
                target: TransformTarget::LayerPixels
            },
            ProcessedLayer {
                layer: b,
                target: TransformTarget::LayerMask
            },
        ]
    );
    assert_eq!(report.skipped, vec![c]);
    assert!(!report.had_selection);

    assert_eq!(
        host.executed_verbs(),
        vec![
            "get", "set", "make", "make", // snapshot
            "get", "set", "select", "cut", // A
            "get", "set", "select", "cut", // B
            "get", // C
            "set", "select", "delete", // restore
            "select", "select", "select", // reselect
        ]
    );

    let offset = AppliedTransform::Offset { dh: 10.0, dv: -5.0 };
    let layer_a = host.layer(a).unwrap();
    assert_eq!(layer_a.pixel_transforms, vec![offset.clone()]);
    let layer_b = host.layer(b).unwrap();
    assert!(layer_b.pixel_transforms.is_empty());
    assert_eq!(layer_b.mask_transforms, vec![offset]);
    assert_eq!(layer_b.mask, Some(Region::new(60.0, 45.0, 100.0, 100.0)));
    let layer_c = host.layer(c).unwrap();
    assert!(layer_c.pixel_transforms.is_empty() && layer_c.mask_transforms.is_empty());

    assert_eq!(host.selection(), None);
    assert_eq!(host.active_layer_ids(), vec![a, b, c]);
    assert_eq!(host.layers().len(), 3);

    let history = host.history_calls();
    assert_eq!(history.len(), 2);
    assert!(matches!(
        &history[0],
        HistoryCall::Suspend { label, .. } if label == "[Plugin]SelectionTranslator"
    ));
    assert!(matches!(&history[1], HistoryCall::Resume { .. }));
    assert_eq!(host.open_suspensions(), 0);
}

#[tokio::test]
async fn skipped_layer_is_never_edited() {
    let Fixture { host, c, .. } = three_layers(None);

    facade(&host).translate(1.0, 1.0).await.unwrap();

    // Only the final reselection may touch C besides its mask query
    let executed = host.executed();
    let before_reselect = &executed[..executed.len() - 3];
    assert!(before_reselect
        .iter()
        .filter(|d| d.verb() != "get")
        .all(|d| !d.referenced_layer_ids().contains(&c.0)));
}

#[tokio::test]
async fn rotate_with_selection_rotates_restored_selection() {
    let original = Region::new(20.0, 20.0, 100.0, 50.0);
    let Fixture { host, a, b, .. } = three_layers(Some(original));

    let report = facade(&host)
        .rotate(45.0, TransformCenter::MiddleCenter)
        .await
        .unwrap();
    assert!(report.had_selection);
    assert_eq!(report.processed.len(), 2);

    assert_eq!(
        host.executed_verbs(),
        vec![
            "get", "make", "make", // snapshot
            "get", "set", "select", "transform", // A
            "get", "set", "select", "transform", // B
            "get", // C
            "set", "transform", "select", "delete", // restore
            "select", "select", "select", // reselect
        ]
    );

    let executed = host.executed();
    let follow_up = &executed[13];
    assert!(follow_up.targets_selection());
    assert_eq!(follow_up.get("angle").unwrap()["_value"], 45.0);
    assert_eq!(
        follow_up.get("freeTransformCenterState").unwrap()["_value"],
        "QCSAverage"
    );

    let restored = host.selection().unwrap();
    assert!(restored.approx_eq(
        &Region {
            rotation: 45.0,
            ..original
        },
        1e-9
    ));

    let rotate = AppliedTransform::Rotate {
        angle: 45.0,
        center: "QCSAverage".to_string(),
    };
    assert_eq!(host.layer(a).unwrap().pixel_transforms, vec![rotate.clone()]);
    assert_eq!(host.layer(b).unwrap().mask_transforms, vec![rotate]);
    assert_eq!(host.layers().len(), 3);
}

#[tokio::test]
async fn move_with_selection_offsets_restored_selection() {
    let original = Region::new(0.0, 0.0, 40.0, 40.0);
    let Fixture { host, .. } = three_layers(Some(original));

    facade(&host).translate(-3.0, 7.0).await.unwrap();

    let verbs = host.executed_verbs();
    assert_eq!(
        verbs[verbs.len() - 6..],
        ["move", "select", "delete", "select", "select", "select"]
    );
    assert_eq!(host.selection(), Some(original.translated(-3.0, 7.0)));
}

#[tokio::test]
async fn scale_in_pixels_uses_pixel_unit() {
    let Fixture { host, a, .. } = three_layers(None);

    facade(&host)
        .scale(200.0, 100.0, ScaleUnit::Pixels, TransformCenter::TopLeft)
        .await
        .unwrap();

    assert_eq!(
        host.layer(a).unwrap().pixel_transforms,
        vec![AppliedTransform::Scale {
            width: 200.0,
            height: 100.0,
            unit: "pixelsUnit".to_string(),
            center: "QCSCorner0".to_string(),
        }]
    );
    assert_eq!(host.selection(), None);
}

#[tokio::test]
async fn no_active_layers_is_a_noop() {
    let host = Arc::new(SimulatedHost::new(DocumentId(1), 100.0, 100.0));
    host.add_layer("Background", LayerKind::Normal, true);

    let report = facade(&host).translate(5.0, 5.0).await.unwrap();

    assert!(report.is_noop());
    assert_eq!(report.state, OperationState::Done);
    assert!(host.executed().is_empty());
    assert!(host.history_calls().is_empty());
}

#[tokio::test]
async fn hidden_layers_follow_the_filter() {
    let host = Arc::new(SimulatedHost::new(DocumentId(1), 100.0, 100.0));
    let shown = host.add_layer("shown", LayerKind::Normal, true);
    let hidden = host.add_layer("hidden", LayerKind::Normal, false);
    host.set_active_layers(&[shown, hidden]);
    let engine = facade(&host);

    let report = engine.translate(1.0, 0.0).await.unwrap();
    assert_eq!(report.processed.len(), 1);
    assert!(host.layer(hidden).unwrap().pixel_transforms.is_empty());
    // Hidden layers stay part of the restored layer focus
    assert_eq!(host.active_layer_ids(), vec![shown, hidden]);

    let request = TransformRequest::new(TransformCommand::Move { dh: 1.0, dv: 0.0 })
        .with_hidden_layers(true);
    let report = engine.apply_request(request).await.unwrap();
    assert_eq!(report.processed.len(), 2);
    assert_eq!(host.layer(hidden).unwrap().pixel_transforms.len(), 1);
}

#[tokio::test]
async fn only_hidden_layers_active_is_a_noop() {
    let host = Arc::new(SimulatedHost::new(DocumentId(1), 100.0, 100.0));
    let hidden = host.add_layer("hidden", LayerKind::Normal, false);
    host.set_active_layers(&[hidden]);

    let report = facade(&host).translate(1.0, 0.0).await.unwrap();
    assert!(report.is_noop());
    assert!(host.executed().is_empty());
}

#[tokio::test]
async fn events_trace_the_run() {
    let Fixture { host, a, b, c } = three_layers(None);
    let engine = facade(&host);
    let mut rx = engine.subscribe();

    engine.translate(2.0, 2.0).await.unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    assert!(matches!(events.first(), Some(TransformEvent::Started { .. })));
    assert_eq!(
        events.last(),
        Some(&TransformEvent::Completed {
            processed: 2,
            skipped: 1
        })
    );
    assert!(events.contains(&TransformEvent::LayerTransformed {
        layer: a,
        target: TransformTarget::LayerPixels
    }));
    assert!(events.contains(&TransformEvent::LayerTransformed {
        layer: b,
        target: TransformTarget::LayerMask
    }));
    assert!(events.contains(&TransformEvent::LayerSkipped { layer: c }));

    let states: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            TransformEvent::StateChanged { to, .. } => Some(*to),
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![
            OperationState::Snapshotting,
            OperationState::ProcessingLayers,
            OperationState::Restoring,
            OperationState::Done,
        ]
    );
}

#[tokio::test]
async fn orchestrator_snapshots_document_at_construction() {
    let Fixture { host, a, b, c } = three_layers(None);
    let orchestrator = TransformOrchestrator::new(
        Arc::clone(&host),
        TransformRequest::new(TransformCommand::Move { dh: 1.0, dv: 1.0 }),
        TransformConfig::default(),
    )
    .unwrap();

    // Later changes to the active set do not affect the run
    host.set_active_layers(&[a]);

    assert_eq!(orchestrator.state(), OperationState::Init);
    assert_eq!(orchestrator.document().active_layer_ids(), vec![a, b, c]);

    let report = orchestrator.run().await.unwrap();
    assert_eq!(report.processed.len() + report.skipped.len(), 3);
    assert_eq!(host.active_layer_ids(), vec![a, b, c]);
}

#[tokio::test]
async fn carrier_name_uses_configured_prefix() {
    let Fixture { host, .. } = three_layers(None);
    let config = TransformConfig {
        carrier_prefix: "__carrier_".to_string(),
        ..Default::default()
    };

    MultiLayerTransform::new(Arc::clone(&host), config)
        .translate(1.0, 0.0)
        .await
        .unwrap();

    let make = &host.executed()[2];
    let name = make.get("using").unwrap()["name"].as_str().unwrap();
    assert!(name.starts_with("__carrier_"));
    assert!(name["__carrier_".len()..].parse::<i64>().is_ok());
}

fn carrier_count(host: &SimulatedHost) -> usize {
    host.layers()
        .iter()
        .filter(|layer| layer.name.starts_with("__tempSelection_"))
        .count()
}

#[tokio::test]
async fn exactly_one_carrier_exists_while_processing_layers() {
    let host = SimulatedHost::new(DocumentId(1), 400.0, 300.0)
        .with_latency(Duration::from_millis(1));
    let a = host.add_layer("A", LayerKind::Normal, true);
    let b = host.add_masked_layer(
        "B",
        LayerKind::Normal,
        true,
        Region::new(0.0, 0.0, 10.0, 10.0),
    );
    host.set_active_layers(&[a, b]);
    let host = Arc::new(host);
    let engine = facade(&host);
    let mut rx = engine.subscribe();

    // Host latency hands control to the observer between descriptors
    let observer = async {
        let mut counts = Vec::new();
        while let Ok(event) = rx.recv().await {
            match event {
                TransformEvent::StateChanged {
                    to: OperationState::ProcessingLayers,
                    ..
                }
                | TransformEvent::LayerTransformed { .. } => counts.push(carrier_count(&host)),
                TransformEvent::Completed { .. } | TransformEvent::Failed { .. } => break,
                _ => {}
            }
        }
        counts
    };

    let (report, counts) = tokio::join!(engine.translate(4.0, 4.0), observer);

    report.unwrap();
    assert_eq!(counts, vec![1, 1, 1]);
    assert_eq!(carrier_count(&host), 0);
}
