//! Descriptor interpretation by the simulated host

use layerwarp_core::{CommandChannel, Descriptor, DocumentId, HostError, LayerKind};
use layerwarp_host::{AppliedTransform, Region, SimulatedHost};
use serde_json::json;

fn selection_target() -> serde_json::Value {
    json!([{ "_property": "selection", "_ref": "channel" }])
}

#[tokio::test]
async fn select_all_and_none() {
    let host = SimulatedHost::new(DocumentId(1), 120.0, 80.0);
    let set = |value: &str| {
        Descriptor::new(json!({
            "_obj": "set",
            "_target": selection_target(),
            "to": { "_enum": "ordinal", "_value": value }
        }))
    };

    host.execute(&set("allEnum")).await.unwrap();
    assert_eq!(host.selection(), Some(Region::new(0.0, 0.0, 120.0, 80.0)));

    host.execute(&set("none")).await.unwrap();
    assert_eq!(host.selection(), None);
}

#[tokio::test]
async fn additive_select_extends_active_layers() {
    let host = SimulatedHost::new(DocumentId(1), 10.0, 10.0);
    let a = host.add_layer("A", LayerKind::Normal, true);
    let b = host.add_layer("B", LayerKind::Normal, true);

    host.execute(&Descriptor::new(json!({
        "_obj": "select", "makeVisible": false, "_target": [{ "_ref": "layer", "_id": a.0 }]
    })))
    .await
    .unwrap();
    host.execute(&Descriptor::new(json!({
        "_obj": "select", "makeVisible": false, "_target": [{ "_ref": "layer", "_id": b.0 }],
        "selectionModifier": { "_enum": "selectionModifierType", "_value": "addToSelection" }
    })))
    .await
    .unwrap();

    assert_eq!(host.active_layer_ids(), vec![a, b]);
}

#[tokio::test]
async fn selecting_missing_layer_is_rejected() {
    let host = SimulatedHost::new(DocumentId(1), 10.0, 10.0);

    let err = host
        .execute(&Descriptor::new(json!({
            "_obj": "select", "_target": [{ "_ref": "layer", "_id": 99 }]
        })))
        .await
        .unwrap_err();

    assert!(matches!(err, HostError::Rejected { verb, .. } if verb == "select"));
}

#[tokio::test]
async fn mask_transform_moves_mask_and_selection() {
    let host = SimulatedHost::new(DocumentId(1), 200.0, 200.0);
    let layer = host.add_masked_layer(
        "masked",
        LayerKind::SmartObject,
        true,
        Region::new(0.0, 0.0, 100.0, 100.0),
    );
    host.set_selection(Some(Region::new(0.0, 0.0, 200.0, 200.0)));

    host.execute(&Descriptor::new(json!({
        "_obj": "select",
        "_target": [
            { "_enum": "channel", "_ref": "channel", "_value": "mask" },
            { "_id": layer.0, "_ref": "layer" }
        ],
        "makeVisible": false
    })))
    .await
    .unwrap();

    host.execute(&Descriptor::new(json!({
        "_obj": "transform",
        "width": { "_unit": "percentUnit", "_value": 50.0 },
        "height": { "_unit": "percentUnit", "_value": 50.0 },
        "_target": [{ "_enum": "ordinal", "_ref": "layer", "_value": "targetEnum" }],
        "freeTransformCenterState": { "_enum": "quadCenterState", "_value": "QCSCorner0" }
    })))
    .await
    .unwrap();

    let layer = host.layer(layer).unwrap();
    assert_eq!(layer.mask, Some(Region::new(0.0, 0.0, 50.0, 50.0)));
    assert!(layer.pixel_transforms.is_empty());
    assert!(matches!(layer.mask_transforms[0], AppliedTransform::Scale { .. }));
    assert_eq!(host.selection(), Some(Region::new(0.0, 0.0, 100.0, 100.0)));
}

#[tokio::test]
async fn delete_without_active_layer_is_rejected() {
    let host = SimulatedHost::new(DocumentId(1), 10.0, 10.0);

    let result = host
        .execute(&Descriptor::new(json!({
            "_obj": "delete",
            "_target": [{ "_enum": "ordinal", "_ref": "layer", "_value": "targetEnum" }]
        })))
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn latency_is_applied_per_command() {
    let host = SimulatedHost::new(DocumentId(1), 10.0, 10.0)
        .with_latency(std::time::Duration::from_millis(1));
    let start = std::time::Instant::now();

    host.execute(&Descriptor::new(json!({
        "_obj": "get",
        "_target": { "_ref": [{ "_property": "selection" }, { "_ref": "document", "_id": 1 }] }
    })))
    .await
    .unwrap();

    assert!(start.elapsed() >= std::time::Duration::from_millis(1));
    assert_eq!(host.max_in_flight(), 1);
}
