//! Selection snapshot manager against the simulated host

use layerwarp_core::{DocumentId, LayerKind};
use layerwarp_host::{Region, SimulatedHost};
use layerwarp_transform::descriptors;
use layerwarp_transform::{SelectionSnapshot, SnapshotState, TransformError};

fn host_with_layer() -> SimulatedHost {
    let host = SimulatedHost::new(DocumentId(2), 300.0, 200.0);
    let layer = host.add_layer("content", LayerKind::Normal, true);
    host.set_active_layers(&[layer]);
    host
}

#[tokio::test]
async fn snapshot_without_selection_captures_whole_canvas() {
    let host = host_with_layer();
    let mut snapshot = SelectionSnapshot::new(DocumentId(2), "__tempSelection_1");

    let (carrier, had_selection) = snapshot.snapshot(&host).await.unwrap();

    assert!(!had_selection);
    assert_eq!(
        snapshot.state(),
        SnapshotState::Taken {
            carrier,
            had_selection: false
        }
    );
    let layer = host.layer(carrier).unwrap();
    assert_eq!(layer.name, "__tempSelection_1");
    assert_eq!(layer.mask, Some(Region::new(0.0, 0.0, 300.0, 200.0)));
}

#[tokio::test]
async fn reload_brings_back_snapshotted_selection() {
    let host = host_with_layer();
    let original = Region::new(10.0, 10.0, 30.0, 30.0);
    host.set_selection(Some(original));
    let mut snapshot = SelectionSnapshot::new(DocumentId(2), "carrier");
    snapshot.snapshot(&host).await.unwrap();

    host.set_selection(Some(Region::new(0.0, 0.0, 1.0, 1.0)));
    snapshot.reload(&host).await.unwrap();
    snapshot.reload(&host).await.unwrap();

    assert_eq!(host.selection(), Some(original));
}

#[tokio::test]
async fn restore_without_selection_clears_and_skips_follow_up() {
    let host = host_with_layer();
    let mut snapshot = SelectionSnapshot::new(DocumentId(2), "carrier");
    let (carrier, _) = snapshot.snapshot(&host).await.unwrap();

    let follow_up = descriptors::offset_selection(5.0, 5.0);
    snapshot.restore(&host, Some(&follow_up)).await.unwrap();

    assert_eq!(snapshot.state(), SnapshotState::Consumed);
    assert_eq!(host.selection(), None);
    assert!(host.layer(carrier).is_none());
    assert!(!host.executed_verbs().contains(&"move".to_string()));
}

#[tokio::test]
async fn restore_with_selection_runs_follow_up() {
    let host = host_with_layer();
    let original = Region::new(10.0, 10.0, 30.0, 30.0);
    host.set_selection(Some(original));
    let mut snapshot = SelectionSnapshot::new(DocumentId(2), "carrier");
    snapshot.snapshot(&host).await.unwrap();

    let follow_up = descriptors::offset_selection(5.0, -5.0);
    snapshot.restore(&host, Some(&follow_up)).await.unwrap();

    assert_eq!(host.selection(), Some(original.translated(5.0, -5.0)));
    assert_eq!(host.layers().len(), 1);
}

#[tokio::test]
async fn out_of_order_calls_are_rejected() {
    let host = host_with_layer();
    let mut snapshot = SelectionSnapshot::new(DocumentId(2), "carrier");

    assert!(matches!(
        snapshot.reload(&host).await,
        Err(TransformError::InvalidStateTransition { .. })
    ));
    assert!(matches!(
        snapshot.restore(&host, None).await,
        Err(TransformError::InvalidStateTransition { .. })
    ));

    snapshot.snapshot(&host).await.unwrap();
    assert!(matches!(
        snapshot.snapshot(&host).await,
        Err(TransformError::InvalidStateTransition { .. })
    ));

    snapshot.restore(&host, None).await.unwrap();
    assert!(snapshot.reload(&host).await.is_err());
    assert!(snapshot.restore(&host, None).await.is_err());
}

#[tokio::test]
async fn discard_is_best_effort() {
    let host = host_with_layer();
    let mut snapshot = SelectionSnapshot::new(DocumentId(2), "carrier");
    let (carrier, _) = snapshot.snapshot(&host).await.unwrap();
    host.fail_on("set", 2);

    // Clearing the selection fails but the carrier still goes
    assert!(snapshot.discard(&host).await);
    assert!(host.layer(carrier).is_none());
    assert_eq!(snapshot.state(), SnapshotState::Consumed);
}
