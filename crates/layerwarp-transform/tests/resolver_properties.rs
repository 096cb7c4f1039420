//! Property tests for target resolution and whole runs

use layerwarp_core::{DocumentId, LayerKind, TransformTarget};
use layerwarp_host::{Region, SimulatedHost};
use layerwarp_settings::TransformConfig;
use layerwarp_transform::{target_for, MultiLayerTransform};
use proptest::prelude::*;
use std::sync::Arc;

fn layer_kind() -> impl Strategy<Value = LayerKind> {
    prop_oneof![
        Just(LayerKind::Normal),
        Just(LayerKind::Text),
        Just(LayerKind::SmartObject),
        Just(LayerKind::Fill),
        Just(LayerKind::Adjustment),
        Just(LayerKind::Group),
        Just(LayerKind::Other),
    ]
}

#[derive(Debug, Clone)]
struct LayerSetup {
    kind: LayerKind,
    masked: bool,
    visible: bool,
}

fn layer_setup() -> impl Strategy<Value = LayerSetup> {
    (layer_kind(), any::<bool>(), any::<bool>()).prop_map(|(kind, masked, visible)| LayerSetup {
        kind,
        masked,
        visible,
    })
}

proptest! {
    #[test]
    fn mask_wins_and_only_normal_layers_use_pixels(
        kind in layer_kind(),
        has_mask in any::<bool>(),
    ) {
        match target_for(kind, has_mask) {
            Some(TransformTarget::LayerMask) => prop_assert!(has_mask),
            Some(TransformTarget::LayerPixels) => {
                prop_assert!(!has_mask && kind == LayerKind::Normal)
            }
            None => prop_assert!(!has_mask && kind != LayerKind::Normal),
        }
    }

    #[test]
    fn runs_leave_document_as_found_apart_from_edits(
        setups in prop::collection::vec(layer_setup(), 0..6),
        with_selection in any::<bool>(),
        include_hidden in any::<bool>(),
        dh in -50.0f64..50.0,
        dv in -50.0f64..50.0,
    ) {
        let host = Arc::new(SimulatedHost::new(DocumentId(1), 500.0, 500.0));
        let ids: Vec<_> = setups
            .iter()
            .enumerate()
            .map(|(i, setup)| {
                let name = format!("layer {}", i);
                if setup.masked {
                    let mask = Region::new(0.0, 0.0, 10.0, 10.0);
                    host.add_masked_layer(&name, setup.kind, setup.visible, mask)
                } else {
                    host.add_layer(&name, setup.kind, setup.visible)
                }
            })
            .collect();
        host.set_active_layers(&ids);
        let selection = with_selection.then(|| Region::new(100.0, 100.0, 50.0, 50.0));
        host.set_selection(selection);

        let config = TransformConfig {
            include_hidden_layers: include_hidden,
            ..Default::default()
        };
        let engine = MultiLayerTransform::new(Arc::clone(&host), config);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let report = runtime.block_on(engine.translate(dh, dv)).unwrap();

        // No carrier survives, layer focus and selection existence are restored
        prop_assert_eq!(host.layers().len(), setups.len());
        prop_assert_eq!(host.active_layer_ids(), ids.clone());
        prop_assert_eq!(host.selection().is_some(), with_selection);
        prop_assert_eq!(host.open_suspensions(), 0);

        for (setup, id) in setups.iter().zip(&ids) {
            let layer = host.layer(*id).unwrap();
            let targeted = include_hidden || setup.visible;
            let expected = if targeted { target_for(setup.kind, setup.masked) } else { None };
            match expected {
                Some(TransformTarget::LayerMask) => {
                    prop_assert_eq!(layer.mask_transforms.len(), 1);
                    prop_assert!(layer.pixel_transforms.is_empty());
                }
                Some(TransformTarget::LayerPixels) => {
                    prop_assert_eq!(layer.pixel_transforms.len(), 1);
                    prop_assert!(layer.mask_transforms.is_empty());
                }
                None => {
                    prop_assert!(layer.pixel_transforms.is_empty());
                    prop_assert!(layer.mask_transforms.is_empty());
                }
            }
        }

        let history = host.history_calls().len();
        prop_assert_eq!(history, if report.is_noop() { 0 } else { 2 });
    }
}
