//! Transform commands
//!
//! A [`TransformCommand`] is the value object behind one run. It produces the
//! primary descriptor applied to each target layer and the companion
//! descriptor applied to the restored selection.

use layerwarp_core::{Descriptor, ScaleUnit, TransformCenter, TransformKind};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::descriptors::{self, DescriptorTarget};

/// One geometric transform with its parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransformCommand {
    /// Translate by a pixel offset
    Move {
        /// Horizontal offset in pixels
        dh: f64,
        /// Vertical offset in pixels
        dv: f64,
    },
    /// Rotate about an anchor
    Rotate {
        /// Angle in degrees, positive is clockwise
        angle: f64,
        /// Anchor
        center: TransformCenter,
    },
    /// Scale about an anchor
    Scale {
        /// Target width, in `unit`
        width: f64,
        /// Target height, in `unit`
        height: f64,
        /// Unit of width and height
        unit: ScaleUnit,
        /// Anchor
        center: TransformCenter,
    },
}

impl TransformCommand {
    /// The transform kind
    pub fn kind(&self) -> TransformKind {
        match self {
            Self::Move { .. } => TransformKind::Move,
            Self::Rotate { .. } => TransformKind::Rotate,
            Self::Scale { .. } => TransformKind::Scale,
        }
    }

    /// Descriptor applied to each target layer or mask
    pub fn primary(&self) -> Descriptor {
        match *self {
            Self::Move { dh, dv } => descriptors::cut_and_offset(dh, dv),
            Self::Rotate { angle, center } => {
                descriptors::rotate(angle, center, DescriptorTarget::CurrentLayer)
            }
            Self::Scale {
                width,
                height,
                unit,
                center,
            } => descriptors::scale(width, height, unit, center, DescriptorTarget::CurrentLayer),
        }
    }

    /// Descriptor that moves the restored selection along with the content
    ///
    /// A move offsets the selection outline rather than cutting, since cut
    /// would act on pixels.
    pub fn selection_equivalent(&self) -> Descriptor {
        match *self {
            Self::Move { dh, dv } => descriptors::offset_selection(dh, dv),
            Self::Rotate { angle, center } => {
                descriptors::rotate(angle, center, DescriptorTarget::Selection)
            }
            Self::Scale {
                width,
                height,
                unit,
                center,
            } => descriptors::scale(width, height, unit, center, DescriptorTarget::Selection),
        }
    }
}

impl fmt::Display for TransformCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move { dh, dv } => write!(f, "move({}, {})", dh, dv),
            Self::Rotate { angle, center } => write!(f, "rotate({}, {})", angle, center),
            Self::Scale {
                width,
                height,
                unit,
                center,
            } => write!(f, "scale({}, {} {}, {})", width, height, unit, center),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_selection_equivalent_is_offset() {
        let command = TransformCommand::Move { dh: 3.0, dv: 4.0 };
        assert_eq!(command.kind(), TransformKind::Move);
        assert_eq!(command.primary().verb(), "cut");
        assert_eq!(command.selection_equivalent().verb(), "move");
        assert!(command.selection_equivalent().targets_selection());
    }

    #[test]
    fn test_rotate_pair_differs_only_in_target() {
        let command = TransformCommand::Rotate {
            angle: 45.0,
            center: TransformCenter::MiddleCenter,
        };
        let primary = command.primary();
        let follow_up = command.selection_equivalent();
        assert_eq!(primary.get("angle"), follow_up.get("angle"));
        assert_eq!(
            primary.get("freeTransformCenterState"),
            follow_up.get("freeTransformCenterState")
        );
        assert!(!primary.targets_selection());
        assert!(follow_up.targets_selection());
    }

    #[test]
    fn test_serde_tagging() {
        let command = TransformCommand::Scale {
            width: 50.0,
            height: 50.0,
            unit: ScaleUnit::Percent,
            center: TransformCenter::BottomRight,
        };
        let value = serde_json::to_value(command).unwrap();
        assert_eq!(value["kind"], "scale");
        let back: TransformCommand = serde_json::from_value(value).unwrap();
        assert_eq!(back, command);
    }
}
