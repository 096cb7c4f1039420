//! Transform units and anchors
//!
//! Handles the named transform-center anchors and the scale units accepted
//! by the host, and their conversion to the host's enumeration values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Anchor about which rotate and scale are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformCenter {
    /// Top-left corner
    TopLeft,
    /// Middle of the top edge
    TopCenter,
    /// Top-right corner
    TopRight,
    /// Middle of the left edge
    MiddleLeft,
    /// Center of the bounds
    MiddleCenter,
    /// Middle of the right edge
    MiddleRight,
    /// Bottom-left corner
    BottomLeft,
    /// Middle of the bottom edge
    BottomCenter,
    /// Bottom-right corner
    BottomRight,
}

impl TransformCenter {
    /// All anchors in reading order
    pub const ALL: [TransformCenter; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::MiddleLeft,
        Self::MiddleCenter,
        Self::MiddleRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    /// The host's `quadCenterState` value for this anchor
    pub fn quad_center_state(&self) -> &'static str {
        match self {
            Self::TopLeft => "QCSCorner0",
            Self::TopCenter => "QCSSide0",
            Self::TopRight => "QCSCorner1",
            Self::MiddleLeft => "QCSSide3",
            Self::MiddleCenter => "QCSAverage",
            Self::MiddleRight => "QCSSide1",
            Self::BottomLeft => "QCSCorner3",
            Self::BottomCenter => "QCSSide2",
            Self::BottomRight => "QCSCorner2",
        }
    }

    /// The camelCase anchor name
    pub fn name(&self) -> &'static str {
        match self {
            Self::TopLeft => "topLeft",
            Self::TopCenter => "topCenter",
            Self::TopRight => "topRight",
            Self::MiddleLeft => "middleLeft",
            Self::MiddleCenter => "middleCenter",
            Self::MiddleRight => "middleRight",
            Self::BottomLeft => "bottomLeft",
            Self::BottomCenter => "bottomCenter",
            Self::BottomRight => "bottomRight",
        }
    }
}

impl Default for TransformCenter {
    fn default() -> Self {
        Self::MiddleCenter
    }
}

impl fmt::Display for TransformCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for TransformCenter {
    type Err = String;

    /// Accepts the anchor name (`middleCenter`) or the host value (`QCSAverage`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|center| {
                center.name().eq_ignore_ascii_case(s) || center.quad_center_state() == s
            })
            .ok_or_else(|| format!("Unknown transform center: {}", s))
    }
}

/// Unit of the width/height values of a scale transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleUnit {
    /// Percent of the current size
    Percent,
    /// Absolute pixel size
    Pixels,
}

impl ScaleUnit {
    /// The host's `_unit` value
    pub fn host_unit(&self) -> &'static str {
        match self {
            Self::Percent => "percentUnit",
            Self::Pixels => "pixelsUnit",
        }
    }
}

impl Default for ScaleUnit {
    fn default() -> Self {
        Self::Percent
    }
}

impl fmt::Display for ScaleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent => write!(f, "%"),
            Self::Pixels => write!(f, "px"),
        }
    }
}

impl FromStr for ScaleUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "percent" | "percentunit" | "%" => Ok(Self::Percent),
            "pixels" | "pixelsunit" | "px" => Ok(Self::Pixels),
            _ => Err(format!("Unknown scale unit: {}", s)),
        }
    }
}
