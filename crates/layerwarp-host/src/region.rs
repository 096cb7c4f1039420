//! Rectangular region geometry used for selections and masks

use serde::{Deserialize, Serialize};

/// A rectangle with an accumulated rotation, in document pixels
///
/// `x`/`y` locate the top-left corner of the unrotated box; `rotation`
/// is in degrees and accumulates across rotate transforms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
    /// Accumulated rotation in degrees
    pub rotation: f64,
}

impl Region {
    /// Create an unrotated region
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
        }
    }

    /// Center point of the box
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Anchor point for a host `quadCenterState` value
    ///
    /// Unknown values fall back to the box center.
    pub fn anchor(&self, quad_center_state: &str) -> (f64, f64) {
        let (left, top) = (self.x, self.y);
        let (right, bottom) = (self.x + self.width, self.y + self.height);
        let (cx, cy) = self.center();
        match quad_center_state {
            "QCSCorner0" => (left, top),
            "QCSSide0" => (cx, top),
            "QCSCorner1" => (right, top),
            "QCSSide3" => (left, cy),
            "QCSSide1" => (right, cy),
            "QCSCorner3" => (left, bottom),
            "QCSSide2" => (cx, bottom),
            "QCSCorner2" => (right, bottom),
            _ => (cx, cy),
        }
    }

    /// Offset by a pixel delta
    pub fn translated(&self, dh: f64, dv: f64) -> Self {
        Self {
            x: self.x + dh,
            y: self.y + dv,
            ..*self
        }
    }

    /// Rotate the box center about an anchor
    pub fn rotated(&self, angle_deg: f64, quad_center_state: &str) -> Self {
        let (ax, ay) = self.anchor(quad_center_state);
        let (cx, cy) = self.center();
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let (dx, dy) = (cx - ax, cy - ay);
        let (ncx, ncy) = (ax + dx * cos - dy * sin, ay + dx * sin + dy * cos);
        Self {
            x: ncx - self.width / 2.0,
            y: ncy - self.height / 2.0,
            width: self.width,
            height: self.height,
            rotation: self.rotation + angle_deg,
        }
    }

    /// Scale by factors, keeping the anchor fixed
    pub fn scaled(&self, sx: f64, sy: f64, quad_center_state: &str) -> Self {
        let (ax, ay) = self.anchor(quad_center_state);
        Self {
            x: ax + (self.x - ax) * sx,
            y: ay + (self.y - ay) * sy,
            width: self.width * sx,
            height: self.height * sy,
            rotation: self.rotation,
        }
    }

    /// Component-wise comparison within `eps`
    pub fn approx_eq(&self, other: &Region, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps
            && (self.y - other.y).abs() <= eps
            && (self.width - other.width).abs() <= eps
            && (self.height - other.height).abs() <= eps
            && (self.rotation - other.rotation).abs() <= eps
    }
}
