//! UI parameter translation
//!
//! Turns the values a panel collects (direction buttons, numeric fields,
//! anchor and unit drop-downs) into [`TransformCommand`]s. Numeric fields
//! arrive as text; an empty field counts as zero.

use layerwarp_core::{ScaleUnit, TransformCenter};
use std::fmt;
use std::str::FromStr;

use crate::command::TransformCommand;
use crate::error::{Result, TransformError};

/// Direction of a move button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Towards the top edge
    Up,
    /// Towards the bottom edge
    Down,
    /// Towards the left edge
    Left,
    /// Towards the right edge
    Right,
}

impl MoveDirection {
    /// Pixel offset `(dh, dv)` for moving `distance` in this direction
    pub fn offset(&self, distance: f64) -> (f64, f64) {
        match self {
            Self::Up => (0.0, -distance),
            Self::Down => (0.0, distance),
            Self::Left => (-distance, 0.0),
            Self::Right => (distance, 0.0),
        }
    }
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

impl FromStr for MoveDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.strip_prefix("btnmove").unwrap_or(lower.as_str()) {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(format!("Unknown move direction: {}", s)),
        }
    }
}

/// Direction of a rotate button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateDirection {
    /// Counter-clockwise
    Left,
    /// Clockwise
    Right,
}

impl RotateDirection {
    /// Signed angle: rotating left negates the entered value
    pub fn signed_angle(&self, angle: f64) -> f64 {
        match self {
            Self::Left => -angle,
            Self::Right => angle,
        }
    }
}

impl FromStr for RotateDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.strip_prefix("btnrotate").unwrap_or(lower.as_str()) {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(format!("Unknown rotate direction: {}", s)),
        }
    }
}

/// Flip the sign of the angle field
pub fn toggle_sign(value: f64) -> f64 {
    -value
}

/// Parse a numeric field
///
/// Blank text is zero. Anything that is not a finite number is rejected.
pub fn parse_number(param: &str, text: &str) -> Result<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    let value: f64 = trimmed.parse().map_err(|_| {
        TransformError::invalid_parameter(param, format!("'{}' is not a number", text))
    })?;
    if !value.is_finite() {
        return Err(TransformError::invalid_parameter(
            param,
            format!("'{}' is not finite", text),
        ));
    }
    Ok(value)
}

/// Angle carried by a preset button's label
pub fn parse_angle_preset(label: &str) -> Result<f64> {
    parse_number("angle preset", label)
}

fn parse_choice<T: FromStr<Err = String>>(param: &str, text: &str) -> Result<T> {
    text.parse()
        .map_err(|e: String| TransformError::invalid_parameter(param, e))
}

/// Build a move from a direction and the distance field
pub fn move_command(direction: MoveDirection, distance: &str) -> Result<TransformCommand> {
    let (dh, dv) = direction.offset(parse_number("distance", distance)?);
    Ok(TransformCommand::Move { dh, dv })
}

/// Build a rotate from a direction, the angle field and the anchor drop-down
pub fn rotate_command(
    direction: RotateDirection,
    angle: &str,
    center: &str,
) -> Result<TransformCommand> {
    Ok(TransformCommand::Rotate {
        angle: direction.signed_angle(parse_number("angle", angle)?),
        center: parse_choice("center", center)?,
    })
}

/// Build a scale from the width/height fields and the unit and anchor drop-downs
pub fn scale_command(
    width: &str,
    height: &str,
    unit: &str,
    center: &str,
) -> Result<TransformCommand> {
    Ok(TransformCommand::Scale {
        width: parse_number("width", width)?,
        height: parse_number("height", height)?,
        unit: parse_choice::<ScaleUnit>("unit", unit)?,
        center: parse_choice::<TransformCenter>("center", center)?,
    })
}
