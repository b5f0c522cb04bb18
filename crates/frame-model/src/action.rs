//! Pointer actions emitted once per frame.
//!
//! The emission collaborator maps these onto platform events; each kind
//! names the W3C Pointer Events type it corresponds to.

use serde::{Deserialize, Serialize};

use crate::frame::TimestampMs;
use crate::geometry::Point2D;

/// Discriminated pointer action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerActionKind {
    /// Nothing to emit this tick.
    None,
    /// Hover position update, no buttons pressed.
    Move,
    /// Primary button pressed.
    Down,
    /// Position update while pressed.
    MoveDrag,
    /// Primary button released.
    Up,
    /// Interaction aborted; the target must discard the gesture.
    Cancel,
}

impl PointerActionKind {
    /// W3C Pointer Events type name, or `None` for [`PointerActionKind::None`].
    pub fn event_type(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Move | Self::MoveDrag => Some("pointermove"),
            Self::Down => Some("pointerdown"),
            Self::Up => Some("pointerup"),
            Self::Cancel => Some("pointercancel"),
        }
    }

    /// Whether the primary button is held after this action.
    pub fn is_pressed(&self) -> bool {
        matches!(self, Self::Down | Self::MoveDrag)
    }

    /// Short mnemonic used in logs and signatures.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Move => "move",
            Self::Down => "down",
            Self::MoveDrag => "move_drag",
            Self::Up => "up",
            Self::Cancel => "cancel",
        }
    }
}

/// Kind of pointing device reported to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PointerType {
    Mouse,
    Pen,
    #[default]
    Touch,
}

/// One pointer action ready for emission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerAction {
    #[serde(rename = "type")]
    pub kind: PointerActionKind,

    /// Monotonic milliseconds; non-decreasing within a session.
    #[serde(rename = "t")]
    pub timestamp_ms: TimestampMs,

    /// Normalized position taken from the smoothed frame.
    pub position: Point2D,

    /// Pressure in [0.0, 1.0].
    pub pressure: f64,

    /// Pressed-button bitmask (W3C `buttons`).
    pub buttons: u8,

    /// Stable pointer identifier for the session.
    pub pointer_id: u32,

    pub pointer_type: PointerType,
}
