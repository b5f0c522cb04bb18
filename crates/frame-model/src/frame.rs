//! Per-tick frame types.
//!
//! A [`RawFrame`] is what the tracking collaborator hands us once per
//! camera tick. A [`SmoothedFrame`] is derived from exactly one raw frame
//! by the smoothing stage.

use serde::{Deserialize, Serialize};

pub use palmcursor_common::clock::TimestampMs;

use crate::geometry::{Point2D, Vec3};

/// Number of landmarks in a hand landmark set.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// The 21 landmarks of one hand, in tracking-runtime order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HandLandmarks(pub [Vec3; LANDMARK_COUNT]);

impl HandLandmarks {
    pub fn new(points: [Vec3; LANDMARK_COUNT]) -> Self {
        Self(points)
    }

    /// Landmark at `index`, or `None` if out of range.
    pub fn get(&self, index: usize) -> Option<&Vec3> {
        self.0.get(index)
    }

    pub fn index_tip(&self) -> Vec3 {
        self.0[INDEX_TIP]
    }

    /// The knuckle ring used to define the palm plane, wrist first.
    pub fn palm_polygon(&self) -> [Vec3; 5] {
        [
            self.0[WRIST],
            self.0[INDEX_MCP],
            self.0[MIDDLE_MCP],
            self.0[RING_MCP],
            self.0[PINKY_MCP],
        ]
    }

    pub fn points(&self) -> &[Vec3; LANDMARK_COUNT] {
        &self.0
    }
}

/// Gesture classification for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureReading {
    /// Classifier label (e.g., "Pointing_Up", "Open_Palm", "None").
    #[serde(rename = "gesture")]
    pub label: String,

    /// Classifier confidence in [0.0, 1.0].
    pub confidence: f64,
}

impl GestureReading {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// No gesture detected.
    pub fn none() -> Self {
        Self::new("None", 0.0)
    }

    /// Confidence clamped into [0, 1]; non-finite values read as 0.
    pub fn sanitized_confidence(&self) -> f64 {
        if self.confidence.is_finite() {
            self.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

impl Default for GestureReading {
    fn default() -> Self {
        Self::none()
    }
}

/// One raw tracking sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFrame {
    /// Monotonic milliseconds since session start.
    #[serde(rename = "t")]
    pub timestamp_ms: TimestampMs,

    /// Hand landmarks.
    pub landmarks: HandLandmarks,

    /// Gesture label and confidence.
    #[serde(flatten)]
    pub gesture: GestureReading,
}

impl RawFrame {
    pub fn new(timestamp_ms: TimestampMs, landmarks: HandLandmarks, gesture: GestureReading) -> Self {
        Self {
            timestamp_ms,
            landmarks,
            gesture,
        }
    }
}

/// Output of the smoothing stage for one raw frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothedFrame {
    #[serde(rename = "t")]
    pub timestamp_ms: TimestampMs,

    /// Smoothed pointer position (normalized).
    pub position: Point2D,

    /// Smoothed velocity (normalized units per second).
    pub velocity: Point2D,

    /// Acceleration (normalized units per second squared), if the filter tracks it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceleration: Option<Point2D>,

    /// Forward-predicted position, if the filter predicts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted: Option<Point2D>,

    /// Gesture confidence passthrough.
    pub confidence: f64,
}
