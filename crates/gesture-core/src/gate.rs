//! Palm orientation gate.
//!
//! Interaction is enabled only while the palm faces the camera. The palm
//! normal comes from Newell's method over the knuckle ring, and its cosine
//! against the camera axis drives a Schmitt trigger with dwell times:
//!
//! ```text
//!  alignment
//!    1.0 ┤
//!        │   ≥ arm_threshold for arm_dwell_ms       → ARMED
//!   0.85 ┼───────────────────────────────────────
//!        │   band: hold state, reset dwell timers
//!   0.50 ┼───────────────────────────────────────
//!        │   < disarm_threshold for disarm_dwell_ms → DISARMED
//!   -1.0 ┤
//! ```

use serde::{Deserialize, Serialize};

use palmcursor_common::error::{ensure_in_range, PalmError, PalmResult};
use palmcursor_frame_model::frame::{HandLandmarks, TimestampMs};
use palmcursor_frame_model::geometry::Vec3;

/// Which hand is tracked. A left hand's knuckle ring winds the other way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    #[default]
    Right,
    Left,
}

/// Cosine between the palm normal and the camera axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alignment {
    Valid(f64),
    /// The palm polygon is degenerate or non-finite.
    Indeterminate,
}

impl Alignment {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Valid(v) => Some(*v),
            Self::Indeterminate => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    Above,
    Band,
    Below,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Alignment at or above which the gate starts arming (cosine).
    pub arm_threshold: f64,

    /// Alignment below which the gate starts disarming (cosine).
    pub disarm_threshold: f64,

    /// Time alignment must stay above `arm_threshold` before arming (ms).
    pub arm_dwell_ms: u64,

    /// Time alignment must stay below `disarm_threshold` before disarming
    /// (ms). 0 disarms on the first low reading.
    pub disarm_dwell_ms: u64,

    /// Direction the palm must face, in landmark space. Looking into the
    /// screen by default.
    pub camera_axis: Vec3,

    pub handedness: Handedness,

    /// Shortest palm normal treated as meaningful geometry.
    pub min_normal_length: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            arm_threshold: 0.85,
            disarm_threshold: 0.5,
            arm_dwell_ms: 300,
            disarm_dwell_ms: 0,
            camera_axis: Vec3::new(0.0, 0.0, -1.0),
            handedness: Handedness::Right,
            min_normal_length: 1e-6,
        }
    }
}

impl GateConfig {
    /// Defaults with thresholds given as maximum tilt angles in degrees.
    pub fn from_degrees(arm_deg: f64, disarm_deg: f64) -> Self {
        Self {
            arm_threshold: arm_deg.to_radians().cos(),
            disarm_threshold: disarm_deg.to_radians().cos(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> PalmResult<()> {
        ensure_in_range("gate.arm_threshold", self.arm_threshold, -1.0, 1.0)?;
        ensure_in_range("gate.disarm_threshold", self.disarm_threshold, -1.0, 1.0)?;
        if self.disarm_threshold >= self.arm_threshold {
            return Err(PalmError::config(format!(
                "gate.disarm_threshold ({}) must be below gate.arm_threshold ({})",
                self.disarm_threshold, self.arm_threshold
            )));
        }
        if self.arm_dwell_ms == 0 {
            return Err(PalmError::config("gate.arm_dwell_ms must be positive"));
        }
        if self.camera_axis.normalized(f64::MIN_POSITIVE).is_none() {
            return Err(PalmError::config("gate.camera_axis must be a non-zero finite vector"));
        }
        ensure_in_range("gate.min_normal_length", self.min_normal_length, 0.0, 1.0)
    }

    fn zone(&self, reading: Alignment) -> Zone {
        match reading {
            Alignment::Valid(v) if v >= self.arm_threshold => Zone::Above,
            Alignment::Valid(v) if v >= self.disarm_threshold => Zone::Band,
            _ => Zone::Below,
        }
    }
}

/// Newell's-method normal of the palm polygon (not normalized).
pub fn palm_normal(landmarks: &HandLandmarks, handedness: Handedness) -> Vec3 {
    let ring = landmarks.palm_polygon();
    let mut n = Vec3::ZERO;
    for (i, a) in ring.iter().enumerate() {
        let b = &ring[(i + 1) % ring.len()];
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    match handedness {
        Handedness::Right => n,
        Handedness::Left => n.scale(-1.0),
    }
}

/// Alignment of the palm against the configured camera axis.
pub fn alignment(landmarks: &HandLandmarks, config: &GateConfig) -> Alignment {
    let normal = palm_normal(landmarks, config.handedness);
    let (Some(n), Some(axis)) = (
        normal.normalized(config.min_normal_length),
        config.camera_axis.normalized(f64::MIN_POSITIVE),
    ) else {
        return Alignment::Indeterminate;
    };
    Alignment::Valid(n.dot(&axis).clamp(-1.0, 1.0))
}

/// Gate state between ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateState {
    pub armed: bool,

    /// Start of the current run of readings past the opposite threshold.
    pub pending_since_ms: Option<TimestampMs>,

    /// Most recent reading.
    pub alignment: Alignment,
}

impl Default for GateState {
    fn default() -> Self {
        Self {
            armed: false,
            pending_since_ms: None,
            alignment: Alignment::Indeterminate,
        }
    }
}

impl GateState {
    /// State after observing `reading` at `timestamp_ms`.
    pub fn advance(&self, reading: Alignment, timestamp_ms: TimestampMs, config: &GateConfig) -> Self {
        let zone = config.zone(reading);
        let (toward, dwell_ms) = if self.armed {
            (Zone::Below, config.disarm_dwell_ms)
        } else {
            (Zone::Above, config.arm_dwell_ms)
        };

        if zone != toward {
            return Self {
                armed: self.armed,
                pending_since_ms: None,
                alignment: reading,
            };
        }

        let since = self.pending_since_ms.unwrap_or(timestamp_ms);
        if timestamp_ms.saturating_sub(since) >= dwell_ms {
            Self {
                armed: !self.armed,
                pending_since_ms: None,
                alignment: reading,
            }
        } else {
            Self {
                armed: self.armed,
                pending_since_ms: Some(since),
                alignment: reading,
            }
        }
    }
}

/// Owns a gate configuration and its running state.
#[derive(Debug, Clone)]
pub struct OrientationGate {
    config: GateConfig,
    state: GateState,
}

impl OrientationGate {
    pub fn new(config: GateConfig) -> PalmResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: GateState::default(),
        })
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state.armed
    }

    /// Observe one landmark set.
    pub fn update(&mut self, landmarks: &HandLandmarks, timestamp_ms: TimestampMs) -> GateState {
        let reading = alignment(landmarks, &self.config);
        self.observe(reading, timestamp_ms)
    }

    /// Observe a precomputed alignment.
    pub fn observe(&mut self, reading: Alignment, timestamp_ms: TimestampMs) -> GateState {
        let next = self.state.advance(reading, timestamp_ms, &self.config);
        if next.armed != self.state.armed {
            tracing::debug!(
                armed = next.armed,
                t = timestamp_ms,
                alignment = ?reading.value(),
                "orientation gate changed"
            );
        }
        self.state = next;
        next
    }

    pub fn reset(&mut self) {
        self.state = GateState::default();
    }
}
