//! Pointer action encoding.

use serde::{Deserialize, Serialize};

use palmcursor_common::error::{ensure_in_range, PalmResult};
use palmcursor_frame_model::action::{PointerAction, PointerActionKind, PointerType};
use palmcursor_frame_model::frame::{SmoothedFrame, TimestampMs};

use crate::fsm::{Phase, Transition};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Identifier reported on every action of the session.
    pub pointer_id: u32,

    pub pointer_type: PointerType,

    /// Pressure reported for DOWN and MOVE_DRAG, in [0, 1].
    pub down_pressure: f64,

    /// Clamp positions into the unit square.
    pub clamp_position: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            pointer_id: 1,
            pointer_type: PointerType::Touch,
            down_pressure: 0.5,
            clamp_position: true,
        }
    }
}

impl EncoderConfig {
    pub fn validate(&self) -> PalmResult<()> {
        ensure_in_range("encoder.down_pressure", self.down_pressure, 0.0, 1.0)
    }
}

/// Build the action for one tick.
pub fn encode(transition: &Transition, frame: &SmoothedFrame, config: &EncoderConfig) -> PointerAction {
    let kind = transition.action;
    let pressed = matches!(transition.next.phase, Phase::Engaged | Phase::Dragging);
    let pressure = match kind {
        PointerActionKind::Down | PointerActionKind::MoveDrag => config.down_pressure,
        _ => 0.0,
    };
    let position = if config.clamp_position {
        frame.position.clamp_unit()
    } else {
        frame.position
    };

    PointerAction {
        kind,
        timestamp_ms: frame.timestamp_ms,
        position,
        pressure,
        buttons: u8::from(pressed),
        pointer_id: config.pointer_id,
        pointer_type: config.pointer_type,
    }
}

/// Encodes a session's actions, keeping their timestamps non-decreasing.
#[derive(Debug, Clone)]
pub struct ActionEncoder {
    config: EncoderConfig,
    last_ms: Option<TimestampMs>,
}

impl ActionEncoder {
    pub fn new(config: EncoderConfig) -> PalmResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            last_ms: None,
        })
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn encode(&mut self, transition: &Transition, frame: &SmoothedFrame) -> PointerAction {
        let mut action = encode(transition, frame, &self.config);
        if let Some(last) = self.last_ms {
            action.timestamp_ms = action.timestamp_ms.max(last);
        }
        self.last_ms = Some(action.timestamp_ms);
        action
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
