//! Per-frame pipeline: smoother → gate → state machine → encoder.
//!
//! Each [`GesturePipeline`] owns one instance of every stage and processes
//! one frame to completion before the next. A frame whose timestamp does
//! not advance is rejected before any stage sees it, so a rejection never
//! changes pipeline state.

use std::fmt;

use serde::{Deserialize, Serialize};

use palmcursor_common::clock::{OrderViolation, TimestampGuard};
use palmcursor_common::error::{PalmError, PalmResult};
use palmcursor_frame_model::action::PointerAction;
use palmcursor_frame_model::frame::{RawFrame, SmoothedFrame, TimestampMs, INDEX_TIP, LANDMARK_COUNT};
use palmcursor_frame_model::geometry::Point2D;

use crate::encoder::{ActionEncoder, EncoderConfig};
use crate::fsm::{GestureConfig, GestureMachine, Phase, Transition};
use crate::gate::{GateConfig, GateState, OrientationGate};
use crate::smoothing::{build_smoother, Estimate, Smoother, SmootherConfig};

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub smoother: SmootherConfig,
    pub gate: GateConfig,
    pub gesture: GestureConfig,
    pub encoder: EncoderConfig,

    /// Landmark index that drives the pointer.
    pub pointer_landmark: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            smoother: SmootherConfig::default(),
            gate: GateConfig::default(),
            gesture: GestureConfig::default(),
            encoder: EncoderConfig::default(),
            pointer_landmark: INDEX_TIP,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> PalmResult<()> {
        self.smoother.validate()?;
        self.gate.validate()?;
        self.gesture.validate()?;
        self.encoder.validate()?;
        if self.pointer_landmark >= LANDMARK_COUNT {
            return Err(PalmError::config(format!(
                "pointer_landmark must be below {LANDMARK_COUNT}, got {}",
                self.pointer_landmark
            )));
        }
        Ok(())
    }
}

/// A frame refused at the input boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("frame at {received_ms} ms rejected ({reason}); last accepted {previous_ms} ms")]
pub struct FrameRejected {
    pub previous_ms: TimestampMs,
    pub received_ms: TimestampMs,
    pub reason: OrderViolation,
}

impl From<FrameRejected> for PalmError {
    fn from(err: FrameRejected) -> Self {
        PalmError::invalid_input(err.to_string())
    }
}

/// Everything the pipeline decided for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutcome {
    pub smoothed: SmoothedFrame,
    pub gate: GateState,
    /// Phase for this tick, including a transient RELEASED or CANCELLED.
    pub phase: Phase,
    pub transition: Transition,
    pub action: PointerAction,
}

/// One hand's gesture pipeline.
pub struct GesturePipeline {
    config: PipelineConfig,
    guard: TimestampGuard,
    smoother: Box<dyn Smoother>,
    gate: OrientationGate,
    machine: GestureMachine,
    encoder: ActionEncoder,
    last_estimate: Option<Estimate>,
}

impl fmt::Debug for GesturePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GesturePipeline")
            .field("smoother", &self.smoother.name())
            .field("phase", &self.machine.phase())
            .field("gate", &self.gate.state())
            .field("last_ms", &self.guard.last())
            .finish_non_exhaustive()
    }
}

impl GesturePipeline {
    /// Build every stage, failing on the first invalid setting.
    pub fn new(config: PipelineConfig) -> PalmResult<Self> {
        config.validate()?;
        let smoother = build_smoother(&config.smoother)?;
        let gate = OrientationGate::new(config.gate.clone())?;
        let machine = GestureMachine::new(config.gesture.clone())?;
        let encoder = ActionEncoder::new(config.encoder.clone())?;

        tracing::debug!(smoother = smoother.name(), "gesture pipeline created");

        Ok(Self {
            config,
            guard: TimestampGuard::new(),
            smoother,
            gate,
            machine,
            encoder,
            last_estimate: None,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn smoother_name(&self) -> &'static str {
        self.smoother.name()
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    pub fn last_timestamp(&self) -> Option<TimestampMs> {
        self.guard.last()
    }

    /// Extrapolated pointer position `horizon_ms` after the last frame.
    pub fn predict(&self, horizon_ms: f64) -> Option<Point2D> {
        self.smoother.predict(horizon_ms)
    }

    /// Process one frame.
    pub fn process(&mut self, frame: &RawFrame) -> Result<FrameOutcome, FrameRejected> {
        let t = frame.timestamp_ms;
        if let Err(reason) = self.guard.check(t) {
            let rejected = FrameRejected {
                previous_ms: self.guard.last().unwrap_or_default(),
                received_ms: t,
                reason,
            };
            tracing::warn!(
                previous_ms = rejected.previous_ms,
                received_ms = t,
                reason = %reason,
                "frame rejected"
            );
            return Err(rejected);
        }

        let estimate = self.smooth(frame);
        let smoothed = SmoothedFrame {
            timestamp_ms: t,
            position: estimate.position,
            velocity: estimate.velocity,
            acceleration: estimate.acceleration,
            predicted: estimate.predicted,
            confidence: frame.gesture.sanitized_confidence(),
        };

        let gate = self.gate.update(&frame.landmarks, t);
        let transition = self.machine.step(&frame.gesture, gate.armed, t);
        let action = self.encoder.encode(&transition, &smoothed);
        self.guard.commit(t);

        tracing::trace!(
            t,
            x = smoothed.position.x,
            y = smoothed.position.y,
            armed = gate.armed,
            phase = %transition.reported_phase(),
            action = action.kind.as_str(),
            "frame processed"
        );

        Ok(FrameOutcome {
            smoothed,
            gate,
            phase: transition.reported_phase(),
            transition,
            action,
        })
    }

    /// Process frames in order, stopping at the first rejection.
    pub fn process_all(&mut self, frames: &[RawFrame]) -> Result<Vec<FrameOutcome>, FrameRejected> {
        frames.iter().map(|f| self.process(f)).collect()
    }

    /// Return every stage to its initial state.
    pub fn reset(&mut self) {
        self.guard.reset();
        self.smoother.reset();
        self.gate.reset();
        self.machine.reset();
        self.encoder.reset();
        self.last_estimate = None;
    }

    fn smooth(&mut self, frame: &RawFrame) -> Estimate {
        let sample = frame
            .landmarks
            .get(self.config.pointer_landmark)
            .map(|p| p.xy())
            .filter(Point2D::is_finite);

        let estimate = match (sample, self.last_estimate) {
            (Some(p), _) => self.smoother.process(p, frame.timestamp_ms),
            (None, Some(last)) => {
                tracing::trace!(t = frame.timestamp_ms, "non-finite pointer sample, holding estimate");
                last
            }
            (None, None) => Estimate::at_rest(Point2D::CENTER),
        };
        self.last_estimate = Some(estimate);
        estimate
    }
}
