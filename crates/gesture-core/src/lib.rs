//! PalmCursor Gesture Core
//!
//! Turns a stream of hand-tracking frames into pointer actions:
//! - **Smoothing:** Swappable denoising and prediction filters
//! - **Orientation gate:** Palm-facing hysteresis that arms interaction
//! - **Gesture FSM:** Press / drag / release decisions with debounce
//! - **Encoder:** W3C-style pointer actions, one per frame
//!
//! This crate is pure computation: no I/O, no clocks, no global state.
//! The same configuration and frames always produce the same actions.

pub mod encoder;
pub mod fsm;
pub mod gate;
pub mod math;
pub mod pipeline;
pub mod scenario;
pub mod smoothing;

pub use encoder::{encode, ActionEncoder, EncoderConfig};
pub use fsm::{transition, FsmInput, FsmState, GestureConfig, GestureMachine, LabelClass, Phase, Transition};
pub use gate::{Alignment, GateConfig, GateState, Handedness, OrientationGate};
pub use pipeline::{FrameOutcome, FrameRejected, GesturePipeline, PipelineConfig};
pub use scenario::Scenario;
pub use smoothing::{build_smoother, Estimate, Smoother, SmootherConfig};
