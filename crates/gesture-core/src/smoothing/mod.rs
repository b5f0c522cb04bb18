//! Pointer smoothing and prediction.
//!
//! Every algorithm implements [`Smoother`], so the pipeline can swap one
//! for another without touching the gate or the state machine. Filters
//! are deterministic: the same configuration and input sequence always
//! produce the same estimates.

pub mod chain;
pub mod double_exponential;
pub mod one_euro;
pub mod passthrough;
pub mod spring;

use serde::{Deserialize, Serialize};

use palmcursor_common::error::{PalmError, PalmResult};
use palmcursor_frame_model::frame::TimestampMs;
use palmcursor_frame_model::geometry::Point2D;

pub use chain::SmootherChain;
pub use double_exponential::{DoubleExponentialConfig, DoubleExponentialPredictor};
pub use one_euro::{OneEuroConfig, OneEuroSmoother};
pub use passthrough::PassthroughSmoother;
pub use spring::{SpringConfig, SpringSmoother};

/// Output of one smoothing step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Denoised position.
    pub position: Point2D,
    /// Velocity in normalized units per second.
    pub velocity: Point2D,
    /// Acceleration in normalized units per second squared.
    pub acceleration: Option<Point2D>,
    /// Forward-predicted position at the filter's configured horizon.
    pub predicted: Option<Point2D>,
}

impl Estimate {
    /// An estimate at rest at `position`.
    pub fn at_rest(position: Point2D) -> Self {
        Self {
            position,
            velocity: Point2D::ZERO,
            acceleration: None,
            predicted: None,
        }
    }
}

/// A stateful filter that turns one noisy sample into an estimate.
pub trait Smoother: Send {
    /// Feed one sample taken at `timestamp_ms`.
    fn process(&mut self, sample: Point2D, timestamp_ms: TimestampMs) -> Estimate;

    /// Extrapolated position `horizon_ms` after the last sample, if supported.
    fn predict(&self, _horizon_ms: f64) -> Option<Point2D> {
        None
    }

    /// Return to the freshly constructed state.
    fn reset(&mut self);

    /// Algorithm name for logs and stream headers.
    fn name(&self) -> &'static str;
}

/// Selects and parameterizes a smoothing algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SmootherConfig {
    /// Adaptive low-lag filter (1€ family).
    OneEuro(OneEuroConfig),
    /// LaViola double-exponential smoothing with trend extrapolation.
    DoubleExponential(DoubleExponentialConfig),
    /// Mass-spring-damper follower.
    Spring(SpringConfig),
    /// No smoothing; raw samples pass through.
    Passthrough,
    /// Stages applied in order, each smoothing the previous stage's output.
    Chain { stages: Vec<SmootherConfig> },
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self::OneEuro(OneEuroConfig::default())
    }
}

impl SmootherConfig {
    /// Stable name of the selected algorithm.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::OneEuro(_) => "one_euro",
            Self::DoubleExponential(_) => "double_exponential",
            Self::Spring(_) => "spring",
            Self::Passthrough => "passthrough",
            Self::Chain { .. } => "chain",
        }
    }

    /// Default configuration for an algorithm name (as accepted on the CLI).
    pub fn from_kind_name(name: &str) -> PalmResult<Self> {
        match name {
            "one_euro" | "one-euro" => Ok(Self::OneEuro(OneEuroConfig::default())),
            "double_exponential" | "double-exponential" | "desp" => {
                Ok(Self::DoubleExponential(DoubleExponentialConfig::default()))
            }
            "spring" => Ok(Self::Spring(SpringConfig::default())),
            "passthrough" | "none" => Ok(Self::Passthrough),
            other => Err(PalmError::config(format!(
                "Unknown smoother '{other}'. Use: one_euro|double_exponential|spring|passthrough"
            ))),
        }
    }

    pub fn validate(&self) -> PalmResult<()> {
        match self {
            Self::OneEuro(c) => c.validate(),
            Self::DoubleExponential(c) => c.validate(),
            Self::Spring(c) => c.validate(),
            Self::Passthrough => Ok(()),
            Self::Chain { stages } => {
                if stages.is_empty() {
                    return Err(PalmError::config("smoother chain must have at least one stage"));
                }
                stages.iter().try_for_each(SmootherConfig::validate)
            }
        }
    }
}

/// Construct the smoother described by `config`, validating it first.
pub fn build_smoother(config: &SmootherConfig) -> PalmResult<Box<dyn Smoother>> {
    let smoother: Box<dyn Smoother> = match config {
        SmootherConfig::OneEuro(c) => Box::new(OneEuroSmoother::new(c.clone())?),
        SmootherConfig::DoubleExponential(c) => {
            Box::new(DoubleExponentialPredictor::new(c.clone())?)
        }
        SmootherConfig::Spring(c) => Box::new(SpringSmoother::new(c.clone())?),
        SmootherConfig::Passthrough => Box::new(PassthroughSmoother::new()),
        SmootherConfig::Chain { stages } => {
            let built = stages
                .iter()
                .map(build_smoother)
                .collect::<PalmResult<Vec<_>>>()?;
            Box::new(SmootherChain::new(built)?)
        }
    };
    Ok(smoother)
}
