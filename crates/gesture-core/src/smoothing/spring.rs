//! Mass-spring-damper follower.
//!
//! The cursor is a point mass pulled toward each new sample by a spring of
//! stiffness `k` and slowed by a damper `c = 2·ζ·√(k·m)`. Integration uses
//! semi-implicit Euler, sub-stepped so no step exceeds `max_step_ms`, the
//! natural period `1/ω` or the damping time `m/c`. That keeps `h·c/m ≤ 1`
//! and `h²·k/m ≤ 1`, inside the integrator's stable region for any accepted
//! stiffness and damping ratio. If a frame gap would need more than
//! `max_substeps` steps, the follower snaps to the target instead of
//! integrating a stale trajectory.

use serde::{Deserialize, Serialize};

use palmcursor_common::clock::{interval_secs, ms_to_secs};
use palmcursor_common::error::{ensure_in_range, ensure_positive, PalmError, PalmResult};
use palmcursor_frame_model::frame::TimestampMs;
use palmcursor_frame_model::geometry::Point2D;

use super::{Estimate, Smoother};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    /// Spring constant `k` (1/s² for unit mass).
    pub stiffness: f64,

    /// Damping ratio `ζ`. 1.0 is critical damping; below 1.0 overshoots.
    pub damping_ratio: f64,

    pub mass: f64,

    /// Longest single integration step (ms).
    pub max_step_ms: f64,

    /// Sub-step budget per frame before snapping to the target.
    pub max_substeps: u32,

    /// Horizon reported in each estimate's `predicted` field (ms).
    pub prediction_ms: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 300.0,
            damping_ratio: 1.0,
            mass: 1.0,
            max_step_ms: 8.0,
            max_substeps: 64,
            prediction_ms: 33.0,
        }
    }
}

impl SpringConfig {
    pub fn validate(&self) -> PalmResult<()> {
        ensure_positive("spring.stiffness", self.stiffness)?;
        ensure_positive("spring.damping_ratio", self.damping_ratio)?;
        ensure_positive("spring.mass", self.mass)?;
        ensure_positive("spring.max_step_ms", self.max_step_ms)?;
        ensure_in_range("spring.prediction_ms", self.prediction_ms, 0.0, 1_000.0)?;
        if self.max_substeps == 0 {
            return Err(PalmError::config("spring.max_substeps must be at least 1"));
        }
        Ok(())
    }

    /// Natural angular frequency `ω = √(k/m)` in rad/s.
    pub fn natural_frequency(&self) -> f64 {
        (self.stiffness / self.mass).sqrt()
    }

    /// Damping coefficient `c = 2·ζ·√(k·m)`.
    pub fn damping_coefficient(&self) -> f64 {
        2.0 * self.damping_ratio * (self.stiffness * self.mass).sqrt()
    }

    /// Largest step the integrator takes, in seconds.
    fn step_secs(&self) -> f64 {
        ms_to_secs(self.max_step_ms)
            .min(1.0 / self.natural_frequency())
            .min(self.mass / self.damping_coefficient())
    }
}

#[derive(Debug, Clone, Copy)]
struct Body {
    position: Point2D,
    velocity: Point2D,
    acceleration: Point2D,
}

impl Body {
    fn at(position: Point2D) -> Self {
        Self {
            position,
            velocity: Point2D::ZERO,
            acceleration: Point2D::ZERO,
        }
    }

    /// Advance by `dt` seconds toward `target`. Returns false when the
    /// interval needs more sub-steps than allowed.
    fn integrate(&mut self, target: &Point2D, dt: f64, config: &SpringConfig) -> bool {
        let steps = (dt / config.step_secs()).ceil().max(1.0);
        if steps > config.max_substeps as f64 {
            return false;
        }
        let h = dt / steps;
        let k = config.stiffness;
        let c = config.damping_coefficient();
        let m = config.mass;

        for _ in 0..steps as u32 {
            let stretch = target.sub(&self.position);
            let force = stretch.scale(k).sub(&self.velocity.scale(c));
            self.acceleration = force.scale(1.0 / m);
            self.velocity = self.velocity.add(&self.acceleration.scale(h));
            self.position = self.position.add(&self.velocity.scale(h));
        }
        true
    }
}

#[derive(Debug, Clone, Copy)]
struct SpringState {
    last_ms: TimestampMs,
    target: Point2D,
    body: Body,
}

/// Spring-damper follower over the pointer sample.
#[derive(Debug, Clone)]
pub struct SpringSmoother {
    config: SpringConfig,
    state: Option<SpringState>,
}

impl SpringSmoother {
    pub fn new(config: SpringConfig) -> PalmResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: None,
        })
    }

    pub fn config(&self) -> &SpringConfig {
        &self.config
    }

    fn project(&self, state: &SpringState, horizon_ms: f64) -> Point2D {
        let horizon = if horizon_ms.is_finite() {
            horizon_ms.max(0.0)
        } else {
            0.0
        };
        if horizon == 0.0 {
            return state.body.position;
        }
        let mut body = state.body;
        if body.integrate(&state.target, ms_to_secs(horizon), &self.config) {
            body.position
        } else {
            state.target
        }
    }

    fn estimate(&self, state: &SpringState) -> Estimate {
        Estimate {
            position: state.body.position,
            velocity: state.body.velocity,
            acceleration: Some(state.body.acceleration),
            predicted: Some(self.project(state, self.config.prediction_ms)),
        }
    }
}

impl Smoother for SpringSmoother {
    fn process(&mut self, sample: Point2D, timestamp_ms: TimestampMs) -> Estimate {
        let Some(prev) = self.state else {
            let state = SpringState {
                last_ms: timestamp_ms,
                target: sample,
                body: Body::at(sample),
            };
            self.state = Some(state);
            return self.estimate(&state);
        };

        let dt = interval_secs(prev.last_ms, timestamp_ms);
        if dt <= 0.0 {
            return self.estimate(&prev);
        }

        let mut body = prev.body;
        if !body.integrate(&sample, dt, &self.config) {
            tracing::trace!(gap_ms = timestamp_ms - prev.last_ms, "spring snapped to target");
            body = Body::at(sample);
        }

        let state = SpringState {
            last_ms: timestamp_ms,
            target: sample,
            body,
        };
        self.state = Some(state);
        self.estimate(&state)
    }

    fn predict(&self, horizon_ms: f64) -> Option<Point2D> {
        self.state.map(|s| self.project(&s, horizon_ms))
    }

    fn reset(&mut self) {
        self.state = None;
    }

    fn name(&self) -> &'static str {
        "spring"
    }
}
