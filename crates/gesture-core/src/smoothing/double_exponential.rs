//! Double exponential smoothing predictor.
//!
//! LaViola, "Double Exponential Smoothing: An Alternative to Kalman
//! Filter-Based Predictive Tracking" (2003).
//!
//! Two chained exponential filters give a level estimate
//! `b0 = 2·S − S'` and a per-sample trend `b1 = α/(1−α)·(S − S')`.
//! The trend is converted to units per second with the last frame
//! interval, which lets [`DoubleExponentialPredictor::predict`]
//! extrapolate over a horizon expressed in milliseconds.
//!
//! Extrapolation is bounded twice: the horizon is capped at
//! `max_horizon_ms`, and the predicted displacement is capped at
//! `max_prediction_displacement`. A noisy trend therefore cannot throw the
//! predicted cursor further than the configured distance.

use serde::{Deserialize, Serialize};

use palmcursor_common::clock::{interval_secs, ms_to_secs, secs_to_ms};
use palmcursor_common::error::{ensure_in_range, ensure_positive, PalmError, PalmResult};
use palmcursor_frame_model::frame::TimestampMs;
use palmcursor_frame_model::geometry::Point2D;

use super::{Estimate, Smoother};
use crate::math::{blend, clamp_length, rate};

/// Predictor tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoubleExponentialConfig {
    /// Smoothing factor in (0, 1). Higher = more responsive.
    pub alpha: f64,

    /// Horizon reported in each estimate's `predicted` field (ms).
    pub prediction_ms: f64,

    /// Longest horizon `predict` will extrapolate (ms).
    pub max_horizon_ms: f64,

    /// Longest predicted displacement from the level estimate (normalized units).
    pub max_prediction_displacement: f64,

    /// Clamp smoothed and predicted positions into `[0, 1]`.
    pub clamp_output: bool,

    /// Distance at which a target counts as reached (normalized units).
    pub arrival_radius: f64,

    /// Speeds below this never reach a target (normalized units/s).
    pub min_speed: f64,

    /// Upper bound on reported time-to-target (ms).
    pub max_time_to_target_ms: f64,
}

impl Default for DoubleExponentialConfig {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            prediction_ms: 50.0,
            max_horizon_ms: 100.0,
            max_prediction_displacement: 0.05,
            clamp_output: true,
            arrival_radius: 0.001,
            min_speed: 0.001,
            max_time_to_target_ms: 1_000.0,
        }
    }
}

impl DoubleExponentialConfig {
    pub fn validate(&self) -> PalmResult<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(PalmError::config(format!(
                "double_exponential.alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }
        ensure_positive("double_exponential.max_horizon_ms", self.max_horizon_ms)?;
        ensure_in_range(
            "double_exponential.prediction_ms",
            self.prediction_ms,
            0.0,
            self.max_horizon_ms,
        )?;
        ensure_positive(
            "double_exponential.max_prediction_displacement",
            self.max_prediction_displacement,
        )?;
        ensure_in_range(
            "double_exponential.arrival_radius",
            self.arrival_radius,
            0.0,
            f64::MAX,
        )?;
        ensure_positive("double_exponential.min_speed", self.min_speed)?;
        ensure_positive(
            "double_exponential.max_time_to_target_ms",
            self.max_time_to_target_ms,
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct DespState {
    last_ms: TimestampMs,
    /// Single-smoothed position `S`.
    single: Point2D,
    /// Double-smoothed position `S'`.
    double: Point2D,
    /// Trend in units per second.
    velocity: Point2D,
    acceleration: Point2D,
}

/// LaViola double-exponential smoothing predictor.
#[derive(Debug, Clone)]
pub struct DoubleExponentialPredictor {
    config: DoubleExponentialConfig,
    state: Option<DespState>,
}

impl DoubleExponentialPredictor {
    /// Create a predictor, failing fast on invalid parameters.
    pub fn new(config: DoubleExponentialConfig) -> PalmResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: None,
        })
    }

    pub fn config(&self) -> &DoubleExponentialConfig {
        &self.config
    }

    /// Current level estimate `b0`, if any sample has been seen.
    pub fn level(&self) -> Option<Point2D> {
        self.state.map(|s| s.single.scale(2.0).sub(&s.double))
    }

    /// Current trend in units per second.
    pub fn velocity(&self) -> Option<Point2D> {
        self.state.map(|s| s.velocity)
    }

    fn output(&self, p: Point2D) -> Point2D {
        if self.config.clamp_output {
            p.clamp_unit()
        } else {
            p
        }
    }

    fn extrapolate(&self, state: &DespState, horizon_ms: f64) -> Point2D {
        let level = state.single.scale(2.0).sub(&state.double);
        let horizon = if horizon_ms.is_finite() {
            horizon_ms.clamp(0.0, self.config.max_horizon_ms)
        } else {
            0.0
        };
        let displacement = clamp_length(
            &state.velocity.scale(ms_to_secs(horizon)),
            self.config.max_prediction_displacement,
        );
        self.output(level.add(&displacement))
    }

    fn estimate(&self, state: &DespState) -> Estimate {
        let level = state.single.scale(2.0).sub(&state.double);
        Estimate {
            position: self.output(level),
            velocity: state.velocity,
            acceleration: Some(state.acceleration),
            predicted: Some(self.extrapolate(state, self.config.prediction_ms)),
        }
    }

    /// Time in ms until the current motion reaches `target`.
    ///
    /// `Some(0.0)` if already within `arrival_radius`; `None` if the hand
    /// is effectively still or moving away. Otherwise distance over
    /// closing speed, capped at `max_time_to_target_ms`.
    pub fn time_to_target(&self, target: Point2D) -> Option<f64> {
        let state = self.state?;
        let level = state.single.scale(2.0).sub(&state.double);
        let to_target = target.sub(&level);
        let distance = to_target.length();
        if distance <= self.config.arrival_radius {
            return Some(0.0);
        }

        let speed = state.velocity.length();
        if speed < self.config.min_speed {
            return None;
        }

        let closing_dot = to_target.dot(&state.velocity);
        if closing_dot <= 0.0 {
            return None;
        }

        let closing_speed = closing_dot / distance;
        let tti_ms = secs_to_ms(distance / closing_speed);
        Some(tti_ms.min(self.config.max_time_to_target_ms))
    }

    /// Predicted path sampled at `steps + 1` evenly spaced horizons over
    /// `duration_ms`, as `(horizon_ms, position)` pairs.
    pub fn trajectory(&self, duration_ms: f64, steps: usize) -> Vec<(f64, Point2D)> {
        let Some(state) = self.state else {
            return vec![];
        };
        if steps == 0 {
            return vec![(0.0, self.extrapolate(&state, 0.0))];
        }
        (0..=steps)
            .map(|i| {
                let t = duration_ms * i as f64 / steps as f64;
                (t, self.extrapolate(&state, t))
            })
            .collect()
    }
}

impl Smoother for DoubleExponentialPredictor {
    fn process(&mut self, sample: Point2D, timestamp_ms: TimestampMs) -> Estimate {
        let Some(prev) = self.state else {
            let state = DespState {
                last_ms: timestamp_ms,
                single: sample,
                double: sample,
                velocity: Point2D::ZERO,
                acceleration: Point2D::ZERO,
            };
            self.state = Some(state);
            return self.estimate(&state);
        };

        let dt = interval_secs(prev.last_ms, timestamp_ms);
        if dt <= 0.0 {
            return self.estimate(&prev);
        }

        let alpha = self.config.alpha;
        let single = blend(&prev.single, &sample, alpha);
        let double = blend(&prev.double, &single, alpha);
        let trend_per_sample = single.sub(&double).scale(alpha / (1.0 - alpha));
        let velocity = trend_per_sample.scale(1.0 / dt);

        let state = DespState {
            last_ms: timestamp_ms,
            single,
            double,
            velocity,
            acceleration: rate(&prev.velocity, &velocity, dt),
        };
        self.state = Some(state);
        self.estimate(&state)
    }

    fn predict(&self, horizon_ms: f64) -> Option<Point2D> {
        self.state.map(|s| self.extrapolate(&s, horizon_ms))
    }

    fn reset(&mut self) {
        self.state = None;
    }

    fn name(&self) -> &'static str {
        "double_exponential"
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn predictor() -> DoubleExponentialPredictor {
        DoubleExponentialPredictor::new(DoubleExponentialConfig::default()).unwrap()
    }

    #[test]
    fn test_alpha_bounds_are_exclusive() {
        for alpha in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            let config = DoubleExponentialConfig {
                alpha,
                ..Default::default()
            };
            assert!(DoubleExponentialPredictor::new(config).is_err(), "alpha {alpha}");
        }
    }

    #[test]
    fn test_prediction_horizon_must_fit_cap() {
        let config = DoubleExponentialConfig {
            prediction_ms: 500.0,
            max_horizon_ms: 100.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_predicts_ahead_of_motion() {
        let mut p = predictor();
        let samples = linear_samples(30, 0.5);
        let last = run(&mut p, &samples).pop().unwrap();

        let ahead = p.predict(50.0).unwrap();
        assert!(ahead.x > last.position.x);
        assert!(last.velocity.x > 0.0);
        assert_eq!(last.predicted, Some(ahead));
    }

    #[test]
    fn test_prediction_displacement_is_capped() {
        let mut p = DoubleExponentialPredictor::new(DoubleExponentialConfig {
            clamp_output: false,
            ..Default::default()
        })
        .unwrap();
        run(&mut p, &linear_samples(30, 5.0));

        let level = p.level().unwrap();
        let far = p.predict(10_000.0).unwrap();
        assert!(far.distance_to(&level) <= 0.05 + 1e-12);
    }

    #[test]
    fn test_prediction_without_motion_stays_put() {
        let mut p = predictor();
        for i in 0..10 {
            p.process(Point2D::new(0.4, 0.4), i * 16);
        }
        let ahead = p.predict(100.0).unwrap();
        assert!(ahead.distance_to(&Point2D::new(0.4, 0.4)) < 1e-9);
    }

    #[test]
    fn test_time_to_target() {
        let mut p = predictor();
        assert_eq!(p.time_to_target(Point2D::CENTER), None);

        run(&mut p, &linear_samples(30, 0.5));
        let here = p.level().unwrap();

        assert_eq!(p.time_to_target(here), Some(0.0));

        let ahead = Point2D::new(here.x + 0.1, here.y);
        let tti = p.time_to_target(ahead).unwrap();
        assert!(tti > 0.0 && tti <= 1_000.0);

        let behind = Point2D::new(here.x - 0.1, here.y);
        assert_eq!(p.time_to_target(behind), None);
    }

    #[test]
    fn test_time_to_target_is_clamped_when_slow() {
        let mut p = predictor();
        run(&mut p, &linear_samples(30, 0.01));
        let here = p.level().unwrap();
        let tti = p.time_to_target(Point2D::new(here.x + 0.9, here.y)).unwrap();
        assert_eq!(tti, 1_000.0);
    }

    #[test]
    fn test_trajectory_starts_at_level() {
        let mut p = predictor();
        assert!(p.trajectory(100.0, 4).is_empty());
        run(&mut p, &linear_samples(20, 0.3));
        let path = p.trajectory(100.0, 4);
        assert_eq!(path.len(), 5);
        assert_eq!(path[0].0, 0.0);
        assert_eq!(path[4].0, 100.0);
        assert!(path[4].1.x >= path[0].1.x);
    }

    #[test]
    fn test_output_is_clamped_to_unit_square() {
        let mut p = predictor();
        for i in 0..20u64 {
            p.process(Point2D::new(0.98 + 0.01 * i as f64, 0.5), i * 16);
        }
        let ahead = p.predict(100.0).unwrap();
        assert!(ahead.x <= 1.0);
    }
}
