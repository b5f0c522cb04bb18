//! One Euro filter: speed-adaptive low-pass smoothing.
//!
//! Casiez, Roussel & Vogel, "1€ Filter: A Simple Speed-based Low-pass
//! Filter for Noisy Input in Interactive Systems" (CHI 2012).
//!
//! The filter keeps exponential moving averages of the position and of its
//! derivative. The position cutoff rises with the filtered speed:
//! `cutoff = min_cutoff + beta * |velocity|`, so an idle hand is smoothed
//! hard while deliberate motion keeps little lag.

use serde::{Deserialize, Serialize};

use palmcursor_common::clock::interval_secs;
use palmcursor_common::error::{ensure_positive, PalmResult};
use palmcursor_frame_model::frame::TimestampMs;
use palmcursor_frame_model::geometry::Point2D;

use super::{Estimate, Smoother};
use crate::math::{blend, low_pass_alpha, rate};

/// One Euro tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OneEuroConfig {
    /// Cutoff at rest in Hz. Lower = smoother when still. Range (0, 10].
    pub min_cutoff_hz: f64,

    /// Speed coefficient (Hz per normalized unit/s). Higher = less lag
    /// during fast motion.
    pub beta: f64,

    /// Cutoff for the derivative estimate in Hz.
    pub d_cutoff_hz: f64,
}

impl Default for OneEuroConfig {
    fn default() -> Self {
        Self {
            min_cutoff_hz: 1.0,
            beta: 0.007,
            d_cutoff_hz: 1.0,
        }
    }
}

impl OneEuroConfig {
    pub fn validate(&self) -> PalmResult<()> {
        ensure_positive("one_euro.min_cutoff_hz", self.min_cutoff_hz)?;
        ensure_positive("one_euro.beta", self.beta)?;
        ensure_positive("one_euro.d_cutoff_hz", self.d_cutoff_hz)
    }
}

#[derive(Debug, Clone, Copy)]
struct FilterState {
    last_ms: TimestampMs,
    position: Point2D,
    velocity: Point2D,
    acceleration: Point2D,
}

/// Two-axis One Euro filter.
#[derive(Debug, Clone)]
pub struct OneEuroSmoother {
    config: OneEuroConfig,
    state: Option<FilterState>,
}

impl OneEuroSmoother {
    /// Create a filter, failing fast on non-positive parameters.
    pub fn new(config: OneEuroConfig) -> PalmResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: None,
        })
    }

    pub fn config(&self) -> &OneEuroConfig {
        &self.config
    }

    fn estimate(state: &FilterState) -> Estimate {
        Estimate {
            position: state.position,
            velocity: state.velocity,
            acceleration: Some(state.acceleration),
            predicted: None,
        }
    }
}

impl Smoother for OneEuroSmoother {
    fn process(&mut self, sample: Point2D, timestamp_ms: TimestampMs) -> Estimate {
        let Some(prev) = self.state else {
            let state = FilterState {
                last_ms: timestamp_ms,
                position: sample,
                velocity: Point2D::ZERO,
                acceleration: Point2D::ZERO,
            };
            self.state = Some(state);
            return Self::estimate(&state);
        };

        let dt = interval_secs(prev.last_ms, timestamp_ms);
        if dt <= 0.0 {
            return Self::estimate(&prev);
        }

        // 1. Filtered derivative.
        let raw_velocity = rate(&prev.position, &sample, dt);
        let d_alpha = low_pass_alpha(self.config.d_cutoff_hz, dt);
        let velocity = blend(&prev.velocity, &raw_velocity, d_alpha);

        // 2. Speed-adaptive cutoff.
        let cutoff = self.config.min_cutoff_hz + self.config.beta * velocity.length();

        // 3. Filtered position.
        let alpha = low_pass_alpha(cutoff, dt);
        let position = blend(&prev.position, &sample, alpha);

        let state = FilterState {
            last_ms: timestamp_ms,
            position,
            velocity,
            acceleration: rate(&prev.velocity, &velocity, dt),
        };
        self.state = Some(state);
        Self::estimate(&state)
    }

    fn reset(&mut self) {
        self.state = None;
    }

    fn name(&self) -> &'static str {
        "one_euro"
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn filter() -> OneEuroSmoother {
        OneEuroSmoother::new(OneEuroConfig::default()).unwrap()
    }

    #[test]
    fn test_first_sample_passes_through() {
        let mut f = filter();
        let est = f.process(Point2D::new(0.3, 0.7), 0);
        assert_eq!(est.position, Point2D::new(0.3, 0.7));
        assert_eq!(est.velocity, Point2D::ZERO);
    }

    #[test]
    fn test_reduces_jitter() {
        let samples = jittery_samples();
        let mut f = filter();
        let out = run(&mut f, &samples);

        assert_eq!(out.len(), samples.len());
        for est in &out[2..] {
            assert!((est.position.x - 0.5).abs() < 0.02, "x={} too far", est.position.x);
            assert!((est.position.y - 0.5).abs() < 0.02, "y={} too far", est.position.y);
        }
    }

    #[test]
    fn test_fast_motion_lags_less_with_higher_beta() {
        let samples = linear_samples(30, 1.0);
        let target = samples.last().unwrap().1;

        let mut sluggish = OneEuroSmoother::new(OneEuroConfig {
            beta: 0.001,
            ..OneEuroConfig::default()
        })
        .unwrap();
        let mut responsive = OneEuroSmoother::new(OneEuroConfig {
            beta: 5.0,
            ..OneEuroConfig::default()
        })
        .unwrap();

        let slow_end = run(&mut sluggish, &samples).last().unwrap().position;
        let fast_end = run(&mut responsive, &samples).last().unwrap().position;
        assert!(fast_end.distance_to(&target) < slow_end.distance_to(&target));
    }

    #[test]
    fn test_velocity_tracks_direction() {
        let samples = linear_samples(40, 0.5);
        let mut f = filter();
        let last = run(&mut f, &samples).pop().unwrap();
        assert!(last.velocity.x > 0.0);
        assert!(last.velocity.y.abs() < 1e-9);
        assert!(last.acceleration.is_some());
    }

    #[test]
    fn test_repeated_timestamp_holds_estimate() {
        let mut f = filter();
        f.process(Point2D::new(0.5, 0.5), 0);
        let a = f.process(Point2D::new(0.6, 0.5), 16);
        let b = f.process(Point2D::new(0.9, 0.9), 16);
        assert_eq!(a, b);
        assert!(b.position.is_finite());
    }

    #[test]
    fn test_invalid_parameters_fail_fast() {
        for config in [
            OneEuroConfig {
                min_cutoff_hz: 0.0,
                ..OneEuroConfig::default()
            },
            OneEuroConfig {
                beta: -0.1,
                ..OneEuroConfig::default()
            },
            OneEuroConfig {
                d_cutoff_hz: f64::NAN,
                ..OneEuroConfig::default()
            },
        ] {
            let err = OneEuroSmoother::new(config).unwrap_err();
            assert!(err.is_config());
        }
    }

    #[test]
    fn test_reset_restores_pass_through() {
        let mut f = filter();
        run(&mut f, &jittery_samples());
        f.reset();
        let est = f.process(Point2D::new(0.1, 0.1), 1_000);
        assert_eq!(est.position, Point2D::new(0.1, 0.1));
    }
}
