//! Identity smoother.

use palmcursor_common::clock::interval_secs;
use palmcursor_frame_model::frame::TimestampMs;
use palmcursor_frame_model::geometry::Point2D;

use super::{Estimate, Smoother};
use crate::math::rate;

/// Reports raw samples unchanged, with a finite-difference velocity.
#[derive(Debug, Clone, Default)]
pub struct PassthroughSmoother {
    last: Option<(TimestampMs, Estimate)>,
}

impl PassthroughSmoother {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Smoother for PassthroughSmoother {
    fn process(&mut self, sample: Point2D, timestamp_ms: TimestampMs) -> Estimate {
        let estimate = match self.last {
            None => Estimate::at_rest(sample),
            Some((last_ms, prev)) => {
                let dt = interval_secs(last_ms, timestamp_ms);
                if dt <= 0.0 {
                    return prev;
                }
                Estimate {
                    position: sample,
                    velocity: rate(&prev.position, &sample, dt),
                    acceleration: None,
                    predicted: None,
                }
            }
        };
        self.last = Some((timestamp_ms, estimate));
        estimate
    }

    fn reset(&mut self) {
        self.last = None;
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }
}
