//! Canned frame streams.
//!
//! Each scenario is a timeline of segments (a gesture label held for a
//! duration) sampled at a fixed frame interval. At the default 33 ms
//! interval the click scenario is: frames 1-10 palm up with no gesture,
//! frames 11-16 commit label, frame 17 release label, frames 18-30 idle.

use std::fmt;
use std::str::FromStr;

use palmcursor_common::error::{PalmError, PalmResult};
use palmcursor_frame_model::frame::{GestureReading, HandLandmarks, RawFrame, TimestampMs};
use palmcursor_frame_model::geometry::Point2D;

/// Default camera frame interval for scenarios (~30 fps).
pub const DEFAULT_INTERVAL_MS: u64 = 33;

/// Alignment of a palm squarely facing the camera in the scenarios.
pub const FACING: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Arm, hold the commit gesture, release once.
    Click,
    /// Arm, commit, drag right for 20 frames, release.
    Drag,
    /// Palm up, no gesture, jittery fingertip.
    Jitter,
    /// Commit gesture with the palm wobbling inside the hysteresis band.
    SpuriousTouch,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::Click,
        Scenario::Drag,
        Scenario::Jitter,
        Scenario::SpuriousTouch,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Drag => "drag",
            Self::Jitter => "jitter",
            Self::SpuriousTouch => "spurious-touch",
        }
    }

    /// Frames for this scenario sampled every `interval_ms`.
    pub fn frames(&self, interval_ms: u64) -> PalmResult<Vec<RawFrame>> {
        if interval_ms == 0 {
            return Err(PalmError::invalid_input("scenario interval must be positive"));
        }
        let frames = match self {
            Self::Click => sample(
                interval_ms,
                &[
                    Segment::new(330, "None", 0.0),
                    Segment::new(198, "Pointing_Up", 0.9),
                    Segment::new(33, "Open_Palm", 0.9),
                    Segment::new(429, "None", 0.0),
                ],
                |_| FACING,
                |t| Point2D::new(0.4 + 0.00005 * t as f64, 0.6),
            ),
            Self::Drag => sample(
                interval_ms,
                &[
                    Segment::new(330, "None", 0.0),
                    Segment::new(198, "Pointing_Up", 0.9),
                    Segment::new(660, "Closed_Fist", 0.9),
                    Segment::new(33, "Open_Palm", 0.9),
                    Segment::new(264, "None", 0.0),
                ],
                |_| FACING,
                |t| {
                    // Still until the drag starts, then 0.5 units/s to the right.
                    let dragging = t.saturating_sub(528) as f64 / 660.0;
                    Point2D::lerp(&Point2D::new(0.3, 0.5), &Point2D::new(0.63, 0.5), dragging)
                },
            ),
            Self::Jitter => sample(
                interval_ms,
                &[Segment::new(2_000, "None", 0.0)],
                |_| FACING,
                |t| {
                    let phase = t as f64 / 33.0;
                    Point2D::new(
                        0.5 + 0.01 * (phase * 1.7).sin(),
                        0.5 + 0.01 * (phase * 2.3).cos(),
                    )
                },
            ),
            Self::SpuriousTouch => sample(
                interval_ms,
                &[Segment::new(990, "Pointing_Up", 0.9)],
                |i| if i % 2 == 0 { 0.80 } else { 0.90 },
                |_| Point2D::new(0.5, 0.5),
            ),
        };
        Ok(frames)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = PalmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "click" => Ok(Self::Click),
            "drag" => Ok(Self::Drag),
            "jitter" => Ok(Self::Jitter),
            "spurious-touch" | "spurious_touch" => Ok(Self::SpuriousTouch),
            other => Err(PalmError::invalid_input(format!(
                "Unknown scenario '{other}'. Use: click|drag|jitter|spurious-touch"
            ))),
        }
    }
}

struct Segment {
    duration_ms: u64,
    label: &'static str,
    confidence: f64,
}

impl Segment {
    fn new(duration_ms: u64, label: &'static str, confidence: f64) -> Self {
        Self {
            duration_ms,
            label,
            confidence,
        }
    }
}

fn sample(
    interval_ms: u64,
    segments: &[Segment],
    alignment: impl Fn(usize) -> f64,
    tip: impl Fn(TimestampMs) -> Point2D,
) -> Vec<RawFrame> {
    let mut frames = Vec::new();
    let mut t = 0;
    let mut end = 0;
    for segment in segments {
        end += segment.duration_ms;
        while t < end {
            let i = frames.len();
            frames.push(RawFrame::new(
                t,
                HandLandmarks::synthetic(tip(t), alignment(i)),
                GestureReading::new(segment.label, segment.confidence),
            ));
            t += interval_ms;
        }
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_layout_at_default_interval() {
        let frames = Scenario::Click.frames(DEFAULT_INTERVAL_MS).unwrap();
        assert_eq!(frames.len(), 30);
        let label = |n: usize| frames[n - 1].gesture.label.as_str();
        assert_eq!(label(10), "None");
        assert_eq!(label(11), "Pointing_Up");
        assert_eq!(label(16), "Pointing_Up");
        assert_eq!(label(17), "Open_Palm");
        assert_eq!(label(18), "None");
        assert_eq!(frames[10].timestamp_ms, 330);
    }

    #[test]
    fn test_drag_has_twenty_drag_frames() {
        let frames = Scenario::Drag.frames(DEFAULT_INTERVAL_MS).unwrap();
        let drags = frames
            .iter()
            .filter(|f| f.gesture.label == "Closed_Fist")
            .count();
        assert_eq!(drags, 20);
    }

    #[test]
    fn test_timestamps_strictly_increase() {
        for scenario in Scenario::ALL {
            let frames = scenario.frames(16).unwrap();
            assert!(frames.windows(2).all(|w| w[0].timestamp_ms < w[1].timestamp_ms));
        }
    }

    #[test]
    fn test_names_round_trip() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.name().parse::<Scenario>().unwrap(), scenario);
        }
        assert!("tap".parse::<Scenario>().is_err());
        assert!(Scenario::Click.frames(0).is_err());
    }
}
