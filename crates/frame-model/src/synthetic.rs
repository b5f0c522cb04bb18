//! Synthetic hand poses for tests, demos, and scenario streams.

use crate::frame::{HandLandmarks, INDEX_TIP, LANDMARK_COUNT};
use crate::geometry::{Point2D, Vec3};

/// Flat right hand, palm facing the camera, relative to the wrist.
/// Image coordinates: +x right, +y down, depth 0.
const CANONICAL_HAND: [(f64, f64); LANDMARK_COUNT] = [
    (0.0, 0.0),       // wrist
    (0.06, -0.03),    // thumb cmc
    (0.09, -0.06),    // thumb mcp
    (0.11, -0.09),    // thumb ip
    (0.12, -0.12),    // thumb tip
    (0.05, -0.10),    // index mcp
    (0.055, -0.15),   // index pip
    (0.058, -0.18),   // index dip
    (0.06, -0.21),    // index tip
    (0.015, -0.125),  // middle mcp
    (0.015, -0.18),   // middle pip
    (0.015, -0.21),   // middle dip
    (0.015, -0.24),   // middle tip
    (-0.015, -0.125), // ring mcp
    (-0.018, -0.17),  // ring pip
    (-0.02, -0.20),   // ring dip
    (-0.022, -0.225), // ring tip
    (-0.04, -0.12),   // pinky mcp
    (-0.045, -0.15),  // pinky pip
    (-0.048, -0.175), // pinky dip
    (-0.05, -0.195),  // pinky tip
];

impl HandLandmarks {
    /// A plausible hand with its index fingertip at `tip` whose palm normal
    /// has cosine `alignment` against the camera axis `(0, 0, -1)`.
    ///
    /// The palm is tilted about the horizontal axis; `alignment` is clamped
    /// into `[-1, 1]`.
    pub fn synthetic(tip: Point2D, alignment: f64) -> Self {
        let angle = alignment.clamp(-1.0, 1.0).acos();
        let rotated: Vec<Vec3> = CANONICAL_HAND
            .iter()
            .map(|&(x, y)| Vec3::new(x, y, 0.0).rotate_x(angle))
            .collect();

        let anchor = Vec3::new(tip.x, tip.y, 0.0).sub(&rotated[INDEX_TIP]);
        let mut points = [Vec3::ZERO; LANDMARK_COUNT];
        for (slot, offset) in points.iter_mut().zip(&rotated) {
            *slot = offset.add(&anchor);
        }
        points[INDEX_TIP] = Vec3::new(tip.x, tip.y, 0.0);
        Self(points)
    }

    /// Every landmark at the same location (degenerate palm).
    pub fn collapsed(at: Point2D) -> Self {
        Self([Vec3::new(at.x, at.y, 0.0); LANDMARK_COUNT])
    }
}
