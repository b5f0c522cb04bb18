//! Small numeric helpers shared by the filters.

use palmcursor_frame_model::geometry::Point2D;

/// Exponential smoothing factor for a first-order low-pass filter with
/// cutoff `cutoff_hz` sampled at interval `dt_secs`.
///
/// `alpha = 1 / (1 + tau / dt)` with `tau = 1 / (2π·fc)`.
pub fn low_pass_alpha(cutoff_hz: f64, dt_secs: f64) -> f64 {
    let tau = 1.0 / (2.0 * std::f64::consts::PI * cutoff_hz);
    1.0 / (1.0 + tau / dt_secs)
}

/// `alpha * current + (1 - alpha) * previous`, per axis.
pub fn blend(previous: &Point2D, current: &Point2D, alpha: f64) -> Point2D {
    Point2D::new(
        alpha * current.x + (1.0 - alpha) * previous.x,
        alpha * current.y + (1.0 - alpha) * previous.y,
    )
}

/// Rate of change between two points over `dt_secs` (zero if `dt_secs` is not positive).
pub fn rate(from: &Point2D, to: &Point2D, dt_secs: f64) -> Point2D {
    if dt_secs > 0.0 {
        to.sub(from).scale(1.0 / dt_secs)
    } else {
        Point2D::ZERO
    }
}

/// Shorten `v` so its length does not exceed `max_len`.
pub fn clamp_length(v: &Point2D, max_len: f64) -> Point2D {
    let len = v.length();
    if len > max_len && len > 0.0 {
        v.scale(max_len / len)
    } else {
        *v
    }
}
