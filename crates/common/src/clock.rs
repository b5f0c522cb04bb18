//! Timestamp utilities for frame streams.
//!
//! Frame timestamps are monotonic milliseconds supplied by the tracking
//! runtime. A session must see them strictly increasing; this module
//! provides the guard that enforces that at the input boundary, plus
//! small unit conversions used by the filters.

/// Monotonic timestamp in milliseconds since an arbitrary session epoch.
pub type TimestampMs = u64;

/// Why a timestamp was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderViolation {
    /// Same timestamp as the last accepted frame.
    Duplicate,
    /// Earlier than the last accepted frame.
    OutOfOrder,
}

impl std::fmt::Display for OrderViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duplicate => f.write_str("duplicate timestamp"),
            Self::OutOfOrder => f.write_str("out-of-order timestamp"),
        }
    }
}

/// Enforces strictly increasing timestamps for one session.
///
/// `check` never mutates; `commit` records an accepted timestamp. Callers
/// check first, run their stages, then commit, so a rejected frame leaves
/// every downstream component untouched.
#[derive(Debug, Clone, Default)]
pub struct TimestampGuard {
    last_ms: Option<TimestampMs>,
}

impl TimestampGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `timestamp_ms` against the last accepted value.
    pub fn check(&self, timestamp_ms: TimestampMs) -> Result<(), OrderViolation> {
        match self.last_ms {
            Some(last) if timestamp_ms == last => Err(OrderViolation::Duplicate),
            Some(last) if timestamp_ms < last => Err(OrderViolation::OutOfOrder),
            _ => Ok(()),
        }
    }

    /// Record an accepted timestamp.
    pub fn commit(&mut self, timestamp_ms: TimestampMs) {
        self.last_ms = Some(timestamp_ms);
    }

    /// Last accepted timestamp, if any.
    pub fn last(&self) -> Option<TimestampMs> {
        self.last_ms
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Convert a millisecond interval to seconds.
pub fn ms_to_secs(ms: f64) -> f64 {
    ms / 1_000.0
}

/// Convert seconds to milliseconds.
pub fn secs_to_ms(secs: f64) -> f64 {
    secs * 1_000.0
}

/// Interval between two timestamps in seconds (0 if `to` is not after `from`).
pub fn interval_secs(from: TimestampMs, to: TimestampMs) -> f64 {
    ms_to_secs(to.saturating_sub(from) as f64)
}
