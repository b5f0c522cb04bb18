//! JSONL frame and action streams.
//!
//! One JSON object per line. An optional first line `# {json}` carries a
//! header; other `#` lines and blank lines are ignored.

use serde::{Deserialize, Serialize};

use crate::action::PointerAction;
use crate::frame::RawFrame;

/// Schema version written into stream headers.
pub const STREAM_SCHEMA_VERSION: &str = "1.0";

/// Header of a recorded or synthesized frame stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameStreamHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,

    /// Nominal sampling rate of the tracking runtime (Hz).
    pub sample_rate_hz: u32,

    /// Producer name (recorder, synthetic scenario, ...).
    #[serde(default)]
    pub source: Option<String>,
}

/// Header of an emitted action stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionStreamHeader {
    pub schema_version: String,

    /// Wall-clock time the stream was produced (ISO 8601).
    pub generated_at: String,

    /// Smoother used to produce the stream.
    pub smoother: String,

    /// Number of frames accepted by the pipeline.
    pub frames: usize,

    /// Number of frames rejected at the input boundary.
    #[serde(default)]
    pub rejected: usize,
}

impl ActionStreamHeader {
    pub fn new(smoother: impl Into<String>, frames: usize, rejected: usize) -> Self {
        Self {
            schema_version: STREAM_SCHEMA_VERSION.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            smoother: smoother.into(),
            frames,
            rejected,
        }
    }
}

fn data_lines(jsonl: &str) -> impl Iterator<Item = &str> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Parse raw frames from JSONL content.
pub fn parse_frames(jsonl: &str) -> Result<Vec<RawFrame>, serde_json::Error> {
    data_lines(jsonl).map(serde_json::from_str).collect()
}

/// Parse the `# {json}` header at the top of a stream, if present.
pub fn parse_header<T: for<'de> Deserialize<'de>>(
    jsonl: &str,
) -> Option<Result<T, serde_json::Error>> {
    let first = jsonl.lines().map(str::trim).find(|l| !l.is_empty())?;
    let body = first.strip_prefix('#')?.trim();
    if !body.starts_with('{') {
        return None;
    }
    Some(serde_json::from_str(body))
}

fn header_line<T: Serialize>(header: &T) -> Result<String, serde_json::Error> {
    Ok(format!("# {}\n", serde_json::to_string(header)?))
}

/// Serialize frames to JSONL, with an optional header line.
pub fn serialize_frames(
    header: Option<&FrameStreamHeader>,
    frames: &[RawFrame],
) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    if let Some(header) = header {
        output.push_str(&header_line(header)?);
    }
    for frame in frames {
        output.push_str(&serde_json::to_string(frame)?);
        output.push('\n');
    }
    Ok(output)
}

/// Serialize pointer actions to JSONL, with an optional header line.
pub fn serialize_actions(
    header: Option<&ActionStreamHeader>,
    actions: &[PointerAction],
) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    if let Some(header) = header {
        output.push_str(&header_line(header)?);
    }
    for action in actions {
        output.push_str(&serde_json::to_string(action)?);
        output.push('\n');
    }
    Ok(output)
}
