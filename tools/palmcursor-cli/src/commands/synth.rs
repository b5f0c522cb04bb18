//! Write a canned scenario as a frame stream.

use std::path::PathBuf;

use palmcursor_frame_model::stream::{serialize_frames, FrameStreamHeader, STREAM_SCHEMA_VERSION};
use palmcursor_gesture_core::Scenario;

pub fn run(scenario: Scenario, output: Option<PathBuf>, interval_ms: u64) -> anyhow::Result<()> {
    let frames = scenario
        .frames(interval_ms)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let header = FrameStreamHeader {
        schema_version: STREAM_SCHEMA_VERSION.to_string(),
        sample_rate_hz: (1_000 / interval_ms).max(1) as u32,
        source: Some(format!("synth:{scenario}")),
    };
    let jsonl = serialize_frames(Some(&header), &frames)?;
    super::write_output(output.as_deref(), &jsonl)?;

    tracing::info!(scenario = %scenario, frames = frames.len(), interval_ms, "Scenario generated");
    if let Some(path) = &output {
        println!("Wrote {} frame(s) to {}", frames.len(), path.display());
    }
    Ok(())
}
