//! Replay a recorded frame stream through the gesture pipeline.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;

use palmcursor_frame_model::action::PointerAction;
use palmcursor_frame_model::frame::RawFrame;
use palmcursor_frame_model::stream::{
    parse_frames, parse_header, serialize_actions, ActionStreamHeader, FrameStreamHeader,
};
use palmcursor_gesture_core::smoothing::SmootherConfig;
use palmcursor_gesture_core::GesturePipeline;

pub fn run(
    frames_path: PathBuf,
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
    smoother: Option<String>,
    skip_rejected: bool,
) -> anyhow::Result<()> {
    let mut config = super::load_pipeline_config(config_path.as_deref())?;
    if let Some(kind) = smoother {
        config.smoother =
            SmootherConfig::from_kind_name(&kind).map_err(|e| anyhow::anyhow!("{e}"))?;
    }

    let content = std::fs::read_to_string(&frames_path)
        .with_context(|| format!("Frame file not found: {}", frames_path.display()))?;

    if let Some(header) = parse_header::<FrameStreamHeader>(&content) {
        match header {
            Ok(h) => tracing::info!(
                schema = %h.schema_version,
                sample_rate_hz = h.sample_rate_hz,
                source = h.source.as_deref().unwrap_or("unknown"),
                "Frame stream header"
            ),
            Err(e) => tracing::warn!("Ignoring unreadable frame stream header: {e}"),
        }
    }

    let frames = parse_frames(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse frames: {e}"))?;

    let mut pipeline =
        GesturePipeline::new(config).map_err(|e| anyhow::anyhow!("Failed to build pipeline: {e}"))?;

    let report = replay_frames(&mut pipeline, &frames);
    if report.rejected > 0 && !skip_rejected {
        anyhow::bail!(
            "{} of {} frame(s) rejected for non-increasing timestamps (use --skip-rejected to continue)",
            report.rejected,
            frames.len()
        );
    }

    let header = report.header(pipeline.smoother_name());
    let jsonl = serialize_actions(Some(&header), &report.actions)?;
    super::write_output(output.as_deref(), &jsonl)?;

    let summary = report
        .counts
        .iter()
        .map(|(kind, n)| format!("{kind}={n}"))
        .collect::<Vec<_>>()
        .join(" ");
    tracing::info!(
        frames = frames.len(),
        actions = report.actions.len(),
        rejected = report.rejected,
        smoother = pipeline.smoother_name(),
        "Replay complete: {summary}"
    );
    if let Some(path) = &output {
        println!("Wrote {} action(s) to {}", report.actions.len(), path.display());
    }

    Ok(())
}

struct ReplayReport {
    actions: Vec<PointerAction>,
    counts: BTreeMap<&'static str, usize>,
    rejected: usize,
}

impl ReplayReport {
    fn header(&self, smoother: &str) -> ActionStreamHeader {
        ActionStreamHeader::new(smoother, self.actions.len(), self.rejected)
    }
}

/// Feed every frame, collecting one action per accepted frame.
fn replay_frames(pipeline: &mut GesturePipeline, frames: &[RawFrame]) -> ReplayReport {
    let mut report = ReplayReport {
        actions: Vec::with_capacity(frames.len()),
        counts: BTreeMap::new(),
        rejected: 0,
    };
    for frame in frames {
        match pipeline.process(frame) {
            Ok(outcome) => {
                *report.counts.entry(outcome.action.kind.as_str()).or_default() += 1;
                report.actions.push(outcome.action);
            }
            Err(e) => {
                report.rejected += 1;
                tracing::debug!("{e}");
            }
        }
    }
    report
}
