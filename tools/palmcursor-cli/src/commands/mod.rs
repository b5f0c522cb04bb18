pub mod config;
pub mod replay;
pub mod synth;

use std::io::Write;
use std::path::Path;

use anyhow::Context;

use palmcursor_gesture_core::PipelineConfig;

/// Load the pipeline configuration from `path`, the standard location, or defaults.
pub fn load_pipeline_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    let config: PipelineConfig = palmcursor_common::config::load_or_default(path)
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
    Ok(config)
}

/// Write `content` to `output`, or to stdout when no path is given.
pub fn write_output(output: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
            stdout.flush().context("Failed to flush stdout")
        }
    }
}
