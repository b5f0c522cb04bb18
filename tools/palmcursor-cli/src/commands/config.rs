//! Show the effective pipeline configuration.

use std::path::PathBuf;

pub fn run(config_path: Option<PathBuf>, write: Option<PathBuf>) -> anyhow::Result<()> {
    let config = super::load_pipeline_config(config_path.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&config)?);

    if let Some(path) = write {
        palmcursor_common::config::save_json(&config, &path)
            .map_err(|e| anyhow::anyhow!("Failed to write configuration: {e}"))?;
        tracing::info!(path = %path.display(), "Configuration written");
    }
    Ok(())
}
