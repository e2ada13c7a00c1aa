use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

use super::{apply_overrides, truncate};
use crate::args::{DownloadOptions, SearchOptions};
use songtube_core::{
    config::Config,
    pipeline::{Pipeline, PipelineStage},
};

pub async fn run(
    query: &str,
    search: &SearchOptions,
    download: &DownloadOptions,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = Config::load(config_path)?;
    apply_overrides(&mut config, search, download);

    let pipeline = Pipeline::from_config(&config)?;

    // Create progress channel
    let (tx, mut rx) = mpsc::channel(32);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.cyan} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    // Spawn progress handler
    let progress_handle = tokio::spawn(async move {
        while let Some(stage) = rx.recv().await {
            match stage {
                PipelineStage::Searching { query } => {
                    pb.set_message(format!("Searching: {}", truncate(&query, 50)));
                }
                PipelineStage::Resolved { locator } => {
                    pb.set_message(format!("Found: {}", locator));
                }
                PipelineStage::Downloading { locator } => {
                    pb.set_message(format!("Downloading: {}", locator));
                }
                PipelineStage::Complete {
                    path,
                    bitrate_bps,
                    duration,
                } => {
                    pb.finish_with_message(format!(
                        "Done: {} ({} kbps, {:.1}s)",
                        path.display(),
                        bitrate_bps / 1000,
                        duration.as_secs_f32()
                    ));
                }
                PipelineStage::Failed { stage, error } => {
                    pb.abandon_with_message(format!("Failed at {}: {}", stage, error));
                }
            }
        }
    });

    let result = pipeline.run(query, &tx).await;

    // Close the channel so the progress handler finishes
    drop(tx);
    progress_handle.await?;

    match result {
        Ok(song) => {
            println!("\nURL: {}", song.locator);
            println!("Output: {}", song.download.path.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("\nError: {}", e);
            Err(e.into())
        }
    }
}
