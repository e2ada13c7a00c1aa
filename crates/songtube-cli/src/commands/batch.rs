use anyhow::{bail, Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{mpsc, Semaphore};

use super::{apply_overrides, truncate};
use crate::args::{DownloadOptions, SearchOptions};
use songtube_core::{config::Config, pipeline::Pipeline, SongtubeError};

enum Outcome {
    Done,
    Skipped(String),
    Failed(String),
    Cancelled,
}

pub async fn run(
    input: &Path,
    parallel: Option<usize>,
    search: &SearchOptions,
    download: &DownloadOptions,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = Config::load(config_path)?;
    apply_overrides(&mut config, search, download);

    // Read queries from file
    let content = fs::read_to_string(input)
        .await
        .context("Failed to read input file")?;

    let queries = parse_queries(&content);
    if queries.is_empty() {
        println!("No queries found in input file");
        return Ok(());
    }

    let parallel = parallel.unwrap_or(config.batch.max_parallel).max(1);
    let continue_on_error = config.batch.continue_on_error;
    let total = queries.len();
    println!("Processing {} queries with {} parallel workers\n", total, parallel);

    let pipeline = Pipeline::from_config(&config)?;
    let pipeline = &pipeline;

    let semaphore = Arc::new(Semaphore::new(parallel));
    let abort = Arc::new(AtomicBool::new(false));
    let multi = MultiProgress::new();
    let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {msg}")?.tick_chars("=>-");

    let results: Vec<(String, Outcome)> = stream::iter(queries.into_iter().enumerate())
        .map(|(idx, query)| {
            let sem = semaphore.clone();
            let abort = abort.clone();
            let pb = multi.add(ProgressBar::new_spinner());
            pb.set_style(spinner_style.clone());

            async move {
                let Ok(_permit) = sem.acquire().await else {
                    return (query, Outcome::Cancelled);
                };
                let label = format!("[{}/{}] {}", idx + 1, total, truncate(&query, 50));

                if abort.load(Ordering::SeqCst) {
                    pb.finish_with_message(format!("{} - cancelled", label));
                    return (query, Outcome::Cancelled);
                }

                pb.set_message(label.clone());
                pb.enable_steady_tick(std::time::Duration::from_millis(100));

                // Batch mode doesn't show per-stage progress
                let (tx, mut rx) = mpsc::channel(8);
                let drain = tokio::spawn(async move { while rx.recv().await.is_some() {} });
                let result = pipeline.run(&query, &tx).await;
                drop(tx);
                let _ = drain.await;

                let outcome = classify(result.map(|song| song.download.path.display().to_string()));
                match &outcome {
                    Outcome::Done => pb.finish_with_message(format!("{} - done", label)),
                    Outcome::Skipped(reason) => {
                        pb.finish_with_message(format!("{} - skipped: {}", label, reason))
                    }
                    Outcome::Failed(error) => {
                        if !continue_on_error {
                            abort.store(true, Ordering::SeqCst);
                        }
                        pb.finish_with_message(format!("{} - failed: {}", label, error))
                    }
                    Outcome::Cancelled => {}
                }

                (query, outcome)
            }
        })
        .buffer_unordered(parallel)
        .collect()
        .await;

    // Summary
    let count = |f: fn(&Outcome) -> bool| results.iter().filter(|(_, o)| f(o)).count();
    let failed = count(|o| matches!(o, Outcome::Failed(_)));

    println!("\n=== Batch Complete ===");
    println!("Succeeded: {}", count(|o| matches!(o, Outcome::Done)));
    println!("Skipped: {}", count(|o| matches!(o, Outcome::Skipped(_))));
    println!("Failed: {}", failed);
    let cancelled = count(|o| matches!(o, Outcome::Cancelled));
    if cancelled > 0 {
        println!("Cancelled: {}", cancelled);
    }

    let problems: Vec<_> = results
        .iter()
        .filter_map(|(query, outcome)| match outcome {
            Outcome::Skipped(reason) | Outcome::Failed(reason) => Some((query, reason)),
            _ => None,
        })
        .collect();

    if !problems.is_empty() {
        println!("\nNot downloaded:");
        for (query, reason) in problems {
            println!("  {} - {}", query, reason);
        }
    }

    if failed > 0 && !continue_on_error {
        bail!("{} queries failed", failed);
    }

    Ok(())
}

fn parse_queries(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect()
}

fn classify(result: Result<String, SongtubeError>) -> Outcome {
    match result {
        Ok(_) => Outcome::Done,
        Err(e) if e.is_skippable() => Outcome::Skipped(e.to_string()),
        Err(e) => Outcome::Failed(e.to_string()),
    }
}
