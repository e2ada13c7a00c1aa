//! Pipeline orchestration: resolve a query, then fetch its audio

use crate::config::Config;
use crate::error::{Result, SongtubeError};
use crate::fetcher::{DownloadResult, Fetcher};
use crate::platform::PlatformClient;
use crate::resolver::{AcceptanceThresholds, Resolver};
use crate::search::SearchBackend;
use crate::web_search::WebSearch;
use crate::ytdlp::YtDlpClient;

use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::info;

/// Per-run settings
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub thresholds: AcceptanceThresholds,
    pub search_count: usize,
    pub audio_bitrate: u64,
    pub temp_dir: PathBuf,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            thresholds: config.thresholds(),
            search_count: config.search.search_count,
            audio_bitrate: config.download.audio_bitrate,
            temp_dir: config.temp_dir(),
        }
    }
}

/// Pipeline progress stages
#[derive(Debug, Clone)]
pub enum PipelineStage {
    Searching { query: String },
    Resolved { locator: String },
    Downloading { locator: String },
    Complete {
        path: PathBuf,
        bitrate_bps: u64,
        duration: Duration,
    },
    Failed { stage: String, error: String },
}

#[derive(Debug, Clone)]
pub struct SongDownload {
    pub query: String,
    pub locator: String,
    pub download: DownloadResult,
}

pub struct Pipeline<B, P> {
    resolver: Resolver<B>,
    fetcher: Fetcher<P>,
    config: PipelineConfig,
}

impl Pipeline<WebSearch, YtDlpClient> {
    /// Wire the YouTube search page and yt-dlp together from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let search = WebSearch::new(&config.search.base_url)
            .map_err(crate::error::ResolveError::from)?;
        let resolver = Resolver::from_config(config, search)?;

        let client = YtDlpClient::new(
            config.yt_dlp_path()?,
            Some(resolver.access_token().clone()),
        );
        let fetcher = Fetcher::new(client, config.temp_dir());

        Ok(Self::new(resolver, fetcher, PipelineConfig::from_config(config)))
    }
}

impl<B: SearchBackend, P: PlatformClient> Pipeline<B, P> {
    pub fn new(resolver: Resolver<B>, fetcher: Fetcher<P>, config: PipelineConfig) -> Self {
        Self {
            resolver,
            fetcher,
            config,
        }
    }

    pub async fn run(
        &self,
        query: &str,
        progress_tx: &mpsc::Sender<PipelineStage>,
    ) -> Result<SongDownload> {
        let start_time = Instant::now();
        info!("Starting pipeline for: {}", query);

        // 1. Resolve
        let _ = progress_tx
            .send(PipelineStage::Searching {
                query: query.to_string(),
            })
            .await;

        let locator = self
            .resolver
            .search(query, self.config.thresholds, self.config.search_count)
            .await
            .map_err(|e| fail(progress_tx, "search", e))?;

        let _ = progress_tx
            .send(PipelineStage::Resolved {
                locator: locator.clone(),
            })
            .await;

        // 2. Fetch
        let _ = progress_tx
            .send(PipelineStage::Downloading {
                locator: locator.clone(),
            })
            .await;

        tokio::fs::create_dir_all(&self.config.temp_dir)
            .await
            .map_err(|e| fail(progress_tx, "download", e))?;

        let download = self
            .fetcher
            .download(&locator, self.config.audio_bitrate)
            .await
            .map_err(|e| fail(progress_tx, "download", e))?;

        let _ = progress_tx
            .send(PipelineStage::Complete {
                path: download.path.clone(),
                bitrate_bps: download.bitrate_bps,
                duration: start_time.elapsed(),
            })
            .await;

        info!(
            "Downloaded {} at {} bps to {}",
            locator,
            download.bitrate_bps,
            download.path.display()
        );

        Ok(SongDownload {
            query: query.to_string(),
            locator,
            download,
        })
    }
}

fn fail(
    progress_tx: &mpsc::Sender<PipelineStage>,
    stage: &str,
    error: impl Into<SongtubeError>,
) -> SongtubeError {
    let error = error.into();
    let _ = progress_tx.try_send(PipelineStage::Failed {
        stage: stage.to_string(),
        error: error.to_string(),
    });
    error
}
