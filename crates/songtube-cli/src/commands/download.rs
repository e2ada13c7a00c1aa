use anyhow::Result;
use std::path::Path;
use tracing::warn;

use super::apply_overrides;
use crate::args::{DownloadOptions, SearchOptions};
use songtube_core::{ytdlp::YtDlpClient, Config, Fetcher};

pub async fn run(url: &str, options: &DownloadOptions, config_path: Option<&Path>) -> Result<()> {
    let mut config = Config::load(config_path)?;
    apply_overrides(&mut config, &SearchOptions::default(), options);

    // Downloads can work without a token, searches cannot
    let token = match config.access_token() {
        Ok(token) => Some(token),
        Err(e) => {
            warn!("{}", e);
            None
        }
    };

    let temp_dir = config.temp_dir();
    tokio::fs::create_dir_all(&temp_dir).await?;

    let fetcher = Fetcher::new(YtDlpClient::new(config.yt_dlp_path()?, token), temp_dir);
    let result = fetcher.download(url, config.download.audio_bitrate).await?;

    println!("Output: {}", result.path.display());
    println!("Bitrate: {} kbps", result.bitrate_bps / 1000);
    Ok(())
}
