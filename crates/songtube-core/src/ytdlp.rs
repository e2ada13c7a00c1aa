//! YouTube platform client backed by yt-dlp

use crate::error::PlatformError;
use crate::platform::{AudioStream, PlatformClient, StreamManifest};
use crate::token::AccessToken;
use async_trait::async_trait;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, info};

/// Player client that serves age restricted videos without sign-in.
const AGE_GATE_PLAYER_CLIENT: &str = "tv_embedded";

#[derive(Debug)]
pub struct YtDlpClient {
    yt_dlp_path: PathBuf,
    token: Option<AccessToken>,
}

#[derive(Debug, Deserialize)]
struct VideoInfo {
    id: String,
    #[serde(default)]
    age_limit: Option<u32>,
    #[serde(default)]
    formats: Vec<FormatInfo>,
}

#[derive(Debug, Deserialize)]
struct FormatInfo {
    format_id: String,
    #[serde(default)]
    abr: Option<f64>,
    #[serde(default)]
    vcodec: Option<String>,
    #[serde(default)]
    acodec: Option<String>,
    #[serde(default)]
    ext: String,
}

impl FormatInfo {
    fn is_audio_only(&self) -> bool {
        let has_audio = self
            .acodec
            .as_deref()
            .is_some_and(|a| a != "none" && !a.is_empty());
        let has_video = self.vcodec.as_deref().is_some_and(|v| v != "none");
        has_audio && !has_video
    }

    fn bitrate_kbps(&self) -> Option<u32> {
        nominal_kbps(&self.format_id).or_else(|| self.abr.map(|abr| abr.floor() as u32))
    }
}

impl YtDlpClient {
    pub fn new(yt_dlp_path: PathBuf, token: Option<AccessToken>) -> Self {
        Self { yt_dlp_path, token }
    }

    fn extractor_args(&self, player_client: Option<&str>) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(client) = player_client {
            parts.push(format!("player_client={}", client));
        }
        if let Some(ref token) = self.token {
            parts.push(format!("po_token=web.gvs+{}", token.expose()));
        }

        if parts.is_empty() {
            None
        } else {
            Some(format!("youtube:{}", parts.join(";")))
        }
    }

    fn command(&self, player_client: Option<&str>) -> Command {
        let mut cmd = Command::new(&self.yt_dlp_path);
        cmd.args(["--no-warnings", "--no-playlist"]);
        if let Some(args) = self.extractor_args(player_client) {
            cmd.arg("--extractor-args").arg(args);
        }
        cmd
    }

    async fn run(&self, mut cmd: Command, locator: &str) -> Result<String, PlatformError> {
        let output = cmd.arg(locator).output().await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => PlatformError::YtDlpNotFound,
            _ => PlatformError::Io(e),
        })?;

        check_status(&output, locator)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn manifest(
        &self,
        locator: &str,
        player_client: Option<&str>,
    ) -> Result<StreamManifest, PlatformError> {
        let mut cmd = self.command(player_client);
        cmd.arg("--dump-single-json");

        let stdout = self.run(cmd, locator).await?;
        let manifest = parse_manifest(&stdout)?;
        debug!(
            "Manifest for {}: {} streams, age restricted: {}",
            manifest.video_id,
            manifest.streams.len(),
            manifest.age_restricted
        );
        Ok(manifest)
    }

    async fn download_format(
        &self,
        locator: &str,
        stream: &AudioStream,
        dest_dir: &Path,
        player_client: Option<&str>,
    ) -> Result<PathBuf, PlatformError> {
        let output_template = dest_dir.join("%(id)s.%(format_id)s.%(ext)s");

        let mut cmd = self.command(player_client);
        cmd.args(["-f", stream.format_id.as_str()])
            // --print alone would only simulate
            .args(["--no-simulate", "--print", "after_move:filepath"])
            .arg("-o")
            .arg(&output_template);

        let stdout = self.run(cmd, locator).await?;
        let path = stdout
            .lines()
            .map(str::trim)
            .rfind(|l| !l.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| PlatformError::MetadataParse("yt-dlp printed no file path".to_string()))?;

        debug!("Downloaded to: {}", path.display());
        Ok(path)
    }
}

#[async_trait]
impl PlatformClient for YtDlpClient {
    async fn streams(&self, locator: &str) -> Result<StreamManifest, PlatformError> {
        self.manifest(locator, None).await
    }

    async fn bypass_age_gate(&self, locator: &str) -> Result<StreamManifest, PlatformError> {
        self.manifest(locator, Some(AGE_GATE_PLAYER_CLIENT)).await
    }

    async fn download(
        &self,
        locator: &str,
        stream: &AudioStream,
        dest_dir: &Path,
    ) -> Result<PathBuf, PlatformError> {
        info!("Downloading format {} of {}", stream.format_id, locator);

        // Gated videos need the bypass client for the media request as well
        match self.download_format(locator, stream, dest_dir, None).await {
            Err(PlatformError::AgeRestricted(_)) => {
                self.download_format(locator, stream, dest_dir, Some(AGE_GATE_PLAYER_CLIENT))
                    .await
            }
            result => result,
        }
    }
}

fn check_status(output: &Output, locator: &str) -> Result<(), PlatformError> {
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    debug!("yt-dlp stderr: {}", stderr);
    Err(classify_failure(&stderr, locator, output.status.code()))
}

fn classify_failure(stderr: &str, locator: &str, code: Option<i32>) -> PlatformError {
    if stderr.contains("Video unavailable") || stderr.contains("Private video") {
        return PlatformError::VideoUnavailable(locator.to_string());
    }
    if stderr.contains("confirm your age") || stderr.contains("age-restricted") {
        return PlatformError::AgeRestricted(locator.to_string());
    }
    PlatformError::YtDlpFailed(code)
}

/// Turn `yt-dlp --dump-single-json` output into a manifest.
fn parse_manifest(json: &str) -> Result<StreamManifest, PlatformError> {
    let info: VideoInfo =
        serde_json::from_str(json).map_err(|e| PlatformError::MetadataParse(e.to_string()))?;

    let streams = info
        .formats
        .iter()
        .filter_map(|f| {
            Some(AudioStream {
                format_id: f.format_id.clone(),
                bitrate_kbps: f.bitrate_kbps()?,
                audio_only: f.is_audio_only(),
                ext: f.ext.clone(),
            })
        })
        .collect();

    Ok(StreamManifest {
        video_id: info.id,
        age_restricted: info.age_limit.unwrap_or(0) >= 18,
        streams,
    })
}

/// YouTube labels its audio formats with a nominal bitrate that differs from
/// the measured average yt-dlp reports (e.g. 140 is "128kbps", measured ~129).
fn nominal_kbps(format_id: &str) -> Option<u32> {
    // Variants like "251-drc" or "140-1" share the base itag's bitrate
    let itag = format_id.split('-').next()?;
    let kbps = match itag {
        "139" => 48,
        "140" => 128,
        "141" => 256,
        "171" => 128,
        "172" => 256,
        "249" => 50,
        "250" => 70,
        "251" => 160,
        "256" => 192,
        "258" => 384,
        "599" => 30,
        "600" => 35,
        _ => return None,
    };
    Some(kbps)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "id": "dQw4w9WgXcQ",
        "title": "Some Song",
        "age_limit": 0,
        "formats": [
            {"format_id": "sb0", "vcodec": "none", "acodec": "none", "ext": "mhtml"},
            {"format_id": "249", "vcodec": "none", "acodec": "opus", "abr": 51.2, "ext": "webm"},
            {"format_id": "140", "vcodec": "none", "acodec": "mp4a.40.2", "abr": 129.5, "ext": "m4a"},
            {"format_id": "251-drc", "vcodec": "none", "acodec": "opus", "abr": 131.0, "ext": "webm"},
            {"format_id": "9000", "vcodec": "none", "acodec": "opus", "abr": 96.7, "ext": "webm"},
            {"format_id": "18", "vcodec": "avc1.42001E", "acodec": "mp4a.40.2", "abr": 96.0, "ext": "mp4"}
        ]
    }"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = parse_manifest(MANIFEST).unwrap();
        assert_eq!(manifest.video_id, "dQw4w9WgXcQ");
        assert!(!manifest.age_restricted);

        let audio: Vec<(&str, u32)> = manifest
            .audio_streams()
            .iter()
            .map(|s| (s.format_id.as_str(), s.bitrate_kbps))
            .collect();
        assert_eq!(
            audio,
            [("251-drc", 160), ("140", 128), ("9000", 96), ("249", 50)]
        );

        let muxed = manifest.streams.iter().find(|s| s.format_id == "18").unwrap();
        assert!(!muxed.audio_only);
    }

    #[test]
    fn test_parse_manifest_age_limit() {
        let manifest = parse_manifest(r#"{"id": "x", "age_limit": 18}"#).unwrap();
        assert!(manifest.age_restricted);
        assert!(manifest.streams.is_empty());
    }

    #[test]
    fn test_parse_manifest_invalid() {
        let err = parse_manifest("not json").unwrap_err();
        assert!(matches!(err, PlatformError::MetadataParse(_)));
    }

    #[test]
    fn test_classify_failure() {
        assert!(matches!(
            classify_failure("ERROR: [youtube] x: Video unavailable", "u", Some(1)),
            PlatformError::VideoUnavailable(_)
        ));
        assert!(matches!(
            classify_failure("ERROR: Sign in to confirm your age", "u", Some(1)),
            PlatformError::AgeRestricted(_)
        ));
        assert!(matches!(
            classify_failure("ERROR: something else", "u", Some(2)),
            PlatformError::YtDlpFailed(Some(2))
        ));
    }

    #[test]
    fn test_extractor_args() {
        let client = YtDlpClient::new(PathBuf::from("yt-dlp"), None);
        assert_eq!(client.extractor_args(None), None);
        assert_eq!(
            client.extractor_args(Some("tv_embedded")).as_deref(),
            Some("youtube:player_client=tv_embedded")
        );

        let token = AccessToken::new("abc", "test").unwrap();
        let client = YtDlpClient::new(PathBuf::from("yt-dlp"), Some(token));
        assert_eq!(
            client.extractor_args(Some("tv_embedded")).as_deref(),
            Some("youtube:player_client=tv_embedded;po_token=web.gvs+abc")
        );
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let client = YtDlpClient::new(PathBuf::from("/nonexistent/yt-dlp"), None);
        let err = client.streams("https://www.youtube.com/watch?v=x").await.unwrap_err();
        assert!(matches!(err, PlatformError::YtDlpNotFound));
    }

    /// Shell stand-in for yt-dlp that refuses everything unless the age gate
    /// player client is requested.
    #[cfg(unix)]
    fn gated_yt_dlp(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = [
            "#!/bin/sh",
            "case \"$*\" in",
            "  *player_client=tv_embedded*) ;;",
            "  *) echo 'ERROR: [youtube] dQw4w9WgXcQ: Sign in to confirm your age' >&2; exit 1 ;;",
            "esac",
            "case \"$*\" in",
            "  *--dump-single-json*) cat <<'JSON'",
            MANIFEST,
            "JSON",
            "  ;;",
            "  *) echo /songs/dQw4w9WgXcQ.140.m4a ;;",
            "esac",
            "",
        ]
        .join("\n");

        let path = dir.join("yt-dlp");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_age_gate_bypass_with_gated_binary() {
        let temp = tempfile::tempdir().unwrap();
        let client = YtDlpClient::new(gated_yt_dlp(temp.path()), None);
        let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

        let err = client.streams(url).await.unwrap_err();
        assert!(matches!(err, PlatformError::AgeRestricted(ref l) if l == url));

        let manifest = client.bypass_age_gate(url).await.unwrap();
        assert_eq!(manifest.video_id, "dQw4w9WgXcQ");
        assert_eq!(manifest.audio_streams().len(), 4);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetcher_downloads_gated_video() {
        let temp = tempfile::tempdir().unwrap();
        let client = YtDlpClient::new(gated_yt_dlp(temp.path()), None);
        let fetcher = crate::fetcher::Fetcher::new(client, temp.path().join("songs"));

        let result = fetcher
            .download("https://www.youtube.com/watch?v=dQw4w9WgXcQ", 128_000)
            .await
            .unwrap();

        assert_eq!(result.bitrate_bps, 128_000);
        assert_eq!(result.path, PathBuf::from("/songs/dQw4w9WgXcQ.140.m4a"));
    }
}
