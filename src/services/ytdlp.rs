use async_process::Command;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::services::models::{RawCollection, RawItem};

/// Format selector: best video-only and best audio-only, both HLS.
const HLS_FORMAT_SELECTOR: &str = "bv[protocol*=m3u8]+ba[protocol*=m3u8]";

/// A slice of a remote collection, `size` items starting at zero-based `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: usize,
    pub size: usize,
}

impl Window {
    /// yt-dlp `--playlist-items` ranges are 1-based and inclusive.
    pub fn playlist_items(&self) -> String {
        format!("{}:{}", self.offset + 1, self.offset + self.size)
    }
}

/// The metadata source behind synchronization and resolution.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Enumerate a playlist or channel, optionally only one window of it.
    async fn collection(&self, url: &str, window: Option<Window>) -> Result<RawCollection>;

    /// Full metadata for one video, with the HLS substreams selected.
    async fn item(&self, id: &str) -> Result<RawItem>;
}

pub struct YtDlp {
    bin: String,
}

impl YtDlp {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    async fn run(&self, args: &[String]) -> Result<Vec<u8>> {
        debug!("{} {}", self.bin, args.join(" "));

        let output = Command::new(&self.bin)
            .args(args)
            .output()
            .await
            .map_err(|e| Error::extraction(format!("failed to spawn {}: {}", self.bin, e)))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(Error::extraction(format!(
                "{} exited with {}: {}",
                self.bin,
                output.status,
                error.trim()
            )));
        }

        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::extraction(format!("{} produced no output", self.bin)));
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl Extractor for YtDlp {
    async fn collection(&self, url: &str, window: Option<Window>) -> Result<RawCollection> {
        let mut args = vec![
            "--flat-playlist".to_string(),
            "--extractor-args".to_string(),
            "youtubetab:approximate_date".to_string(),
            "-J".to_string(),
        ];
        if let Some(window) = window {
            info!("get playlist in parts [{}] {}", window.playlist_items(), url);
            args.push("--playlist-items".to_string());
            args.push(window.playlist_items());
        }
        args.push("--".to_string());
        args.push(url.to_string());

        let stdout = self.run(&args).await?;
        Ok(serde_json::from_slice(&stdout)?)
    }

    async fn item(&self, id: &str) -> Result<RawItem> {
        // Video ids may start with '-', so they go after the option terminator.
        let args = [
            "-j".to_string(),
            "-f".to_string(),
            HLS_FORMAT_SELECTOR.to_string(),
            "--".to_string(),
            id.to_string(),
        ];

        let stdout = self.run(&args).await?;
        Ok(serde_json::from_slice(&stdout)?)
    }
}
