use serde::{Deserialize, Deserializer};

/// `yt-dlp -J --flat-playlist` output for a playlist or channel tab.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCollection {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnails: Option<Vec<RawThumbnail>>,
    #[serde(default)]
    pub entries: Option<Vec<RawEntry>>,
}

impl RawCollection {
    /// Highest resolution thumbnail; yt-dlp lists them smallest first.
    pub fn best_thumbnail(&self) -> Option<String> {
        self.thumbnails
            .as_ref()
            .and_then(|thumbs| thumbs.last())
            .map(|thumb| thumb.url.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawThumbnail {
    pub url: String,
}

/// One flat playlist entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawEntry {
    pub id: String,
    #[serde(default, deserialize_with = "seconds")]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub live_status: Option<String>,
}

/// `yt-dlp -j` output for a single video.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub fulltitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "seconds")]
    pub timestamp: Option<i64>,
    #[serde(default, deserialize_with = "seconds")]
    pub release_timestamp: Option<i64>,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub requested_formats: Option<Vec<RawFormat>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFormat {
    #[serde(default)]
    pub audio_ext: Option<String>,
    #[serde(default)]
    pub video_ext: Option<String>,
    pub url: String,
    #[serde(default)]
    pub format_note: Option<String>,
}

impl RawFormat {
    pub fn has_audio(&self) -> bool {
        has_ext(&self.audio_ext)
    }

    pub fn has_video(&self) -> bool {
        has_ext(&self.video_ext)
    }
}

fn has_ext(ext: &Option<String>) -> bool {
    matches!(ext.as_deref(), Some(ext) if ext != "none")
}

// yt-dlp emits integral seconds, but some extractors produce floats.
fn seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.map(|secs| secs.floor() as i64))
}
