use std::time::SystemTime;

/// One remote video, resolved down to its two HLS substreams.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamItem {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Unix seconds, possibly derived from a bare upload date.
    pub published_at: i64,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<f64>,
    pub tags: Vec<String>,
    pub audio_manifest_url: String,
    pub video_manifest_url: String,
    /// `format_note` of the chosen audio format.
    pub audio_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub item: StreamItem,
    pub audio_manifest: String,
    pub video_manifest: String,
    pub cache_until: SystemTime,
}

impl CacheEntry {
    pub fn is_expired(&self, now: SystemTime) -> bool {
        self.cache_until <= now
    }
}
