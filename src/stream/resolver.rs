use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate, TimeZone};
use parking_lot::Mutex;
use tracing::info;

use crate::error::{Error, Result};
use crate::services::{Extractor, Fetcher, RawItem};
use crate::stream::cache::ResolutionCache;
use crate::stream::models::{CacheEntry, StreamItem};

const DEFAULT_AUDIO_LABEL: &str = "audio";

/// Turns video ids into cached stream entries.
///
/// Concurrent calls for the same id are serialized on a per-id lock, so only
/// the first caller goes upstream; the rest find its entry in the cache.
pub struct StreamResolver {
    extractor: Arc<dyn Extractor>,
    fetcher: Arc<dyn Fetcher>,
    cache: ResolutionCache,
    inflight: InflightMap,
}

type InflightMap = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

/// A caller's share of the per-id lock. Dropping the last share, even from a
/// cancelled caller, removes the map entry.
struct InflightSlot<'a> {
    inflight: &'a InflightMap,
    id: &'a str,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl<'a> InflightSlot<'a> {
    fn acquire(inflight: &'a InflightMap, id: &'a str) -> Self {
        let lock = inflight.lock().entry(id.to_string()).or_default().clone();
        Self { inflight, id, lock }
    }
}

impl Drop for InflightSlot<'_> {
    fn drop(&mut self) {
        let mut inflight = self.inflight.lock();
        // Clones are only handed out under this lock: two owners means the map and us.
        if Arc::strong_count(&self.lock) == 2 {
            inflight.remove(self.id);
        }
    }
}

impl StreamResolver {
    pub fn new(extractor: Arc<dyn Extractor>, fetcher: Arc<dyn Fetcher>, cache: ResolutionCache) -> Self {
        Self {
            extractor,
            fetcher,
            cache,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub async fn resolve(&self, id: &str) -> Result<Arc<CacheEntry>> {
        if let Some(entry) = self.cache.get(id) {
            info!("cache hit for {}", id);
            return Ok(entry);
        }

        let slot = InflightSlot::acquire(&self.inflight, id);
        let _guard = slot.lock.lock().await;
        match self.cache.get(id) {
            Some(entry) => {
                info!("resolution of {} finished while waiting, using cache", id);
                Ok(entry)
            }
            None => self.resolve_fresh(id).await,
        }
    }

    async fn resolve_fresh(&self, id: &str) -> Result<Arc<CacheEntry>> {
        info!("freshly requesting {}", id);

        let raw = self.extractor.item(id).await?;
        let item = stream_item(id, raw)?;

        let (audio_manifest, video_manifest) = futures::try_join!(
            self.fetcher.text(&item.audio_manifest_url),
            self.fetcher.text(&item.video_manifest_url),
        )?;

        Ok(self.cache.insert(item, audio_manifest, video_manifest))
    }
}

/// Build a [`StreamItem`] from yt-dlp output, picking the first audio-only
/// and first video-only requested format.
pub fn stream_item(id: &str, raw: RawItem) -> Result<StreamItem> {
    let formats = raw.requested_formats.unwrap_or_default();
    let audio = formats
        .iter()
        .find(|f| f.has_audio())
        .ok_or_else(|| Error::resolution(format!("no HLS audio substream for {}", id)))?;
    let video = formats
        .iter()
        .find(|f| f.has_video())
        .ok_or_else(|| Error::resolution(format!("no HLS video substream for {}", id)))?;

    let published_at = raw
        .timestamp
        .or(raw.release_timestamp)
        .or_else(|| raw.upload_date.as_deref().and_then(parse_upload_date))
        .ok_or_else(|| Error::resolution(format!("no usable timestamp for {}", id)))?;

    Ok(StreamItem {
        id: id.to_string(),
        title: raw.fulltitle.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        published_at,
        thumbnail_url: raw.thumbnail,
        duration_seconds: raw.duration,
        tags: raw.tags.unwrap_or_default(),
        audio_manifest_url: audio.url.clone(),
        video_manifest_url: video.url.clone(),
        audio_label: audio
            .format_note
            .clone()
            .unwrap_or_else(|| DEFAULT_AUDIO_LABEL.to_string()),
    })
}

/// `CCYYMMDD` at local midnight, as Unix seconds.
pub fn parse_upload_date(date: &str) -> Option<i64> {
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = date[0..4].parse().ok()?;
    let month = date[4..6].parse().ok()?;
    let day = date[6..8].parse().ok()?;

    let midnight = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.timestamp())
}
