//! In-process stand-ins for yt-dlp, upstream HTTP and the wall clock.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::services::{Extractor, Fetcher, RawCollection, RawEntry, RawFormat, RawItem, Window};
use crate::services::models::RawThumbnail;
use crate::stream::Clock;

pub(crate) fn entry(id: &str, timestamp: Option<i64>) -> RawEntry {
    RawEntry {
        id: id.to_string(),
        timestamp,
        live_status: None,
    }
}

pub(crate) fn raw_item(id: &str, timestamp: Option<i64>) -> RawItem {
    RawItem {
        fulltitle: Some(format!("Title of {id}")),
        description: Some(format!("About {id}")),
        timestamp,
        release_timestamp: None,
        upload_date: Some("20240105".to_string()),
        thumbnail: Some(format!("https://img/{id}.jpg")),
        tags: Some(vec!["tag".to_string()]),
        duration: Some(90.0),
        requested_formats: Some(vec![
            RawFormat {
                audio_ext: Some("none".to_string()),
                video_ext: Some("mp4".to_string()),
                url: format!("https://cdn/{id}/video.m3u8"),
                format_note: Some("1080p".to_string()),
            },
            RawFormat {
                audio_ext: Some("m4a".to_string()),
                video_ext: Some("none".to_string()),
                url: format!("https://cdn/{id}/audio.m3u8"),
                format_note: Some("medium".to_string()),
            },
        ]),
    }
}

#[derive(Default)]
pub(crate) struct FakeExtractor {
    entries: Vec<RawEntry>,
    items: HashMap<String, RawItem>,
    fail_collection_after: Option<usize>,
    item_delay: Option<Duration>,
    collection_calls: AtomicUsize,
    item_calls: AtomicUsize,
}

impl FakeExtractor {
    pub(crate) fn with_entries(entries: Vec<RawEntry>) -> Self {
        Self {
            entries,
            ..Default::default()
        }
    }

    pub(crate) fn with_item(mut self, id: &str, item: RawItem) -> Self {
        self.items.insert(id.to_string(), item);
        self
    }

    pub(crate) fn fail_collection_after(mut self, calls: usize) -> Self {
        self.fail_collection_after = Some(calls);
        self
    }

    pub(crate) fn slow_items(mut self, delay: Duration) -> Self {
        self.item_delay = Some(delay);
        self
    }

    pub(crate) fn collection_calls(&self) -> usize {
        self.collection_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn item_calls(&self) -> usize {
        self.item_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Extractor for FakeExtractor {
    async fn collection(&self, _url: &str, window: Option<Window>) -> Result<RawCollection> {
        let calls = self.collection_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if matches!(self.fail_collection_after, Some(limit) if calls > limit) {
            return Err(Error::extraction("yt-dlp exited with exit status: 1"));
        }

        let entries = match window {
            Some(window) => self
                .entries
                .iter()
                .skip(window.offset)
                .take(window.size)
                .cloned()
                .collect(),
            None => self.entries.clone(),
        };

        Ok(RawCollection {
            id: Some("PLfake".to_string()),
            title: Some("Fake list".to_string()),
            description: Some("A list & more".to_string()),
            thumbnails: Some(vec![
                RawThumbnail {
                    url: "https://img/small.jpg".to_string(),
                },
                RawThumbnail {
                    url: "https://img/big.jpg".to_string(),
                },
            ]),
            entries: Some(entries),
        })
    }

    async fn item(&self, id: &str) -> Result<RawItem> {
        self.item_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.item_delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(item) = self.items.get(id) {
            return Ok(item.clone());
        }
        let timestamp = self
            .entries
            .iter()
            .find(|e| e.id == id)
            .and_then(|e| e.timestamp)
            .or(Some(1_700_000_000));
        Ok(raw_item(id, timestamp))
    }
}

#[derive(Default)]
pub(crate) struct FakeFetcher {
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    pub(crate) fn failing_on(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn text(&self, url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(url) {
            return Err(Error::fetch(format!("GET {url} failed with status: 404")));
        }
        let base = url.trim_end_matches(".m3u8");
        Ok(format!(
            "#EXTM3U\n#EXT-X-MAP:URI=\"{base}/init.mp4\"\n#EXTINF:5.0,\n{base}/seg1.ts\n#EXT-X-ENDLIST"
        ))
    }

    async fn bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(url) {
            return Err(Error::fetch(format!("GET {url} failed with status: 404")));
        }
        Ok(b"\xff\xd8jpeg".to_vec())
    }
}

pub(crate) struct ManualClock {
    now: Mutex<SystemTime>,
}

impl ManualClock {
    pub(crate) fn new() -> Self {
        Self {
            now: Mutex::new(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock()
    }
}
