//! HLS manifests served for a resolved video.

pub mod master;
pub mod rewrite;

pub use master::master_manifest;
pub use rewrite::{proxy_url, rewrite_manifest};

use crate::stream::CacheEntry;

pub const HLS_CONTENT_TYPE: &str = "application/x-mpegURL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Master,
    Audio,
    Video,
}

impl Flavor {
    /// `"Master.m3u8"` -> `Master`; anything unknown is `None`.
    pub fn from_segment(segment: &str) -> Option<Self> {
        let name = segment.split('.').next().unwrap_or_default();
        match name.to_lowercase().as_str() {
            "master" => Some(Self::Master),
            "audio" => Some(Self::Audio),
            "video" => Some(Self::Video),
            _ => None,
        }
    }
}

/// The manifest body for one flavor, rewritten against `proxy_base`.
pub fn render(entry: &CacheEntry, flavor: Flavor, proxy_base: &str) -> String {
    match flavor {
        Flavor::Master => master_manifest(entry),
        Flavor::Audio => rewrite_manifest(&entry.audio_manifest, proxy_base),
        Flavor::Video => rewrite_manifest(&entry.video_manifest, proxy_base),
    }
}
