//! Mirrors a remote collection into a media-server library directory.
//!
//! Every new item gets a `.strm` file pointing at its master playlist on this
//! server, an episode `.nfo` and a thumbnail. The first run for a collection
//! also writes `tvshow.nfo` and `poster.jpg`.

pub mod index;
pub mod naming;
pub mod nfo;

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tokio::fs;
use tracing::{error, info, warn};

use crate::config::{CollectionOptions, MetadataOverride};
use crate::error::Result;
use crate::services::Fetcher;
use crate::stream::StreamResolver;
use crate::sync::{CollectionMetadata, PlaylistSummary, Synchronizer};

use index::LibraryIndex;
use naming::{item_basename, SortKey};
use nfo::{episode_nfo, tvshow_nfo, EpisodeNumbering};

pub const POSTER_FILE: &str = "poster.jpg";

/// Oldest timestamp a run with `after_timespan` still considers new.
pub fn sync_cutoff(after_timespan: Option<i64>, now: i64) -> Option<i64> {
    after_timespan.map(|span| now - span)
}

pub fn strm_contents(base_url: &str, id: &str) -> String {
    format!("{}/yt/{}/master.m3u8", base_url, id)
}

fn apply_override(metadata: &CollectionMetadata, overrides: &MetadataOverride) -> CollectionMetadata {
    CollectionMetadata {
        title: overrides.title.clone().unwrap_or_else(|| metadata.title.clone()),
        description: overrides
            .description
            .clone()
            .unwrap_or_else(|| metadata.description.clone()),
        thumb: overrides.thumb.clone().or_else(|| metadata.thumb.clone()),
    }
}

pub struct Materializer {
    synchronizer: Synchronizer,
    resolver: Arc<StreamResolver>,
    fetcher: Arc<dyn Fetcher>,
    base_url: String,
}

impl Materializer {
    pub fn new(
        synchronizer: Synchronizer,
        resolver: Arc<StreamResolver>,
        fetcher: Arc<dyn Fetcher>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            synchronizer,
            resolver,
            fetcher,
            base_url: base_url.into(),
        }
    }

    /// Write sidecars for every item of `collection_url` not yet in `target_dir`.
    ///
    /// Returns how many items were written. A failing item is logged and
    /// skipped; a failing enumeration fails the whole call.
    pub async fn materialize_new(
        &self,
        collection_url: &str,
        target_dir: &Path,
        options: &CollectionOptions,
    ) -> Result<usize> {
        let cutoff = sync_cutoff(options.after_timespan, Utc::now().timestamp());
        let summary = self.synchronizer.synchronize(collection_url, cutoff).await?;

        fs::create_dir_all(target_dir).await?;
        let mut index = LibraryIndex::scan(target_dir).await?;

        let new_items: Vec<(usize, String)> = summary
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !index.contains(&entry.id))
            .map(|(position, entry)| (position + 1, entry.id.clone()))
            .collect();

        if new_items.is_empty() {
            info!("no new videos found for {}, we're done here.", collection_url);
            return Ok(0);
        }

        if !index.has_show_sidecar() {
            self.write_show(&summary, target_dir, &options.metadata_override)
                .await?;
        }

        let mut written = 0;
        for (episode, id) in new_items {
            info!("new video {}", id);
            match self.write_item(&id, episode, target_dir, options).await {
                Ok(()) => {
                    written += 1;
                    if let Err(e) = index.record(&id).await {
                        warn!("Failed to record {} in library index: {}", id, e);
                    }
                }
                Err(e) => error!("Skipping {}: {}", id, e),
            }
        }

        info!("{} new videos written to {}", written, target_dir.display());
        Ok(written)
    }

    async fn write_show(
        &self,
        summary: &PlaylistSummary,
        dir: &Path,
        overrides: &MetadataOverride,
    ) -> Result<()> {
        let metadata = apply_override(&summary.metadata, overrides);
        fs::write(dir.join(index::SHOW_SIDECAR), tvshow_nfo(&summary.list_id, &metadata)).await?;

        if let Some(thumb) = &metadata.thumb {
            self.download_thumbnail(thumb, &dir.join(POSTER_FILE)).await;
        }
        Ok(())
    }

    async fn write_item(
        &self,
        id: &str,
        episode: usize,
        dir: &Path,
        options: &CollectionOptions,
    ) -> Result<()> {
        let entry = self.resolver.resolve(id).await?;
        let item = &entry.item;

        let key = if options.order_by_timestamp {
            SortKey::Timestamp(item.published_at)
        } else {
            SortKey::Episode(episode)
        };
        let basename = item_basename(key, &item.title, id);
        info!("writing .strm and .nfo files at {}", basename);

        let numbering = (!options.order_by_timestamp).then_some(EpisodeNumbering {
            season: options.custom_season_number,
            episode,
        });
        let nfo = dir.join(format!("{}.nfo", basename));
        let strm = dir.join(format!("{}.strm", basename));

        // Both files carry the id marker: a half-written item would count as present.
        let written = async {
            fs::write(&nfo, episode_nfo(item, numbering)).await?;
            fs::write(&strm, strm_contents(&self.base_url, id)).await
        }
        .await;
        if let Err(e) = written {
            for path in [&nfo, &strm] {
                let _ = fs::remove_file(path).await;
            }
            return Err(e.into());
        }

        if let Some(thumb) = &item.thumbnail_url {
            self.download_thumbnail(thumb, &dir.join(format!("{}-thumb.jpg", basename)))
                .await;
        }
        Ok(())
    }

    // Artwork is optional for the media server; failures only warn.
    async fn download_thumbnail(&self, url: &str, target: &Path) {
        let result: Result<()> = match self.fetcher.bytes(url).await {
            Ok(bytes) => fs::write(target, bytes).await.map_err(Into::into),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!("Failed to store thumbnail {}: {}", target.display(), e);
        }
    }
}
