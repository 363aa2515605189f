//! Incremental playlist synchronization.
//!
//! With a cutoff, the remote collection is paged in windows of [`WINDOW_SIZE`]
//! items, most recent first, until a page reaches past the cutoff or comes
//! back empty. Remote work is therefore bounded by the number of items newer
//! than the cutoff plus one page, not by the size of the collection. This
//! relies on the remote listing being ordered most-recent-first; an out of
//! order listing can make items below a "stop" page go unseen.

use std::sync::Arc;

use tracing::{error, info};

use crate::error::{Error, Result};
use crate::services::{Extractor, RawCollection, RawEntry, Window};

pub const WINDOW_SIZE: usize = 10;

/// Live statuses that cannot be turned into a playable item yet.
const UNPROCESSABLE_LIVE_STATUS: [&str; 3] = ["is_live", "is_upcoming", "post_live"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub id: String,
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionMetadata {
    pub title: String,
    pub description: String,
    pub thumb: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub list_id: String,
    pub title: String,
    pub entries: Vec<PlaylistEntry>,
    pub metadata: CollectionMetadata,
}

/// The entries of one fetched page that are new enough to keep.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistWindow {
    pub entries: Vec<RawEntry>,
    pub has_older_than_cutoff: bool,
    pub page_len: usize,
}

impl PlaylistWindow {
    /// Entries without a timestamp are neither kept nor treated as older.
    pub fn from_page(page: Vec<RawEntry>, cutoff: i64) -> Self {
        let page_len = page.len();
        let has_older_than_cutoff = page
            .iter()
            .any(|e| matches!(e.timestamp, Some(ts) if ts < cutoff));
        let entries = page
            .into_iter()
            .filter(|e| matches!(e.timestamp, Some(ts) if ts >= cutoff))
            .collect();

        Self {
            entries,
            has_older_than_cutoff,
            page_len,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Fetching { offset: usize },
    Filtering,
    Done,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    /// A cutoff-bounded window came back.
    Page { len: usize, has_older_than_cutoff: bool },
    /// The whole collection came back in one listing.
    Listing,
    Filtered,
    Failed,
}

/// Pure transition function of the synchronizer.
pub fn reduce(state: SyncState, event: SyncEvent) -> SyncState {
    match (state, event) {
        (SyncState::Done | SyncState::Aborted, _) => state,
        (_, SyncEvent::Failed) => SyncState::Aborted,
        (
            SyncState::Fetching { offset },
            SyncEvent::Page {
                len,
                has_older_than_cutoff,
            },
        ) => {
            if has_older_than_cutoff || len == 0 {
                SyncState::Filtering
            } else {
                SyncState::Fetching {
                    offset: offset + WINDOW_SIZE,
                }
            }
        }
        (SyncState::Fetching { .. }, SyncEvent::Listing) => SyncState::Filtering,
        (SyncState::Filtering, SyncEvent::Filtered) => SyncState::Done,
        (state, _) => state,
    }
}

fn is_processable(entry: &RawEntry) -> bool {
    match entry.live_status.as_deref() {
        Some(status) if UNPROCESSABLE_LIVE_STATUS.contains(&status) => {
            info!(
                "Entry {} cannot be processed because live_status is {}",
                entry.id, status
            );
            false
        }
        _ => true,
    }
}

pub struct Synchronizer {
    extractor: Arc<dyn Extractor>,
}

impl Synchronizer {
    pub fn new(extractor: Arc<dyn Extractor>) -> Self {
        Self { extractor }
    }

    /// Enumerate `url`, keeping only entries at or after `cutoff` when one is given.
    ///
    /// Any extraction failure aborts the whole run; there are no partial results.
    pub async fn synchronize(&self, url: &str, cutoff: Option<i64>) -> Result<PlaylistSummary> {
        if let Some(cutoff) = cutoff {
            info!(
                "cutoff set, requesting playlist in windows of {} until {}",
                WINDOW_SIZE, cutoff
            );
        }

        let mut state = SyncState::Fetching { offset: 0 };
        let mut header: Option<RawCollection> = None;
        let mut accepted: Vec<RawEntry> = Vec::new();
        let mut failure: Option<Error> = None;

        loop {
            state = match state {
                SyncState::Fetching { offset } => {
                    let window = cutoff.map(|_| Window {
                        offset,
                        size: WINDOW_SIZE,
                    });
                    match self.extractor.collection(url, window).await {
                        Ok(mut page) => {
                            let entries = page.entries.take().unwrap_or_default();
                            if header.is_none() {
                                header = Some(page);
                            }
                            match cutoff {
                                Some(cutoff) => {
                                    let window = PlaylistWindow::from_page(entries, cutoff);
                                    accepted.extend(window.entries);
                                    reduce(
                                        state,
                                        SyncEvent::Page {
                                            len: window.page_len,
                                            has_older_than_cutoff: window.has_older_than_cutoff,
                                        },
                                    )
                                }
                                None => {
                                    accepted = entries;
                                    reduce(state, SyncEvent::Listing)
                                }
                            }
                        }
                        Err(e) => {
                            error!("Failed to enumerate {}: {}", url, e);
                            failure = Some(e);
                            reduce(state, SyncEvent::Failed)
                        }
                    }
                }
                SyncState::Filtering => {
                    accepted.retain(is_processable);
                    reduce(state, SyncEvent::Filtered)
                }
                SyncState::Done => break,
                SyncState::Aborted => {
                    return Err(failure.unwrap_or_else(|| {
                        Error::extraction(format!("synchronization of {} aborted", url))
                    }));
                }
            };
        }

        let header = header.unwrap_or_default();
        let metadata = CollectionMetadata {
            title: header.title.clone().unwrap_or_default(),
            description: header.description.clone().unwrap_or_default(),
            thumb: header.best_thumbnail(),
        };

        Ok(PlaylistSummary {
            list_id: header.id.unwrap_or_default(),
            title: header.title.unwrap_or_default(),
            entries: accepted
                .into_iter()
                .map(|e| PlaylistEntry {
                    id: e.id,
                    timestamp: e.timestamp,
                })
                .collect(),
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{entry, FakeExtractor};

    fn ids(summary: &PlaylistSummary) -> Vec<&str> {
        summary.entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn reducer_advances_by_window_until_older_item() {
        let state = SyncState::Fetching { offset: 0 };
        let full = SyncEvent::Page {
            len: 10,
            has_older_than_cutoff: false,
        };
        let state = reduce(state, full);
        assert_eq!(state, SyncState::Fetching { offset: 10 });

        let stop = SyncEvent::Page {
            len: 10,
            has_older_than_cutoff: true,
        };
        assert_eq!(reduce(state, stop), SyncState::Filtering);
    }

    #[test]
    fn reducer_stops_on_empty_page() {
        let event = SyncEvent::Page {
            len: 0,
            has_older_than_cutoff: false,
        };
        assert_eq!(
            reduce(SyncState::Fetching { offset: 30 }, event),
            SyncState::Filtering
        );
    }

    #[test]
    fn reducer_terminal_states_are_sticky() {
        assert_eq!(reduce(SyncState::Done, SyncEvent::Failed), SyncState::Done);
        assert_eq!(
            reduce(SyncState::Fetching { offset: 0 }, SyncEvent::Failed),
            SyncState::Aborted
        );
        assert_eq!(reduce(SyncState::Aborted, SyncEvent::Listing), SyncState::Aborted);
        assert_eq!(reduce(SyncState::Filtering, SyncEvent::Filtered), SyncState::Done);
    }

    #[test]
    fn window_ignores_entries_without_timestamp() {
        let page = vec![
            entry("a", Some(1000)),
            RawEntry {
                id: "x".into(),
                timestamp: None,
                live_status: None,
            },
        ];
        let window = PlaylistWindow::from_page(page, 500);
        assert_eq!(window.entries.len(), 1);
        assert!(!window.has_older_than_cutoff);
        assert_eq!(window.page_len, 2);
    }

    #[tokio::test]
    async fn cutoff_keeps_only_recent_items() {
        let extractor = Arc::new(FakeExtractor::with_entries(vec![
            entry("a", Some(1000)),
            entry("b", Some(900)),
            entry("c", Some(100)),
        ]));
        let sync = Synchronizer::new(extractor.clone());

        let summary = sync.synchronize("list", Some(500)).await.unwrap();
        assert_eq!(ids(&summary), ["a", "b"]);
        assert_eq!(extractor.collection_calls(), 1);
    }

    #[tokio::test]
    async fn page_requests_are_bounded_by_items_since_cutoff() {
        for recent in [0usize, 1, 9, 10, 11, 20, 25, 40] {
            let total = recent + 15;
            let entries = (0..total)
                .map(|i| {
                    let ts = if i < recent { 10_000 - i as i64 } else { 100 - i as i64 };
                    entry(&format!("v{i}"), Some(ts))
                })
                .collect();
            let extractor = Arc::new(FakeExtractor::with_entries(entries));
            let sync = Synchronizer::new(extractor.clone());

            let summary = sync.synchronize("list", Some(5_000)).await.unwrap();
            assert_eq!(summary.entries.len(), recent);
            assert!(summary.entries.iter().all(|e| e.timestamp >= Some(5_000)));
            assert!(extractor.collection_calls() <= recent.div_ceil(WINDOW_SIZE) + 1);
        }
    }

    #[tokio::test]
    async fn stops_on_empty_page_when_everything_is_recent() {
        let entries = (0..20).map(|i| entry(&format!("v{i}"), Some(9_000 - i))).collect();
        let extractor = Arc::new(FakeExtractor::with_entries(entries));
        let sync = Synchronizer::new(extractor.clone());

        let summary = sync.synchronize("list", Some(1)).await.unwrap();
        assert_eq!(summary.entries.len(), 20);
        assert_eq!(extractor.collection_calls(), 3);
    }

    #[tokio::test]
    async fn without_cutoff_fetches_everything_at_once() {
        let extractor = Arc::new(FakeExtractor::with_entries(vec![
            entry("a", Some(1000)),
            entry("c", Some(100)),
            entry("d", None),
        ]));
        let sync = Synchronizer::new(extractor.clone());

        let summary = sync.synchronize("list", None).await.unwrap();
        assert_eq!(ids(&summary), ["a", "c", "d"]);
        assert_eq!(extractor.collection_calls(), 1);
        assert_eq!(summary.list_id, "PLfake");
        assert_eq!(summary.metadata.thumb.as_deref(), Some("https://img/big.jpg"));
    }

    #[tokio::test]
    async fn drops_live_and_upcoming_entries() {
        let mut live = entry("live", Some(1000));
        live.live_status = Some("is_live".into());
        let mut upcoming = entry("soon", Some(999));
        upcoming.live_status = Some("is_upcoming".into());
        let mut processing = entry("proc", Some(998));
        processing.live_status = Some("post_live".into());
        let mut past = entry("past", Some(997));
        past.live_status = Some("was_live".into());

        let extractor = Arc::new(FakeExtractor::with_entries(vec![
            live, upcoming, processing, past,
        ]));
        let sync = Synchronizer::new(extractor);

        let summary = sync.synchronize("list", Some(500)).await.unwrap();
        assert_eq!(ids(&summary), ["past"]);
    }

    #[tokio::test]
    async fn failure_aborts_without_partial_results() {
        let entries = (0..30).map(|i| entry(&format!("v{i}"), Some(9_000 - i))).collect();
        let extractor = Arc::new(FakeExtractor::with_entries(entries).fail_collection_after(1));
        let sync = Synchronizer::new(extractor);

        let err = sync.synchronize("list", Some(1)).await.unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }
}
