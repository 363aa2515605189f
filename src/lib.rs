//! tubestrm mirrors YouTube playlists and channels into a Jellyfin/Kodi
//! library as `.strm` files, and serves their HLS streams through a
//! same-origin proxy.

pub mod config;
pub mod error;
pub mod hls;
pub mod library;
pub mod scheduler;
pub mod services;
pub mod stream;
pub mod sync;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
