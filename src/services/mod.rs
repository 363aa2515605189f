//! External collaborators: the yt-dlp process and upstream HTTP.

pub mod fetch;
pub mod models;
pub mod ytdlp;

pub use fetch::{Fetcher, HttpFetcher};
pub use models::{RawCollection, RawEntry, RawFormat, RawItem};
pub use ytdlp::{Extractor, Window, YtDlp};
