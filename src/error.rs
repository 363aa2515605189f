//! Error taxonomy shared by the sync, resolve and materialize paths.

/// Errors surfaced by the library side of tubestrm.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// yt-dlp exited non-zero, printed nothing, or printed something that is not JSON.
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// yt-dlp answered, but without a usable audio/video substream pair.
    #[error("Resolution failed: {0}")]
    Resolution(String),

    /// An upstream HTTP request failed or returned a non-success status.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Reading or writing the library directory failed.
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),
}

impl Error {
    pub fn extraction<S: Into<String>>(msg: S) -> Self {
        Self::Extraction(msg.into())
    }

    pub fn resolution<S: Into<String>>(msg: S) -> Self {
        Self::Resolution(msg.into())
    }

    pub fn fetch<S: Into<String>>(msg: S) -> Self {
        Self::Fetch(msg.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Fetch(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Extraction(format!("unparsable yt-dlp output: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
