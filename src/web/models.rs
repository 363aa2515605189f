use serde::Deserialize;
use std::sync::Arc;

use crate::stream::StreamResolver;

/// Shared by every request handler.
pub struct AppState {
    pub resolver: Arc<StreamResolver>,
    /// Used for the passthrough proxy, which streams instead of buffering.
    pub client: reqwest::Client,
    /// Public origin that rewritten manifests point back to.
    pub base_url: String,
}

#[derive(Deserialize)]
pub struct ProxyQuery {
    pub url: String,
}
