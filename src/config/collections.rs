use anyhow::{Context, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::Path;

/// One playlist or channel to mirror into `dir` under the shows root.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionEntry {
    pub url: String,
    #[serde(alias = "targetDir")]
    pub dir: String,
    /// Own cron schedule; collections without one follow the global schedule.
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub options: CollectionOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CollectionOptions {
    /// Only items newer than this many seconds are considered.
    #[serde(alias = "afterTimespan", deserialize_with = "timespan")]
    pub after_timespan: Option<i64>,
    #[serde(alias = "orderByTimestamp")]
    pub order_by_timestamp: bool,
    #[serde(alias = "customSeasonNumber")]
    pub custom_season_number: u32,
    #[serde(alias = "metadataOverride", alias = "playlistMetaOverride")]
    pub metadata_override: MetadataOverride,
}

impl Default for CollectionOptions {
    fn default() -> Self {
        Self {
            after_timespan: None,
            order_by_timestamp: false,
            custom_season_number: 1,
            metadata_override: MetadataOverride::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MetadataOverride {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumb: Option<String>,
}

// `false` is accepted as "no timespan".
fn timespan<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(secs)) => Ok(secs.as_i64().filter(|secs| *secs > 0)),
        Some(Value::Bool(false)) | Some(Value::Null) | None => Ok(None),
        Some(other) => Err(D::Error::custom(format!(
            "afterTimespan must be seconds or false, got {other}"
        ))),
    }
}

pub async fn load_collections(path: &Path) -> Result<Vec<CollectionEntry>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read collections file: {:?}", path))?;

    let collections: Vec<CollectionEntry> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse collections file: {:?}", path))?;

    for entry in &collections {
        if entry.dir.trim().is_empty() || Path::new(&entry.dir).is_absolute() {
            anyhow::bail!(
                "Collection {} needs a relative target dir, got {:?}",
                entry.url,
                entry.dir
            );
        }
    }

    Ok(collections)
}
