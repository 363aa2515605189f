//! Kodi/Jellyfin `.nfo` sidecars.

use chrono::DateTime;

use crate::stream::StreamItem;
use crate::sync::CollectionMetadata;

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes" ?>"#;

pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Numbering is left out when the library orders by timestamp.
pub struct EpisodeNumbering {
    pub season: u32,
    pub episode: usize,
}

pub fn episode_nfo(item: &StreamItem, numbering: Option<EpisodeNumbering>) -> String {
    let aired = DateTime::from_timestamp(item.published_at, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    let mut nfo = format!(
        "{XML_HEADER}\n<episodedetails>\n    <title>{}</title>\n    <plot>{}</plot>\n    <uniqueid type=\"yt\" default=\"true\">{}</uniqueid>\n",
        escape_xml(&item.title),
        escape_xml(&item.description),
        escape_xml(&item.id),
    );
    if let Some(numbering) = numbering {
        nfo.push_str(&format!(
            "    <season>{}</season>\n    <episode>{}</episode>\n    <displayseason>-1</displayseason>\n    <displayepisode>-1</displayepisode>\n",
            numbering.season, numbering.episode
        ));
    }
    nfo.push_str(&format!(
        "    <aired>{aired}</aired>\n    <premiered>{aired}</premiered>\n"
    ));
    if let Some(duration) = item.duration_seconds {
        nfo.push_str(&format!("    <runtime>{:.2}</runtime>\n", duration / 60.0));
    }
    for tag in &item.tags {
        nfo.push_str(&format!("    <tag>{}</tag>\n", escape_xml(tag)));
    }
    nfo.push_str("</episodedetails>");
    nfo
}

pub fn tvshow_nfo(list_id: &str, metadata: &CollectionMetadata) -> String {
    format!(
        "{XML_HEADER}\n<tvshow>\n    <title>{}</title>\n    <plot>{}</plot>\n    <uniqueid type=\"yt-playlist\" default=\"true\">{}</uniqueid>\n    <displayseason>-1</displayseason>\n    <displayepisode>-1</displayepisode>\n</tvshow>",
        escape_xml(&metadata.title),
        escape_xml(&metadata.description),
        escape_xml(list_id),
    )
}
