use crate::stream::CacheEntry;

const AUDIO_GROUP: &str = "default-audio-group";
const VARIANT_BANDWIDTH: u32 = 2_000_000;

/// Master playlist pairing one audio rendition with one video variant.
///
/// Both URIs are relative to the master playlist's own URL, so they land on
/// the `audio` and `video` routes next to it.
pub fn master_manifest(entry: &CacheEntry) -> String {
    let name = entry.item.audio_label.replace('"', "'");

    format!(
        "#EXTM3U\n\
         #EXT-X-VERSION:4\n\
         #EXT-X-MEDIA:TYPE=AUDIO,URI=\"audio.m3u8\",GROUP-ID=\"{group}\",NAME=\"{name}\",AUTOSELECT=YES,DEFAULT=YES\n\
         \n\
         #EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH={bandwidth},AUDIO=\"{group}\"\n\
         video.m3u8",
        group = AUDIO_GROUP,
        name = name,
        bandwidth = VARIANT_BANDWIDTH,
    )
}
