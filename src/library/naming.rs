use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RESERVED: Regex = Regex::new(r#"[/\\?<>:*|"\x00-\x1f\x7f]"#).unwrap();
    static ref PUNCTUATION: Regex = Regex::new(r#"[,.'"\-]"#).unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref SEPARATORS: Regex = Regex::new(r"\.{2,}").unwrap();
}

/// Marker embedded in every file that belongs to one remote item.
pub fn id_marker(id: &str) -> String {
    format!("yt-{}", id)
}

/// Title as it appears in filenames: `"Hello, World - Part 1"` -> `"Hello.World.Part.1"`.
pub fn sanitize_title(title: &str) -> String {
    let title = RESERVED.replace_all(title, "");
    let title = PUNCTUATION.replace_all(&title, "");
    let title = WHITESPACE.replace_all(title.trim(), ".");
    SEPARATORS.replace_all(&title, ".").into_owned()
}

/// What leads an item's filename and decides its sort position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Episode(usize),
    Timestamp(i64),
}

/// `E0007.Some.Title.yt-abc` or `1700000000.Some.Title.yt-abc`, without extension.
pub fn item_basename(key: SortKey, title: &str, id: &str) -> String {
    let lead = match key {
        SortKey::Episode(number) => format!("E{:04}", number),
        SortKey::Timestamp(ts) => ts.to_string(),
    };
    let title = sanitize_title(title);

    if title.is_empty() {
        format!("{}.{}", lead, id_marker(id))
    } else {
        format!("{}.{}.{}", lead, title, id_marker(id))
    }
}
