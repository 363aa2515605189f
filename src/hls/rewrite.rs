use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    // Absolute URL up to the closing quote of an attribute or the end of the token.
    static ref URL_PATTERN: Regex = Regex::new(r#"(?i)https?://[^"\s]+"#).unwrap();
}

/// Route every absolute URL in an HLS manifest through `{proxy_base}/proxy/`.
///
/// Works line by line and keeps the line count. Not idempotent: a second
/// pass would wrap the proxy URLs themselves.
pub fn rewrite_manifest(manifest: &str, proxy_base: &str) -> String {
    manifest
        .split('\n')
        .map(|line| {
            URL_PATTERN.replace_all(line, |caps: &Captures| proxy_url(proxy_base, &caps[0]))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn proxy_url(proxy_base: &str, url: &str) -> String {
    format!("{}/proxy/?url={}", proxy_base, urlencoding::encode(url))
}
