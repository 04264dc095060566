use std::sync::OnceLock;

use regex::Regex;

/// Two or more dot-separated word runs, plus whatever follows on the line.
const URL_PATTERN: &str = r"\w*\.\w+\.*\w+.*";

static URL_RE: OnceLock<Regex> = OnceLock::new();

fn url_regex() -> &'static Regex {
    URL_RE.get_or_init(|| Regex::new(URL_PATTERN).expect("valid regex"))
}

/// Outcome of scanning message text for something link-shaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Found(String),
    NotFound,
}

/// Find the first URL-shaped span in `text`.
///
/// The match is syntactic only: `version.1.2` is returned just like
/// `example.com`. The span is returned verbatim, without a scheme.
pub fn extract(text: &str) -> Extraction {
    match url_regex().find(text) {
        Some(m) => Extraction::Found(m.as_str().to_string()),
        None => Extraction::NotFound,
    }
}
