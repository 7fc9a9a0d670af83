//! HTML helpers. Input is untrusted third-party markup and nothing here evaluates
//! it. Title, meta and JSON-LD come from a parsed `scraper::Html` tree so quoting
//! and comments are honored; visible text is a cheap regex pass over the raw string.
//! No function here fails.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").unwrap());
static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").unwrap());
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static BR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static BLOCK_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</(?:p|div|li|h[1-6]|section|article|tr|td)\s*>").unwrap()
});
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static META_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[name], meta[property]").unwrap());
static TYPED_SCRIPT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script[type]").unwrap());

const JSON_LD_TYPE: &str = "application/ld+json";

/// Returns at most `max_chars` characters of `value`, always a prefix.
pub fn safe_slice(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => value[..byte_idx].to_string(),
        None => value.to_string(),
    }
}

/// Collapses every whitespace run (newlines included) to a single space.
pub fn compact_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Unescapes the handful of entities that show up in nearly every page.
/// `&amp;` goes last so `&amp;lt;` decodes to the literal `&lt;`.
pub fn unescape_entities(value: &str) -> String {
    value
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Visible-text approximation of a page.
pub fn strip_html(html: &str) -> String {
    let text = SCRIPT_RE.replace_all(html, " ");
    let text = STYLE_RE.replace_all(&text, " ");
    let text = COMMENT_RE.replace_all(&text, " ");
    let text = BR_RE.replace_all(&text, "\n");
    let text = BLOCK_CLOSE_RE.replace_all(&text, "\n");
    let text = TAG_RE.replace_all(&text, " ");
    let text = unescape_entities(&text).replace("\r\n", "\n").replace('\r', "\n");

    let lines: Vec<String> = text.split('\n').map(compact_whitespace).collect();
    let joined = lines.join("\n");
    BLANK_RUN_RE.replace_all(&joined, "\n\n").trim().to_string()
}

/// Text of the first `<title>` element, whitespace-collapsed.
pub fn extract_title(document: &Html) -> String {
    document
        .select(&TITLE_SEL)
        .next()
        .map(|title| compact_whitespace(&title.text().collect::<String>()))
        .unwrap_or_default()
}

/// `content` of the first `<meta>` whose `name` or `property` equals `key`
/// (case-insensitive) and whose content is not blank.
pub fn extract_meta(document: &Html, key: &str) -> String {
    document
        .select(&META_SEL)
        .filter(|meta| {
            let el = meta.value();
            [el.attr("name"), el.attr("property")]
                .into_iter()
                .flatten()
                .any(|value| value.trim().eq_ignore_ascii_case(key))
        })
        .filter_map(|meta| meta.value().attr("content"))
        .map(compact_whitespace)
        .find(|content| !content.is_empty())
        .unwrap_or_default()
}

/// Parses every `application/ld+json` block independently. Arrays contribute each
/// element; blocks that fail to parse are dropped without stopping the scan.
pub fn extract_json_ld(document: &Html) -> Vec<Value> {
    let mut found = Vec::new();

    let blocks = document.select(&TYPED_SCRIPT_SEL).filter(|script| {
        script
            .value()
            .attr("type")
            .is_some_and(|kind| kind.trim().eq_ignore_ascii_case(JSON_LD_TYPE))
    });

    for (index, script) in blocks.enumerate() {
        let raw: String = script.text().collect();
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => found.extend(items),
            Ok(value) => found.push(value),
            Err(e) => debug!("Skipping malformed JSON-LD block #{index}: {e}"),
        }
    }

    found
}
