//! HTML Extractor: turns raw fetched content into a normalized `PageExtract`.
//!
//! Pure and infallible: malformed markup or JSON-LD degrades to empty fields.
//! Every string field is capped here, independently of how large the input was.

pub mod html;
pub mod organization;

use scraper::Html;
use serde::Serialize;
use serde_json::Value;

use html::{extract_json_ld, extract_meta, extract_title, safe_slice, strip_html};

pub const MAX_TITLE_CHARS: usize = 280;
pub const MAX_DESCRIPTION_CHARS: usize = 1_200;
pub const MAX_TEXT_CHARS: usize = 18_000;

/// Normalized result of fetching and parsing one URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageExtract {
    /// Final URL after redirects.
    pub url: String,
    pub title: String,
    pub description: String,
    pub og_title: String,
    pub og_description: String,
    pub json_ld: Vec<Value>,
    pub text: String,
}

/// Extracts title, description, Open Graph tags, JSON-LD and visible text.
/// `url` is left empty; the caller stamps the final fetched URL.
pub fn extract(raw_html: &str) -> PageExtract {
    let document = Html::parse_document(raw_html);

    let og_title = extract_meta(&document, "og:title");
    let og_description = extract_meta(&document, "og:description");

    let title = non_empty_or(extract_title(&document), &og_title);
    let description = non_empty_or(extract_meta(&document, "description"), &og_description);

    PageExtract {
        url: String::new(),
        title: safe_slice(&title, MAX_TITLE_CHARS),
        description: safe_slice(&description, MAX_DESCRIPTION_CHARS),
        og_title: safe_slice(&og_title, MAX_TITLE_CHARS),
        og_description: safe_slice(&og_description, MAX_DESCRIPTION_CHARS),
        json_ld: extract_json_ld(&document),
        text: safe_slice(&strip_html(raw_html), MAX_TEXT_CHARS),
    }
}

fn non_empty_or(primary: String, fallback: &str) -> String {
    if primary.is_empty() {
        fallback.to_string()
    } else {
        primary
    }
}
