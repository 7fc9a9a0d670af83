//! Organization Resolver: best-effort company URL discovery from job-page JSON-LD.
//!
//! Only `JobPosting` entries are inspected; other vocabularies (`Organization`,
//! `WebSite`) are deliberately left alone.

use serde_json::Value;

/// Returns the first `hiringOrganization` URL (`sameAs`, then `url`) found on a
/// `JobPosting` entry, or `None` when nothing usable exists.
pub fn resolve_company_url(job_json_ld: &[Value]) -> Option<String> {
    job_json_ld
        .iter()
        .filter(|entry| entry.get("@type").and_then(Value::as_str) == Some("JobPosting"))
        .filter_map(|entry| entry.get("hiringOrganization"))
        .find_map(|org| {
            ["sameAs", "url"]
                .iter()
                .filter_map(|key| org.get(*key).and_then(Value::as_str))
                .map(str::trim)
                .find(|candidate| is_absolute_http_url(candidate))
                .map(str::to_string)
        })
}

fn is_absolute_http_url(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    ["http://", "https://"]
        .iter()
        .any(|scheme| lower.starts_with(scheme) && lower.len() > scheme.len())
}
