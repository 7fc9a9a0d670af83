//! Request and result types for the autofill pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;

/// Output language. Anything other than `ko` means English.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ko,
}

impl Language {
    pub fn normalize(value: Option<&str>) -> Self {
        match value {
            Some("ko") => Language::Ko,
            _ => Language::En,
        }
    }
}

/// Which half of the brief the caller wants. Unknown values mean `Both`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Company,
    Role,
    #[default]
    Both,
}

impl Mode {
    pub fn normalize(value: Option<&str>) -> Self {
        match value {
            Some("company") => Mode::Company,
            Some("role") => Mode::Role,
            _ => Mode::Both,
        }
    }

    /// `role` never looks at the company page.
    pub fn wants_company_page(self) -> bool {
        self != Mode::Role
    }
}

/// Body exactly as the client sent it. Fields are loosely typed so a wrong type
/// degrades like a missing value instead of rejecting the whole body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAutofillRequest {
    #[serde(default)]
    pub job_url: Option<Value>,
    #[serde(default)]
    pub company_url: Option<Value>,
    #[serde(default)]
    pub language: Option<Value>,
    #[serde(default)]
    pub mode: Option<Value>,
    #[serde(default)]
    pub company_name: Option<Value>,
    #[serde(default)]
    pub role_title: Option<Value>,
}

/// Validated, normalized request.
#[derive(Debug, Clone, PartialEq)]
pub struct AutofillRequest {
    pub job_url: String,
    /// Explicit company page; always wins over JSON-LD inference.
    pub company_url: Option<String>,
    pub language: Language,
    pub mode: Mode,
    /// Caller hint, not verified fact.
    pub company_name: String,
    /// Caller hint, not verified fact.
    pub role_title: String,
}

impl TryFrom<RawAutofillRequest> for AutofillRequest {
    type Error = AppError;

    fn try_from(raw: RawAutofillRequest) -> Result<Self, Self::Error> {
        let job_url = trimmed(&raw.job_url)
            .ok_or_else(|| AppError::Validation("jobUrl is required".to_string()))?;

        Ok(AutofillRequest {
            job_url,
            company_url: trimmed(&raw.company_url),
            language: Language::normalize(raw.language.as_ref().and_then(Value::as_str)),
            mode: Mode::normalize(raw.mode.as_ref().and_then(Value::as_str)),
            company_name: trimmed(&raw.company_name).unwrap_or_default(),
            role_title: trimmed(&raw.role_title).unwrap_or_default(),
        })
    }
}

fn trimmed(value: &Option<Value>) -> Option<String> {
    value
        .as_ref()
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ────────────────────────────────────────────────────────────────────────────
// Generated result. Strict: every key required, unknown keys rejected.
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyBrief {
    pub one_liner: String,
    pub product_market: String,
    pub motivation: String,
    pub research_checklist: String,
    pub links: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleBrief {
    pub summary: String,
    pub requirements: String,
    pub fit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JdKeywords {
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Sources {
    pub job_url: String,
    pub company_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutofillResult {
    pub company: CompanyBrief,
    pub role: RoleBrief,
    pub jd: JdKeywords,
    pub sources: Sources,
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawAutofillRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_unknown_language_and_mode_default() {
        let req = AutofillRequest::try_from(raw(json!({
            "jobUrl": "https://boards.example.com/jobs/123",
            "language": "fr",
            "mode": "invalid"
        })))
        .unwrap();
        assert_eq!(req.language, Language::En);
        assert_eq!(req.mode, Mode::Both);
    }

    #[test]
    fn test_known_values_are_kept() {
        let req = AutofillRequest::try_from(raw(json!({
            "jobUrl": "https://x.com/j",
            "language": "ko",
            "mode": "role"
        })))
        .unwrap();
        assert_eq!(req.language, Language::Ko);
        assert_eq!(req.mode, Mode::Role);
    }

    #[test]
    fn test_non_string_fields_degrade_to_defaults() {
        let req = AutofillRequest::try_from(raw(json!({
            "jobUrl": "https://x.com/j",
            "language": 7,
            "mode": ["role"],
            "companyUrl": false
        })))
        .unwrap();
        assert_eq!(req.language, Language::En);
        assert_eq!(req.mode, Mode::Both);
        assert_eq!(req.company_url, None);
    }

    #[test]
    fn test_fields_are_trimmed_and_blank_company_url_is_none() {
        let req = AutofillRequest::try_from(raw(json!({
            "jobUrl": "  https://x.com/j  ",
            "companyUrl": "   ",
            "companyName": " Acme ",
            "roleTitle": " Backend Intern "
        })))
        .unwrap();
        assert_eq!(req.job_url, "https://x.com/j");
        assert_eq!(req.company_url, None);
        assert_eq!(req.company_name, "Acme");
        assert_eq!(req.role_title, "Backend Intern");
    }

    #[test]
    fn test_missing_or_blank_job_url_is_rejected() {
        for body in [json!({}), json!({"jobUrl": "   "}), json!({"jobUrl": 12})] {
            let err = AutofillRequest::try_from(raw(body)).unwrap_err();
            assert_eq!(err.to_string(), "jobUrl is required");
        }
    }

    #[test]
    fn test_mode_gates_company_page() {
        assert!(Mode::Both.wants_company_page());
        assert!(Mode::Company.wants_company_page());
        assert!(!Mode::Role.wants_company_page());
    }

    fn full_result() -> Value {
        json!({
            "company": {
                "oneLiner": "",
                "productMarket": "",
                "motivation": "",
                "researchChecklist": "",
                "links": ""
            },
            "role": {"summary": "Build APIs", "requirements": "- Rust", "fit": ""},
            "jd": {"keywords": []},
            "sources": {"jobUrl": "https://x.com/j", "companyUrl": ""},
            "warnings": []
        })
    }

    #[test]
    fn test_result_accepts_complete_shape_with_empty_values() {
        let result: AutofillResult = serde_json::from_value(full_result()).unwrap();
        assert!(result.jd.keywords.is_empty());
        assert_eq!(result.role.summary, "Build APIs");
    }

    #[test]
    fn test_result_rejects_missing_nested_key() {
        let mut value = full_result();
        value["company"].as_object_mut().unwrap().remove("links");
        assert!(serde_json::from_value::<AutofillResult>(value).is_err());
    }

    #[test]
    fn test_result_rejects_null_keywords() {
        let mut value = full_result();
        value["jd"]["keywords"] = Value::Null;
        assert!(serde_json::from_value::<AutofillResult>(value).is_err());
    }

    #[test]
    fn test_result_rejects_additional_properties() {
        let mut value = full_result();
        value["confidence"] = json!(0.9);
        assert!(serde_json::from_value::<AutofillResult>(value).is_err());
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result: AutofillResult = serde_json::from_value(full_result()).unwrap();
        let value = serde_json::to_value(&result).unwrap();
        assert!(value["company"].get("oneLiner").is_some());
        assert!(value["sources"].get("jobUrl").is_some());
    }
}
