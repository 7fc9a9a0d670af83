//! Prompt Composer: pairs the language-specific system prompt with a structured
//! JSON payload of the fetched page extracts.

use serde::Serialize;

use crate::autofill::models::{Language, Mode};
use crate::autofill::prompts::system_prompt;
use crate::errors::AppError;
use crate::extract::html::safe_slice;
use crate::extract::PageExtract;

pub const MAX_JOB_JSON_LD_CHARS: usize = 18_000;
pub const MAX_COMPANY_JSON_LD_CHARS: usize = 12_000;

#[derive(Debug, Clone)]
pub struct ComposedPrompt {
    pub system: &'static str,
    pub user: String,
}

/// One page as the model sees it. JSON-LD is pre-serialized and capped.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PagePayload<'a> {
    url: &'a str,
    title: &'a str,
    description: &'a str,
    og_title: &'a str,
    og_description: &'a str,
    json_ld: String,
    text: &'a str,
}

impl<'a> PagePayload<'a> {
    fn from_extract(page: &'a PageExtract, json_ld_cap: usize) -> Result<Self, AppError> {
        let json_ld =
            serde_json::to_string(&page.json_ld).map_err(|e| AppError::Internal(e.into()))?;
        Ok(Self {
            url: &page.url,
            title: &page.title,
            description: &page.description,
            og_title: &page.og_title,
            og_description: &page.og_description,
            json_ld: safe_slice(&json_ld, json_ld_cap),
            text: &page.text,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserPayload<'a> {
    mode: Mode,
    language: Language,
    company_name: &'a str,
    role_title: &'a str,
    job: PagePayload<'a>,
    /// `null` when mode is `role` or no company page was resolved.
    company: Option<PagePayload<'a>>,
}

pub fn compose(
    mode: Mode,
    language: Language,
    company_name: &str,
    role_title: &str,
    job: &PageExtract,
    company: Option<&PageExtract>,
) -> Result<ComposedPrompt, AppError> {
    let payload = UserPayload {
        mode,
        language,
        company_name,
        role_title,
        job: PagePayload::from_extract(job, MAX_JOB_JSON_LD_CHARS)?,
        company: company
            .map(|page| PagePayload::from_extract(page, MAX_COMPANY_JSON_LD_CHARS))
            .transpose()?,
    };

    let user =
        serde_json::to_string_pretty(&payload).map_err(|e| AppError::Internal(e.into()))?;

    Ok(ComposedPrompt {
        system: system_prompt(language),
        user,
    })
}
