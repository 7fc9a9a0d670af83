//! Autofill pipeline: fetch → extract → resolve company → compose → generate.
//!
//! Strictly forward, request-scoped, no retries. The job and company fetches run
//! concurrently only when the company URL is given up front; an inferred company
//! URL needs the job page's JSON-LD first.

use tracing::{debug, info};

use crate::autofill::composer::compose;
use crate::autofill::models::{AutofillRequest, AutofillResult, Sources};
use crate::autofill::schema::autofill_schema;
use crate::errors::AppError;
use crate::extract::organization::resolve_company_url;
use crate::extract::{extract, PageExtract};
use crate::fetcher::{fetch_page, PageFetcher, FETCH_TIMEOUT};
use crate::llm_client::LlmClient;

/// Fetches one URL within the fetch timeout and extracts it.
pub async fn load_page(fetcher: &dyn PageFetcher, url: &str) -> Result<PageExtract, AppError> {
    let fetched = fetch_page(fetcher, url, FETCH_TIMEOUT).await?;
    let mut page = extract(&fetched.raw);
    page.url = fetched.final_url;
    debug!(
        "Extracted {} ({}): title='{}', {} JSON-LD entries, {} text chars",
        page.url,
        fetched.content_type,
        page.title,
        page.json_ld.len(),
        page.text.chars().count()
    );
    Ok(page)
}

/// Fetches the job page and, when the mode wants it, the company page.
async fn load_pages(
    fetcher: &dyn PageFetcher,
    request: &AutofillRequest,
) -> Result<(PageExtract, Option<PageExtract>), AppError> {
    if !request.mode.wants_company_page() {
        let job = load_page(fetcher, &request.job_url).await?;
        return Ok((job, None));
    }

    if let Some(company_url) = &request.company_url {
        let (job, company) = tokio::try_join!(
            load_page(fetcher, &request.job_url),
            load_page(fetcher, company_url)
        )?;
        return Ok((job, Some(company)));
    }

    let job = load_page(fetcher, &request.job_url).await?;
    let company = match resolve_company_url(&job.json_ld) {
        Some(inferred) => {
            info!("Inferred company URL from JobPosting JSON-LD: {inferred}");
            Some(load_page(fetcher, &inferred).await?)
        }
        None => {
            debug!("No company URL supplied or inferable; continuing with job page only");
            None
        }
    };
    Ok((job, company))
}

/// Runs the whole pipeline for one request.
pub async fn run_autofill(
    fetcher: &dyn PageFetcher,
    llm: &LlmClient,
    request: &AutofillRequest,
) -> Result<AutofillResult, AppError> {
    info!(
        "Autofill: job={} mode={:?} language={:?}",
        request.job_url, request.mode, request.language
    );

    let (job, company) = load_pages(fetcher, request).await?;

    let prompt = compose(
        request.mode,
        request.language,
        &request.company_name,
        &request.role_title,
        &job,
        company.as_ref(),
    )?;

    let mut result: AutofillResult = llm
        .generate(prompt.system, &prompt.user, &autofill_schema())
        .await?;

    // Sources report what was fetched, not what the model claims.
    result.sources = Sources {
        job_url: job.url,
        company_url: company.map(|c| c.url).unwrap_or_default(),
    };

    info!(
        "Autofill complete: {} keywords, {} warnings",
        result.jd.keywords.len(),
        result.warnings.len()
    );
    Ok(result)
}
