//! Fakes shared by pipeline and handler tests. Each fake counts its calls so tests
//! can assert which network hops did or did not happen.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::auth::{IdentityError, IdentityVerifier, Principal};
use crate::config::Config;
use crate::fetcher::{FetchError, FetchedPage, PageFetcher};
use crate::llm_client::{BackendReply, LlmBackend, LlmClient, LlmError, ResponsesRequest};
use crate::state::AppState;

pub const VALID_AUTH: &str = "Bearer valid-token";

pub enum FakePage {
    Html(String),
    Status(u16),
    Hang,
}

#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, FakePage>,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_html(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), FakePage::Html(html.to_string()));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.pages.insert(url.to_string(), FakePage::Status(status));
        self
    }

    pub fn with_hang(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), FakePage::Hang);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(FakePage::Html(html)) => Ok(FetchedPage {
                final_url: url.to_string(),
                raw: html.clone(),
                content_type: "text/html; charset=utf-8".to_string(),
            }),
            Some(FakePage::Status(status)) => Err(FetchError::Status(*status)),
            Some(FakePage::Hang) => std::future::pending().await,
            None => Err(FetchError::Status(404)),
        }
    }
}

pub struct FakeIdentity {
    pub configured: bool,
}

#[async_trait]
impl IdentityVerifier for FakeIdentity {
    fn ensure_configured(&self) -> Result<(), IdentityError> {
        if self.configured {
            Ok(())
        } else {
            Err(IdentityError::NotConfigured)
        }
    }

    async fn verify(&self, authorization: &str) -> Result<Principal, IdentityError> {
        if authorization == VALID_AUTH {
            Ok(Principal {
                id: "user-1".to_string(),
                email: None,
            })
        } else {
            Err(IdentityError::Rejected)
        }
    }
}

pub struct FakeLlm {
    reply: BackendReply,
    requests: Mutex<Vec<Value>>,
}

impl FakeLlm {
    pub fn replying(status: u16, body: Value) -> Arc<Self> {
        Arc::new(Self {
            reply: BackendReply { status, body },
            requests: Mutex::new(Vec::new()),
        })
    }

    /// A 200 reply whose output text is `brief_json()`.
    pub fn with_brief() -> Arc<Self> {
        Self::replying(200, json!({ "output_text": brief_json().to_string() }))
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    /// The user payload of the most recent request, parsed back into JSON.
    pub fn last_user_payload(&self) -> Value {
        let requests = self.requests();
        let text = requests.last().unwrap()["input"][1]["content"][0]["text"]
            .as_str()
            .unwrap()
            .to_string();
        serde_json::from_str(&text).unwrap()
    }
}

#[async_trait]
impl LlmBackend for FakeLlm {
    async fn create_response(
        &self,
        _api_key: &str,
        request: &ResponsesRequest<'_>,
    ) -> Result<BackendReply, LlmError> {
        self.requests
            .lock()
            .unwrap()
            .push(serde_json::to_value(request).unwrap());
        Ok(self.reply.clone())
    }
}

/// A complete, schema-valid brief. Its `sources` deliberately disagree with any
/// real fetch so tests can see them overwritten.
pub fn brief_json() -> Value {
    json!({
        "company": {
            "oneLiner": "Acme builds developer tooling.",
            "productMarket": "- B2B SaaS",
            "motivation": "",
            "researchChecklist": "- Read the engineering blog",
            "links": "https://acme.com"
        },
        "role": {
            "summary": "Backend intern on the platform team.",
            "requirements": "- Rust\n- SQL",
            "fit": ""
        },
        "jd": { "keywords": ["Rust", "SQL", "APIs"] },
        "sources": { "jobUrl": "https://model-made-this-up.example", "companyUrl": "" },
        "warnings": []
    })
}

pub fn test_config(api_key: Option<&str>) -> Config {
    Config {
        supabase_url: Some("https://project.supabase.co".to_string()),
        supabase_anon_key: Some("anon".to_string()),
        openai_api_key: api_key.map(str::to_string),
        openai_model: "gpt-4o-mini".to_string(),
        openai_base_url: "https://api.openai.com/v1".to_string(),
        port: 8080,
        rust_log: "debug".to_string(),
    }
}

pub fn test_llm(backend: Arc<FakeLlm>, api_key: Option<&str>) -> LlmClient {
    LlmClient::new(
        backend,
        api_key.map(str::to_string),
        "gpt-4o-mini".to_string(),
    )
}

pub fn test_state(fetcher: Arc<FakeFetcher>, llm: Arc<FakeLlm>) -> AppState {
    AppState {
        config: test_config(Some("sk-test")),
        fetcher,
        identity: Arc::new(FakeIdentity { configured: true }),
        llm: test_llm(llm, Some("sk-test")),
    }
}
