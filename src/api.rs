// API client module: a small blocking HTTP client that creates bins on
// Sourcebin. The upload command only sees the `PasteService` trait so it
// can be driven by a fake in tests.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::{LinkStyle, Service};
use crate::languages::LanguageTable;
use crate::model::{Language, LanguageId, PasteRequest, PasteResult};

/// Anything that can turn a `PasteRequest` into a URL.
pub trait PasteService {
    fn create_paste(&self, request: &PasteRequest) -> Result<PasteResult>;
}

/// Blocking Sourcebin client. Holds the reqwest client, the service
/// settings and the language table used to turn fallback names into ids.
#[derive(Clone)]
pub struct SourcebinClient {
    client: Client,
    api_url: String,
    short_url: String,
    link: LinkStyle,
    languages: Arc<LanguageTable>,
}

/// Body of `POST /api/bins`.
#[derive(Serialize, Debug, PartialEq)]
pub struct CreateBinRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub files: Vec<BinFile>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct BinFile {
    pub content: String,
    #[serde(rename = "languageId", skip_serializing_if = "Option::is_none")]
    pub language_id: Option<LanguageId>,
}

#[derive(Deserialize, Debug)]
struct CreateBinResponse {
    key: String,
}

#[derive(Deserialize, Debug)]
struct ErrorResponse {
    message: String,
}

impl SourcebinClient {
    /// Build a client from the `[service]` config section.
    pub fn new(service: &Service, languages: Arc<LanguageTable>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(service.timeout_secs))
            .user_agent(concat!("binup/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(SourcebinClient {
            client,
            api_url: service.api_url.trim_end_matches('/').to_string(),
            short_url: service.short_url.trim_end_matches('/').to_string(),
            link: service.link,
            languages,
        })
    }

    /// Wire body for a request. Fallback names are looked up by name in the
    /// table; when even that fails the language is left for the service to
    /// decide.
    pub fn bin_request(&self, request: &PasteRequest) -> CreateBinRequest {
        let language_id = match &request.language {
            Language::Known(id) => Some(*id),
            Language::Fallback(name) => self.languages.find_by_name(name),
        };
        CreateBinRequest {
            title: request.title.clone(),
            files: vec![BinFile {
                content: request.content.clone(),
                language_id,
            }],
        }
    }

    fn bin_url(&self, key: &str) -> String {
        match self.link {
            LinkStyle::Short => format!("{}/{}", self.short_url, key),
            LinkStyle::Full => format!("{}/{}", self.api_url, key),
        }
    }
}

impl PasteService for SourcebinClient {
    fn create_paste(&self, request: &PasteRequest) -> Result<PasteResult> {
        let url = format!("{}/api/bins", &self.api_url);
        let body = self.bin_request(request);
        tracing::debug!(%url, title = ?body.title, language = ?body.files[0].language_id, "creating bin");

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .context("Failed to send create bin request")?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_default();
            match serde_json::from_str::<ErrorResponse>(&txt) {
                Ok(err) => anyhow::bail!("{}", err.message),
                Err(_) => anyhow::bail!("{} - {}", status, txt),
            }
        }
        let resp: CreateBinResponse = res.json().context("Parsing create bin response json")?;
        Ok(PasteResult {
            url: self.bin_url(&resp.key),
        })
    }
}
