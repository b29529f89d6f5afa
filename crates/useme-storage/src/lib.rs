//! Transport client + static category catalog for the Useme extractors.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info_span, warn, Instrument};
use useme_core::{Category, Language};

pub const CRATE_NAME: &str = "useme-storage";

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("http status {status} for {url}")]
    HttpStatus { status: u16, url: String },
    #[error("invalid JSON from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Page transport used by every extractor. Implementations own cookies,
/// sessions and any anti-bot handling; callers only see text or JSON.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;

    async fn get_json(&self, url: &str) -> Result<JsonValue, FetchError>;

    async fn post_json(&self, url: &str, payload: &JsonValue) -> Result<JsonValue, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            user_agent: None,
        }
    }
}

/// reqwest-backed [`Transport`] with a persistent cookie store.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: HttpClientConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9,pl;q=0.8"));

        let client = reqwest::Client::builder()
            .gzip(true)
            .brotli(true)
            .cookie_store(true)
            .default_headers(headers)
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT))
            .build()
            .context("building reqwest client")?;

        Ok(Self { client })
    }

    async fn read_success(resp: reqwest::Response) -> Result<String, FetchError> {
        let status = resp.status();
        let final_url = resp.url().to_string();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: final_url,
            });
        }
        let body = resp.text().await?;
        debug!(target: "useme::http", status = status.as_u16(), bytes = body.len(), url = %final_url, "fetched");
        Ok(body)
    }

    fn decode_json(url: &str, body: &str) -> Result<JsonValue, FetchError> {
        serde_json::from_str(body).map_err(|source| FetchError::Json {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl Transport for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        async {
            let resp = self.client.get(url).send().await?;
            Self::read_success(resp).await
        }
        .instrument(info_span!("http_fetch", method = "GET", url))
        .await
    }

    async fn get_json(&self, url: &str) -> Result<JsonValue, FetchError> {
        async {
            let resp = self
                .client
                .get(url)
                .header(ACCEPT, "application/json")
                .send()
                .await?;
            let body = Self::read_success(resp).await?;
            Self::decode_json(url, &body)
        }
        .instrument(info_span!("http_fetch", method = "GET", url))
        .await
    }

    async fn post_json(&self, url: &str, payload: &JsonValue) -> Result<JsonValue, FetchError> {
        async {
            let resp = self
                .client
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .header(ACCEPT, "application/json")
                .json(payload)
                .send()
                .await?;
            let body = Self::read_success(resp).await?;
            Self::decode_json(url, &body)
        }
        .instrument(info_span!("http_fetch", method = "POST", url))
        .await
    }
}

pub fn is_not_found(err: &FetchError) -> bool {
    matches!(err, FetchError::HttpStatus { status, .. } if *status == StatusCode::NOT_FOUND.as_u16())
}

/// File-backed category list. The file is re-read on every call.
#[derive(Debug, Clone)]
pub struct CategoryCatalog {
    path: PathBuf,
}

impl CategoryCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// All categories, optionally restricted to one language. A missing or
    /// unreadable file yields an empty list.
    pub async fn load(&self, lang: Option<Language>) -> Vec<Category> {
        match self.try_load().await {
            Ok(Some(categories)) => categories
                .into_iter()
                .filter(|c| lang.is_none() || lang == Some(c.lang))
                .collect(),
            Ok(None) => {
                warn!(target: "useme::catalog", path = %self.path.display(), "category catalog not found");
                Vec::new()
            }
            Err(err) => {
                warn!(target: "useme::catalog", path = %self.path.display(), error = %format!("{err:#}"), "category catalog unreadable");
                Vec::new()
            }
        }
    }

    pub async fn get(&self, category_id: u32, lang: Language) -> Option<Category> {
        self.load(Some(lang))
            .await
            .into_iter()
            .find(|c| c.category_id == category_id)
    }

    /// Case-insensitive substring match on name or slug.
    pub async fn search(&self, term: &str, lang: Option<Language>) -> Vec<Category> {
        let needle = term.to_lowercase();
        self.load(lang)
            .await
            .into_iter()
            .filter(|c| c.name.to_lowercase().contains(&needle) || c.slug.to_lowercase().contains(&needle))
            .collect()
    }

    async fn try_load(&self) -> anyhow::Result<Option<Vec<Category>>> {
        if !fs::try_exists(&self.path)
            .await
            .with_context(|| format!("checking {}", self.path.display()))?
        {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))?;
        let categories = serde_json::from_str(&data)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(Some(categories))
    }
}
