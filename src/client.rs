//! MediaWiki action-API client for confirmed wiki bases.
//!
//! Everything here runs *after* resolution: the base is trusted, so
//! failures are real errors, not probe-style booleans. Each call tries
//! the base's endpoint candidates in order and only reports
//! [`BridgeError::Upstream`] when every endpoint fails.

use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;

use crate::config::ResolverConfig;
use crate::error::BridgeError;
use crate::title::TitleLookup;
use crate::wiki::{api_endpoints, WikiBase};

/// Builds the shared outbound HTTP client: configured User-Agent,
/// bounded timeout, and redirect following capped at 10 hops (needed by
/// the HEAD-redirect title fallback).
pub fn build_http_client(config: &ResolverConfig) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()?;
    Ok(client)
}

/// A single search hit, shaped for the bridge's simplified JSON.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub pageid: u64,
    pub snippet: String,
    pub timestamp: String,
}

/// Page content and metadata from `prop=extracts|info`.
#[derive(Debug, Clone, Serialize)]
pub struct PageContent {
    pub title: String,
    pub pageid: u64,
    pub extract: Option<String>,
    pub url: Option<String>,
}

/// Read-only client for the MediaWiki action API.
pub struct WikiClient {
    http: reqwest::Client,
}

impl WikiClient {
    pub fn new(config: &ResolverConfig) -> anyhow::Result<Self> {
        Ok(Self {
            http: build_http_client(config)?,
        })
    }

    /// GETs the action API, trying each endpoint candidate in order.
    /// All-endpoints failure is an [`BridgeError::Upstream`].
    async fn query_json(
        &self,
        base: &WikiBase,
        params: &[(&str, String)],
    ) -> Result<Value, BridgeError> {
        let mut last_err = String::new();
        for api_url in api_endpoints(base) {
            match self.http.get(&api_url).query(params).send().await {
                Ok(resp) if resp.status().is_success() => match resp.json::<Value>().await {
                    Ok(body) => return Ok(body),
                    Err(e) => last_err = format!("{api_url}: invalid JSON ({e})"),
                },
                Ok(resp) => last_err = format!("{api_url}: status {}", resp.status()),
                Err(e) => last_err = format!("{api_url}: {e}"),
            }
            tracing::debug!(%base, error = %last_err, "endpoint failed, trying next");
        }
        Err(BridgeError::Upstream(last_err))
    }

    /// Full-text search on a confirmed wiki (`list=search`).
    pub async fn search_articles(
        &self,
        base: &WikiBase,
        query: &str,
        limit: u32,
    ) -> Result<Vec<SearchHit>, BridgeError> {
        let params = [
            ("action", "query".to_string()),
            ("format", "json".to_string()),
            ("list", "search".to_string()),
            ("srsearch", query.to_string()),
            ("srlimit", limit.to_string()),
        ];
        let body = self.query_json(base, &params).await?;
        let hits = body
            .get("query")
            .and_then(|q| q.get("search"))
            .and_then(|s| s.as_array())
            .ok_or_else(|| {
                BridgeError::Upstream(format!("{base}: search response missing query.search"))
            })?;
        Ok(hits.iter().map(parse_search_hit).collect())
    }

    /// Fetches a page's plain-text extract and metadata
    /// (`prop=extracts|info`, redirects followed server-side).
    pub async fn fetch_page(
        &self,
        base: &WikiBase,
        title: &str,
    ) -> Result<PageContent, BridgeError> {
        let params = [
            ("action", "query".to_string()),
            ("format", "json".to_string()),
            ("prop", "extracts|info".to_string()),
            ("titles", title.to_string()),
            ("redirects", "1".to_string()),
            ("explaintext", "1".to_string()),
            ("inprop", "url".to_string()),
        ];
        let body = self.query_json(base, &params).await?;
        let page = first_page(&body).ok_or_else(|| {
            BridgeError::Upstream(format!("{base}: page response missing query.pages"))
        })?;
        if page.get("missing").is_some() {
            return Err(BridgeError::PageNotFound(title.to_string()));
        }
        Ok(PageContent {
            title: page
                .get("title")
                .and_then(|t| t.as_str())
                .unwrap_or(title)
                .to_string(),
            pageid: page.get("pageid").and_then(|p| p.as_u64()).unwrap_or(0),
            extract: page
                .get("extract")
                .and_then(|e| e.as_str())
                .map(|e| e.to_string()),
            url: page
                .get("fullurl")
                .and_then(|u| u.as_str())
                .map(|u| u.to_string()),
        })
    }

    /// Renders a page to HTML via `action=parse&prop=text`.
    pub async fn render_html(&self, base: &WikiBase, title: &str) -> Result<String, BridgeError> {
        let params = [
            ("action", "parse".to_string()),
            ("format", "json".to_string()),
            ("page", title.to_string()),
            ("prop", "text".to_string()),
            ("redirects", "1".to_string()),
        ];
        let body = self.query_json(base, &params).await?;
        if let Some(code) = body
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|c| c.as_str())
        {
            if code == "missingtitle" {
                return Err(BridgeError::PageNotFound(title.to_string()));
            }
            return Err(BridgeError::Upstream(format!("{base}: parse error {code}")));
        }
        body.get("parse")
            .and_then(|p| p.get("text"))
            .and_then(|t| t.get("*"))
            .and_then(|h| h.as_str())
            .map(|h| h.to_string())
            .ok_or_else(|| {
                BridgeError::Upstream(format!("{base}: parse response missing parse.text"))
            })
    }
}

#[async_trait]
impl TitleLookup for WikiClient {
    async fn query_canonical_title(&self, base: &WikiBase, title: &str) -> Option<String> {
        let params = [
            ("action", "query".to_string()),
            ("format", "json".to_string()),
            ("titles", title.to_string()),
            ("redirects", "1".to_string()),
        ];
        let body = self.query_json(base, &params).await.ok()?;
        crate::title::canonical_from_query(&body)
    }

    async fn head_canonical_title(&self, base: &WikiBase, title: &str) -> Option<String> {
        let encoded = urlencoding::encode(&title.replace(' ', "_")).into_owned();
        let url = format!("{base}/wiki/{encoded}");
        let resp = self.http.head(&url).send().await.ok()?;
        if !resp.status().is_success() {
            return None;
        }
        crate::title::canonical_from_redirect_path(resp.url().path())
    }
}

fn parse_search_hit(hit: &Value) -> SearchHit {
    SearchHit {
        title: hit
            .get("title")
            .and_then(|t| t.as_str())
            .unwrap_or_default()
            .to_string(),
        pageid: hit.get("pageid").and_then(|p| p.as_u64()).unwrap_or(0),
        snippet: sanitize_snippet(
            hit.get("snippet")
                .and_then(|s| s.as_str())
                .unwrap_or_default(),
        ),
        timestamp: hit
            .get("timestamp")
            .and_then(|t| t.as_str())
            .unwrap_or_default()
            .to_string(),
    }
}

/// The single page object under `query.pages` (keyed by pageid).
fn first_page(body: &Value) -> Option<&Value> {
    body.get("query")?
        .get("pages")?
        .as_object()?
        .values()
        .next()
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"</?[^>]+>").expect("static regex"))
}

/// Strips markup spans from a search snippet and unescapes the handful
/// of entities MediaWiki emits there.
pub fn sanitize_snippet(snippet: &str) -> String {
    let stripped = tag_re().replace_all(snippet, "");
    stripped
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}
