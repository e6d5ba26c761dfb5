//! Live probing of candidate action-API endpoints.
//!
//! A probe is exploratory by contract: any transport failure, timeout,
//! non-200 status, or malformed body is a `false`, never an error. The
//! [`Prober`] trait is the seam the orchestrator is tested through.

use async_trait::async_trait;
use serde_json::Value;

use crate::client::build_http_client;
use crate::config::ResolverConfig;

/// Issues probes against candidate endpoints and the cross-wiki hub.
///
/// Implemented over HTTP by [`HttpProber`]; tests supply scripted fakes.
#[async_trait]
pub trait Prober: Send + Sync {
    /// One bounded-timeout search probe
    /// (`action=query&list=search&srsearch={hint}&srlimit=1`).
    async fn probe_search(&self, api_url: &str, hint: &str) -> bool;

    /// One bounded-timeout siteinfo probe
    /// (`action=query&meta=siteinfo&siprop=general`). Used where no
    /// search hint applies, e.g. confirming hub-discovered bases.
    async fn probe_siteinfo(&self, api_url: &str) -> bool;

    /// Queries the platform-wide search hub for wikis matching a topic.
    /// Returns raw wiki URLs (unnormalized, unfiltered); failures and a
    /// disabled hub both come back as an empty list.
    async fn hub_search(&self, topic: &str) -> Vec<String>;
}

/// Decides whether a search-probe body proves a live MediaWiki API.
/// An empty result list still counts: the endpoint answered with
/// MediaWiki search semantics.
pub fn search_probe_ok(body: &Value) -> bool {
    body.get("query")
        .and_then(|q| q.get("search"))
        .map(|s| s.is_array())
        .unwrap_or(false)
}

/// Decides whether a siteinfo-probe body proves a live MediaWiki API:
/// `query.general.sitename` or `query.general.server` must be non-empty.
pub fn siteinfo_probe_ok(body: &Value) -> bool {
    let general = match body.get("query").and_then(|q| q.get("general")) {
        Some(g) => g,
        None => return false,
    };
    ["sitename", "server"].iter().any(|key| {
        general
            .get(*key)
            .and_then(|v| v.as_str())
            .map(|s| !s.is_empty())
            .unwrap_or(false)
    })
}

/// Production prober backed by a reqwest client with the configured
/// User-Agent and timeout.
pub struct HttpProber {
    http: reqwest::Client,
    hub_lookup: String,
}

impl HttpProber {
    pub fn new(config: &ResolverConfig) -> anyhow::Result<Self> {
        Ok(Self {
            http: build_http_client(config)?,
            hub_lookup: config.hub_lookup.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, url: &str, params: &[(&str, &str)]) -> Option<Value> {
        let resp = match self.http.get(url).query(params).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(url, error = %e, "probe transport failure");
                return None;
            }
        };
        if resp.status() != reqwest::StatusCode::OK {
            tracing::debug!(url, status = %resp.status(), "probe non-200");
            return None;
        }
        match resp.json::<Value>().await {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::debug!(url, error = %e, "probe body not JSON");
                None
            }
        }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe_search(&self, api_url: &str, hint: &str) -> bool {
        let params = [
            ("action", "query"),
            ("format", "json"),
            ("list", "search"),
            ("srsearch", hint),
            ("srlimit", "1"),
        ];
        match self.get_json(api_url, &params).await {
            Some(body) => {
                let ok = search_probe_ok(&body);
                tracing::debug!(api_url, ok, "search probe");
                ok
            }
            None => false,
        }
    }

    async fn probe_siteinfo(&self, api_url: &str) -> bool {
        let params = [
            ("action", "query"),
            ("format", "json"),
            ("meta", "siteinfo"),
            ("siprop", "general"),
        ];
        match self.get_json(api_url, &params).await {
            Some(body) => {
                let ok = siteinfo_probe_ok(&body);
                tracing::debug!(api_url, ok, "siteinfo probe");
                ok
            }
            None => false,
        }
    }

    async fn hub_search(&self, topic: &str) -> Vec<String> {
        if self.hub_lookup.is_empty() {
            return Vec::new();
        }
        let url = format!("{}/api/v1/Search/CrossWiki", self.hub_lookup);
        let params = [("expr", topic), ("limit", "5")];
        let body = match self.get_json(&url, &params).await {
            Some(b) => b,
            None => return Vec::new(),
        };
        hub_hit_urls(&body)
    }
}

/// Extracts wiki URLs from a cross-wiki hub response (`items[].url`).
pub fn hub_hit_urls(body: &Value) -> Vec<String> {
    body.get("items")
        .and_then(|i| i.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("url").and_then(|u| u.as_str()))
                .map(|u| u.to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_probe_accepts_empty_result_list() {
        assert!(search_probe_ok(&json!({"query": {"search": []}})));
        assert!(search_probe_ok(
            &json!({"query": {"search": [{"title": "Foo"}]}})
        ));
    }

    #[test]
    fn test_search_probe_rejects_wrong_shapes() {
        assert!(!search_probe_ok(&json!({})));
        assert!(!search_probe_ok(&json!({"query": {}})));
        assert!(!search_probe_ok(&json!({"query": {"search": "nope"}})));
        assert!(!search_probe_ok(&json!({"error": {"code": "readapidenied"}})));
    }

    #[test]
    fn test_siteinfo_probe_needs_sitename_or_server() {
        assert!(siteinfo_probe_ok(
            &json!({"query": {"general": {"sitename": "Zelda Wiki"}}})
        ));
        assert!(siteinfo_probe_ok(
            &json!({"query": {"general": {"server": "https://zelda.fandom.com"}}})
        ));
        assert!(!siteinfo_probe_ok(&json!({"query": {"general": {}}})));
        assert!(!siteinfo_probe_ok(
            &json!({"query": {"general": {"sitename": ""}}})
        ));
        assert!(!siteinfo_probe_ok(&json!({})));
    }

    #[test]
    fn test_hub_hit_urls_extraction() {
        let body = json!({
            "items": [
                {"id": 1, "title": "Zelda Wiki", "url": "https://zelda.fandom.com/"},
                {"id": 2, "title": "No url here"},
                {"id": 3, "url": "https://other.example.com/"}
            ]
        });
        assert_eq!(
            hub_hit_urls(&body),
            vec![
                "https://zelda.fandom.com/".to_string(),
                "https://other.example.com/".to_string(),
            ]
        );
        assert!(hub_hit_urls(&json!({})).is_empty());
    }
}
