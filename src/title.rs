//! Title canonicalization: caller-requested title → the wiki's true
//! page title, with the episode-number shorthand many fan wikis use.

use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use crate::wiki::WikiBase;

/// The two redirect-following lookups canonicalization is built on.
///
/// Implemented over HTTP by [`WikiClient`](crate::client::WikiClient);
/// tests supply scripted fakes, mirroring the
/// [`Prober`](crate::probe::Prober) seam.
#[async_trait]
pub trait TitleLookup: Send + Sync {
    /// API-level redirect resolution (`titles=…&redirects=1`).
    /// Exploratory: `None` covers both failure and a missing page.
    async fn query_canonical_title(&self, base: &WikiBase, title: &str) -> Option<String>;

    /// HTTP-level fallback: HEAD the human-facing `/wiki/{title}` URL
    /// with redirects followed and read the final path. Exploratory
    /// like the API variant.
    async fn head_canonical_title(&self, base: &WikiBase, title: &str) -> Option<String>;
}

/// Outcome of canonicalization. `requested` is the caller's original
/// string, `normalized` the shorthand-expanded lookup key, `canonical`
/// the best title we ended up with. `confident` separates a redirect-
/// confirmed title from a last-resort echo of the request.
#[derive(Debug, Clone, Serialize)]
pub struct TitleResolution {
    pub requested: String,
    pub normalized: String,
    pub canonical: String,
    pub confident: bool,
}

fn episode_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(?:episode[\s_]*)?0*(\d+)$").expect("static regex"))
}

/// Expands episode-number shorthand ("episode 01", "Episode_3", "12")
/// to the canonical `Episode_{N}` form. Anything else passes through.
pub fn normalize_shorthand(title: &str) -> String {
    match episode_re().captures(title.trim()) {
        Some(caps) => format!("Episode_{}", &caps[1]),
        None => title.trim().to_string(),
    }
}

/// Extracts a canonical title from the final path of a followed
/// redirect: the segment after `/wiki/`, percent-decoded, underscores
/// back to spaces.
pub fn canonical_from_redirect_path(path: &str) -> Option<String> {
    let idx = path.rfind("/wiki/")?;
    let tail = &path[idx + "/wiki/".len()..];
    if tail.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(tail).ok()?;
    Some(decoded.replace('_', " "))
}

/// Extracts the canonical title from a `titles=…&redirects=1` response.
/// A page flagged `missing` yields `None`.
pub fn canonical_from_query(body: &serde_json::Value) -> Option<String> {
    let page = body.get("query")?.get("pages")?.as_object()?.values().next()?;
    if page.get("missing").is_some() {
        return None;
    }
    page.get("title")
        .and_then(|t| t.as_str())
        .map(|t| t.to_string())
}

/// Resolves a requested title against a confirmed wiki base.
///
/// Tries API redirect resolution first, then the HTTP HEAD-redirect
/// fallback, and finally echoes the normalized request with
/// `confident: false` so callers can tell best-effort from confirmed.
pub async fn canonicalize(
    lookup: &dyn TitleLookup,
    base: &WikiBase,
    requested: &str,
) -> TitleResolution {
    let normalized = normalize_shorthand(requested);

    if let Some(canonical) = lookup.query_canonical_title(base, &normalized).await {
        return TitleResolution {
            requested: requested.to_string(),
            normalized,
            canonical,
            confident: true,
        };
    }

    if let Some(canonical) = lookup.head_canonical_title(base, &normalized).await {
        tracing::debug!(%base, requested, %canonical, "canonical title via HEAD redirect");
        return TitleResolution {
            requested: requested.to_string(),
            normalized: normalized.clone(),
            canonical,
            confident: true,
        };
    }

    TitleResolution {
        requested: requested.to_string(),
        normalized: normalized.clone(),
        canonical: normalized,
        confident: false,
    }
}
