//! Wiki base URLs: normalization, allow-listing, candidate synthesis,
//! and the per-platform action-API endpoint ordering.

use serde::Serialize;
use url::Url;

use crate::error::BridgeError;

/// A normalized `scheme://hostname` wiki root. No path, no trailing
/// slash, no port unless one was given explicitly. Two bases are equal
/// iff their normalized strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct WikiBase(String);

impl WikiBase {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The lowercase hostname portion of the base.
    pub fn host(&self) -> &str {
        let rest = self
            .0
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.0);
        rest.split(':').next().unwrap_or(rest)
    }
}

impl std::fmt::Display for WikiBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The wiki-hosting platform a hostname belongs to. Drives endpoint
/// ordering; unknown hosts get the wiki.gg-style ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Fandom,
    WikiGg,
    Wikipedia,
    Other,
}

impl Platform {
    pub fn of(host: &str) -> Platform {
        if host_matches_suffix(host, "fandom.com") {
            Platform::Fandom
        } else if host_matches_suffix(host, "wiki.gg") {
            Platform::WikiGg
        } else if host_matches_suffix(host, "wikipedia.org") {
            Platform::Wikipedia
        } else {
            Platform::Other
        }
    }
}

/// Suffix match on label boundaries: `fandom.com` admits `x.fandom.com`
/// and `fandom.com` itself, never `evilfandom.com`.
fn host_matches_suffix(host: &str, suffix: &str) -> bool {
    host == suffix || host.ends_with(&format!(".{suffix}"))
}

/// Whether a hostname ends with any allow-listed suffix.
pub fn host_allowed(host: &str, suffixes: &[String]) -> bool {
    suffixes.iter().any(|s| host_matches_suffix(host, s))
}

/// Normalizes a caller-supplied wiki URL into a [`WikiBase`].
///
/// Requires both scheme and hostname; only http/https pass. Path, query,
/// and fragment are discarded; an explicit port is kept. Does not check
/// the allow-list — see [`normalize_explicit`] for the full explicit path.
pub fn normalize_wiki_url(raw: &str) -> Result<WikiBase, BridgeError> {
    // WHATWG parsing is forgiving about authority slashes: "https:///x"
    // and "https:/x" both come back with host "x". An explicit override
    // must spell out scheme://host, so check the authority ourselves.
    let authority_ok = raw
        .split_once("://")
        .map(|(_, rest)| !rest.is_empty() && !rest.starts_with('/'))
        .unwrap_or(false);
    if !authority_ok {
        return Err(BridgeError::InvalidWikiUrl(raw.to_string()));
    }

    let parsed = Url::parse(raw).map_err(|_| BridgeError::InvalidWikiUrl(raw.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        _ => return Err(BridgeError::InvalidWikiUrl(raw.to_string())),
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| BridgeError::InvalidWikiUrl(raw.to_string()))?
        .to_lowercase();

    let base = match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    };

    Ok(WikiBase(base))
}

/// Normalizes an explicit wiki override and enforces the allow-list.
pub fn normalize_explicit(raw: &str, suffixes: &[String]) -> Result<WikiBase, BridgeError> {
    let base = normalize_wiki_url(raw)?;
    if !host_allowed(base.host(), suffixes) {
        return Err(BridgeError::HostNotAllowed(base.host().to_string()));
    }
    Ok(base)
}

/// Expands slugs into base candidates, slug-major: each slug tries both
/// hosting platforms before the next slug is considered. Deduplicated,
/// filtered by the allow-list.
pub fn host_candidates(slugs: &[String], suffixes: &[String]) -> Vec<WikiBase> {
    let mut out: Vec<WikiBase> = Vec::new();
    for slug in slugs {
        for platform in ["fandom.com", "wiki.gg"] {
            let base = WikiBase(format!("https://{slug}.{platform}"));
            if host_allowed(base.host(), suffixes) && !out.contains(&base) {
                out.push(base);
            }
        }
    }
    out
}

/// The ordered action-API endpoints to try for a base, primary first.
///
/// Fandom serves its API at the root; wiki.gg and unrecognized MediaWiki
/// installs usually sit under `/w/`; Wikipedia only has `/w/api.php`.
/// This ordering mirrors observed deployments and keeps the cheaper guess
/// first, so it must not be rearranged.
pub fn api_endpoints(base: &WikiBase) -> Vec<String> {
    match Platform::of(base.host()) {
        Platform::Fandom => vec![
            format!("{base}/api.php"),
            format!("{base}/w/api.php"),
        ],
        Platform::Wikipedia => vec![format!("{base}/w/api.php")],
        Platform::WikiGg | Platform::Other => vec![
            format!("{base}/w/api.php"),
            format!("{base}/api.php"),
        ],
    }
}
