//! Resolution orchestrator: topic → confirmed wiki base.
//!
//! Builds the prioritized candidate sequence (slug × platform × endpoint)
//! and consumes it with a first-success combinator, then falls back to the
//! cross-wiki hub when every direct guess fails. Probing is strictly
//! sequential and short-circuits on the first live endpoint, so each
//! failed candidate costs at most one timeout.

use serde::Serialize;
use std::sync::Arc;

use crate::config::ResolverConfig;
use crate::error::BridgeError;
use crate::probe::Prober;
use crate::slug::slug_candidates;
use crate::wiki::{api_endpoints, host_allowed, host_candidates, normalize_explicit, normalize_wiki_url, WikiBase};

/// How a wiki base was established. Exposed to callers for
/// observability and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMethod {
    /// The caller supplied the wiki directly.
    Explicit,
    /// Guessed from a topic-derived slug and confirmed by a probe.
    Slug,
    /// Discovered via the platform-wide search hub.
    Hub,
}

/// A confirmed wiki base plus the method that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionResult {
    pub base: WikiBase,
    pub method: ResolutionMethod,
}

/// One probe target in the prioritized sequence.
#[derive(Debug, Clone)]
struct Candidate {
    base: WikiBase,
    api_url: String,
}

/// The resolution engine. Holds its configuration explicitly and probes
/// through the [`Prober`] seam; stateless across calls.
pub struct Resolver {
    config: ResolverConfig,
    prober: Arc<dyn Prober>,
}

impl Resolver {
    pub fn new(config: ResolverConfig, prober: Arc<dyn Prober>) -> Self {
        Self { config, prober }
    }

    /// Resolves a topic to a wiki base.
    ///
    /// With an explicit wiki the only work is normalization plus the
    /// allow-list check — zero probes are issued. Otherwise candidates
    /// are probed in priority order until one answers, and the hub
    /// fallback runs only after total exhaustion.
    ///
    /// # Errors
    ///
    /// [`BridgeError::InvalidWikiUrl`] / [`BridgeError::HostNotAllowed`]
    /// on a bad explicit override, [`BridgeError::EmptyTopic`] when the
    /// topic has no usable tokens, [`BridgeError::TopicNotResolved`] when
    /// nothing could be confirmed.
    pub async fn resolve(
        &self,
        topic: &str,
        explicit: Option<&str>,
    ) -> Result<ResolutionResult, BridgeError> {
        let suffixes = self.config.effective_suffixes();

        if let Some(raw) = explicit {
            let base = normalize_explicit(raw, &suffixes)?;
            tracing::debug!(%base, "explicit wiki accepted");
            return Ok(ResolutionResult {
                base,
                method: ResolutionMethod::Explicit,
            });
        }

        let slugs = slug_candidates(topic)?;
        tracing::debug!(topic, candidates = slugs.len(), "generated slugs");

        let candidates = host_candidates(&slugs, &suffixes)
            .into_iter()
            .flat_map(|base| {
                api_endpoints(&base).into_iter().map(move |api_url| Candidate {
                    base: base.clone(),
                    api_url,
                })
            });

        if let Some(hit) = self.first_live(candidates, topic).await {
            tracing::info!(base = %hit.base, "resolved via slug probe");
            return Ok(ResolutionResult {
                base: hit.base,
                method: ResolutionMethod::Slug,
            });
        }

        if let Some(base) = self.hub_fallback(topic, &suffixes).await {
            tracing::info!(%base, "resolved via hub fallback");
            return Ok(ResolutionResult {
                base,
                method: ResolutionMethod::Hub,
            });
        }

        tracing::debug!(topic, "all candidates exhausted");
        Err(BridgeError::TopicNotResolved(topic.to_string()))
    }

    /// First-success combinator over the candidate sequence. Probes one
    /// candidate at a time and stops at the first live endpoint.
    async fn first_live(
        &self,
        candidates: impl IntoIterator<Item = Candidate>,
        hint: &str,
    ) -> Option<Candidate> {
        for candidate in candidates {
            if self.prober.probe_search(&candidate.api_url, hint).await {
                return Some(candidate);
            }
        }
        None
    }

    /// Last-resort discovery through the platform-wide search hub. The
    /// first allow-listed hit wins. A siteinfo probe runs against it for
    /// observability — the hub index can point at dead wikis — but a
    /// failed probe only warns, it does not reject the hit.
    async fn hub_fallback(&self, topic: &str, suffixes: &[String]) -> Option<WikiBase> {
        for raw in self.prober.hub_search(topic).await {
            let base = match normalize_wiki_url(&raw) {
                Ok(b) => b,
                Err(_) => continue,
            };
            if !host_allowed(base.host(), suffixes) {
                tracing::debug!(%base, "hub hit outside allow-list");
                continue;
            }
            if let Some(api_url) = api_endpoints(&base).first() {
                if !self.prober.probe_siteinfo(api_url).await {
                    tracing::warn!(%base, "hub hit did not answer siteinfo probe");
                }
            }
            return Some(base);
        }
        None
    }
}
