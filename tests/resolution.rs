//! End-to-end tests for the resolution orchestrator.
//!
//! These drive `Resolver` through a scripted [`Prober`] fake, proving the
//! candidate ordering, short-circuiting, allow-list enforcement, and hub
//! fallback semantics without any network traffic.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use wikibridge::config::ResolverConfig;
use wikibridge::error::BridgeError;
use wikibridge::probe::Prober;
use wikibridge::resolve::{ResolutionMethod, Resolver};

// ─── Scripted Prober ────────────────────────────────────────────────

/// Every call the fake saw, in order.
#[derive(Debug, Clone, PartialEq)]
enum Call {
    Search { api_url: String, hint: String },
    Siteinfo { api_url: String },
    Hub { topic: String },
}

/// A prober whose answers are fixed up front and which records every
/// call it receives.
struct ScriptedProber {
    /// API URLs whose search probe succeeds.
    live_search: Vec<String>,
    /// API URLs whose siteinfo probe succeeds.
    live_siteinfo: Vec<String>,
    /// Raw URLs the hub returns.
    hub_hits: Vec<String>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedProber {
    fn new(live_search: &[&str], live_siteinfo: &[&str], hub_hits: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            live_search: live_search.iter().map(|s| s.to_string()).collect(),
            live_siteinfo: live_siteinfo.iter().map(|s| s.to_string()).collect(),
            hub_hits: hub_hits.iter().map(|s| s.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn search_call_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Search { .. }))
            .count()
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe_search(&self, api_url: &str, hint: &str) -> bool {
        self.calls.lock().unwrap().push(Call::Search {
            api_url: api_url.to_string(),
            hint: hint.to_string(),
        });
        self.live_search.iter().any(|u| u == api_url)
    }

    async fn probe_siteinfo(&self, api_url: &str) -> bool {
        self.calls.lock().unwrap().push(Call::Siteinfo {
            api_url: api_url.to_string(),
        });
        self.live_siteinfo.iter().any(|u| u == api_url)
    }

    async fn hub_search(&self, topic: &str) -> Vec<String> {
        self.calls.lock().unwrap().push(Call::Hub {
            topic: topic.to_string(),
        });
        self.hub_hits.clone()
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

fn resolver_with(prober: Arc<ScriptedProber>) -> Resolver {
    Resolver::new(ResolverConfig::default(), prober)
}

fn resolver_with_wikipedia(prober: Arc<ScriptedProber>) -> Resolver {
    let config = ResolverConfig {
        include_wikipedia: true,
        ..ResolverConfig::default()
    };
    Resolver::new(config, prober)
}

// ─── Explicit path ──────────────────────────────────────────────────

#[tokio::test]
async fn explicit_wiki_is_normalized_and_never_probed() {
    let prober = ScriptedProber::new(&[], &[], &[]);
    let resolver = resolver_with_wikipedia(prober.clone());

    let result = resolver
        .resolve("ignored", Some("https://en.wikipedia.org/wiki/Foo"))
        .await
        .unwrap();

    assert_eq!(result.base.as_str(), "https://en.wikipedia.org");
    assert_eq!(result.method, ResolutionMethod::Explicit);
    assert!(prober.calls().is_empty(), "explicit path must not probe");
}

#[tokio::test]
async fn explicit_wiki_outside_allow_list_fails_with_zero_probes() {
    let prober = ScriptedProber::new(&[], &[], &[]);
    let resolver = resolver_with(prober.clone());

    let err = resolver
        .resolve("ignored", Some("https://notawiki.example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::HostNotAllowed(_)));
    assert_eq!(err.http_status(), 403);
    assert!(prober.calls().is_empty());
}

#[tokio::test]
async fn explicit_wiki_with_bad_scheme_is_rejected() {
    let prober = ScriptedProber::new(&[], &[], &[]);
    let resolver = resolver_with(prober.clone());

    let err = resolver
        .resolve("ignored", Some("ftp://zelda.fandom.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::InvalidWikiUrl(_)));
    assert!(prober.calls().is_empty());
}

// ─── Slug path ──────────────────────────────────────────────────────

#[tokio::test]
async fn first_slug_candidate_resolves_on_first_probe() {
    let prober = ScriptedProber::new(&["https://eminenceshadow.fandom.com/api.php"], &[], &[]);
    let resolver = resolver_with(prober.clone());

    let result = resolver
        .resolve("The Eminence in Shadow", None)
        .await
        .unwrap();

    assert_eq!(result.base.as_str(), "https://eminenceshadow.fandom.com");
    assert_eq!(result.method, ResolutionMethod::Slug);

    // Short-circuit: the very first probe hit, so exactly one was made,
    // and it carried the full topic as the search hint.
    let calls = prober.calls();
    assert_eq!(
        calls,
        vec![Call::Search {
            api_url: "https://eminenceshadow.fandom.com/api.php".to_string(),
            hint: "The Eminence in Shadow".to_string(),
        }]
    );
}

#[tokio::test]
async fn probing_stops_at_the_first_success() {
    // Third candidate in priority order is the live one:
    // 1. eminenceshadow.fandom.com/api.php
    // 2. eminenceshadow.fandom.com/w/api.php
    // 3. eminenceshadow.wiki.gg/w/api.php
    let prober = ScriptedProber::new(&["https://eminenceshadow.wiki.gg/w/api.php"], &[], &[]);
    let resolver = resolver_with(prober.clone());

    let result = resolver
        .resolve("The Eminence in Shadow", None)
        .await
        .unwrap();

    assert_eq!(result.base.as_str(), "https://eminenceshadow.wiki.gg");
    assert_eq!(prober.search_call_count(), 3);
}

#[tokio::test]
async fn candidate_order_is_slug_major_with_platform_endpoint_nesting() {
    let prober = ScriptedProber::new(&[], &[], &[]);
    let resolver = resolver_with(prober.clone());

    let _ = resolver.resolve("Hollow Knight", None).await;

    let probed: Vec<String> = prober
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Search { api_url, .. } => Some(api_url),
            _ => None,
        })
        .collect();

    // First slug tries both platforms (with their endpoint ordering)
    // before the next slug is considered.
    assert_eq!(
        &probed[..4],
        &[
            "https://hollowknight.fandom.com/api.php".to_string(),
            "https://hollowknight.fandom.com/w/api.php".to_string(),
            "https://hollowknight.wiki.gg/w/api.php".to_string(),
            "https://hollowknight.wiki.gg/api.php".to_string(),
        ]
    );
}

#[tokio::test]
async fn roman_numeral_variant_is_probed_before_exhaustion() {
    let prober = ScriptedProber::new(&[], &[], &[]);
    let resolver = resolver_with(prober.clone());

    let err = resolver.resolve("Re:Zero III", None).await.unwrap_err();
    assert!(matches!(err, BridgeError::TopicNotResolved(_)));

    let probed_rezero = prober.calls().iter().any(|c| {
        matches!(c, Call::Search { api_url, .. } if api_url == "https://rezero.fandom.com/api.php")
    });
    assert!(probed_rezero, "rezero candidate was never probed");
}

// ─── Hub fallback ───────────────────────────────────────────────────

#[tokio::test]
async fn hub_fallback_runs_only_after_direct_guesses_are_exhausted() {
    let prober = ScriptedProber::new(
        &[],
        &["https://zelda.fandom.com/api.php"],
        &["https://zelda.fandom.com/wiki/Main_Page"],
    );
    let resolver = resolver_with(prober.clone());

    let result = resolver.resolve("Zelda", None).await.unwrap();
    assert_eq!(result.base.as_str(), "https://zelda.fandom.com");
    assert_eq!(result.method, ResolutionMethod::Hub);

    // The hub call comes after every search probe.
    let calls = prober.calls();
    let hub_pos = calls
        .iter()
        .position(|c| matches!(c, Call::Hub { .. }))
        .unwrap();
    let last_search = calls
        .iter()
        .rposition(|c| matches!(c, Call::Search { .. }))
        .unwrap();
    assert!(hub_pos > last_search);
}

#[tokio::test]
async fn hub_hits_outside_allow_list_are_skipped() {
    let prober = ScriptedProber::new(
        &[],
        &["https://zelda.fandom.com/api.php"],
        &[
            "https://zelda.miraheze.org/",
            "not a url at all",
            "https://zelda.fandom.com/",
        ],
    );
    let resolver = resolver_with(prober.clone());

    let result = resolver.resolve("Zelda", None).await.unwrap();
    assert_eq!(result.base.as_str(), "https://zelda.fandom.com");

    // The unlisted host never received a siteinfo probe.
    let probed_miraheze = prober.calls().iter().any(|c| {
        matches!(c, Call::Siteinfo { api_url } if api_url.contains("miraheze"))
    });
    assert!(!probed_miraheze);
}

#[tokio::test]
async fn allow_listed_hub_hit_resolves_even_when_its_probe_fails() {
    // The siteinfo probe on a hub hit is advisory: a slow or flaky wiki
    // behind an allow-listed hub entry still resolves.
    let prober = ScriptedProber::new(&[], &[], &["https://zelda.fandom.com/"]);
    let resolver = resolver_with(prober.clone());

    let result = resolver.resolve("Zelda", None).await.unwrap();
    assert_eq!(result.base.as_str(), "https://zelda.fandom.com");
    assert_eq!(result.method, ResolutionMethod::Hub);
}

#[tokio::test]
async fn exhaustion_including_hub_yields_topic_not_resolved() {
    let prober = ScriptedProber::new(&[], &[], &["https://somewhere.example.net/"]);
    let resolver = resolver_with(prober.clone());

    let err = resolver.resolve("Some Unknown Show", None).await.unwrap_err();
    assert!(matches!(err, BridgeError::TopicNotResolved(_)));
    assert_eq!(err.http_status(), 404);
    assert_eq!(err.code(), "not_found");
}

// ─── Properties ─────────────────────────────────────────────────────

#[tokio::test]
async fn resolution_is_idempotent_for_fixed_probe_outcomes() {
    let prober = ScriptedProber::new(&["https://hollowknight.wiki.gg/w/api.php"], &[], &[]);
    let resolver = resolver_with(prober.clone());

    let first = resolver.resolve("Hollow Knight", None).await.unwrap();
    let second = resolver.resolve("Hollow Knight", None).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn empty_topic_fails_without_probing() {
    let prober = ScriptedProber::new(&[], &[], &[]);
    let resolver = resolver_with(prober.clone());

    let err = resolver.resolve("  !!! ", None).await.unwrap_err();
    assert!(matches!(err, BridgeError::EmptyTopic));
    assert!(prober.calls().is_empty());
}
