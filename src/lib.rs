//! # wikibridge
//!
//! A bridge service that accepts simplified topic/title/search queries
//! over HTTP and resolves them against MediaWiki-based wikis (Wikipedia,
//! Fandom, wiki.gg family sites), returning cleaned, normalized JSON or
//! HTML.
//!
//! The heart of the crate is the topic-to-wiki resolution engine: given a
//! free-text topic with no known wiki, it guesses which of potentially
//! thousands of independently hosted wikis carries that topic, validates
//! the guess against the live action API, and degrades gracefully across
//! candidate hosts and endpoint shapes.
//!
//! ## Architecture
//!
//! ```text
//! topic ──▶ slug candidates ──▶ host candidates ──▶ endpoint candidates
//!                │                    │                     │
//!                └────────────────────┴────────────▶ sequential probes
//!                                                          │
//!                        hub fallback ◀── exhausted ───────┤
//!                                                          ▼
//!                                                 ResolutionResult
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Structured error taxonomy |
//! | [`slug`] | Topic → subdomain slug candidates |
//! | [`wiki`] | Base URL normalization, allow-list, endpoint ordering |
//! | [`probe`] | Live endpoint probing and hub search |
//! | [`resolve`] | Resolution orchestrator |
//! | [`title`] | Title canonicalization |
//! | [`client`] | Action-API content client |
//! | [`server`] | HTTP bridge server |
//!
//! Everything is request-scoped: no caches, no persistence, no shared
//! mutable state across calls.

pub mod client;
pub mod config;
pub mod error;
pub mod probe;
pub mod resolve;
pub mod server;
pub mod slug;
pub mod title;
pub mod wiki;
