//! # wikibridge CLI
//!
//! Runs the bridge server and offers the same operations as one-shot
//! commands for scripting and debugging.
//!
//! ## Usage
//!
//! ```bash
//! wikibridge --config ./wikibridge.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `wikibridge serve` | Start the HTTP bridge server |
//! | `wikibridge resolve "<topic>"` | Resolve a topic to a wiki base |
//! | `wikibridge search "<query>"` | Search a resolved wiki |
//! | `wikibridge page "<title>" --topic <topic>` | Fetch a page |
//!
//! ## Examples
//!
//! ```bash
//! # Which wiki hosts this topic?
//! wikibridge resolve "The Eminence in Shadow"
//!
//! # Search it
//! wikibridge search "Shadow Garden" --topic "The Eminence in Shadow"
//!
//! # Fetch a page against an explicit wiki
//! wikibridge page "Link" --wiki https://zelda.fandom.com
//!
//! # Run the HTTP bridge
//! wikibridge serve
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wikibridge::client::WikiClient;
use wikibridge::config;
use wikibridge::probe::HttpProber;
use wikibridge::resolve::Resolver;
use wikibridge::server;
use wikibridge::title::canonicalize;

/// wikibridge — resolve free-text topics to MediaWiki wikis and fetch
/// cleaned content from them.
#[derive(Parser, Debug)]
#[command(
    name = "wikibridge",
    about = "Bridge service for MediaWiki-based wikis (Fandom, wiki.gg, Wikipedia)",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Missing file means defaults.
    #[arg(long, global = true, default_value = "./wikibridge.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP bridge server.
    ///
    /// Binds to `[server].bind` and serves /health, /resolve, /search,
    /// and /page.
    Serve,

    /// Resolve a topic to a wiki base and print the result.
    Resolve {
        /// Free-text topic, e.g. "The Eminence in Shadow".
        topic: String,

        /// Explicit wiki base; skips guessing entirely.
        #[arg(long)]
        wiki: Option<String>,
    },

    /// Search a resolved wiki and print the hits.
    Search {
        /// The search query string.
        query: String,

        /// Topic used for wiki resolution; defaults to the query itself.
        #[arg(long)]
        topic: Option<String>,

        /// Explicit wiki base; skips guessing entirely.
        #[arg(long)]
        wiki: Option<String>,

        /// Maximum number of results (1–20).
        #[arg(long, default_value_t = 5)]
        limit: u32,
    },

    /// Fetch a page: canonicalize the title, then print the extract.
    ///
    /// Needs a resolution target: `--topic`, `--wiki`, or both.
    #[command(group(
        clap::ArgGroup::new("target")
            .required(true)
            .multiple(true)
            .args(["topic", "wiki"])
    ))]
    Page {
        /// Requested page title (episode shorthand accepted, e.g. "Episode 1").
        title: String,

        /// Topic used for wiki resolution.
        #[arg(long)]
        topic: Option<String>,

        /// Explicit wiki base; skips guessing entirely.
        #[arg(long)]
        wiki: Option<String>,

        /// Print the rendered page HTML instead of the plain extract.
        #[arg(long)]
        html: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,wikibridge=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Resolve { topic, wiki } => {
            let resolver = build_resolver(&cfg)?;
            let result = resolver.resolve(&topic, wiki.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Search {
            query,
            topic,
            wiki,
            limit,
        } => {
            let resolver = build_resolver(&cfg)?;
            let target = topic.as_deref().unwrap_or(&query);
            let resolved = resolver.resolve(target, wiki.as_deref()).await?;
            let client = WikiClient::new(&cfg.resolver)?;
            let hits = client
                .search_articles(&resolved.base, &query, limit.clamp(1, 20))
                .await?;
            println!("{} ({:?})", resolved.base, resolved.method);
            for hit in hits {
                println!("{:>10}  {}", hit.pageid, hit.title);
                if !hit.snippet.is_empty() {
                    println!("            {}", hit.snippet);
                }
            }
        }
        Commands::Page {
            title,
            topic,
            wiki,
            html,
        } => {
            let resolver = build_resolver(&cfg)?;
            let resolved = resolver
                .resolve(topic.as_deref().unwrap_or(""), wiki.as_deref())
                .await?;
            let client = WikiClient::new(&cfg.resolver)?;
            let resolution = canonicalize(&client, &resolved.base, &title).await;
            if html {
                let body = client.render_html(&resolved.base, &resolution.canonical).await?;
                println!("{body}");
            } else {
                let page = client.fetch_page(&resolved.base, &resolution.canonical).await?;
                println!("= {} ({})", page.title, resolved.base);
                if !resolution.confident {
                    println!("(title unresolved, best-effort lookup)");
                }
                if let Some(extract) = page.extract {
                    println!("\n{extract}");
                }
                if let Some(url) = page.url {
                    println!("\n{url}");
                }
            }
        }
    }

    Ok(())
}

fn build_resolver(cfg: &config::Config) -> Result<Resolver> {
    let prober = Arc::new(HttpProber::new(&cfg.resolver)?);
    Ok(Resolver::new(cfg.resolver.clone(), prober))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_requires_topic_or_wiki() {
        let err = Cli::try_parse_from(["wikibridge", "page", "Episode 1"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_page_accepts_topic_alone() {
        let cli =
            Cli::try_parse_from(["wikibridge", "page", "Episode 1", "--topic", "tensura"]).unwrap();
        assert!(matches!(cli.command, Commands::Page { .. }));
    }

    #[test]
    fn test_page_accepts_wiki_alone() {
        let cli = Cli::try_parse_from([
            "wikibridge",
            "page",
            "Link",
            "--wiki",
            "https://zelda.fandom.com",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Page { wiki: Some(_), .. }));
    }

    #[test]
    fn test_page_accepts_both_targets() {
        let cli = Cli::try_parse_from([
            "wikibridge",
            "page",
            "Link",
            "--topic",
            "zelda",
            "--wiki",
            "https://zelda.fandom.com",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Page {
                topic: Some(_),
                wiki: Some(_),
                ..
            }
        ));
    }
}
