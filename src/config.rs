use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7480".to_string()
}

/// Settings consumed by the resolution engine. Passed in explicitly;
/// nothing in the engine reads the process environment.
#[derive(Debug, Deserialize, Clone)]
pub struct ResolverConfig {
    /// Hostname suffixes a wiki base may carry. Matched on label
    /// boundaries, so `fandom.com` does not admit `evilfandom.com`.
    #[serde(default = "default_allowed_suffixes")]
    pub allowed_suffixes: Vec<String>,
    /// Adds `wikipedia.org` to the allow-list (explicit overrides only —
    /// slugs never synthesize wikipedia hosts).
    #[serde(default)]
    pub include_wikipedia: bool,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Upper bound on every outbound request, probes included.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Base URL of the cross-wiki search hub used as a last resort.
    /// Empty string disables the hub fallback.
    #[serde(default = "default_hub_lookup")]
    pub hub_lookup: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            allowed_suffixes: default_allowed_suffixes(),
            include_wikipedia: false,
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            hub_lookup: default_hub_lookup(),
        }
    }
}

fn default_allowed_suffixes() -> Vec<String> {
    vec!["fandom.com".to_string(), "wiki.gg".to_string()]
}

fn default_user_agent() -> String {
    format!("wikibridge/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_hub_lookup() -> String {
    "https://community.fandom.com".to_string()
}

impl ResolverConfig {
    /// Effective allow-list, with `wikipedia.org` appended when enabled.
    pub fn effective_suffixes(&self) -> Vec<String> {
        let mut suffixes = self.allowed_suffixes.clone();
        if self.include_wikipedia && !suffixes.iter().any(|s| s == "wikipedia.org") {
            suffixes.push("wikipedia.org".to_string());
        }
        suffixes
    }
}

impl Config {
    /// A minimal default configuration for commands that can run without
    /// a config file on disk.
    pub fn minimal() -> Self {
        Config::default()
    }
}

/// Loads configuration from a TOML file. A missing file yields the
/// defaults so the binary works out of the box; a present-but-broken
/// file is an error.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::minimal());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.resolver.timeout_secs == 0 {
        anyhow::bail!("resolver.timeout_secs must be > 0");
    }

    if config.resolver.allowed_suffixes.is_empty() {
        anyhow::bail!("resolver.allowed_suffixes must not be empty");
    }

    Ok(config)
}
