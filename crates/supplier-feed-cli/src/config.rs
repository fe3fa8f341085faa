use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Catalog database path; defaults to the user cache directory.
    pub database: Option<PathBuf>,
    #[serde(default)]
    pub feeds: Vec<FeedEntry>,
}

/// A single named supplier feed.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedEntry {
    pub label: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(flatten)]
    pub feed_type: FeedType,
}

/// Where a feed's rows come from.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum FeedType {
    /// A CSV file on the local filesystem.
    #[serde(rename = "csv")]
    Csv {
        path: PathBuf,
        /// Suggested delimiter; the file's first line may override it.
        delimiter: Option<String>,
    },

    /// A JSON endpoint returning `{ "products": [...] }`.
    #[serde(rename = "api")]
    Api {
        url: String,
        /// Name of the environment variable holding the bearer token.
        token_env: Option<String>,
    },
}

fn default_true() -> bool {
    true
}

/// Environment variables that add a feed without a config file.
pub const CSV_PATH_ENV: &str = "SUPPLIER_CSV_PATH";
pub const API_URL_ENV: &str = "SUPPLIER_API_URL";
pub const API_TOKEN_ENV: &str = "SUPPLIER_API_TOKEN";

/// Feeds declared through the environment.
pub fn env_feeds(lookup: impl Fn(&str) -> Option<String>) -> Vec<FeedEntry> {
    let mut feeds = Vec::new();

    if let Some(path) = lookup(CSV_PATH_ENV).filter(|p| !p.is_empty()) {
        feeds.push(FeedEntry {
            label: "env-csv".into(),
            enabled: true,
            feed_type: FeedType::Csv {
                path: PathBuf::from(path),
                delimiter: None,
            },
        });
    }

    if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.is_empty()) {
        feeds.push(FeedEntry {
            label: "env-api".into(),
            enabled: true,
            feed_type: FeedType::Api {
                url,
                token_env: Some(API_TOKEN_ENV.into()),
            },
        });
    }

    feeds
}

/// Parse a delimiter given as a single ASCII character, `\t`, or `tab`.
pub fn parse_delimiter(raw: &str) -> Result<u8, String> {
    match raw {
        "\\t" | "tab" | "\t" => Ok(b'\t'),
        s if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        other => Err(format!(
            "delimiter must be a single ASCII character, got {other:?}"
        )),
    }
}

/// Config file path: `~/.config/supplier-feed/feeds.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("supplier-feed").join("feeds.toml"))
}

/// Load config from file (if any) and append feeds declared in the
/// environment. A malformed file is reported and ignored.
pub fn load_config() -> AppConfig {
    let mut config = AppConfig::default();

    if let Some(path) = config_path()
        && let Ok(contents) = std::fs::read_to_string(&path)
    {
        match toml::from_str::<AppConfig>(&contents) {
            Ok(parsed) => config = parsed,
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to parse config, ignoring it"
            ),
        }
    }

    config
        .feeds
        .extend(env_feeds(|key| std::env::var(key).ok()));
    config
}
