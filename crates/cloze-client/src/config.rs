//! Service configuration and factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use cloze_core::model::{Category, Difficulty, Filters};
use cloze_core::traits::{ExerciseService, DEFAULT_CARD_COUNT};

use crate::deck::DeckService;
use crate::http::{
    HttpExerciseService, DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS,
    DEFAULT_TIMEOUT_SECS,
};

/// Where cards come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServiceConfig {
    Http {
        #[serde(default = "default_base_url")]
        base_url: String,
        #[serde(default = "default_timeout")]
        timeout_secs: u64,
        #[serde(default = "default_retries")]
        max_retries: u32,
        #[serde(default = "default_retry_delay")]
        retry_delay_ms: u64,
    },
    Deck {
        path: PathBuf,
    },
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig::Http {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}
fn default_retry_delay() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}
fn default_category() -> String {
    Category::ALL.to_string()
}
fn default_batch() -> u32 {
    DEFAULT_CARD_COUNT
}

/// Top-level cloze configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClozeConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    /// Category for the first fetch of a session.
    #[serde(default = "default_category")]
    pub default_category: String,
    #[serde(default)]
    pub default_difficulty: Difficulty,
    /// Cards requested per fetch.
    #[serde(default = "default_batch")]
    pub cards_per_batch: u32,
}

impl Default for ClozeConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            default_category: default_category(),
            default_difficulty: Difficulty::default(),
            cards_per_batch: default_batch(),
        }
    }
}

impl ClozeConfig {
    /// Filters a new session starts with.
    pub fn filters(&self) -> Result<Filters> {
        let category: Category = self
            .default_category
            .parse()
            .map_err(|e: String| anyhow::anyhow!("invalid default_category: {e}"))?;
        Ok(Filters::new(category, self.default_difficulty))
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Substituted values are copied verbatim and never expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + len];
        out.push_str(&rest[..start]);
        out.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out
}

fn resolve_service_config(config: &ServiceConfig) -> ServiceConfig {
    match config {
        ServiceConfig::Http {
            base_url,
            timeout_secs,
            max_retries,
            retry_delay_ms,
        } => ServiceConfig::Http {
            base_url: resolve_env_vars(base_url),
            timeout_secs: *timeout_secs,
            max_retries: *max_retries,
            retry_delay_ms: *retry_delay_ms,
        },
        ServiceConfig::Deck { path } => ServiceConfig::Deck {
            path: PathBuf::from(resolve_env_vars(&path.to_string_lossy())),
        },
    }
}

/// Load configuration from `cloze.toml` or `~/.config/cloze/config.toml`.
pub fn load_config() -> Result<ClozeConfig> {
    load_config_from(None)
}

/// Load configuration from an explicit path, falling back to the default
/// locations when `path` is `None`.
pub fn load_config_from(path: Option<&Path>) -> Result<ClozeConfig> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => {
            let local = PathBuf::from("cloze.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|d| d.join("config.toml"))
                    .filter(|p| p.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ClozeConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ClozeConfig::default(),
    };

    config.service = resolve_service_config(&config.service);

    // Env override wins over the file, and switches a deck config to HTTP.
    if let Ok(url) = std::env::var("CLOZE_BASE_URL") {
        config.service = match config.service {
            ServiceConfig::Http {
                timeout_secs,
                max_retries,
                retry_delay_ms,
                ..
            } => ServiceConfig::Http {
                base_url: url,
                timeout_secs,
                max_retries,
                retry_delay_ms,
            },
            ServiceConfig::Deck { .. } => ServiceConfig::Http {
                base_url: url,
                timeout_secs: default_timeout(),
                max_retries: default_retries(),
                retry_delay_ms: default_retry_delay(),
            },
        };
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("cloze"))
}

/// Build the HTTP service. Fails when the config points at a deck.
pub fn http_service(config: &ClozeConfig) -> Result<HttpExerciseService> {
    match &config.service {
        ServiceConfig::Http {
            base_url,
            timeout_secs,
            max_retries,
            retry_delay_ms,
        } => Ok(HttpExerciseService::new(base_url, *timeout_secs)?
            .with_retries(*max_retries, Duration::from_millis(*retry_delay_ms))),
        ServiceConfig::Deck { path } => anyhow::bail!(
            "generating blanks needs an HTTP service, but the config uses deck {}",
            path.display()
        ),
    }
}

/// Create the configured exercise service. A deck path passed on the
/// command line takes priority over the config file.
pub fn create_service(
    config: &ClozeConfig,
    deck_override: Option<&Path>,
) -> Result<Arc<dyn ExerciseService>> {
    if let Some(path) = deck_override {
        return Ok(Arc::new(DeckService::from_path(path)?));
    }
    match &config.service {
        ServiceConfig::Deck { path } => Ok(Arc::new(DeckService::from_path(path)?)),
        ServiceConfig::Http { .. } => Ok(Arc::new(http_service(config)?)),
    }
}
