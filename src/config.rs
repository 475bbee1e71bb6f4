// src/config.rs
//! Search configuration: TOML file + env overrides, and the API key file.

use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::ranking::{BayesianPrior, QualityFilter};

// --- env defaults & names ---
pub const DEFAULT_CONFIG_PATH: &str = "config/places.toml";
pub const DEFAULT_API_BASE: &str = "https://maps.googleapis.com/maps/api/place";
pub const DEFAULT_API_KEY_PATH: &str = "api_key.txt";
pub const DEFAULT_MIN_RATING: f64 = 4.0;
pub const DEFAULT_MIN_REVIEWS: u32 = 50;

pub const ENV_CONFIG_PATH: &str = "PLACES_CONFIG_PATH";
pub const ENV_API_BASE: &str = "PLACES_API_BASE";
pub const ENV_API_KEY_PATH: &str = "PLACES_API_KEY_PATH";
pub const ENV_MIN_RATING: &str = "PLACES_MIN_RATING";
pub const ENV_MIN_REVIEWS: &str = "PLACES_MIN_REVIEWS";

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}
fn default_api_key_path() -> PathBuf {
    PathBuf::from(DEFAULT_API_KEY_PATH)
}
fn default_connect_timeout_secs() -> u64 {
    4
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_page_token_delay_ms() -> u64 {
    2000
}
fn default_min_rating() -> f64 {
    DEFAULT_MIN_RATING
}
fn default_min_reviews() -> u32 {
    DEFAULT_MIN_REVIEWS
}
fn default_index_path() -> PathBuf {
    PathBuf::from("templates/index.html")
}
fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamSection {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_api_key_path")]
    pub api_key_path: PathBuf,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Wait before asking for a follow-up page; the upstream token is not
    /// valid immediately after it is issued.
    #[serde(default = "default_page_token_delay_ms")]
    pub page_token_delay_ms: u64,
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key_path: default_api_key_path(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            page_token_delay_ms: default_page_token_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterSection {
    #[serde(default = "default_min_rating")]
    pub min_rating: f64,
    #[serde(default = "default_min_reviews")]
    pub min_reviews: u32,
}

impl Default for FilterSection {
    fn default() -> Self {
        Self {
            min_rating: default_min_rating(),
            min_reviews: default_min_reviews(),
        }
    }
}

/// Both fields optional; missing ones follow `[filter]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankingSection {
    pub prior_weight: Option<f64>,
    pub baseline_rating: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebSection {
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for WebSection {
    fn default() -> Self {
        Self {
            index_path: default_index_path(),
            static_dir: default_static_dir(),
        }
    }
}

/// Everything the search path needs, passed explicitly (no globals).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub upstream: UpstreamSection,
    #[serde(default)]
    pub filter: FilterSection,
    #[serde(default)]
    pub ranking: RankingSection,
    #[serde(default)]
    pub web: WebSection,
}

impl SearchConfig {
    /// Load from `$PLACES_CONFIG_PATH` (or `config/places.toml`), then apply env overrides.
    /// A missing file is not an error: built-in defaults are used.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let mut cfg = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading places config from {}", path.display()))?;
            Self::from_toml_str(&content)
                .with_context(|| format!("parsing places config at {}", path.display()))?
        } else {
            info!(path = %path.display(), "no places config file, using defaults");
            Self::default()
        };
        cfg.apply_env_overrides();
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let mut cfg: SearchConfig = toml::from_str(s)?;
        cfg.sanitize();
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(base) = std::env::var(ENV_API_BASE) {
            if !base.trim().is_empty() {
                self.upstream.api_base = base.trim().to_string();
            }
        }
        if let Ok(p) = std::env::var(ENV_API_KEY_PATH) {
            if !p.trim().is_empty() {
                self.upstream.api_key_path = PathBuf::from(p.trim());
            }
        }
        if let Some(r) = parse_env::<f64>(ENV_MIN_RATING) {
            self.filter.min_rating = r.clamp(0.0, 5.0);
        }
        if let Some(n) = parse_env::<u32>(ENV_MIN_REVIEWS) {
            self.filter.min_reviews = n;
        }
    }

    fn sanitize(&mut self) {
        if !self.filter.min_rating.is_finite() || self.filter.min_rating < 0.0 {
            self.filter.min_rating = DEFAULT_MIN_RATING;
        }
        if matches!(self.ranking.prior_weight, Some(m) if !m.is_finite() || m < 0.0) {
            self.ranking.prior_weight = None;
        }
        if matches!(self.ranking.baseline_rating, Some(c) if !c.is_finite() || c < 0.0) {
            self.ranking.baseline_rating = None;
        }
        self.upstream.api_base = self.upstream.api_base.trim_end_matches('/').to_string();
    }

    pub fn quality_filter(&self) -> QualityFilter {
        QualityFilter::new(self.filter.min_rating, self.filter.min_reviews)
    }

    /// `m` defaults to the review threshold and `C` to the rating threshold.
    pub fn prior(&self) -> BayesianPrior {
        BayesianPrior::new(
            self.ranking
                .prior_weight
                .unwrap_or(f64::from(self.filter.min_reviews)),
            self.ranking
                .baseline_rating
                .unwrap_or(self.filter.min_rating),
        )
    }

    pub fn page_token_delay(&self) -> Duration {
        Duration::from_millis(self.upstream.page_token_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.request_timeout_secs)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(var = name, value = %raw, "ignoring unparseable env override");
            None
        }
    }
}

/// The places API key, read from a raw text file.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading API key from {}", path.display()))?;
        Self::new(raw)
    }

    pub fn new(raw: impl Into<String>) -> anyhow::Result<Self> {
        let raw = raw.into();
        let key = raw.trim();
        if key.is_empty() {
            return Err(anyhow!("API key is empty"));
        }
        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Never print the key itself.
impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(len={})", self.0.len())
    }
}
