//! HTTP profile source with caching.
//!
//! Fetches percentile payloads for players and teams from the scouting data
//! service. Payload bodies can be cached on disk so repeated comparisons of
//! the same entities do not hit the network.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::SourceConfig;
use crate::models::{EntityId, EntityKind, PercentilePayload};

/// Errors that can occur during fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rate limited by {host}, retry after {retry_after_secs}s")]
    RateLimited { host: String, retry_after_secs: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Content too large: {size} bytes (max {max_size})")]
    ContentTooLarge { size: usize, max_size: usize },

    #[error("Malformed payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Anything that can produce a percentile payload for an entity.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_payload(
        &self,
        kind: EntityKind,
        id: &EntityId,
    ) -> Result<PercentilePayload, FetchError>;
}

/// Metadata stored alongside cached payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub url: String,
    pub fetched_at: DateTime<Utc>,
    pub content_length: usize,
    pub etag: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub base_url: Url,

    /// Path templates with an `{id}` placeholder
    pub player_path: String,
    pub team_path: String,

    /// Directory to cache payloads; `None` disables caching
    pub cache_dir: Option<PathBuf>,

    /// How long cached payloads are considered fresh
    pub cache_ttl: Duration,

    pub max_content_size: usize,
    pub timeout: Duration,
    pub user_agent: String,
}

impl FetcherConfig {
    pub fn from_source(source: &SourceConfig) -> Result<Self, FetchError> {
        let base_url = Url::parse(&source.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", source.base_url, e)))?;
        let cache_ttl = crate::parse_duration(&source.cache_ttl).unwrap_or(Duration::from_secs(3600));

        Ok(Self {
            base_url,
            player_path: source.player_path.clone(),
            team_path: source.team_path.clone(),
            cache_dir: source.cache_dir.clone(),
            cache_ttl,
            max_content_size: source.max_content_size,
            timeout: Duration::from_secs(source.timeout_seconds),
            user_agent: source.user_agent.clone(),
        })
    }
}

/// HTTP payload fetcher with optional local caching.
pub struct Fetcher {
    client: Client,
    config: FetcherConfig,
}

impl Fetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("scout-compare")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Payload URL for an entity.
    pub fn url_for(&self, kind: EntityKind, id: &EntityId) -> Result<Url, FetchError> {
        if id.is_empty() {
            return Err(FetchError::InvalidUrl("empty entity id".to_string()));
        }
        let template = match kind {
            EntityKind::Player => &self.config.player_path,
            EntityKind::Team => &self.config.team_path,
        };
        let encoded: String = url::form_urlencoded::byte_serialize(id.as_str().as_bytes()).collect();
        let path = template.replace("{id}", &encoded);

        self.config
            .base_url
            .join(&path)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Fetch a payload, using the cache if available and fresh.
    pub async fn fetch(&self, url: &Url) -> Result<PercentilePayload, FetchError> {
        if let Some(body) = self.check_cache(url).await? {
            match serde_json::from_slice(&body) {
                Ok(payload) => return Ok(payload),
                Err(e) => warn!("Discarding unreadable cache entry for {}: {}", url, e),
            }
        }
        self.fetch_and_cache(url).await
    }

    /// Read a fresh cached body, if any.
    async fn check_cache(&self, url: &Url) -> Result<Option<Vec<u8>>, FetchError> {
        let Some((cache_path, meta_path)) = self.cache_paths(url) else {
            return Ok(None);
        };
        if !cache_path.exists() || !meta_path.exists() {
            return Ok(None);
        }

        let meta_content = fs::read_to_string(&meta_path).await?;
        let meta: CacheMetadata = match serde_json::from_str(&meta_content) {
            Ok(m) => m,
            Err(_) => return Ok(None),
        };

        // Check if cache has expired
        let age = Utc::now().signed_duration_since(meta.fetched_at);
        if age.num_seconds() > i64::try_from(self.config.cache_ttl.as_secs()).unwrap_or(i64::MAX) {
            debug!("Cache expired for {}", url);
            return Ok(None);
        }

        debug!("Serving {} from cache", url);
        Ok(Some(fs::read(&cache_path).await?))
    }

    /// Fetch from network, parse, and cache the body.
    async fn fetch_and_cache(&self, url: &Url) -> Result<PercentilePayload, FetchError> {
        info!("Fetching {}", url);

        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(FetchError::RateLimited {
                host: url.host_str().unwrap_or("unknown").to_string(),
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let etag = response
            .headers()
            .get("etag")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let content = response.bytes().await?;

        if content.len() > self.config.max_content_size {
            return Err(FetchError::ContentTooLarge {
                size: content.len(),
                max_size: self.config.max_content_size,
            });
        }

        // Parse before caching so malformed bodies are never served again
        let payload: PercentilePayload = serde_json::from_slice(&content)?;

        if let Some((cache_path, meta_path)) = self.cache_paths(url) {
            self.write_cache(url, &content, etag, &cache_path, &meta_path)
                .await?;
        }

        Ok(payload)
    }

    async fn write_cache(
        &self,
        url: &Url,
        content: &[u8],
        etag: Option<String>,
        cache_path: &Path,
        meta_path: &Path,
    ) -> Result<(), FetchError> {
        if let Some(parent) = cache_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(cache_path).await?;
        file.write_all(content).await?;
        file.flush().await?;

        let fetched_at = Utc::now();
        let meta = CacheMetadata {
            url: url.to_string(),
            fetched_at,
            content_length: content.len(),
            etag,
            expires_at: chrono::Duration::from_std(self.config.cache_ttl)
                .ok()
                .and_then(|ttl| fetched_at.checked_add_signed(ttl)),
        };

        let meta_json = serde_json::to_string_pretty(&meta)?;
        fs::write(meta_path, meta_json).await?;
        Ok(())
    }

    /// Body and metadata paths for a URL, when caching is enabled.
    fn cache_paths(&self, url: &Url) -> Option<(PathBuf, PathBuf)> {
        let dir = self.config.cache_dir.as_ref()?;
        let hash = Self::url_hash(url);
        let host = url.host_str().unwrap_or("unknown");
        let base = dir.join(host);
        Some((
            base.join(format!("{}.json", hash)),
            base.join(format!("{}.meta.json", hash)),
        ))
    }

    /// Hash a URL to a short string.
    fn url_hash(url: &Url) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_str().as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..8])
    }
}

#[async_trait]
impl ProfileSource for Fetcher {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_payload(
        &self,
        kind: EntityKind,
        id: &EntityId,
    ) -> Result<PercentilePayload, FetchError> {
        let url = self.url_for(kind, id)?;
        self.fetch(&url).await
    }
}
