//! HTTP exercise service.
//!
//! Talks to the card generation server: `POST /generate-cards`,
//! `POST /generate-blanks` and `GET /health`, all relative to the configured
//! base URL.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use cloze_core::error::ServiceError;
use cloze_core::model::{Card, Difficulty};
use cloze_core::traits::{ExerciseService, FetchRequest};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);
const DEFAULT_RATE_LIMIT_WAIT_SECS: u64 = 1;

/// Exercise service backed by the remote generation server.
pub struct HttpExerciseService {
    base_url: String,
    client: reqwest::Client,
    timeout_secs: u64,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpExerciseService {
    pub fn new(base_url: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        })
    }

    /// Retry transient failures up to `max_retries` times, doubling the
    /// delay after each attempt.
    pub fn with_retries(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the server to mask words in user-supplied text.
    #[instrument(skip(self, text))]
    pub async fn generate_blanks(
        &self,
        text: &str,
        difficulty: Difficulty,
        num_blanks: u32,
    ) -> anyhow::Result<GeneratedBlanks> {
        let body = BlanksRequest {
            text,
            difficulty,
            num_blanks,
        };
        let generated: GeneratedBlanks = self.post_json("generate-blanks", &body).await?;
        Ok(generated)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ServiceError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        let mut delay = self.retry_delay;
        let mut attempt = 0;

        loop {
            match self.post_once(&url, body).await {
                Ok(response) => return Ok(response),
                Err(err) if attempt < self.max_retries && !err.is_permanent() => {
                    attempt += 1;
                    let wait = err
                        .retry_after_ms()
                        .map(Duration::from_millis)
                        .unwrap_or(delay);
                    warn!(%url, attempt, error = %err, "request failed, retrying in {:?}", wait);
                    tokio::time::sleep(wait).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY);
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn post_once<B, R>(&self, url: &str, body: &B) -> Result<R, ServiceError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    ServiceError::NetworkError(format!(
                        "card server not reachable at {}. Is it running?",
                        self.base_url
                    ))
                } else {
                    ServiceError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_RATE_LIMIT_WAIT_SECS)
                * 1000;
            return Err(ServiceError::RateLimited {
                retry_after_ms: retry_after,
            });
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|e| e.detail)
                .unwrap_or(body);
            return Err(if status >= 500 {
                ServiceError::ApiError { status, message }
            } else {
                ServiceError::Rejected { status, message }
            });
        }

        response
            .json()
            .await
            .map_err(|e| ServiceError::MalformedResponse(format!("failed to parse response: {e}")))
    }
}

#[derive(Serialize)]
struct BlanksRequest<'a> {
    text: &'a str,
    difficulty: Difficulty,
    num_blanks: u32,
}

#[derive(Deserialize)]
struct CardsResponse {
    cards: Vec<Card>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
}

/// Result of masking user-supplied text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratedBlanks {
    #[serde(flatten)]
    pub card: Card,
    /// The masked words, when the server reports them.
    #[serde(default)]
    pub answers: Vec<String>,
}

#[async_trait]
impl ExerciseService for HttpExerciseService {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, request), fields(category = %request.category, difficulty = %request.difficulty, count = request.count))]
    async fn fetch_cards(&self, request: &FetchRequest) -> anyhow::Result<Vec<Card>> {
        let response: CardsResponse = self.post_json("generate-cards", request).await?;
        debug!(received = response.cards.len(), "fetched cards");
        Ok(response.cards)
    }

    async fn check_health(&self) -> bool {
        match self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "health check failed");
                false
            }
        }
    }
}
