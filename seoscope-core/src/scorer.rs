// Authority scorers: Open PageRank and the explicit synthetic mode

use crate::error::ScoreError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const OPEN_PAGERANK_URL: &str = "https://openpagerank.com";

/// External ranking lookup returning a raw decimal (nominally 0-10).
#[async_trait]
pub trait AuthorityScorer: Send + Sync {
    async fn score(&self, domain: &str) -> Result<f64, ScoreError>;

    /// Scores from this source are labeled as synthetic in reports.
    fn is_synthetic(&self) -> bool {
        false
    }
}

pub struct OpenPageRankClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenPageRankClient {
    pub fn new(api_key: impl Into<String>, timeout_secs: u64) -> Result<Self, ScoreError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ScoreError::MissingCredential);
        }

        let client = Client::builder()
            .user_agent("seoscope/0.1 (https://github.com/trapdoorsec/seoscope)")
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: OPEN_PAGERANK_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl AuthorityScorer for OpenPageRankClient {
    async fn score(&self, domain: &str) -> Result<f64, ScoreError> {
        let url = format!("{}/api/v1.0/getPageRank", self.base_url);
        debug!("Requesting Open PageRank score for {}", domain);

        let response = self
            .client
            .get(&url)
            .header("API-OPR", &self.api_key)
            .query(&[("domains[]", domain)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoreError::Upstream {
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ScoreError::MalformedResponse(e.to_string()))?;

        parse_page_rank(&body)
    }
}

/// Pull the decimal rank out of a `getPageRank` response body.
///
/// `page_rank_decimal` wins over `page_rank`; either may be a number or a
/// numeric string. An entry with neither scores 0.
pub fn parse_page_rank(body: &Value) -> Result<f64, ScoreError> {
    let item = body
        .get("response")
        .and_then(|r| r.get(0))
        .ok_or_else(|| ScoreError::MalformedResponse("missing response[0]".to_string()))?;

    let rank = ["page_rank_decimal", "page_rank"]
        .iter()
        .filter_map(|key| item.get(*key))
        .find_map(as_decimal);

    match rank {
        Some(value) => Ok(value),
        None => {
            debug!("No rank fields in scorer entry, scoring 0");
            Ok(0.0)
        }
    }
}

fn as_decimal(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Demo scorer: a stable pseudo-score in [2.0, 6.0) derived from the domain.
#[derive(Debug, Default, Clone)]
pub struct SyntheticScorer;

impl SyntheticScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score_for(domain: &str) -> f64 {
        // FNV-1a
        let hash = domain.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |acc, b| {
            (acc ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
        });
        2.0 + (hash % 40) as f64 / 10.0
    }
}

#[async_trait]
impl AuthorityScorer for SyntheticScorer {
    async fn score(&self, domain: &str) -> Result<f64, ScoreError> {
        Ok(Self::score_for(domain))
    }

    fn is_synthetic(&self) -> bool {
        true
    }
}
