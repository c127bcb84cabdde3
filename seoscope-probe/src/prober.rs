use crate::error::{ProbeError, Result};
use crate::result::ProbeReport;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use reqwest::header::{DATE, HeaderMap};
use std::time::Duration;
use tracing::{debug, warn};

const SECONDS_PER_YEAR: i64 = 365 * 24 * 60 * 60;

/// Upper bound on how much of a homepage is read for the meta robots check.
pub const MAX_BODY_BYTES: usize = 512 * 1024;

/// Anything able to produce a [`ProbeReport`] for a canonical domain.
///
/// Implementations must never fail: transport problems degrade into the
/// conservative defaults of the report.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn probe(&self, domain: &str) -> ProbeReport;
}

pub struct Prober {
    /// Redirects disabled, used to observe the first hop.
    direct: Client,
    /// Redirects followed, used for indexability and the `Date` header.
    following: Client,
    scheme: String,
}

impl Prober {
    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let direct = Self::client_builder(timeout_secs)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        let following = Self::client_builder(timeout_secs)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            direct,
            following,
            scheme: "https".to_string(),
        })
    }

    fn client_builder(timeout_secs: u64) -> reqwest::ClientBuilder {
        Client::builder()
            .user_agent("seoscope/0.1 (https://github.com/trapdoorsec/seoscope)")
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs((timeout_secs / 2).max(1)))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
    }

    /// Probe over another scheme. Production traffic always uses `https`.
    pub fn with_scheme(mut self, scheme: &str) -> Self {
        self.scheme = scheme.to_string();
        self
    }

    fn target(&self, domain: &str) -> Result<String> {
        if domain.is_empty() || domain.contains('/') {
            return Err(ProbeError::InvalidTarget(domain.to_string()));
        }
        Ok(format!("{}://{}/", self.scheme, domain))
    }

    /// Run all three probes concurrently and join their outcomes.
    pub async fn run(&self, domain: &str) -> ProbeReport {
        debug!("Probing {}", domain);

        let (first_hop, indexable, domain_age) = tokio::join!(
            self.check_first_hop(domain),
            self.check_indexable(domain),
            self.check_age(domain),
        );

        let mut report = ProbeReport::new(domain.to_string());
        report.https = first_hop.is_some();
        report.redirected = first_hop.unwrap_or(false);
        report.indexable = indexable;
        report.domain_age = domain_age;

        debug!(
            "Probe of {} finished: https={} redirected={} indexable={} age={:?}",
            domain, report.https, report.redirected, report.indexable, report.domain_age
        );
        report
    }

    /// `Some(redirected)` when the site answered, `None` on transport failure.
    pub async fn check_first_hop(&self, domain: &str) -> Option<bool> {
        match self.fetch_first_hop(domain).await {
            Ok(redirected) => Some(redirected),
            Err(e) => {
                warn!("HTTPS probe failed for {}: {}", domain, e);
                None
            }
        }
    }

    async fn fetch_first_hop(&self, domain: &str) -> Result<bool> {
        let url = self.target(domain)?;
        let response = self.direct.get(&url).send().await?;
        Ok(response.status().is_redirection())
    }

    /// Fails closed: any error means "not indexable".
    pub async fn check_indexable(&self, domain: &str) -> bool {
        match self.fetch_indexable(domain).await {
            Ok(indexable) => indexable,
            Err(e) => {
                warn!("Indexability probe failed for {}: {}", domain, e);
                false
            }
        }
    }

    async fn fetch_indexable(&self, domain: &str) -> Result<bool> {
        let url = self.target(domain)?;
        let response = self.following.get(&url).send().await?;

        if !response.status().is_success() {
            debug!("{} answered {}, not indexable", url, response.status());
            return Ok(false);
        }

        if robots_header_noindex(response.headers()) {
            return Ok(false);
        }

        let body = read_capped(response, MAX_BODY_BYTES).await?;
        Ok(!meta_robots_noindex(&String::from_utf8_lossy(&body)))
    }

    pub async fn check_age(&self, domain: &str) -> Option<String> {
        match self.fetch_date(domain).await {
            Ok(Some(date)) => Some(age_label(date, Utc::now())),
            Ok(None) => {
                debug!("No usable Date header from {}", domain);
                None
            }
            Err(e) => {
                warn!("Age probe failed for {}: {}", domain, e);
                None
            }
        }
    }

    async fn fetch_date(&self, domain: &str) -> Result<Option<DateTime<Utc>>> {
        let url = self.target(domain)?;
        let response = self.following.get(&url).send().await?;

        Ok(response
            .headers()
            .get(DATE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_http_date))
    }
}

#[async_trait]
impl LivenessProbe for Prober {
    async fn probe(&self, domain: &str) -> ProbeReport {
        self.run(domain).await
    }
}

/// Body prefix of at most `limit` bytes; the rest of the stream is dropped.
async fn read_capped(mut response: reqwest::Response, limit: usize) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = limit - body.len();
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            debug!("Body of {} truncated at {} bytes", response.url(), limit);
            break;
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

fn robots_header_noindex(headers: &HeaderMap) -> bool {
    headers
        .get_all("x-robots-tag")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.to_lowercase().contains("noindex"))
}

/// Substring check on the lowercased body, not an HTML parse.
pub fn meta_robots_noindex(body: &str) -> bool {
    let html = body.to_lowercase();
    html.contains("name=\"robots\"") && html.contains("noindex")
}

pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Whole 365-day years between `date` and `now`, rendered as `"<1y"` or `"{n}y"`.
pub fn age_label(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let years = (now - date).num_seconds() / SECONDS_PER_YEAR;
    if years > 0 {
        format!("{}y", years)
    } else {
        "<1y".to_string()
    }
}
