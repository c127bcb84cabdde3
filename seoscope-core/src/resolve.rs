//! The domain-metrics resolution pipeline.
//!
//! `normalize -> cache lookup -> (fresh hit | rescore + persist) -> respond`,
//! with the liveness probes running next to the authority lookup. Probe
//! results are never cached; only authority data and buckets are.

use crate::classify::{classify, scale_authority};
use crate::data::{DomainRecord, MetricsStore};
use crate::domain::normalize;
use crate::error::{MetricsError, Result};
use crate::flight::KeyedLocks;
use crate::model::MetricsReport;
use crate::scorer::AuthorityScorer;
use chrono::{Duration, Utc};
use seoscope_probe::LivenessProbe;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

pub const DEFAULT_FRESHNESS_DAYS: i64 = 7;

pub struct Resolver {
    store: Arc<dyn MetricsStore>,
    scorer: Arc<dyn AuthorityScorer>,
    probe: Arc<dyn LivenessProbe>,
    freshness: Duration,
    in_flight: KeyedLocks,
}

impl Resolver {
    pub fn new(
        store: Arc<dyn MetricsStore>,
        scorer: Arc<dyn AuthorityScorer>,
        probe: Arc<dyn LivenessProbe>,
    ) -> Self {
        Self {
            store,
            scorer,
            probe,
            freshness: Duration::days(DEFAULT_FRESHNESS_DAYS),
            in_flight: KeyedLocks::new(),
        }
    }

    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    #[instrument(skip(self), fields(domain))]
    pub async fn resolve(&self, raw: &str) -> Result<MetricsReport> {
        if raw.trim().is_empty() {
            return Err(MetricsError::MissingDomain);
        }

        let domain = normalize(raw);
        if domain.is_empty() {
            return Err(MetricsError::MissingDomain);
        }
        tracing::Span::current().record("domain", domain.as_str());

        // An authority failure drops the in-progress probes
        let (record, probe) = tokio::try_join!(self.authority(&domain), async {
            Ok::<_, MetricsError>(self.probe.probe(&domain).await)
        })?;

        let report = MetricsReport::combine(&record, probe);
        info!(
            "Resolved {}: authority={} traffic={} risk={}",
            report.domain, report.authority_score, report.traffic_bucket, report.risk
        );
        Ok(report)
    }

    /// Cached record if fresh and scored in the current mode, otherwise a
    /// newly scored and persisted one.
    ///
    /// Concurrent calls for one domain queue on the same key; whoever goes
    /// second re-reads the store and finds the record the first one wrote.
    async fn authority(&self, domain: &str) -> Result<DomainRecord> {
        let _flight = self.in_flight.acquire(domain).await;

        let synthetic = self.scorer.is_synthetic();
        match self.store.get(domain).await {
            Ok(Some(record))
                if record.synthetic == synthetic
                    && record.is_fresh(Utc::now(), self.freshness) =>
            {
                debug!("Cache hit for {} (fetched {})", domain, record.last_fetched_at);
                return Ok(record);
            }
            Ok(Some(record)) if record.synthetic != synthetic => {
                info!(
                    "Cached score for {} has synthetic={}, rescoring with synthetic={}",
                    domain, record.synthetic, synthetic
                );
            }
            Ok(Some(record)) => {
                debug!("Stale record for {} (fetched {})", domain, record.last_fetched_at);
            }
            Ok(None) => {
                debug!("Cache miss for {}", domain);
            }
            Err(e) => {
                error!("Store read failed for {}: {}", domain, e);
                return Err(e.into());
            }
        }

        let record = self.rescore(domain).await?;

        if let Err(e) = self.store.upsert(&record).await {
            error!("Store write failed for {}: {}", domain, e);
            return Err(e.into());
        }

        Ok(record)
    }

    async fn rescore(&self, domain: &str) -> Result<DomainRecord> {
        let opr_score = self.scorer.score(domain).await.map_err(|e| {
            error!("Authority scorer failed for {}: {}", domain, e);
            e
        })?;

        let authority_score = scale_authority(opr_score);
        let buckets = classify(authority_score);
        debug!(
            "Scored {}: raw={} authority={} traffic={} value={}",
            domain, opr_score, authority_score, buckets.traffic, buckets.value
        );

        Ok(DomainRecord {
            domain: domain.to_string(),
            opr_score,
            authority_score,
            traffic_bucket: buckets.traffic,
            keywords_bucket: buckets.keywords.to_string(),
            value_bucket: buckets.value,
            synthetic: self.scorer.is_synthetic(),
            last_fetched_at: Utc::now(),
        })
    }
}
