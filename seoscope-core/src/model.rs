use crate::classify::{Bucket, Risk, RiskSignals, assess_risk};
use crate::data::DomainRecord;
use seoscope_probe::ProbeReport;
use serde::{Deserialize, Serialize};

/// Response for one metrics lookup: cached authority data plus live probe results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub domain: String,
    pub authority_score: u8,
    pub traffic_bucket: Bucket,
    pub keywords_bucket: String,
    pub value_bucket: Bucket,
    pub domain_age: Option<String>,
    pub indexable: bool,
    pub risk: Risk,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub synthetic: bool,
}

impl MetricsReport {
    pub fn combine(record: &DomainRecord, probe: ProbeReport) -> Self {
        let risk = assess_risk(RiskSignals {
            https: probe.https,
            redirected: probe.redirected,
            indexable: probe.indexable,
        });

        Self {
            domain: record.domain.clone(),
            authority_score: record.authority_score,
            traffic_bucket: record.traffic_bucket,
            keywords_bucket: record.keywords_bucket.clone(),
            value_bucket: record.value_bucket,
            domain_age: probe.domain_age,
            indexable: probe.indexable,
            risk,
            synthetic: record.synthetic,
        }
    }
}
