// Authority scaling, bucket classification and risk scoring

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::VeryLow => "very_low",
            Bucket::Low => "low",
            Bucket::Medium => "medium",
            Bucket::High => "high",
            Bucket::VeryHigh => "very_high",
        }
    }

    /// Weight used when deriving the value bucket from the traffic bucket.
    pub fn weight(&self) -> u32 {
        match self {
            Bucket::VeryLow => 1,
            Bucket::Low => 2,
            Bucket::Medium => 3,
            Bucket::High => 4,
            Bucket::VeryHigh => 5,
        }
    }

    /// Estimated ranking keyword range for a traffic bucket.
    pub fn keywords_range(&self) -> &'static str {
        match self {
            Bucket::VeryLow => "0–100",
            Bucket::Low => "100–500",
            Bucket::Medium => "500–2k",
            Bucket::High => "2k–10k",
            Bucket::VeryHigh => "10k+",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "very_low" => Ok(Bucket::VeryLow),
            "low" => Ok(Bucket::Low),
            "medium" => Ok(Bucket::Medium),
            "high" => Ok(Bucket::High),
            "very_high" => Ok(Bucket::VeryHigh),
            other => Err(format!("unknown bucket '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Risk {
    Low,
    Medium,
    High,
}

impl Risk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Risk::Low => "low",
            Risk::Medium => "medium",
            Risk::High => "high",
        }
    }

    pub fn from_score(score: u32) -> Self {
        match score {
            0..=1 => Risk::Low,
            2..=3 => Risk::Medium,
            _ => Risk::High,
        }
    }
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three buckets derived from one authority score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Buckets {
    pub traffic: Bucket,
    pub keywords: &'static str,
    pub value: Bucket,
}

/// Raw scorer decimal (nominally 0-10) to an integer authority score in 0..=100.
pub fn scale_authority(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    (raw * 10.0).round().clamp(0.0, 100.0) as u8
}

pub fn traffic_bucket(authority_score: u8) -> Bucket {
    match authority_score {
        0..=9 => Bucket::VeryLow,
        10..=29 => Bucket::Low,
        30..=49 => Bucket::Medium,
        50..=74 => Bucket::High,
        _ => Bucket::VeryHigh,
    }
}

/// Value is classified from the traffic weight, not the score directly.
pub fn value_bucket(authority_score: u8) -> Bucket {
    let multiplier = if authority_score > 0 { 2 } else { 1 };
    let value_score = traffic_bucket(authority_score).weight() * multiplier;

    match value_score {
        0..=4 => Bucket::VeryLow,
        5..=8 => Bucket::Low,
        9..=12 => Bucket::Medium,
        13..=16 => Bucket::High,
        _ => Bucket::VeryHigh,
    }
}

pub fn classify(authority_score: u8) -> Buckets {
    let traffic = traffic_bucket(authority_score);
    Buckets {
        traffic,
        keywords: traffic.keywords_range(),
        value: value_bucket(authority_score),
    }
}

/// Probe outcomes that feed the risk rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskSignals {
    pub https: bool,
    pub redirected: bool,
    pub indexable: bool,
}

impl RiskSignals {
    pub fn score(&self) -> u32 {
        let mut score = 0;
        if !self.https {
            score += 3;
        }
        if self.redirected {
            score += 1;
        }
        if !self.indexable {
            score += 2;
        }
        score
    }
}

pub fn assess_risk(signals: RiskSignals) -> Risk {
    Risk::from_score(signals.score())
}
