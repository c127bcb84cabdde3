// Tests for authority scaling, buckets and risk

use seoscope_core::classify::{
    Bucket, Risk, RiskSignals, assess_risk, classify, scale_authority, traffic_bucket,
    value_bucket,
};

// ============================================================================
// Scaling
// ============================================================================

#[test]
fn test_scale_authority_rounds() {
    assert_eq!(scale_authority(5.0), 50);
    assert_eq!(scale_authority(4.96), 50);
    assert_eq!(scale_authority(4.94), 49);
    assert_eq!(scale_authority(0.0), 0);
    assert_eq!(scale_authority(10.0), 100);
}

#[test]
fn test_scale_authority_clamps() {
    assert_eq!(scale_authority(-1.5), 0);
    assert_eq!(scale_authority(12.3), 100);
    assert_eq!(scale_authority(f64::INFINITY), 100);
    assert_eq!(scale_authority(f64::NAN), 0);
}

// ============================================================================
// Traffic / Keywords
// ============================================================================

#[test]
fn test_traffic_bucket_boundaries() {
    let cases = [
        (0, Bucket::VeryLow),
        (9, Bucket::VeryLow),
        (10, Bucket::Low),
        (29, Bucket::Low),
        (30, Bucket::Medium),
        (49, Bucket::Medium),
        (50, Bucket::High),
        (74, Bucket::High),
        (75, Bucket::VeryHigh),
        (100, Bucket::VeryHigh),
    ];

    for (score, expected) in cases {
        assert_eq!(traffic_bucket(score), expected, "score {}", score);
    }
}

#[test]
fn test_every_score_maps_to_exactly_one_row() {
    let rows: [(u8, u8, Bucket); 5] = [
        (0, 9, Bucket::VeryLow),
        (10, 29, Bucket::Low),
        (30, 49, Bucket::Medium),
        (50, 74, Bucket::High),
        (75, 100, Bucket::VeryHigh),
    ];

    for score in 0..=100u8 {
        let matching: Vec<_> = rows
            .iter()
            .filter(|(lo, hi, _)| (*lo..=*hi).contains(&score))
            .collect();
        assert_eq!(matching.len(), 1, "score {} matched {:?}", score, matching);
        assert_eq!(traffic_bucket(score), matching[0].2);
    }
}

#[test]
fn test_keywords_follow_traffic() {
    assert_eq!(classify(5).keywords, "0–100");
    assert_eq!(classify(15).keywords, "100–500");
    assert_eq!(classify(35).keywords, "500–2k");
    assert_eq!(classify(60).keywords, "2k–10k");
    assert_eq!(classify(90).keywords, "10k+");
}

// ============================================================================
// Value
// ============================================================================

#[test]
fn test_value_bucket_derivation() {
    // weight 1, zero score keeps multiplier 1 -> 1
    assert_eq!(value_bucket(0), Bucket::VeryLow);
    // weight 1 * 2 = 2
    assert_eq!(value_bucket(5), Bucket::VeryLow);
    // weight 2 * 2 = 4
    assert_eq!(value_bucket(20), Bucket::VeryLow);
    // weight 3 * 2 = 6
    assert_eq!(value_bucket(40), Bucket::Low);
    // weight 4 * 2 = 8
    assert_eq!(value_bucket(50), Bucket::Low);
    // weight 5 * 2 = 10
    assert_eq!(value_bucket(80), Bucket::Medium);
}

#[test]
fn test_value_bucket_is_deterministic() {
    for score in 0..=100u8 {
        assert_eq!(classify(score), classify(score));
    }
}

#[test]
fn test_example_domain_scenario() {
    let authority = scale_authority(5.0);
    let buckets = classify(authority);

    assert_eq!(authority, 50);
    assert_eq!(buckets.traffic, Bucket::High);
    assert_eq!(buckets.keywords, "2k–10k");
    assert_eq!(buckets.value, Bucket::Low);
}

#[test]
fn test_bucket_labels_round_trip() {
    for bucket in [
        Bucket::VeryLow,
        Bucket::Low,
        Bucket::Medium,
        Bucket::High,
        Bucket::VeryHigh,
    ] {
        assert_eq!(bucket.as_str().parse::<Bucket>().unwrap(), bucket);
        assert_eq!(
            serde_json::to_string(&bucket).unwrap(),
            format!("\"{}\"", bucket)
        );
    }
    assert!("extreme".parse::<Bucket>().is_err());
}

// ============================================================================
// Risk
// ============================================================================

fn signals(https: bool, redirected: bool, indexable: bool) -> RiskSignals {
    RiskSignals {
        https,
        redirected,
        indexable,
    }
}

#[test]
fn test_risk_tiers() {
    assert_eq!(assess_risk(signals(true, false, true)), Risk::Low);
    assert_eq!(assess_risk(signals(true, true, true)), Risk::Low);
    assert_eq!(assess_risk(signals(true, false, false)), Risk::Medium);
    assert_eq!(assess_risk(signals(true, true, false)), Risk::Medium);
    assert_eq!(assess_risk(signals(false, false, true)), Risk::Medium);
    assert_eq!(assess_risk(signals(false, true, true)), Risk::High);
    assert_eq!(assess_risk(signals(false, false, false)), Risk::High);
}

#[test]
fn test_https_failure_is_at_least_medium() {
    for redirected in [false, true] {
        for indexable in [false, true] {
            assert!(assess_risk(signals(false, redirected, indexable)) >= Risk::Medium);
        }
    }
}

#[test]
fn test_risk_is_monotonic() {
    let all = [false, true];
    for https in all {
        for redirected in all {
            for indexable in all {
                let base = assess_risk(signals(https, redirected, indexable));

                assert!(assess_risk(signals(false, redirected, indexable)) >= base);
                assert!(assess_risk(signals(https, true, indexable)) >= base);
                assert!(assess_risk(signals(https, redirected, false)) >= base);
            }
        }
    }
}
