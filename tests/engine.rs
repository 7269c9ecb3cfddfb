use std::collections::BTreeMap;

use rrsi_engine as rrsi;
use rrsi::{ConfigError, CycleError, Direction, Registry, SensorConfig, Status};

fn two_sensor_registry() -> Registry {
    Registry::load(vec![
        SensorConfig {
            key: "a".into(),
            limits: [10.0, 20.0, 30.0],
            weight: 0.6,
        },
        SensorConfig {
            key: "b".into(),
            limits: [100.0, 80.0, 60.0],
            weight: 0.4,
        },
    ])
    .unwrap()
}

fn readings(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|&(k, v)| (k.to_string(), v)).collect()
}

#[test]
fn standard_catalog_is_valid() {
    let reg = Registry::standard();
    assert_eq!(reg.all().len(), 12);

    let sum: f64 = reg.all().iter().map(|d| d.weight).sum();
    assert!((sum - 1.0).abs() < 1e-6);

    assert_eq!(reg.get("gamma").unwrap().direction, Direction::Normal);
    assert_eq!(reg.get("diff_pressure").unwrap().direction, Direction::Inverse);
    assert_eq!(reg.get("airflow").unwrap().direction, Direction::Inverse);
    assert!(reg.get("xenon").is_none());
}

#[test]
fn load_rejects_non_positive_weight() {
    let err = Registry::load(vec![SensorConfig {
        key: "a".into(),
        limits: [1.0, 2.0, 3.0],
        weight: 0.0,
    }])
    .unwrap_err();
    assert!(matches!(err, ConfigError::NonPositiveWeight { .. }));
}

#[test]
fn load_rejects_weights_not_summing_to_one() {
    let err = Registry::load(vec![
        SensorConfig {
            key: "a".into(),
            limits: [1.0, 2.0, 3.0],
            weight: 0.5,
        },
        SensorConfig {
            key: "b".into(),
            limits: [1.0, 2.0, 3.0],
            weight: 0.4,
        },
    ])
    .unwrap_err();
    assert!(matches!(err, ConfigError::WeightSum { .. }));
}

#[test]
fn load_rejects_degenerate_limits() {
    let err = Registry::load(vec![SensorConfig {
        key: "a".into(),
        limits: [5.0, 5.0, 5.0],
        weight: 1.0,
    }])
    .unwrap_err();
    assert!(matches!(err, ConfigError::DegenerateLimits { .. }));
}

#[test]
fn load_rejects_duplicate_key() {
    let err = Registry::load(vec![
        SensorConfig {
            key: "a".into(),
            limits: [1.0, 2.0, 3.0],
            weight: 0.5,
        },
        SensorConfig {
            key: "a".into(),
            limits: [4.0, 5.0, 6.0],
            weight: 0.5,
        },
    ])
    .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateKey { .. }));
}

#[test]
fn classify_normal_direction_inclusive_on_safer_side() {
    let reg = two_sensor_registry();
    let a = reg.get("a").unwrap();

    assert_eq!(a.classify(-5.0), Status::Safe);
    assert_eq!(a.classify(10.0), Status::Safe);
    assert_eq!(a.classify(10.01), Status::Warning);
    assert_eq!(a.classify(20.0), Status::Warning);
    assert_eq!(a.classify(20.01), Status::Maintenance);
    assert_eq!(a.classify(30.0), Status::Maintenance);
    assert_eq!(a.classify(30.01), Status::Danger);
}

#[test]
fn classify_inverse_direction_inclusive_on_safer_side() {
    let reg = two_sensor_registry();
    let b = reg.get("b").unwrap();

    assert_eq!(b.classify(150.0), Status::Safe);
    assert_eq!(b.classify(100.0), Status::Safe);
    assert_eq!(b.classify(99.9), Status::Warning);
    assert_eq!(b.classify(80.0), Status::Warning);
    assert_eq!(b.classify(79.9), Status::Maintenance);
    assert_eq!(b.classify(60.0), Status::Maintenance);
    assert_eq!(b.classify(59.9), Status::Danger);
}

#[test]
fn normalize_clamps_at_both_anchors() {
    let reg = two_sensor_registry();
    let a = reg.get("a").unwrap();
    let b = reg.get("b").unwrap();

    assert_eq!(a.normalize(-100.0), 0.0);
    assert_eq!(a.normalize(10.0), 0.0);
    assert_eq!(a.normalize(20.0), 50.0);
    assert_eq!(a.normalize(30.0), 100.0);
    assert_eq!(a.normalize(1000.0), 100.0);

    assert_eq!(b.normalize(200.0), 0.0);
    assert_eq!(b.normalize(100.0), 0.0);
    assert_eq!(b.normalize(80.0), 50.0);
    assert_eq!(b.normalize(60.0), 100.0);
    assert_eq!(b.normalize(0.0), 100.0);
}

#[test]
fn normalize_is_monotone_in_the_danger_direction() {
    let reg = two_sensor_registry();
    let a = reg.get("a").unwrap();
    let b = reg.get("b").unwrap();

    let mut prev = a.normalize(0.0);
    for i in 1..=200 {
        let score = a.normalize(i as f64 * 0.25);
        assert!((0.0..=100.0).contains(&score));
        assert!(score >= prev);
        prev = score;
    }

    let mut prev = b.normalize(0.0);
    for i in 1..=200 {
        let score = b.normalize(i as f64 * 0.75);
        assert!((0.0..=100.0).contains(&score));
        assert!(score <= prev);
        prev = score;
    }
}

#[test]
fn finalize_boundaries_inclusive_on_safer_side() {
    let cases = [
        (0.0, Status::Safe, "Safe"),
        (20.0, Status::Safe, "Safe"),
        (20.01, Status::Warning, "Warning"),
        (50.0, Status::Warning, "Warning"),
        (50.01, Status::Maintenance, "Maintenance"),
        (70.0, Status::Maintenance, "Maintenance"),
        (70.01, Status::Danger, "Danger"),
    ];
    for (score, status, label) in cases {
        let r = rrsi::finalize(score, false);
        assert_eq!(r.system_status, status, "score {score}");
        assert_eq!(r.system_status_label, label, "score {score}");
        assert!(!r.veto_active);
    }
}

#[test]
fn finalize_rounds_to_two_decimals() {
    assert_eq!(rrsi::finalize(33.333, false).final_score, 33.33);
    assert_eq!(rrsi::finalize(33.336, false).final_score, 33.34);
}

#[test]
fn veto_forces_maximum_severity() {
    let r = rrsi::finalize(3.2, true);
    assert_eq!(r.final_score, 100.0);
    assert_eq!(r.system_status, Status::Danger);
    assert_eq!(r.system_status.code(), 3);
    assert_eq!(r.system_status_label, "Danger (Veto)");
    assert!(r.veto_active);
}

#[test]
fn all_safe_cycle_scores_zero() {
    let reg = two_sensor_registry();
    let result = rrsi::evaluate_cycle(&reg, &readings(&[("a", 10.0), ("b", 100.0)])).unwrap();

    for sensor in &result.sensors {
        assert_eq!(sensor.status, Status::Safe);
        assert_eq!(sensor.score, 0.0);
    }
    assert_eq!(result.aggregate.final_score, 0.0);
    assert_eq!(result.aggregate.system_status, Status::Safe);
    assert!(!result.aggregate.veto_active);
    assert!(result.unknown.is_empty());
}

#[test]
fn both_sensors_past_danger_trigger_veto() {
    let reg = two_sensor_registry();
    let result = rrsi::evaluate_cycle(&reg, &readings(&[("a", 31.0), ("b", 59.0)])).unwrap();

    for sensor in &result.sensors {
        assert_eq!(sensor.status, Status::Danger);
    }
    assert!(result.aggregate.veto_active);
    assert_eq!(result.aggregate.final_score, 100.0);
    assert_eq!(result.aggregate.system_status, Status::Danger);
    assert_eq!(result.aggregate.system_status_label, "Danger (Veto)");
}

#[test]
fn values_exactly_at_maintenance_max_the_score_without_veto() {
    // Thresholds are inclusive on the safer side, so a value sitting exactly
    // on the maintenance limit classifies as Maintenance while its
    // normalized score already saturates at 100.
    let reg = two_sensor_registry();
    let result = rrsi::evaluate_cycle(&reg, &readings(&[("a", 30.0), ("b", 60.0)])).unwrap();

    for sensor in &result.sensors {
        assert_eq!(sensor.status, Status::Maintenance);
        assert_eq!(sensor.score, 100.0);
    }
    assert!(!result.aggregate.veto_active);
    assert_eq!(result.aggregate.final_score, 100.0);
    assert_eq!(result.aggregate.system_status, Status::Danger);
    assert_eq!(result.aggregate.system_status_label, "Danger");
}

#[test]
fn missing_reading_fails_the_cycle() {
    let reg = two_sensor_registry();
    let err = rrsi::evaluate_cycle(&reg, &readings(&[("a", 10.0)])).unwrap_err();
    assert_eq!(err, CycleError::IncompleteReading { key: "b".into() });
}

#[test]
fn unknown_reading_is_reported_but_does_not_abort() {
    let reg = two_sensor_registry();
    let result =
        rrsi::evaluate_cycle(&reg, &readings(&[("a", 10.0), ("b", 100.0), ("xenon", 1.0)]))
            .unwrap();

    assert_eq!(
        result.unknown,
        vec![CycleError::UnknownSensor {
            key: "xenon".into()
        }]
    );
    assert_eq!(result.sensors.len(), 2);
    assert_eq!(result.aggregate.system_status, Status::Safe);
}

#[test]
fn reevaluation_is_bit_identical() {
    let reg = Registry::standard();
    let set: BTreeMap<String, f64> = rrsi::BASELINE
        .iter()
        .map(|&(k, v)| (k.to_string(), v))
        .collect();

    let first = rrsi::evaluate_cycle(&reg, &set).unwrap();
    let second = rrsi::evaluate_cycle(&reg, &set).unwrap();
    assert_eq!(first, second);
}

#[test]
fn weighted_aggregate_blends_by_weight() {
    // a at its halfway point (score 50, weight 0.6), b safe (score 0).
    let reg = two_sensor_registry();
    let result = rrsi::evaluate_cycle(&reg, &readings(&[("a", 20.0), ("b", 100.0)])).unwrap();

    assert!((result.aggregate.raw_weighted_score - 30.0).abs() < 1e-9);
    assert_eq!(result.aggregate.final_score, 30.0);
    assert_eq!(result.aggregate.system_status, Status::Warning);
}
