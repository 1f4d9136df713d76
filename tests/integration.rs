//! End-to-end training and prediction scenarios.

use ripper_rs::{
    Antecedent, Attribute, Dataset, Direction, Instance, Ripper, RipperConfig, RipperRule, Test, io
};

/// The classic 14-row weather table.
///
/// Encodings: play no=0/yes=1, outlook sunny=0/overcast=1/rainy=2,
/// windy true=0/false=1.
fn weather_data() -> Dataset {
    let mut data = Dataset::new(vec![
        Attribute::discrete("play", &["no", "yes"]),
        Attribute::discrete("outlook", &["sunny", "overcast", "rainy"]),
        Attribute::continuous("temperature"),
        Attribute::continuous("humidity"),
        Attribute::discrete("windy", &["true", "false"]),
    ])
    .unwrap();
    let rows = [
        (0.0, 0.0, 85.0, 85.0, 1.0),
        (0.0, 0.0, 80.0, 90.0, 0.0),
        (1.0, 1.0, 83.0, 86.0, 1.0),
        (1.0, 2.0, 70.0, 96.0, 1.0),
        (1.0, 2.0, 68.0, 80.0, 1.0),
        (0.0, 2.0, 65.0, 70.0, 0.0),
        (1.0, 1.0, 64.0, 65.0, 0.0),
        (0.0, 0.0, 72.0, 95.0, 1.0),
        (1.0, 0.0, 69.0, 70.0, 1.0),
        (1.0, 2.0, 75.0, 80.0, 1.0),
        (1.0, 0.0, 75.0, 70.0, 0.0),
        (1.0, 1.0, 72.0, 90.0, 0.0),
        (1.0, 1.0, 81.0, 75.0, 1.0),
        (0.0, 2.0, 71.0, 91.0, 0.0),
    ];
    for (play, outlook, temp, hum, windy) in rows {
        data.push(Instance::new(vec![play, outlook, temp, hum, windy]))
            .unwrap();
    }
    data
}

fn noisy_parity_data(n_samples: usize, noise: f64, seed: u64) -> Dataset {
    use rand::Rng;
    let mut rng = ripper_rs::utils::rng_from_seed(seed);
    let mut data = Dataset::new(vec![
        Attribute::discrete("parity", &["even", "odd"]),
        Attribute::discrete("a", &["0", "1"]),
        Attribute::discrete("b", &["0", "1"]),
    ])
    .unwrap();
    for i in 0..n_samples {
        let a = (i / 2) % 2;
        let b = i % 2;
        let mut label = a ^ b;
        if rng.random::<f64>() < noise {
            label = 1 - label;
        }
        data.push(Instance::new(vec![label as f64, a as f64, b as f64]))
            .unwrap();
    }
    data
}

fn has_test(rule: &RipperRule, check: impl Fn(&Antecedent) -> bool) -> bool {
    rule.antecedents().iter().any(check)
}

#[test]
fn weather_rules_without_pruning() {
    let data = weather_data();
    let config = RipperConfig::builder().pruning(false).seed(1).build().unwrap();

    let model = Ripper::new(config).fit(&data).unwrap();

    // two rules for "no" plus the default rule for "yes"
    assert_eq!(model.num_rules(), 3);
    let first = &model.rules()[0];
    assert_eq!(first.consequent(), 0);
    assert!(has_test(first, |antd| {
        antd.test()
            == &Test::Discrete {
                target: Some(0)
            }
            && antd.attr() == 1
    }));
    assert!(has_test(first, |antd| {
        match antd.test() {
            Test::Continuous {
                split,
                direction: Some(Direction::Ge)
            } => antd.attr() == 3 && (75.0..=85.0).contains(split),
            _ => false
        }
    }));

    let default = model.rules().last().unwrap();
    assert!(default.is_default());
    assert_eq!(default.consequent(), 1);

    assert_eq!(model.evaluate(&data).unwrap(), 1.0);
}

#[test]
fn weather_with_default_configuration() {
    let data = weather_data();

    let model = Ripper::default().fit(&data).unwrap();

    let labels = model.predict(&data).unwrap();
    assert_eq!(labels.len(), 14);
    assert!(labels.iter().all(|&c| c < 2));
    assert!(model.rules().last().unwrap().is_default());
    assert!(model.evaluate(&data).unwrap() >= 0.5);
}

#[test]
fn perfect_linear_separation() {
    // 200 evenly spaced points, class "high" iff x > 50
    let mut data = Dataset::new(vec![
        Attribute::discrete("level", &["low", "high"]),
        Attribute::continuous("x"),
    ])
    .unwrap();
    for i in 1..=200 {
        let x = 0.5 * f64::from(i);
        let class = if x > 50.0 { 1.0 } else { 0.0 };
        data.push(Instance::new(vec![class, x])).unwrap();
    }

    let config = RipperConfig::builder().pruning(false).build().unwrap();
    let model = Ripper::new(config).fit(&data).unwrap();

    assert_eq!(model.num_rules(), 2);
    let rule = &model.rules()[0];
    assert_eq!(rule.consequent(), 0);
    assert_eq!(rule.size(), 1);
    match rule.antecedents()[0].test() {
        Test::Continuous {
            split,
            direction: Some(Direction::Le)
        } => assert!((50.0..50.5).contains(split)),
        other => panic!("expected a <= threshold, got {other:?}")
    }
    assert_eq!(model.rules()[1].consequent(), 1);
    assert_eq!(model.evaluate(&data).unwrap(), 1.0);
}

#[test]
fn noisy_parity_learns_compact_ruleset() {
    let data = noisy_parity_data(1000, 0.1, 42);

    let config = RipperConfig::builder().seed(42).build().unwrap();
    let model = Ripper::new(config).fit(&data).unwrap();

    let accuracy = model.evaluate(&data).unwrap();
    assert!(accuracy >= 0.80, "accuracy {accuracy} too low");
    assert!(accuracy <= 0.95, "accuracy {accuracy} suspiciously high");
    // description-length reduction keeps the ruleset small
    assert!(model.num_rules() <= 4, "{} rules survived", model.num_rules());
}

#[test]
fn training_is_deterministic() {
    let data = noisy_parity_data(400, 0.1, 7);
    let config = RipperConfig::builder().seed(42).build().unwrap();

    let first = Ripper::new(config).fit(&data).unwrap();
    let second = Ripper::new(config).fit(&data).unwrap();

    let mut bytes_first = Vec::new();
    io::save(&first, &mut bytes_first).unwrap();
    let mut bytes_second = Vec::new();
    io::save(&second, &mut bytes_second).unwrap();

    assert_eq!(bytes_first, bytes_second);
    assert_eq!(first.predict(&data).unwrap(), second.predict(&data).unwrap());
}

#[test]
fn single_valued_class_falls_through_to_default() {
    let mut data = Dataset::new(vec![
        Attribute::discrete("class", &["u", "v"]),
        Attribute::continuous("x"),
    ])
    .unwrap();
    for i in 0..10 {
        data.push(Instance::new(vec![1.0, f64::from(i)])).unwrap();
    }

    let model = Ripper::default().fit(&data).unwrap();

    assert_eq!(model.num_rules(), 1);
    assert!(model.rules()[0].is_default());
    let labels = model.predict(&data).unwrap();
    assert!(labels.iter().all(|&c| c == 1));
}

#[test]
fn single_class_domain_falls_through_to_default() {
    let mut data = Dataset::new(vec![
        Attribute::discrete("class", &["only"]),
        Attribute::continuous("x"),
    ])
    .unwrap();
    for i in 0..5 {
        data.push(Instance::new(vec![0.0, f64::from(i)])).unwrap();
    }

    let model = Ripper::default().fit(&data).unwrap();

    assert_eq!(model.num_rules(), 1);
    assert!(model.predict(&data).unwrap().iter().all(|&c| c == 0));
}

#[test]
fn saved_model_round_trips_predictions() {
    let data = weather_data();
    let model = Ripper::default().fit(&data).unwrap();

    let mut bytes = Vec::new();
    io::save(&model, &mut bytes).unwrap();
    let loaded = io::load(&mut bytes.as_slice()).unwrap();

    assert_eq!(loaded.predict(&data).unwrap(), model.predict(&data).unwrap());
}

#[test]
fn prediction_reorders_input_columns() {
    let data = weather_data();
    let model = Ripper::default().fit(&data).unwrap();
    let expected = model.predict(&data).unwrap();

    // same attributes, shuffled column order
    let shuffled_schema = vec![
        Attribute::discrete("play", &["no", "yes"]),
        Attribute::discrete("windy", &["true", "false"]),
        Attribute::continuous("humidity"),
        Attribute::discrete("outlook", &["sunny", "overcast", "rainy"]),
        Attribute::continuous("temperature"),
    ];
    let mut shuffled = Dataset::new(shuffled_schema).unwrap();
    for row in data.rows() {
        let v = &row.values;
        shuffled
            .push(Instance::new(vec![v[0], v[4], v[3], v[1], v[2]]))
            .unwrap();
    }

    assert_eq!(model.predict(&shuffled).unwrap(), expected);
}

#[test]
fn missing_class_rows_are_dropped_before_training() {
    let mut data = weather_data();
    data.push(Instance::new(vec![ripper_rs::MISSING, 0.0, 70.0, 70.0, 1.0]))
        .unwrap();

    let with_missing = Ripper::default().fit(&data).unwrap();
    let without = Ripper::default().fit(&weather_data()).unwrap();

    let mut a = Vec::new();
    io::save(&with_missing, &mut a).unwrap();
    let mut b = Vec::new();
    io::save(&without, &mut b).unwrap();
    assert_eq!(a, b);
}

#[test]
fn weighted_rows_drive_class_ordering() {
    // "b" has more rows but "a" carries more weight
    let mut data = Dataset::new(vec![
        Attribute::discrete("class", &["a", "b"]),
        Attribute::continuous("x"),
    ])
    .unwrap();
    for i in 0..4 {
        data.push(Instance::weighted(vec![0.0, f64::from(i)], 10.0))
            .unwrap();
    }
    for i in 0..6 {
        data.push(Instance::new(vec![1.0, f64::from(i) + 10.0]))
            .unwrap();
    }

    let model = Ripper::default().fit(&data).unwrap();

    // the heavier class becomes the default
    assert_eq!(model.rules().last().unwrap().consequent(), 0);
}
