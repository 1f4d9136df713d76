//! Property-based tests for the rule learner.

use proptest::prelude::*;
use ripper_rs::{
    Attribute, Dataset, Direction, Instance, Ripper, RipperConfig, Test
};

/// Builds a small mixed-schema dataset from generated class/feature values.
fn build_dataset(rows: &[(usize, usize, f64)]) -> Dataset {
    let mut data = Dataset::new(vec![
        Attribute::discrete("class", &["a", "b", "c"]),
        Attribute::discrete("color", &["red", "green"]),
        Attribute::continuous("x"),
    ])
    .unwrap();
    for &(class, color, x) in rows {
        data.push(Instance::new(vec![class as f64, color as f64, x]))
            .unwrap();
    }
    data
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Every row gets a class index inside the domain.
    #[test]
    fn predictions_in_range(
        rows in prop::collection::vec((0usize..3, 0usize..2, -10.0f64..10.0), 0..40),
        seed in 0u64..100
    ) {
        let data = build_dataset(&rows);
        let config = RipperConfig::builder().seed(seed).build().unwrap();
        let model = Ripper::new(config).fit(&data).unwrap();

        let labels = model.predict(&data).unwrap();
        prop_assert_eq!(labels.len(), rows.len());
        for label in labels {
            prop_assert!(label < 3);
        }
    }

    /// Same seed, same data: identical predictions.
    #[test]
    fn training_deterministic(
        rows in prop::collection::vec((0usize..3, 0usize..2, -10.0f64..10.0), 1..40),
        seed in 0u64..100
    ) {
        let data = build_dataset(&rows);
        let config = RipperConfig::builder().seed(seed).build().unwrap();

        let first = Ripper::new(config).fit(&data).unwrap();
        let second = Ripper::new(config).fit(&data).unwrap();

        prop_assert_eq!(first.predict(&data).unwrap(), second.predict(&data).unwrap());
    }

    /// Learned rules test a discrete attribute at most once and keep at most
    /// one bound per direction on a continuous attribute.
    #[test]
    fn rule_antecedent_invariants(
        rows in prop::collection::vec((0usize..3, 0usize..2, -10.0f64..10.0), 0..40),
        seed in 0u64..100
    ) {
        let data = build_dataset(&rows);
        let config = RipperConfig::builder().seed(seed).build().unwrap();
        let model = Ripper::new(config).fit(&data).unwrap();

        for rule in model.rules() {
            let mut discrete_seen = Vec::new();
            let mut le_seen = Vec::new();
            let mut ge_seen = Vec::new();
            for antd in rule.antecedents() {
                match antd.test() {
                    Test::Discrete { .. } => {
                        prop_assert!(!discrete_seen.contains(&antd.attr()));
                        discrete_seen.push(antd.attr());
                    }
                    Test::Continuous { direction: Some(Direction::Le), .. } => {
                        prop_assert!(!le_seen.contains(&antd.attr()));
                        le_seen.push(antd.attr());
                    }
                    Test::Continuous { direction: Some(Direction::Ge), .. } => {
                        prop_assert!(!ge_seen.contains(&antd.attr()));
                        ge_seen.push(antd.attr());
                    }
                    Test::Continuous { direction: None, .. } => {
                        prop_assert!(false, "unset antecedent escaped training");
                    }
                }
            }
        }
    }

    /// The last rule is always a consequent-only default rule.
    #[test]
    fn default_rule_terminates_ruleset(
        rows in prop::collection::vec((0usize..3, 0usize..2, -10.0f64..10.0), 0..40),
        seed in 0u64..100
    ) {
        let data = build_dataset(&rows);
        let config = RipperConfig::builder().seed(seed).build().unwrap();
        let model = Ripper::new(config).fit(&data).unwrap();

        prop_assert!(model.num_rules() >= 1);
        let default = &model.rules()[model.num_rules() - 1];
        prop_assert!(default.is_default());
        prop_assert!(default.consequent() < 3);
    }

    /// Stratification reorders rows without gaining or losing any.
    #[test]
    fn stratify_preserves_rows(
        rows in prop::collection::vec((0usize..3, 0usize..2, -10.0f64..10.0), 0..60),
        folds in 2usize..6
    ) {
        let data = build_dataset(&rows);
        let strat = data.stratify(folds);

        prop_assert_eq!(strat.len(), data.len());

        let mut before: Vec<(u64, u64, u64)> = data
            .rows()
            .map(|r| (r.values[0] as u64, r.values[1] as u64, r.values[2].to_bits()))
            .collect();
        let mut after: Vec<(u64, u64, u64)> = strat
            .rows()
            .map(|r| (r.values[0] as u64, r.values[1] as u64, r.values[2].to_bits()))
            .collect();
        before.sort_unstable();
        after.sort_unstable();
        prop_assert_eq!(before, after);
    }

    /// Partition splits the rows at the grow/prune boundary without loss.
    #[test]
    fn partition_covers_all_rows(
        n in 0usize..60,
        folds in 2usize..6
    ) {
        let rows: Vec<(usize, usize, f64)> = (0..n).map(|i| (i % 3, i % 2, i as f64)).collect();
        let data = build_dataset(&rows);

        let (grow, prune) = data.partition(folds);

        prop_assert_eq!(grow.len() + prune.len(), n);
        prop_assert_eq!(grow.len(), (n * (folds - 1)).div_ceil(folds));
    }
}
