//! The RIPPER learner: class-by-class rule building and optimization.

use crate::{
    Dataset, RipperRule, RuleBasedModel,
    error::{Error, Result},
    stats::{RuleCounts, RuleStats, remove_covered_by_successors},
    utils::{FastRng, rng_from_seed}
};

/// Description-length surplus over the running minimum at which rule
/// building stops.
pub const MAX_DL_SURPLUS: f64 = 64.0;

/// # Overview
///
/// Configuration parameters for the RIPPER learner.
///
/// # Examples
///
/// ```
/// use ripper_rs::RipperConfig;
///
/// let config = RipperConfig::builder().seed(42).folds(4).build().unwrap();
///
/// assert_eq!(config.folds, 4);
/// assert_eq!(config.optimizations, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[must_use]
pub struct RipperConfig {
    pub optimizations: usize,
    pub folds:         usize,
    pub min_no:        f64,
    pub seed:          u64,
    pub check_err:     bool,
    pub pruning:       bool
}

impl Default for RipperConfig {
    fn default() -> Self {
        Self {
            optimizations: 2,
            folds:         3,
            min_no:        2.0,
            seed:          1,
            check_err:     true,
            pruning:       true
        }
    }
}

impl RipperConfig {
    /// # Overview
    ///
    /// Creates a new RipperConfigBuilder.
    #[inline]
    pub fn builder() -> RipperConfigBuilder {
        RipperConfigBuilder::default()
    }

    /// # Overview
    ///
    /// Validates configuration parameters.
    pub fn validate(&self) -> Result<()> {
        if self.folds < 2 {
            return Err(Error::InvalidFolds);
        }
        if !(self.min_no > 0.0 && self.min_no.is_finite()) {
            return Err(Error::InvalidMinNo);
        }
        Ok(())
    }
}

/// # Overview
///
/// Builder for RipperConfig with validation.
#[derive(Debug, Default)]
pub struct RipperConfigBuilder {
    optimizations: Option<usize>,
    folds:         Option<usize>,
    min_no:        Option<f64>,
    seed:          Option<u64>,
    check_err:     Option<bool>,
    pruning:       Option<bool>
}

impl RipperConfigBuilder {
    /// Sets the number of optimization rounds (default: 2).
    pub fn optimizations(mut self, n: usize) -> Self {
        self.optimizations = Some(n);
        self
    }

    /// Sets the number of stratification folds; the last fold is the
    /// pruning data (default: 3).
    pub fn folds(mut self, n: usize) -> Self {
        self.folds = Some(n);
        self
    }

    /// Sets the minimum weighted accurate coverage a growing rule must keep
    /// (default: 2.0).
    pub fn min_no(mut self, min_no: f64) -> Self {
        self.min_no = Some(min_no);
        self
    }

    /// Sets the RNG seed (default: 1).
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables the error-rate stopping check (default: true).
    pub fn check_err(mut self, check: bool) -> Self {
        self.check_err = Some(check);
        self
    }

    /// Enables or disables reduced-error pruning and the optimization
    /// stage (default: true).
    pub fn pruning(mut self, pruning: bool) -> Self {
        self.pruning = Some(pruning);
        self
    }

    /// # Overview
    ///
    /// Builds and validates the RipperConfig.
    pub fn build(self) -> Result<RipperConfig> {
        let defaults = RipperConfig::default();
        let config = RipperConfig {
            optimizations: self.optimizations.unwrap_or(defaults.optimizations),
            folds:         self.folds.unwrap_or(defaults.folds),
            min_no:        self.min_no.unwrap_or(defaults.min_no),
            seed:          self.seed.unwrap_or(defaults.seed),
            check_err:     self.check_err.unwrap_or(defaults.check_err),
            pruning:       self.pruning.unwrap_or(defaults.pruning)
        };
        config.validate()?;
        Ok(config)
    }
}

/// Stopping predicate for rule building.
fn check_stop(counts: &RuleCounts, min_dl: f64, dl: f64, check_err: bool) -> bool {
    if dl > min_dl + MAX_DL_SURPLUS {
        return true;
    }
    if counts.covered_pos <= 0.0 {
        return true;
    }
    check_err && counts.covered_neg / counts.covered >= 0.5
}

/// The rows of `grow_data` covered by `rule`: the pool a revision variant
/// continues growing on.
fn revision_grow_pool(rule: &RipperRule, grow_data: &Dataset) -> Dataset {
    let mut pool = grow_data.empty_like();
    for i in 0..grow_data.len() {
        if rule.covers(grow_data, i) {
            pool.push_raw(grow_data.row(i).clone());
        }
    }
    pool
}

/// # Overview
///
/// The RIPPER learner (Cohen 1995): builds an ordered ruleset class by
/// class, from the rarest class up, leaving the most frequent class to a
/// final default rule.
///
/// All randomness flows through one RNG seeded from the configuration, so
/// the same seed on the same input yields an identical ruleset.
///
/// # Examples
///
/// ```
/// use ripper_rs::{Attribute, Dataset, Instance, Ripper, RipperConfig};
///
/// let mut data = Dataset::new(vec![
///     Attribute::discrete("class", &["a", "b"]),
///     Attribute::continuous("x"),
/// ])
/// .unwrap();
/// for i in 0..20 {
///     let x = f64::from(i);
///     let class = if x > 9.0 { 1.0 } else { 0.0 };
///     data.push(Instance::new(vec![class, x])).unwrap();
/// }
///
/// let model = Ripper::default().fit(&data).unwrap();
/// assert_eq!(model.predict(&data).unwrap().len(), 20);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Ripper {
    config: RipperConfig
}

impl Ripper {
    /// Creates a learner with the given configuration.
    #[must_use]
    pub fn new(config: RipperConfig) -> Self {
        Self {
            config
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &RipperConfig {
        &self.config
    }

    /// # Overview
    ///
    /// Trains a rule-based model on the dataset.
    ///
    /// Rows with a missing class are dropped. Classes are renumbered in
    /// ascending order of weighted count for training, and the finished
    /// model speaks the caller's original class indices again.
    pub fn fit(&self, data: &Dataset) -> Result<RuleBasedModel> {
        self.config.validate()?;
        let schema = data.attributes().to_vec();

        let mut data = data.clone();
        data.remove_missing_class();
        let mut rng = rng_from_seed(self.config.seed);
        let counts = data.sort_classes_by_frequency();
        let num_classes = data.num_classes();
        let total_conds = RuleStats::num_all_conditions(&data);

        let mut rules: Vec<RipperRule> = Vec::new();
        for y in 0..num_classes.saturating_sub(1) {
            if counts[y] <= 0.0 {
                log::debug!("class {y}: no examples, skipped");
                continue;
            }
            let remaining: f64 = counts[y..].iter().sum();
            let exp_fp_rate = counts[y] / remaining;

            let mut total_weight = 0.0;
            let mut class_weight = 0.0;
            for row in data.rows() {
                total_weight += row.weight;
                if row.class_value() as usize == y {
                    class_weight += row.weight;
                }
            }
            if class_weight <= 0.0 {
                log::debug!("class {y}: already covered, skipped");
                continue;
            }
            let def_dl = RuleStats::data_dl(exp_fp_rate, 0.0, total_weight, 0.0, class_weight);
            if !def_dl.is_finite() {
                return Err(Error::NumericAnomaly);
            }

            data = self.ruleset_for_class(data, y, exp_fp_rate, def_dl, total_conds, &mut rules, &mut rng)?;
        }

        // most frequent class falls through to the default rule
        rules.push(RipperRule::new(num_classes - 1));
        for rule in &mut rules {
            rule.clean_up(&data);
        }

        // back to the caller's class numbering
        if let Some(sorted_labels) = data.attributes()[0].labels() {
            for rule in &mut rules {
                let label = &sorted_labels[rule.consequent()];
                if let Some(original) = schema[0].index_of(label) {
                    rule.set_consequent(original);
                }
            }
        }

        Ok(RuleBasedModel::new(schema, rules))
    }

    /// Builds and optimizes the ruleset for one class; returns the rows the
    /// accepted rules leave uncovered.
    #[allow(clippy::too_many_arguments)]
    fn ruleset_for_class(
        &self,
        data: Dataset,
        class: usize,
        exp_fp_rate: f64,
        def_dl: f64,
        total_conds: f64,
        all_rules: &mut Vec<RipperRule>,
        rng: &mut FastRng
    ) -> Result<Dataset> {
        let class_data = data.clone();
        let mut rstats = RuleStats::new(class_data.clone(), total_conds);
        let mut ruleset: Vec<RipperRule> = Vec::new();
        let mut data = data;

        // building stage: one rule per iteration until the description
        // length degrades or the positives run out
        let mut dl = def_dl;
        let mut min_dl = def_dl;
        let mut stop = false;
        let mut has_positive = true;
        while !stop && has_positive {
            let mut rule = RipperRule::new(class);
            if self.config.pruning {
                data.shuffle(rng);
                data = data.stratify(self.config.folds);
                let (grow, prune) = data.partition(self.config.folds);
                rule.grow(grow, self.config.min_no);
                rule.prune(&prune, false);
            } else {
                rule.grow(data.clone(), self.config.min_no);
            }

            rstats.push_rule(&rule);
            ruleset.push(rule);
            let last = rstats.num_rules() - 1;
            dl += rstats.relative_dl(&ruleset, last, exp_fp_rate, self.config.check_err);
            if !dl.is_finite() {
                return Err(Error::NumericAnomaly);
            }
            if dl < min_dl {
                min_dl = dl;
            }

            let counts = rstats.counts(last).clone();
            stop = check_stop(&counts, min_dl, dl, self.config.check_err);
            if stop {
                rstats.pop_rule();
                ruleset.pop();
            } else {
                if let Some((_, uncovered)) = rstats.get_filtered(last) {
                    data = uncovered.clone();
                }
                has_positive = counts.uncovered_pos > 0.0;
                log::debug!(
                    "class {class}: accepted rule {} (covered {:.1}, errors {:.1})",
                    ruleset.len() - 1,
                    counts.covered,
                    counts.covered_neg
                );
            }
        }

        // optimization stage: revise every rule in place, then top up on the
        // residual and trim by total description length
        if self.config.pruning {
            for round in 0..self.config.optimizations {
                log::debug!("class {class}: optimization round {round}");
                let mut new_data = class_data.clone();
                let mut final_stats = RuleStats::new(class_data.clone(), total_conds);
                let mut final_rules: Vec<RipperRule> = Vec::new();
                let ruleset_size = ruleset.len();
                let mut position = 0;
                let mut dl = def_dl;
                let mut min_dl = def_dl;
                let mut stop = false;
                let mut has_positive = true;

                while !stop && has_positive {
                    let is_residual = position >= ruleset_size;
                    new_data.shuffle(rng);
                    new_data = new_data.stratify(self.config.folds);
                    let (grow, prune) = new_data.partition(self.config.folds);

                    let final_rule = if is_residual {
                        let mut rule = RipperRule::new(class);
                        rule.grow(grow, self.config.min_no);
                        rule.prune(&prune, false);
                        rule
                    } else {
                        let old_rule = ruleset[position].clone();
                        let covers_any = (0..new_data.len()).any(|i| old_rule.covers(&new_data, i));
                        if !covers_any {
                            // nothing to vary against
                            final_stats.push_rule(&old_rule);
                            final_rules.push(old_rule);
                            position += 1;
                            continue;
                        }

                        let mut replace = RipperRule::new(class);
                        replace.grow(grow.clone(), self.config.min_no);
                        let prune = remove_covered_by_successors(&prune, &ruleset, position);
                        replace.prune(&prune, true);

                        let mut revision = old_rule.clone();
                        let pool = revision_grow_pool(&revision, &grow);
                        revision.grow(pool, self.config.min_no);
                        revision.prune(&prune, true);

                        let prev: Vec<RuleCounts> =
                            (0..position).map(|c| final_stats.counts(c).clone()).collect();

                        let mut temp = ruleset.clone();
                        temp[position] = replace.clone();
                        let mut rep_stats = RuleStats::new(class_data.clone(), total_conds);
                        rep_stats.count_data(&temp, position, &new_data, &prev);
                        let rep_dl =
                            rep_stats.relative_dl(&temp, position, exp_fp_rate, self.config.check_err);

                        temp[position] = revision.clone();
                        let mut rev_stats = RuleStats::new(class_data.clone(), total_conds);
                        rev_stats.count_data(&temp, position, &new_data, &prev);
                        let rev_dl =
                            rev_stats.relative_dl(&temp, position, exp_fp_rate, self.config.check_err);

                        let mut old_stats = RuleStats::new(class_data.clone(), total_conds);
                        old_stats.count_data(&ruleset, position, &new_data, &prev);
                        let old_dl =
                            old_stats.relative_dl(&ruleset, position, exp_fp_rate, self.config.check_err);

                        if !(rep_dl.is_finite() && rev_dl.is_finite() && old_dl.is_finite()) {
                            return Err(Error::NumericAnomaly);
                        }

                        // ties prefer the original, then the revision
                        if old_dl <= rev_dl && old_dl <= rep_dl {
                            old_rule
                        } else if rev_dl <= rep_dl {
                            revision
                        } else {
                            replace
                        }
                    };

                    final_stats.push_rule(&final_rule);
                    final_rules.push(final_rule);
                    let counts = final_stats.counts(position).clone();

                    if is_residual {
                        dl += final_stats.relative_dl(
                            &final_rules,
                            position,
                            exp_fp_rate,
                            self.config.check_err
                        );
                        if !dl.is_finite() {
                            return Err(Error::NumericAnomaly);
                        }
                        if dl < min_dl {
                            min_dl = dl;
                        }
                        stop = check_stop(&counts, min_dl, dl, self.config.check_err);
                    }

                    if stop {
                        final_stats.pop_rule();
                        final_rules.pop();
                    } else {
                        if let Some((_, uncovered)) = final_stats.get_filtered(position) {
                            new_data = uncovered.clone();
                        }
                        has_positive = counts.uncovered_pos > 0.0;
                        position += 1;
                    }
                }

                // rules the walk never reached stay as they were
                for rule in ruleset.iter().skip(position) {
                    final_stats.push_rule(rule);
                    final_rules.push(rule.clone());
                }

                final_stats.reduce_dl(&mut final_rules, exp_fp_rate, self.config.check_err);
                ruleset = final_rules;
                rstats = final_stats;
            }
        }

        let residual = if rstats.num_rules() > 0 {
            rstats
                .get_filtered(rstats.num_rules() - 1)
                .map(|(_, uncovered)| uncovered.clone())
                .unwrap_or(class_data)
        } else {
            class_data
        };
        log::debug!(
            "class {class}: {} rules, {} rows left uncovered",
            ruleset.len(),
            residual.len()
        );
        all_rules.append(&mut ruleset);
        Ok(residual)
    }
}
