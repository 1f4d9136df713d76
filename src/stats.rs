//! Ruleset statistics and minimum-description-length accounting.

use crate::{Dataset, RipperRule};

/// Redundancy factor applied to the theory description length.
const REDUNDANCY_FACTOR: f64 = 0.5;

/// # Overview
///
/// Weighted coverage counts of one rule against the residual dataset at its
/// position in the ruleset.
///
/// Invariants: `covered_pos + covered_neg == covered` and
/// `covered + uncovered` equals the residual weight at the rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleCounts {
    pub covered:       f64,
    pub uncovered:     f64,
    pub covered_pos:   f64,
    pub covered_neg:   f64,
    pub uncovered_pos: f64,
    pub uncovered_neg: f64
}

/// Splits `data` by the rule and tallies the six weighted counts.
fn compute_counts(rule: &RipperRule, data: &Dataset) -> (RuleCounts, Dataset, Dataset) {
    let mut counts = RuleCounts::default();
    let mut covered = data.empty_like();
    let mut uncovered = data.empty_like();
    for i in 0..data.len() {
        let w = data.weight(i);
        let positive = data.class_value(i) as usize == rule.consequent();
        if rule.covers(data, i) {
            counts.covered += w;
            if positive {
                counts.covered_pos += w;
            } else {
                counts.covered_neg += w;
            }
            covered.push_raw(data.row(i).clone());
        } else {
            counts.uncovered += w;
            if positive {
                counts.uncovered_pos += w;
            } else {
                counts.uncovered_neg += w;
            }
            uncovered.push_raw(data.row(i).clone());
        }
    }
    (counts, covered, uncovered)
}

/// # Overview
///
/// Removes from `data` every row covered by a rule at an index greater than
/// `position`. Used when scoring revision variants.
#[must_use]
pub fn remove_covered_by_successors(
    data: &Dataset,
    rules: &[RipperRule],
    position: usize
) -> Dataset {
    let mut result = data.empty_like();
    for i in 0..data.len() {
        let covered = rules[position + 1..].iter().any(|r| r.covers(data, i));
        if !covered {
            result.push_raw(data.row(i).clone());
        }
    }
    result
}

/// # Overview
///
/// Per-ruleset accounting bound to a dataset snapshot: the six-count tuple
/// and the (covered, uncovered) residual partitions of each rule, plus the
/// description-length formulas driving RIPPER's stopping decisions.
///
/// The ruleset itself stays with the caller and is passed into each
/// operation; this type only indexes into it.
#[derive(Debug, Clone)]
pub struct RuleStats {
    data:          Dataset,
    stats:         Vec<RuleCounts>,
    filtered:      Vec<Option<(Dataset, Dataset)>>,
    num_all_conds: f64
}

impl RuleStats {
    /// Creates empty accounting over a dataset snapshot.
    #[must_use]
    pub fn new(data: Dataset, num_all_conds: f64) -> Self {
        Self {
            data,
            stats: Vec::new(),
            filtered: Vec::new(),
            num_all_conds
        }
    }

    /// # Overview
    ///
    /// Total number of possible antecedent conditions in the data: the
    /// domain size of every discrete attribute plus, for every continuous
    /// attribute, its number of distinct values minus one.
    #[must_use]
    pub fn num_all_conditions(data: &Dataset) -> f64 {
        let mut total = 0.0;
        for a in 1..data.num_attributes() {
            let att = data.attribute(a);
            if att.is_discrete() {
                total += att.num_values() as f64;
            } else {
                let mut values: Vec<f64> = data
                    .rows()
                    .filter(|r| !r.is_missing(a))
                    .map(|r| r.value(a))
                    .collect();
                values.sort_by(|x, y| x.total_cmp(y));
                total += values.windows(2).filter(|w| w[1] > w[0]).count() as f64;
            }
        }
        total
    }

    #[inline]
    #[must_use]
    pub fn num_rules(&self) -> usize {
        self.stats.len()
    }

    #[inline]
    #[must_use]
    pub fn counts(&self, i: usize) -> &RuleCounts {
        &self.stats[i]
    }

    /// Returns the (covered, uncovered) partitions of the residual at rule
    /// `i`, when they have been materialized.
    #[must_use]
    pub fn get_filtered(&self, i: usize) -> Option<(&Dataset, &Dataset)> {
        self.filtered
            .get(i)
            .and_then(|f| f.as_ref())
            .map(|(c, u)| (c, u))
    }

    /// # Overview
    ///
    /// Appends a rule: splits the current residual by its coverage and
    /// records the counts and partitions.
    pub fn push_rule(&mut self, rule: &RipperRule) {
        let residual = match self.filtered.last() {
            Some(Some((_, uncovered))) => uncovered.clone(),
            _ => self.data.clone()
        };
        let (counts, covered, uncovered) = compute_counts(rule, &residual);
        self.stats.push(counts);
        self.filtered.push(Some((covered, uncovered)));
    }

    /// Discards the accounting of the last rule.
    pub fn pop_rule(&mut self) {
        self.stats.pop();
        self.filtered.pop();
    }

    /// # Overview
    ///
    /// Rebuilds counts and partitions for a ruleset whose prefix is already
    /// known: stats for rules before `index` are copied from `prev`, rules
    /// from `index` on are replayed over `fresh` (the residual before
    /// `index`).
    pub fn count_data(
        &mut self,
        rules: &[RipperRule],
        index: usize,
        fresh: &Dataset,
        prev: &[RuleCounts]
    ) {
        self.stats.clear();
        self.filtered.clear();
        for counts in prev.iter().take(index) {
            self.stats.push(counts.clone());
            self.filtered.push(None);
        }
        let mut data = fresh.clone();
        for rule in &rules[index.min(rules.len())..] {
            let (counts, covered, uncovered) = compute_counts(rule, &data);
            data = uncovered.clone();
            self.stats.push(counts);
            self.filtered.push(Some((covered, uncovered)));
        }
    }

    /// Recomputes every count and partition from the base data.
    pub(crate) fn recount(&mut self, rules: &[RipperRule]) {
        self.stats.clear();
        self.filtered.clear();
        let mut data = self.data.clone();
        for rule in rules {
            let (counts, covered, uncovered) = compute_counts(rule, &data);
            data = uncovered.clone();
            self.stats.push(counts);
            self.filtered.push(Some((covered, uncovered)));
        }
    }

    /// Coding cost of choosing `k` elements out of `t` given probability
    /// `p`, with zero-probability terms contributing nothing.
    fn subset_dl(t: f64, k: f64, p: f64) -> f64 {
        let mut rt = if p > 0.0 { -k * p.log2() } else { 0.0 };
        if t > k && p < 1.0 {
            rt -= (t - k) * (1.0 - p).log2();
        }
        rt
    }

    /// # Overview
    ///
    /// Description length of the theory of rule `index`: the subset code for
    /// its antecedents among all possible conditions plus the code for the
    /// rule length, halved for redundancy.
    #[must_use]
    pub fn theory_dl(&self, rules: &[RipperRule], index: usize) -> f64 {
        let k = rules[index].size() as f64;
        if k == 0.0 {
            return 0.0;
        }
        let tdl = k.log2() + Self::subset_dl(self.num_all_conds, k, k / self.num_all_conds);
        REDUNDANCY_FACTOR * tdl
    }

    /// # Overview
    ///
    /// Description length of the data given a ruleset with the given
    /// coverage, false positives and uncovered positives, under the
    /// expected false-positive rate.
    #[must_use]
    pub fn data_dl(
        exp_fp_rate: f64,
        cover: f64,
        uncover: f64,
        false_pos: f64,
        false_neg: f64
    ) -> f64 {
        let total_bits = (cover + uncover + 1.0).log2();
        let cover_bits;
        let uncover_bits;
        if cover > uncover {
            let exp_err = exp_fp_rate * (false_pos + false_neg);
            cover_bits = Self::subset_dl(cover, false_pos, exp_err / cover);
            uncover_bits = if uncover > 0.0 {
                Self::subset_dl(uncover, false_neg, false_neg / uncover)
            } else {
                0.0
            };
        } else {
            let exp_err = (1.0 - exp_fp_rate) * (false_pos + false_neg);
            cover_bits = if cover > 0.0 {
                Self::subset_dl(cover, false_pos, false_pos / cover)
            } else {
                0.0
            };
            uncover_bits = Self::subset_dl(uncover, false_neg, exp_err / uncover);
        }
        total_bits + cover_bits + uncover_bits
    }

    /// Cumulative counts of the whole ruleset: coverage sums over every
    /// rule, the uncovered side comes from the last rule.
    fn ruleset_counts(&self) -> RuleCounts {
        let mut rs = RuleCounts::default();
        for (j, st) in self.stats.iter().enumerate() {
            rs.covered += st.covered;
            rs.covered_pos += st.covered_pos;
            rs.covered_neg += st.covered_neg;
            if j == self.stats.len() - 1 {
                rs.uncovered = st.uncovered;
                rs.uncovered_pos = st.uncovered_pos;
                rs.uncovered_neg = st.uncovered_neg;
            }
        }
        rs
    }

    /// # Overview
    ///
    /// Description-length gain of deleting rule `index` from the ruleset
    /// described by `ruleset` counts. When the deletion pays off (or the
    /// rule's error rate disqualifies it), updates `ruleset` to reflect the
    /// deletion and returns the gain; otherwise returns `None`.
    fn potential(
        &self,
        rules: &[RipperRule],
        index: usize,
        exp_fp_rate: f64,
        ruleset: &mut RuleCounts,
        rule: &RuleCounts,
        check_err: bool
    ) -> Option<f64> {
        let cov = ruleset.covered - rule.covered;
        let uncov = ruleset.uncovered + rule.covered;
        let false_pos = ruleset.covered_neg - rule.covered_neg;
        let false_neg = ruleset.uncovered_pos + rule.covered_pos;

        let data_dl_with = Self::data_dl(
            exp_fp_rate,
            ruleset.covered,
            ruleset.uncovered,
            ruleset.covered_neg,
            ruleset.uncovered_pos
        );
        let theory_dl_with = self.theory_dl(rules, index);
        let data_dl_without = Self::data_dl(exp_fp_rate, cov, uncov, false_pos, false_neg);
        let potential = data_dl_with + theory_dl_with - data_dl_without;
        if potential.is_nan() {
            return None;
        }

        let err_rate = rule.covered_neg / rule.covered;
        let over_err = check_err && err_rate >= 0.5;
        if potential >= 0.0 || over_err {
            ruleset.covered = cov;
            ruleset.uncovered = uncov;
            ruleset.covered_neg = false_pos;
            ruleset.uncovered_pos = false_neg;
            Some(potential)
        } else {
            None
        }
    }

    /// Minimum data DL of the ruleset with rule `index` kept, allowing
    /// later rules to be hypothetically deleted when that pays off.
    #[must_use]
    pub fn min_data_dl_if_exists(
        &self,
        rules: &[RipperRule],
        index: usize,
        exp_fp_rate: f64,
        check_err: bool
    ) -> f64 {
        let mut rs = self.ruleset_counts();
        let mut total = 0.0;
        for k in (index + 1)..self.stats.len() {
            let rstat = self.stats[k].clone();
            if let Some(p) = self.potential(rules, k, exp_fp_rate, &mut rs, &rstat, check_err) {
                total += p;
            }
        }
        total + Self::data_dl(exp_fp_rate, rs.covered, rs.uncovered, rs.covered_neg, rs.uncovered_pos)
    }

    /// Minimum data DL of the ruleset with rule `index` deleted: stats of
    /// the following rules are recounted on the residual at `index`.
    #[must_use]
    pub fn min_data_dl_if_deleted(
        &self,
        rules: &[RipperRule],
        index: usize,
        exp_fp_rate: f64,
        check_err: bool
    ) -> f64 {
        let size = self.stats.len();
        let mut rs = RuleCounts::default();
        for st in self.stats.iter().take(index) {
            rs.covered += st.covered;
            rs.covered_pos += st.covered_pos;
            rs.covered_neg += st.covered_neg;
        }

        let mut recounted: Vec<RuleCounts> = Vec::new();
        if index + 1 < size {
            let mut data = match &self.filtered[index] {
                Some((_, uncovered)) => uncovered.clone(),
                None => self.data.clone()
            };
            for rule in &rules[index + 1..size] {
                let (counts, _, uncovered) = compute_counts(rule, &data);
                rs.covered += counts.covered;
                rs.covered_pos += counts.covered_pos;
                rs.covered_neg += counts.covered_neg;
                data = uncovered;
                recounted.push(counts);
            }
            if let Some(last) = recounted.last() {
                rs.uncovered = last.uncovered;
                rs.uncovered_pos = last.uncovered_pos;
                rs.uncovered_neg = last.uncovered_neg;
            }
        } else if index > 0 {
            let prev = &self.stats[index - 1];
            rs.uncovered = prev.uncovered;
            rs.uncovered_pos = prev.uncovered_pos;
            rs.uncovered_neg = prev.uncovered_neg;
        } else {
            // deleting the only rule leaves nothing covered
            for row in self.data.rows() {
                rs.uncovered += row.weight;
                if row.class_value() as usize == rules[index].consequent() {
                    rs.uncovered_pos += row.weight;
                } else {
                    rs.uncovered_neg += row.weight;
                }
            }
        }

        let mut total = 0.0;
        for k in (index + 1)..size {
            let rstat = recounted[k - index - 1].clone();
            if let Some(p) = self.potential(rules, k, exp_fp_rate, &mut rs, &rstat, check_err) {
                total += p;
            }
        }
        total + Self::data_dl(exp_fp_rate, rs.covered, rs.uncovered, rs.covered_neg, rs.uncovered_pos)
    }

    /// # Overview
    ///
    /// Description length of rule `index` relative to the ruleset: the DL of
    /// keeping it (data plus theory) minus the DL of deleting it.
    #[must_use]
    pub fn relative_dl(
        &self,
        rules: &[RipperRule],
        index: usize,
        exp_fp_rate: f64,
        check_err: bool
    ) -> f64 {
        self.min_data_dl_if_exists(rules, index, exp_fp_rate, check_err)
            + self.theory_dl(rules, index)
            - self.min_data_dl_if_deleted(rules, index, exp_fp_rate, check_err)
    }

    /// # Overview
    ///
    /// Walks the ruleset from the last rule to the first, deleting every
    /// rule whose removal decreases the total description length, and
    /// recounts the remaining rules when a middle rule was removed.
    pub fn reduce_dl(&mut self, rules: &mut Vec<RipperRule>, exp_fp_rate: f64, check_err: bool) {
        if self.stats.is_empty() {
            return;
        }
        let mut rs = self.ruleset_counts();
        let mut need_update = false;
        for k in (0..self.stats.len()).rev() {
            let rstat = self.stats[k].clone();
            if self
                .potential(rules, k, exp_fp_rate, &mut rs, &rstat, check_err)
                .is_some()
            {
                log::debug!("reduce_dl: dropping rule at {k}");
                if k == self.stats.len() - 1 {
                    self.pop_rule();
                    rules.pop();
                } else {
                    rules.remove(k);
                    need_update = true;
                }
            }
        }
        if need_update {
            self.recount(rules);
        }
    }
}
