//! RIPPER rules: conjunctions of antecedents grown, pruned and cleaned on
//! dataset partitions.

use crate::{
    Attribute, Dataset,
    antecedent::{Antecedent, Direction, Test}
};

/// # Overview
///
/// An IF-THEN rule: an ordered conjunction of antecedents predicting a class
/// index. A rule with no antecedents covers every row (the default rule).
///
/// # Examples
///
/// ```
/// use ripper_rs::{Antecedent, RipperRule};
///
/// let mut rule = RipperRule::new(0);
/// rule.push_antecedent(Antecedent::greater_equal(2, 77.5));
///
/// assert_eq!(rule.consequent(), 0);
/// assert_eq!(rule.size(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct RipperRule {
    consequent:  usize,
    antecedents: Vec<Antecedent>
}

impl RipperRule {
    /// Creates an empty rule predicting the given class index.
    #[must_use]
    pub fn new(consequent: usize) -> Self {
        Self {
            consequent,
            antecedents: Vec::new()
        }
    }

    #[inline]
    #[must_use]
    pub fn consequent(&self) -> usize {
        self.consequent
    }

    pub(crate) fn set_consequent(&mut self, consequent: usize) {
        self.consequent = consequent;
    }

    #[inline]
    #[must_use]
    pub fn antecedents(&self) -> &[Antecedent] {
        &self.antecedents
    }

    /// Number of antecedents.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.antecedents.len()
    }

    /// Returns true if this rule has no antecedents.
    #[inline]
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.antecedents.is_empty()
    }

    /// Appends an antecedent to the conjunction.
    pub fn push_antecedent(&mut self, antd: Antecedent) {
        self.antecedents.push(antd);
    }

    /// # Overview
    ///
    /// Returns true if row `i` of `data` passes every antecedent.
    #[must_use]
    pub fn covers(&self, data: &Dataset, i: usize) -> bool {
        self.antecedents.iter().all(|antd| antd.covers(data, i))
    }

    /// Weight of the rows in `data` whose class matches the consequent.
    #[must_use]
    pub(crate) fn default_accuracy(&self, data: &Dataset) -> f64 {
        data.rows()
            .filter(|r| r.class_value() as usize == self.consequent)
            .map(|r| r.weight)
            .sum()
    }

    /// Splits `data` into the rows covered and not covered by this rule.
    #[must_use]
    pub fn split_covered(&self, data: &Dataset) -> (Dataset, Dataset) {
        let mut covered = data.empty_like();
        let mut uncovered = data.empty_like();
        for i in 0..data.len() {
            if self.covers(data, i) {
                covered.push_raw(data.row(i).clone());
            } else {
                uncovered.push_raw(data.row(i).clone());
            }
        }
        (covered, uncovered)
    }

    /// # Overview
    ///
    /// Greedy hill-climb: repeatedly appends the antecedent with the highest
    /// information gain, shrinking the growing data to the covered subset.
    ///
    /// Discrete attributes are used at most once per rule; continuous
    /// attributes may be re-tested. Growing stops when no antecedent gains,
    /// the best one accurately covers less than `min_no` weight, or the
    /// covered subset becomes pure.
    pub fn grow(&mut self, grow_data: Dataset, min_no: f64) {
        let mut grow = grow_data;
        let n_attrs = grow.num_attributes();
        let mut used = vec![false; n_attrs];
        for antd in &self.antecedents {
            if !antd.is_continuous() {
                used[antd.attr()] = true;
            }
        }

        loop {
            let usable = (1..n_attrs)
                .filter(|&a| grow.attribute(a).is_continuous() || !used[a])
                .count();
            if grow.is_empty() || usable == 0 {
                break;
            }
            let def_accu = self.default_accuracy(&grow);
            let def_accu_rate = (def_accu + 1.0) / (grow.sum_of_weights() + 1.0);
            if def_accu_rate >= 1.0 {
                break;
            }

            let mut best: Option<(Antecedent, Dataset)> = None;
            let mut max_info_gain = 0.0;
            for a in 1..n_attrs {
                let discrete = grow.attribute(a).is_discrete();
                if discrete && used[a] {
                    continue;
                }
                let mut antd = if discrete {
                    Antecedent::discrete(a)
                } else {
                    Antecedent::continuous(a)
                };
                let Some(mut bags) = antd.split_data(&grow, def_accu_rate, self.consequent) else {
                    continue;
                };
                // ties go to the first attribute that reached the gain
                if antd.max_info_gain() > max_info_gain {
                    if let Some(v) = antd.chosen_bag() {
                        max_info_gain = antd.max_info_gain();
                        best = Some((antd, bags.swap_remove(v)));
                    }
                }
            }

            let Some((antd, covered)) = best else { break };
            if antd.accu() < min_no {
                break;
            }
            if !antd.is_continuous() {
                used[antd.attr()] = true;
            }
            self.antecedents.push(antd);
            grow = covered;
        }
    }

    /// # Overview
    ///
    /// Reduced-error pruning: scores every prefix of the antecedent list on
    /// `prune_data` and truncates to the best one, preferring shorter rules
    /// on ties.
    ///
    /// With `use_whole` the worth of a prefix counts true negatives
    /// accumulated over the whole pruning data; otherwise it is the
    /// Laplace-corrected accuracy of the covered rows.
    pub fn prune(&mut self, prune_data: &Dataset, use_whole: bool) {
        let total = prune_data.sum_of_weights();
        if total <= 0.0 {
            return;
        }
        let def_accu = self.default_accuracy(prune_data);
        let size = self.antecedents.len();
        if size == 0 {
            return;
        }

        let mut worth_rate = vec![0.0; size];
        let mut coverage = vec![0.0; size];
        let mut worth = vec![0.0; size];
        let mut tn = 0.0;
        let mut data = prune_data.clone();

        for x in 0..size {
            let antd = &self.antecedents[x];
            let mut kept = data.empty_like();
            for i in 0..data.len() {
                let w = data.weight(i);
                let accurate = data.class_value(i) as usize == self.consequent;
                if antd.covers(&data, i) {
                    coverage[x] += w;
                    if accurate {
                        worth[x] += w;
                    }
                    kept.push_raw(data.row(i).clone());
                } else if use_whole && !accurate {
                    tn += w;
                }
            }
            worth_rate[x] = if use_whole {
                (worth[x] + tn) / total
            } else {
                (worth[x] + 1.0) / (coverage[x] + 2.0)
            };
            data = kept;
        }

        let mut max_value = (def_accu + 1.0) / (total + 2.0);
        let mut max_index = None;
        for x in 0..size {
            if worth_rate[x] > max_value {
                max_value = worth_rate[x];
                max_index = Some(x);
            }
        }
        self.antecedents.truncate(max_index.map_or(0, |x| x + 1));
    }

    /// # Overview
    ///
    /// Removes dominated numeric tests: per attribute and direction only the
    /// tightest bound survives (the smallest `<=` split, the largest `>=`
    /// split). Discrete tests are left untouched.
    pub fn clean_up(&mut self, data: &Dataset) {
        let n = data.num_attributes();
        let mut mins = vec![f64::INFINITY; n];
        let mut maxs = vec![f64::NEG_INFINITY; n];
        for antd in &self.antecedents {
            if let Test::Continuous {
                split,
                direction: Some(dir)
            } = antd.test()
            {
                let a = antd.attr();
                match dir {
                    Direction::Le => mins[a] = mins[a].min(*split),
                    Direction::Ge => maxs[a] = maxs[a].max(*split)
                }
            }
        }

        let mut kept_le = vec![false; n];
        let mut kept_ge = vec![false; n];
        for i in (0..self.antecedents.len()).rev() {
            let antd = &self.antecedents[i];
            let a = antd.attr();
            let dominated = match antd.test() {
                Test::Continuous {
                    split,
                    direction: Some(Direction::Le)
                } => {
                    if *split <= mins[a] && !kept_le[a] {
                        kept_le[a] = true;
                        false
                    } else {
                        true
                    }
                }
                Test::Continuous {
                    split,
                    direction: Some(Direction::Ge)
                } => {
                    if *split >= maxs[a] && !kept_ge[a] {
                        kept_ge[a] = true;
                        false
                    } else {
                        true
                    }
                }
                _ => false
            };
            if dominated {
                self.antecedents.remove(i);
            }
        }
    }

    /// Renders this rule against a schema, e.g.
    /// `(outlook = sunny) and (humidity >= 77.5) => play=no`.
    #[must_use]
    pub fn render(&self, schema: &[Attribute]) -> String {
        let lhs = if self.antecedents.is_empty() {
            "()".to_string()
        } else {
            self.antecedents
                .iter()
                .map(|antd| antd.render(schema))
                .collect::<Vec<_>>()
                .join(" and ")
        };
        let class = &schema[0];
        format!(
            "{lhs} => {}={}",
            class.name(),
            class.repr_val(self.consequent as f64)
        )
    }
}
