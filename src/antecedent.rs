//! Single-attribute tests and the information-gain split search.

use crate::{Attribute, Dataset};

/// Direction of a numeric threshold test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Covers values less than or equal to the split point.
    Le,
    /// Covers values greater than or equal to the split point.
    Ge
}

/// The test half of an antecedent, bound to one attribute.
///
/// A freshly constructed candidate has its target or direction unset until
/// [`Antecedent::split_data`] finds a winning split.
#[derive(Debug, Clone, PartialEq)]
pub enum Test {
    Discrete { target: Option<usize> },
    Continuous { split: f64, direction: Option<Direction> }
}

/// # Overview
///
/// A single test on one attribute: discrete equality or numeric threshold.
///
/// Carries the scoring fields filled in by [`Antecedent::split_data`] and
/// consumed by rule growing: the best information gain found, the accuracy
/// rate, and the weighted coverage and accurate coverage of the chosen bag.
#[derive(Debug, Clone)]
pub struct Antecedent {
    attr:          usize,
    test:          Test,
    max_info_gain: f64,
    accu_rate:     f64,
    cover:         f64,
    accu:          f64
}

impl Antecedent {
    /// Creates an unscored discrete-equality candidate for attribute `attr`.
    #[must_use]
    pub(crate) fn discrete(attr: usize) -> Self {
        Self {
            attr,
            test: Test::Discrete {
                target: None
            },
            max_info_gain: 0.0,
            accu_rate: f64::NAN,
            cover: f64::NAN,
            accu: f64::NAN
        }
    }

    /// Creates an unscored numeric-threshold candidate for attribute `attr`.
    #[must_use]
    pub(crate) fn continuous(attr: usize) -> Self {
        Self {
            attr,
            test: Test::Continuous {
                split:     f64::NAN,
                direction: None
            },
            max_info_gain: 0.0,
            accu_rate: f64::NAN,
            cover: f64::NAN,
            accu: f64::NAN
        }
    }

    /// Creates a discrete equality test `attr == target`.
    #[must_use]
    pub fn equal(attr: usize, target: usize) -> Self {
        let mut antd = Self::discrete(attr);
        antd.test = Test::Discrete {
            target: Some(target)
        };
        antd
    }

    /// Creates a numeric test `attr <= split`.
    #[must_use]
    pub fn less_equal(attr: usize, split: f64) -> Self {
        let mut antd = Self::continuous(attr);
        antd.test = Test::Continuous {
            split,
            direction: Some(Direction::Le)
        };
        antd
    }

    /// Creates a numeric test `attr >= split`.
    #[must_use]
    pub fn greater_equal(attr: usize, split: f64) -> Self {
        let mut antd = Self::continuous(attr);
        antd.test = Test::Continuous {
            split,
            direction: Some(Direction::Ge)
        };
        antd
    }

    #[inline]
    #[must_use]
    pub fn attr(&self) -> usize {
        self.attr
    }

    #[inline]
    #[must_use]
    pub fn test(&self) -> &Test {
        &self.test
    }

    #[inline]
    #[must_use]
    pub fn is_continuous(&self) -> bool {
        matches!(self.test, Test::Continuous { .. })
    }

    #[inline]
    #[must_use]
    pub fn max_info_gain(&self) -> f64 {
        self.max_info_gain
    }

    #[inline]
    #[must_use]
    pub fn accu_rate(&self) -> f64 {
        self.accu_rate
    }

    /// Weighted coverage of the chosen bag.
    #[inline]
    #[must_use]
    pub fn cover(&self) -> f64 {
        self.cover
    }

    /// Weighted accurate coverage of the chosen bag.
    #[inline]
    #[must_use]
    pub fn accu(&self) -> f64 {
        self.accu
    }

    /// Index of the bag chosen by `split_data`: the target domain index for
    /// a discrete test, 0 (≤) or 1 (≥) for a numeric one.
    #[must_use]
    pub(crate) fn chosen_bag(&self) -> Option<usize> {
        match &self.test {
            Test::Discrete {
                target
            } => *target,
            Test::Continuous {
                direction, ..
            } => direction.map(|d| match d {
                Direction::Le => 0,
                Direction::Ge => 1
            })
        }
    }

    /// # Overview
    ///
    /// Partitions `data` by this antecedent's attribute, scoring every
    /// candidate test against `target_class` and keeping the best one.
    ///
    /// For a discrete attribute the partitions are the per-value bags; for a
    /// continuous attribute they are the (≤ split, > split) halves of the
    /// best split position. Rows with a missing value are dropped from every
    /// partition. Returns `None` when no row has a value for the attribute.
    pub fn split_data(
        &mut self,
        data: &Dataset,
        def_accu_rate: f64,
        target_class: usize
    ) -> Option<Vec<Dataset>> {
        if self.is_continuous() {
            self.split_continuous(data, def_accu_rate, target_class)
        } else {
            Some(self.split_discrete(data, def_accu_rate, target_class))
        }
    }

    fn split_discrete(
        &mut self,
        data: &Dataset,
        def_accu_rate: f64,
        target_class: usize
    ) -> Vec<Dataset> {
        let bag = data.attribute(self.attr).num_values();
        let mut splits = vec![data.empty_like(); bag];
        let mut coverage = vec![0.0; bag];
        let mut accurate = vec![0.0; bag];

        for row in data.rows() {
            if row.is_missing(self.attr) {
                continue;
            }
            let v = row.value(self.attr) as usize;
            if v >= bag {
                continue;
            }
            splits[v].push_raw(row.clone());
            coverage[v] += row.weight;
            if row.class_value() as usize == target_class {
                accurate[v] += row.weight;
            }
        }

        for x in 0..bag {
            let t = coverage[x] + 1.0;
            let p = accurate[x] + 1.0;
            let info_gain = accurate[x] * ((p / t).log2() - def_accu_rate.log2());
            if info_gain > self.max_info_gain {
                self.max_info_gain = info_gain;
                self.accu_rate = p / t;
                self.cover = coverage[x];
                self.accu = accurate[x];
                self.test = Test::Discrete {
                    target: Some(x)
                };
            }
        }
        splits
    }

    fn split_continuous(
        &mut self,
        data: &Dataset,
        def_accu_rate: f64,
        target_class: usize
    ) -> Option<Vec<Dataset>> {
        let mut sorted = data.clone();
        sorted.sort_by_attribute(self.attr);

        // rows with a missing value sort last; count the rest into the
        // second (>) bag to start with
        let mut total = sorted.len();
        let mut snd_cover = 0.0;
        let mut snd_accu = 0.0;
        for (i, row) in sorted.rows().enumerate() {
            if row.is_missing(self.attr) {
                total = i;
                break;
            }
            snd_cover += row.weight;
            if row.class_value() as usize == target_class {
                snd_accu += row.weight;
            }
        }
        if total == 0 {
            return None;
        }

        let mut split_point = sorted.value(total - 1, self.attr);
        let mut direction = None;
        let mut final_split = 1;
        let mut fst_cover = 0.0;
        let mut fst_accu = 0.0;
        let mut prev = 0;

        for split in 1..=total {
            // never split within a run of equal values
            if split < total && sorted.value(split, self.attr) <= sorted.value(split - 1, self.attr)
            {
                continue;
            }
            for y in prev..split {
                let w = sorted.weight(y);
                fst_cover += w;
                snd_cover -= w;
                if sorted.class_value(y) as usize == target_class {
                    fst_accu += w;
                    snd_accu -= w;
                }
            }
            let fst_rate = (fst_accu + 1.0) / (fst_cover + 1.0);
            let snd_rate = (snd_accu + 1.0) / (snd_cover + 1.0);
            let fst_gain = fst_accu * (fst_rate.log2() - def_accu_rate.log2());
            let snd_gain = snd_accu * (snd_rate.log2() - def_accu_rate.log2());

            let (dir, gain, rate, accurate, coverage) = if fst_gain > snd_gain {
                (Direction::Le, fst_gain, fst_rate, fst_accu, fst_cover)
            } else {
                (Direction::Ge, snd_gain, snd_rate, snd_accu, snd_cover)
            };
            if gain > self.max_info_gain {
                self.max_info_gain = gain;
                // halfway between the last row below and the first row above,
                // so both directions cover exactly their bag
                split_point = if split == total {
                    sorted.value(split - 1, self.attr)
                } else {
                    (sorted.value(split - 1, self.attr) + sorted.value(split, self.attr)) / 2.0
                };
                direction = Some(dir);
                self.accu_rate = rate;
                self.accu = accurate;
                self.cover = coverage;
                final_split = split;
            }
            prev = split;
        }

        self.test = Test::Continuous {
            split: split_point,
            direction
        };
        Some(vec![
            sorted.slice(0, final_split),
            sorted.slice(final_split, total - final_split),
        ])
    }

    /// # Overview
    ///
    /// Returns true if row `i` of `data` passes this test.
    ///
    /// A missing value never passes, and an unset test never passes.
    #[must_use]
    pub fn covers(&self, data: &Dataset, i: usize) -> bool {
        if data.is_missing(i, self.attr) {
            return false;
        }
        let v = data.value(i, self.attr);
        match &self.test {
            Test::Discrete {
                target
            } => target.is_some_and(|t| v as usize == t),
            Test::Continuous {
                split,
                direction
            } => match direction {
                Some(Direction::Le) => v <= *split,
                Some(Direction::Ge) => v >= *split,
                None => false
            }
        }
    }

    /// Renders this test against a schema, e.g. `(outlook = sunny)`.
    #[must_use]
    pub fn render(&self, schema: &[Attribute]) -> String {
        let att = &schema[self.attr];
        match &self.test {
            Test::Discrete {
                target
            } => match target {
                Some(t) => format!("({} = {})", att.name(), att.repr_val(*t as f64)),
                None => format!("({} = ?)", att.name())
            },
            Test::Continuous {
                split,
                direction
            } => {
                let op = match direction {
                    Some(Direction::Le) => "<=",
                    Some(Direction::Ge) => ">=",
                    None => "?"
                };
                format!("({} {} {})", att.name(), op, att.repr_val(*split))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Attribute, Instance, MISSING};

    fn weather_lite() -> Dataset {
        // class, outlook (sunny/overcast/rain), humidity
        let mut data = Dataset::new(vec![
            Attribute::discrete("play", &["no", "yes"]),
            Attribute::discrete("outlook", &["sunny", "overcast", "rain"]),
            Attribute::continuous("humidity"),
        ])
        .unwrap();
        let rows = [
            (0.0, 0.0, 85.0),
            (0.0, 0.0, 90.0),
            (1.0, 1.0, 86.0),
            (1.0, 2.0, 80.0),
            (0.0, 2.0, 95.0),
            (1.0, 0.0, 70.0),
        ];
        for (c, o, h) in rows {
            data.push(Instance::new(vec![c, o, h])).unwrap();
        }
        data
    }

    #[test]
    fn discrete_split_picks_best_bag() {
        let data = weather_lite();
        let mut antd = Antecedent::discrete(1);
        let def_accu_rate = (3.0 + 1.0) / (6.0 + 1.0);

        let bags = antd.split_data(&data, def_accu_rate, 0).unwrap();

        assert_eq!(bags.len(), 3);
        assert_eq!(bags[0].len(), 3);
        assert_eq!(bags[1].len(), 1);
        assert_eq!(bags[2].len(), 2);
        // sunny holds 2 of 3 "no" rows: the best bag
        assert_eq!(antd.chosen_bag(), Some(0));
        assert!(antd.max_info_gain() > 0.0);
        assert_eq!(antd.accu(), 2.0);
        assert_eq!(antd.cover(), 3.0);
    }

    #[test]
    fn discrete_split_drops_missing() {
        let mut data = weather_lite();
        data.push(Instance::new(vec![0.0, MISSING, 80.0])).unwrap();
        let mut antd = Antecedent::discrete(1);

        let bags = antd.split_data(&data, 0.5, 0).unwrap();

        let total: usize = bags.iter().map(Dataset::len).sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn continuous_split_finds_threshold() {
        // class 1 iff x > 4
        let mut data = Dataset::new(vec![
            Attribute::discrete("c", &["lo", "hi"]),
            Attribute::continuous("x"),
        ])
        .unwrap();
        for (c, x) in [
            (0.0, 1.0),
            (0.0, 2.0),
            (0.0, 3.0),
            (0.0, 4.0),
            (1.0, 5.0),
            (1.0, 6.0),
            (1.0, 7.0),
        ] {
            data.push(Instance::new(vec![c, x])).unwrap();
        }

        let mut antd = Antecedent::continuous(1);
        let def_accu_rate = (3.0 + 1.0) / (7.0 + 1.0);
        let bags = antd.split_data(&data, def_accu_rate, 1).unwrap();

        assert_eq!(
            antd.test(),
            &Test::Continuous {
                split:     4.5,
                direction: Some(Direction::Ge)
            }
        );
        assert_eq!(bags[0].len(), 4);
        assert_eq!(bags[1].len(), 3);
        assert_eq!(antd.accu(), 3.0);
    }

    #[test]
    fn continuous_split_never_separates_equal_values() {
        let mut data = Dataset::new(vec![
            Attribute::discrete("c", &["lo", "hi"]),
            Attribute::continuous("x"),
        ])
        .unwrap();
        for (c, x) in [(0.0, 1.0), (0.0, 1.0), (1.0, 1.0), (1.0, 2.0)] {
            data.push(Instance::new(vec![c, x])).unwrap();
        }

        let mut antd = Antecedent::continuous(1);
        let bags = antd.split_data(&data, 0.5, 1).unwrap();

        // the only legal split is between the 1.0-run and 2.0
        assert_eq!(bags[0].len(), 3);
        assert_eq!(bags[1].len(), 1);
        assert!(bags[0].rows().all(|r| r.value(1) == 1.0));
    }

    #[test]
    fn continuous_split_none_when_all_missing() {
        let mut data = Dataset::new(vec![
            Attribute::discrete("c", &["lo", "hi"]),
            Attribute::continuous("x"),
        ])
        .unwrap();
        data.push(Instance::new(vec![0.0, MISSING])).unwrap();

        let mut antd = Antecedent::continuous(1);
        assert!(antd.split_data(&data, 0.5, 0).is_none());
    }

    #[test]
    fn covers_per_variant() {
        let data = weather_lite();

        let sunny = Antecedent::equal(1, 0);
        assert!(sunny.covers(&data, 0));
        assert!(!sunny.covers(&data, 2));

        let humid = Antecedent::greater_equal(2, 85.0);
        assert!(humid.covers(&data, 0));
        assert!(!humid.covers(&data, 3));

        let dry = Antecedent::less_equal(2, 80.0);
        assert!(dry.covers(&data, 3));
        assert!(!dry.covers(&data, 0));
    }

    #[test]
    fn covers_is_false_on_missing() {
        let mut data = weather_lite();
        data.push(Instance::new(vec![0.0, MISSING, MISSING])).unwrap();
        let last = data.len() - 1;

        assert!(!Antecedent::equal(1, 0).covers(&data, last));
        assert!(!Antecedent::less_equal(2, 100.0).covers(&data, last));
    }

    #[test]
    fn render_against_schema() {
        let data = weather_lite();

        assert_eq!(Antecedent::equal(1, 0).render(data.attributes()), "(outlook = sunny)");
        assert_eq!(
            Antecedent::greater_equal(2, 77.5).render(data.attributes()),
            "(humidity >= 77.5)"
        );
    }
}
