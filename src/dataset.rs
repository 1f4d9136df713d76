//! Ordered collection of weighted rows over a fixed attribute schema.

use std::collections::HashSet;

use rand::Rng;

use crate::{
    Attribute, Instance,
    error::{Error, Result},
    utils
};

/// # Overview
///
/// A dataset: an ordered attribute schema plus an ordered sequence of
/// weighted rows.
///
/// The schema is frozen after construction. The class attribute is always
/// discrete and placed at index 0.
///
/// # Examples
///
/// ```
/// use ripper_rs::{Attribute, Dataset, Instance};
///
/// let mut data = Dataset::new(vec![
///     Attribute::discrete("play", &["no", "yes"]),
///     Attribute::continuous("humidity"),
/// ])
/// .unwrap();
///
/// data.push(Instance::new(vec![0.0, 85.0])).unwrap();
/// data.push(Instance::new(vec![1.0, 70.0])).unwrap();
///
/// assert_eq!(data.len(), 2);
/// assert_eq!(data.num_classes(), 2);
/// assert_eq!(data.sum_of_weights(), 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct Dataset {
    attributes: Vec<Attribute>,
    rows:       Vec<Instance>
}

impl Dataset {
    /// # Overview
    ///
    /// Creates an empty dataset over the given schema.
    ///
    /// The first attribute is the class attribute and must be discrete with
    /// a non-empty domain; discrete domains must not contain duplicates.
    pub fn new(attributes: Vec<Attribute>) -> Result<Self> {
        let Some(class) = attributes.first() else {
            return Err(Error::NoAttributes);
        };
        if class.is_continuous() {
            return Err(Error::ContinuousClass);
        }
        if class.num_values() == 0 {
            return Err(Error::EmptyClassDomain);
        }
        for att in &attributes {
            if let Some(labels) = att.labels() {
                let mut seen = HashSet::new();
                for label in labels {
                    if !seen.insert(label) {
                        return Err(Error::DuplicateLabel(label.clone()));
                    }
                }
            }
        }
        Ok(Self {
            attributes,
            rows: Vec::new()
        })
    }

    /// Creates an empty dataset with this dataset's schema.
    #[must_use]
    pub fn empty_like(&self) -> Self {
        Self {
            attributes: self.attributes.clone(),
            rows:       Vec::new()
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    /// Domain size of the class attribute.
    #[inline]
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.attributes[0].num_values()
    }

    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    #[inline]
    #[must_use]
    pub fn attribute(&self, a: usize) -> &Attribute {
        &self.attributes[a]
    }

    #[inline]
    #[must_use]
    pub fn row(&self, i: usize) -> &Instance {
        &self.rows[i]
    }

    #[inline]
    pub fn rows(&self) -> impl Iterator<Item = &Instance> {
        self.rows.iter()
    }

    #[inline]
    #[must_use]
    pub fn weight(&self, i: usize) -> f64 {
        self.rows[i].weight
    }

    #[inline]
    #[must_use]
    pub fn value(&self, i: usize, a: usize) -> f64 {
        self.rows[i].values[a]
    }

    #[inline]
    #[must_use]
    pub fn is_missing(&self, i: usize, a: usize) -> bool {
        self.rows[i].is_missing(a)
    }

    #[inline]
    #[must_use]
    pub fn class_value(&self, i: usize) -> f64 {
        self.rows[i].class_value()
    }

    /// Total weight over all rows.
    #[must_use]
    pub fn sum_of_weights(&self) -> f64 {
        self.rows.iter().map(|r| r.weight).sum()
    }

    /// # Overview
    ///
    /// Appends a row, checking its length against the schema.
    pub fn push(&mut self, row: Instance) -> Result<()> {
        if row.values.len() != self.attributes.len() {
            return Err(Error::DimensionMismatch {
                expected: self.attributes.len(),
                got:      row.values.len()
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Appends a row known to match the schema.
    #[inline]
    pub(crate) fn push_raw(&mut self, row: Instance) {
        debug_assert_eq!(row.values.len(), self.attributes.len());
        self.rows.push(row);
    }

    /// # Overview
    ///
    /// Returns a new dataset holding `len` rows starting at `from`.
    ///
    /// The range is clamped to the available rows.
    #[must_use]
    pub fn slice(&self, from: usize, len: usize) -> Self {
        let start = from.min(self.rows.len());
        let end = (from + len).min(self.rows.len());
        Self {
            attributes: self.attributes.clone(),
            rows:       self.rows[start..end].to_vec()
        }
    }

    /// # Overview
    ///
    /// Stable sort of the rows by the value of attribute `a`, ascending,
    /// missing values last.
    pub fn sort_by_attribute(&mut self, a: usize) {
        // MISSING is positive NaN, which total_cmp orders after every real.
        self.rows.sort_by(|r, s| r.values[a].total_cmp(&s.values[a]));
    }

    /// Shuffles the rows in place.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        utils::shuffle(&mut self.rows, rng);
    }

    /// # Overview
    ///
    /// Reorders rows so that classes are evenly distributed across `folds`
    /// folds: rows are grouped by class preserving order, then each fold
    /// gathers every folds-th row from every class group.
    ///
    /// Deterministic given the input order.
    #[must_use]
    pub fn stratify(&self, folds: usize) -> Self {
        let mut bags: Vec<Vec<&Instance>> = vec![Vec::new(); self.num_classes()];
        for row in &self.rows {
            let c = row.class_value() as usize;
            if c < bags.len() {
                bags[c].push(row);
            }
        }

        let mut result = self.empty_like();
        for k in 0..folds {
            for bag in &bags {
                let mut j = k;
                while j < bag.len() {
                    result.push_raw(bag[j].clone());
                    j += folds;
                }
            }
        }
        result
    }

    /// # Overview
    ///
    /// Splits an already stratified dataset into (grow, prune) folds, with
    /// the first `folds - 1` folds growing and the last one pruning.
    #[must_use]
    pub fn partition(&self, folds: usize) -> (Self, Self) {
        let n = self.rows.len();
        let split = (n * (folds - 1)).div_ceil(folds);
        (self.slice(0, split), self.slice(split, n - split))
    }

    /// # Overview
    ///
    /// Renumbers the class domain in ascending order of weighted class
    /// count, ties broken by original index, and remaps every row's class
    /// value consistently.
    ///
    /// Returns the weighted count per new class index.
    pub fn sort_classes_by_frequency(&mut self) -> Vec<f64> {
        let k = self.num_classes();
        let mut counts = vec![0.0; k];
        for row in &self.rows {
            if !row.is_missing(0) {
                let c = row.class_value() as usize;
                if c < k {
                    counts[c] += row.weight;
                }
            }
        }

        // order[new] = old; the stable sort keeps ties in original order
        let mut order: Vec<usize> = (0..k).collect();
        order.sort_by(|&a, &b| counts[a].total_cmp(&counts[b]));
        let mut remap = vec![0usize; k];
        for (new, &old) in order.iter().enumerate() {
            remap[old] = new;
        }

        if let Attribute::Discrete { labels, .. } = &mut self.attributes[0] {
            let old_labels = labels.clone();
            *labels = order.iter().map(|&old| old_labels[old].clone()).collect();
        }
        for row in &mut self.rows {
            if !row.is_missing(0) {
                let c = row.values[0] as usize;
                if c < k {
                    row.values[0] = remap[c] as f64;
                }
            }
        }

        order.iter().map(|&old| counts[old]).collect()
    }

    /// Drops rows whose class value is missing.
    pub fn remove_missing_class(&mut self) {
        self.rows.retain(|r| !r.is_missing(0));
    }

    /// # Overview
    ///
    /// Projects this dataset onto a reference schema, permuting columns so
    /// they match it. Attributes not named by the reference are dropped.
    ///
    /// Fails if any reference attribute has no equivalent here.
    pub fn reorder_attributes_like(&self, schema: &[Attribute]) -> Result<Self> {
        let mut mapping = Vec::with_capacity(schema.len());
        for att in schema {
            let pos = self
                .attributes
                .iter()
                .position(|a| a == att)
                .ok_or_else(|| Error::AttributeMissing(att.name().to_string()))?;
            mapping.push(pos);
        }

        let mut result = Self {
            attributes: schema.to_vec(),
            rows:       Vec::with_capacity(self.rows.len())
        };
        for row in &self.rows {
            let values = mapping.iter().map(|&p| row.values[p]).collect();
            result.push_raw(Instance::weighted(values, row.weight));
        }
        Ok(result)
    }
}
