//! The learned model: an ordered ruleset over a fixed schema.

use core::fmt;
use std::borrow::Cow;

use crate::{
    Attribute, Dataset, RipperRule,
    error::{Error, Result}
};

/// # Overview
///
/// Per-class evaluation counts and the measures derived from them.
///
/// Counts are weighted. `positives` is the weight of rows labeled with the
/// class, `negatives` of every other row.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMeasures {
    pub class_index: usize,
    pub positives:   f64,
    pub negatives:   f64,
    pub true_pos:    f64,
    pub true_neg:    f64,
    pub false_pos:   f64,
    pub false_neg:   f64
}

impl ClassMeasures {
    /// Fraction of all rows classified correctly with respect to this class.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        (self.true_pos + self.true_neg) / (self.positives + self.negatives)
    }

    /// True-positive rate.
    #[must_use]
    pub fn sensitivity(&self) -> f64 {
        self.true_pos / self.positives
    }

    /// True-negative rate.
    #[must_use]
    pub fn specificity(&self) -> f64 {
        self.true_neg / self.negatives
    }

    /// Positive predictive value.
    #[must_use]
    pub fn ppv(&self) -> f64 {
        self.true_pos / (self.true_pos + self.false_pos)
    }

    /// Negative predictive value.
    #[must_use]
    pub fn npv(&self) -> f64 {
        self.true_neg / (self.true_neg + self.false_neg)
    }
}

/// # Overview
///
/// A trained rule-based classifier: the attribute schema it was trained on
/// plus the ordered rule list, ending in a default rule that always fires.
///
/// Prediction is first-match: a row gets the consequent of the first rule
/// covering it.
#[derive(Debug, Clone)]
pub struct RuleBasedModel {
    attributes: Vec<Attribute>,
    rules:      Vec<RipperRule>
}

impl RuleBasedModel {
    pub(crate) fn new(attributes: Vec<Attribute>, rules: Vec<RipperRule>) -> Self {
        Self {
            attributes,
            rules
        }
    }

    #[inline]
    #[must_use]
    pub fn schema(&self) -> &[Attribute] {
        &self.attributes
    }

    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[RipperRule] {
        &self.rules
    }

    #[inline]
    #[must_use]
    pub fn num_rules(&self) -> usize {
        self.rules.len()
    }

    /// Brings `data` into this model's column order, failing when an
    /// attribute the model needs is absent.
    fn aligned<'a>(&self, data: &'a Dataset) -> Result<Cow<'a, Dataset>> {
        if data.attributes() == self.schema() {
            Ok(Cow::Borrowed(data))
        } else {
            Ok(Cow::Owned(data.reorder_attributes_like(&self.attributes)?))
        }
    }

    /// First-match classification of one row of an aligned dataset.
    fn classify(&self, data: &Dataset, i: usize) -> usize {
        for rule in &self.rules {
            if rule.covers(data, i) {
                return rule.consequent();
            }
        }
        // the default rule always fires; an empty ruleset cannot be built
        self.rules.last().map_or(0, RipperRule::consequent)
    }

    /// # Overview
    ///
    /// Predicts a class index for every row, in row order.
    ///
    /// Columns are reordered to the model's schema when they differ; an
    /// input missing one of the model's attributes is an error.
    pub fn predict(&self, data: &Dataset) -> Result<Vec<usize>> {
        let data = self.aligned(data)?;
        Ok((0..data.len()).map(|i| self.classify(&data, i)).collect())
    }

    /// # Overview
    ///
    /// Fraction of rows whose predicted class matches their label.
    pub fn evaluate(&self, data: &Dataset) -> Result<f64> {
        if data.is_empty() {
            return Err(Error::EmptyDataset);
        }
        let data = self.aligned(data)?;
        let correct = (0..data.len())
            .filter(|&i| self.classify(&data, i) == data.class_value(i) as usize)
            .count();
        Ok(correct as f64 / data.len() as f64)
    }

    /// # Overview
    ///
    /// Computes per-class evaluation measures on labeled data.
    ///
    /// With exactly two classes a single entry for the positive class
    /// (index 1) is returned; otherwise one entry per class.
    pub fn test(&self, data: &Dataset) -> Result<Vec<ClassMeasures>> {
        if data.is_empty() {
            return Err(Error::EmptyDataset);
        }
        let data = self.aligned(data)?;
        let predictions: Vec<usize> = (0..data.len()).map(|i| self.classify(&data, i)).collect();

        let num_classes = self.attributes[0].num_values();
        let classes: Vec<usize> = if num_classes == 2 {
            vec![1]
        } else {
            (0..num_classes).collect()
        };

        let mut result = Vec::with_capacity(classes.len());
        for c in classes {
            let mut m = ClassMeasures {
                class_index: c,
                positives:   0.0,
                negatives:   0.0,
                true_pos:    0.0,
                true_neg:    0.0,
                false_pos:   0.0,
                false_neg:   0.0
            };
            for i in 0..data.len() {
                let w = data.weight(i);
                let actual = data.class_value(i) as usize == c;
                let predicted = predictions[i] == c;
                if actual {
                    m.positives += w;
                    if predicted {
                        m.true_pos += w;
                    } else {
                        m.false_neg += w;
                    }
                } else {
                    m.negatives += w;
                    if predicted {
                        m.false_pos += w;
                    } else {
                        m.true_neg += w;
                    }
                }
            }
            result.push(m);
        }
        Ok(result)
    }
}

impl fmt::Display for RuleBasedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RIPPER rules:")?;
        for rule in &self.rules {
            writeln!(f, "{}", rule.render(&self.attributes))?;
        }
        write!(f, "\nNumber of rules: {}", self.rules.len())
    }
}
