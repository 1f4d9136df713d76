//! Typed schema elements: discrete and continuous attributes.

use crate::instance::is_missing_value;

/// # Overview
///
/// Numeric subtype of a continuous attribute.
///
/// Date attributes store values as seconds since the Unix epoch and render
/// them through a chrono format pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumericKind {
    Int,
    Float,
    Date(String)
}

/// # Overview
///
/// A typed schema element: either a discrete attribute over a fixed, ordered
/// domain of labels, or a continuous numeric attribute.
///
/// Discrete values are stored in rows as domain indices; continuous values as
/// double-precision reals. Two attributes are equivalent iff they have the
/// same variant, name and domain, with the domain order significant.
///
/// # Examples
///
/// ```
/// use ripper_rs::Attribute;
///
/// let outlook = Attribute::discrete("outlook", &["sunny", "overcast", "rain"]);
/// let humidity = Attribute::continuous("humidity");
///
/// assert_eq!(outlook.num_values(), 3);
/// assert_eq!(outlook.index_of("rain"), Some(2));
/// assert_eq!(humidity.repr_val(77.5), "77.5");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Discrete { name: String, labels: Vec<String> },
    Continuous { name: String, kind: NumericKind }
}

impl Attribute {
    /// # Overview
    ///
    /// Creates a discrete attribute over an ordered domain of labels.
    #[must_use]
    pub fn discrete(name: &str, labels: &[&str]) -> Self {
        Self::Discrete {
            name:   name.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect()
        }
    }

    /// # Overview
    ///
    /// Creates a continuous floating-point attribute.
    #[must_use]
    pub fn continuous(name: &str) -> Self {
        Self::Continuous {
            name: name.to_string(),
            kind: NumericKind::Float
        }
    }

    /// # Overview
    ///
    /// Creates a continuous integer-valued attribute.
    #[must_use]
    pub fn integer(name: &str) -> Self {
        Self::Continuous {
            name: name.to_string(),
            kind: NumericKind::Int
        }
    }

    /// # Overview
    ///
    /// Creates a continuous date attribute rendering epoch seconds through
    /// the given chrono format pattern.
    #[must_use]
    pub fn date(name: &str, pattern: &str) -> Self {
        Self::Continuous {
            name: name.to_string(),
            kind: NumericKind::Date(pattern.to_string())
        }
    }

    /// Returns the attribute name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Discrete { name, .. } | Self::Continuous { name, .. } => name
        }
    }

    /// Returns the ordered domain of a discrete attribute.
    #[inline]
    #[must_use]
    pub fn labels(&self) -> Option<&[String]> {
        match self {
            Self::Discrete { labels, .. } => Some(labels),
            Self::Continuous { .. } => None
        }
    }

    /// Returns the domain size for a discrete attribute, 0 otherwise.
    #[inline]
    #[must_use]
    pub fn num_values(&self) -> usize {
        match self {
            Self::Discrete { labels, .. } => labels.len(),
            Self::Continuous { .. } => 0
        }
    }

    /// Returns the domain index of a label, if present.
    #[must_use]
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels()?.iter().position(|l| l == label)
    }

    #[inline]
    #[must_use]
    pub fn is_discrete(&self) -> bool {
        matches!(self, Self::Discrete { .. })
    }

    #[inline]
    #[must_use]
    pub fn is_continuous(&self) -> bool {
        matches!(self, Self::Continuous { .. })
    }

    /// # Overview
    ///
    /// Renders an encoded value as a human-readable string.
    ///
    /// Missing and out-of-domain values render as `?`.
    #[must_use]
    pub fn repr_val(&self, v: f64) -> String {
        if is_missing_value(v) {
            return "?".to_string();
        }
        match self {
            Self::Discrete { labels, .. } => labels
                .get(v as usize)
                .cloned()
                .unwrap_or_else(|| "?".to_string()),
            Self::Continuous { kind, .. } => match kind {
                NumericKind::Int => format!("{}", v as i64),
                NumericKind::Float => format!("{v}"),
                NumericKind::Date(pattern) => chrono::DateTime::from_timestamp(v as i64, 0)
                    .map(|d| d.format(pattern).to_string())
                    .unwrap_or_else(|| "?".to_string())
            }
        }
    }
}
