//! Binary model persistence: a magic header followed by a Postcard payload.
//!
//! The format is self-describing: 4 magic bytes, one format version byte,
//! then a Postcard-encoded version-tagged payload carrying the schema and
//! the rule list. The encoding is deterministic, so identical models
//! serialize to identical bytes.

use core::fmt;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::{
    Antecedent, Attribute, NumericKind, RipperRule, RuleBasedModel,
    antecedent::{Direction, Test}
};

/// Magic bytes identifying a serialized ruleset model.
pub const MAGIC: &[u8; 4] = b"RRLM";

/// Current format version.
pub const FORMAT_VERSION: u8 = 1;

/// # Overview
///
/// Errors raised while saving or loading a model.
#[derive(Debug)]
pub enum PersistError {
    Io(std::io::Error),
    Codec(postcard::Error),
    BadMagic,
    UnsupportedVersion(u8),
    InvalidModel
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "i/o failure: {err}"),
            Self::Codec(err) => write!(f, "payload encoding failure: {err}"),
            Self::BadMagic => write!(f, "not a ruleset model stream"),
            Self::UnsupportedVersion(v) => write!(f, "unsupported format version {v}"),
            Self::InvalidModel => write!(f, "model contains an unset antecedent")
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Codec(err) => Some(err),
            _ => None
        }
    }
}

impl From<std::io::Error> for PersistError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<postcard::Error> for PersistError {
    fn from(err: postcard::Error) -> Self {
        Self::Codec(err)
    }
}

/// Version-tagged payload; new format versions add variants.
#[derive(Debug, Serialize, Deserialize)]
enum Payload {
    V1(ModelV1)
}

#[derive(Debug, Serialize, Deserialize)]
struct ModelV1 {
    attributes: Vec<AttributeV1>,
    rules:      Vec<RuleV1>
}

#[derive(Debug, Serialize, Deserialize)]
enum AttributeV1 {
    Discrete { name: String, labels: Vec<String> },
    Int { name: String },
    Float { name: String },
    Date { name: String, pattern: String }
}

#[derive(Debug, Serialize, Deserialize)]
struct RuleV1 {
    consequent:  u32,
    antecedents: Vec<AntecedentV1>
}

#[derive(Debug, Serialize, Deserialize)]
enum AntecedentV1 {
    Equal { attr: u32, target: u32 },
    LessEqual { attr: u32, split: f64 },
    GreaterEqual { attr: u32, split: f64 }
}

fn attribute_to_payload(att: &Attribute) -> AttributeV1 {
    match att {
        Attribute::Discrete {
            name,
            labels
        } => AttributeV1::Discrete {
            name:   name.clone(),
            labels: labels.clone()
        },
        Attribute::Continuous {
            name,
            kind
        } => match kind {
            NumericKind::Int => AttributeV1::Int {
                name: name.clone()
            },
            NumericKind::Float => AttributeV1::Float {
                name: name.clone()
            },
            NumericKind::Date(pattern) => AttributeV1::Date {
                name:    name.clone(),
                pattern: pattern.clone()
            }
        }
    }
}

fn attribute_from_payload(att: AttributeV1) -> Attribute {
    match att {
        AttributeV1::Discrete {
            name,
            labels
        } => Attribute::Discrete {
            name,
            labels
        },
        AttributeV1::Int {
            name
        } => Attribute::Continuous {
            name,
            kind: NumericKind::Int
        },
        AttributeV1::Float {
            name
        } => Attribute::Continuous {
            name,
            kind: NumericKind::Float
        },
        AttributeV1::Date {
            name,
            pattern
        } => Attribute::Continuous {
            name,
            kind: NumericKind::Date(pattern)
        }
    }
}

fn rule_to_payload(rule: &RipperRule) -> Result<RuleV1, PersistError> {
    let mut antecedents = Vec::with_capacity(rule.size());
    for antd in rule.antecedents() {
        let attr = antd.attr() as u32;
        let payload = match antd.test() {
            Test::Discrete {
                target: Some(target)
            } => AntecedentV1::Equal {
                attr,
                target: *target as u32
            },
            Test::Continuous {
                split,
                direction: Some(Direction::Le)
            } => AntecedentV1::LessEqual {
                attr,
                split: *split
            },
            Test::Continuous {
                split,
                direction: Some(Direction::Ge)
            } => AntecedentV1::GreaterEqual {
                attr,
                split: *split
            },
            _ => return Err(PersistError::InvalidModel)
        };
        antecedents.push(payload);
    }
    Ok(RuleV1 {
        consequent: rule.consequent() as u32,
        antecedents
    })
}

fn rule_from_payload(rule: RuleV1) -> RipperRule {
    let mut result = RipperRule::new(rule.consequent as usize);
    for antd in rule.antecedents {
        result.push_antecedent(match antd {
            AntecedentV1::Equal {
                attr,
                target
            } => Antecedent::equal(attr as usize, target as usize),
            AntecedentV1::LessEqual {
                attr,
                split
            } => Antecedent::less_equal(attr as usize, split),
            AntecedentV1::GreaterEqual {
                attr,
                split
            } => Antecedent::greater_equal(attr as usize, split)
        });
    }
    result
}

/// # Overview
///
/// Serializes a model to a writer: magic, version, Postcard payload.
pub fn save<W: Write>(model: &RuleBasedModel, writer: &mut W) -> Result<(), PersistError> {
    let rules = model
        .rules()
        .iter()
        .map(rule_to_payload)
        .collect::<Result<Vec<_>, _>>()?;
    let payload = Payload::V1(ModelV1 {
        attributes: model.schema().iter().map(attribute_to_payload).collect(),
        rules
    });
    let body = postcard::to_allocvec(&payload)?;

    writer.write_all(MAGIC)?;
    writer.write_all(&[FORMAT_VERSION])?;
    writer.write_all(&body)?;
    Ok(())
}

/// # Overview
///
/// Reads a model back from a reader, verifying the magic tag and version.
///
/// A round-trip through `save` and `load` reproduces identical predictions
/// on identical inputs.
pub fn load<R: Read>(reader: &mut R) -> Result<RuleBasedModel, PersistError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(PersistError::BadMagic);
    }
    let mut version = [0u8; 1];
    reader.read_exact(&mut version)?;
    if version[0] != FORMAT_VERSION {
        return Err(PersistError::UnsupportedVersion(version[0]));
    }

    let mut body = Vec::new();
    reader.read_to_end(&mut body)?;
    let Payload::V1(payload) = postcard::from_bytes(&body)?;

    let attributes = payload
        .attributes
        .into_iter()
        .map(attribute_from_payload)
        .collect();
    let rules = payload.rules.into_iter().map(rule_from_payload).collect();
    Ok(RuleBasedModel::new(attributes, rules))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dataset, Instance, Ripper};

    fn trained_model() -> (RuleBasedModel, Dataset) {
        let mut data = Dataset::new(vec![
            Attribute::discrete("class", &["lo", "hi"]),
            Attribute::discrete("color", &["red", "green"]),
            Attribute::continuous("x"),
        ])
        .unwrap();
        for i in 0..30 {
            let x = f64::from(i);
            let class = if x > 14.0 { 1.0 } else { 0.0 };
            data.push(Instance::new(vec![class, f64::from(i % 2), x]))
                .unwrap();
        }
        let model = Ripper::default().fit(&data).unwrap();
        (model, data)
    }

    #[test]
    fn round_trip_preserves_predictions() {
        let (model, data) = trained_model();

        let mut bytes = Vec::new();
        save(&model, &mut bytes).unwrap();
        let loaded = load(&mut bytes.as_slice()).unwrap();

        assert_eq!(loaded.schema(), model.schema());
        assert_eq!(loaded.num_rules(), model.num_rules());
        assert_eq!(
            loaded.predict(&data).unwrap(),
            model.predict(&data).unwrap()
        );
    }

    #[test]
    fn round_trip_bytes_are_stable() {
        let (model, _) = trained_model();

        let mut first = Vec::new();
        save(&model, &mut first).unwrap();
        let loaded = load(&mut first.as_slice()).unwrap();
        let mut second = Vec::new();
        save(&loaded, &mut second).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn header_is_checked() {
        let (model, _) = trained_model();
        let mut bytes = Vec::new();
        save(&model, &mut bytes).unwrap();

        let mut wrong_magic = bytes.clone();
        wrong_magic[0] = b'X';
        assert!(matches!(
            load(&mut wrong_magic.as_slice()),
            Err(PersistError::BadMagic)
        ));

        let mut wrong_version = bytes.clone();
        wrong_version[4] = 9;
        assert!(matches!(
            load(&mut wrong_version.as_slice()),
            Err(PersistError::UnsupportedVersion(9))
        ));

        assert!(matches!(
            load(&mut &bytes[..3]),
            Err(PersistError::Io(_))
        ));
    }

    #[test]
    fn date_attributes_survive() {
        let model = RuleBasedModel::new(
            vec![
                Attribute::discrete("class", &["a", "b"]),
                Attribute::date("stamp", "%Y-%m-%d"),
            ],
            vec![RipperRule::new(1)]
        );

        let mut bytes = Vec::new();
        save(&model, &mut bytes).unwrap();
        let loaded = load(&mut bytes.as_slice()).unwrap();

        assert_eq!(loaded.schema(), model.schema());
        assert_eq!(loaded.schema()[1].repr_val(0.0), "1970-01-01");
    }
}
