//! # RIPPER rule induction
//!
//! Rust implementation of the RIPPER algorithm (Repeated Incremental
//! Pruning to Produce Error Reduction, Cohen 1995): learns an ordered list
//! of IF-THEN rules over typed tabular data and applies them to unseen
//! rows.
//!
//! Training is single-threaded and deterministic: the same seed on the same
//! input always yields the same ruleset.
//!
//! # Examples
//!
//! ```
//! use ripper_rs::{Attribute, Dataset, Instance, Ripper, RipperConfig};
//!
//! let mut data = Dataset::new(vec![
//!     Attribute::discrete("play", &["no", "yes"]),
//!     Attribute::continuous("humidity"),
//! ])
//! .unwrap();
//! for (play, humidity) in [(0.0, 85.0), (0.0, 90.0), (1.0, 60.0), (1.0, 65.0)] {
//!     data.push(Instance::new(vec![play, humidity])).unwrap();
//! }
//!
//! let config = RipperConfig::builder().seed(42).build().unwrap();
//! let model = Ripper::new(config).fit(&data).unwrap();
//!
//! let labels = model.predict(&data).unwrap();
//! assert_eq!(labels.len(), 4);
//! ```

mod antecedent;
mod attribute;
mod dataset;
mod instance;
mod learner;
mod model;
mod rule;
mod stats;

pub mod error;
pub mod io;
pub mod utils;

pub use antecedent::{Antecedent, Direction, Test};
pub use attribute::{Attribute, NumericKind};
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use instance::{Instance, MISSING};
pub use learner::{MAX_DL_SURPLUS, Ripper, RipperConfig, RipperConfigBuilder};
pub use model::{ClassMeasures, RuleBasedModel};
pub use rule::RipperRule;
pub use stats::{RuleCounts, RuleStats, remove_covered_by_successors};
