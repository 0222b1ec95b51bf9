//! Answer extraction: from token-level span scores to property answers.
//!
//! - [`property`] maps char spans onto property paths of a schema text.
//! - [`extractor`] enumerates n-best spans, resolves them to properties and ranks them.
//! - [`ranking`] holds the shared sort / de-duplication / softmax helpers that the
//!   pipeline re-applies after merging cached and fresh results.

pub mod extractor;
pub mod property;
pub mod ranking;
pub mod types;


pub use extractor::AnswerExtractor;
pub use property::{PropertyLocator, determine_best_property, identify_properties};
pub use ranking::{assign_probabilities, softmax, sort_by_score, suppress_duplicates};
pub use types::{Answer, NoAnswerStrategy, Property, QueryResult, SampleResult};
