//! Named-entity annotation over NAF documents.

pub mod conll;
pub mod dictionary;
pub mod features;
pub mod model;
pub mod ner;
pub mod numeric;
pub mod properties;

use std::path::PathBuf;

use thiserror::Error;

pub use ner::{Annotate, Span};
pub use properties::Properties;

/// Errors raised while configuring or running the annotator.
#[derive(Debug, Error)]
pub enum NerError {
    #[error("missing annotation property `{0}`")]
    MissingProperty(&'static str),
    #[error("invalid value `{value}` for property `{key}`, expected one of: {expected}")]
    InvalidProperty {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("reading model {path}: {source}")]
    ModelIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing model {path}: {source}")]
    ModelFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("model {0} declares no entity labels")]
    EmptyModel(PathBuf),
    #[error("dictionary directory {0} does not exist")]
    MissingDictionaries(PathBuf),
    #[error("reading dictionary {path}: {source}")]
    Dictionary {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("walking dictionary directory: {0}")]
    Walk(#[from] walkdir::Error),
}
