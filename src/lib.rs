//! Sample driver for NAF pipeline stages: tokenizer, POS tagger, NER,
//! chunker, constituent parser and document classifier.
//!
//! Only the NER stage does real work. It reads a NAF document, runs
//! [`nlp::Annotate`] over it and renders the result as NAF or CoNLL.

pub mod cli;
pub mod config;
pub mod logging;
pub mod naf;
pub mod nlp;
