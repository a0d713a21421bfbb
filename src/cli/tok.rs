//! CLI entry-point for the tokenizer stage.

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::naf::Document;

#[instrument]
pub fn run() -> Result<()> {
    let stdin = io::stdin();
    read_document(stdin.lock())
}

/// Parse the incoming document; tokenization itself is not wired in yet.
pub fn read_document<R: BufRead>(input: R) -> Result<()> {
    let doc = Document::from_reader(input).context("reading NAF document from standard input")?;
    debug!(words = doc.words.len(), "tokenizer stage leaves the document untouched");
    Ok(())
}
