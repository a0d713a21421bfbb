//! Command-line interface wiring for pipes-sample.

use std::{ffi::OsString, fmt};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Settings;

pub mod chunk;
pub mod doc;
pub mod ner;
pub mod parse;
pub mod pos;
pub mod tok;

/// Printed after any argument error.
pub const USAGE_HINT: &str = "Run pipes-sample (tok|pos|ner|chunk|parse|doc) --help for details";

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(
    name = "pipes-sample",
    author,
    version,
    about = "Shows how to drive NAF pipeline stages programmatically",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment, exiting with status 1 on
    /// argument errors.
    pub fn parse() -> Self {
        Self::parse_or_exit(std::env::args_os())
    }

    /// Parse an explicit argument vector (program name first).
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(args)
    }

    fn parse_or_exit<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_args(args) {
            Ok(cli) => cli,
            // --help and --version are not failures.
            Err(err) if !err.use_stderr() => err.exit(),
            Err(err) => {
                let _ = err.print();
                eprintln!("{USAGE_HINT}");
                std::process::exit(1);
            }
        }
    }

    /// Dispatch the selected sub-command.
    pub fn dispatch(self, settings: &Settings) -> Result<()> {
        match self.command {
            Commands::Tok => tok::run(),
            Commands::Pos => pos::run(),
            Commands::Ner(args) => ner::run(args, settings),
            Commands::Chunk => chunk::run(),
            Commands::Parse => parse::run(),
            Commands::Doc => doc::run(),
        }
    }
}

/// Supported sub-commands, one per pipeline stage.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// The tokenizer CLI.
    Tok,
    /// The POS tagger CLI.
    Pos,
    /// The NER CLI.
    Ner(ner::Args),
    /// The chunker CLI.
    Chunk,
    /// The constituent parser CLI.
    Parse,
    /// The document classifier CLI.
    Doc,
}

/// Serialization of the annotated document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// CoNLL-2003 columns: form, POS, chunk, entity tag.
    Conll03,
    /// CoNLL-2002 columns: form, entity tag.
    Conll02,
    /// The full NAF document.
    #[default]
    Naf,
}

impl OutputFormat {
    /// Resolve a format name case-insensitively; unknown names fall back to NAF.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("conll03") {
            Self::Conll03
        } else if name.eq_ignore_ascii_case("conll02") {
            Self::Conll02
        } else {
            Self::Naf
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Conll03 => "conll03",
            Self::Conll02 => "conll02",
            Self::Naf => "naf",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
