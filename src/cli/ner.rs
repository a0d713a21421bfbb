//! CLI entry-point for named-entity recognition.

use std::{
    io::{self, BufRead, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    cli::OutputFormat,
    config::Settings,
    naf::Document,
    nlp::{
        conll,
        ner::{DEFAULT_DICT_OPTION, DEFAULT_DICT_PATH, DEFAULT_FEATURE_FLAG, DEFAULT_LANGUAGE, DEFAULT_LEXER},
        Annotate, Properties,
    },
};

/// Provenance layer the NER stage writes to.
const ENTITIES_LAYER: &str = "entities";

/// Args for the `ner` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Pass the model to do the tagging as a parameter.
    #[arg(short = 'm', long = "model")]
    pub model: PathBuf,
    /// Choose output format; it defaults to NAF.
    #[arg(short = 'o', long = "outputFormat", value_enum, default_value_t = OutputFormat::Naf)]
    pub output_format: OutputFormat,
}

#[instrument(skip(settings))]
pub fn run(args: Args, settings: &Settings) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    annotate(&args, settings, stdin.lock(), BufWriter::new(stdout.lock()))
}

/// Read a document from `input`, tag its entities and write the rendering to `output`.
pub fn annotate<R: BufRead, W: Write>(
    args: &Args,
    settings: &Settings,
    input: R,
    mut output: W,
) -> Result<()> {
    let mut doc = Document::from_reader(input).context("reading NAF document from standard input")?;
    let properties = ner_properties(&args.model);

    let lp = doc.add_linguistic_processor(
        ENTITIES_LAYER,
        processor_name(&args.model),
        settings.version_stamp(),
    );
    doc.processor_mut(lp).set_begin_timestamp();
    let mut annotator = Annotate::new(&properties)
        .with_context(|| format!("loading NER model {}", args.model.display()))?;
    let entities = annotator.annotate_nes(&mut doc);
    doc.processor_mut(lp).set_end_timestamp();
    info!(entities, format = %args.output_format, "annotated named entities");

    let rendered = render(&doc, args.output_format)?;
    output
        .write_all(rendered.as_bytes())
        .context("writing annotated document")?;
    output.flush().context("flushing standard output")?;
    Ok(())
}

/// Configuration bag for the annotator. Only the model comes from the CLI.
pub fn ner_properties(model: &Path) -> Properties {
    let mut properties = Properties::new();
    properties.set_property("model", model.to_string_lossy());
    properties.set_property("language", DEFAULT_LANGUAGE);
    properties.set_property("ruleBasedOption", DEFAULT_LEXER);
    properties.set_property("dictTag", DEFAULT_DICT_OPTION);
    properties.set_property("dictPath", DEFAULT_DICT_PATH);
    properties.set_property("clearFeatures", DEFAULT_FEATURE_FLAG);
    properties
}

/// `pipes-nerc-<model file stem>`.
pub fn processor_name(model: &Path) -> String {
    let stem = model
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("pipes-nerc-{stem}")
}

/// Serialize the annotated document in the requested format.
pub fn render(doc: &Document, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Conll03 => conll::to_conll2003(doc),
        OutputFormat::Conll02 => conll::to_conll2002(doc),
        OutputFormat::Naf => doc.to_naf_string().context("serializing NAF document")?,
    })
}
