//! In-memory NAF document model shared by every pipeline stage.

mod reader;
mod writer;

use std::{
    collections::{HashMap, HashSet},
    io::BufRead,
    str::FromStr,
};

use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use thiserror::Error;

/// Errors raised while reading or writing NAF documents.
#[derive(Debug, Error)]
pub enum NafError {
    #[error("malformed NAF XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed NAF attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("reading NAF input: {0}")]
    Io(#[from] std::io::Error),
    #[error("NAF content is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("input has no <NAF> root element")]
    MissingRoot,
    #[error("unexpected end of input inside <{0}>")]
    UnexpectedEof(&'static str),
    #[error("<{element}> is missing required attribute `{attribute}`")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, NafError>;

/// Ordered attribute list of an element the model keeps but does not interpret.
pub type Attributes = IndexMap<String, String>;

/// A linguistic document in NAF form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub lang: Option<String>,
    pub version: Option<String>,
    /// Root attributes other than `xml:lang` and `version`.
    pub extra: Attributes,
    pub header: Header,
    pub raw: Option<String>,
    pub words: Vec<WordForm>,
    pub terms: Vec<Term>,
    pub entities: Vec<Entity>,
    /// Layers without a dedicated model, written back verbatim.
    pub extra_layers: Vec<OpaqueLayer>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub file_desc: Option<Attributes>,
    pub public: Option<Attributes>,
    pub processors: Vec<ProcessorLayer>,
    /// Unrecognized header children, kept as raw markup.
    pub children: String,
}

/// All provenance records for one annotation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorLayer {
    pub layer: String,
    pub processors: Vec<LinguisticProcessor>,
}

/// Provenance record of a tool that produced a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LinguisticProcessor {
    pub name: String,
    pub version: String,
    pub begin_timestamp: Option<String>,
    pub end_timestamp: Option<String>,
    pub timestamp: Option<String>,
    pub hostname: Option<String>,
    pub extra: Attributes,
}

impl LinguisticProcessor {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            begin_timestamp: None,
            end_timestamp: None,
            timestamp: None,
            hostname: None,
            extra: Attributes::new(),
        }
    }

    pub fn set_begin_timestamp(&mut self) {
        self.begin_timestamp = Some(now());
    }

    pub fn set_end_timestamp(&mut self) {
        self.end_timestamp = Some(now());
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Position of a provenance record inside [`Header::processors`].
///
/// Records are only ever appended, so an id stays valid for the lifetime of
/// the document that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorId {
    layer: usize,
    index: usize,
}

/// A token of the text layer.
#[derive(Debug, Clone, PartialEq)]
pub struct WordForm {
    pub id: String,
    pub sent: Option<String>,
    pub para: Option<String>,
    pub offset: Option<usize>,
    pub length: Option<usize>,
    pub extra: Attributes,
    pub form: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub id: String,
    pub kind: Option<String>,
    pub lemma: Option<String>,
    pub pos: Option<String>,
    pub morphofeat: Option<String>,
    pub extra: Attributes,
    /// Ids of the word forms covered by this term.
    pub span: Vec<String>,
    /// Child elements besides the span (`externalReferences`, `sentiment`,
    /// `component`, ...), kept as raw markup.
    pub children: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: String,
    pub kind: String,
    pub extra: Attributes,
    /// Ids of the terms covered by this entity.
    pub span: Vec<String>,
    pub children: String,
}

/// A top-level layer kept as raw markup.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueLayer {
    pub name: String,
    pub attributes: Attributes,
    pub inner: String,
}

/// A run of word forms sharing the same `sent` attribute.
#[derive(Debug, Clone, Copy)]
pub struct Sentence<'a> {
    pub words: &'a [WordForm],
}

impl<'a> Sentence<'a> {
    pub fn forms(&self) -> Vec<&'a str> {
        self.words.iter().map(|w| w.form.as_str()).collect()
    }
}

impl Document {
    /// Read a whole document from a UTF-8 stream.
    pub fn from_reader<R: BufRead>(mut input: R) -> Result<Self> {
        let mut xml = String::new();
        input.read_to_string(&mut xml)?;
        xml.parse()
    }

    /// Serialize the document to NAF XML.
    pub fn to_naf_string(&self) -> Result<String> {
        writer::write_document(self)
    }

    /// Register a new provenance record for `layer` and return its handle.
    pub fn add_linguistic_processor(
        &mut self,
        layer: &str,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> ProcessorId {
        let layer_idx = match self
            .header
            .processors
            .iter()
            .position(|group| group.layer == layer)
        {
            Some(idx) => idx,
            None => {
                self.header.processors.push(ProcessorLayer {
                    layer: layer.to_string(),
                    processors: Vec::new(),
                });
                self.header.processors.len() - 1
            }
        };
        let group = &mut self.header.processors[layer_idx];
        group.processors.push(LinguisticProcessor::new(name, version));
        ProcessorId {
            layer: layer_idx,
            index: group.processors.len() - 1,
        }
    }

    pub fn processor_mut(&mut self, id: ProcessorId) -> &mut LinguisticProcessor {
        &mut self.header.processors[id.layer].processors[id.index]
    }

    pub fn processors<'a>(
        &'a self,
        layer: &'a str,
    ) -> impl Iterator<Item = &'a LinguisticProcessor> + 'a {
        self.header
            .processors
            .iter()
            .filter(move |group| group.layer == layer)
            .flat_map(|group| group.processors.iter())
    }

    /// Group word forms into sentences, keeping document order.
    pub fn sentences(&self) -> Vec<Sentence<'_>> {
        let mut sentences = Vec::new();
        let mut start = 0;
        for idx in 1..=self.words.len() {
            if idx == self.words.len() || self.words[idx].sent != self.words[start].sent {
                sentences.push(Sentence {
                    words: &self.words[start..idx],
                });
                start = idx;
            }
        }
        sentences
    }

    /// Create one term per word form when the document has no term layer yet.
    pub fn ensure_terms(&mut self) {
        if !self.terms.is_empty() {
            return;
        }
        self.terms = self
            .words
            .iter()
            .enumerate()
            .map(|(idx, word)| Term {
                id: format!("t{}", idx + 1),
                kind: None,
                lemma: None,
                pos: None,
                morphofeat: None,
                extra: Attributes::new(),
                span: vec![word.id.clone()],
                children: String::new(),
            })
            .collect();
    }

    /// Terms covering any of `word_ids`, in term order and without repeats.
    pub fn terms_for_words(&self, word_ids: &[&str]) -> Vec<&Term> {
        let wanted: HashSet<&str> = word_ids.iter().copied().collect();
        self.terms
            .iter()
            .filter(|term| term.span.iter().any(|id| wanted.contains(id.as_str())))
            .collect()
    }

    /// Term covering the given word form, if any.
    pub fn term_of_word(&self, word_id: &str) -> Option<&Term> {
        self.terms
            .iter()
            .find(|term| term.span.iter().any(|id| id == word_id))
    }

    /// Append an entity over `term_ids`, numbering it after the existing ones.
    pub fn add_entity(&mut self, kind: impl Into<String>, term_ids: Vec<String>) -> &Entity {
        let id = format!("e{}", self.entities.len() + 1);
        self.entities.push(Entity {
            id,
            kind: kind.into(),
            extra: Attributes::new(),
            span: term_ids,
            children: String::new(),
        });
        &self.entities[self.entities.len() - 1]
    }

    /// Lookup tables for resolving entity spans down to word forms.
    pub fn index(&self) -> DocumentIndex<'_> {
        DocumentIndex {
            terms: self.terms.iter().map(|t| (t.id.as_str(), t)).collect(),
            words: self
                .words
                .iter()
                .enumerate()
                .map(|(pos, w)| (w.id.as_str(), pos))
                .collect(),
            doc: self,
        }
    }

    /// Word forms covered by an entity, in text order.
    ///
    /// Builds a fresh [`DocumentIndex`]; use [`Document::index`] when
    /// resolving many entities.
    pub fn entity_words(&self, entity: &Entity) -> Vec<&WordForm> {
        self.index().entity_words(entity)
    }

    /// Surface string of an entity, tokens joined by single spaces.
    pub fn entity_text(&self, entity: &Entity) -> String {
        self.index().entity_text(entity)
    }
}

/// Term and word position lookups over a borrowed [`Document`].
pub struct DocumentIndex<'a> {
    doc: &'a Document,
    terms: HashMap<&'a str, &'a Term>,
    words: HashMap<&'a str, usize>,
}

impl<'a> DocumentIndex<'a> {
    pub fn entity_words(&self, entity: &Entity) -> Vec<&'a WordForm> {
        let mut positions: Vec<usize> = entity
            .span
            .iter()
            .filter_map(|id| self.terms.get(id.as_str()))
            .flat_map(|term| term.span.iter())
            .filter_map(|id| self.words.get(id.as_str()).copied())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        positions.sort_unstable();
        positions.into_iter().map(|pos| &self.doc.words[pos]).collect()
    }

    pub fn entity_text(&self, entity: &Entity) -> String {
        self.entity_words(entity)
            .iter()
            .map(|w| w.form.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl FromStr for Document {
    type Err = NafError;

    fn from_str(xml: &str) -> Result<Self> {
        reader::read_document(xml)
    }
}
