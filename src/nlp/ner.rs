//! Named-entity annotator combining the sequence model, dictionaries and numeric rules.

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use super::{
    dictionary::Dictionaries,
    features::AdaptiveData,
    model::{self, SequenceModel},
    numeric, NerError, Properties,
};
use crate::naf::Document;

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_LEXER: &str = "off";
pub const DEFAULT_DICT_OPTION: &str = "off";
pub const DEFAULT_DICT_PATH: &str = "off";
pub const DEFAULT_FEATURE_FLAG: &str = "no";

/// Entity over the token range `start..end` of a sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

impl Span {
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Keep a non-overlapping subset: earliest start first, then the longest span.
/// Equal spans keep the one that came first in `spans`.
pub fn drop_overlapping(mut spans: Vec<Span>) -> Vec<Span> {
    spans.retain(|span| !span.is_empty());
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.len().cmp(&a.len())));
    let mut kept: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        if kept.last().map_or(true, |last| span.start >= last.end) {
            kept.push(span);
        }
    }
    kept
}

/// Rule-based recognizers run next to the statistical model (`ruleBasedOption`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lexer {
    Off,
    Numeric,
}

/// How dictionaries take part in tagging (`dictTag`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictOption {
    Off,
    /// Dictionary matches only.
    Tag,
    /// Statistical names corrected by dictionary matches: a statistical span
    /// overlapping any dictionary match is dropped.
    Post,
}

/// When adaptive features are reset (`clearFeatures`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearFeatures {
    Yes,
    No,
    DocStart,
}

impl Lexer {
    fn from_property(value: &str) -> Result<Self, NerError> {
        match value {
            "off" => Ok(Self::Off),
            "numeric" => Ok(Self::Numeric),
            _ => Err(invalid("ruleBasedOption", value, "off, numeric")),
        }
    }
}

impl DictOption {
    fn from_property(value: &str) -> Result<Self, NerError> {
        match value {
            "off" => Ok(Self::Off),
            "tag" => Ok(Self::Tag),
            "post" => Ok(Self::Post),
            _ => Err(invalid("dictTag", value, "off, tag, post")),
        }
    }
}

impl ClearFeatures {
    fn from_property(value: &str) -> Result<Self, NerError> {
        match value {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            "docstart" => Ok(Self::DocStart),
            _ => Err(invalid("clearFeatures", value, "yes, no, docstart")),
        }
    }
}

fn invalid(key: &'static str, value: &str, expected: &'static str) -> NerError {
    NerError::InvalidProperty {
        key,
        value: value.to_string(),
        expected,
    }
}

/// Sentence marker that resets adaptive features under `clearFeatures=docstart`.
const DOCSTART: &str = "-DOCSTART-";

/// Named-entity annotator configured from a [`Properties`] bag.
#[derive(Debug)]
pub struct Annotate {
    model: SequenceModel,
    lexer: Lexer,
    dict_option: DictOption,
    dictionaries: Option<Dictionaries>,
    clear_features: ClearFeatures,
    adaptive: AdaptiveData,
}

impl Annotate {
    /// Validate the properties and load the model and dictionaries they name.
    pub fn new(properties: &Properties) -> Result<Self, NerError> {
        let model_path = properties.require("model")?;
        let language = properties.require("language")?;
        let lexer = Lexer::from_property(
            properties
                .get_property("ruleBasedOption")
                .unwrap_or(DEFAULT_LEXER),
        )?;
        let dict_option = DictOption::from_property(
            properties
                .get_property("dictTag")
                .unwrap_or(DEFAULT_DICT_OPTION),
        )?;
        let clear_features = ClearFeatures::from_property(
            properties
                .get_property("clearFeatures")
                .unwrap_or(DEFAULT_FEATURE_FLAG),
        )?;
        let dict_path = properties.get_property("dictPath").unwrap_or(DEFAULT_DICT_PATH);

        let dictionaries = match dict_option {
            DictOption::Off => None,
            DictOption::Tag | DictOption::Post if dict_path == DEFAULT_DICT_PATH => {
                return Err(invalid("dictPath", dict_path, "a dictionary directory"));
            }
            DictOption::Tag | DictOption::Post => Some(Dictionaries::load(Path::new(dict_path))?),
        };

        let model = SequenceModel::load(Path::new(model_path))?;
        if model.language != language {
            warn!(
                model_language = %model.language,
                %language,
                "model language differs from requested language"
            );
        }
        info!(
            model = model_path,
            ?lexer,
            ?dict_option,
            ?clear_features,
            "annotator ready"
        );

        Ok(Self {
            model,
            lexer,
            dict_option,
            dictionaries,
            clear_features,
            adaptive: AdaptiveData::default(),
        })
    }

    /// Recognize entities in every sentence and append them to the entities layer.
    ///
    /// Returns the number of entities added.
    #[instrument(skip_all, fields(words = doc.words.len()))]
    pub fn annotate_nes(&mut self, doc: &mut Document) -> usize {
        self.adaptive.clear();
        doc.ensure_terms();

        let mut found: Vec<(String, Vec<String>)> = Vec::new();
        for sentence in doc.sentences() {
            let tokens = sentence.forms();
            if self.clear_features == ClearFeatures::DocStart && tokens.first() == Some(&DOCSTART) {
                self.adaptive.clear();
            }
            for span in self.find_names(&tokens) {
                let word_ids = sentence.words[span.start..span.end]
                    .iter()
                    .map(|w| w.id.clone())
                    .collect();
                found.push((span.label, word_ids));
            }
            if self.clear_features == ClearFeatures::Yes {
                self.adaptive.clear();
            }
        }

        let mut added = 0;
        for (label, word_ids) in found {
            let word_ids: Vec<&str> = word_ids.iter().map(String::as_str).collect();
            let term_ids: Vec<String> = doc
                .terms_for_words(&word_ids)
                .iter()
                .map(|term| term.id.clone())
                .collect();
            if term_ids.is_empty() {
                warn!(?word_ids, %label, "no terms cover entity, skipping");
                continue;
            }
            doc.add_entity(label, term_ids);
            added += 1;
        }
        debug!(added, "named entities annotated");
        added
    }

    /// Entity spans for one tokenized sentence.
    pub fn find_names(&mut self, tokens: &[&str]) -> Vec<Span> {
        let mut names = match self.dict_option {
            DictOption::Off => self.statistical_names(tokens),
            DictOption::Tag => self.dictionary_names(tokens),
            DictOption::Post => {
                let mut names = self.dictionary_names(tokens);
                let statistical: Vec<Span> = self
                    .statistical_names(tokens)
                    .into_iter()
                    .filter(|span| !names.iter().any(|dict| dict.overlaps(span)))
                    .collect();
                names.extend(statistical);
                names
            }
        };
        if self.lexer == Lexer::Numeric {
            names.extend(numeric::find(tokens));
        }
        drop_overlapping(names)
    }

    fn statistical_names(&mut self, tokens: &[&str]) -> Vec<Span> {
        let tags = self.model.decode(tokens, &mut self.adaptive);
        model::spans_from_tags(&tags)
    }

    fn dictionary_names(&self, tokens: &[&str]) -> Vec<Span> {
        self.dictionaries
            .as_ref()
            .map(|dict| dict.find(tokens))
            .unwrap_or_default()
    }
}
