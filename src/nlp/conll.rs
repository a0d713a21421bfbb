//! CoNLL-2002 and CoNLL-2003 renderings of the entities layer.

use std::{collections::HashMap, fmt::Write};

use crate::naf::{Document, Term};

use super::model::OUTSIDE;

/// Chunk column placeholder; the chunker stage does not exist yet.
const NO_CHUNK: &str = "O";

/// `form tag` per token, blank line between sentences.
pub fn to_conll2002(doc: &Document) -> String {
    let tags = entity_tags(doc);
    let mut out = String::new();
    for sentence in doc.sentences() {
        for word in sentence.words {
            let tag = tags.get(word.id.as_str()).map_or(OUTSIDE, String::as_str);
            let _ = writeln!(out, "{} {}", word.form, tag);
        }
        out.push('\n');
    }
    out
}

/// `form pos chunk tag` per token, blank line between sentences.
pub fn to_conll2003(doc: &Document) -> String {
    let tags = entity_tags(doc);
    let terms: HashMap<&str, &Term> = doc
        .terms
        .iter()
        .flat_map(|term| term.span.iter().map(move |id| (id.as_str(), term)))
        .collect();
    let mut out = String::new();
    for sentence in doc.sentences() {
        for word in sentence.words {
            let pos = terms
                .get(word.id.as_str())
                .and_then(|term| term.morphofeat.as_deref().or(term.pos.as_deref()))
                .unwrap_or(OUTSIDE);
            let tag = tags.get(word.id.as_str()).map_or(OUTSIDE, String::as_str);
            let _ = writeln!(out, "{} {} {} {}", word.form, pos, NO_CHUNK, tag);
        }
        out.push('\n');
    }
    out
}

/// BIO tag per word id. The first word of an entity gets `B-`, the rest `I-`.
fn entity_tags(doc: &Document) -> HashMap<&str, String> {
    let index = doc.index();
    let mut tags = HashMap::new();
    for entity in &doc.entities {
        for (idx, word) in index.entity_words(entity).into_iter().enumerate() {
            let prefix = if idx == 0 { "B" } else { "I" };
            tags.entry(word.id.as_str())
                .or_insert_with(|| format!("{prefix}-{}", entity.kind));
        }
    }
    tags
}
