//! Gazetteer lookup from tab-separated dictionary files.

use std::{collections::HashMap, path::Path};

use tracing::{debug, info};
use walkdir::WalkDir;

use super::{NerError, Span};

/// Surface strings (tokens joined by one space) mapped to entity types.
#[derive(Debug, Default, Clone)]
pub struct Dictionaries {
    entries: HashMap<String, String>,
    /// Longest entry, in tokens.
    max_tokens: usize,
}

impl Dictionaries {
    /// Load every file below `dir`. Lines are `surface<TAB>TYPE`; `#` starts a comment.
    pub fn load(dir: &Path) -> Result<Self, NerError> {
        if !dir.is_dir() {
            return Err(NerError::MissingDictionaries(dir.to_path_buf()));
        }
        let mut dictionaries = Self::default();
        let mut files = 0usize;
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            dictionaries.load_file(entry.path())?;
            files += 1;
        }
        info!(
            path = %dir.display(),
            files,
            entries = dictionaries.len(),
            "loaded dictionaries"
        );
        Ok(dictionaries)
    }

    fn load_file(&mut self, path: &Path) -> Result<(), NerError> {
        let to_error = |source| NerError::Dictionary {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .comment(Some(b'#'))
            .from_path(path)
            .map_err(to_error)?;
        for record in reader.records() {
            let record = record.map_err(to_error)?;
            match (record.get(0), record.get(1)) {
                (Some(surface), Some(label)) => self.insert(surface, label),
                _ => debug!(path = %path.display(), ?record, "skipping dictionary line"),
            }
        }
        Ok(())
    }

    pub fn insert(&mut self, surface: &str, label: &str) {
        let tokens: Vec<&str> = surface.split_whitespace().collect();
        let label = label.trim();
        if tokens.is_empty() || label.is_empty() {
            return;
        }
        self.max_tokens = self.max_tokens.max(tokens.len());
        self.entries.insert(tokens.join(" "), label.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Longest-match, case-sensitive lookup over a tokenized sentence.
    pub fn find(&self, tokens: &[&str]) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut idx = 0;
        while idx < tokens.len() {
            let longest = self.max_tokens.min(tokens.len() - idx);
            let hit = (1..=longest).rev().find_map(|len| {
                self.entries
                    .get(&tokens[idx..idx + len].join(" "))
                    .map(|label| Span::new(idx, idx + len, label))
            });
            match hit {
                Some(span) => {
                    idx = span.end;
                    spans.push(span);
                }
                None => idx += 1,
            }
        }
        spans
    }
}
