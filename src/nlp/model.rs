//! Linear sequence model stored as JSON.

use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;
use tracing::{debug, instrument};

use super::{
    features::{self, AdaptiveData},
    NerError, Span,
};

/// Outcome assigned to tokens outside any entity.
pub const OUTSIDE: &str = "O";

/// Feature weights per outcome, decoded greedily left to right.
#[derive(Debug, Clone, Deserialize)]
pub struct SequenceModel {
    pub language: String,
    /// Entity types, e.g. `PERSON`; outcomes are derived as `B-`/`I-` pairs.
    pub labels: Vec<String>,
    #[serde(default)]
    pub weights: HashMap<String, HashMap<String, f64>>,
}

impl SequenceModel {
    /// Load and validate a model file.
    #[instrument]
    pub fn load(path: &Path) -> Result<Self, NerError> {
        let json = fs::read_to_string(path).map_err(|source| NerError::ModelIo {
            path: path.to_path_buf(),
            source,
        })?;
        let model: Self = serde_json::from_str(&json).map_err(|source| NerError::ModelFormat {
            path: path.to_path_buf(),
            source,
        })?;
        if model.labels.is_empty() {
            return Err(NerError::EmptyModel(path.to_path_buf()));
        }
        debug!(
            labels = model.labels.len(),
            features = model.weights.len(),
            "loaded sequence model"
        );
        Ok(model)
    }

    /// All outcomes in declaration order: `O`, then `B-`/`I-` per label.
    pub fn outcomes(&self) -> Vec<String> {
        let mut outcomes = vec![OUTSIDE.to_string()];
        for label in &self.labels {
            outcomes.push(format!("B-{label}"));
            outcomes.push(format!("I-{label}"));
        }
        outcomes
    }

    fn score(&self, features: &[String], outcome: &str) -> f64 {
        features
            .iter()
            .filter_map(|f| self.weights.get(f))
            .filter_map(|w| w.get(outcome))
            .sum()
    }

    /// Tag one sentence and feed the result back into `adaptive`.
    pub fn decode(&self, tokens: &[&str], adaptive: &mut AdaptiveData) -> Vec<String> {
        let outcomes = self.outcomes();
        let mut tags: Vec<String> = Vec::with_capacity(tokens.len());
        for idx in 0..tokens.len() {
            let previous = tags.last().map(String::as_str);
            let active = features::token_features(tokens, idx, previous, adaptive.previous(tokens[idx]));
            let mut best: Option<(&str, f64)> = None;
            for outcome in &outcomes {
                if !features::allowed(previous, outcome) {
                    continue;
                }
                let score = self.score(&active, outcome);
                if best.map_or(true, |(_, top)| score > top) {
                    best = Some((outcome.as_str(), score));
                }
            }
            let tag = best.map_or(OUTSIDE, |(outcome, _)| outcome).to_string();
            tags.push(tag);
        }
        adaptive.update(tokens, &tags);
        tags
    }
}

/// Collapse BIO tags into token spans. A stray `I-` opens a new span.
pub fn spans_from_tags(tags: &[String]) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    let mut open: Option<Span> = None;
    for (idx, tag) in tags.iter().enumerate() {
        if let Some(label) = tag.strip_prefix("I-") {
            if let Some(span) = open.as_mut().filter(|span| span.label == label) {
                span.end = idx + 1;
                continue;
            }
        }
        spans.extend(open.take());
        if let Some(label) = tag.strip_prefix("B-").or_else(|| tag.strip_prefix("I-")) {
            open = Some(Span::new(idx, idx + 1, label));
        }
    }
    spans.extend(open);
    spans
}
