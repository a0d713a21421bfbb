//! Token feature extraction for the sequence model.

use std::collections::HashMap;

/// Boundary marker used for context features outside the sentence.
const BOS: &str = "<s>";
const EOS: &str = "</s>";

/// Last outcome assigned to each token form within the current document.
#[derive(Debug, Default, Clone)]
pub struct AdaptiveData {
    previous: HashMap<String, String>,
}

impl AdaptiveData {
    pub fn previous(&self, token: &str) -> Option<&str> {
        self.previous.get(token).map(String::as_str)
    }

    /// Remember the outcomes of a tagged sentence.
    pub fn update(&mut self, tokens: &[&str], outcomes: &[String]) {
        for (token, outcome) in tokens.iter().zip(outcomes) {
            self.previous.insert((*token).to_string(), outcome.clone());
        }
    }

    pub fn clear(&mut self) {
        self.previous.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.previous.is_empty()
    }
}

/// Features active for the token at `idx`.
pub fn token_features(
    tokens: &[&str],
    idx: usize,
    previous_outcome: Option<&str>,
    adaptive: Option<&str>,
) -> Vec<String> {
    let token = tokens[idx];
    let lower = token.to_lowercase();
    let prev_word = match idx {
        0 => BOS.to_string(),
        _ => tokens[idx - 1].to_lowercase(),
    };
    let next_word = tokens
        .get(idx + 1)
        .map(|t| t.to_lowercase())
        .unwrap_or_else(|| EOS.to_string());

    let mut features = vec![
        "bias".to_string(),
        format!("w={lower}"),
        format!("sh={}", shape(token)),
        format!("pre3={}", lower.chars().take(3).collect::<String>()),
        format!("suf3={}", suffix(&lower, 3)),
        format!("pw={prev_word}"),
        format!("nw={next_word}"),
        format!("pt={}", previous_outcome.unwrap_or(BOS)),
    ];
    if let Some(outcome) = adaptive {
        features.push(format!("pd={outcome}"));
    }
    features
}

/// Collapsed character-class shape, e.g. `Obama` -> `Xx`, `1984` -> `d`.
pub fn shape(token: &str) -> String {
    let mut shape = String::new();
    for ch in token.chars() {
        let class = if ch.is_uppercase() {
            'X'
        } else if ch.is_lowercase() {
            'x'
        } else if ch.is_ascii_digit() {
            'd'
        } else {
            ch
        };
        if !shape.ends_with(class) {
            shape.push(class);
        }
    }
    shape
}

fn suffix(token: &str, len: usize) -> String {
    let chars: Vec<char> = token.chars().collect();
    chars[chars.len().saturating_sub(len)..].iter().collect()
}

/// Whether `outcome` may follow `previous` under BIO constraints.
pub fn allowed(previous: Option<&str>, outcome: &str) -> bool {
    match outcome.strip_prefix("I-") {
        None => true,
        Some(label) => previous.is_some_and(|prev| {
            prev.strip_prefix("B-")
                .or_else(|| prev.strip_prefix("I-"))
                .is_some_and(|prev_label| prev_label == label)
        }),
    }
}
