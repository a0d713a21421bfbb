//! Rule-based recognition of numeric expressions: dates, times, percentages and money.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Span;

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(?:[.,]\d+)*$").expect("valid regex"));
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:1[5-9]\d\d|20\d\d)$").expect("valid regex"));
static DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[12]\d|3[01]|0?[1-9])(?:st|nd|rd|th)?$").expect("valid regex"));
static MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sep|sept|oct|nov|dec)\.?$",
    )
    .expect("valid regex")
});
static NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\d{4}-\d{1,2}-\d{1,2}|\d{1,2}/\d{1,2}/(?:\d{2}|\d{4}))$").expect("valid regex")
});
static CLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[01]?\d|2[0-3]):[0-5]\d(?::[0-5]\d)?$").expect("valid regex"));
static MERIDIEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(?:am|pm|a\.m\.|p\.m\.)$").expect("valid regex"));
static PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(?:[.,]\d+)?%$").expect("valid regex"));
static PERCENT_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(?:%|percent|per\s?cent)$").expect("valid regex"));
static CURRENCY_SYMBOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[$€£¥]$").expect("valid regex"));
static MONEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[$€£¥]\d+(?:[.,]\d+)*$").expect("valid regex"));
static CURRENCY_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:dollars?|euros?|pounds?|yen|cents?)$").expect("valid regex")
});
static MAGNITUDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:thousand|million|billion|trillion)$").expect("valid regex"));

fn is(re: &Regex, tokens: &[&str], idx: usize) -> bool {
    tokens.get(idx).is_some_and(|t| re.is_match(t))
}

/// Find numeric entities in a tokenized sentence, left to right without overlaps.
pub fn find(tokens: &[&str]) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut idx = 0;
    while idx < tokens.len() {
        match match_at(tokens, idx) {
            Some(span) => {
                idx = span.end;
                spans.push(span);
            }
            None => idx += 1,
        }
    }
    spans
}

fn match_at(tokens: &[&str], i: usize) -> Option<Span> {
    if is(&CLOCK, tokens, i) {
        let end = if is(&MERIDIEM, tokens, i + 1) { i + 2 } else { i + 1 };
        return Some(Span::new(i, end, "TIME"));
    }
    if is(&PERCENT, tokens, i) {
        return Some(Span::new(i, i + 1, "PERCENT"));
    }
    if is(&NUMBER, tokens, i) && is(&PERCENT_WORD, tokens, i + 1) {
        return Some(Span::new(i, i + 2, "PERCENT"));
    }
    if is(&MONEY, tokens, i) {
        return Some(Span::new(i, magnitude(tokens, i + 1), "MONEY"));
    }
    if is(&CURRENCY_SYMBOL, tokens, i) && is(&NUMBER, tokens, i + 1) {
        return Some(Span::new(i, magnitude(tokens, i + 2), "MONEY"));
    }
    if is(&NUMBER, tokens, i) {
        let after = magnitude(tokens, i + 1);
        if is(&CURRENCY_WORD, tokens, after) {
            return Some(Span::new(i, after + 1, "MONEY"));
        }
    }
    if is(&NUMERIC_DATE, tokens, i) {
        return Some(Span::new(i, i + 1, "DATE"));
    }
    if is(&MONTH, tokens, i) {
        return month_first(tokens, i);
    }
    if is(&DAY, tokens, i) && is(&MONTH, tokens, i + 1) {
        let end = if is(&YEAR, tokens, i + 2) { i + 3 } else { i + 2 };
        return Some(Span::new(i, end, "DATE"));
    }
    if is(&YEAR, tokens, i) {
        return Some(Span::new(i, i + 1, "DATE"));
    }
    None
}

/// `March 3 , 2011`, `March 2011`, `March 3`. A bare month name is not a date.
fn month_first(tokens: &[&str], i: usize) -> Option<Span> {
    let mut end = i + 1;
    let mut has_number = false;
    if is(&DAY, tokens, end) && !is(&YEAR, tokens, end) {
        end += 1;
        has_number = true;
        if tokens.get(end) == Some(&",") && is(&YEAR, tokens, end + 1) {
            end += 1;
        }
    }
    if is(&YEAR, tokens, end) {
        end += 1;
        has_number = true;
    }
    has_number.then(|| Span::new(i, end, "DATE"))
}

/// Extend a money expression over a trailing `million`/`billion`.
fn magnitude(tokens: &[&str], idx: usize) -> usize {
    if is(&MAGNITUDE, tokens, idx) {
        idx + 1
    } else {
        idx
    }
}
