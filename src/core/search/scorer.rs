//! Post-match re-scoring.
//!
//! Relevance from the engine is multiplied by per-field modifiers:
//! a title that takes part in the match counts ten times, a URL matching
//! a priority rule counts `priority_boost` times. The modifier itself is
//! a pure function of `(field, term, did_match)`; engine integration
//! lives in `core::storage`.

use crate::core::rules::Rules;
use crate::core::search::compiler::{CompiledQuery, Field};
use regex::Regex;
use std::collections::HashSet;

/// Multiplier for a title that took part in the match
pub const TITLE_MATCH_MULTIPLIER: f32 = 10.0;

/// Per-field score modifier driven by the active rules
#[derive(Debug, Clone)]
pub struct Rescorer<'a> {
    rules: &'a Rules,
    priority_boost: f32,
}

impl<'a> Rescorer<'a> {
    pub fn new(rules: &'a Rules, priority_boost: f32) -> Self {
        Self {
            rules,
            priority_boost,
        }
    }

    /// Multiplier for one stored field value
    pub fn modifier(&self, field: Field, term: &str, did_match: bool) -> f32 {
        match field {
            Field::Title if did_match => TITLE_MATCH_MULTIPLIER,
            Field::Url if self.rules.is_priority(&term.to_lowercase()) => self.priority_boost,
            _ => 1.0,
        }
    }

    /// Start scoring one candidate document
    pub fn visitor(&self) -> ScoreVisitor<'_, 'a> {
        ScoreVisitor {
            rescorer: self,
            seen: HashSet::new(),
            multiplier: 1.0,
        }
    }
}

/// Accumulates modifiers for one document, each field counted once
#[derive(Debug)]
pub struct ScoreVisitor<'r, 'a> {
    rescorer: &'r Rescorer<'a>,
    seen: HashSet<Field>,
    multiplier: f32,
}

impl ScoreVisitor<'_, '_> {
    pub fn visit(&mut self, field: Field, term: &str, did_match: bool) {
        if !self.seen.insert(field) {
            return;
        }
        self.multiplier *= self.rescorer.modifier(field, term, did_match);
    }

    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }
}

/// Decides whether a stored title took part in a match.
///
/// Built once per search from the positive title clauses of the
/// compiled query and checked against the title's tokens.
#[derive(Debug, Clone, Default)]
pub struct TitleMatcher {
    terms: HashSet<String>,
    phrases: Vec<Vec<String>>,
    patterns: Vec<Regex>,
}

impl TitleMatcher {
    pub fn new(query: &CompiledQuery) -> Self {
        let mut matcher = Self::default();

        for clause in query.positive_clauses() {
            match clause {
                CompiledQuery::Match {
                    field: Field::Title,
                    text,
                    ..
                } => matcher.terms.extend(title_tokens(text)),
                CompiledQuery::Term {
                    field: Field::Title,
                    value,
                    ..
                } => {
                    matcher.terms.insert(value.to_lowercase());
                }
                CompiledQuery::Phrase {
                    field: Field::Title,
                    text,
                    ..
                } => {
                    let words = title_tokens(text);
                    if !words.is_empty() {
                        matcher.phrases.push(words);
                    }
                }
                CompiledQuery::Wildcard {
                    field: Field::Title,
                    pattern,
                    ..
                } => {
                    if let Ok(re) = Regex::new(&format!("^{}$", wildcard_to_regex(pattern))) {
                        matcher.patterns.push(re);
                    }
                }
                _ => {}
            }
        }

        matcher
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.phrases.is_empty() && self.patterns.is_empty()
    }

    pub fn matches(&self, title: &str) -> bool {
        if self.is_empty() {
            return false;
        }
        let tokens = title_tokens(title);

        tokens.iter().any(|t| self.terms.contains(t))
            || self
                .phrases
                .iter()
                .any(|phrase| tokens.windows(phrase.len()).any(|w| w == phrase.as_slice()))
            || tokens
                .iter()
                .any(|t| self.patterns.iter().any(|re| re.is_match(t)))
    }
}

/// Lower-cased alphanumeric runs, the same split the title field is indexed with
pub fn title_tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Regex source for a `*`/`?` wildcard pattern.
///
/// Not anchored: term automata in the index always match whole terms.
pub fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut literal = String::new();

    for c in pattern.chars() {
        match c {
            '*' | '?' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(if c == '*' { ".*" } else { "." });
            }
            _ => literal.push(c),
        }
    }
    out.push_str(&regex::escape(&literal));

    out
}
