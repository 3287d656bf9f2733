//! Compile query-language tokens into a weighted, field-aware boolean
//! query tree.
//!
//! The output ([`CompiledQuery`]) knows nothing about the storage
//! engine; `core::storage` turns it into engine queries. Each token
//! becomes one *cluster*: an OR of boosted field clauses. The final
//! query is `(AND of included clusters) AND NOT (OR of excluded)`.

use crate::core::search::lexer::{tokenize, Token};
use crate::core::types::Query;
use std::fmt;

/// Searchable document fields and their clause weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Title,
    Text,
    Url,
    Domain,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Title, Field::Text, Field::Url, Field::Domain];

    pub fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Text => "text",
            Field::Url => "url",
            Field::Domain => "domain",
        }
    }

    pub fn weight(self) -> f32 {
        match self {
            Field::Text => 1.0,
            Field::Url => 4.0,
            Field::Domain => 8.0,
            Field::Title => 12.0,
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Fields indexed as one lower-cased term per document
    pub fn is_keyword(self) -> bool {
        matches!(self, Field::Url | Field::Domain)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Engine-independent query tree
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledQuery {
    MatchNone,
    MatchAll,
    /// Raw text for the engine's lenient query parser
    Fallback(String),
    Boolean {
        must: Vec<CompiledQuery>,
        must_not: Vec<CompiledQuery>,
    },
    /// At least one clause must match
    Any(Vec<CompiledQuery>),
    Phrase {
        field: Field,
        text: String,
        boost: f32,
    },
    /// Analyzed text, any token may match
    Match {
        field: Field,
        text: String,
        boost: f32,
    },
    /// Exact (lower-cased) term
    Term {
        field: Field,
        value: String,
        boost: f32,
    },
    /// `*` matches any sequence, `?` a single character
    Wildcard {
        field: Field,
        pattern: String,
        boost: f32,
    },
    AddedRange {
        from: Option<i64>,
        to: Option<i64>,
    },
}

impl CompiledQuery {
    pub fn field(&self) -> Option<Field> {
        match self {
            CompiledQuery::Phrase { field, .. }
            | CompiledQuery::Match { field, .. }
            | CompiledQuery::Term { field, .. }
            | CompiledQuery::Wildcard { field, .. } => Some(*field),
            _ => None,
        }
    }

    /// Leaf clauses that can make a document match (negated ones excluded)
    pub fn positive_clauses(&self) -> Vec<&CompiledQuery> {
        let mut out = Vec::new();
        self.collect_positive(&mut out);
        out
    }

    fn collect_positive<'a>(&'a self, out: &mut Vec<&'a CompiledQuery>) {
        match self {
            CompiledQuery::Boolean { must, .. } => {
                for q in must {
                    q.collect_positive(out);
                }
            }
            CompiledQuery::Any(clauses) => {
                for q in clauses {
                    q.collect_positive(out);
                }
            }
            q if q.field().is_some() => out.push(q),
            _ => {}
        }
    }
}

/// Compile a full search request: text, field subset and date range.
pub fn compile(query: &Query) -> CompiledQuery {
    let fields: Vec<Field> = query
        .fields
        .iter()
        .filter_map(|name| Field::from_name(name.trim()))
        .collect();
    let base = compile_text(&query.text, &fields);

    if query.date_from.is_none() && query.date_to.is_none() {
        return base;
    }
    if base == CompiledQuery::MatchNone {
        return base;
    }

    let to = match (query.date_from, query.date_to) {
        (Some(_), None) => Some(chrono::Utc::now().timestamp()),
        (_, to) => to,
    };

    CompiledQuery::Boolean {
        must: vec![
            base,
            CompiledQuery::AddedRange {
                from: query.date_from,
                to,
            },
        ],
        must_not: Vec::new(),
    }
}

/// Compile query text, restricted to `fields` when non-empty.
///
/// Text that fails to tokenize is passed through as
/// [`CompiledQuery::Fallback`].
pub fn compile_text(text: &str, fields: &[Field]) -> CompiledQuery {
    if text.trim().is_empty() {
        return CompiledQuery::MatchNone;
    }

    let tokens = match tokenize(text) {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::debug!("Falling back to lenient parsing: {}", e);
            return CompiledQuery::Fallback(text.to_string());
        }
    };

    let mut must = Vec::new();
    let mut must_not = Vec::new();

    for token in &tokens {
        let Some((cluster, negated)) = token_query(token) else {
            continue;
        };
        let filtered = restrict(cluster, fields);

        if negated {
            if let Some(q) = filtered {
                must_not.push(q);
            }
        } else {
            must.push(filtered.unwrap_or(CompiledQuery::MatchNone));
        }
    }

    if must.is_empty() && must_not.is_empty() {
        return CompiledQuery::MatchNone;
    }
    if must.contains(&CompiledQuery::MatchNone) {
        return CompiledQuery::MatchNone;
    }
    if must.is_empty() {
        must.push(CompiledQuery::MatchAll);
    }

    CompiledQuery::Boolean { must, must_not }
}

/// One cluster per token, with its negation flag
fn token_query(token: &Token) -> Option<(CompiledQuery, bool)> {
    match token {
        Token::Quoted(text) => {
            if text.split_whitespace().next().is_none() {
                return None;
            }
            let clauses = [Field::Title, Field::Text]
                .into_iter()
                .map(|field| CompiledQuery::Phrase {
                    field,
                    text: text.clone(),
                    boost: field.weight(),
                })
                .collect();
            Some((CompiledQuery::Any(clauses), false))
        }
        Token::Word(word) => word_query(word),
        Token::Alternation { parts, .. } => {
            // Options cannot be negated, a leading '-' is dropped
            let clauses: Vec<CompiledQuery> = parts
                .iter()
                .filter_map(|part| word_query(part).map(|(q, _)| q))
                .collect();
            if clauses.is_empty() {
                return None;
            }
            Some((CompiledQuery::Any(clauses), false))
        }
    }
}

fn word_query(word: &str) -> Option<(CompiledQuery, bool)> {
    if let Some((field, value)) = split_field(word) {
        let (value, negated) = match value.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (value, false),
        };
        if value.is_empty() {
            return None;
        }
        return Some((field_query(field, value), negated));
    }

    let (value, negated) = match word.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (word, false),
    };
    if value.is_empty() {
        return None;
    }

    let mut clauses: Vec<CompiledQuery> = [Field::Title, Field::Text]
        .into_iter()
        .map(|field| {
            if value.contains('*') {
                CompiledQuery::Wildcard {
                    field,
                    pattern: value.to_lowercase(),
                    boost: field.weight(),
                }
            } else {
                CompiledQuery::Match {
                    field,
                    text: value.to_string(),
                    boost: field.weight(),
                }
            }
        })
        .collect();

    let pattern = if value.contains('*') {
        value.to_lowercase()
    } else {
        format!("*{}*", value.to_lowercase())
    };
    for field in [Field::Url, Field::Domain] {
        clauses.push(CompiledQuery::Wildcard {
            field,
            pattern: pattern.clone(),
            boost: field.weight(),
        });
    }

    Some((CompiledQuery::Any(clauses), negated))
}

fn field_query(field: Field, value: &str) -> CompiledQuery {
    let boost = field.weight();
    if value.contains('*') {
        CompiledQuery::Wildcard {
            field,
            pattern: value.to_lowercase(),
            boost,
        }
    } else if field.is_keyword() {
        CompiledQuery::Term {
            field,
            value: value.to_lowercase(),
            boost,
        }
    } else {
        CompiledQuery::Match {
            field,
            text: value.to_string(),
            boost,
        }
    }
}

/// `field:value` where field is a known field name
fn split_field(word: &str) -> Option<(Field, &str)> {
    let (name, value) = word.split_once(':')?;
    Field::from_name(name).map(|field| (field, value))
}

/// Drop clauses on fields outside `fields`; `None` when nothing is left
fn restrict(query: CompiledQuery, fields: &[Field]) -> Option<CompiledQuery> {
    if fields.is_empty() {
        return Some(query);
    }

    match query {
        CompiledQuery::Any(clauses) => {
            let kept: Vec<CompiledQuery> = clauses
                .into_iter()
                .filter_map(|q| restrict(q, fields))
                .collect();
            if kept.is_empty() {
                None
            } else {
                Some(CompiledQuery::Any(kept))
            }
        }
        q => match q.field() {
            Some(field) if !fields.contains(&field) => None,
            _ => Some(q),
        },
    }
}
