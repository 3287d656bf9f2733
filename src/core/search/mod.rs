//! Query language and ranking.
//!
//! - **lexer**: query text to tokens
//! - **compiler**: tokens to an engine-independent [`CompiledQuery`]
//! - **scorer**: rule-driven re-scoring of matches
//!
//! A [`SearchPlan`] bundles everything derived from one request so the
//! storage layer can execute it without further lookups.

pub mod compiler;
pub mod lexer;
pub mod scorer;

pub use compiler::{compile, compile_text, CompiledQuery, Field};
pub use lexer::{tokenize, Token};
pub use scorer::{Rescorer, TitleMatcher};

use crate::core::config::SearchConfig;
use crate::core::error::{HisterError, Result};
use crate::core::rules::Rules;
use crate::core::types::Query;
use std::sync::Arc;

/// A validated, compiled search request
#[derive(Debug, Clone)]
pub struct SearchPlan {
    pub query: Query,
    pub compiled: CompiledQuery,
    /// Rules snapshot used for re-scoring
    pub rules: Arc<Rules>,
    pub priority_boost: f32,
    pub limit: usize,
    pub preview_chars: usize,
}

impl SearchPlan {
    pub fn new(query: Query, rules: Arc<Rules>, config: &SearchConfig) -> Result<Self> {
        if query.text.chars().count() > config.max_query_length {
            return Err(HisterError::InvalidQuery(format!(
                "Query exceeds maximum length of {} characters",
                config.max_query_length
            )));
        }
        if let (Some(from), Some(to)) = (query.date_from, query.date_to) {
            if from > to {
                return Err(HisterError::InvalidQuery(
                    "date_from must not be after date_to".to_string(),
                ));
            }
        }
        if let Some(bad) = query
            .fields
            .iter()
            .find(|name| Field::from_name(name.trim()).is_none())
        {
            return Err(HisterError::InvalidQuery(format!(
                "Unknown field '{bad}'. Valid fields: title, text, url, domain"
            )));
        }

        let limit = config.effective_limit(query.limit);
        let compiled = compile(&query);

        Ok(Self {
            query,
            compiled,
            rules,
            priority_boost: config.priority_boost,
            limit,
            preview_chars: config.preview_chars,
        })
    }

    pub fn rescorer(&self) -> Rescorer<'_> {
        Rescorer::new(&self.rules, self.priority_boost)
    }
}
