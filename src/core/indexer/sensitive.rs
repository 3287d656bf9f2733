//! Sensitive content screening.
//!
//! Pages containing credentials or private keys are never indexed. The
//! configured named patterns are combined into one [`RegexSet`] so a
//! single pass over the HTML reports every pattern that matched.

use crate::core::error::{HisterError, Result};
use regex::RegexSet;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct SensitiveMatcher {
    names: Vec<String>,
    set: RegexSet,
}

impl SensitiveMatcher {
    pub fn new(patterns: &BTreeMap<String, String>) -> Result<Self> {
        let names: Vec<String> = patterns.keys().cloned().collect();
        let set = RegexSet::new(patterns.values()).map_err(|e| {
            HisterError::ConfigError(format!("Invalid sensitive content pattern: {e}"))
        })?;

        Ok(Self { names, set })
    }

    /// A matcher with no patterns, nothing is ever rejected
    pub fn disabled() -> Self {
        Self {
            names: Vec::new(),
            set: RegexSet::empty(),
        }
    }

    /// Names of the patterns found in `content`, in name order
    pub fn find(&self, content: &str) -> Vec<String> {
        self.set
            .matches(content)
            .into_iter()
            .map(|i| self.names[i].clone())
            .collect()
    }

    /// Fail with [`HisterError::SensitiveContent`] if any pattern matches
    pub fn check(&self, content: &str) -> Result<()> {
        let patterns = self.find(content);
        if patterns.is_empty() {
            Ok(())
        } else {
            Err(HisterError::SensitiveContent { patterns })
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
