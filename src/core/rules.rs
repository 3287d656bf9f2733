//! User-maintained skip/priority rules and query aliases.
//!
//! A [`Rules`] value is compiled once and never mutated. Edits go
//! through [`RulesStore`], which builds a new value, persists it to
//! `rules.json` and only then swaps it in, so readers never observe a
//! half-updated rule set or a stale compiled regex.

use crate::core::error::{HisterError, Result};
use parking_lot::RwLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A list of regex sources compiled into one alternation
#[derive(Debug, Clone, Default)]
pub struct Rule {
    patterns: Vec<String>,
    re: Option<Regex>,
}

impl Rule {
    /// Compile `(p1)|(p2)|...`. An empty list never matches.
    pub fn new(patterns: Vec<String>) -> Result<Self> {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        if patterns.is_empty() {
            return Ok(Self { patterns, re: None });
        }

        let source = format!("({})", patterns.join(")|("));
        let re = Regex::new(&source).map_err(|e| HisterError::InvalidRule(e.to_string()))?;

        Ok(Self {
            patterns,
            re: Some(re),
        })
    }

    pub fn is_match(&self, s: &str) -> bool {
        self.re.as_ref().is_some_and(|re| re.is_match(s))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// On-disk shape of `rules.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesData {
    #[serde(default)]
    pub skip: Vec<String>,

    #[serde(default)]
    pub priority: Vec<String>,

    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

/// Compiled, immutable rule set
#[derive(Debug, Clone, Default)]
pub struct Rules {
    skip: Rule,
    priority: Rule,
    aliases: BTreeMap<String, String>,
}

impl Rules {
    pub fn compile(data: RulesData) -> Result<Self> {
        Ok(Self {
            skip: Rule::new(data.skip)?,
            priority: Rule::new(data.priority)?,
            aliases: data.aliases,
        })
    }

    /// Rules that never match and have no aliases
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_skip(&self, url: &str) -> bool {
        self.skip.is_match(url)
    }

    pub fn is_priority(&self, url: &str) -> bool {
        self.priority.is_match(url)
    }

    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    /// Replace whole whitespace-separated tokens that equal an alias key.
    ///
    /// The input is returned untouched when no token matches, otherwise
    /// tokens are re-joined with single spaces.
    pub fn resolve_aliases(&self, query: &str) -> String {
        if self.aliases.is_empty() {
            return query.to_string();
        }

        let mut changed = false;
        let parts: Vec<&str> = query
            .split_whitespace()
            .map(|token| match self.aliases.get(token) {
                Some(replacement) => {
                    changed = true;
                    replacement.as_str()
                }
                None => token,
            })
            .collect();

        if changed {
            parts.join(" ")
        } else {
            query.to_string()
        }
    }

    pub fn to_data(&self) -> RulesData {
        RulesData {
            skip: self.skip.patterns().to_vec(),
            priority: self.priority.patterns().to_vec(),
            aliases: self.aliases.clone(),
        }
    }
}

/// Persisted rule set with atomic replacement
#[derive(Debug)]
pub struct RulesStore {
    path: PathBuf,
    current: RwLock<Arc<Rules>>,
}

impl RulesStore {
    /// Load rules from `path`, creating an empty rules file if missing
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let data = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str::<RulesData>(&contents)?
        } else {
            tracing::debug!("No rules file at {:?}, creating one", path);
            let data = RulesData::default();
            write_rules(&path, &data)?;
            data
        };

        let rules = Rules::compile(data)?;
        Ok(Self {
            path,
            current: RwLock::new(Arc::new(rules)),
        })
    }

    /// Rules store that lives in memory only (tests, one-shot tools)
    pub fn in_memory(rules: Rules) -> Self {
        Self {
            path: PathBuf::new(),
            current: RwLock::new(Arc::new(rules)),
        }
    }

    /// Snapshot of the active rules
    pub fn current(&self) -> Arc<Rules> {
        Arc::clone(&self.current.read())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Compile, persist and swap in an edited copy of the active rules.
    ///
    /// Edits are serialized by holding the write lock for the whole
    /// read-modify-write cycle. A failed compile or save leaves the active
    /// rules untouched.
    pub fn update<F>(&self, edit: F) -> Result<Arc<Rules>>
    where
        F: FnOnce(&mut RulesData),
    {
        let mut guard = self.current.write();

        let mut data = guard.to_data();
        edit(&mut data);

        let rules = Arc::new(Rules::compile(data.clone())?);
        if !self.path.as_os_str().is_empty() {
            write_rules(&self.path, &data)?;
        }

        *guard = Arc::clone(&rules);
        tracing::debug!(
            "Rules updated: {} skip, {} priority, {} aliases",
            data.skip.len(),
            data.priority.len(),
            data.aliases.len()
        );
        Ok(rules)
    }

    pub fn add_alias(&self, keyword: &str, value: &str) -> Result<Arc<Rules>> {
        let keyword = keyword.trim();
        if keyword.is_empty() || keyword.contains(char::is_whitespace) {
            return Err(HisterError::InvalidRule(format!(
                "alias keyword must be a single word: '{keyword}'"
            )));
        }
        self.update(|data| {
            data.aliases
                .insert(keyword.to_string(), value.trim().to_string());
        })
    }

    pub fn delete_alias(&self, keyword: &str) -> Result<Arc<Rules>> {
        if !self.current().aliases.contains_key(keyword) {
            return Err(HisterError::InvalidRule(format!(
                "unknown alias: '{keyword}'"
            )));
        }
        self.update(|data| {
            data.aliases.remove(keyword);
        })
    }

    pub fn set_skip(&self, patterns: Vec<String>) -> Result<Arc<Rules>> {
        self.update(|data| data.skip = patterns)
    }

    pub fn set_priority(&self, patterns: Vec<String>) -> Result<Arc<Rules>> {
        self.update(|data| data.priority = patterns)
    }
}

fn write_rules(path: &Path, data: &RulesData) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(data)?;
    fs::write(path, json)?;
    Ok(())
}
