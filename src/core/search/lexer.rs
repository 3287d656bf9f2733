//! Tokenizer for the Hister query language.
//!
//! The language is intentionally small:
//!
//! - `word`, `-word`, `field:value`, `field:-value` are [`Token::Word`]
//! - `"exact phrase"` is [`Token::Quoted`] (`\"` escapes a quote)
//! - `(a|b|c)` is [`Token::Alternation`]
//!
//! Whitespace outside quotes and parentheses is the only separator. An
//! internal `"` inside a word toggles a quoted state so
//! `title:"exact phrase"` stays a single word.

use crate::core::error::{HisterError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    Quoted(String),
    Alternation {
        /// Text between the outer parentheses
        raw: String,
        /// Trimmed, non-empty options split on top-level `|`
        parts: Vec<String>,
    },
}

/// Split `input` into tokens.
///
/// Fails with [`HisterError::QuerySyntax`] on an unterminated quote or
/// parenthesis group; input is never silently truncated.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    Lexer::new(input).collect()
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn next_token(&mut self) -> Option<Result<Token>> {
        self.skip_whitespace();

        match self.chars.peek()? {
            '"' => {
                self.chars.next();
                Some(self.read_quoted())
            }
            '(' => {
                self.chars.next();
                Some(self.read_alternation())
            }
            _ => Some(self.read_word()),
        }
    }

    fn read_quoted(&mut self) -> Result<Token> {
        let mut value = String::new();

        while let Some(c) = self.chars.next() {
            match c {
                '"' => return Ok(Token::Quoted(value)),
                '\\' if self.chars.peek() == Some(&'"') => {
                    self.chars.next();
                    value.push('"');
                }
                _ => value.push(c),
            }
        }

        Err(HisterError::QuerySyntax("unclosed quoted string".to_string()))
    }

    fn read_alternation(&mut self) -> Result<Token> {
        let mut raw = String::new();
        let mut depth = 1usize;

        for c in self.chars.by_ref() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        let parts = split_alternation(&raw);
                        return Ok(Token::Alternation { raw, parts });
                    }
                }
                _ => {}
            }
            raw.push(c);
        }

        Err(HisterError::QuerySyntax(
            "unclosed alternation group".to_string(),
        ))
    }

    fn read_word(&mut self) -> Result<Token> {
        let mut value = String::new();
        let mut quoted = false;
        let mut depth = 0usize;

        while let Some(&c) = self.chars.peek() {
            if !quoted && c.is_whitespace() {
                break;
            }
            match c {
                '"' => quoted = !quoted,
                '(' if !quoted => depth += 1,
                ')' if !quoted => depth = depth.saturating_sub(1),
                _ => {}
            }
            value.push(c);
            self.chars.next();
        }

        if quoted {
            return Err(HisterError::QuerySyntax(format!(
                "unclosed quoted string in '{value}'"
            )));
        }
        if depth > 0 {
            return Err(HisterError::QuerySyntax(format!(
                "unclosed parenthesis in '{value}'"
            )));
        }

        Ok(Token::Word(value))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Split on `|` at nesting depth zero, trimming and dropping empty parts
fn split_alternation(raw: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in raw.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            '|' if depth == 0 => {
                push_part(&mut parts, &current);
                current.clear();
            }
            _ => current.push(c),
        }
    }
    push_part(&mut parts, &current);

    parts
}

fn push_part(parts: &mut Vec<String>, part: &str) {
    let trimmed = part.trim();
    if !trimmed.is_empty() {
        parts.push(trimmed.to_string());
    }
}
