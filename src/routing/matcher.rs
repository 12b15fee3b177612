//! Route template compilation and path matching.
//!
//! # Responsibilities
//! - Compile a template such as `/product/{id}/edit` into literal and
//!   placeholder tokens
//! - Match a concrete request path against the compiled tokens
//! - Extract placeholder values in declaration order
//!
//! # Design Decisions
//! - Anchored: the whole path must be consumed, no partial matches
//! - A placeholder captures one or more characters, never `/`
//! - Literal text is compared verbatim (no regex metacharacters)
//! - Trailing slashes are significant: `/a` and `/a/` are distinct
//! - No regex: placeholders are matched greedily with backtracking, which
//!   keeps `{name}.png` style templates working

use std::fmt;
use thiserror::Error;

/// Errors raised while compiling a route template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The same placeholder name appears twice in one template.
    #[error("duplicate placeholder `{name}` in route template `{template}`")]
    DuplicateParam { template: String, name: String },
}

/// Route parameters extracted from a matched path, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    entries: Vec<(String, String)>,
}

impl RouteParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a parameter value by placeholder name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }
}

impl<K, V> FromIterator<(K, V)> for RouteParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = RouteParams::new();
        for (name, value) in iter {
            params.push(name, value);
        }
        params
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    /// Index into `PathPattern::names`.
    Param(usize),
}

/// A compiled route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    template: String,
    tokens: Vec<Token>,
    names: Vec<String>,
}

impl PathPattern {
    /// Compile a route template.
    ///
    /// Every `{name}` (one or more characters other than `}`) becomes a
    /// placeholder. A `{` without a closing brace, or an empty `{}`, is kept
    /// as literal text.
    pub fn compile(template: &str) -> Result<Self, PatternError> {
        let mut tokens = Vec::new();
        let mut names: Vec<String> = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            let after_open = &rest[open + 1..];
            let close = match after_open.find('}') {
                Some(0) | None => {
                    // not a placeholder, keep scanning after this brace
                    literal.push_str(&rest[..=open]);
                    rest = after_open;
                    continue;
                }
                Some(close) => close,
            };

            literal.push_str(&rest[..open]);
            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }

            let name = &after_open[..close];
            if names.iter().any(|existing| existing == name) {
                return Err(PatternError::DuplicateParam {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }
            tokens.push(Token::Param(names.len()));
            names.push(name.to_string());
            rest = &after_open[close + 1..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Ok(Self {
            template: template.to_string(),
            tokens,
            names,
        })
    }

    /// The template this pattern was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// True when the template has no placeholders.
    pub fn is_literal(&self) -> bool {
        self.names.is_empty()
    }

    /// Match a request path, returning the extracted parameters.
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let mut captures = Vec::with_capacity(self.names.len());
        if !match_tokens(&self.tokens, path, &mut captures) {
            return None;
        }

        Some(
            self.names
                .iter()
                .cloned()
                .zip(captures.into_iter().map(str::to_string))
                .collect(),
        )
    }

    /// Build a concrete path by substituting every placeholder.
    ///
    /// Returns `None` if a placeholder has no value or a value would span
    /// more than one segment.
    pub fn expand(&self, params: &RouteParams) -> Option<String> {
        let mut path = String::with_capacity(self.template.len());
        for token in &self.tokens {
            match token {
                Token::Literal(text) => path.push_str(text),
                Token::Param(index) => {
                    let value = params.get(&self.names[*index])?;
                    if value.is_empty() || value.contains('/') {
                        return None;
                    }
                    path.push_str(value);
                }
            }
        }
        Some(path)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

fn match_tokens<'p>(tokens: &[Token], path: &'p str, captures: &mut Vec<&'p str>) -> bool {
    let Some((token, remaining)) = tokens.split_first() else {
        return path.is_empty();
    };

    match token {
        Token::Literal(text) => match path.strip_prefix(text.as_str()) {
            Some(rest) => match_tokens(remaining, rest, captures),
            None => false,
        },
        Token::Param(_) => {
            let segment_end = path.find('/').unwrap_or(path.len());
            // Greedy: try the longest capture first, then back off.
            let mut ends: Vec<usize> = path[..segment_end]
                .char_indices()
                .map(|(i, c)| i + c.len_utf8())
                .collect();
            ends.reverse();

            for end in ends {
                captures.push(&path[..end]);
                if match_tokens(remaining, &path[end..], captures) {
                    return true;
                }
                captures.pop();
            }
            false
        }
    }
}
