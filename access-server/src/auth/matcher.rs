//! Permission code matching
//!
//! A granted permission code may be a glob pattern. Matching follows shell
//! glob rules with the segment separators acting as hard boundaries:
//!
//! - `*` matches any run of characters inside one segment
//! - `?` matches exactly one non-separator character
//! - `[abc]`, `[a-z]`, `[!a-z]` / `[^a-z]` match one non-separator character
//! - `\x` matches `x` literally
//!
//! Exact string equality always matches. A malformed pattern never errors;
//! it only matches a requested code equal to it.
//!
//! ```
//! use access_server::auth::matcher::match_permission;
//!
//! assert!(match_permission("order:*", "order:create"));
//! assert!(!match_permission("order:*", "order:create:bulk"));
//! assert!(!match_permission("order:*", "shipment:create"));
//! ```

use thiserror::Error;

/// Default segment separators
pub const DEFAULT_SEPARATORS: &[char] = &[':', '/'];

/// Why a pattern failed to compile
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("unterminated character class at {0}")]
    UnterminatedClass(usize),

    #[error("empty character class at {0}")]
    EmptyClass(usize),

    #[error("invalid character range at {0}")]
    InvalidRange(usize),

    #[error("trailing escape at {0}")]
    TrailingEscape(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(char),
    AnyChar,
    Star,
    Class { negated: bool, ranges: Vec<(char, char)> },
}

/// A compiled glob pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    tokens: Vec<Token>,
}

impl Pattern {
    /// Compile `pattern`; fails on malformed classes or a trailing `\`
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let chars: Vec<char> = pattern.chars().collect();
        let mut tokens = Vec::with_capacity(chars.len());
        let mut i = 0;
        while i < chars.len() {
            match chars[i] {
                '*' => {
                    // consecutive stars are one star
                    if tokens.last() != Some(&Token::Star) {
                        tokens.push(Token::Star);
                    }
                    i += 1;
                }
                '?' => {
                    tokens.push(Token::AnyChar);
                    i += 1;
                }
                '\\' => {
                    let c = *chars.get(i + 1).ok_or(PatternError::TrailingEscape(i))?;
                    tokens.push(Token::Literal(c));
                    i += 2;
                }
                '[' => {
                    let (token, next) = parse_class(&chars, i)?;
                    tokens.push(token);
                    i = next;
                }
                c => {
                    tokens.push(Token::Literal(c));
                    i += 1;
                }
            }
        }
        Ok(Self { tokens })
    }

    /// True if the pattern contains no wildcard or class
    pub fn is_literal(&self) -> bool {
        self.tokens.iter().all(|t| matches!(t, Token::Literal(_)))
    }

    /// Match `subject` against this pattern with the given separators
    pub fn matches(&self, subject: &str, separators: &[char]) -> bool {
        let subject: Vec<char> = subject.chars().collect();
        let is_sep = |c: char| separators.contains(&c);

        let (mut p, mut s) = (0usize, 0usize);
        // (token index after the last star, subject index the star resumes from)
        let mut star: Option<(usize, usize)> = None;

        while s < subject.len() {
            match self.tokens.get(p) {
                Some(Token::Star) => {
                    star = Some((p + 1, s));
                    p += 1;
                    continue;
                }
                Some(token) if token_matches(token, subject[s], &is_sep) => {
                    p += 1;
                    s += 1;
                    continue;
                }
                _ => {}
            }

            // Backtrack: let the last star swallow one more character,
            // unless that character is a separator.
            match star {
                Some((resume, from)) if !is_sep(subject[from]) => {
                    star = Some((resume, from + 1));
                    p = resume;
                    s = from + 1;
                }
                _ => return false,
            }
        }

        while self.tokens.get(p) == Some(&Token::Star) {
            p += 1;
        }
        p == self.tokens.len()
    }
}

fn token_matches(token: &Token, c: char, is_sep: &impl Fn(char) -> bool) -> bool {
    match token {
        Token::Literal(l) => *l == c,
        Token::AnyChar => !is_sep(c),
        Token::Class { negated, ranges } => {
            if is_sep(c) {
                return false;
            }
            let hit = ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi);
            hit != *negated
        }
        Token::Star => false,
    }
}

/// Parse `[...]` starting at `start` (the `[`); returns the token and the
/// index just past the closing `]`.
fn parse_class(chars: &[char], start: usize) -> Result<(Token, usize), PatternError> {
    let mut i = start + 1;
    let negated = matches!(chars.get(i), Some('!') | Some('^'));
    if negated {
        i += 1;
    }

    let mut ranges = Vec::new();
    loop {
        let c = *chars.get(i).ok_or(PatternError::UnterminatedClass(start))?;
        if c == ']' {
            if ranges.is_empty() {
                return Err(PatternError::EmptyClass(start));
            }
            return Ok((Token::Class { negated, ranges }, i + 1));
        }

        let (lo, next) = class_char(chars, i, start)?;
        i = next;
        if chars.get(i) == Some(&'-') && chars.get(i + 1).is_some_and(|&c| c != ']') {
            let (hi, next) = class_char(chars, i + 1, start)?;
            if hi < lo {
                return Err(PatternError::InvalidRange(i));
            }
            ranges.push((lo, hi));
            i = next;
        } else if chars.get(i) == Some(&'-') {
            // `[a-]` has no upper bound
            return Err(PatternError::InvalidRange(i));
        } else {
            ranges.push((lo, lo));
        }
    }
}

fn class_char(chars: &[char], i: usize, start: usize) -> Result<(char, usize), PatternError> {
    match chars.get(i) {
        Some('\\') => chars
            .get(i + 1)
            .map(|&c| (c, i + 2))
            .ok_or(PatternError::TrailingEscape(i)),
        Some('-') => Err(PatternError::InvalidRange(i)),
        Some(&c) => Ok((c, i + 1)),
        None => Err(PatternError::UnterminatedClass(start)),
    }
}

/// Glob matcher for permission codes with configurable separators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionMatcher {
    separators: Vec<char>,
}

impl Default for PermissionMatcher {
    fn default() -> Self {
        Self {
            separators: DEFAULT_SEPARATORS.to_vec(),
        }
    }
}

impl PermissionMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matcher whose `*`/`?` stop at the given characters instead of `:` and `/`
    pub fn with_separators(separators: impl IntoIterator<Item = char>) -> Self {
        Self {
            separators: separators.into_iter().collect(),
        }
    }

    pub fn separators(&self) -> &[char] {
        &self.separators
    }

    /// Does `granted` (a glob) cover `requested`?
    pub fn match_permission(&self, granted: &str, requested: &str) -> bool {
        if granted == requested {
            return true;
        }
        match Pattern::parse(granted) {
            Ok(pattern) => pattern.matches(requested, &self.separators),
            Err(e) => {
                tracing::debug!(pattern = %granted, error = %e, "Malformed permission pattern, using exact match");
                false
            }
        }
    }

    /// True if any granted pattern covers `requested`; false for an empty set
    pub fn has_permission<S: AsRef<str>>(&self, granted: &[S], requested: &str) -> bool {
        granted
            .iter()
            .any(|g| self.match_permission(g.as_ref(), requested))
    }

    /// Elements of `all` covered by `pattern`, in input order
    pub fn filter_permissions<'a, S: AsRef<str>>(&self, all: &'a [S], pattern: &str) -> Vec<&'a str> {
        match Pattern::parse(pattern) {
            Ok(compiled) => all
                .iter()
                .map(|s| s.as_ref())
                .filter(|code| *code == pattern || compiled.matches(code, &self.separators))
                .collect(),
            Err(_) => all
                .iter()
                .map(|s| s.as_ref())
                .filter(|code| *code == pattern)
                .collect(),
        }
    }
}

/// [`PermissionMatcher::match_permission`] with the default separators
pub fn match_permission(granted: &str, requested: &str) -> bool {
    PermissionMatcher::default().match_permission(granted, requested)
}

/// [`PermissionMatcher::has_permission`] with the default separators
pub fn has_permission<S: AsRef<str>>(granted: &[S], requested: &str) -> bool {
    PermissionMatcher::default().has_permission(granted, requested)
}

/// [`PermissionMatcher::filter_permissions`] with the default separators
pub fn filter_permissions<'a, S: AsRef<str>>(all: &'a [S], pattern: &str) -> Vec<&'a str> {
    PermissionMatcher::default().filter_permissions(all, pattern)
}
