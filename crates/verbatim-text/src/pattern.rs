//! Whole-word, case-insensitive matching of caller-supplied words.
//!
//! Words are matched literally: regex metacharacters are escaped before
//! compilation. The compiled case-insensitive literal is cached process-wide
//! by its pattern string; the word-boundary check runs on each candidate
//! match so words that begin or end with punctuation keep the
//! "no adjacent word character" rule.

use std::ops::Range;
use std::sync::LazyLock;

use dashmap::DashMap;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// Upper bound on cached patterns; later patterns are compiled per call.
pub const MAX_CACHED_PATTERNS: usize = 4096;

static PATTERNS: LazyLock<DashMap<String, Regex>> = LazyLock::new(DashMap::new);

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("word must not be empty")]
    Empty,
    #[error("invalid word pattern: {0}")]
    Compile(#[from] regex::Error),
}

/// Compiled matcher for one anchor or filter word.
#[derive(Clone, Debug)]
pub struct WordMatcher {
    word: String,
    regex: Regex,
}

impl WordMatcher {
    /// Surrounding whitespace is ignored; a blank word is rejected.
    pub fn new(word: &str) -> Result<Self, PatternError> {
        let word = word.trim();
        if word.is_empty() {
            return Err(PatternError::Empty);
        }
        let regex = cached(&format!("(?i){}", regex::escape(&word.to_lowercase())))?;
        Ok(Self {
            word: word.to_string(),
            regex,
        })
    }

    /// The word as supplied, without surrounding whitespace.
    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.find_iter(text).next().is_some()
    }

    /// Leftmost-first, non-overlapping whole-word matches.
    pub fn find_iter<'m, 't>(&'m self, text: &'t str) -> WordMatches<'m, 't> {
        WordMatches {
            regex: &self.regex,
            text,
            pos: 0,
        }
    }
}

pub struct WordMatches<'m, 't> {
    regex: &'m Regex,
    text: &'t str,
    pos: usize,
}

impl Iterator for WordMatches<'_, '_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos <= self.text.len() {
            let found = self.regex.find_at(self.text, self.pos)?;
            if is_whole_word(self.text, found.start(), found.end()) {
                self.pos = found.end();
                return Some(found.range());
            }
            // Retry one character later so overlapping candidates are seen.
            let step = self.text[found.start()..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
            self.pos = found.start() + step;
        }
        None
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

fn cached(source: &str) -> Result<Regex, PatternError> {
    if let Some(regex) = PATTERNS.get(source) {
        return Ok(regex.clone());
    }
    let regex = Regex::new(source)?;
    if PATTERNS.len() < MAX_CACHED_PATTERNS {
        PATTERNS.insert(source.to_string(), regex.clone());
    } else {
        debug!("pattern cache full, not caching {source}");
    }
    Ok(regex)
}

/// Number of compiled patterns currently cached.
pub fn cached_patterns() -> usize {
    PATTERNS.len()
}
