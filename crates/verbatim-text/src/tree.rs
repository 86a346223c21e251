//! Word-tree extraction.
//!
//! For every whole-word occurrence of the anchor, the rest of its clause (up
//! to and including the next `.`, `!` or `?`, or the end of the segment) is
//! tokenized into a postfix phrase. Phrases are grouped by response id and
//! emitted in ascending id order; a later occurrence inside an earlier
//! occurrence's clause still yields its own phrase.

use std::collections::BTreeMap;

use tracing::debug;
use verbatim_types::{Phrase, PostfixSet, ResponseId};

use crate::corpus::Corpus;
use crate::pattern::{PatternError, WordMatcher};
use crate::tokenize::{is_terminator, postfix_tokens_limited};

pub fn extract(corpus: &Corpus, anchor: &str) -> Result<Vec<PostfixSet>, PatternError> {
    extract_with_limit(corpus, anchor, usize::MAX)
}

/// [`extract`] with every phrase cut to at most `max_phrase_tokens` tokens.
/// Bounds the output of long unterminated clauses full of anchors.
pub fn extract_with_limit(
    corpus: &Corpus,
    anchor: &str,
    max_phrase_tokens: usize,
) -> Result<Vec<PostfixSet>, PatternError> {
    let matcher = WordMatcher::new(anchor)?;

    // Keyed by id so the emitted order never depends on corpus order.
    let mut branches: BTreeMap<ResponseId, Vec<Phrase>> = BTreeMap::new();
    for response in corpus.responses() {
        let phrases: Vec<Phrase> = response
            .segments()
            .flat_map(|segment| postfix_phrases_limited(&matcher, segment, max_phrase_tokens))
            .collect();
        if phrases.is_empty() {
            continue;
        }
        branches
            .entry(response.id.clone())
            .or_default()
            .extend(phrases);
    }

    debug!(
        "word tree for {:?} has {} branches",
        matcher.word(),
        branches.len()
    );
    Ok(branches
        .into_iter()
        .map(|(id, phrases)| PostfixSet { id, phrases })
        .collect())
}

/// Non-empty postfix phrases of `segment`, in occurrence order.
pub fn postfix_phrases(matcher: &WordMatcher, segment: &str) -> Vec<Phrase> {
    postfix_phrases_limited(matcher, segment, usize::MAX)
}

fn postfix_phrases_limited(
    matcher: &WordMatcher,
    segment: &str,
    max_tokens: usize,
) -> Vec<Phrase> {
    // End of the current clause; shared by every occurrence inside it.
    let mut clause_end: Option<usize> = None;
    let mut phrases = Vec::new();
    for found in matcher.find_iter(segment) {
        let end = match clause_end {
            Some(end) if end > found.end => end,
            _ => {
                let end = found.end + clause_remainder(&segment[found.end..]).len();
                clause_end = Some(end);
                end
            }
        };
        let phrase = postfix_tokens_limited(&segment[found.end..end], max_tokens);
        if !phrase.is_empty() {
            phrases.push(phrase);
        }
    }
    phrases
}

/// `rest` up to and including its first terminator, or all of it.
pub fn clause_remainder(rest: &str) -> &str {
    match rest.find(is_terminator) {
        Some(idx) => &rest[..=idx],
        None => rest,
    }
}
