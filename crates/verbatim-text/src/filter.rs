//! Sentence filtering by an arbitrary word.
//!
//! Works on sentence sets: pre-segmented sentences as supplied, raw text cut
//! at terminators outside the filter word. The postfix form here is built
//! differently from the word tree: the sentence is split on every occurrence
//! of the filter word and the pieces after the first occurrence are joined
//! back with the filter word between them, so the phrase runs to the end of
//! the sentence.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use tracing::debug;
use verbatim_types::{Response, ResponseId, SentenceSet};

use crate::corpus::Corpus;
use crate::pattern::{PatternError, WordMatcher};
use crate::tokenize::{postfix_tokens, split_sentences_keeping};

/// Shape of each matching sentence in [`match_sentences`] output.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SentenceForm {
    /// The sentence unmodified, as a one-element sequence.
    Raw,
    /// Postfix tokens following the first occurrence.
    #[default]
    Postfix,
}

impl SentenceForm {
    pub fn from_name(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "raw" => Some(SentenceForm::Raw),
            "postfix" => Some(SentenceForm::Postfix),
            _ => None,
        }
    }
}

pub fn match_sentences(
    corpus: &Corpus,
    word: &str,
    form: SentenceForm,
) -> Result<Vec<SentenceSet>, PatternError> {
    let matcher = WordMatcher::new(word)?;
    let mut sets: Vec<SentenceSet> = Vec::new();
    let mut slots: HashMap<ResponseId, usize> = HashMap::new();

    for response in corpus.responses() {
        let matched: Vec<Vec<String>> = sentences_of(response, &matcher)
            .into_iter()
            .filter_map(|sentence| match form {
                SentenceForm::Raw => matcher
                    .is_match(sentence)
                    .then(|| vec![sentence.to_string()]),
                SentenceForm::Postfix => postfix_display(&matcher, sentence),
            })
            .collect();
        if matched.is_empty() {
            continue;
        }
        match slots.get(&response.id) {
            Some(&slot) => sets[slot].sentences.extend(matched),
            None => {
                slots.insert(response.id.clone(), sets.len());
                sets.push(SentenceSet {
                    id: response.id.clone(),
                    sentences: matched,
                });
            }
        }
    }

    debug!(
        "filter {:?} ({form:?}) matched {} responses",
        matcher.word(),
        sets.len()
    );
    Ok(sets)
}

/// Distinct ids, in order of first match, of responses with at least one
/// sentence that continues past the filter word.
pub fn response_ids(corpus: &Corpus, word: &str) -> Result<Vec<ResponseId>, PatternError> {
    let matcher = WordMatcher::new(word)?;
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for response in corpus.responses() {
        let continues = sentences_of(response, &matcher)
            .into_iter()
            .any(|sentence| postfix_display(&matcher, sentence).is_some());
        if continues && seen.insert(&response.id) {
            ids.push(response.id.clone());
        }
    }
    debug!("filter {:?} matched {} ids", matcher.word(), ids.len());
    Ok(ids)
}

/// Split `sentence` on the filter word and rejoin everything after the first
/// occurrence, re-inserting the word between the pieces. `None` when the word
/// does not occur.
pub fn rejoin_after_first(matcher: &WordMatcher, sentence: &str) -> Option<String> {
    let mut occurrences = matcher.find_iter(sentence);
    let first = occurrences.next()?;
    let mut rejoined = String::with_capacity(sentence.len() - first.end);
    let mut cursor = first.end;
    for found in occurrences {
        rejoined.push_str(&sentence[cursor..found.start]);
        rejoined.push_str(matcher.word());
        cursor = found.end;
    }
    rejoined.push_str(&sentence[cursor..]);
    Some(rejoined)
}

fn postfix_display(matcher: &WordMatcher, sentence: &str) -> Option<Vec<String>> {
    let phrase = postfix_tokens(&rejoin_after_first(matcher, sentence)?);
    (!phrase.is_empty()).then(|| phrase.display_tokens())
}

/// Sentence set of one response. Raw text is never cut inside an occurrence
/// of the filter word, so words such as `e.g` survive sentence splitting.
fn sentences_of<'r>(response: &'r Response, matcher: &WordMatcher) -> Vec<&'r str> {
    let mut sentences: Vec<&str> = response
        .sentences
        .iter()
        .flatten()
        .map(String::as_str)
        .collect();
    if let Some(text) = &response.text {
        let occurrences: Vec<Range<usize>> = matcher.find_iter(text).collect();
        sentences.extend(split_sentences_keeping(text, &occurrences));
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    fn survey() -> Corpus {
        let sentences = |items: &[&str]| -> Vec<Vec<String>> {
            items.iter().map(|s| vec![s.to_string()]).collect()
        };
        Corpus::new(vec![
            Response::from_sentences("2021708", sentences(&["I also love eating pizza "])),
            Response::from_sentences(
                "2021711",
                sentences(&["my pizza is what I give you", "I eat pizza and nothing else"]),
            ),
            Response::from_sentences("2021712", sentences(&["I would love you to help me more !"])),
            Response::from_text("2021714", "Loved it. Love, love, LOVE it!"),
        ])
    }

    #[test]
    fn raw_form_returns_matching_sentences_unmodified() {
        let sets = match_sentences(&survey(), "pizza", SentenceForm::Raw).unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].id, ResponseId::from("2021708"));
        assert_eq!(sets[0].sentences, vec![vec!["I also love eating pizza ".to_string()]]);
        assert_eq!(sets[1].sentences.len(), 2);
    }

    #[test]
    fn postfix_form_rejoins_on_the_filter_word() {
        let sets = match_sentences(&survey(), "love", SentenceForm::Postfix).unwrap();
        let ids: Vec<String> = sets.iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids, vec!["2021708", "2021712", "2021714"]);
        assert_eq!(sets[0].sentences, vec![vec![" eating", " pizza"]]);
        assert_eq!(
            sets[2].sentences,
            vec![vec![",", " love", ",", " love", " it!"]]
        );
    }

    #[test]
    fn rejoin_keeps_the_rest_of_the_sentence() {
        let matcher = WordMatcher::new("love").unwrap();
        assert_eq!(
            rejoin_after_first(&matcher, "I love you and LOVE me").as_deref(),
            Some(" you and love me")
        );
        assert_eq!(rejoin_after_first(&matcher, "no match"), None);
        assert_eq!(rejoin_after_first(&matcher, "love").as_deref(), Some(""));
    }

    #[test]
    fn ids_are_distinct_in_first_match_order() {
        let mut corpus = survey().responses().to_vec();
        corpus.push(Response::from_text("2021708", "pizza again, pizza forever."));
        let ids = response_ids(&Corpus::new(corpus), "pizza").unwrap();
        assert_eq!(
            ids,
            vec![ResponseId::from("2021711"), ResponseId::from("2021708")]
        );
    }

    #[test]
    fn ids_skip_sentences_ending_at_the_word() {
        let corpus = Corpus::new(vec![Response::from_text(1, "all I want is pizza")]);
        assert!(response_ids(&corpus, "pizza").unwrap().is_empty());
        let raw = match_sentences(&corpus, "pizza", SentenceForm::Raw).unwrap();
        assert_eq!(raw.len(), 1);
    }

    #[test]
    fn dotted_words_match_like_the_word_tree() {
        let corpus = Corpus::new(vec![
            Response::from_text(1, "Fruit, e.g. apples, is good"),
            Response::from_text(2, "Open at 9 a.m. sharp. Closed at night"),
            Response::from_text(3, "nothing to see here, e.g"),
        ]);
        for word in ["e.g", "a.m", "a.m."] {
            let tree_ids: Vec<ResponseId> = crate::tree::extract(&corpus, word)
                .unwrap()
                .into_iter()
                .map(|set| set.id)
                .collect();
            let mut filter_ids = response_ids(&corpus, word).unwrap();
            filter_ids.sort();
            assert_eq!(filter_ids, tree_ids, "word {word:?}");
        }

        let sets = match_sentences(&corpus, "e.g", SentenceForm::Raw).unwrap();
        assert_eq!(sets[0].sentences, vec![vec!["Fruit, e.g.".to_string()]]);
        let sets = match_sentences(&corpus, "a.m", SentenceForm::Postfix).unwrap();
        assert_eq!(sets[0].id, ResponseId::from(2));
        assert_eq!(sets[0].sentences, vec![vec!["."]]);
    }

    #[test]
    fn form_names() {
        assert_eq!(SentenceForm::from_name("RAW"), Some(SentenceForm::Raw));
        assert_eq!(SentenceForm::from_name("postfix"), Some(SentenceForm::Postfix));
        assert_eq!(SentenceForm::from_name("tree"), None);
    }
}
