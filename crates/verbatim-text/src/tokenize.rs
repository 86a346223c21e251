//! Word, sentence and postfix tokenization.
//!
//! Three boundary rules are in play:
//! - word-cloud words are split on runs of `. ! ? , ( )` and whitespace,
//!   after lowercasing;
//! - sentences end at `.`, `!` or `?`, and each sentence keeps its
//!   terminator;
//! - postfix phrases are split on single characters of
//!   `whitespace . , ; : -`, each non-whitespace separator becoming a token
//!   of its own.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use verbatim_types::{Phrase, Token};

static CLOUD_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?,()\s]+").expect("cloud boundary class compiles"));

static POSTFIX_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s.,;:\-]").expect("postfix boundary class compiles"));

pub fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Lowercased word-cloud tokens; empty tokens are dropped.
pub fn normalize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    CLOUD_BOUNDARY
        .split(&lowered)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Cut `text` after every terminator. Fragments are trimmed, blank ones
/// dropped; a trailing fragment without a terminator is kept.
pub fn split_sentences(text: &str) -> Vec<&str> {
    split_sentences_keeping(text, &[])
}

/// Like [`split_sentences`], but a terminator inside any of the `keep` byte
/// ranges never ends a sentence.
pub fn split_sentences_keeping<'a>(text: &'a str, keep: &[Range<usize>]) -> Vec<&'a str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for (idx, c) in text.char_indices() {
        if is_terminator(c) && !keep.iter().any(|range| range.contains(&idx)) {
            let end = idx + c.len_utf8();
            push_fragment(&mut sentences, &text[start..end]);
            start = end;
        }
    }
    push_fragment(&mut sentences, &text[start..]);
    sentences
}

fn push_fragment<'a>(sentences: &mut Vec<&'a str>, fragment: &'a str) {
    let fragment = fragment.trim();
    if !fragment.is_empty() {
        sentences.push(fragment);
    }
}

/// Split `text` on every match of `boundary`. Each matched character that is
/// not whitespace becomes a [`Token::Separator`]; the text between matches
/// becomes a [`Token::Word`] unless it is blank.
pub fn split_on_boundary(text: &str, boundary: &Regex) -> Vec<Token> {
    split_on_boundary_limited(text, boundary, usize::MAX)
}

/// The first `max_tokens` tokens of [`split_on_boundary`]; scanning stops
/// once they are known.
pub fn split_on_boundary_limited(text: &str, boundary: &Regex, max_tokens: usize) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for found in boundary.find_iter(text) {
        if tokens.len() >= max_tokens {
            tokens.truncate(max_tokens);
            return tokens;
        }
        push_word(&mut tokens, &text[last..found.start()]);
        tokens.extend(
            found
                .as_str()
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(Token::Separator),
        );
        last = found.end();
    }
    push_word(&mut tokens, &text[last..]);
    tokens.truncate(max_tokens);
    tokens
}

fn push_word(tokens: &mut Vec<Token>, word: &str) {
    if !word.trim().is_empty() {
        tokens.push(Token::Word(word.to_string()));
    }
}

/// Tokenize a clause remainder for display. Callers must not emit the
/// result when it is empty.
pub fn postfix_tokens(fragment: &str) -> Phrase {
    postfix_tokens_limited(fragment, usize::MAX)
}

pub fn postfix_tokens_limited(fragment: &str, max_tokens: usize) -> Phrase {
    split_on_boundary_limited(fragment, &POSTFIX_BOUNDARY, max_tokens)
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_for_the_cloud() {
        assert_eq!(
            normalize("The cat (a Tabby) sat,  on the MAT!?"),
            vec!["the", "cat", "a", "tabby", "sat", "on", "the", "mat"]
        );
        assert!(normalize(" .,!? ()").is_empty());
    }

    #[test]
    fn splits_sentences_keeping_terminators() {
        assert_eq!(
            split_sentences("I love my dog. My dog is happy! Is yours?"),
            vec!["I love my dog.", "My dog is happy!", "Is yours?"]
        );
        assert_eq!(
            split_sentences("no terminator here"),
            vec!["no terminator here"]
        );
        assert_eq!(split_sentences("Wow!! ok"), vec!["Wow!", "!", "ok"]);
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn kept_ranges_are_never_cut() {
        let text = "Fruit, e.g. apples. Done";
        assert_eq!(
            split_sentences_keeping(text, &[7..10]),
            vec!["Fruit, e.g.", "apples.", "Done"]
        );
        assert_eq!(
            split_sentences_keeping(text, &[7..11]),
            vec!["Fruit, e.g. apples.", "Done"]
        );
    }

    #[test]
    fn postfix_tokens_prefix_words_and_isolate_separators() {
        let phrase = postfix_tokens(" is happy.");
        assert_eq!(phrase.display_tokens(), vec![" is", " happy", "."]);
        assert_eq!(phrase.text(), " is happy.");

        let phrase = postfix_tokens(" me, tender; really:coca-cola");
        assert_eq!(
            phrase.display_tokens(),
            vec![" me", ",", " tender", ";", " really", ":", " coca", "-", " cola"]
        );
    }

    #[test]
    fn postfix_keeps_terminators_other_than_period_on_words() {
        let phrase = postfix_tokens(" would help me more !");
        assert_eq!(
            phrase.display_tokens(),
            vec![" would", " help", " me", " more", " !"]
        );
    }

    #[test]
    fn whitespace_only_fragments_yield_nothing() {
        assert!(postfix_tokens("").is_empty());
        assert!(postfix_tokens(" \t\n ").is_empty());
        assert_eq!(postfix_tokens(" . ").display_tokens(), vec!["."]);
    }

    #[test]
    fn limited_tokenization_is_a_prefix() {
        let full = postfix_tokens(" me, tender; really:coca-cola");
        for max in [0, 1, 2, 5, 9, 100] {
            let limited = postfix_tokens_limited(" me, tender; really:coca-cola", max);
            assert_eq!(limited.tokens(), &full.tokens()[..max.min(full.len())]);
        }
    }

    #[test]
    fn split_on_custom_boundary() {
        let boundary = Regex::new(r"\|+").unwrap();
        let tokens = split_on_boundary("a||b|", &boundary);
        assert_eq!(
            tokens,
            vec![
                Token::Word("a".into()),
                Token::Separator('|'),
                Token::Separator('|'),
                Token::Word("b".into()),
                Token::Separator('|'),
            ]
        );
    }
}
