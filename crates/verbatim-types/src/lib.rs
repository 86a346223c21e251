//! Shared types for survey verbatim analysis.
//!
//! A corpus is a sequence of [`Response`] records, each keyed by a
//! [`ResponseId`] and carrying raw text, pre-segmented sentences, or both.
//! The analysis results are [`WeightedWord`] (word cloud), [`PostfixSet`]
//! (word tree) and [`SentenceSet`] (filter matches). Field names on the wire
//! keep the casing survey clients already send and expect (`ResponseID`,
//! `Text`, `Sentences`, `Weight`).
//!
//! ```rust
//! use verbatim_types::{IdKind, Phrase, ResponseId, Token};
//!
//! let id = IdKind::Numeric.coerce(ResponseId::Text("42".into()));
//! assert_eq!(id, ResponseId::Number(42));
//!
//! let phrase: Phrase = [Token::Word("is".into()), Token::Word("happy".into()), Token::Separator('.')]
//!     .into_iter()
//!     .collect();
//! assert_eq!(phrase.text(), " is happy.");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier attached to a survey response.
///
/// Clients disagree on whether identifiers are integers or strings, so both
/// are accepted. Integers outside the `i64` range are kept as their decimal
/// text. Integers order before strings; within a kind the natural numeric or
/// lexicographic order applies.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize)]
#[serde(untagged)]
pub enum ResponseId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ResponseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseId::Number(n) => write!(f, "{n}"),
            ResponseId::Text(s) => f.write_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for ResponseId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl serde::de::Visitor<'_> for IdVisitor {
            type Value = ResponseId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer or string response id")
            }

            fn visit_i64<E: serde::de::Error>(self, value: i64) -> Result<ResponseId, E> {
                Ok(ResponseId::Number(value))
            }

            fn visit_u64<E: serde::de::Error>(self, value: u64) -> Result<ResponseId, E> {
                Ok(match i64::try_from(value) {
                    Ok(n) => ResponseId::Number(n),
                    Err(_) => ResponseId::Text(value.to_string()),
                })
            }

            fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<ResponseId, E> {
                Ok(ResponseId::Text(value.to_string()))
            }

            fn visit_string<E: serde::de::Error>(self, value: String) -> Result<ResponseId, E> {
                Ok(ResponseId::Text(value))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

impl From<i64> for ResponseId {
    fn from(value: i64) -> Self {
        ResponseId::Number(value)
    }
}

impl From<i32> for ResponseId {
    fn from(value: i32) -> Self {
        ResponseId::Number(value.into())
    }
}

impl From<&str> for ResponseId {
    fn from(value: &str) -> Self {
        ResponseId::Text(value.to_string())
    }
}

/// How decoded identifiers are normalised before analysis.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum IdKind {
    /// Keep identifiers exactly as decoded.
    #[default]
    Preserve,
    /// Strings holding a base-10 integer become numbers.
    Numeric,
    /// Numbers become their decimal string.
    Text,
}

impl IdKind {
    /// Parse a configuration name (`preserve`, `numeric`, `text`).
    pub fn from_name(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "preserve" | "auto" => Some(IdKind::Preserve),
            "numeric" | "number" | "integer" => Some(IdKind::Numeric),
            "text" | "string" => Some(IdKind::Text),
            _ => None,
        }
    }

    pub fn coerce(self, id: ResponseId) -> ResponseId {
        match (self, id) {
            (IdKind::Numeric, ResponseId::Text(s)) => match s.trim().parse::<i64>() {
                Ok(n) => ResponseId::Number(n),
                Err(_) => ResponseId::Text(s),
            },
            (IdKind::Text, ResponseId::Number(n)) => ResponseId::Text(n.to_string()),
            (_, id) => id,
        }
    }
}

/// One survey response as seen by the analysis engine.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Response {
    pub id: ResponseId,
    pub text: Option<String>,
    pub sentences: Vec<Vec<String>>,
}

impl Response {
    pub fn from_text(id: impl Into<ResponseId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: Some(text.into()),
            sentences: Vec::new(),
        }
    }

    pub fn from_sentences(id: impl Into<ResponseId>, sentences: Vec<Vec<String>>) -> Self {
        Self {
            id: id.into(),
            text: None,
            sentences,
        }
    }

    /// Text units in source order: every pre-segmented sentence, then the raw
    /// text when present.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.sentences
            .iter()
            .flatten()
            .map(String::as_str)
            .chain(self.text.as_deref())
    }
}

/// A word or separator produced by postfix tokenization.
///
/// The display form of a word carries one leading space so that the display
/// forms of a phrase concatenate into readable text; separators are bare.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Token {
    Word(String),
    Separator(char),
}

impl Token {
    pub fn is_separator(&self) -> bool {
        matches!(self, Token::Separator(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(word) => write!(f, " {word}"),
            Token::Separator(c) => write!(f, "{c}"),
        }
    }
}

impl Serialize for Token {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Ordered tokens following one anchor or filter-word occurrence.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Phrase(Vec<Token>);

impl Phrase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) {
        self.0.push(token);
    }

    pub fn tokens(&self) -> &[Token] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Display strings of each token, as emitted on the wire.
    pub fn display_tokens(&self) -> Vec<String> {
        self.0.iter().map(Token::to_string).collect()
    }

    /// All tokens concatenated into readable text.
    pub fn text(&self) -> String {
        self.0.iter().map(Token::to_string).collect()
    }
}

impl FromIterator<Token> for Phrase {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Word-cloud entry.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct WeightedWord {
    #[serde(rename = "Text")]
    pub text: String,
    #[serde(rename = "Weight")]
    pub weight: usize,
}

/// Word-tree branches collected for one response.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PostfixSet {
    #[serde(rename = "ResponseID")]
    pub id: ResponseId,
    #[serde(rename = "Sentences")]
    pub phrases: Vec<Phrase>,
}

/// Filter-matcher output for one response: raw sentences or postfix tokens.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SentenceSet {
    #[serde(rename = "ResponseID")]
    pub id: ResponseId,
    #[serde(rename = "Sentences")]
    pub sentences: Vec<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_order_numbers_before_text() {
        let mut ids = vec![
            ResponseId::from("b"),
            ResponseId::from(10),
            ResponseId::from("a"),
            ResponseId::from(2),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                ResponseId::from(2),
                ResponseId::from(10),
                ResponseId::from("a"),
                ResponseId::from("b"),
            ]
        );
    }

    #[test]
    fn id_kind_coercion() {
        assert_eq!(
            IdKind::Numeric.coerce(ResponseId::from("2021707")),
            ResponseId::Number(2021707)
        );
        assert_eq!(
            IdKind::Numeric.coerce(ResponseId::from("r-7")),
            ResponseId::from("r-7")
        );
        assert_eq!(
            IdKind::Text.coerce(ResponseId::from(7)),
            ResponseId::from("7")
        );
        assert_eq!(IdKind::from_name("NUMERIC"), Some(IdKind::Numeric));
        assert_eq!(IdKind::from_name("uuid"), None);
    }

    #[test]
    fn ids_deserialize_untagged() {
        let ids: Vec<ResponseId> = serde_json::from_str(r#"[1, "2"]"#).unwrap();
        assert_eq!(ids, vec![ResponseId::from(1), ResponseId::from("2")]);
    }

    #[test]
    fn ids_beyond_i64_stay_text() {
        let ids: Vec<ResponseId> =
            serde_json::from_str("[18446744073709551615, 9223372036854775807]").unwrap();
        assert_eq!(
            ids,
            vec![
                ResponseId::from("18446744073709551615"),
                ResponseId::Number(i64::MAX),
            ]
        );
        assert_eq!(
            serde_json::to_string(&ids).unwrap(),
            r#"["18446744073709551615",9223372036854775807]"#
        );
        assert!(serde_json::from_str::<ResponseId>("1.5").is_err());
    }

    #[test]
    fn tokens_serialize_with_display_spacing() {
        let phrase: Phrase = [
            Token::Word("is".into()),
            Token::Separator('-'),
            Token::Word("happy".into()),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_string(&phrase).unwrap();
        assert_eq!(json, r#"[" is","-"," happy"]"#);
    }

    #[test]
    fn segments_list_sentences_before_text() {
        let mut response = Response::from_sentences(
            1,
            vec![vec!["one".into()], vec!["two".into(), "three".into()]],
        );
        response.text = Some("four".into());
        let segments: Vec<&str> = response.segments().collect();
        assert_eq!(segments, vec!["one", "two", "three", "four"]);
    }
}
