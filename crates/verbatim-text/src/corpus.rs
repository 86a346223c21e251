//! Corpus decoding.
//!
//! Two wire shapes are accepted: a single JSON array of records, or records
//! encoded one after another in the same string (the streaming form older
//! clients emit). Each record carries a `ResponseID` plus `Text`,
//! `Sentences`, or both.

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use verbatim_types::{IdKind, Response, ResponseId};

#[derive(Clone, Copy, Debug, Default)]
pub struct CorpusOptions {
    pub id_kind: IdKind,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid corpus JSON at line {line}, column {column}: {source}")]
    Json {
        line: usize,
        column: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("record {index} has neither Text nor Sentences")]
    MissingContent { index: usize },
}

impl From<serde_json::Error> for DecodeError {
    fn from(source: serde_json::Error) -> Self {
        DecodeError::Json {
            line: source.line(),
            column: source.column(),
            source,
        }
    }
}

#[derive(Deserialize)]
struct Record {
    #[serde(rename = "ResponseID", alias = "ResponseId", alias = "response_id")]
    id: ResponseId,
    #[serde(rename = "Text", alias = "text", default)]
    text: Option<String>,
    #[serde(rename = "Sentences", alias = "sentences", default)]
    sentences: Option<Vec<Vec<String>>>,
}

/// Immutable, ordered set of responses for one analysis request.
#[derive(Clone, Debug, Default)]
pub struct Corpus {
    responses: Vec<Response>,
}

impl Corpus {
    pub fn new(responses: Vec<Response>) -> Self {
        Self { responses }
    }

    /// Decode either wire shape. Blank input is an empty corpus; anything
    /// malformed is an error rather than a partial corpus.
    pub fn decode(input: &str, options: &CorpusOptions) -> Result<Self, DecodeError> {
        let records: Vec<Record> = if input.trim_start().starts_with('[') {
            serde_json::from_str(input)?
        } else {
            serde_json::Deserializer::from_str(input)
                .into_iter::<Record>()
                .collect::<Result<_, _>>()?
        };

        let mut responses = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            if record.text.is_none() && record.sentences.is_none() {
                return Err(DecodeError::MissingContent { index });
            }
            responses.push(Response {
                id: options.id_kind.coerce(record.id),
                text: record.text,
                sentences: record.sentences.unwrap_or_default(),
            });
        }

        debug!("decoded corpus with {} responses", responses.len());
        Ok(Self { responses })
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Every text segment of every response, in corpus order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.responses.iter().flat_map(Response::segments)
    }
}

impl FromIterator<Response> for Corpus {
    fn from_iter<I: IntoIterator<Item = Response>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
