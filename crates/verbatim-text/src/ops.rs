//! String-in, string-out entry points.
//!
//! Each operation decodes the corpus JSON, runs one analysis and encodes the
//! result as a JSON string. There is no partial success: any failure is
//! returned as an [`Error`] and no output is produced.

use serde::Serialize;
use thiserror::Error;
use verbatim_types::IdKind;

use crate::cloud;
use crate::corpus::{Corpus, CorpusOptions, DecodeError};
use crate::filter::{self, SentenceForm};
use crate::pattern::PatternError;
use crate::stopwords::{Delimiter, StopWords};
use crate::tree;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("failed to encode result: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Decoding and stop-word settings shared by the boundary operations.
#[derive(Clone, Copy, Debug, Default)]
pub struct Analyzer {
    pub corpus: CorpusOptions,
    pub delimiter: Delimiter,
}

impl Analyzer {
    pub fn new(id_kind: IdKind, delimiter: Delimiter) -> Self {
        Self {
            corpus: CorpusOptions { id_kind },
            delimiter,
        }
    }

    pub fn decode(&self, corpus_json: &str) -> Result<Corpus, Error> {
        Ok(Corpus::decode(corpus_json, &self.corpus)?)
    }

    /// `[{Text, Weight}]`, at most 50 entries, heaviest first.
    pub fn build_word_cloud(&self, corpus_json: &str, stop_words: &str) -> Result<String, Error> {
        let corpus = self.decode(corpus_json)?;
        let stop_words = StopWords::parse(stop_words, self.delimiter);
        to_json(&cloud::build(&corpus, &stop_words))
    }

    /// `[{ResponseID, Sentences}]` sorted by id.
    pub fn extract_word_tree(&self, corpus_json: &str, anchor: &str) -> Result<String, Error> {
        let corpus = self.decode(corpus_json)?;
        to_json(&tree::extract(&corpus, anchor)?)
    }

    pub fn filter_sentences(
        &self,
        corpus_json: &str,
        word: &str,
        form: SentenceForm,
    ) -> Result<String, Error> {
        let corpus = self.decode(corpus_json)?;
        to_json(&filter::match_sentences(&corpus, word, form)?)
    }

    /// `[ResponseID]` in order of first match.
    pub fn filter_response_ids(&self, corpus_json: &str, word: &str) -> Result<String, Error> {
        let corpus = self.decode(corpus_json)?;
        to_json(&filter::response_ids(&corpus, word)?)
    }
}

pub fn build_word_cloud(corpus_json: &str, stop_words: &str) -> Result<String, Error> {
    Analyzer::default().build_word_cloud(corpus_json, stop_words)
}

pub fn extract_word_tree(corpus_json: &str, anchor: &str) -> Result<String, Error> {
    Analyzer::default().extract_word_tree(corpus_json, anchor)
}

/// Postfix-form filter; see [`filter_sentences_with`] for the raw form.
pub fn filter_sentences(corpus_json: &str, word: &str) -> Result<String, Error> {
    filter_sentences_with(corpus_json, word, SentenceForm::Postfix)
}

pub fn filter_sentences_with(
    corpus_json: &str,
    word: &str,
    form: SentenceForm,
) -> Result<String, Error> {
    Analyzer::default().filter_sentences(corpus_json, word, form)
}

pub fn filter_response_ids(corpus_json: &str, word: &str) -> Result<String, Error> {
    Analyzer::default().filter_response_ids(corpus_json, word)
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, Error> {
    serde_json::to_string(value).map_err(Error::Serialize)
}
