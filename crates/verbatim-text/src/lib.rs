//! Text analysis for survey verbatims: word clouds, word trees and filter
//! matching over a corpus of short free-text responses.
//!
//! The engine is pure and synchronous. A request decodes a [`Corpus`] once and
//! fans out to one of three independent analyses:
//!
//! - [`cloud`]: ranked word frequencies minus [`StopWords`], at most 50 words,
//!   heaviest first with ties in text order.
//! - [`tree`]: for an anchor word, the clause continuation after every
//!   whole-word, case-insensitive occurrence, grouped per response id in
//!   ascending id order.
//! - [`filter`]: sentences containing a filter word, raw or rewritten into
//!   postfix form, or just the ids of responses that continue past it.
//!
//! [`ops`] wraps each analysis as a JSON-string-in, JSON-string-out call.
//! Compiled word patterns are shared process-wide (see [`pattern`]), so
//! concurrent callers can analyze independent corpora on separate threads.
//!
//! # Example
//! ```rust
//! let corpus = r#"[{"ResponseID":1,"Text":"I love my dog. My dog is happy."}]"#;
//! let tree = verbatim_text::ops::extract_word_tree(corpus, "dog").unwrap();
//! assert_eq!(tree, r#"[{"ResponseID":1,"Sentences":[["."],[" is"," happy","."]]}]"#);
//! ```
//!
//! For a runnable demo, see `cargo run -p verbatim-text --example analyze -- <corpus.json> cloud`.

pub mod cloud;
pub mod corpus;
pub mod filter;
pub mod ops;
pub mod pattern;
pub mod stopwords;
pub mod tokenize;
pub mod tree;

pub use corpus::{Corpus, CorpusOptions, DecodeError};
pub use filter::SentenceForm;
pub use ops::{Analyzer, Error};
pub use pattern::{PatternError, WordMatcher};
pub use stopwords::{Delimiter, StopWords, StopWordsError};
pub use verbatim_types::{
    IdKind, Phrase, PostfixSet, Response, ResponseId, SentenceSet, Token, WeightedWord,
};
