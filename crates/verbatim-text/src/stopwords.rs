//! Stop-word sets for word-cloud tallying.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use tracing::info;

/// Separator between entries of a stop-word string.
///
/// Older survey clients join their lists with `*`, newer ones with spaces.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Delimiter {
    #[default]
    Whitespace,
    Char(char),
}

impl Delimiter {
    /// Parse a configured delimiter: empty, `whitespace` or `space` select
    /// [`Delimiter::Whitespace`]; any single character selects that character.
    pub fn from_config(raw: &str) -> Option<Self> {
        match raw {
            "" | "whitespace" | "space" => Some(Delimiter::Whitespace),
            _ => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_whitespace() => Some(Delimiter::Whitespace),
                    (Some(c), None) => Some(Delimiter::Char(c)),
                    _ => None,
                }
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StopWordsError {
    #[error("failed to read stop-word list: {0}")]
    Io(#[from] std::io::Error),
}

/// Lowercased words excluded from frequency tallying.
#[derive(Clone, Debug, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Split `list` on `delimiter`; entries are trimmed and lowercased, empty
    /// entries are ignored.
    pub fn parse(list: &str, delimiter: Delimiter) -> Self {
        let mut words = Self::empty();
        match delimiter {
            Delimiter::Whitespace => list.split_whitespace().for_each(|w| words.insert(w)),
            Delimiter::Char(c) => list.split(c).for_each(|w| words.insert(w)),
        }
        words
    }

    pub fn from_list(list: &[&str]) -> Self {
        let mut words = Self::empty();
        for word in list {
            words.insert(word);
        }
        words
    }

    /// General-purpose English list: months, weekdays, single letters,
    /// contractions, function words and a few symbols.
    pub fn english() -> Self {
        Self::from_list(ENGLISH)
    }

    /// Read a stop-word file: whitespace-separated entries, `#` starts a
    /// comment line.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, StopWordsError> {
        let path_ref = path.as_ref();
        let reader = BufReader::new(File::open(path_ref)?);
        let mut words = Self::empty();
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            line.split_whitespace().for_each(|w| words.insert(w));
        }
        info!(
            "loaded {} stop words from {}",
            words.len(),
            path_ref.display()
        );
        Ok(words)
    }

    pub fn insert(&mut self, word: &str) {
        let word = word.trim();
        if !word.is_empty() {
            self.words.insert(word.to_lowercase());
        }
    }

    pub fn extend(&mut self, other: &StopWords) {
        self.words.extend(other.words.iter().cloned());
    }

    pub fn contains(&self, word: &str) -> bool {
        if word.chars().any(char::is_uppercase) {
            self.words.contains(&word.to_lowercase())
        } else {
            self.words.contains(word)
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

const ENGLISH: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december", "monday", "tuesday", "wednesday", "thursday", "friday",
    "saturday", "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p",
    "q", "r", "s", "t", "u", "v", "w", "x", "y", "z", "-", "_", "--", "''", "we've", "we'll",
    "we're", "who'll", "who've", "who's", "you'll", "you've", "you're", "i'll", "i've", "i'm",
    "i'd", "he'll", "he'd", "he's", "she'll", "she'd", "she's", "it'll", "it'd", "it's",
    "they've", "they're", "they'll", "didn't", "don't", "can't", "won't", "isn't", "wasn't",
    "couldn't", "wouldn't", "ve", "ll", "re", "th", "rd", "st", "doing", "allow",
    "examining", "using", "during", "within", "across", "among", "whether", "especially",
    "without", "actually", "another", "am", "because", "cannot", "the", "of", "to", "and", "in",
    "is", "it", "you", "that", "he", "was", "for", "on", "are", "with", "as", "his", "they",
    "be", "at", "one", "have", "this", "from", "or", "had", "by", "hot", "word", "but", "what",
    "some", "we", "yet", "can", "out", "other", "were", "all", "there", "when", "up", "use",
    "your", "how", "said", "an", "each", "she", "which", "do", "their", "time", "if", "will",
    "shall", "way", "about", "many", "then", "write", "would", "like", "so", "these",
    "her", "long", "make", "thing", "see", "him", "two", "has", "look", "more", "day", "could",
    "go", "come", "did", "no", "most", "my", "over", "know", "than", "call", "first", "who",
    "down", "side", "been", "now", "find", "any", "new", "part", "take", "get", "place", "made",
    "where", "after", "back", "little", "only", "came", "show", "every", "good", "me", "our",
    "under", "upon", "very", "through", "just", "great", "say", "low", "cause", "much", "mean",
    "before", "move", "right", "too", "same", "tell", "does", "set", "three", "want", "well",
    "also", "small", "end", "put", "hand", "large", "add", "here", "must", "big", "high",
    "such", "why", "ask", "men", "went", "kind", "need", "try", "us", "again", "near", "should",
    "still", "between", "never", "last", "let", "though", "might", "saw", "left", "late", "run",
    "while", "close", "few", "seem", "next", "got", "always", "those", "both", "often", "thus",
    "not", "into", "inside", "its", "makes", "tenth", "trying", "myself", "ours", "ourselves",
    "yours", "yourself", "yourselves", "himself", "hers", "herself", "itself", "them", "theirs",
    "themselves", "whom", "being", "having", "ought", "you'd", "we'd", "they'd", "aren't",
    "weren't", "hasn't", "haven't", "hadn't", "doesn't", "shan't", "shouldn't", "mustn't",
    "let's", "that's", "what's", "here's", "there's", "when's", "where's", "why's", "how's",
    "daren't", "needn't", "oughtn't", "mightn't", "until", "against", "above", "below", "off",
    "further", "once", "nor", "own", "least", "less", "ever", "says", "goes", "seen", "even",
    "since", "however", "four", "five", "second", "old", ":", ";", "%", ",", "&",
];
