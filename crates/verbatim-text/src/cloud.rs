//! Word-frequency summary ("word cloud").

use std::collections::HashMap;

use tracing::debug;
use verbatim_types::WeightedWord;

use crate::corpus::Corpus;
use crate::stopwords::StopWords;
use crate::tokenize::normalize;

pub const MAX_CLOUD_WORDS: usize = 50;

/// Top [`MAX_CLOUD_WORDS`] words of the corpus.
pub fn build(corpus: &Corpus, stop_words: &StopWords) -> Vec<WeightedWord> {
    build_with_limit(corpus, stop_words, MAX_CLOUD_WORDS)
}

/// Count every non-stop word, then order by descending weight with ties
/// broken by ascending text. `limit` is clamped to [`MAX_CLOUD_WORDS`].
pub fn build_with_limit(corpus: &Corpus, stop_words: &StopWords, limit: usize) -> Vec<WeightedWord> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for segment in corpus.texts() {
        for word in normalize(segment) {
            if !stop_words.contains(&word) {
                *counts.entry(word).or_default() += 1;
            }
        }
    }

    let vocabulary = counts.len();
    let mut cloud: Vec<WeightedWord> = counts
        .into_iter()
        .map(|(text, weight)| WeightedWord { text, weight })
        .collect();
    cloud.sort_unstable_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.text.cmp(&b.text)));
    cloud.truncate(limit.min(MAX_CLOUD_WORDS));

    debug!(
        "word cloud kept {} of {vocabulary} distinct words",
        cloud.len()
    );
    cloud
}

/// The top-weighted word, the usual root for a word tree.
pub fn heaviest_word(corpus: &Corpus, stop_words: &StopWords) -> Option<String> {
    build_with_limit(corpus, stop_words, 1)
        .into_iter()
        .next()
        .map(|word| word.text)
}
