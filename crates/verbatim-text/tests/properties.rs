use std::collections::BTreeSet;
use std::path::PathBuf;

use serde_json::Value;
use verbatim_text::ops;
use verbatim_text::{Corpus, CorpusOptions, Delimiter, Phrase, StopWords, WordMatcher, cloud, tree};

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).expect("read fixture")
}

fn fixtures() -> Vec<String> {
    vec![fixture("survey_array.json"), fixture("survey_stream.json")]
}

fn ids(json: &str, pick: impl Fn(&Value) -> Value) -> Vec<Value> {
    serde_json::from_str::<Vec<Value>>(json)
        .unwrap()
        .iter()
        .map(pick)
        .collect()
}

#[test]
fn cloud_is_bounded_and_descending() {
    for corpus in fixtures() {
        let cloud: Vec<Value> =
            serde_json::from_str(&ops::build_word_cloud(&corpus, "").unwrap()).unwrap();
        assert!(cloud.len() <= 50);
        for pair in cloud.windows(2) {
            assert!(pair[0]["Weight"].as_u64() >= pair[1]["Weight"].as_u64());
        }
    }
}

#[test]
fn stop_words_never_appear_in_the_cloud() {
    let stop_list = "The STAFF were was i love";
    let stop_words = StopWords::parse(stop_list, Delimiter::Whitespace);
    for corpus in fixtures() {
        let cloud: Vec<Value> =
            serde_json::from_str(&ops::build_word_cloud(&corpus, stop_list).unwrap()).unwrap();
        assert!(!cloud.is_empty());
        for entry in cloud {
            assert!(!stop_words.contains(entry["Text"].as_str().unwrap()));
        }
    }
}

#[test]
fn cloud_is_reproducible() {
    let corpus = fixture("survey_stream.json");
    let first = ops::build_word_cloud(&corpus, "i").unwrap();
    for _ in 0..10 {
        assert_eq!(ops::build_word_cloud(&corpus, "i").unwrap(), first);
    }
}

#[test]
fn tree_ids_ascend_without_duplicates() {
    for corpus in fixtures() {
        for anchor in ["staff", "love", "pizza", "clean"] {
            let json = ops::extract_word_tree(&corpus, anchor).unwrap();
            let decoded = Corpus::decode(&corpus, &CorpusOptions::default()).unwrap();
            let sets = tree::extract(&decoded, anchor).unwrap();
            assert_eq!(sets.len(), ids(&json, |e| e["ResponseID"].clone()).len());
            for pair in sets.windows(2) {
                assert!(pair[0].id < pair[1].id);
            }
            assert!(sets.iter().all(|set| !set.phrases.is_empty()));
            assert!(sets.iter().flat_map(|s| &s.phrases).all(|p| !p.is_empty()));
        }
    }
}

#[test]
fn every_phrase_follows_an_occurrence() {
    let corpus = Corpus::decode(&fixture("survey_array.json"), &CorpusOptions::default()).unwrap();
    let matcher = WordMatcher::new("staff").unwrap();
    let expected: usize = corpus
        .texts()
        .map(|text| tree::postfix_phrases(&matcher, text).len())
        .sum();
    let sets = tree::extract(&corpus, "staff").unwrap();
    let phrases: Vec<&Phrase> = sets.iter().flat_map(|s| &s.phrases).collect();
    assert_eq!(phrases.len(), expected);

    for response in corpus.responses() {
        let text = response.text.as_deref().unwrap();
        for found in matcher.find_iter(text) {
            let remainder = tree::clause_remainder(&text[found.end..]);
            let phrase = verbatim_text::tokenize::postfix_tokens(remainder);
            if !phrase.is_empty() {
                assert!(phrases.contains(&&phrase));
            }
        }
    }
}

#[test]
fn filter_ids_match_tree_ids() {
    for corpus in fixtures() {
        for word in ["staff", "love", "pizza", "great", "eat", "nightmare", "brilliant"] {
            let tree_ids: BTreeSet<String> = ids(
                &ops::extract_word_tree(&corpus, word).unwrap(),
                |e| e["ResponseID"].clone(),
            )
            .into_iter()
            .map(|v| v.to_string())
            .collect();
            let filter_ids: Vec<String> = ids(
                &ops::filter_response_ids(&corpus, word).unwrap(),
                Value::clone,
            )
            .into_iter()
            .map(|v| v.to_string())
            .collect();
            let distinct: BTreeSet<String> = filter_ids.iter().cloned().collect();
            assert_eq!(distinct.len(), filter_ids.len(), "duplicate ids for {word}");
            assert_eq!(distinct, tree_ids, "id sets differ for {word}");
        }
    }
}

#[test]
fn absent_anchor_yields_empty_array() {
    for corpus in fixtures() {
        assert_eq!(ops::extract_word_tree(&corpus, "zeppelin").unwrap(), "[]");
        assert_eq!(ops::filter_response_ids(&corpus, "zeppelin").unwrap(), "[]");
        assert_eq!(ops::filter_sentences(&corpus, "zeppelin").unwrap(), "[]");
    }
}

#[test]
fn heaviest_word_roots_a_tree() {
    let corpus = Corpus::decode(&fixture("survey_stream.json"), &CorpusOptions::default()).unwrap();
    let root = cloud::heaviest_word(&corpus, &StopWords::english()).unwrap();
    assert_eq!(root, "love");
    assert!(!tree::extract(&corpus, &root).unwrap().is_empty());
}
