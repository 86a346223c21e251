use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use verbatim_text::{Corpus, CorpusOptions, SentenceForm, StopWords, cloud, filter, tree};

const USAGE: &str = "usage: cargo run -p verbatim-text --example analyze -- <corpus.json> \
                     [cloud | tree [<anchor>] | filter <word> [raw] | ids <word>]";

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let path = args.next().map(PathBuf::from).context(USAGE)?;
    let command = args.next().unwrap_or_else(|| "cloud".to_string());
    let word = args.next();
    let extra = args.next();

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading corpus from {}", path.display()))?;
    let corpus = Corpus::decode(&raw, &CorpusOptions::default())
        .with_context(|| format!("decoding corpus from {}", path.display()))?;
    let stop_words = StopWords::english();

    println!("Corpus: {} ({} responses)", path.display(), corpus.len());

    match command.as_str() {
        "cloud" => {
            for entry in cloud::build(&corpus, &stop_words) {
                println!("  {:>4}  {}", entry.weight, entry.text);
            }
        }
        "tree" => {
            let Some(anchor) = word.or_else(|| cloud::heaviest_word(&corpus, &stop_words)) else {
                println!("  (empty corpus)");
                return Ok(());
            };
            println!("Anchor: {anchor}");
            for set in tree::extract(&corpus, &anchor)? {
                for phrase in &set.phrases {
                    println!("  {:<10} {anchor}{}", set.id.to_string(), phrase.text());
                }
            }
        }
        "filter" => {
            let word = word.context(USAGE)?;
            let form = match extra.as_deref() {
                Some(name) => SentenceForm::from_name(name).context(USAGE)?,
                None => SentenceForm::Postfix,
            };
            for set in filter::match_sentences(&corpus, &word, form)? {
                for sentence in &set.sentences {
                    println!("  {:<10} {}", set.id.to_string(), sentence.concat());
                }
            }
        }
        "ids" => {
            let word = word.context(USAGE)?;
            for id in filter::response_ids(&corpus, &word)? {
                println!("  {id}");
            }
        }
        other => bail!("unknown command {other:?}\n{USAGE}"),
    }

    Ok(())
}
