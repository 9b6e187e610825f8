//! Heuristic sentence scoring and budgeted selection.
//!
//! A sentence scores one point per keyword-like run (two or more consecutive
//! letters or digits, full-width forms and kana/kanji included) and loses one
//! point per 200 characters of length, so short dense sentences win.

use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashSet;

lazy_static! {
    static ref KEYWORD: Regex =
        Regex::new(r"[\p{Alphabetic}\p{Nd}ー]{2,}").unwrap();
}

/// A sentence paired with its score, alive only during selection
#[derive(Debug, Clone)]
struct ScoredSentence<'a> {
    text: &'a str,
    chars: usize,
    score: f64,
}

/// Number of keyword-like runs in the sentence
pub fn keyword_count(sentence: &str) -> usize {
    KEYWORD.find_iter(sentence).count()
}

pub fn score_sentence(sentence: &str) -> f64 {
    keyword_count(sentence) as f64 - sentence.chars().count() as f64 / 200.0
}

/// Deduplication key: the sentence with all whitespace removed
fn signature(sentence: &str) -> String {
    sentence.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Pick the highest scoring sentences whose combined length fits `max_chars`.
///
/// The result is in descending score order, not document order. Equal scores
/// keep their document order. If nothing fits, the leading sentences are
/// concatenated into a single entry instead; an empty result means not even
/// the first sentence fits.
pub fn pick_key_sentences<S: AsRef<str>>(sentences: &[S], max_chars: usize) -> Vec<String> {
    let mut scored: Vec<ScoredSentence<'_>> = sentences
        .iter()
        .map(|s| {
            let text = s.as_ref();
            ScoredSentence {
                text,
                chars: text.chars().count(),
                score: score_sentence(text),
            }
        })
        .collect();

    // Vec::sort_by is stable
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let mut picked = Vec::new();
    let mut seen = HashSet::new();
    let mut total = 0usize;

    for candidate in &scored {
        if total >= max_chars {
            break;
        }
        if total + candidate.chars > max_chars {
            continue;
        }
        if !seen.insert(signature(candidate.text)) {
            continue;
        }
        picked.push(candidate.text.to_string());
        total += candidate.chars;
    }

    if picked.is_empty() {
        return leading_fallback(sentences, max_chars);
    }

    picked
}

/// Concatenate sentences in document order until the budget would overflow.
///
/// Only reached when no single sentence fits, so the first sentence already
/// overflows and non-empty input always yields nothing here.
fn leading_fallback<S: AsRef<str>>(sentences: &[S], max_chars: usize) -> Vec<String> {
    let mut buffer = String::new();
    let mut used = 0usize;

    for sentence in sentences {
        let sentence = sentence.as_ref();
        let extra = sentence.chars().count() + usize::from(!buffer.is_empty());
        if used + extra > max_chars {
            break;
        }
        if !buffer.is_empty() {
            buffer.push(' ');
        }
        buffer.push_str(sentence);
        used += extra;
    }

    if buffer.is_empty() {
        Vec::new()
    } else {
        vec![buffer]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splitter::split_sentences;
    use proptest::prelude::*;

    fn total_chars(picked: &[String]) -> usize {
        picked.iter().map(|s| s.chars().count()).sum()
    }

    #[test]
    fn counts_keyword_runs() {
        assert_eq!(keyword_count("これはテストです。"), 1);
        assert_eq!(keyword_count("Rust 2024 edition, ok?"), 4);
        assert_eq!(keyword_count("a b c"), 0);
    }

    #[test]
    fn counts_full_width_runs() {
        assert_eq!(keyword_count("２０２４年"), 1);
        assert_eq!(keyword_count("ＡＢＣ"), 1);
        assert_eq!(keyword_count("ｒｕｓｔ ２０２４"), 2);
    }

    #[test]
    fn japanese_scenario_respects_budget() {
        let sentences = split_sentences("これはテストです。これは別の文です！短い。");
        let picked = pick_key_sentences(&sentences, 20);

        assert!(!picked.is_empty());
        assert!(total_chars(&picked) <= 20);
        // Each sentence is one keyword run; the shortest scores highest.
        assert_eq!(picked[0], "短い。");
        assert_eq!(picked, vec!["短い。", "これはテストです。"]);
    }

    #[test]
    fn output_is_in_score_order() {
        let sentences = ["a b c d e f g.", "Rust tokio serde."];
        let picked = pick_key_sentences(&sentences, 1000);
        assert_eq!(picked[0], "Rust tokio serde.");
    }

    #[test]
    fn equal_scores_keep_document_order() {
        let picked = pick_key_sentences(&["ab。", "cd。", "ef。"], 100);
        assert_eq!(picked, vec!["ab。", "cd。", "ef。"]);
    }

    #[test]
    fn duplicates_are_selected_once() {
        let sentences = ["同じ文です。", "同じ 文です。", "違う文です。"];
        let picked = pick_key_sentences(&sentences, 100);
        assert_eq!(picked.len(), 2);
        assert!(picked.contains(&"違う文です。".to_string()));
    }

    #[test]
    fn single_short_sentence_is_returned() {
        assert_eq!(pick_key_sentences(&["一文だけ。"], 50), vec!["一文だけ。"]);
    }

    #[test]
    fn nothing_fits_yields_empty() {
        assert!(pick_key_sentences(&["とても長い文章がここにあります。"], 5).is_empty());
        assert!(pick_key_sentences::<&str>(&[], 100).is_empty());
    }

    #[test]
    fn fallback_joins_leading_sentences_within_budget() {
        assert_eq!(leading_fallback(&["ab", "cd", "efgh"], 6), vec!["ab cd"]);
        assert!(leading_fallback(&["abcdef"], 3).is_empty());
    }

    proptest! {
        #[test]
        fn selection_never_exceeds_budget(
            sentences in prop::collection::vec("[a-zあ-ん。 ]{1,40}", 0..20),
            max_chars in 1usize..300,
        ) {
            let picked = pick_key_sentences(&sentences, max_chars);
            prop_assert!(total_chars(&picked) <= max_chars);
        }

        #[test]
        fn each_signature_selected_at_most_once(
            base in prop::collection::vec("[a-z]{2,8}。", 1..6),
            repeats in 1usize..4,
        ) {
            let mut sentences = Vec::new();
            for _ in 0..repeats {
                sentences.extend(base.iter().cloned());
            }
            let picked = pick_key_sentences(&sentences, 10_000);
            let unique: HashSet<String> = picked.iter().map(|s| signature(s)).collect();
            prop_assert_eq!(unique.len(), picked.len());
        }
    }
}
