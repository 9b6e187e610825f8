//! Punctuation-based sentence segmentation.
//!
//! Known limitation: there is no abbreviation or number awareness, so `3.14`
//! or `...` split where a reader would not.

/// Characters that end a sentence. Runs of them stay attached to the sentence.
fn is_terminal(c: char) -> bool {
    matches!(c, '。' | '．' | '.' | '！' | '!' | '？' | '?' | '\n' | '\r')
}

/// Split plain text into trimmed, non-empty sentences in source order.
pub fn split_sentences(text: &str) -> Vec<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut in_terminal_run = false;

    for c in collapsed.chars() {
        if in_terminal_run && !is_terminal(c) {
            push_trimmed(&mut sentences, &current);
            current.clear();
        }
        in_terminal_run = is_terminal(c);
        current.push(c);
    }
    push_trimmed(&mut sentences, &current);

    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn splits_japanese_punctuation() {
        assert_eq!(
            split_sentences("これはテストです。これは別の文です！短い。"),
            vec!["これはテストです。", "これは別の文です！", "短い。"]
        );
    }

    #[test]
    fn empty_and_blank_input_yield_nothing() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences(" \n\t ").is_empty());
    }

    #[test]
    fn punctuation_runs_stay_with_their_sentence() {
        assert_eq!(
            split_sentences("本当に？！ はい。。そうです"),
            vec!["本当に？！", "はい。。", "そうです"]
        );
    }

    #[test]
    fn whitespace_is_collapsed_before_splitting() {
        assert_eq!(
            split_sentences("Hello   world.\n\nSecond\tline here!"),
            vec!["Hello world.", "Second line here!"]
        );
    }

    #[test]
    fn decimals_over_split() {
        assert_eq!(split_sentences("Pi is 3.14 roughly."), vec!["Pi is 3.", "14 roughly."]);
    }

    proptest! {
        #[test]
        fn no_sentence_is_blank(text in any::<String>()) {
            for s in split_sentences(&text) {
                prop_assert!(!s.trim().is_empty());
                prop_assert_eq!(s.trim(), s.as_str());
            }
        }

        #[test]
        fn sentences_appear_in_source_order(text in "[a-zあい。．.!？ \n]{0,80}") {
            let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
            let mut cursor = 0usize;
            for s in split_sentences(&text) {
                let found = collapsed[cursor..].find(s.as_str());
                prop_assert!(found.is_some(), "{:?} not found after {}", s, cursor);
                cursor += found.unwrap() + s.len();
            }
        }
    }
}
