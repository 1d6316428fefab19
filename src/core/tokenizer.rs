use jieba_rs::Jieba;
use std::collections::{HashMap, HashSet};
use unicode_segmentation::UnicodeSegmentation;

use super::lexicon::Lexicon;

/// Tokens shorter than this (in characters) are dropped
const MIN_TOKEN_CHARS: usize = 2;

/// Script-aware tokenizer.
///
/// Han runs are segmented with a dictionary (jieba); everything else is
/// split on Unicode word boundaries.
pub struct Tokenizer {
    jieba: Jieba,
    stop_words: HashSet<String>,
}

impl Tokenizer {
    pub fn new(stop_words: HashSet<String>) -> Self {
        Self {
            jieba: Jieba::new(),
            stop_words,
        }
    }

    pub fn from_lexicon(lexicon: &Lexicon) -> Self {
        Self::new(lexicon.stop_words().clone())
    }

    /// Segment `text` into kept tokens, in order of appearance
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        for (is_han, run) in script_runs(text) {
            if is_han {
                tokens.extend(self.jieba.cut(run, true).into_iter().map(str::to_string));
            } else {
                tokens.extend(run.unicode_words().map(str::to_lowercase));
            }
        }
        tokens.retain(|t| self.keep(t));
        tokens
    }

    fn keep(&self, token: &str) -> bool {
        token.chars().count() >= MIN_TOKEN_CHARS
            && token.chars().any(char::is_alphanumeric)
            && !self.stop_words.contains(token)
    }

    /// Count kept tokens across the whole corpus
    pub fn word_frequencies<I, S>(&self, corpus: I) -> HashMap<String, usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let all_text = corpus
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(" ");

        let mut freqs = HashMap::new();
        for token in self.tokenize(&all_text) {
            *freqs.entry(token).or_insert(0) += 1;
        }
        freqs
    }
}

/// Highest counts first; ties broken alphabetically so output is stable
pub fn top_words(freqs: &HashMap<String, usize>, n: usize) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = freqs.iter().map(|(w, c)| (w.clone(), *c)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(n);
    ranked
}

fn is_han(c: char) -> bool {
    matches!(c as u32,
        0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xF900..=0xFAFF
        | 0x20000..=0x2A6DF
        | 0x2A700..=0x2EBEF)
}

/// Split text into maximal runs of Han / non-Han characters
fn script_runs(text: &str) -> Vec<(bool, &str)> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;

    for (idx, c) in text.char_indices() {
        let han = is_han(c);
        match current {
            Some(kind) if kind != han => {
                runs.push((kind, &text[start..idx]));
                start = idx;
                current = Some(han);
            }
            None => current = Some(han),
            _ => {}
        }
    }
    if let Some(kind) = current {
        runs.push((kind, &text[start..]));
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer_with(stop: &[&str]) -> Tokenizer {
        Tokenizer::new(stop.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_script_runs() {
        let runs = script_runs("hi你好 there");
        assert_eq!(runs, vec![(false, "hi"), (true, "你好"), (false, " there")]);
        assert!(script_runs("").is_empty());
    }

    #[test]
    fn test_stop_words_excluded() {
        let tokenizer = tokenizer_with(&["the"]);
        let freqs = tokenizer.word_frequencies(["the cat the dog"]);
        assert!(!freqs.contains_key("the"));
        assert_eq!(freqs.get("cat"), Some(&1));
        assert_eq!(freqs.get("dog"), Some(&1));
    }

    #[test]
    fn test_single_characters_excluded() {
        let tokenizer = tokenizer_with(&[]);
        let freqs = tokenizer.word_frequencies(["a b cc", "I am"]);
        assert!(!freqs.contains_key("a"));
        assert!(!freqs.contains_key("i"));
        assert_eq!(freqs.get("cc"), Some(&1));
        assert_eq!(freqs.get("am"), Some(&1));
    }

    #[test]
    fn test_case_folded() {
        let tokenizer = tokenizer_with(&[]);
        let freqs = tokenizer.word_frequencies(["School school SCHOOL"]);
        assert_eq!(freqs.get("school"), Some(&3));
    }

    #[test]
    fn test_chinese_segmentation() {
        let tokenizer = Tokenizer::from_lexicon(&Lexicon::builtin().unwrap());
        let freqs = tokenizer.word_frequencies(["学校的校服需要改进", "我觉得学校很好"]);
        assert_eq!(freqs.get("学校"), Some(&2));
        assert!(!freqs.contains_key("的"));
        assert!(freqs.keys().all(|w| w.chars().count() > 1));
    }

    #[test]
    fn test_empty_corpus() {
        let tokenizer = tokenizer_with(&[]);
        assert!(tokenizer.word_frequencies(Vec::<String>::new()).is_empty());
        assert!(tokenizer.word_frequencies(["", "  ！？"]).is_empty());
    }

    #[test]
    fn test_top_words_ordering() {
        let mut freqs = HashMap::new();
        freqs.insert("beta".to_string(), 3);
        freqs.insert("alpha".to_string(), 3);
        freqs.insert("gamma".to_string(), 5);
        freqs.insert("delta".to_string(), 1);

        let top = top_words(&freqs, 3);
        assert_eq!(
            top,
            vec![
                ("gamma".to_string(), 5),
                ("alpha".to_string(), 3),
                ("beta".to_string(), 3),
            ]
        );
    }
}
