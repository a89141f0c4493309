// ============================================================
// Layer 4 — Preprocessor
// ============================================================
// Turns raw corpus fields into model-ready token lists.
//
// Question side:
//   - lower-case
//   - a trailing "?" / "." word is dropped
//   - every word is reduced to its Snowball English stem
//     ("jobs" → job, "programming" → program)
//   - word order is REVERSED, so the first words of the
//     question are the last thing the encoder reads
//     (Sutskever et al. 2014 found this eases optimisation)
//
// Logical-form side:
//   - split into identifiers and single punctuation marks with
//       \w+(?:'\w+)?|[^\w\s]
//     e.g. "answer(a,job(a))" → answer ( a , job ( a ) )
//   - wrapped as <s> … </s>
//
// Corpus questions and free-text questions take the same path,
// so a stem seen in training is the stem looked up at inference.
//
// Reference: Rust Book §8 (Strings), regex crate docs

use once_cell::sync::Lazy;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

use crate::domain::job_query::{JobQuery, EOS_TOKEN, SOS_TOKEN};

static QUERY_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+(?:'\w+)?|[^\w\s]").unwrap());

static STEMMER: Lazy<Stemmer> = Lazy::new(|| Stemmer::create(Algorithm::English));

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Build a labelled example from corpus fields.
    pub fn prepare(&self, words: &[String], logical_form: &str) -> JobQuery {
        JobQuery::new(self.encoder_order(words), self.tokenize_query(logical_form))
    }

    /// Split a logical form into tokens and add the markers.
    pub fn tokenize_query(&self, logical_form: &str) -> Vec<String> {
        let lower = logical_form.to_lowercase();
        let mut tokens = vec![SOS_TOKEN.to_string()];
        tokens.extend(QUERY_TOKEN_RE.find_iter(&lower).map(|m| m.as_str().to_string()));
        tokens.push(EOS_TOKEN.to_string());
        tokens
    }

    /// Lower-case, strip closing punctuation, stem, and reverse.
    pub fn encoder_order(&self, words: &[String]) -> Vec<String> {
        let mut out: Vec<String> = words
            .iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        if out.last().map_or(false, |w| is_closing_punct(w)) {
            out.pop();
        }
        let mut out: Vec<String> = out
            .iter()
            .map(|w| STEMMER.stem(w).into_owned())
            .collect();
        out.reverse();
        out
    }

    /// Split a free-text question the way corpus questions are
    /// split (whitespace and commas), then put it in encoder order.
    pub fn question_words(&self, text: &str) -> Vec<String> {
        let spaced = text.replace('?', " ?").replace('.', " .");
        let words: Vec<String> = spaced
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|w| !w.is_empty())
            .map(String::from)
            .collect();
        self.encoder_order(&words)
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

fn is_closing_punct(word: &str) -> bool {
    word == "?" || word == "."
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_query_tokens_are_wrapped() {
        let p = Preprocessor::new();
        assert_eq!(
            p.tokenize_query("answer(A,job(A))"),
            words("<s> answer ( a , job ( a ) ) </s>")
        );
    }

    #[test]
    fn test_query_keeps_apostrophe_words_and_quotes() {
        let p = Preprocessor::new();
        let toks = p.tokenize_query("const(C,'c++')");
        assert_eq!(toks, words("<s> const ( c , ' c + + ' ) </s>"));

        let toks = p.tokenize_query("title(A,o'reilly)");
        assert!(toks.contains(&"o'reilly".to_string()));
    }

    #[test]
    fn test_encoder_order_reverses_and_drops_question_mark() {
        let p = Preprocessor::new();
        assert_eq!(
            p.encoder_order(&words("What Jobs use Java ?")),
            words("java use job what")
        );
    }

    #[test]
    fn test_question_words_are_stemmed() {
        let p = Preprocessor::new();
        assert_eq!(p.encoder_order(&words("programming jobs")), words("job program"));
        // Inflections of one word share a vocabulary entry
        assert_eq!(
            p.question_words("Which jobs require programming?"),
            p.question_words("which job requires program")
        );
    }

    #[test]
    fn test_question_words_matches_corpus_split() {
        let p = Preprocessor::new();
        assert_eq!(
            p.question_words("what jobs use java?"),
            p.encoder_order(&words("what jobs use java ?"))
        );
    }

    #[test]
    fn test_prepare() {
        let p = Preprocessor::new();
        let q = p.prepare(&words("list jobs"), "answer(A,job(A))");
        assert_eq!(q.words, words("job list"));
        assert_eq!(q.query.first().map(String::as_str), Some(SOS_TOKEN));
        assert_eq!(q.query.last().map(String::as_str), Some(EOS_TOKEN));
    }
}
