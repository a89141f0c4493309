// ============================================================
// Layer 3 — JobQuery Domain Type
// ============================================================
// One labelled example of the Jobs corpus:
//   - the natural-language question, as a list of words
//   - the structured query (logical form), as a list of tokens
//
// Example:
//   words: ["what", "jobs", "use", "java"]
//   query: ["<s>", "answer", "(", "a", ",", "(", "job", "(", "a", ")",
//           ",", "language", "(", "a", ",", "java", ")", ")", ")", "</s>"]
//
// Both sides are already tokenised; mapping tokens to integer
// ids is the vocabulary's job (Layer 6).
//
// Reference: Rust Book §5 (Structs)

use serde::{Deserialize, Serialize};

/// Start-of-sequence marker wrapped around every logical form
pub const SOS_TOKEN: &str = "<s>";
/// End-of-sequence marker wrapped around every logical form
pub const EOS_TOKEN: &str = "</s>";
/// Filler for positions past the end of a sequence
pub const PAD_TOKEN: &str = "<PAD>";
/// Stand-in for out-of-vocabulary tokens
pub const UNK_TOKEN: &str = "<UNK>";

/// A labelled (question, logical form) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobQuery {
    /// Question words in encoder order
    pub words: Vec<String>,

    /// Logical-form tokens, including the `<s>` / `</s>` markers
    pub query: Vec<String>,
}

impl JobQuery {
    pub fn new(words: Vec<String>, query: Vec<String>) -> Self {
        Self { words, query }
    }
}

/// Join logical-form tokens into readable text, dropping the
/// reserved markers. A space is kept only between two
/// alphanumeric tokens so `const ( a , 'c++' )` stays legible.
pub fn render_query<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut out = String::new();
    let mut prev_word = false;

    for tok in tokens.iter().map(|t| t.as_ref()) {
        if matches!(tok, SOS_TOKEN | EOS_TOKEN | PAD_TOKEN) {
            continue;
        }
        let is_word = tok.chars().next().map_or(false, |c| c.is_alphanumeric() || c == '_');
        if is_word && prev_word {
            out.push(' ');
        }
        out.push_str(tok);
        prev_word = is_word;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_render_drops_markers() {
        let q = JobQuery::new(vec![], toks("<s> answer ( a , job ( a ) ) </s> <PAD> <PAD>"));
        assert_eq!(render_query(&q.query), "answer(a,job(a))");
    }

    #[test]
    fn test_render_spaces_adjacent_words() {
        assert_eq!(render_query(&toks("const ( a , c ) foo bar")), "const(a,c)foo bar");
    }
}
