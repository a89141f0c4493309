// ============================================================
// Layer 4 — Corpus Loader
// ============================================================
// Reads the Jobs query corpus from a local file.
//
// Each non-empty line is one Prolog fact:
//
//   parse([what,jobs,are,there,?],answer(A,job(A))).
//         └──────── words ───────┘ └── logical form ──┘
//
// Parsing steps:
//   1. lower-case the line
//   2. strip the "parse([" prefix
//   3. split at the first "],"  → word list | logical form
//   4. words are comma separated; surrounding quotes are removed
//   5. drop the trailing "." and the ")" closing parse(
//
// Lines that do not have this shape are skipped with a warning
// rather than failing the whole load.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §8 (Strings)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::data::preprocessor::Preprocessor;
use crate::domain::job_query::JobQuery;
use crate::domain::traits::CorpusSource;

/// Fields of one corpus line before tokenisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExample {
    pub words:        Vec<String>,
    pub logical_form: String,
}

pub struct JobQueryLoader {
    path:         PathBuf,
    preprocessor: Preprocessor,
}

impl JobQueryLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path:         path.into(),
            preprocessor: Preprocessor::new(),
        }
    }
}

impl CorpusSource for JobQueryLoader {
    fn load_all(&self) -> Result<Vec<JobQuery>> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read corpus '{}'", self.path.display()))?;

        let mut examples = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(line) {
                Some(raw) => examples.push(self.preprocessor.prepare(&raw.words, &raw.logical_form)),
                None => tracing::warn!("Skipping malformed corpus line {}: {}", lineno + 1, line),
            }
        }

        tracing::info!("Loaded {} examples from '{}'", examples.len(), self.path.display());
        Ok(examples)
    }
}

/// Parse one `parse([...],form).` line.
pub fn parse_line(line: &str) -> Option<RawExample> {
    let line = line.trim().to_lowercase();
    let rest = line.strip_prefix("parse([")?;
    let (words, form) = rest.split_once("],")?;

    let form = form.trim_end().trim_end_matches('.').trim_end();
    let form = form.strip_suffix(')')?.trim();

    let words: Vec<String> = words
        .split(',')
        .map(|w| w.trim().trim_matches('\'').to_string())
        .filter(|w| !w.is_empty())
        .collect();

    if words.is_empty() || form.is_empty() {
        return None;
    }

    Some(RawExample { words, logical_form: form.to_string() })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        let raw = parse_line("parse([what,jobs,are,there,?],answer(A,job(A))).").unwrap();
        assert_eq!(raw.words, vec!["what", "jobs", "are", "there", "?"]);
        assert_eq!(raw.logical_form, "answer(a,job(a))");
    }

    #[test]
    fn test_parse_line_with_quoted_words() {
        let raw = parse_line("parse([jobs,using,'c++'],answer(A,(job(A),language(A,'c++')))).\n")
            .unwrap();
        assert_eq!(raw.words, vec!["jobs", "using", "c++"]);
        assert_eq!(raw.logical_form, "answer(a,(job(a),language(a,'c++')))");
    }

    #[test]
    fn test_malformed_lines_rejected() {
        assert!(parse_line("answer(A,job(A)).").is_none());
        assert!(parse_line("parse([],answer(A,job(A))).").is_none());
        assert!(parse_line("parse([what,jobs").is_none());
    }

    #[test]
    fn test_load_all_skips_bad_lines() {
        let dir = std::env::temp_dir().join("jobs_semparse_loader_test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("corpus.txt");
        fs::write(
            &path,
            "parse([list,jobs,?],answer(A,job(A))).\n\
             garbage\n\
             \n\
             parse([jobs,in,austin],answer(A,(job(A),loc(A,austin)))).\n",
        )
        .unwrap();

        let examples = JobQueryLoader::new(&path).load_all().unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].words, vec!["job", "list"]);
        assert_eq!(examples[1].words, vec!["austin", "in", "job"]);
    }

    #[test]
    fn test_missing_file_is_error() {
        let loader = JobQueryLoader::new("/definitely/not/here.txt");
        assert!(loader.load_all().is_err());
    }
}
