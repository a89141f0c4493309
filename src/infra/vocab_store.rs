// ============================================================
// Layer 6 — Vocabulary Store
// ============================================================
// Builds, saves and loads the two word-level vocabularies:
//
//   source — question words seen at least `min_freq` times in the
//            training split, then <UNK>, <PAD>
//   target — every logical-form token of the training split
//            (including <s> and </s>), then <UNK>, <PAD>
//
// Ids follow first-seen order in the training split, so the same
// split always yields the same ids.
//
// Each vocabulary is stored as a Hugging Face WordLevel tokenizer
// JSON. We write the JSON directly instead of going through a
// trainer: the token list is already final, there is nothing to
// learn.
//
// Files:
//   checkpoints/
//     source_tokenizer.json
//     target_tokenizer.json

use anyhow::{Context, Result};
use std::{collections::HashMap, path::PathBuf, str::FromStr};
use tokenizers::Tokenizer;

use crate::domain::job_query::{JobQuery, EOS_TOKEN, PAD_TOKEN, SOS_TOKEN, UNK_TOKEN};
use crate::domain::special_tokens::SpecialTokens;

const SOURCE_FILE: &str = "source_tokenizer.json";
const TARGET_FILE: &str = "target_tokenizer.json";

// ─── Vocabulary ───────────────────────────────────────────────────────────────
/// Bidirectional token ↔ id map backed by a WordLevel tokenizer.
pub struct Vocabulary {
    tokenizer: Tokenizer,
    unk_id:    u32,
    pad_id:    u32,
}

impl Vocabulary {
    /// Build from an ordered token list; token `i` gets id `i`.
    /// The list must contain `<UNK>` and `<PAD>`.
    pub fn from_tokens(tokens: &[String]) -> Result<Self> {
        let vocab: serde_json::Map<String, serde_json::Value> = tokens
            .iter()
            .enumerate()
            .map(|(id, tok)| (tok.clone(), serde_json::json!(id)))
            .collect();

        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [],
            "normalizer": null,
            "pre_tokenizer": { "type": "WhitespaceSplit" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": UNK_TOKEN
            }
        });

        let tokenizer = Tokenizer::from_str(&tokenizer_json.to_string())
            .map_err(|e| anyhow::anyhow!("Cannot build vocabulary tokenizer: {e}"))?;
        Self::from_tokenizer(tokenizer)
    }

    /// Wrap a loaded tokenizer, resolving the reserved ids.
    pub fn from_tokenizer(tokenizer: Tokenizer) -> Result<Self> {
        let unk_id = tokenizer.token_to_id(UNK_TOKEN)
            .with_context(|| format!("Vocabulary has no {UNK_TOKEN} entry"))?;
        let pad_id = tokenizer.token_to_id(PAD_TOKEN)
            .with_context(|| format!("Vocabulary has no {PAD_TOKEN} entry"))?;
        Ok(Self { tokenizer, unk_id, pad_id })
    }

    /// Id of `token`, or `<UNK>` if it is not in the vocabulary.
    pub fn id(&self, token: &str) -> u32 {
        self.tokenizer.token_to_id(token).unwrap_or(self.unk_id)
    }

    /// Id of `token`, which must be present.
    pub fn require(&self, token: &str) -> Result<u32> {
        self.tokenizer.token_to_id(token)
            .with_context(|| format!("Vocabulary has no {token} entry"))
    }

    pub fn encode<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<u32> {
        tokens.iter().map(|t| self.id(t.as_ref())).collect()
    }

    pub fn decode(&self, ids: &[u32]) -> Vec<String> {
        ids.iter()
            .map(|&id| self.tokenizer.id_to_token(id).unwrap_or_else(|| UNK_TOKEN.to_string()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tokenizer.get_vocab_size(false)
    }

    pub fn unk_id(&self) -> u32 { self.unk_id }

    pub fn pad_id(&self) -> u32 { self.pad_id }

    pub fn tokenizer(&self) -> &Tokenizer { &self.tokenizer }
}

/// Ordered vocabulary entries: tokens with count ≥ `min_freq` in
/// first-seen order, followed by `<UNK>` and `<PAD>`.
pub fn collect_entries<'a, I>(sequences: I, min_freq: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order:  Vec<&str> = Vec::new();

    for seq in sequences {
        for tok in seq {
            let count = counts.entry(tok.as_str()).or_insert(0);
            if *count == 0 {
                order.push(tok.as_str());
            }
            *count += 1;
        }
    }

    let mut entries: Vec<String> = order
        .into_iter()
        .filter(|tok| counts[tok] >= min_freq && *tok != UNK_TOKEN && *tok != PAD_TOKEN)
        .map(String::from)
        .collect();
    entries.push(UNK_TOKEN.to_string());
    entries.push(PAD_TOKEN.to_string());
    entries
}

// ─── Vocabularies ─────────────────────────────────────────────────────────────
/// The source (question) and target (query) vocabularies of one run.
pub struct Vocabularies {
    pub source: Vocabulary,
    pub target: Vocabulary,
}

impl Vocabularies {
    /// Build both vocabularies from the training split only.
    pub fn build(train: &[JobQuery], min_source_freq: usize) -> Result<Self> {
        let source = collect_entries(train.iter().map(|q| q.words.as_slice()), min_source_freq);
        let target = collect_entries(train.iter().map(|q| q.query.as_slice()), 1);
        Ok(Self {
            source: Vocabulary::from_tokens(&source)?,
            target: Vocabulary::from_tokens(&target)?,
        })
    }

    /// Reserved ids for the model components.
    pub fn special_tokens(&self) -> Result<SpecialTokens> {
        Ok(SpecialTokens {
            source_pad: self.source.pad_id(),
            source_unk: self.source.unk_id(),
            target_sos: self.target.require(SOS_TOKEN)?,
            target_eos: self.target.require(EOS_TOKEN)?,
            target_pad: self.target.pad_id(),
            target_unk: self.target.unk_id(),
        })
    }
}

// ─── VocabStore ───────────────────────────────────────────────────────────────
pub struct VocabStore {
    dir: PathBuf,
}

impl VocabStore {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: PathBuf::from(dir.into()) }
    }

    /// Build the vocabularies from the training split and write them.
    pub fn build_and_save(&self, train: &[JobQuery], min_source_freq: usize) -> Result<Vocabularies> {
        let vocabs = Vocabularies::build(train, min_source_freq)?;
        self.save(&vocabs)?;
        tracing::info!(
            "Vocabularies built: {} source words, {} query tokens",
            vocabs.source.len(),
            vocabs.target.len()
        );
        Ok(vocabs)
    }

    pub fn save(&self, vocabs: &Vocabularies) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;
        for (file, vocab) in [(SOURCE_FILE, &vocabs.source), (TARGET_FILE, &vocabs.target)] {
            let path = self.dir.join(file);
            vocab.tokenizer()
                .save(&path, true)
                .map_err(|e| anyhow::anyhow!("Cannot write '{}': {e}", path.display()))?;
            tracing::debug!("Saved vocabulary to '{}'", path.display());
        }
        Ok(())
    }

    pub fn load(&self) -> Result<Vocabularies> {
        Ok(Vocabularies {
            source: self.load_one(SOURCE_FILE)?,
            target: self.load_one(TARGET_FILE)?,
        })
    }

    fn load_one(&self, file: &str) -> Result<Vocabulary> {
        let path = self.dir.join(file);
        let tokenizer = Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!(
                "Cannot load vocabulary from '{}': {}. Have you run 'train' first?",
                path.display(), e
            ))?;
        Vocabulary::from_tokenizer(tokenizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    fn corpus() -> Vec<JobQuery> {
        vec![
            JobQuery::new(toks("java use jobs what"), toks("<s> answer ( a , job ( a ) ) </s>")),
            JobQuery::new(toks("austin in jobs"), toks("<s> answer ( a , loc ( a , austin ) ) </s>")),
        ]
    }

    #[test]
    fn test_entries_respect_min_freq_and_order() {
        let seqs = vec![toks("a b a c"), toks("b d")];
        let entries = collect_entries(seqs.iter().map(|s| s.as_slice()), 2);
        assert_eq!(entries, toks("a b <UNK> <PAD>"));

        let entries = collect_entries(seqs.iter().map(|s| s.as_slice()), 1);
        assert_eq!(entries, toks("a b c d <UNK> <PAD>"));
    }

    #[test]
    fn test_encode_decode_with_unknowns() {
        let vocab = Vocabulary::from_tokens(&toks("x y <UNK> <PAD>")).unwrap();
        assert_eq!(vocab.len(), 4);
        assert_eq!(vocab.encode(&toks("y x zzz")), vec![1, 0, 2]);
        assert_eq!(vocab.decode(&[0, 3]), toks("x <PAD>"));
        assert_eq!(vocab.pad_id(), 3);
        assert_eq!(vocab.unk_id(), 2);
    }

    #[test]
    fn test_special_tokens_from_vocabularies() {
        let vocabs  = Vocabularies::build(&corpus(), 2).unwrap();
        let special = vocabs.special_tokens().unwrap();

        // Only "jobs" appears twice on the source side
        assert_eq!(vocabs.source.len(), 3);
        assert_eq!(special.source_unk, 1);
        assert_eq!(special.source_pad, 2);
        // <s> is the first query token seen
        assert_eq!(special.target_sos, 0);
        assert_eq!(vocabs.target.decode(&[special.target_eos]), toks("</s>"));
        assert_eq!(special.target_pad as usize, vocabs.target.len() - 1);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir   = std::env::temp_dir().join("jobs_semparse_vocab_test");
        let store = VocabStore::new(dir.to_string_lossy().to_string());
        let built = store.build_and_save(&corpus(), 1).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.target.len(), built.target.len());
        assert_eq!(loaded.special_tokens().unwrap(), built.special_tokens().unwrap());
        assert_eq!(loaded.target.id("loc"), built.target.id("loc"));
    }
}
