// ============================================================
// Layer 2 — TranslateUseCase
// ============================================================
// Free-text question → logical form, using the latest checkpoint.
//
//   question → lower-case, split on whitespace/commas, stem, reverse
//            → greedy decode → drop markers → query text

use anyhow::Result;

use crate::data::preprocessor::Preprocessor;
use crate::domain::{job_query::render_query, traits::QueryTranslator};
use crate::infra::{checkpoint::CheckpointManager, vocab_store::VocabStore};
use crate::ml::inferencer::{InferBackend, Inferencer};

pub struct TranslateUseCase {
    preprocessor: Preprocessor,
    inferencer:   Inferencer<InferBackend>,
}

impl TranslateUseCase {
    pub fn new(checkpoint_dir: &str) -> Result<Self> {
        let vocabs     = VocabStore::new(checkpoint_dir).load()?;
        let ckpt       = CheckpointManager::new(checkpoint_dir)?;
        let inferencer = Inferencer::from_checkpoint(&ckpt, vocabs)?;
        Ok(Self { preprocessor: Preprocessor::new(), inferencer })
    }
}

impl QueryTranslator for TranslateUseCase {
    fn translate(&self, question: &str) -> Result<String> {
        let words = self.preprocessor.question_words(question);
        if words.is_empty() {
            anyhow::bail!("Question has no words to translate");
        }
        tracing::debug!("Encoder input: {:?}", words);

        let query = self.inferencer.translate_words(&words);
        Ok(render_query(&query))
    }
}
