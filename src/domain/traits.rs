// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// By programming against traits instead of concrete types,
// we can swap implementations without changing the code
// that uses them:
//   - JobQueryLoader implements CorpusSource
//   - TranslateUseCase implements QueryTranslator
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::job_query::JobQuery;

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Any component that can produce labelled examples.
pub trait CorpusSource {
    /// Load every example this source knows about, in file order.
    fn load_all(&self) -> Result<Vec<JobQuery>>;
}

// ─── QueryTranslator ──────────────────────────────────────────────────────────
/// Any component that turns a natural-language question into
/// a logical form.
pub trait QueryTranslator {
    fn translate(&self, question: &str) -> Result<String>;
}
