// ============================================================
// Layer 3 — Special Token Ids
// ============================================================
// The reserved ids the model components need to know about.
//
// These come from the vocabularies built at training time, so
// they are NOT compile-time constants: a different corpus (or a
// different min_freq) gives different ids. Every component that
// needs them receives this struct explicitly.
//
// Each vocabulary defines its own padding id; only the target
// vocabulary has start/end markers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialTokens {
    /// Padding id in the source (question) vocabulary
    pub source_pad: u32,
    /// Unknown-word id in the source vocabulary
    pub source_unk: u32,
    /// `<s>` id in the target (query) vocabulary
    pub target_sos: u32,
    /// `</s>` id in the target vocabulary
    pub target_eos: u32,
    /// Padding id in the target vocabulary
    pub target_pad: u32,
    /// Unknown-token id in the target vocabulary
    pub target_unk: u32,
}

impl SpecialTokens {
    /// True if `id` is a target token that carries content,
    /// i.e. not `<PAD>`, `<s>` or `</s>`.
    pub fn is_content(&self, id: u32) -> bool {
        id != self.target_pad && id != self.target_sos && id != self.target_eos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_content() {
        let s = SpecialTokens {
            source_pad: 11, source_unk: 10,
            target_sos: 0, target_eos: 9, target_pad: 1, target_unk: 2,
        };
        assert!(s.is_content(4));
        assert!(s.is_content(2));
        assert!(!s.is_content(0));
        assert!(!s.is_content(9));
        assert!(!s.is_content(1));
    }
}
