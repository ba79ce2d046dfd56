//! Few-shot example block for a downstream translation prompt.

use crate::language::Language;
use crate::types::SearchResult;

const HEADER: &str = "Translation examples:\n";

/// Turns ranked search results into a bounded, formatted example block.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    source_language: Language,
}

impl ContextAssembler {
    pub const fn new(source_language: Language) -> Self {
        Self { source_language }
    }

    /// How many candidates to retrieve for a block of `max_examples`.
    /// Some hits lack the target language, so twice as many are fetched.
    pub const fn candidate_count(max_examples: usize) -> usize {
        max_examples.saturating_mul(2)
    }

    /// Format up to `max_examples` results that carry both the source and
    /// `target` text, in rank order. Returns `""` when none qualify.
    pub fn assemble(&self, results: &[SearchResult], target: &Language, max_examples: usize) -> String {
        let examples: Vec<String> = results
            .iter()
            .filter_map(|result| {
                let source = result.record.translation(&self.source_language)?;
                let translated = result.record.translation(target)?;
                Some(format!(
                    "{}: \"{}\"\n{}: \"{}\"",
                    self.source_language.display_name(),
                    source,
                    target.display_name(),
                    translated
                ))
            })
            .take(max_examples)
            .collect();

        if examples.is_empty() {
            return String::new();
        }
        format!("{HEADER}{}\n\n", examples.join("\n\n"))
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(Language::English)
    }
}
