use std::collections::HashSet;

use tracing::warn;

use crate::llm::Generator;

use super::{StructuredSummary, prompts};

/// Separator between per-window summaries in the merge prompt.
pub(super) const SECTION_SEPARATOR: &str = "\n\n--- Next Section ---\n\n";
/// Separator used when the merge call itself fails and the partials are
/// returned concatenated instead.
pub(super) const FALLBACK_SEPARATOR: &str = "\n\n";

/// Ceilings for the merged structured arrays. Fewer items are fine; more are
/// truncated.
pub(super) const MAX_BULLETS: usize = 10;
pub(super) const MAX_HIGHLIGHTS: usize = 8;

/// Combines per-window prose summaries into one passage.
///
/// A single partial is returned unchanged. Multiple partials are joined and
/// handed to the generation collaborator for one merge pass; if that call
/// fails the joined partials are returned as-is. The result is degraded but
/// never empty as long as one partial had content.
pub(super) async fn reduce_text(
    generator: &dyn Generator,
    mut partials: Vec<String>,
    language: &str,
    temperature: f32,
) -> String {
    partials.retain(|partial| !partial.trim().is_empty());

    if partials.is_empty() {
        return String::new();
    }
    if partials.len() == 1 {
        return partials.remove(0);
    }

    let joined = partials.join(SECTION_SEPARATOR);
    let prompt = prompts::merge(language, &joined);

    match generator.generate(&prompt, temperature).await {
        Ok(text) => text,
        Err(err) => {
            warn!(
                ?err,
                sections = partials.len(),
                "merge call failed, falling back to concatenated partials"
            );
            partials.join(FALLBACK_SEPARATOR)
        }
    }
}

/// Combines per-window structured partials into one structured summary.
///
/// The array fields merge locally and deterministically: first-seen order,
/// exact duplicates removed, capped at [`MAX_BULLETS`] / [`MAX_HIGHLIGHTS`].
/// Executive summaries reduce through [`reduce_text`] with its fail-soft
/// merge call.
pub(super) async fn merge_structured(
    generator: &dyn Generator,
    mut partials: Vec<StructuredSummary>,
    language: &str,
    temperature: f32,
) -> StructuredSummary {
    if partials.len() == 1 {
        return partials.remove(0);
    }

    let mut summaries = Vec::with_capacity(partials.len());
    let mut bullets = Vec::new();
    let mut highlights = Vec::new();

    for partial in partials {
        summaries.push(partial.executive_summary);
        bullets.extend(partial.bullets);
        highlights.extend(partial.highlights);
    }

    StructuredSummary {
        executive_summary: reduce_text(generator, summaries, language, temperature).await,
        bullets: dedup_capped(bullets, MAX_BULLETS),
        highlights: dedup_capped(highlights, MAX_HIGHLIGHTS),
    }
}

fn dedup_capped(items: Vec<String>, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for item in items {
        if out.len() == cap {
            break;
        }
        if seen.insert(item.clone()) {
            out.push(item);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm::GenerateError;

    use super::*;

    /// Generator double: replies with the first rule whose needle appears in
    /// the prompt, records every prompt it sees, and can be set to always
    /// fail.
    #[derive(Default)]
    struct ScriptedGenerator {
        rules: Vec<(&'static str, &'static str)>,
        fallback: &'static str,
        fail: bool,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        async fn generate(&self, prompt: &str, _temperature: f32) -> Result<String, GenerateError> {
            self.prompts
                .lock()
                .expect("prompt log poisoned")
                .push(prompt.to_string());

            if self.fail {
                return Err(GenerateError::EmptyResponse);
            }

            let reply = self
                .rules
                .iter()
                .find(|(needle, _)| prompt.contains(needle))
                .map(|(_, reply)| *reply)
                .unwrap_or(self.fallback);
            Ok(reply.to_string())
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn single_partial_is_returned_unchanged() {
        let generator = ScriptedGenerator {
            fail: true,
            ..Default::default()
        };
        let result = reduce_text(&generator, strings(&["only one"]), "English", 0.3).await;
        assert_eq!(result, "only one");
        assert!(generator.prompts.lock().expect("log").is_empty());
    }

    #[tokio::test]
    async fn multiple_partials_go_through_one_merge_call() {
        let generator = ScriptedGenerator {
            rules: vec![("Summaries from different sections", "merged result")],
            fallback: "unexpected",
            ..Default::default()
        };
        let result = reduce_text(&generator, strings(&["S1", "S2"]), "English", 0.3).await;
        assert_eq!(result, "merged result");
        assert_eq!(generator.prompts.lock().expect("log").len(), 1);
    }

    #[tokio::test]
    async fn failed_merge_falls_back_to_concatenation() {
        let generator = ScriptedGenerator {
            fail: true,
            ..Default::default()
        };
        let result = reduce_text(&generator, strings(&["S1", "S2", "S3"]), "English", 0.3).await;
        assert_eq!(result, "S1\n\nS2\n\nS3");
    }

    #[tokio::test]
    async fn empty_partials_are_dropped_before_merging() {
        let generator = ScriptedGenerator {
            fail: true,
            ..Default::default()
        };
        let result = reduce_text(&generator, strings(&["", "S2", "  "]), "English", 0.3).await;
        assert_eq!(result, "S2");
    }

    #[tokio::test]
    async fn structured_single_partial_is_identity() {
        let generator = ScriptedGenerator {
            fail: true,
            ..Default::default()
        };
        let partial = StructuredSummary {
            executive_summary: "exec".to_string(),
            bullets: strings(&["b1", "b2"]),
            highlights: strings(&["h1"]),
        };
        let merged = merge_structured(&generator, vec![partial.clone()], "English", 0.3).await;
        assert_eq!(merged, partial);
    }

    #[tokio::test]
    async fn structured_merge_dedups_in_first_seen_order() {
        let generator = ScriptedGenerator {
            fallback: "combined exec",
            ..Default::default()
        };
        let first = StructuredSummary {
            executive_summary: "e1".to_string(),
            bullets: strings(&["A", "B"]),
            highlights: strings(&["H1"]),
        };
        let second = StructuredSummary {
            executive_summary: "e2".to_string(),
            bullets: strings(&["A", "C"]),
            highlights: strings(&["H1", "H2"]),
        };

        let merged = merge_structured(&generator, vec![first, second], "English", 0.3).await;
        assert_eq!(merged.bullets, strings(&["A", "B", "C"]));
        assert_eq!(merged.highlights, strings(&["H1", "H2"]));
        assert_eq!(merged.executive_summary, "combined exec");
    }

    #[tokio::test]
    async fn structured_merge_truncates_to_ceilings() {
        let generator = ScriptedGenerator {
            fallback: "exec",
            ..Default::default()
        };
        let bullets: Vec<String> = (0..15).map(|i| format!("bullet {i}")).collect();
        let highlights: Vec<String> = (0..12).map(|i| format!("highlight {i}")).collect();
        let first = StructuredSummary {
            executive_summary: "e1".to_string(),
            bullets: bullets[..8].to_vec(),
            highlights: highlights[..6].to_vec(),
        };
        let second = StructuredSummary {
            executive_summary: "e2".to_string(),
            bullets: bullets[8..].to_vec(),
            highlights: highlights[6..].to_vec(),
        };

        let merged = merge_structured(&generator, vec![first, second], "English", 0.3).await;
        assert_eq!(merged.bullets.len(), MAX_BULLETS);
        assert_eq!(merged.bullets[0], "bullet 0");
        assert_eq!(merged.highlights.len(), MAX_HIGHLIGHTS);
    }

    #[test]
    fn dedup_capped_keeps_first_occurrence() {
        let deduped = dedup_capped(strings(&["A", "B", "A", "C"]), 10);
        assert_eq!(deduped, strings(&["A", "B", "C"]));
    }
}
