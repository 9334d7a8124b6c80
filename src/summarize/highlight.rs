use std::collections::HashMap;

/// Returns the `top_k` most salient sentences of `text`, best first.
///
/// Purely extractive: sentences are scored by the summed corpus frequency of
/// their word tokens (alphanumeric runs longer than two characters,
/// case-insensitive), so no generation call is involved and the result is
/// deterministic. Ties keep the original sentence order. Empty input yields an
/// empty list.
pub fn highlight(text: &str, top_k: usize) -> Vec<String> {
    let sentences = split_sentences(text.trim());
    if sentences.is_empty() || top_k == 0 {
        return Vec::new();
    }

    let mut freq: HashMap<String, usize> = HashMap::new();
    for token in tokens(text) {
        if token.chars().count() > 2 {
            *freq.entry(token).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(usize, usize)> = sentences
        .iter()
        .enumerate()
        .map(|(idx, sentence)| {
            let score = tokens(sentence)
                .map(|token| freq.get(&token).copied().unwrap_or(0))
                .sum();
            (idx, score)
        })
        .collect();

    // Stable sort keeps first-seen order for equal scores.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(top_k)
        .map(|(idx, _)| sentences[idx].clone())
        .collect()
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

/// Splits on sentence-terminal punctuation followed by whitespace, keeping the
/// punctuation with its sentence.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') && chars.peek().is_some_and(|next| next.is_whitespace()) {
            while chars.peek().is_some_and(|next| next.is_whitespace()) {
                chars.next();
            }
            let sentence = current.trim().to_string();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            current.clear();
        }
    }

    let tail = current.trim().to_string();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(highlight("", 5).is_empty());
        assert!(highlight("   \n  ", 5).is_empty());
    }

    #[test]
    fn frequent_content_words_rank_sentences_higher() {
        let text = "The cat sat. The cat sat on the mat. A dog ran.";
        let highlights = highlight(text, 2);

        assert_eq!(highlights.len(), 2);
        assert_eq!(highlights[0], "The cat sat on the mat.");
        assert_eq!(highlights[1], "The cat sat.");
    }

    #[test]
    fn ties_keep_original_order() {
        let text = "Alpha beta gamma. Gamma beta alpha. Something unrelated here.";
        let highlights = highlight(text, 2);
        assert_eq!(highlights[0], "Alpha beta gamma.");
        assert_eq!(highlights[1], "Gamma beta alpha.");
    }

    #[test]
    fn top_k_caps_the_result() {
        let text = "One sentence here. Another sentence there. A third one. A fourth one.";
        assert_eq!(highlight(text, 2).len(), 2);
    }

    #[test]
    fn ranking_is_deterministic() {
        let text = "Summaries help readers. Readers like summaries. Unrelated filler text!";
        assert_eq!(highlight(text, 3), highlight(text, 3));
    }

    #[test]
    fn short_tokens_do_not_contribute_to_scores() {
        // "is" and "a" repeat, but only tokens longer than two chars count.
        let text = "It is a day. Weather patterns change weather systems.";
        let highlights = highlight(text, 1);
        assert_eq!(highlights[0], "Weather patterns change weather systems.");
    }

    #[test]
    fn splits_on_terminal_punctuation_followed_by_whitespace() {
        let sentences = split_sentences("First one! Second one? Third 3.5 ends here.");
        assert_eq!(
            sentences,
            vec![
                "First one!".to_string(),
                "Second one?".to_string(),
                "Third 3.5 ends here.".to_string(),
            ]
        );
    }
}
