use super::SummarizeError;

/// A contiguous, possibly overlapping slice of a document's word sequence.
///
/// `start` and `end` are word indices (`end` exclusive). The final window of a
/// split always ends at the last word so no trailing content is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Window {
    /// A single window covering the whole text, used when no splitting is needed.
    pub fn whole(text: &str) -> Self {
        Self {
            start: 0,
            end: text.split_whitespace().count(),
            text: text.to_string(),
        }
    }
}

/// Splits `text` into overlapping windows of `size` words with `overlap` words
/// shared between consecutive windows.
///
/// Texts of at most `size` words come back as one window equal to the whole
/// text. Boundaries are word-count based, so multi-byte text splits the same
/// way every time.
pub fn window(text: &str, size: usize, overlap: usize) -> Result<Vec<Window>, SummarizeError> {
    if size == 0 || overlap >= size {
        return Err(SummarizeError::Config(format!(
            "chunk overlap ({overlap}) must be smaller than chunk size ({size})"
        )));
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= size {
        return Ok(vec![Window {
            start: 0,
            end: words.len(),
            text: text.to_string(),
        }]);
    }

    let stride = size - overlap;
    let mut windows = Vec::new();
    let mut start = 0;

    loop {
        let end = usize::min(start + size, words.len());
        windows.push(Window {
            start,
            end,
            text: words[start..end].join(" "),
        });
        if end >= words.len() {
            break;
        }
        start += stride;
    }

    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_words(count: usize) -> String {
        (0..count)
            .map(|i| format!("w{i}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn small_input_yields_single_window_equal_to_text() {
        let text = "one two three";
        let windows = window(text, 10, 2).expect("window");
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].text, text);
        assert_eq!((windows[0].start, windows[0].end), (0, 3));
    }

    #[test]
    fn windows_cover_every_word_without_gaps() {
        let text = numbered_words(2_345);
        let windows = window(&text, 1_000, 100).expect("window");

        assert_eq!(windows[0].start, 0);
        for pair in windows.windows(2) {
            assert!(pair[1].start < pair[0].end, "gap between windows");
        }
        assert_eq!(windows.last().expect("non-empty").end, 2_345);
    }

    #[test]
    fn consecutive_windows_overlap_by_configured_amount() {
        let text = numbered_words(2_500);
        let windows = window(&text, 1_000, 100).expect("window");

        assert_eq!(windows[0].end - windows[1].start, 100);
        assert_eq!(windows[1].start, 900);
    }

    #[test]
    fn windowing_is_deterministic() {
        let text = numbered_words(3_000);
        let first = window(&text, 1_000, 250).expect("window");
        let second = window(&text, 1_000, 250).expect("window");
        assert_eq!(first, second);
    }

    #[test]
    fn overlap_not_smaller_than_size_fails_fast() {
        assert!(window("some text", 100, 100).is_err());
        assert!(window("some text", 100, 150).is_err());
        assert!(window("some text", 0, 0).is_err());
    }

    #[test]
    fn final_window_ends_exactly_at_last_word() {
        let text = numbered_words(1_050);
        let windows = window(&text, 1_000, 500).expect("window");
        let last = windows.last().expect("non-empty");
        assert_eq!(last.end, 1_050);
        assert!(last.text.ends_with("w1049"));
    }
}
