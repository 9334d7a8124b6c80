//! PDF text extraction and page-range selection.

use std::collections::BTreeSet;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to read PDF: {0}")]
    Malformed(String),
    #[error("document contains no extractable text")]
    EmptyText,
}

/// Extracts plain text from a PDF, optionally limited to a page selection
/// like `"1-3,5"`. Page numbers are 1-based; an empty or blank selection
/// means the whole document. Scanned-image documents extract to whitespace
/// and are reported as [`ExtractError::EmptyText`].
pub fn extract_document(bytes: &[u8], page_range: Option<&str>) -> Result<String, ExtractError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|err| ExtractError::Malformed(err.to_string()))?;

    let selected = match page_range.map(str::trim).filter(|range| !range.is_empty()) {
        Some(range) => parse_page_range(range, pages.len()),
        None => (0..pages.len()).collect(),
    };

    let text = selected
        .iter()
        .filter_map(|&index| pages.get(index))
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n");

    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractError::EmptyText);
    }

    Ok(text.to_string())
}

/// Parses a 1-based page selection like `"1-3,5"` into sorted, deduplicated
/// 0-based page indices.
///
/// Range endpoints clamp to the document; single pages outside it are
/// dropped, and parts that do not parse are skipped. An unusable selection
/// therefore degrades toward "fewer pages", never an error.
pub fn parse_page_range(range: &str, total_pages: usize) -> Vec<usize> {
    let mut indices = BTreeSet::new();
    if total_pages == 0 {
        return Vec::new();
    }

    for part in range.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some((low, high)) = part.split_once('-') {
            let (Ok(start), Ok(end)) = (low.trim().parse::<usize>(), high.trim().parse::<usize>())
            else {
                continue;
            };
            let start = start.clamp(1, total_pages);
            let end = end.clamp(1, total_pages);
            for page in start..=end {
                indices.insert(page - 1);
            }
        } else if let Ok(page) = part.parse::<usize>() {
            if (1..=total_pages).contains(&page) {
                indices.insert(page - 1);
            }
        }
    }

    indices.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_and_singles_combine() {
        assert_eq!(parse_page_range("1-3,5", 10), vec![0, 1, 2, 4]);
    }

    #[test]
    fn out_of_bounds_single_pages_are_dropped() {
        assert_eq!(parse_page_range("20", 10), Vec::<usize>::new());
        assert_eq!(parse_page_range("0", 10), Vec::<usize>::new());
    }

    #[test]
    fn range_endpoints_clamp_to_the_document() {
        assert_eq!(parse_page_range("8-20", 10), vec![7, 8, 9]);
        assert_eq!(parse_page_range("0-2", 10), vec![0, 1]);
    }

    #[test]
    fn unparseable_parts_are_skipped() {
        assert_eq!(parse_page_range("abc,2,x-y", 10), vec![1]);
        assert_eq!(parse_page_range(",,", 10), Vec::<usize>::new());
    }

    #[test]
    fn duplicates_collapse_and_order_is_ascending() {
        assert_eq!(parse_page_range("3,1-3,2", 10), vec![0, 1, 2]);
        assert_eq!(parse_page_range("5,1", 10), vec![0, 4]);
    }

    #[test]
    fn empty_document_selects_nothing() {
        assert_eq!(parse_page_range("1-3", 0), Vec::<usize>::new());
    }

    #[test]
    fn malformed_bytes_report_as_malformed() {
        let result = extract_document(b"not a pdf at all", None);
        assert!(matches!(result, Err(ExtractError::Malformed(_))));
    }
}
