//! Turning an OCR text blob into the line sequence the extractor reads

/// Split OCR full text into lines.
///
/// Empty lines are kept: the extractor works on fixed offsets and the
/// provider's blank lines are part of the layout it reports.
pub fn split_ocr_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_unix_newlines() {
        assert_eq!(split_ocr_lines("a\nb\nc"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_windows_newlines() {
        assert_eq!(split_ocr_lines("a\r\nb\r\n"), vec!["a", "b", ""]);
    }

    #[test]
    fn test_split_keeps_blank_lines() {
        assert_eq!(split_ocr_lines("a\n\nb"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_split_empty_text() {
        assert!(split_ocr_lines("").is_empty());
    }
}
