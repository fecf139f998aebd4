//! Page-number sanitizer.
//!
//! Strips running page markers (headers/footers) from extracted page text.
//! A line is removed only when it matches one of the patterns and carries at
//! most [`MAX_TOKENS`] whitespace-separated tokens, which guards against
//! dropping normal sentences that merely contain a number.

use regex::Regex;

/// Token ceiling for a line to qualify as a page marker.
const MAX_TOKENS: usize = 10;

/// Removes likely page-number lines from page text.
///
/// Pure and idempotent: sanitizing already-sanitized text is a no-op.
pub struct PageSanitizer {
    patterns: Vec<Regex>,
}

impl PageSanitizer {
    pub fn new() -> Self {
        let patterns = [
            // "3 / 12"
            r"^\s*\d+\s*/\s*\d+\s*$",
            // "- 3 -"
            r"^\s*-\s*\d+\s*-\s*$",
            // "Page 3", "page 3 of 12"
            r"(?i)\bpage\s+\d+(\s+of\s+\d+)?\b",
            // "3 of 12"
            r"\b\d+\s+of\s+\d+\b",
            // "3 페이지", "3쪽"
            r"\d+\s*(페이지|쪽)",
            // "p. 3"
            r"(?i)^\s*p\.?\s*\d+\s*$",
        ];

        Self {
            patterns: patterns
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
        }
    }

    /// Return the text with likely page-marker lines removed.
    pub fn sanitize(&self, text: &str) -> String {
        text.lines()
            .filter(|line| !self.is_page_marker(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn is_page_marker(&self, line: &str) -> bool {
        if line.split_whitespace().count() > MAX_TOKENS {
            return false;
        }
        self.patterns.iter().any(|pattern| pattern.is_match(line))
    }
}

impl Default for PageSanitizer {
    fn default() -> Self {
        Self::new()
    }
}
