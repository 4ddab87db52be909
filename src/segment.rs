//! Sentence segmentation for ingestion.
//!
//! Splits paragraph text into sentences on runs of sentence-ending
//! punctuation. The default pattern and minimum-length filter come from the
//! corpus collector: verse numbers, scripture references, and question
//! markers (¿) act as boundaries in both Purépecha and Spanish text, and
//! fragments of ten characters or fewer are dropped as segmentation noise
//! (orphaned verse numbers, list markers).

use once_cell::sync::Lazy;
use regex::Regex;

/// Collector's boundary pattern: runs of `.`, `!`, `?`, `:`, `¿`, and digits,
/// plus any trailing whitespace.
static DEFAULT_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?:¿\d]+\s*").expect("sentence boundary pattern"));

/// Default minimum sentence length in characters.
const DEFAULT_MIN_CHARS: usize = 10;

/// Regex-based sentence segmenter.
#[derive(Debug, Clone)]
pub struct SentenceSegmenter {
    boundary: Regex,
    min_chars: usize,
}

impl Default for SentenceSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl SentenceSegmenter {
    /// Segmenter with the collector's pattern and length filter.
    pub fn new() -> Self {
        Self {
            boundary: DEFAULT_BOUNDARY.clone(),
            min_chars: DEFAULT_MIN_CHARS,
        }
    }

    /// Keep every non-empty fragment, however short.
    pub fn keep_short(mut self) -> Self {
        self.min_chars = 0;
        self
    }

    /// Override the boundary pattern.
    pub fn with_boundary(mut self, boundary: Regex) -> Self {
        self.boundary = boundary;
        self
    }

    /// Override the minimum sentence length (in chars).
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Split one paragraph into sentences.
    pub fn segment(&self, paragraph: &str) -> Vec<String> {
        self.boundary
            .split(paragraph)
            .map(str::trim)
            .filter(|part| !part.is_empty() && part.chars().count() > self.min_chars)
            .map(str::to_string)
            .collect()
    }

    /// Split a sequence of paragraphs, flattened in order.
    pub fn segment_all<'a, I>(&self, paragraphs: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        paragraphs
            .into_iter()
            .flat_map(|p| self.segment(p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_punctuation_runs() {
        let seg = SentenceSegmenter::new().keep_short();
        let parts = seg.segment("Primera frase. Segunda frase! Tercera");
        assert_eq!(parts, vec!["Primera frase", "Segunda frase", "Tercera"]);
    }

    #[test]
    fn test_verse_numbers_are_boundaries() {
        let seg = SentenceSegmenter::new().keep_short();
        let parts = seg.segment("5 Veamos lo que podemos aprender");
        assert_eq!(parts, vec!["Veamos lo que podemos aprender"]);
    }

    #[test]
    fn test_min_length_filter_drops_noise() {
        let seg = SentenceSegmenter::new();
        let parts = seg.segment("Sam. 16:18, 19). Cuando Jehová lo eligió para rey");
        assert!(parts.iter().all(|s| s.chars().count() > 10));
        assert!(parts.iter().any(|s| s.contains("Jehová")));
    }

    #[test]
    fn test_purepecha_text_segments() {
        let seg = SentenceSegmenter::new().keep_short();
        let parts =
            seg.segment("Iásï, ju je exeni ambechi uaa jorhenguarhini rei Dabidiiri ambe. Ima kaxumbitiispti");
        assert_eq!(parts.len(), 2);
        assert!(parts[0].starts_with("Iásï"));
    }

    #[test]
    fn test_empty_paragraph_yields_nothing() {
        let seg = SentenceSegmenter::new();
        assert!(seg.segment("").is_empty());
        assert!(seg.segment("   ").is_empty());
    }
}
