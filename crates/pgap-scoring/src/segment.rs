//! # Document Segmentation
//!
//! A [`Segment`] is one unit of candidate text from the input document. The
//! analyzer compares every segment against every clause, so segmentation
//! decides the granularity of matching: a clause is "covered" when some
//! single segment covers it.
//!
//! Text extraction from binary formats happens before this point. The
//! segmenter only sees plain text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One unit of candidate text, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Zero-based position in the document.
    pub index: usize,
    /// The segment text.
    pub text: String,
}

impl Segment {
    /// Create a segment.
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Whether the segment has no non-whitespace content. Blank segments
    /// always score zero.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Number a sequence of texts as segments in iteration order.
pub fn segments_from_texts<I, S>(texts: I) -> Vec<Segment>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| Segment::new(index, text))
        .collect()
}

/// Segmentation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentationError {
    /// Input text is empty or whitespace only.
    #[error("document text is empty")]
    EmptyText,
}

/// Turns extracted document text into an ordered sequence of segments.
pub trait Segmenter: Send + Sync + std::fmt::Debug {
    /// Split `text` into segments.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentationError::EmptyText`] for blank input.
    fn segment(&self, text: &str) -> Result<Vec<Segment>, SegmentationError>;
}

/// Splits text into paragraphs at blank lines.
///
/// Lines inside a paragraph are joined with a single space. When
/// `max_chars` is set, paragraphs longer than that are packed greedily into
/// sentence-aligned chunks; a single sentence longer than the limit becomes
/// its own chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParagraphSegmenter {
    max_chars: Option<usize>,
}

impl ParagraphSegmenter {
    /// Segmenter that keeps whole paragraphs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Segmenter that splits paragraphs longer than `max_chars`.
    pub fn with_max_chars(max_chars: usize) -> Self {
        Self {
            max_chars: Some(max_chars.max(1)),
        }
    }

    fn paragraphs(text: &str) -> Vec<String> {
        let mut paragraphs = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                if !current.is_empty() {
                    paragraphs.push(current.join(" "));
                    current.clear();
                }
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            paragraphs.push(current.join(" "));
        }
        paragraphs
    }

    fn split_long(paragraph: String, max_chars: usize) -> Vec<String> {
        if paragraph.chars().count() <= max_chars {
            return vec![paragraph];
        }
        let mut chunks = Vec::new();
        let mut current = String::new();
        for sentence in sentences(&paragraph) {
            let fits = current.is_empty()
                || current.chars().count() + 1 + sentence.chars().count() <= max_chars;
            if !fits {
                chunks.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(sentence);
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }
}

/// Split at `.`, `!` or `?` followed by whitespace. Terminators stay with
/// their sentence.
fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some(&(next_i, next_c)) = chars.peek() {
                if next_c.is_whitespace() {
                    let sentence = text[start..=i].trim();
                    if !sentence.is_empty() {
                        out.push(sentence);
                    }
                    start = next_i;
                }
            }
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}

impl Segmenter for ParagraphSegmenter {
    fn segment(&self, text: &str) -> Result<Vec<Segment>, SegmentationError> {
        if text.trim().is_empty() {
            return Err(SegmentationError::EmptyText);
        }
        let paragraphs = Self::paragraphs(text);
        let pieces: Vec<String> = match self.max_chars {
            Some(max) => paragraphs
                .into_iter()
                .flat_map(|p| Self::split_long(p, max))
                .collect(),
            None => paragraphs,
        };
        tracing::debug!(segments = pieces.len(), "segmented document text");
        Ok(segments_from_texts(pieces))
    }
}
