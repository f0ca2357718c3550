//! Analysis requests.
//!
//! A derived [`DocumentId`] digests the input kind together with the
//! content, because raw text and a segment list with the same characters
//! are scored over different segments.

use pgap_core::{DocumentId, ValidationError};
use pgap_scoring::Segment;

const TEXT_TAG: &str = "text";
const SEGMENTS_TAG: &str = "segments";

/// Cache and single-flight identity of a request.
///
/// The display name is part of the key since it is copied into the report.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportKey {
    /// Document identity.
    pub document_id: DocumentId,
    /// Display name.
    pub document_name: String,
}

/// Document content as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentInput {
    /// Already segmented text, used as-is. May be empty.
    Segments(Vec<Segment>),
    /// Raw extracted text, split by the analyzer's segmenter.
    Text(String),
}

/// One document to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Identity used for single-flight and caching.
    pub document_id: DocumentId,
    /// Display name copied into the report.
    pub document_name: String,
    /// The content.
    pub input: DocumentInput,
}

impl AnalysisRequest {
    /// Request for raw text, identified by a digest of the text.
    pub fn from_text(document_name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            document_id: DocumentId::from_content(&[TEXT_TAG, text.as_str()]),
            document_name: document_name.into(),
            input: DocumentInput::Text(text),
        }
    }

    /// Request for pre-segmented text, identified by a digest of the
    /// segment texts.
    pub fn from_segments(document_name: impl Into<String>, segments: Vec<Segment>) -> Self {
        let texts: Vec<&str> = std::iter::once(SEGMENTS_TAG)
            .chain(segments.iter().map(|s| s.text.as_str()))
            .collect();
        let document_id = DocumentId::from_content(&texts);
        Self {
            document_id,
            document_name: document_name.into(),
            input: DocumentInput::Segments(segments),
        }
    }

    /// The key under which this request's report is shared and cached.
    pub fn key(&self) -> ReportKey {
        ReportKey {
            document_id: self.document_id.clone(),
            document_name: self.document_name.clone(),
        }
    }

    /// Replace the derived identity with a caller-provided one.
    pub fn with_id(mut self, id: impl Into<String>) -> Result<Self, ValidationError> {
        self.document_id = DocumentId::new(id)?;
        Ok(self)
    }
}
