//! crates/summarizer_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or serialization format.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Lifecycle of a document (and of an in-flight upload).
///
/// The lifecycle only moves forward: `Uploading -> Processing -> Completed`
/// or `Uploading -> Processing -> Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentStatus {
    Uploading,
    Processing,
    Completed,
    Error,
}

impl DocumentStatus {
    fn rank(self) -> u8 {
        match self {
            DocumentStatus::Uploading => 0,
            DocumentStatus::Processing => 1,
            DocumentStatus::Completed | DocumentStatus::Error => 2,
        }
    }

    /// Whether moving from `self` to `next` keeps the lifecycle moving forward.
    /// Staying in the same status is allowed; leaving a terminal status is not.
    pub fn can_advance_to(self, next: DocumentStatus) -> bool {
        if self == next {
            return true;
        }
        !self.is_terminal() && next.rank() > self.rank()
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, DocumentStatus::Completed | DocumentStatus::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentStatus::Uploading => "uploading",
            DocumentStatus::Processing => "processing",
            DocumentStatus::Completed => "completed",
            DocumentStatus::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "uploading" => Some(DocumentStatus::Uploading),
            "processing" => Some(DocumentStatus::Processing),
            "completed" => Some(DocumentStatus::Completed),
            "error" => Some(DocumentStatus::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a backend-identified highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightType {
    KeyPoint,
    Important,
    Definition,
}

impl HighlightType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "key-point" => Some(HighlightType::KeyPoint),
            "important" => Some(HighlightType::Important),
            "definition" => Some(HighlightType::Definition),
            _ => None,
        }
    }
}

/// Page-relative rectangle of a highlight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A salient region of one page, read-only on the client.
#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    pub id: Uuid,
    pub document_id: Uuid,
    /// 1-based.
    pub page_number: u32,
    pub bounds: BoundingBox,
    pub text: String,
    pub kind: HighlightType,
    /// In `[0, 1]`.
    pub confidence: f64,
}

/// AI-generated condensation of a document. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub id: Uuid,
    pub document_id: Uuid,
    pub content: String,
    pub key_points: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// Seconds spent generating the summary.
    pub processing_time: f64,
    pub model_used: Option<String>,
}

/// A client-side record of one uploaded PDF and its processing status.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub filename: String,
    pub original_name: String,
    pub file_size: u64,
    pub uploaded_at: DateTime<Utc>,
    pub status: DocumentStatus,
    pub summary: Option<Summary>,
    pub highlights: Option<Vec<Highlight>>,
    pub page_count: Option<u32>,
    pub extracted_text: Option<String>,
    pub processing_stage: Option<String>,
    pub processing_progress: Option<u8>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// Backend view of where a document is in its processing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingStatus {
    pub document_id: Uuid,
    pub status: DocumentStatus,
    pub stage: String,
    pub progress: u8,
    pub message: String,
}

/// An occurrence of a search term inside one document's extracted text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMatch {
    /// Character offset of the match in the extracted text.
    pub position: usize,
    /// The match with surrounding text.
    pub context: String,
    pub relevance_score: f64,
}

/// One page of a paginated document listing.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPage {
    pub items: Vec<Document>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// Partial fields merged into a document by `update_document`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch {
    pub status: Option<DocumentStatus>,
    pub summary: Option<Summary>,
    pub highlights: Option<Vec<Highlight>>,
    pub page_count: Option<u32>,
    pub extracted_text: Option<String>,
    pub processing_stage: Option<String>,
    pub processing_progress: Option<u8>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl DocumentPatch {
    pub fn status(status: DocumentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Merges the present fields into `doc`. Returns `false` when the status
    /// field was dropped because it would move the lifecycle backward.
    pub fn apply_to(self, doc: &mut Document) -> bool {
        let mut status_applied = true;
        if let Some(status) = self.status {
            if doc.status.can_advance_to(status) {
                doc.status = status;
            } else {
                status_applied = false;
            }
        }
        if let Some(summary) = self.summary {
            doc.summary = Some(summary);
        }
        if let Some(highlights) = self.highlights {
            doc.highlights = Some(highlights);
        }
        if let Some(page_count) = self.page_count {
            doc.page_count = Some(page_count);
        }
        if let Some(text) = self.extracted_text {
            doc.extracted_text = Some(text);
        }
        if let Some(stage) = self.processing_stage {
            doc.processing_stage = Some(stage);
        }
        if let Some(progress) = self.processing_progress {
            doc.processing_progress = Some(progress.min(100));
        }
        if let Some(at) = self.processed_at {
            doc.processed_at = Some(at);
        }
        status_applied
    }
}

/// A file picked or dropped by the user, held in memory until uploaded.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    /// MIME type reported by the picker, when known.
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: Option<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type,
            data,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
