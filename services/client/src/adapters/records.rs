//! services/client/src/adapters/records.rs
//!
//! "Impure" wire records matching the backend's JSON, and their conversion into
//! the pure domain types of the core crate.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use summarizer_core::domain::{
    BoundingBox, Document, DocumentPage, DocumentStatus, Highlight, HighlightType,
    ProcessingStatus, Summary, TextMatch,
};
use summarizer_core::ports::{PortError, PortResult};
use uuid::Uuid;

//=========================================================================================
// Timestamps
//=========================================================================================

/// The backend emits RFC 3339 timestamps, or naive ones (no offset) when its
/// database drops the zone. Naive timestamps are taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw)))
}

fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw))),
        None => Ok(None),
    }
}

fn status_from_wire(raw: &str) -> PortResult<DocumentStatus> {
    DocumentStatus::parse(raw)
        .ok_or_else(|| PortError::Server(format!("Unexpected document status '{}'", raw)))
}

fn percent(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

//=========================================================================================
// Records
//=========================================================================================

#[derive(Debug, Deserialize)]
pub struct PageRecord<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl PageRecord<DocumentRecord> {
    pub fn to_domain(self) -> PortResult<DocumentPage> {
        let items = self
            .items
            .into_iter()
            .map(DocumentRecord::to_domain)
            .collect::<PortResult<Vec<_>>>()?;
        Ok(DocumentPage {
            items,
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct DocumentRecord {
    id: Uuid,
    filename: String,
    #[serde(rename = "originalName")]
    original_name: String,
    #[serde(rename = "fileSize")]
    file_size: u64,
    status: String,
    #[serde(default)]
    processing_stage: Option<String>,
    #[serde(default)]
    processing_progress: Option<i64>,
    #[serde(rename = "pageCount", default)]
    page_count: Option<u32>,
    #[serde(rename = "uploadedAt", deserialize_with = "timestamp")]
    uploaded_at: DateTime<Utc>,
    #[serde(rename = "processedAt", default, deserialize_with = "optional_timestamp")]
    processed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    summary: Option<SummaryRecord>,
    #[serde(default)]
    highlights: Vec<HighlightRecord>,
    #[serde(default, alias = "textContent")]
    text_content: Option<String>,
}

impl DocumentRecord {
    pub fn to_domain(self) -> PortResult<Document> {
        let highlights = self
            .highlights
            .into_iter()
            .map(HighlightRecord::to_domain)
            .collect::<PortResult<Vec<_>>>()?;
        Ok(Document {
            id: self.id,
            filename: self.filename,
            original_name: self.original_name,
            file_size: self.file_size,
            uploaded_at: self.uploaded_at,
            status: status_from_wire(&self.status)?,
            summary: self.summary.map(SummaryRecord::to_domain),
            highlights: (!highlights.is_empty()).then_some(highlights),
            page_count: self.page_count,
            extracted_text: self.text_content,
            processing_stage: self.processing_stage,
            processing_progress: self.processing_progress.map(percent),
            processed_at: self.processed_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SummaryRecord {
    id: Uuid,
    document_id: Uuid,
    content: String,
    #[serde(default)]
    key_points: Vec<String>,
    #[serde(default)]
    processing_time: Option<f64>,
    #[serde(default)]
    model_used: Option<String>,
    #[serde(deserialize_with = "timestamp")]
    created_at: DateTime<Utc>,
}

impl SummaryRecord {
    pub fn to_domain(self) -> Summary {
        Summary {
            id: self.id,
            document_id: self.document_id,
            content: self.content,
            key_points: self.key_points,
            created_at: self.created_at,
            processing_time: self.processing_time.unwrap_or(0.0),
            model_used: self.model_used,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HighlightRecord {
    id: Uuid,
    document_id: Uuid,
    page_number: u32,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    text: String,
    #[serde(rename = "type", alias = "highlight_type")]
    kind: String,
    #[serde(default)]
    confidence: Option<f64>,
}

impl HighlightRecord {
    pub fn to_domain(self) -> PortResult<Highlight> {
        let kind = HighlightType::parse(&self.kind)
            .ok_or_else(|| PortError::Server(format!("Unexpected highlight type '{}'", self.kind)))?;
        Ok(Highlight {
            id: self.id,
            document_id: self.document_id,
            page_number: self.page_number,
            bounds: BoundingBox {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
            },
            text: self.text,
            kind,
            confidence: self.confidence.unwrap_or(0.0).clamp(0.0, 1.0),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ProcessingStatusRecord {
    document_id: Uuid,
    status: String,
    stage: String,
    progress: i64,
    message: String,
}

impl ProcessingStatusRecord {
    pub fn to_domain(self) -> PortResult<ProcessingStatus> {
        Ok(ProcessingStatus {
            document_id: self.document_id,
            status: status_from_wire(&self.status)?,
            stage: self.stage,
            progress: percent(self.progress),
            message: self.message,
        })
    }
}

/// Body of `GET /documents/{id}/search`: `{"results": [...]}`.
#[derive(Debug, Deserialize)]
pub struct TextMatchesRecord {
    #[serde(default)]
    results: Vec<TextMatchRecord>,
}

#[derive(Debug, Deserialize)]
pub struct TextMatchRecord {
    position: usize,
    context: String,
    #[serde(default)]
    relevance_score: Option<f64>,
}

impl TextMatchesRecord {
    pub fn to_domain(self) -> Vec<TextMatch> {
        self.results
            .into_iter()
            .map(|m| TextMatch {
                position: m.position,
                context: m.context,
                relevance_score: m.relevance_score.unwrap_or(1.0),
            })
            .collect()
    }
}

/// Error body of a failed request, e.g. `{"detail": "Document not found"}`.
/// Validation failures carry a list of problems instead of a string.
#[derive(Debug, Deserialize)]
pub struct ErrorRecord {
    detail: serde_json::Value,
}

impl ErrorRecord {
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
