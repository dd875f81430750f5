//! services/client/src/views/card.rs
//!
//! Presentation model for one document card in the list.

use summarizer_core::domain::Document;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentCard {
    pub id: Uuid,
    pub title: String,
    pub size_label: String,
    pub status_label: &'static str,
    pub uploaded_label: String,
    pub page_count: Option<u32>,
    pub highlight_count: usize,
    pub has_summary: bool,
}

impl DocumentCard {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id,
            title: doc.original_name.clone(),
            size_label: format_file_size(doc.file_size),
            status_label: doc.status.as_str(),
            uploaded_label: doc.uploaded_at.format("%b %-d, %Y").to_string(),
            page_count: doc.page_count,
            highlight_count: doc.highlights.as_ref().map_or(0, Vec::len),
            has_summary: doc.summary.is_some(),
        }
    }
}

/// Human-readable size in binary units, at most two decimals, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}
