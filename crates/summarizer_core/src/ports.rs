//! crates/summarizer_core/src/ports.rs
//!
//! Defines the service contract (trait) for talking to the summarization backend.
//! The trait forms the boundary of the hexagonal architecture, allowing the store,
//! the upload pipeline and the views to be independent of the HTTP implementation.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Document, DocumentPage, ProcessingStatus, Summary, TextMatch, UploadFile};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error kinds surfaced by backend operations.
/// This abstracts away the specific errors from the transport (e.g., reqwest, hyper).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// The request was rejected as invalid (bad file type, file too large, ...).
    #[error("Validation failed: {0}")]
    Validation(String),
    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Network(String),
    /// The backend answered with a failure.
    #[error("Server error: {0}")]
    Server(String),
    #[error("Item not found: {0}")]
    NotFound(String),
}

impl PortError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound(_))
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Receives upload progress as a percentage in `0..=100`.
pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DocumentApi: Send + Sync {
    // --- Documents ---
    async fn list_documents(&self, page: u32, page_size: u32) -> PortResult<DocumentPage>;

    async fn get_document(&self, document_id: Uuid) -> PortResult<Document>;

    /// Uploads one file. `on_progress` is invoked with non-decreasing
    /// percentages while the bytes are sent.
    async fn upload_document(
        &self,
        file: UploadFile,
        on_progress: ProgressCallback,
    ) -> PortResult<Document>;

    async fn delete_document(&self, document_id: Uuid) -> PortResult<()>;

    /// Raw PDF bytes, handed to the external viewer.
    async fn get_document_file(&self, document_id: Uuid) -> PortResult<Bytes>;

    async fn get_processing_status(&self, document_id: Uuid) -> PortResult<ProcessingStatus>;

    async fn search_documents(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> PortResult<DocumentPage>;

    /// Occurrences of `query` in one document's text, case-insensitive.
    async fn search_in_document(&self, document_id: Uuid, query: &str) -> PortResult<Vec<TextMatch>>;

    /// Asks the backend to run text extraction again. Returns once the request
    /// is accepted; the work itself happens in the background.
    async fn reprocess_document(&self, document_id: Uuid) -> PortResult<()>;

    // --- Summaries ---
    /// Fails with `NotFound` while no summary has been generated.
    async fn get_summary(&self, document_id: Uuid) -> PortResult<Summary>;

    /// Long-running; the backend generates the summary before answering.
    async fn generate_summary(&self, document_id: Uuid) -> PortResult<Summary>;
}
