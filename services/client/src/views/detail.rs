//! services/client/src/views/detail.rs
//!
//! Controller behind the document detail page: the document itself, its summary,
//! its processing status and the PDF bytes for the external viewer.

use bytes::Bytes;
use std::sync::Arc;
use summarizer_core::domain::{Document, DocumentPatch, ProcessingStatus, Summary, TextMatch};
use summarizer_core::ports::{DocumentApi, PortError, PortResult};
use summarizer_core::store::DocumentStore;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loaded {
        document: Document,
        /// Set when the summary could not be fetched for a reason other than
        /// "not generated yet"; shown as a notice next to the document.
        summary_error: Option<PortError>,
    },
    /// Page-level "not found"; the page offers navigation back to the list.
    NotFound,
}

pub struct DocumentDetailView {
    api: Arc<dyn DocumentApi>,
    store: DocumentStore,
}

impl DocumentDetailView {
    pub fn new(api: Arc<dyn DocumentApi>, store: DocumentStore) -> Self {
        Self { api, store }
    }

    /// Makes `id` the current document and loads its summary if one exists.
    pub async fn open(&self, id: Uuid) -> PortResult<DetailState> {
        let document = match self.api.get_document(id).await {
            Ok(document) => document,
            Err(PortError::NotFound(_)) => {
                info!("Document {} does not exist", id);
                self.close();
                return Ok(DetailState::NotFound);
            }
            Err(e) => {
                error!("Failed to load document {}: {}", id, e);
                return Err(e);
            }
        };

        self.store.set_current_document(Some(document.clone()));
        let (summary, summary_error) = match document.summary.clone() {
            Some(summary) => (Some(summary), None),
            None => match self.fetch_summary(id).await {
                Ok(summary) => (summary, None),
                Err(e) => (None, Some(e)),
            },
        };
        self.store.set_current_summary(summary);

        Ok(DetailState::Loaded {
            document,
            summary_error,
        })
    }

    /// `Ok(None)` when the summary has not been generated yet.
    async fn fetch_summary(&self, id: Uuid) -> PortResult<Option<Summary>> {
        match self.api.get_summary(id).await {
            Ok(summary) => Ok(Some(summary)),
            Err(PortError::NotFound(_)) => Ok(None),
            Err(e) => {
                warn!("Could not load summary for {}: {}", id, e);
                Err(e)
            }
        }
    }

    pub async fn generate_summary(&self, id: Uuid) -> PortResult<Summary> {
        info!("Generating summary for {}", id);
        let summary = self.api.generate_summary(id).await.map_err(|e| {
            error!("Summary generation for {} failed: {}", id, e);
            e
        })?;

        self.store.set_current_summary(Some(summary.clone()));
        self.store.update_document(
            id,
            DocumentPatch {
                summary: Some(summary.clone()),
                ..DocumentPatch::default()
            },
        );
        Ok(summary)
    }

    /// Pulls the backend's processing status into the store and onto the document.
    pub async fn refresh_status(&self, id: Uuid) -> PortResult<ProcessingStatus> {
        let status = self.api.get_processing_status(id).await?;
        self.store.set_processing_status(Some(status.clone()));
        self.store.update_document(
            id,
            DocumentPatch {
                status: Some(status.status),
                processing_stage: Some(status.stage.clone()),
                processing_progress: Some(status.progress),
                ..DocumentPatch::default()
            },
        );
        Ok(status)
    }

    /// Asks the backend to process the document again and moves the local copy
    /// back to `processing`. Used to recover documents that ended in `error`.
    pub async fn reprocess(&self, id: Uuid) -> PortResult<()> {
        info!("Requesting re-processing of {}", id);
        if let Err(e) = self.api.reprocess_document(id).await {
            error!("Re-processing request for {} failed: {}", id, e);
            return Err(e);
        }
        self.store.restart_processing(id);
        Ok(())
    }

    /// Finds `query` in the document's extracted text.
    pub async fn search_text(&self, id: Uuid, query: &str) -> PortResult<Vec<TextMatch>> {
        let matches = self.api.search_in_document(id, query).await?;
        info!("Found {} matches for '{}' in {}", matches.len(), query, id);
        Ok(matches)
    }

    /// The PDF content, for the embedded viewer.
    pub async fn load_file(&self, id: Uuid) -> PortResult<Bytes> {
        self.api.get_document_file(id).await
    }

    /// Clears everything the detail page put into the store.
    pub fn close(&self) {
        self.store.set_current_document(None);
        self.store.set_current_summary(None);
        self.store.set_processing_status(None);
    }
}
