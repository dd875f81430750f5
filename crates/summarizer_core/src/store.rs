//! crates/summarizer_core/src/store.rs
//!
//! The document store: the canonical document collection plus the "current"
//! document, summary and processing status shown by the detail view.
//!
//! `StoreState` holds the data and the pure mutation rules. `DocumentStore` is the
//! injectable handle shared by views and the upload pipeline; every mutation is
//! applied atomically and published as a complete snapshot to subscribers.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{Document, DocumentPatch, DocumentStatus, ProcessingStatus, Summary};

//=========================================================================================
// StoreState (Plain Data + Mutation Rules)
//=========================================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    /// Newest first.
    pub documents: Vec<Document>,
    pub current_document: Option<Document>,
    pub current_summary: Option<Summary>,
    pub processing_status: Option<ProcessingStatus>,
    pub is_loading: bool,
    /// Only set by list-loading failures.
    pub error: Option<String>,
}

impl StoreState {
    pub fn set_documents(&mut self, documents: Vec<Document>) {
        self.documents = documents;
    }

    /// Prepends a new document. A document whose id is already in the
    /// collection replaces the existing entry in place instead.
    pub fn add_document(&mut self, document: Document) {
        if self.current_document.as_ref().is_some_and(|c| c.id == document.id) {
            self.current_document = Some(document.clone());
        }
        match self.documents.iter_mut().find(|d| d.id == document.id) {
            Some(existing) => *existing = document,
            None => self.documents.insert(0, document),
        }
    }

    /// Merges `patch` into the document with `id`. Returns `false` if no such
    /// document exists.
    pub fn update_document(&mut self, id: Uuid, patch: DocumentPatch) -> bool {
        let Some(doc) = self.documents.iter_mut().find(|d| d.id == id) else {
            return false;
        };

        let from = doc.status;
        let requested = patch.status;
        if !patch.apply_to(doc) {
            warn!(
                "Ignoring backward status change for document {}: {} -> {:?}",
                id, from, requested
            );
        }

        if self.current_document.as_ref().is_some_and(|c| c.id == id) {
            self.current_document = Some(doc.clone());
        }
        true
    }

    /// Puts the document back into `processing` after the backend accepted a
    /// re-processing request. This is the only way out of `error`; the stage and
    /// progress of the previous run are discarded. Returns `false` if neither the
    /// collection nor the current document has this id.
    pub fn restart_processing(&mut self, id: Uuid) -> bool {
        fn restart(doc: &mut Document) {
            doc.status = DocumentStatus::Processing;
            doc.processing_stage = None;
            doc.processing_progress = None;
            doc.processed_at = None;
        }

        let mut found = false;
        if let Some(doc) = self.documents.iter_mut().find(|d| d.id == id) {
            restart(doc);
            found = true;
        }
        if let Some(current) = self.current_document.as_mut().filter(|c| c.id == id) {
            restart(current);
            found = true;
        }
        if found && self.processing_status.as_ref().is_some_and(|p| p.document_id == id) {
            self.processing_status = None;
        }
        found
    }

    /// Removes the document and every "current" reference pointing at it.
    pub fn remove_document(&mut self, id: Uuid) -> bool {
        let before = self.documents.len();
        self.documents.retain(|d| d.id != id);

        if self.current_document.as_ref().is_some_and(|d| d.id == id) {
            self.current_document = None;
        }
        if self.current_summary.as_ref().is_some_and(|s| s.document_id == id) {
            self.current_summary = None;
        }
        if self.processing_status.as_ref().is_some_and(|p| p.document_id == id) {
            self.processing_status = None;
        }
        self.documents.len() != before
    }

    pub fn set_current_document(&mut self, document: Option<Document>) {
        self.current_document = document;
    }

    pub fn set_current_summary(&mut self, summary: Option<Summary>) {
        self.current_summary = summary;
    }

    pub fn set_processing_status(&mut self, status: Option<ProcessingStatus>) {
        self.processing_status = status;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

//=========================================================================================
// DocumentStore (Shared Handle)
//=========================================================================================

/// Cloneable handle to one store. Clones share the same state.
#[derive(Clone)]
pub struct DocumentStore {
    state: Arc<watch::Sender<StoreState>>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StoreState::default());
        Self { state: Arc::new(tx) }
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    /// Reads from the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&StoreState) -> R) -> R {
        f(&self.state.borrow())
    }

    /// A receiver that is notified after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    fn mutate<R: Default>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let mut out = R::default();
        self.state.send_modify(|state| out = f(state));
        out
    }

    pub fn set_documents(&self, documents: Vec<Document>) {
        debug!("Replacing document collection ({} items)", documents.len());
        self.mutate(|s| s.set_documents(documents));
    }

    pub fn add_document(&self, document: Document) {
        debug!("Adding document {}", document.id);
        self.mutate(|s| s.add_document(document));
    }

    pub fn update_document(&self, id: Uuid, patch: DocumentPatch) -> bool {
        self.mutate(|s| s.update_document(id, patch))
    }

    pub fn restart_processing(&self, id: Uuid) -> bool {
        debug!("Restarting processing of document {}", id);
        self.mutate(|s| s.restart_processing(id))
    }

    pub fn remove_document(&self, id: Uuid) -> bool {
        debug!("Removing document {}", id);
        self.mutate(|s| s.remove_document(id))
    }

    pub fn set_current_document(&self, document: Option<Document>) {
        self.mutate(|s| s.set_current_document(document));
    }

    pub fn set_current_summary(&self, summary: Option<Summary>) {
        self.mutate(|s| s.set_current_summary(summary));
    }

    pub fn set_processing_status(&self, status: Option<ProcessingStatus>) {
        self.mutate(|s| s.set_processing_status(status));
    }

    pub fn set_loading(&self, loading: bool) {
        self.mutate(|s| s.set_loading(loading));
    }

    pub fn set_error(&self, error: Option<String>) {
        self.mutate(|s| s.set_error(error));
    }

    pub fn clear_error(&self) {
        self.mutate(|s| s.clear_error());
    }
}
