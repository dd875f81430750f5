//! services/client/src/upload/tracker.rs
//!
//! The transient list of in-flight and recently finished uploads. It lives apart
//! from the document store: an entry only hands its document to the store once
//! the transport call resolves.

use std::sync::Arc;
use summarizer_core::domain::DocumentStatus;
use tokio::sync::watch;
use uuid::Uuid;

/// One file moving through the upload pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadEntry {
    pub id: Uuid,
    pub file_name: String,
    pub file_size: u64,
    /// `0..=100`, never decreasing.
    pub progress: u8,
    pub status: DocumentStatus,
    pub error: Option<String>,
    /// Set once the backend has accepted the file.
    pub document_id: Option<Uuid>,
}

impl UploadEntry {
    pub fn new(file_name: impl Into<String>, file_size: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            file_size,
            progress: 0,
            status: DocumentStatus::Uploading,
            error: None,
            document_id: None,
        }
    }
}

/// Cloneable handle to the transient upload list. Updates are published to
/// subscribers; updates that change nothing are not.
#[derive(Clone)]
pub struct UploadTracker {
    entries: Arc<watch::Sender<Vec<UploadEntry>>>,
}

impl Default for UploadTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self {
            entries: Arc::new(tx),
        }
    }

    pub fn snapshot(&self) -> Vec<UploadEntry> {
        self.entries.borrow().clone()
    }

    pub fn entry(&self, id: Uuid) -> Option<UploadEntry> {
        self.entries.borrow().iter().find(|e| e.id == id).cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<UploadEntry>> {
        self.entries.subscribe()
    }

    pub fn insert(&self, entry: UploadEntry) {
        self.entries.send_modify(|entries| entries.push(entry));
    }

    /// Applies `f` to the entry with `id`; `f` reports whether it changed anything.
    fn modify(&self, id: Uuid, f: impl FnOnce(&mut UploadEntry) -> bool) -> bool {
        self.entries.send_if_modified(|entries| match entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => f(entry),
            None => false,
        })
    }

    fn advance(&self, id: Uuid, next: DocumentStatus, f: impl FnOnce(&mut UploadEntry)) -> bool {
        self.modify(id, |entry| {
            if entry.status == next || !entry.status.can_advance_to(next) {
                return false;
            }
            entry.status = next;
            f(entry);
            true
        })
    }

    /// Records transfer progress. Ignored once the entry left `Uploading`, and
    /// never moves the percentage backward.
    pub fn report_progress(&self, id: Uuid, percent: u8) -> bool {
        let percent = percent.min(100);
        self.modify(id, |entry| {
            if entry.status != DocumentStatus::Uploading || percent <= entry.progress {
                return false;
            }
            entry.progress = percent;
            true
        })
    }

    pub fn mark_processing(&self, id: Uuid, document_id: Uuid) -> bool {
        self.advance(id, DocumentStatus::Processing, |entry| {
            entry.progress = 100;
            entry.document_id = Some(document_id);
        })
    }

    pub fn mark_completed(&self, id: Uuid) -> bool {
        self.advance(id, DocumentStatus::Completed, |_| {})
    }

    pub fn mark_failed(&self, id: Uuid, message: impl Into<String>) -> bool {
        let message = message.into();
        self.advance(id, DocumentStatus::Error, |entry| entry.error = Some(message))
    }

    pub fn remove(&self, id: Uuid) -> bool {
        self.entries.send_if_modified(|entries| {
            let before = entries.len();
            entries.retain(|e| e.id != id);
            entries.len() != before
        })
    }
}
