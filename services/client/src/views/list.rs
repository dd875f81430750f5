//! services/client/src/views/list.rs
//!
//! Controller behind the document list: loads the collection into the store,
//! deletes documents and exposes the sorted/filtered view of the collection.

use std::sync::Arc;
use summarizer_core::domain::Document;
use summarizer_core::listing::DocumentQuery;
use summarizer_core::ports::{DocumentApi, PortResult};
use summarizer_core::store::DocumentStore;
use tracing::{error, info};
use uuid::Uuid;

/// Shown in place of the list when loading fails; the user may retry.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load documents";

pub struct DocumentListView {
    api: Arc<dyn DocumentApi>,
    store: DocumentStore,
    page: u32,
    page_size: u32,
    query: DocumentQuery,
}

impl DocumentListView {
    pub fn new(api: Arc<dyn DocumentApi>, store: DocumentStore, page_size: u32) -> Self {
        Self {
            api,
            store,
            page: 1,
            page_size,
            query: DocumentQuery::default(),
        }
    }

    /// Selects the page fetched by the next `load`. Pages are 1-based.
    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn query(&self) -> &DocumentQuery {
        &self.query
    }

    pub fn set_query(&mut self, query: DocumentQuery) {
        self.query = query;
    }

    /// Fetches the current page and replaces the collection. On failure the
    /// collection is left alone and the store's error flag carries a generic
    /// message; calling `load` again is the retry.
    pub async fn load(&self) -> PortResult<()> {
        self.store.set_loading(true);
        self.store.clear_error();

        let result = self.api.list_documents(self.page, self.page_size).await;
        match &result {
            Ok(page) => {
                info!("Loaded {} of {} documents", page.items.len(), page.total);
                self.store.set_documents(page.items.clone());
            }
            Err(e) => {
                error!("Failed to load documents: {}", e);
                self.store.set_error(Some(LOAD_FAILED_MESSAGE.to_string()));
            }
        }

        self.store.set_loading(false);
        result.map(|_| ())
    }

    /// Replaces the collection with the backend's search results for `query`.
    pub async fn search(&self, query: &str) -> PortResult<()> {
        self.store.set_loading(true);
        self.store.clear_error();

        let result = self
            .api
            .search_documents(query, self.page, self.page_size)
            .await;
        match &result {
            Ok(page) => self.store.set_documents(page.items.clone()),
            Err(e) => {
                error!("Search for '{}' failed: {}", query, e);
                self.store.set_error(Some(LOAD_FAILED_MESSAGE.to_string()));
            }
        }

        self.store.set_loading(false);
        result.map(|_| ())
    }

    /// Deletes on the backend first; the local entry is only removed once the
    /// backend confirmed, so a failure leaves the list untouched.
    pub async fn delete(&self, id: Uuid) -> PortResult<()> {
        if let Err(e) = self.api.delete_document(id).await {
            error!("Failed to delete document {}: {}", id, e);
            return Err(e);
        }
        info!("Deleted document {}", id);
        self.store.remove_document(id);
        Ok(())
    }

    /// The documents to render, after sorting, filtering and name search.
    pub fn visible(&self) -> Vec<Document> {
        self.store
            .read(|state| self.query.apply(&state.documents).into_iter().cloned().collect())
    }
}
