//! In-memory stand-in for the summarization backend, shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use summarizer_core::domain::{
    Document, DocumentPage, DocumentStatus, ProcessingStatus, Summary, TextMatch, UploadFile,
};
use summarizer_core::ports::{DocumentApi, PortError, PortResult, ProgressCallback};
use uuid::Uuid;

pub fn document(name: &str, uploaded_at: DateTime<Utc>, status: DocumentStatus) -> Document {
    Document {
        id: Uuid::new_v4(),
        filename: format!("{}.pdf", Uuid::new_v4()),
        original_name: name.to_string(),
        file_size: 4096,
        uploaded_at,
        status,
        summary: None,
        highlights: None,
        page_count: None,
        extracted_text: None,
        processing_stage: None,
        processing_progress: None,
        processed_at: None,
    }
}

pub fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
}

pub fn summary_for(document_id: Uuid) -> Summary {
    Summary {
        id: Uuid::new_v4(),
        document_id,
        content: "The document explains the thing.".to_string(),
        key_points: vec!["First point".to_string(), "Second point".to_string()],
        created_at: Utc::now(),
        processing_time: 2.5,
        model_used: Some("test-model".to_string()),
    }
}

pub fn pdf(name: &str, size: usize) -> UploadFile {
    UploadFile::new(name, Some("application/pdf".to_string()), Bytes::from(vec![b'%'; size]))
}

#[derive(Default)]
struct FakeState {
    documents: Vec<Document>,
    summaries: HashMap<Uuid, Summary>,
    statuses: HashMap<Uuid, ProcessingStatus>,
    failing_uploads: HashSet<String>,
    fail_list: bool,
    fail_delete: bool,
    fail_generate: bool,
    summary_failure: Option<PortError>,
    fail_reprocess: bool,
    uploaded_status: Option<DocumentStatus>,
    events: Vec<String>,
}

/// Records every call as an event string and serves canned data.
#[derive(Clone, Default)]
pub struct FakeApi {
    state: Arc<Mutex<FakeState>>,
    /// Simulated transfer time per upload; runs on the tokio clock.
    pub upload_time: Duration,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_upload_time(upload_time: Duration) -> Self {
        Self {
            upload_time,
            ..Self::default()
        }
    }

    pub fn with_documents(self, documents: Vec<Document>) -> Self {
        self.state.lock().unwrap().documents = documents;
        self
    }

    pub fn add_summary(&self, summary: Summary) {
        self.state.lock().unwrap().summaries.insert(summary.document_id, summary);
    }

    pub fn set_status(&self, status: ProcessingStatus) {
        self.state.lock().unwrap().statuses.insert(status.document_id, status);
    }

    pub fn fail_upload_of(&self, name: &str) {
        self.state.lock().unwrap().failing_uploads.insert(name.to_string());
    }

    pub fn fail_list(&self, fail: bool) {
        self.state.lock().unwrap().fail_list = fail;
    }

    pub fn fail_delete(&self, fail: bool) {
        self.state.lock().unwrap().fail_delete = fail;
    }

    pub fn fail_generate(&self, fail: bool) {
        self.state.lock().unwrap().fail_generate = fail;
    }

    /// Makes `get_summary` fail with `error` instead of answering.
    pub fn fail_summary_with(&self, error: Option<PortError>) {
        self.state.lock().unwrap().summary_failure = error;
    }

    pub fn fail_reprocess(&self, fail: bool) {
        self.state.lock().unwrap().fail_reprocess = fail;
    }

    /// Status of the records returned by `upload_document`; `processing` by default.
    pub fn upload_returns_status(&self, status: DocumentStatus) {
        self.state.lock().unwrap().uploaded_status = Some(status);
    }

    pub fn events(&self) -> Vec<String> {
        self.state.lock().unwrap().events.clone()
    }

    fn record(&self, event: String) {
        self.state.lock().unwrap().events.push(event);
    }

    pub fn arc(&self) -> Arc<dyn DocumentApi> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl DocumentApi for FakeApi {
    async fn list_documents(&self, page: u32, page_size: u32) -> PortResult<DocumentPage> {
        self.record("list".to_string());
        let state = self.state.lock().unwrap();
        if state.fail_list {
            return Err(PortError::Network("connection refused".to_string()));
        }
        let total = state.documents.len() as u64;
        Ok(DocumentPage {
            items: state.documents.clone(),
            total,
            page,
            page_size,
            total_pages: ((total + page_size as u64 - 1) / page_size as u64) as u32,
        })
    }

    async fn get_document(&self, document_id: Uuid) -> PortResult<Document> {
        self.record(format!("get {}", document_id));
        let state = self.state.lock().unwrap();
        state
            .documents
            .iter()
            .find(|d| d.id == document_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound("Document not found".to_string()))
    }

    async fn upload_document(
        &self,
        file: UploadFile,
        on_progress: ProgressCallback,
    ) -> PortResult<Document> {
        self.record(format!("start {}", file.name));

        for percent in [25u8, 50, 75, 100] {
            tokio::time::sleep(self.upload_time / 4).await;
            on_progress(percent);
        }

        let failing = self.state.lock().unwrap().failing_uploads.contains(&file.name);
        self.record(format!("end {}", file.name));
        if failing {
            return Err(PortError::Server(format!("Upload failed: {}", file.name)));
        }

        let status = self
            .state
            .lock()
            .unwrap()
            .uploaded_status
            .unwrap_or(DocumentStatus::Processing);
        let mut doc = document(&file.name, Utc::now(), status);
        doc.file_size = file.size();
        self.state.lock().unwrap().documents.insert(0, doc.clone());
        Ok(doc)
    }

    async fn delete_document(&self, document_id: Uuid) -> PortResult<()> {
        self.record(format!("delete {}", document_id));
        let mut state = self.state.lock().unwrap();
        if state.fail_delete {
            return Err(PortError::Server("Delete failed".to_string()));
        }
        state.documents.retain(|d| d.id != document_id);
        Ok(())
    }

    async fn get_document_file(&self, document_id: Uuid) -> PortResult<Bytes> {
        self.record(format!("file {}", document_id));
        Ok(Bytes::from_static(b"%PDF-1.7"))
    }

    async fn get_processing_status(&self, document_id: Uuid) -> PortResult<ProcessingStatus> {
        self.state
            .lock()
            .unwrap()
            .statuses
            .get(&document_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound("Document not found".to_string()))
    }

    async fn search_documents(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> PortResult<DocumentPage> {
        let state = self.state.lock().unwrap();
        let items: Vec<Document> = state
            .documents
            .iter()
            .filter(|d| d.original_name.contains(query))
            .cloned()
            .collect();
        Ok(DocumentPage {
            total: items.len() as u64,
            items,
            page,
            page_size,
            total_pages: 1,
        })
    }

    async fn search_in_document(&self, document_id: Uuid, query: &str) -> PortResult<Vec<TextMatch>> {
        let state = self.state.lock().unwrap();
        let doc = state
            .documents
            .iter()
            .find(|d| d.id == document_id)
            .ok_or_else(|| PortError::NotFound("Document not found".to_string()))?;
        let text = doc.extracted_text.clone().unwrap_or_default();
        Ok(text
            .match_indices(query)
            .map(|(position, _)| TextMatch {
                position,
                context: text.clone(),
                relevance_score: 1.0,
            })
            .collect())
    }

    async fn reprocess_document(&self, document_id: Uuid) -> PortResult<()> {
        self.record(format!("reprocess {}", document_id));
        let mut state = self.state.lock().unwrap();
        if state.fail_reprocess {
            return Err(PortError::Network("connection reset".to_string()));
        }
        match state.documents.iter_mut().find(|d| d.id == document_id) {
            Some(doc) => {
                doc.status = DocumentStatus::Processing;
                Ok(())
            }
            None => Err(PortError::NotFound("Document not found".to_string())),
        }
    }

    async fn get_summary(&self, document_id: Uuid) -> PortResult<Summary> {
        let state = self.state.lock().unwrap();
        if let Some(error) = state.summary_failure.clone() {
            return Err(error);
        }
        state
            .summaries
            .get(&document_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound("Summary not found".to_string()))
    }

    async fn generate_summary(&self, document_id: Uuid) -> PortResult<Summary> {
        let mut state = self.state.lock().unwrap();
        if state.fail_generate {
            return Err(PortError::Server("Summary generation failed".to_string()));
        }
        let summary = summary_for(document_id);
        state.summaries.insert(document_id, summary.clone());
        Ok(summary)
    }
}
