//! services/client/src/adapters/http.rs
//!
//! This module contains the HTTP adapter, which is the concrete implementation
//! of the `DocumentApi` port from the `core` crate. It talks to the summarization
//! backend's REST API using `reqwest`.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::{multipart, Body, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use summarizer_core::domain::{
    Document, DocumentPage, DocumentPatch, DocumentStatus, ProcessingStatus, Summary, TextMatch,
    UploadFile,
};
use summarizer_core::ports::{DocumentApi, PortError, PortResult, ProgressCallback};
use tracing::{debug, error};
use uuid::Uuid;

use crate::adapters::records::{
    DocumentRecord, ErrorRecord, PageRecord, ProcessingStatusRecord, SummaryRecord,
    TextMatchesRecord,
};
use crate::config::Config;
use crate::error::ClientError;
use crate::upload::validation::PDF_MIME;

/// Upload bodies are streamed in chunks of this size; progress is reported per chunk.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An HTTP adapter that implements the `DocumentApi` port.
#[derive(Clone)]
pub struct HttpDocumentApi {
    client: Client,
    base_url: String,
}

impl HttpDocumentApi {
    /// Creates a new `HttpDocumentApi` rooted at `base_url` (e.g. `http://host:8000/api`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(config.api_base_url.clone(), config.request_timeout)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends the request and turns non-success statuses into `PortError`s.
    async fn send(&self, request: RequestBuilder) -> PortResult<Response> {
        let response = request.send().await.map_err(transport_error)?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(status_error(response).await)
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> PortResult<T> {
        let response = self.send(request).await?;
        response.json::<T>().await.map_err(transport_error)
    }
}

//=========================================================================================
// Error Mapping
//=========================================================================================

fn transport_error(e: reqwest::Error) -> PortError {
    if e.is_decode() {
        PortError::Server(format!("Invalid response body: {}", e))
    } else {
        PortError::Network(e.to_string())
    }
}

async fn status_error(response: Response) -> PortError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorRecord>(&body)
        .map(|record| record.message())
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                status.to_string()
            } else {
                body
            }
        });
    error_for_status(status, message)
}

fn error_for_status(status: StatusCode, message: String) -> PortError {
    match status {
        StatusCode::NOT_FOUND => PortError::NotFound(message),
        StatusCode::BAD_REQUEST
        | StatusCode::PAYLOAD_TOO_LARGE
        | StatusCode::UNSUPPORTED_MEDIA_TYPE
        | StatusCode::UNPROCESSABLE_ENTITY => PortError::Validation(message),
        _ => PortError::Server(message),
    }
}

fn percent_of(sent: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((sent as u64 * 100) / total as u64).min(100) as u8
}

fn into_chunks(data: &Bytes) -> Vec<Bytes> {
    (0..data.len())
        .step_by(UPLOAD_CHUNK_SIZE)
        .map(|start| data.slice(start..(start + UPLOAD_CHUNK_SIZE).min(data.len())))
        .collect()
}

//=========================================================================================
// Port Implementation
//=========================================================================================

#[async_trait]
impl DocumentApi for HttpDocumentApi {
    async fn list_documents(&self, page: u32, page_size: u32) -> PortResult<DocumentPage> {
        let request = self
            .client
            .get(self.url("/documents"))
            .query(&[("page", page), ("page_size", page_size)]);
        let record: PageRecord<DocumentRecord> = self.fetch(request).await?;
        record.to_domain()
    }

    async fn get_document(&self, document_id: Uuid) -> PortResult<Document> {
        let request = self.client.get(self.url(&format!("/documents/{}", document_id)));
        let record: DocumentRecord = self.fetch(request).await?;
        record.to_domain()
    }

    async fn upload_document(
        &self,
        file: UploadFile,
        on_progress: ProgressCallback,
    ) -> PortResult<Document> {
        let total = file.data.len();
        let content_type = file.content_type.clone().unwrap_or_else(|| PDF_MIME.to_string());
        debug!("Streaming {} ({} bytes) to the backend", file.name, total);

        let progress = on_progress.clone();
        let mut sent = 0usize;
        let body = futures::stream::iter(into_chunks(&file.data)).map(move |chunk| {
            sent += chunk.len();
            progress(percent_of(sent, total));
            Ok::<Bytes, std::io::Error>(chunk)
        });

        let part = multipart::Part::stream_with_length(Body::wrap_stream(body), total as u64)
            .file_name(file.name.clone())
            .mime_str(&content_type)
            .map_err(|e| PortError::Validation(format!("Invalid content type: {}", e)))?;
        let form = multipart::Form::new().part("file", part);

        let request = self.client.post(self.url("/documents/upload")).multipart(form);
        let record: DocumentRecord = self.fetch(request).await?;
        on_progress(100);

        // The backend answers with the row it just stored, still `uploading`.
        let mut document = record.to_domain()?;
        DocumentPatch::status(DocumentStatus::Processing).apply_to(&mut document);
        Ok(document)
    }

    async fn delete_document(&self, document_id: Uuid) -> PortResult<()> {
        let request = self.client.delete(self.url(&format!("/documents/{}", document_id)));
        self.send(request).await?;
        Ok(())
    }

    async fn get_document_file(&self, document_id: Uuid) -> PortResult<Bytes> {
        let request = self
            .client
            .get(self.url(&format!("/documents/{}/file", document_id)));
        let response = self.send(request).await?;
        response.bytes().await.map_err(transport_error)
    }

    async fn get_processing_status(&self, document_id: Uuid) -> PortResult<ProcessingStatus> {
        let request = self
            .client
            .get(self.url(&format!("/documents/{}/status", document_id)));
        let record: ProcessingStatusRecord = self.fetch(request).await?;
        record.to_domain()
    }

    async fn search_documents(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> PortResult<DocumentPage> {
        let request = self.client.get(self.url("/search")).query(&[
            ("q", query.to_string()),
            ("page", page.to_string()),
            ("page_size", page_size.to_string()),
        ]);
        let record: PageRecord<DocumentRecord> = self.fetch(request).await?;
        record.to_domain()
    }

    async fn search_in_document(&self, document_id: Uuid, query: &str) -> PortResult<Vec<TextMatch>> {
        let request = self
            .client
            .get(self.url(&format!("/documents/{}/search", document_id)))
            .query(&[("q", query)]);
        let record: TextMatchesRecord = self.fetch(request).await?;
        Ok(record.to_domain())
    }

    async fn reprocess_document(&self, document_id: Uuid) -> PortResult<()> {
        let request = self
            .client
            .post(self.url(&format!("/documents/{}/process", document_id)));
        self.send(request).await?;
        Ok(())
    }

    async fn get_summary(&self, document_id: Uuid) -> PortResult<Summary> {
        let request = self
            .client
            .get(self.url(&format!("/documents/{}/summary", document_id)));
        let record: SummaryRecord = self.fetch(request).await?;
        Ok(record.to_domain())
    }

    async fn generate_summary(&self, document_id: Uuid) -> PortResult<Summary> {
        let request = self
            .client
            .post(self.url(&format!("/documents/{}/summarize", document_id)));
        let record: SummaryRecord = self.fetch(request).await.map_err(|e| {
            error!("Summary generation for {} failed: {}", document_id, e);
            e
        })?;
        Ok(record.to_domain())
    }
}
