mod common;

use client_lib::config::UploadPolicy;
use client_lib::upload::{RejectReason, UploadEntry, UploadPipeline, UploadTracker};
use common::{pdf, FakeApi};
use std::time::Duration;
use summarizer_core::domain::{DocumentStatus, UploadFile};
use summarizer_core::store::DocumentStore;
use tokio::time::Instant;
use uuid::Uuid;

fn policy() -> UploadPolicy {
    UploadPolicy {
        max_file_size: 1024,
        ..UploadPolicy::default()
    }
}

async fn wait_for_status(tracker: &UploadTracker, id: Uuid, status: DocumentStatus) -> UploadEntry {
    let mut rx = tracker.subscribe();
    let entries = rx
        .wait_for(|entries| entries.iter().any(|e| e.id == id && e.status == status))
        .await
        .unwrap();
    entries.iter().find(|e| e.id == id).cloned().unwrap()
}

async fn wait_for_removal(tracker: &UploadTracker, id: Uuid) {
    let mut rx = tracker.subscribe();
    rx.wait_for(|entries| entries.iter().all(|e| e.id != id))
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn invalid_files_never_enter_the_pipeline() {
    let api = FakeApi::new();
    let pipeline = UploadPipeline::new(api.arc(), DocumentStore::new(), policy());

    let outcome = pipeline.submit(vec![
        pdf("one.pdf", 100),
        pdf("two.pdf", 100),
        pdf("huge.pdf", 2048),
        pdf("three.pdf", 100),
    ]);

    assert_eq!(outcome.accepted.len(), 3);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].file_name, "huge.pdf");
    assert!(matches!(outcome.rejected[0].reason, RejectReason::TooLarge { .. }));

    let entries = pipeline.tracker().snapshot();
    let names: Vec<&str> = entries.iter().map(|e| e.file_name.as_str()).collect();
    assert_eq!(names, vec!["one.pdf", "two.pdf", "three.pdf"]);
    assert!(entries
        .iter()
        .all(|e| e.status == DocumentStatus::Uploading && e.progress == 0));
}

#[tokio::test(start_paused = true)]
async fn non_pdf_files_are_rejected_with_a_notice() {
    let api = FakeApi::new();
    let pipeline = UploadPipeline::new(api.arc(), DocumentStore::new(), policy());

    let notes = UploadFile::new("notes.txt", Some("text/plain".to_string()), "hi".into());
    let outcome = pipeline.submit(vec![notes]);

    assert!(outcome.accepted.is_empty());
    assert_eq!(outcome.rejected[0].to_string(), "notes.txt: Only PDF files are allowed");
    assert!(pipeline.tracker().snapshot().is_empty());
    assert!(api.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn uploads_run_one_at_a_time_in_drop_order() {
    let api = FakeApi::with_upload_time(Duration::from_secs(2));
    let pipeline = UploadPipeline::new(api.arc(), DocumentStore::new(), policy());

    let outcome = pipeline.submit(vec![pdf("a.pdf", 10), pdf("b.pdf", 10), pdf("c.pdf", 10)]);
    let last = *outcome.accepted.last().unwrap();
    wait_for_status(pipeline.tracker(), last, DocumentStatus::Processing).await;

    assert_eq!(
        api.events(),
        vec!["start a.pdf", "end a.pdf", "start b.pdf", "end b.pdf", "start c.pdf", "end c.pdf"]
    );
}

#[tokio::test(start_paused = true)]
async fn progress_only_moves_forward_until_processing() {
    let api = FakeApi::with_upload_time(Duration::from_secs(4));
    let pipeline = UploadPipeline::new(api.arc(), DocumentStore::new(), policy());

    let id = pipeline.submit(vec![pdf("a.pdf", 10)]).accepted[0];
    let mut rx = pipeline.tracker().subscribe();
    let mut seen = Vec::new();
    while rx.changed().await.is_ok() {
        let entry = rx
            .borrow_and_update()
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .unwrap();
        seen.push(entry.progress);
        if entry.status != DocumentStatus::Uploading {
            assert_eq!(entry.status, DocumentStatus::Processing);
            break;
        }
    }

    assert!(seen.len() >= 2);
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "progress went backward: {:?}", seen);
    assert_eq!(seen.last(), Some(&100));
}

#[tokio::test(start_paused = true)]
async fn completed_entries_expire_after_the_fixed_delays() {
    let api = FakeApi::new();
    let store = DocumentStore::new();
    let pipeline = UploadPipeline::new(api.arc(), store.clone(), policy());

    let id = pipeline.submit(vec![pdf("report.pdf", 10)]).accepted[0];

    let processing = wait_for_status(pipeline.tracker(), id, DocumentStatus::Processing).await;
    let entered_processing = Instant::now();
    assert_eq!(processing.progress, 100);

    // The document reaches the store as soon as the transport call resolves.
    let stored = store.snapshot().documents;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].original_name, "report.pdf");
    assert_eq!(processing.document_id, Some(stored[0].id));

    wait_for_status(pipeline.tracker(), id, DocumentStatus::Completed).await;
    let to_completed = entered_processing.elapsed();
    assert!(to_completed >= Duration::from_secs(1));
    assert!(to_completed < Duration::from_millis(1100));

    wait_for_removal(pipeline.tracker(), id).await;
    let to_removed = entered_processing.elapsed();
    assert!(to_removed >= Duration::from_secs(4));
    assert!(to_removed < Duration::from_millis(4100));

    // Removal from the upload list leaves the document in the store.
    assert_eq!(store.snapshot().documents.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn stored_document_enters_processing_with_its_entry() {
    let api = FakeApi::new();
    api.upload_returns_status(DocumentStatus::Uploading);
    let store = DocumentStore::new();
    let pipeline = UploadPipeline::new(api.arc(), store.clone(), policy());

    let id = pipeline.submit(vec![pdf("fresh.pdf", 10)]).accepted[0];
    wait_for_status(pipeline.tracker(), id, DocumentStatus::Completed).await;

    let stored = store.snapshot().documents;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, DocumentStatus::Processing);
}

#[tokio::test(start_paused = true)]
async fn upload_replaces_a_listed_copy_of_the_same_document() {
    let api = FakeApi::new();
    let store = DocumentStore::new();
    let pipeline = UploadPipeline::new(api.arc(), store.clone(), policy());

    let id = pipeline.submit(vec![pdf("twice.pdf", 10)]).accepted[0];
    let entry = wait_for_status(pipeline.tracker(), id, DocumentStatus::Processing).await;
    let document_id = entry.document_id.unwrap();

    // A list reload that already saw the new row, followed by the same record
    // arriving again, must not duplicate it.
    let listed = store.snapshot().documents;
    store.set_documents(listed.clone());
    store.add_document(listed[0].clone());

    let ids: Vec<Uuid> = store.snapshot().documents.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![document_id]);
}

#[tokio::test(start_paused = true)]
async fn failed_entries_stay_visible() {
    let api = FakeApi::new();
    api.fail_upload_of("broken.pdf");
    let store = DocumentStore::new();
    let pipeline = UploadPipeline::new(api.arc(), store.clone(), policy());

    let id = pipeline.submit(vec![pdf("broken.pdf", 10)]).accepted[0];
    let failed = wait_for_status(pipeline.tracker(), id, DocumentStatus::Error).await;
    assert_eq!(failed.error.as_deref(), Some("Server error: Upload failed: broken.pdf"));

    tokio::time::sleep(Duration::from_secs(60)).await;

    let entry = pipeline.tracker().entry(id).unwrap();
    assert_eq!(entry.status, DocumentStatus::Error);
    assert!(store.snapshot().documents.is_empty());
}

#[tokio::test(start_paused = true)]
async fn one_failure_does_not_stop_the_batch() {
    let api = FakeApi::with_upload_time(Duration::from_millis(400));
    api.fail_upload_of("first.pdf");
    let store = DocumentStore::new();
    let pipeline = UploadPipeline::new(api.arc(), store.clone(), policy());

    let ids = pipeline
        .submit(vec![pdf("first.pdf", 10), pdf("second.pdf", 10)])
        .accepted;

    wait_for_status(pipeline.tracker(), ids[0], DocumentStatus::Error).await;
    wait_for_status(pipeline.tracker(), ids[1], DocumentStatus::Processing).await;

    let names: Vec<String> = store
        .snapshot()
        .documents
        .iter()
        .map(|d| d.original_name.clone())
        .collect();
    assert_eq!(names, vec!["second.pdf"]);
}

#[tokio::test(start_paused = true)]
async fn dismiss_only_applies_to_finished_entries() {
    let api = FakeApi::with_upload_time(Duration::from_secs(2));
    api.fail_upload_of("bad.pdf");
    let pipeline = UploadPipeline::new(api.arc(), DocumentStore::new(), policy());

    let ids = pipeline.submit(vec![pdf("bad.pdf", 10), pdf("good.pdf", 10)]).accepted;

    // Still queued behind the first file.
    assert!(!pipeline.dismiss(ids[1]).await);

    wait_for_status(pipeline.tracker(), ids[0], DocumentStatus::Error).await;
    assert!(pipeline.dismiss(ids[0]).await);
    assert!(pipeline.tracker().entry(ids[0]).is_none());

    wait_for_status(pipeline.tracker(), ids[1], DocumentStatus::Completed).await;
    assert!(pipeline.dismiss(ids[1]).await);
    assert!(pipeline.tracker().snapshot().is_empty());

    // The cancelled removal timer must not resurrect or disturb anything.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(pipeline.tracker().snapshot().is_empty());
}

#[tokio::test(start_paused = true)]
async fn shutdown_finishes_the_current_upload_and_cancels_the_rest() {
    let api = FakeApi::with_upload_time(Duration::from_secs(2));
    let pipeline = UploadPipeline::new(api.arc(), DocumentStore::new(), policy());
    let tracker = pipeline.tracker().clone();

    let ids = pipeline
        .submit(vec![pdf("a.pdf", 10), pdf("b.pdf", 10), pdf("c.pdf", 10)])
        .accepted;
    tokio::time::sleep(Duration::from_millis(600)).await;

    pipeline.shutdown().await;

    assert_eq!(api.events(), vec!["start a.pdf", "end a.pdf"]);
    assert_eq!(tracker.entry(ids[0]).unwrap().status, DocumentStatus::Processing);
    for id in &ids[1..] {
        let entry = tracker.entry(*id).unwrap();
        assert_eq!(entry.status, DocumentStatus::Error);
        assert_eq!(entry.error.as_deref(), Some("Upload cancelled"));
    }

    // Scheduled transitions were cancelled with the pipeline.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(tracker.entry(ids[0]).unwrap().status, DocumentStatus::Processing);
}
