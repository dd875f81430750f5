//! services/client/src/upload/pipeline.rs
//!
//! The upload pipeline: validates dropped files, tracks them in the transient
//! upload list and hands them to a single worker that uploads one file at a
//! time, in drop order.
//!
//! After a successful upload the entry sits in `processing`, then a scheduled
//! callback moves it to `completed` and later drops it from the list. Scheduled
//! callbacks run on `tokio::time` and are cancelled through `CancellationToken`s,
//! so a paused test clock drives them deterministically.

use std::collections::HashMap;
use std::sync::Arc;
use summarizer_core::domain::{DocumentPatch, DocumentStatus, UploadFile};
use summarizer_core::ports::{DocumentApi, ProgressCallback};
use summarizer_core::store::DocumentStore;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::UploadPolicy;
use crate::upload::tracker::{UploadEntry, UploadTracker};
use crate::upload::validation::{validate, Rejection};

const CANCELLED_MESSAGE: &str = "Upload cancelled";

/// The result of handing a batch of files to the pipeline.
#[derive(Debug, Default)]
pub struct SubmitOutcome {
    /// Tracker ids of the files that entered the pipeline, in drop order.
    pub accepted: Vec<Uuid>,
    /// Files turned away before entering the pipeline.
    pub rejected: Vec<Rejection>,
}

struct UploadJob {
    entry_id: Uuid,
    file: UploadFile,
}

/// Everything the worker and its scheduled callbacks need.
#[derive(Clone)]
struct WorkerContext {
    api: Arc<dyn DocumentApi>,
    store: DocumentStore,
    tracker: UploadTracker,
    policy: UploadPolicy,
    shutdown: CancellationToken,
    /// One token per entry with pending scheduled transitions.
    timers: Arc<Mutex<HashMap<Uuid, CancellationToken>>>,
}

pub struct UploadPipeline {
    context: WorkerContext,
    queue: mpsc::UnboundedSender<UploadJob>,
    worker: JoinHandle<()>,
}

impl UploadPipeline {
    /// Creates the pipeline and spawns its worker. Must be called from within a
    /// tokio runtime.
    pub fn new(api: Arc<dyn DocumentApi>, store: DocumentStore, policy: UploadPolicy) -> Self {
        let context = WorkerContext {
            api,
            store,
            tracker: UploadTracker::new(),
            policy,
            shutdown: CancellationToken::new(),
            timers: Arc::new(Mutex::new(HashMap::new())),
        };
        let (queue, jobs) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(context.clone(), jobs));
        Self {
            context,
            queue,
            worker,
        }
    }

    /// The transient upload list, for rendering.
    pub fn tracker(&self) -> &UploadTracker {
        &self.context.tracker
    }

    /// Validates `files` and queues the valid ones in the given order. Valid
    /// files are visible in the tracker as `uploading` at 0% when this returns.
    pub fn submit(&self, files: Vec<UploadFile>) -> SubmitOutcome {
        let mut outcome = SubmitOutcome::default();

        for file in files {
            if let Err(reason) = validate(&file, self.context.policy.max_file_size) {
                warn!("Rejected {}: {}", file.name, reason);
                outcome.rejected.push(Rejection {
                    file_name: file.name,
                    reason,
                });
                continue;
            }

            let entry = UploadEntry::new(file.name.clone(), file.size());
            let entry_id = entry.id;
            self.context.tracker.insert(entry);
            outcome.accepted.push(entry_id);

            if self.queue.send(UploadJob { entry_id, file }).is_err() {
                warn!("Upload worker has stopped; {} will not be sent", entry_id);
                self.context.tracker.mark_failed(entry_id, CANCELLED_MESSAGE);
            }
        }

        outcome
    }

    /// Removes a finished (`completed` or `error`) entry at the user's request,
    /// cancelling its pending transitions. In-flight entries cannot be dismissed.
    pub async fn dismiss(&self, id: Uuid) -> bool {
        let Some(entry) = self.context.tracker.entry(id) else {
            return false;
        };
        if !entry.status.is_terminal() {
            return false;
        }
        if let Some(token) = self.context.timers.lock().await.remove(&id) {
            token.cancel();
        }
        self.context.tracker.remove(id)
    }

    /// Stops the pipeline. The upload currently on the wire runs to completion;
    /// files still queued behind it are marked as cancelled, and pending
    /// scheduled transitions are dropped.
    pub async fn shutdown(self) {
        info!("Shutting down upload pipeline.");
        self.context.shutdown.cancel();
        drop(self.queue);
        if let Err(e) = self.worker.await {
            error!("Upload worker ended abnormally: {:?}", e);
        }
        self.context.timers.lock().await.clear();
    }
}

//=========================================================================================
// Worker
//=========================================================================================

/// Consumes jobs one at a time; the next job is not taken before the current
/// upload call has resolved or failed.
async fn run_worker(ctx: WorkerContext, mut jobs: mpsc::UnboundedReceiver<UploadJob>) {
    info!("Upload worker started.");
    loop {
        let job = tokio::select! {
            biased;
            _ = ctx.shutdown.cancelled() => break,
            job = jobs.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };
        upload_one(&ctx, job).await;
    }

    jobs.close();
    while let Ok(job) = jobs.try_recv() {
        ctx.tracker.mark_failed(job.entry_id, CANCELLED_MESSAGE);
    }
    info!("Upload worker stopped.");
}

async fn upload_one(ctx: &WorkerContext, job: UploadJob) {
    let UploadJob { entry_id, file } = job;
    info!("Uploading {} ({} bytes)", file.name, file.size());

    let tracker = ctx.tracker.clone();
    let on_progress: ProgressCallback = Arc::new(move |percent| {
        tracker.report_progress(entry_id, percent);
    });

    let name = file.name.clone();
    match ctx.api.upload_document(file, on_progress).await {
        Ok(mut document) => {
            info!("Uploaded {} as document {}", name, document.id);
            // The stored document and the upload entry enter `processing` together.
            DocumentPatch::status(DocumentStatus::Processing).apply_to(&mut document);
            ctx.tracker.mark_processing(entry_id, document.id);
            ctx.store.add_document(document);
            schedule_completion(ctx, entry_id).await;
        }
        Err(e) => {
            error!("Upload of {} failed: {}", name, e);
            ctx.tracker.mark_failed(entry_id, e.to_string());
        }
    }
}

/// `processing -> completed` after the completion delay, then removal after the
/// removal delay. Error entries never get here.
async fn schedule_completion(ctx: &WorkerContext, entry_id: Uuid) {
    let token = ctx.shutdown.child_token();
    ctx.timers.lock().await.insert(entry_id, token.clone());

    let tracker = ctx.tracker.clone();
    let timers = ctx.timers.clone();
    let completion_delay = ctx.policy.completion_delay;
    let removal_delay = ctx.policy.removal_delay;

    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(completion_delay) => {}
        }
        tracker.mark_completed(entry_id);

        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(removal_delay) => {}
        }
        if tracker.entry(entry_id).map(|e| e.status) == Some(DocumentStatus::Completed) {
            tracker.remove(entry_id);
        }
        timers.lock().await.remove(&entry_id);
    });
}
