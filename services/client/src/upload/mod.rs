pub mod pipeline;
pub mod tracker;
pub mod validation;

pub use pipeline::{SubmitOutcome, UploadPipeline};
pub use tracker::{UploadEntry, UploadTracker};
pub use validation::{validate, RejectReason, Rejection};
