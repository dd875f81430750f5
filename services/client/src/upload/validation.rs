//! services/client/src/upload/validation.rs
//!
//! Client-side checks run on dropped or selected files before they may enter
//! the upload pipeline.

use std::path::Path;
use summarizer_core::domain::UploadFile;

pub const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("Only PDF files are allowed")]
    NotPdf,
    #[error("File size exceeds {}MB limit", .limit / (1024 * 1024))]
    TooLarge { size: u64, limit: u64 },
}

/// A file that was turned away, with the notice shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub file_name: String,
    pub reason: RejectReason,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.file_name, self.reason)
    }
}

/// A file counts as a PDF when either its MIME type or its extension says so.
fn is_pdf(file: &UploadFile) -> bool {
    let by_mime = file.content_type.as_deref().is_some_and(|mime| {
        mime.split(';')
            .next()
            .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(PDF_MIME))
    });
    let by_extension = Path::new(&file.name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    by_mime || by_extension
}

pub fn validate(file: &UploadFile, max_file_size: u64) -> Result<(), RejectReason> {
    if !is_pdf(file) {
        return Err(RejectReason::NotPdf);
    }
    if file.size() > max_file_size {
        return Err(RejectReason::TooLarge {
            size: file.size(),
            limit: max_file_size,
        });
    }
    Ok(())
}
