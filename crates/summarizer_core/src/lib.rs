pub mod domain;
pub mod listing;
pub mod ports;
pub mod store;

pub use domain::{
    BoundingBox, Document, DocumentPage, DocumentPatch, DocumentStatus, Highlight, HighlightType,
    ProcessingStatus, Summary, TextMatch, UploadFile,
};
pub use listing::{DocumentQuery, SortOrder};
pub use ports::{DocumentApi, PortError, PortResult, ProgressCallback};
pub use store::{DocumentStore, StoreState};
