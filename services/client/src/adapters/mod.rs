pub mod http;
pub mod records;

pub use http::HttpDocumentApi;
