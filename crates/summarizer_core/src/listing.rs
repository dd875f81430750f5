//! crates/summarizer_core/src/listing.rs
//!
//! Sorting, filtering and name search applied by the document list view.

use crate::domain::{Document, DocumentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Newest upload first.
    #[default]
    Recent,
    Oldest,
    /// Case-insensitive on the original file name.
    Name,
    /// Largest first.
    Size,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "recent" => Some(SortOrder::Recent),
            "oldest" => Some(SortOrder::Oldest),
            "name" => Some(SortOrder::Name),
            "size" => Some(SortOrder::Size),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    pub sort: SortOrder,
    pub status: Option<DocumentStatus>,
    pub search: Option<String>,
}

impl DocumentQuery {
    pub fn sorted_by(sort: SortOrder) -> Self {
        Self {
            sort,
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: DocumentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    fn matches(&self, doc: &Document, needle: Option<&str>) -> bool {
        if self.status.is_some_and(|status| doc.status != status) {
            return false;
        }
        match needle {
            Some(needle) => doc.original_name.to_lowercase().contains(needle),
            None => true,
        }
    }

    /// Returns the matching documents in the requested order. The sort is
    /// stable, so ties keep their collection order.
    pub fn apply<'a>(&self, documents: &'a [Document]) -> Vec<&'a Document> {
        let needle = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut visible: Vec<&Document> = documents
            .iter()
            .filter(|d| self.matches(d, needle.as_deref()))
            .collect();

        match self.sort {
            SortOrder::Recent => visible.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at)),
            SortOrder::Oldest => visible.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at)),
            SortOrder::Name => visible.sort_by_cached_key(|d| d.original_name.to_lowercase()),
            SortOrder::Size => visible.sort_by(|a, b| b.file_size.cmp(&a.file_size)),
        }
        visible
    }
}
