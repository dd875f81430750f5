pub mod card;
pub mod detail;
pub mod list;

pub use card::DocumentCard;
pub use detail::{DetailState, DocumentDetailView};
pub use list::DocumentListView;
