//! Application services

pub mod ingest;
pub mod library;
pub mod store;

pub use ingest::{BulkIngestor, Manifest, ManifestEntry, ScannedDocument};
pub use library::{LibraryCatalog, LibraryEntry, LibraryService};
pub use store::TreeStore;
