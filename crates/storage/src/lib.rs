#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{Collection, DocumentStore, Documents, InMemoryDocumentStore, Storage, StorageError};
