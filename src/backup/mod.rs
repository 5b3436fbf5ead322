//! Backup Module
//!
//! A key/value gateway storing one JSON document per backup identifier.
//!
//! # Operations
//! - Write: replace the document stored under an identifier
//! - Read: return the stored document verbatim

mod fs;
mod gateway;
mod store;

/// Maximum accepted backup document size
pub const MAX_BACKUP_SIZE: usize = 16 * 1024 * 1024; // 16 MB

pub use fs::FsBlobStore;
pub use gateway::{backup_path, validate_backup_id, BackupGateway};
pub use store::{BlobStore, MemoryBlobStore};
