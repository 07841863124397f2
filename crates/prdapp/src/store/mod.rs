//! # Storage Layer
//!
//! Persistence is split in two:
//!
//! 1. **Medium**: a [`StorageBackend`] is a flat, size-bounded key-value map of
//!    strings. [`FsBackend`] keeps one file per key; [`MemBackend`] keeps a
//!    `HashMap` and is what the tests run against.
//! 2. **Store**: [`DocumentStore`] owns the application's keys and their JSON
//!    encoding. Nothing else writes the medium.
//!
//! ## Keys
//!
//! All keys share the `prd-` prefix:
//!
//! | Key                    | Value                                           |
//! |------------------------|-------------------------------------------------|
//! | `prd-documents`        | JSON object, document id → document            |
//! | `prd-current-document` | raw id of the document open in the editor      |
//! | `prd-preferences`      | JSON object of [`crate::model::Preferences`]   |
//! | `prd-collapse-states`  | JSON object, document id → section id → bool   |
//!
//! ## Failure Policy
//!
//! - **Reads never fail.** Missing or corrupt data degrades to an empty or
//!   default value and a warning is logged.
//! - **Writes return typed errors.** A write that exceeds the medium's capacity
//!   surfaces as [`crate::error::SaveError::StorageFull`] so callers can run
//!   overflow handling instead of just reporting a failure.
//!
//! ## Read-Modify-Write
//!
//! The documents collection is one value. Every mutation loads the whole
//! collection, changes it and writes it back in one `set`, which the backend
//! performs atomically. There is no partial update of a single document.

pub mod backend;
pub mod document_store;
pub mod fs_backend;
pub mod mem_backend;

pub use backend::{entry_bytes, utf16_bytes, StorageBackend};
pub use document_store::{validate_document, DocumentStore, ExportBundle};
pub use fs_backend::FsBackend;
pub use mem_backend::MemBackend;

pub const KEY_PREFIX: &str = "prd-";
pub const DOCUMENTS_KEY: &str = "prd-documents";
pub const CURRENT_DOCUMENT_KEY: &str = "prd-current-document";
pub const PREFERENCES_KEY: &str = "prd-preferences";
pub const COLLAPSE_STATES_KEY: &str = "prd-collapse-states";

/// Keys removed by a full clear.
pub const APP_KEYS: [&str; 4] = [
    DOCUMENTS_KEY,
    CURRENT_DOCUMENT_KEY,
    PREFERENCES_KEY,
    COLLAPSE_STATES_KEY,
];

/// Assumed capacity of the medium: 10 MiB.
pub const DEFAULT_CAPACITY: u64 = 10 * 1024 * 1024;

pub const BUNDLE_VERSION: &str = "1.0.0";
