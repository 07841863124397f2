//! Moving whole collections in and out of the store.
//!
//! A *dump* is the portable `{version, exported, documents, preferences}`
//! bundle; importing one always adds copies under fresh ids. A *backup* is a
//! raw snapshot of every `prd-` key and restoring it replaces the namespace.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::{PrdError, Result};
use crate::export::Artifact;
use crate::store::{DocumentStore, StorageBackend};
use chrono::Local;

const JSON_MIME: &str = "application/json";

fn dated(prefix: &str) -> String {
    format!("{}-{}.json", prefix, Local::now().format("%Y-%m-%d"))
}

pub fn dump<B: StorageBackend>(store: &DocumentStore<B>) -> Result<CmdResult> {
    let json = store.export_all_documents()?;
    let count = store.get_documents().len();
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Exported {} document(s)", count)));
    Ok(result.with_artifact(Artifact {
        filename: dated("prd-documents"),
        mime_type: JSON_MIME.to_string(),
        bytes: json.into_bytes(),
    }))
}

pub fn import<B: StorageBackend>(store: &DocumentStore<B>, json: &str) -> Result<CmdResult> {
    let count = store.import_documents(json)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Imported {} document(s)", count)));
    Ok(result)
}

pub fn backup<B: StorageBackend>(store: &DocumentStore<B>) -> Result<CmdResult> {
    let backup = store.create_backup();
    let json = serde_json::to_string_pretty(&backup).map_err(PrdError::Serialization)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Backed up {} key(s)",
        backup.data.len()
    )));
    Ok(result.with_artifact(Artifact {
        filename: dated("prd-backup"),
        mime_type: JSON_MIME.to_string(),
        bytes: json.into_bytes(),
    }))
}

pub fn restore<B: StorageBackend>(store: &DocumentStore<B>, json: &str) -> Result<CmdResult> {
    store.restore_backup_json(json)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Restored backup: {} document(s)",
        store.get_documents().len()
    )));
    Ok(result)
}
