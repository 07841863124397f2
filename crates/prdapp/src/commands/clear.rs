use crate::commands::{CmdMessage, CmdResult};
use crate::error::{PrdError, Result};
use crate::monitor::overflow_backup;
use crate::store::{DocumentStore, StorageBackend};

/// Removes every application key, preferences included.
pub fn all<B: StorageBackend>(store: &DocumentStore<B>) -> Result<CmdResult> {
    if !store.clear_all_storage() {
        return Err(PrdError::Store("Failed to clear storage".to_string()));
    }
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success("All data cleared"));
    Ok(result)
}

/// Removes documents and the current pointer. Preferences survive.
pub fn documents<B: StorageBackend>(store: &DocumentStore<B>) -> Result<CmdResult> {
    let count = store.get_documents().len();
    store.clear_documents()?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Cleared {} document(s)", count)));
    Ok(result)
}

/// The JSON download offered before clearing on overflow: the stored
/// documents plus any whose save was just refused. Nothing is removed.
pub fn overflow<B: StorageBackend>(store: &DocumentStore<B>) -> Result<CmdResult> {
    let mut docs = store.get_documents();
    docs.extend(store.unsaved_documents());
    let artifact = overflow_backup(&docs)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::warning(
        "Storage is full. Save this backup before clearing documents.",
    ));
    Ok(result.with_artifact(artifact))
}
