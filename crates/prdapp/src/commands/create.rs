use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::{DocumentStore, StorageBackend};

/// Creates, persists and selects a new document. A blank name falls back to
/// the default.
pub fn run<B: StorageBackend>(store: &DocumentStore<B>, name: Option<&str>) -> Result<CmdResult> {
    let name = name.map(str::trim).filter(|n| !n.is_empty());
    let mut doc = store.create_document(name);
    store.save_document(&mut doc)?;
    store.set_current_document_id(Some(&doc.id))?;

    let mut result = CmdResult::default().with_affected_document(&doc);
    result.add_message(CmdMessage::success(format!("Document created: {}", doc.name)));
    Ok(result)
}
