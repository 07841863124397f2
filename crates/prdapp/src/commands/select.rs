use crate::commands::helpers::{listings, resolve, DocumentSelector};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::session::DocumentSession;
use crate::store::{DocumentStore, StorageBackend};
use std::time::Instant;

/// Makes the selected document current.
pub fn run<B: StorageBackend>(
    store: &DocumentStore<B>,
    selector: &DocumentSelector,
) -> Result<CmdResult> {
    let doc = resolve(store, selector)?;
    let session = DocumentSession::load(store, &doc.id, Instant::now())?;
    let doc = session.into_document();

    let mut result = CmdResult::default()
        .with_affected_document(&doc)
        .with_listed_documents(listings(store, &[doc.id.clone()]));
    result.add_message(CmdMessage::success(format!("Now editing: {}", doc.name)));
    Ok(result)
}
