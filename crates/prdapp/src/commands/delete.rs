use crate::commands::helpers::{resolve, DocumentSelector};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::{DocumentStore, StorageBackend};

/// Removes the selected document, clearing the current pointer if it pointed
/// at it.
pub fn run<B: StorageBackend>(
    store: &DocumentStore<B>,
    selector: &DocumentSelector,
) -> Result<CmdResult> {
    let doc = resolve(store, selector)?;
    store.delete_document(&doc.id)?;

    let mut result = CmdResult::default().with_affected_document(&doc);
    result.add_message(CmdMessage::success(format!("Document deleted: {}", doc.name)));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create;
    use crate::store::MemBackend;

    #[test]
    fn test_deleting_current_clears_pointer() {
        let store = DocumentStore::with_backend(MemBackend::new());
        let id = create::run(&store, Some("Doomed")).unwrap().affected_documents[0]
            .id
            .clone();

        run(&store, &DocumentSelector::Current).unwrap();
        assert!(store.get_document(&id).is_none());
        assert_eq!(store.current_document_id(), None);
        assert!(run(&store, &DocumentSelector::Key(id)).is_err());
    }
}
