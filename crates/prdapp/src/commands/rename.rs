use crate::commands::helpers::{resolve, DocumentSelector};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::session::DocumentSession;
use crate::store::{DocumentStore, StorageBackend};
use std::time::Instant;

pub fn run<B: StorageBackend>(
    store: &DocumentStore<B>,
    selector: &DocumentSelector,
    name: &str,
) -> Result<CmdResult> {
    let doc = resolve(store, selector)?;
    let old_name = doc.name.clone();
    let mut session = DocumentSession::open(doc, &store.get_preferences(), Instant::now());
    session.rename(name)?;
    session.save(store)?;

    let doc = session.into_document();
    let mut result = CmdResult::default().with_affected_document(&doc);
    result.add_message(CmdMessage::success(format!(
        "Renamed: {} -> {}",
        old_name, doc.name
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create;
    use crate::error::PrdError;
    use crate::store::MemBackend;

    #[test]
    fn test_rename_trims_and_persists() {
        let store = DocumentStore::with_backend(MemBackend::new());
        create::run(&store, Some("Draft")).unwrap();
        run(&store, &DocumentSelector::Current, "  Final  ").unwrap();
        assert_eq!(store.get_current_document().unwrap().name, "Final");
    }

    #[test]
    fn test_rename_rejects_empty() {
        let store = DocumentStore::with_backend(MemBackend::new());
        create::run(&store, Some("Draft")).unwrap();
        assert!(matches!(
            run(&store, &DocumentSelector::Current, "   "),
            Err(PrdError::Api(_))
        ));
        assert_eq!(store.get_current_document().unwrap().name, "Draft");
    }
}
