use crate::attachments::{self, FileSource};
use crate::commands::helpers::{resolve, DocumentSelector};
use crate::commands::{AttachmentInfo, CmdMessage, CmdResult};
use crate::error::{PrdError, Result};
use crate::export::format_file_size;
use crate::session::DocumentSession;
use crate::store::{DocumentStore, StorageBackend};
use std::time::Instant;

/// Ingests `files` into the selected document and saves once. Rejected files
/// come back as warnings; the rest are still attached.
pub fn add<B, F>(
    store: &DocumentStore<B>,
    selector: &DocumentSelector,
    files: &[&dyn FileSource],
    progress: F,
) -> Result<CmdResult>
where
    B: StorageBackend,
    F: FnMut(usize, usize, &str),
{
    let doc = resolve(store, selector)?;
    let mut session = DocumentSession::open(doc, &store.get_preferences(), Instant::now());
    let report = attachments::add_files(session.document_mut(), files, progress);
    if !report.added.is_empty() {
        session.save(store)?;
    }

    let doc = session.into_document();
    let mut result = CmdResult::default().with_affected_document(&doc);
    for attachment in &report.added {
        result.add_message(CmdMessage::success(format!(
            "Attached: {} ({})",
            attachment.name,
            format_file_size(attachment.size)
        )));
    }
    for failure in &report.failures {
        result.add_message(CmdMessage::warning(failure.to_string()));
    }
    result.attachments = report.added.iter().map(AttachmentInfo::from).collect();
    Ok(result)
}

/// Removes an attachment by id or name.
pub fn remove<B: StorageBackend>(
    store: &DocumentStore<B>,
    selector: &DocumentSelector,
    key: &str,
) -> Result<CmdResult> {
    let doc = resolve(store, selector)?;
    let id = attachments::find(&doc, key)
        .map(|a| a.id.clone())
        .ok_or_else(|| PrdError::AttachmentNotFound(key.to_string()))?;

    let mut session = DocumentSession::open(doc, &store.get_preferences(), Instant::now());
    let removed = attachments::remove(session.document_mut(), &id)
        .ok_or_else(|| PrdError::AttachmentNotFound(key.to_string()))?;
    session.save(store)?;

    let doc = session.into_document();
    let mut result = CmdResult::default().with_affected_document(&doc);
    result.add_message(CmdMessage::success(format!("Removed: {}", removed.name)));
    result.attachments = vec![AttachmentInfo::from(&removed)];
    Ok(result)
}

pub fn list<B: StorageBackend>(
    store: &DocumentStore<B>,
    selector: &DocumentSelector,
) -> Result<CmdResult> {
    let doc = resolve(store, selector)?;
    let mut result = CmdResult::default().with_affected_document(&doc);
    result.attachments = doc.attachments.iter().map(AttachmentInfo::from).collect();
    if result.attachments.is_empty() {
        result.add_message(CmdMessage::info("No attachments"));
    } else {
        result.add_message(CmdMessage::info(format!(
            "{} attachment(s), {} total",
            doc.attachments.len(),
            format_file_size(attachments::total_size(&doc))
        )));
    }
    Ok(result)
}

pub fn clear<B: StorageBackend>(
    store: &DocumentStore<B>,
    selector: &DocumentSelector,
) -> Result<CmdResult> {
    let doc = resolve(store, selector)?;
    let mut session = DocumentSession::open(doc, &store.get_preferences(), Instant::now());
    let count = attachments::clear(session.document_mut());
    if count > 0 {
        session.save(store)?;
    }

    let doc = session.into_document();
    let mut result = CmdResult::default().with_affected_document(&doc);
    result.add_message(CmdMessage::success(format!("Removed {} attachment(s)", count)));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachments::{MemoryFile, MAX_FILE_SIZE};
    use crate::commands::{create, MessageLevel};
    use crate::store::MemBackend;

    fn store_with_doc() -> DocumentStore<MemBackend> {
        let store = DocumentStore::with_backend(MemBackend::with_capacity(64 * 1024 * 1024));
        create::run(&store, Some("Files")).unwrap();
        store
    }

    #[test]
    fn test_batch_keeps_good_files_and_reports_bad() {
        let store = store_with_doc();
        let ok = MemoryFile::new("wire.png", vec![7; 100]);
        let huge = MemoryFile::new("video.mov", vec![0; MAX_FILE_SIZE as usize + 1]);
        let mut seen = Vec::new();
        let result = add(&store, &DocumentSelector::Current, &[&ok, &huge], |i, n, name| {
            seen.push((i, n, name.to_string()));
        })
        .unwrap();

        assert_eq!(seen, vec![(1, 1, "wire.png".to_string())]);
        assert_eq!(result.attachments.len(), 1);
        assert_eq!(result.attachments[0].mime_type, "image/png");
        assert!(result
            .messages
            .iter()
            .any(|m| m.level == MessageLevel::Warning && m.content.contains("video.mov")));

        let doc = store.get_current_document().unwrap();
        assert_eq!(doc.attachments.len(), 1);
        assert_eq!(doc.attachments[0].decode().unwrap(), vec![7; 100]);
    }

    #[test]
    fn test_duplicate_against_stored_attachment() {
        let store = store_with_doc();
        let file = MemoryFile::new("spec.txt", b"v1".to_vec());
        add(&store, &DocumentSelector::Current, &[&file], |_, _, _| {}).unwrap();
        let again = MemoryFile::new("spec.txt", b"v2".to_vec());
        let result = add(&store, &DocumentSelector::Current, &[&again], |_, _, _| {}).unwrap();
        assert!(result.attachments.is_empty());
        assert_eq!(store.get_current_document().unwrap().attachments.len(), 1);
    }

    #[test]
    fn test_remove_by_name_list_and_clear() {
        let store = store_with_doc();
        let a = MemoryFile::new("a.txt", b"a".to_vec());
        let b = MemoryFile::new("b.txt", b"bb".to_vec());
        add(&store, &DocumentSelector::Current, &[&a, &b], |_, _, _| {}).unwrap();

        remove(&store, &DocumentSelector::Current, "a.txt").unwrap();
        assert!(matches!(
            remove(&store, &DocumentSelector::Current, "a.txt"),
            Err(PrdError::AttachmentNotFound(_))
        ));

        let listed = list(&store, &DocumentSelector::Current).unwrap();
        assert_eq!(listed.attachments.len(), 1);
        assert_eq!(listed.attachments[0].name, "b.txt");

        clear(&store, &DocumentSelector::Current).unwrap();
        assert!(store.get_current_document().unwrap().attachments.is_empty());
    }
}
