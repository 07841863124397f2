use crate::commands::helpers::{resolve, DocumentSelector};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::export::{self, ExportFormat};
use crate::store::{DocumentStore, StorageBackend};

/// Renders the selected document. The artifact is returned, not written.
pub fn run<B: StorageBackend>(
    store: &DocumentStore<B>,
    selector: &DocumentSelector,
    format: ExportFormat,
) -> Result<CmdResult> {
    let doc = resolve(store, selector)?;
    let artifact = export::export(&doc, format)?;

    let mut result = CmdResult::default().with_affected_document(&doc);
    result.add_message(CmdMessage::success(format!(
        "{} document exported: {}",
        format, artifact.filename
    )));
    Ok(result.with_artifact(artifact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create;
    use crate::store::MemBackend;

    #[test]
    fn test_markdown_export_returns_artifact() {
        let store = DocumentStore::with_backend(MemBackend::new());
        create::run(&store, Some("Q3: Plan!")).unwrap();
        let result = run(&store, &DocumentSelector::Current, ExportFormat::Markdown).unwrap();
        let artifact = &result.artifacts[0];
        assert_eq!(artifact.filename, "Q3 Plan.md");
        assert_eq!(artifact.mime_type, "text/markdown");
        assert!(String::from_utf8_lossy(&artifact.bytes).starts_with("# Q3: Plan!\n"));
    }

    #[test]
    fn test_export_needs_a_document() {
        let store = DocumentStore::with_backend(MemBackend::new());
        assert!(run(&store, &DocumentSelector::Current, ExportFormat::Markdown).is_err());
    }
}
