use crate::commands::helpers::{listings, resolve, DocumentSelector};
use crate::commands::{AttachmentInfo, CmdResult, SectionView};
use crate::content::SectionContent;
use crate::error::Result;
use crate::export::markdown::section_body;
use crate::model::{CollapseStates, Document, SectionId};
use crate::store::{DocumentStore, StorageBackend};

pub(crate) fn section_view(doc: &Document, id: SectionId, collapsed: &CollapseStates) -> SectionView {
    let empty = SectionContent::default();
    let content = doc.section(id).unwrap_or(&empty);
    SectionView {
        key: id.key(),
        title: id.title(),
        complete: content.is_complete(),
        text: content.plain_text().to_string(),
        markdown: section_body(content),
        collapsed: collapsed.get(id.key()).copied().unwrap_or(false),
    }
}

/// The selected document with all six sections and its attachment list.
pub fn run<B: StorageBackend>(
    store: &DocumentStore<B>,
    selector: &DocumentSelector,
) -> Result<CmdResult> {
    let doc = resolve(store, selector)?;
    let collapsed = store.get_collapse_states(&doc.id);

    let mut result = CmdResult::default()
        .with_affected_document(&doc)
        .with_listed_documents(listings(store, &[doc.id.clone()]));
    result.sections = SectionId::ALL
        .into_iter()
        .map(|id| section_view(&doc, id, &collapsed))
        .collect();
    result.attachments = doc.attachments.iter().map(AttachmentInfo::from).collect();
    Ok(result)
}
