use crate::commands::helpers::{resolve, DocumentSelector};
use crate::commands::view::section_view;
use crate::commands::{CmdMessage, CmdResult};
use crate::content::{Delta, SectionContent};
use crate::error::Result;
use crate::model::SectionId;
use crate::session::DocumentSession;
use crate::store::{DocumentStore, StorageBackend};
use std::time::Instant;

/// New content for a section. Every variant is stored in the rich shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionInput {
    /// Unformatted text, one line per paragraph.
    Text(String),
    Markdown(String),
    Delta(Delta),
}

impl SectionInput {
    pub fn into_content(self) -> SectionContent {
        match self {
            SectionInput::Text(text) => SectionContent::from_delta(Delta::from_plain_text(&text)),
            SectionInput::Markdown(source) => SectionContent::from_markdown(&source),
            SectionInput::Delta(delta) => SectionContent::from_delta(delta),
        }
    }
}

pub fn get<B: StorageBackend>(
    store: &DocumentStore<B>,
    selector: &DocumentSelector,
    id: SectionId,
) -> Result<CmdResult> {
    let doc = resolve(store, selector)?;
    let mut result = CmdResult::default().with_affected_document(&doc);
    result
        .sections
        .push(section_view(&doc, id, &store.get_collapse_states(&doc.id)));
    Ok(result)
}

pub fn set<B: StorageBackend>(
    store: &DocumentStore<B>,
    selector: &DocumentSelector,
    id: SectionId,
    input: SectionInput,
) -> Result<CmdResult> {
    let doc = resolve(store, selector)?;
    let mut session = DocumentSession::open(doc, &store.get_preferences(), Instant::now());
    session.set_section(id, input.into_content());
    session.save(store)?;

    let doc = session.into_document();
    let mut result = CmdResult::default().with_affected_document(&doc);
    result
        .sections
        .push(section_view(&doc, id, &store.get_collapse_states(&doc.id)));
    result.add_message(CmdMessage::success(format!(
        "Section updated: {} ({}/{} complete)",
        id.title(),
        doc.completed_sections(),
        SectionId::ALL.len()
    )));
    Ok(result)
}
