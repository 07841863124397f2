use crate::commands::helpers::{resolve, DocumentSelector};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::SectionId;
use crate::store::{DocumentStore, StorageBackend};

pub fn get<B: StorageBackend>(
    store: &DocumentStore<B>,
    selector: &DocumentSelector,
) -> Result<CmdResult> {
    let doc = resolve(store, selector)?;
    let mut result = CmdResult::default().with_affected_document(&doc);
    result.collapse_states = Some(store.get_collapse_states(&doc.id));
    Ok(result)
}

/// Sets the collapsed flag of one section. `section = None` applies to all six.
pub fn set<B: StorageBackend>(
    store: &DocumentStore<B>,
    selector: &DocumentSelector,
    section: Option<SectionId>,
    collapsed: bool,
) -> Result<CmdResult> {
    let doc = resolve(store, selector)?;
    let mut states = store.get_collapse_states(&doc.id);
    let targets: Vec<SectionId> = match section {
        Some(id) => vec![id],
        None => SectionId::ALL.to_vec(),
    };
    for id in &targets {
        states.insert(id.key().to_string(), collapsed);
    }
    store.save_collapse_states(&doc.id, &states)?;

    let mut result = CmdResult::default().with_affected_document(&doc);
    let verb = if collapsed { "Collapsed" } else { "Expanded" };
    let what = match section {
        Some(id) => id.title().to_string(),
        None => "all sections".to_string(),
    };
    result.add_message(CmdMessage::success(format!("{} {}", verb, what)));
    result.collapse_states = Some(states);
    Ok(result)
}
