use crate::commands::helpers::{listings, ordered_documents};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::{DocumentStore, StorageBackend};

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Case-insensitive match on name or section text.
    pub search: Option<String>,
    /// Keep only the N most recently modified.
    pub recent: Option<usize>,
}

pub fn run<B: StorageBackend>(store: &DocumentStore<B>, filter: &ListFilter) -> Result<CmdResult> {
    let mut ids: Vec<String> = match filter.search.as_deref().map(str::trim) {
        Some(query) if !query.is_empty() => store
            .search_documents(query)
            .into_iter()
            .map(|summary| summary.id)
            .collect(),
        _ => ordered_documents(store).into_iter().map(|doc| doc.id).collect(),
    };
    if let Some(limit) = filter.recent {
        let recent: Vec<String> = store
            .get_recent_documents(limit)
            .into_iter()
            .map(|summary| summary.id)
            .collect();
        ids.retain(|id| recent.contains(id));
    }

    let mut result = CmdResult::default().with_listed_documents(listings(store, &ids));
    if result.listed_documents.is_empty() {
        let message = match &filter.search {
            Some(query) => format!("No documents match '{}'", query.trim()),
            None => "No documents yet. Create one with `prd new`.".to_string(),
        };
        result.add_message(CmdMessage::info(message));
    }
    Ok(result)
}
