use crate::commands::DocumentListing;
use crate::error::{PrdError, Result};
use crate::model::{Document, SectionId};
use crate::store::{DocumentStore, StorageBackend};

/// How a user names a document on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSelector {
    /// The current document pointer.
    Current,
    /// 1-based position in the most-recently-modified order.
    Index(usize),
    /// A document id, or failing that an exact (case-insensitive) name.
    Key(String),
}

impl DocumentSelector {
    /// `None` or blank selects the current document; a positive number is an
    /// index; anything else is a key.
    pub fn parse(input: Option<&str>) -> Self {
        match input.map(str::trim).filter(|s| !s.is_empty()) {
            None => DocumentSelector::Current,
            Some(s) => match s.parse::<usize>() {
                Ok(n) if n > 0 => DocumentSelector::Index(n),
                _ => DocumentSelector::Key(s.to_string()),
            },
        }
    }
}

/// All documents, most recently modified first. Ties break on id so the order
/// is stable.
pub fn ordered_documents<B: StorageBackend>(store: &DocumentStore<B>) -> Vec<Document> {
    let mut docs: Vec<Document> = store.get_documents().into_values().collect();
    docs.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.id.cmp(&b.id)));
    docs
}

pub fn resolve<B: StorageBackend>(
    store: &DocumentStore<B>,
    selector: &DocumentSelector,
) -> Result<Document> {
    match selector {
        DocumentSelector::Current => store
            .get_current_document()
            .ok_or_else(|| PrdError::Api("No document selected".to_string())),
        DocumentSelector::Index(n) => ordered_documents(store)
            .into_iter()
            .nth(n - 1)
            .ok_or_else(|| PrdError::DocumentNotFound(n.to_string())),
        DocumentSelector::Key(key) => {
            if let Some(doc) = store.get_document(key) {
                return Ok(doc);
            }
            let needle = key.to_lowercase();
            let mut matches: Vec<Document> = ordered_documents(store)
                .into_iter()
                .filter(|doc| doc.name.to_lowercase() == needle)
                .collect();
            match matches.len() {
                0 => Err(PrdError::DocumentNotFound(key.clone())),
                1 => Ok(matches.remove(0)),
                n => Err(PrdError::Api(format!(
                    "{} documents are named '{}', use an index or id",
                    n, key
                ))),
            }
        }
    }
}

pub fn parse_section(input: &str) -> Result<SectionId> {
    input.parse().map_err(PrdError::Api)
}

/// Listings for `docs`, indexed by their position in the full recency order.
pub fn listings<B: StorageBackend>(
    store: &DocumentStore<B>,
    ids: &[String],
) -> Vec<DocumentListing> {
    let ordered = ordered_documents(store);
    let current = store.current_document_id();
    ids.iter()
        .filter_map(|id| {
            let pos = ordered.iter().position(|doc| &doc.id == id)?;
            let doc = &ordered[pos];
            Some(DocumentListing {
                index: pos + 1,
                id: doc.id.clone(),
                name: doc.name.clone(),
                modified: doc.modified,
                completed_sections: doc.completed_sections(),
                total_sections: SectionId::ALL.len(),
                attachments: doc.attachments.len(),
                is_current: current.as_deref() == Some(doc.id.as_str()),
            })
        })
        .collect()
}
