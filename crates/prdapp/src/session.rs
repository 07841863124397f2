//! An editing session over one loaded document.
//!
//! The session is the application context a controller holds while a document
//! is open: the in-memory copy, whether it has unsaved edits, and the autosave
//! timer configured from [`Preferences`]. Dropping the session ends its
//! lifecycle; there is no ambient current-document state.
//!
//! Saving writes the in-memory copy over whatever is stored (last write wins),
//! so a controller should keep one session per document.

use crate::content::SectionContent;
use crate::error::{PrdError, Result, SaveError};
use crate::model::{Document, Preferences, SectionId};
use crate::monitor::IntervalTimer;
use crate::store::{DocumentStore, StorageBackend};
use std::time::{Duration, Instant};

pub struct DocumentSession {
    document: Document,
    dirty: bool,
    autosave: Option<IntervalTimer>,
}

impl DocumentSession {
    pub fn open(document: Document, prefs: &Preferences, now: Instant) -> Self {
        let mut session = Self {
            document,
            dirty: false,
            autosave: None,
        };
        session.apply_preferences(prefs, now);
        session
    }

    /// Loads `id` and makes it the current document.
    pub fn load<B: StorageBackend>(store: &DocumentStore<B>, id: &str, now: Instant) -> Result<Self> {
        let document = store
            .get_document(id)
            .ok_or_else(|| PrdError::DocumentNotFound(id.to_string()))?;
        store.set_current_document_id(Some(id))?;
        Ok(Self::open(document, &store.get_preferences(), now))
    }

    /// Restarts (or stops) the autosave timer after a preferences change.
    pub fn apply_preferences(&mut self, prefs: &Preferences, now: Instant) {
        self.autosave = prefs.auto_save_enabled.then(|| {
            IntervalTimer::started(Duration::from_millis(prefs.auto_save_interval), now)
        });
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn autosave_enabled(&self) -> bool {
        self.autosave.is_some()
    }

    pub fn section(&self, id: SectionId) -> Option<&SectionContent> {
        self.document.section(id)
    }

    pub fn set_section(&mut self, id: SectionId, content: SectionContent) {
        self.document.set_section(id, content.normalized());
        self.dirty = true;
    }

    /// Trims the name; an empty name is rejected.
    pub fn rename(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PrdError::Api("Document name cannot be empty".to_string()));
        }
        if self.document.name != name {
            self.document.name = name.to_string();
            self.dirty = true;
        }
        Ok(())
    }

    pub fn document_mut(&mut self) -> &mut Document {
        self.dirty = true;
        &mut self.document
    }

    pub fn save<B: StorageBackend>(
        &mut self,
        store: &DocumentStore<B>,
    ) -> std::result::Result<(), SaveError> {
        store.save_document(&mut self.document)?;
        self.dirty = false;
        Ok(())
    }

    /// Saves when dirty and the autosave period has elapsed. Returns whether a
    /// save happened.
    pub fn tick<B: StorageBackend>(
        &mut self,
        store: &DocumentStore<B>,
        now: Instant,
    ) -> std::result::Result<bool, SaveError> {
        let Some(timer) = self.autosave.as_mut() else {
            return Ok(false);
        };
        if !timer.fire(now) || !self.dirty {
            return Ok(false);
        }
        self.save(store)?;
        tracing::debug!(id = %self.document.id, "Autosaved");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemBackend;

    fn setup() -> (DocumentStore<MemBackend>, String) {
        let store = DocumentStore::with_backend(MemBackend::new());
        let mut doc = store.create_document(Some("Session"));
        store.save_document(&mut doc).unwrap();
        (store, doc.id)
    }

    #[test]
    fn test_load_sets_current_pointer() {
        let (store, id) = setup();
        let session = DocumentSession::load(&store, &id, Instant::now()).unwrap();
        assert_eq!(session.document().id, id);
        assert_eq!(store.current_document_id(), Some(id));
        assert!(session.autosave_enabled());
        assert!(DocumentSession::load(&store, "missing", Instant::now()).is_err());
    }

    #[test]
    fn test_autosave_waits_for_period_and_dirty() {
        let (store, id) = setup();
        let start = Instant::now();
        let mut session = DocumentSession::load(&store, &id, start).unwrap();

        let later = start + Duration::from_secs(31);
        assert!(!session.tick(&store, later).unwrap(), "clean session never saves");

        session.set_section(SectionId::GoalsObjectives, SectionContent::Legacy("Grow".into()));
        assert!(!session.tick(&store, later + Duration::from_secs(10)).unwrap());
        assert!(session.tick(&store, later + Duration::from_secs(31)).unwrap());
        assert!(!session.is_dirty());

        let stored = store.get_document(&id).unwrap();
        assert_eq!(
            stored.section(SectionId::GoalsObjectives).unwrap().plain_text(),
            "Grow"
        );
    }

    #[test]
    fn test_disabled_autosave_never_fires() {
        let (store, id) = setup();
        let mut prefs = Preferences::default();
        prefs.auto_save_enabled = false;
        let start = Instant::now();
        let doc = store.get_document(&id).unwrap();
        let mut session = DocumentSession::open(doc, &prefs, start);
        session.rename("Renamed").unwrap();
        assert!(!session.tick(&store, start + Duration::from_secs(3600)).unwrap());
        assert!(session.is_dirty());
    }

    #[test]
    fn test_rename_rejects_blank() {
        let (store, id) = setup();
        let mut session = DocumentSession::load(&store, &id, Instant::now()).unwrap();
        assert!(session.rename("   ").is_err());
        session.rename("  Trimmed  ").unwrap();
        session.save(&store).unwrap();
        assert_eq!(store.get_document(&id).unwrap().name, "Trimmed");
    }
}
