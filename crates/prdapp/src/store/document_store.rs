use super::backend::StorageBackend;
use super::{
    APP_KEYS, BUNDLE_VERSION, COLLAPSE_STATES_KEY, CURRENT_DOCUMENT_KEY, DOCUMENTS_KEY,
    KEY_PREFIX, PREFERENCES_KEY,
};
use crate::error::{ImportError, PrdError, RestoreError, Result, SaveError, ValidationError};
use crate::model::{
    generate_id, Backup, CollapseStates, Document, DocumentSummary, Documents, Preferences,
    SectionId, DEFAULT_DOCUMENT_NAME,
};
use crate::monitor::StorageStats;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// The `prd dump` / `prd import` file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub version: String,
    pub exported: DateTime<Utc>,
    pub documents: Documents,
    pub preferences: Preferences,
}

const REQUIRED_FIELDS: [&str; 5] = ["id", "name", "created", "modified", "sections"];

/// Checks a raw stored document for the required top-level fields.
///
/// Missing section keys are repaired in place (set to the empty string), as are
/// section values that are neither a string nor an object. Missing top-level
/// fields are not repaired.
pub fn validate_document(doc: &mut Value) -> std::result::Result<(), ValidationError> {
    let Value::Object(fields) = doc else {
        return Err(ValidationError::NotAnObject);
    };

    for field in REQUIRED_FIELDS {
        if !fields.contains_key(field) {
            return Err(ValidationError::MissingField(field));
        }
    }

    let Some(Value::Object(sections)) = fields.get_mut("sections") else {
        return Err(ValidationError::InvalidSections);
    };

    for id in SectionId::ALL {
        match sections.get(id.key()) {
            Some(Value::String(_)) | Some(Value::Object(_)) => {}
            _ => {
                debug!(section = id.key(), "Repairing missing section");
                sections.insert(id.key().to_string(), Value::String(String::new()));
            }
        }
    }
    Ok(())
}

pub struct DocumentStore<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    /// Documents whose save was refused for lack of space. They go into the
    /// overflow backup and are dropped once saved or cleared.
    unsaved: RefCell<Documents>,
}

fn to_entry(doc: &Document) -> std::result::Result<Value, SaveError> {
    serde_json::to_value(doc).map_err(|e| SaveError::Failed(e.to_string()))
}

fn load_entry(id: &str, mut entry: Value) -> Option<Document> {
    if let Err(e) = validate_document(&mut entry) {
        warn!(id, "Skipping invalid document: {}", e);
        return None;
    }
    match serde_json::from_value(entry) {
        Ok(doc) => Some(doc),
        Err(e) => {
            warn!(id, "Skipping unreadable document: {}", e);
            None
        }
    }
}

impl<B: StorageBackend> DocumentStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            unsaved: RefCell::new(Documents::new()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, "Failed to read storage: {}", e);
                None
            }
        }
    }

    fn read_json<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let Some(raw) = self.read_raw(key) else {
            return T::default();
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, "Ignoring unreadable data: {}", e);
                T::default()
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> std::result::Result<(), SaveError> {
        let raw = serde_json::to_string(value).map_err(|e| SaveError::Failed(e.to_string()))?;
        self.backend.set(key, &raw).map_err(SaveError::from)?;
        debug!(key, "Saved");
        Ok(())
    }

    // --- Documents ---

    /// The stored collection as raw entries. Single-document writes patch this
    /// map so entries that fail to load stay in storage untouched.
    fn read_entries(&self) -> Map<String, Value> {
        match self.read_json::<Value>(DOCUMENTS_KEY) {
            Value::Object(entries) => entries,
            Value::Null => Map::new(),
            _ => {
                warn!("Ignoring documents collection that is not an object");
                Map::new()
            }
        }
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> std::result::Result<(), SaveError> {
        self.write_json(DOCUMENTS_KEY, entries)
    }

    /// Every stored document, keyed by id. Never fails: a missing or corrupt
    /// collection is empty, and entries that fail validation are skipped.
    pub fn get_documents(&self) -> Documents {
        self.read_entries()
            .into_iter()
            .filter_map(|(id, entry)| load_entry(&id, entry).map(|doc| (id, doc)))
            .collect()
    }

    /// Documents whose last save was refused with `STORAGE_FULL`.
    pub fn unsaved_documents(&self) -> Documents {
        self.unsaved.borrow().clone()
    }

    /// Writes the whole collection in one step.
    pub fn save_documents(&self, docs: &Documents) -> std::result::Result<(), SaveError> {
        self.write_json(DOCUMENTS_KEY, docs)
    }

    /// A new, unsaved document.
    pub fn create_document(&self, name: Option<&str>) -> Document {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_DOCUMENT_NAME);
        Document::new(name)
    }

    /// Upserts `doc` and bumps its `modified` timestamp. On failure `doc` is
    /// left as it was.
    pub fn save_document(&self, doc: &mut Document) -> std::result::Result<(), SaveError> {
        if doc.id.trim().is_empty() {
            return Err(SaveError::MissingId);
        }
        let mut updated = doc.clone();
        updated.touch();

        let mut entries = self.read_entries();
        entries.insert(updated.id.clone(), to_entry(&updated)?);
        match self.write_entries(&entries) {
            Ok(()) => {
                self.unsaved.borrow_mut().remove(&updated.id);
                doc.modified = updated.modified;
                Ok(())
            }
            Err(e) => {
                if e == SaveError::StorageFull {
                    self.unsaved.borrow_mut().insert(updated.id.clone(), updated);
                }
                Err(e)
            }
        }
    }

    /// Returns Ok(false) when no such document exists.
    pub fn delete_document(&self, id: &str) -> std::result::Result<bool, SaveError> {
        self.unsaved.borrow_mut().remove(id);
        let mut entries = self.read_entries();
        if entries.remove(id).is_none() {
            return Ok(false);
        }
        self.write_entries(&entries)?;

        if self.current_document_id().as_deref() == Some(id) {
            self.set_current_document_id(None)?;
        }
        info!(id, "Deleted document");
        Ok(true)
    }

    pub fn get_document(&self, id: &str) -> Option<Document> {
        if id.is_empty() {
            return None;
        }
        self.get_documents().remove(id)
    }

    pub fn touch_document(&self, id: &str) -> std::result::Result<bool, SaveError> {
        let mut entries = self.read_entries();
        let Some(mut doc) = entries.get(id).cloned().and_then(|e| load_entry(id, e)) else {
            return Ok(false);
        };
        doc.touch();
        entries.insert(id.to_string(), to_entry(&doc)?);
        self.write_entries(&entries)?;
        Ok(true)
    }

    // --- Current document pointer ---

    pub fn current_document_id(&self) -> Option<String> {
        self.read_raw(CURRENT_DOCUMENT_KEY)
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
    }

    /// `None` removes the pointer.
    pub fn set_current_document_id(&self, id: Option<&str>) -> std::result::Result<(), SaveError> {
        match id {
            Some(id) => self
                .backend
                .set(CURRENT_DOCUMENT_KEY, id)
                .map_err(SaveError::from),
            None => self
                .backend
                .remove(CURRENT_DOCUMENT_KEY)
                .map_err(SaveError::from),
        }
    }

    pub fn get_current_document(&self) -> Option<Document> {
        self.current_document_id()
            .and_then(|id| self.get_document(&id))
    }

    // --- Queries ---

    /// Case-insensitive substring match on name or any section's text,
    /// newest first.
    pub fn search_documents(&self, query: &str) -> Vec<DocumentSummary> {
        let needle = query.to_lowercase();
        let mut results: Vec<DocumentSummary> = self
            .get_documents()
            .values()
            .filter(|doc| {
                doc.name.to_lowercase().contains(&needle)
                    || doc
                        .sections
                        .values()
                        .any(|s| s.plain_text().to_lowercase().contains(&needle))
            })
            .map(Document::summary)
            .collect();
        results.sort_by(|a, b| b.modified.cmp(&a.modified));
        results
    }

    pub fn get_recent_documents(&self, limit: usize) -> Vec<DocumentSummary> {
        let mut results: Vec<DocumentSummary> =
            self.get_documents().values().map(Document::summary).collect();
        results.sort_by(|a, b| b.modified.cmp(&a.modified));
        results.truncate(limit);
        results
    }

    // --- Import / Export ---

    pub fn export_all_documents(&self) -> Result<String> {
        let bundle = ExportBundle {
            version: BUNDLE_VERSION.to_string(),
            exported: Utc::now(),
            documents: self.get_documents(),
            preferences: self.get_preferences(),
        };
        serde_json::to_string_pretty(&bundle).map_err(PrdError::Serialization)
    }

    /// Adds every document in `json` under a fresh id with an " (Imported)"
    /// suffix. Nothing is written unless every incoming document is valid.
    pub fn import_documents(&self, json: &str) -> std::result::Result<usize, ImportError> {
        let data: Value =
            serde_json::from_str(json).map_err(|e| ImportError::Malformed(e.to_string()))?;
        let incoming = data
            .get("documents")
            .and_then(Value::as_object)
            .ok_or_else(|| ImportError::Malformed("missing documents".to_string()))?;

        let mut prepared = Vec::with_capacity(incoming.len());
        for (key, entry) in incoming {
            let mut entry = entry.clone();
            validate_document(&mut entry)
                .map_err(|e| ImportError::Malformed(format!("{}: {}", key, e)))?;
            let mut doc: Document = serde_json::from_value(entry)
                .map_err(|e| ImportError::Malformed(format!("{}: {}", key, e)))?;
            doc.id = generate_id("doc");
            doc.name = format!("{} (Imported)", doc.name);
            prepared.push(doc);
        }

        let mut entries = self.read_entries();
        for doc in &prepared {
            entries.insert(doc.id.clone(), to_entry(doc)?);
        }
        if let Err(e) = self.write_entries(&entries) {
            if e == SaveError::StorageFull {
                self.unsaved
                    .borrow_mut()
                    .extend(prepared.into_iter().map(|doc| (doc.id.clone(), doc)));
            }
            return Err(e.into());
        }
        let imported = prepared.len();
        info!(imported, "Imported documents");
        Ok(imported)
    }

    // --- Backup / Restore ---

    /// Snapshot of every `prd-` key, values verbatim.
    pub fn create_backup(&self) -> Backup {
        let keys = match self.backend.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Failed to list storage keys: {}", e);
                Vec::new()
            }
        };
        let data = keys
            .into_iter()
            .filter(|key| key.starts_with(KEY_PREFIX))
            .filter_map(|key| self.read_raw(&key).map(|value| (key, value)))
            .collect();
        Backup {
            timestamp: Utc::now(),
            version: BUNDLE_VERSION.to_string(),
            data,
        }
    }

    /// Clears the `prd-` namespace, then writes every backed-up key verbatim.
    pub fn restore_backup(&self, backup: &Backup) -> std::result::Result<(), RestoreError> {
        let write_error = |key: &str, e: PrdError| RestoreError::Write {
            key: key.to_string(),
            message: e.to_string(),
        };

        let keys = self
            .backend
            .keys()
            .map_err(|e| write_error(KEY_PREFIX, e))?;
        for key in keys.iter().filter(|k| k.starts_with(KEY_PREFIX)) {
            self.backend.remove(key).map_err(|e| write_error(key, e))?;
        }

        for (key, value) in &backup.data {
            self.backend
                .set(key, value)
                .map_err(|e| write_error(key, e))?;
        }
        info!(keys = backup.data.len(), "Restored backup");
        Ok(())
    }

    /// Parses a backup file. Only `data` is required.
    pub fn restore_backup_json(&self, json: &str) -> std::result::Result<(), RestoreError> {
        #[derive(Deserialize)]
        struct RawBackup {
            timestamp: Option<DateTime<Utc>>,
            version: Option<String>,
            data: BTreeMap<String, String>,
        }

        let raw: RawBackup =
            serde_json::from_str(json).map_err(|e| RestoreError::Invalid(e.to_string()))?;
        let backup = Backup {
            timestamp: raw.timestamp.unwrap_or_else(Utc::now),
            version: raw.version.unwrap_or_else(|| BUNDLE_VERSION.to_string()),
            data: raw.data,
        };
        self.restore_backup(&backup)
    }

    // --- Clearing ---

    /// Removes every application key. Returns false if any removal failed.
    pub fn clear_all_storage(&self) -> bool {
        self.unsaved.borrow_mut().clear();
        let mut ok = true;
        for key in APP_KEYS {
            if let Err(e) = self.backend.remove(key) {
                warn!(key, "Failed to clear: {}", e);
                ok = false;
            }
        }
        ok
    }

    /// Removes the documents collection and the current pointer only.
    pub fn clear_documents(&self) -> std::result::Result<(), SaveError> {
        self.backend.remove(DOCUMENTS_KEY).map_err(SaveError::from)?;
        self.backend
            .remove(CURRENT_DOCUMENT_KEY)
            .map_err(SaveError::from)?;
        self.unsaved.borrow_mut().clear();
        info!("Cleared documents");
        Ok(())
    }

    // --- Preferences & collapse states ---

    pub fn get_preferences(&self) -> Preferences {
        self.read_json(PREFERENCES_KEY)
    }

    pub fn save_preferences(&self, prefs: &Preferences) -> std::result::Result<(), SaveError> {
        self.write_json(PREFERENCES_KEY, prefs)
    }

    pub fn get_collapse_states(&self, doc_id: &str) -> CollapseStates {
        let mut all: BTreeMap<String, CollapseStates> = self.read_json(COLLAPSE_STATES_KEY);
        all.remove(doc_id).unwrap_or_default()
    }

    pub fn save_collapse_states(
        &self,
        doc_id: &str,
        states: &CollapseStates,
    ) -> std::result::Result<(), SaveError> {
        let mut all: BTreeMap<String, CollapseStates> = self.read_json(COLLAPSE_STATES_KEY);
        all.insert(doc_id.to_string(), states.clone());
        self.write_json(COLLAPSE_STATES_KEY, &all)
    }

    // --- Usage ---

    pub fn stats(&self) -> StorageStats {
        StorageStats::measure(&self.backend, self.backend.capacity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::SectionContent;
    use crate::store::mem_backend::MemBackend;
    use chrono::Duration;
    use serde_json::json;

    fn make_store() -> DocumentStore<MemBackend> {
        DocumentStore::with_backend(MemBackend::new())
    }

    fn saved(store: &DocumentStore<MemBackend>, name: &str) -> Document {
        let mut doc = store.create_document(Some(name));
        store.save_document(&mut doc).unwrap();
        doc
    }

    #[test]
    fn test_create_document_defaults() {
        let store = make_store();
        let doc = store.create_document(None);
        assert_eq!(doc.name, "Untitled PRD");
        assert_eq!(doc.sections.len(), 6);
        assert!(doc
            .sections
            .values()
            .all(|s| *s == SectionContent::Legacy(String::new())));
        // not persisted until saved
        assert!(store.get_documents().is_empty());
    }

    #[test]
    fn test_save_and_get_document() {
        let store = make_store();
        let mut doc = store.create_document(Some("Roadmap"));
        doc.set_section(
            SectionId::ExecutiveSummary,
            SectionContent::Legacy("Ship it".into()),
        );
        let before = doc.modified;
        store.save_document(&mut doc).unwrap();

        let loaded = store.get_document(&doc.id).unwrap();
        assert_eq!(loaded.sections, doc.sections);
        assert_eq!(loaded.attachments, doc.attachments);
        assert!(loaded.modified >= before);
    }

    #[test]
    fn test_save_requires_id() {
        let store = make_store();
        let mut doc = store.create_document(None);
        doc.id.clear();
        assert_eq!(store.save_document(&mut doc), Err(SaveError::MissingId));
    }

    #[test]
    fn test_save_fails_on_write_error() {
        let store = make_store();
        store.backend.set_simulate_write_error(true);
        let mut doc = store.create_document(None);
        let err = store.save_document(&mut doc).unwrap_err();
        assert_eq!(err.code(), "SAVE_ERROR");
    }

    #[test]
    fn test_save_reports_storage_full() {
        let store = DocumentStore::with_backend(MemBackend::with_capacity(200));
        let mut doc = store.create_document(None);
        let err = store.save_document(&mut doc).unwrap_err();
        assert_eq!(err, SaveError::StorageFull);
        assert_eq!(err.code(), "STORAGE_FULL");
    }

    #[test]
    fn test_corrupt_collection_reads_as_empty() {
        let store = make_store();
        for raw in ["not json", "[1,2,3]", "42", "\"str\"", "{\"a\": 1}"] {
            store.backend.set(DOCUMENTS_KEY, raw).unwrap();
            assert!(store.get_documents().is_empty(), "input: {}", raw);
        }
    }

    #[test]
    fn test_get_documents_repairs_missing_sections() {
        let store = make_store();
        let raw = json!({
            "doc_1": {
                "id": "doc_1",
                "name": "Partial",
                "created": "2024-01-01T00:00:00Z",
                "modified": "2024-01-01T00:00:00Z",
                "sections": {"executive-summary": "kept"}
            },
            "doc_2": {"id": "doc_2", "name": "Broken"}
        });
        store
            .backend
            .set(DOCUMENTS_KEY, &raw.to_string())
            .unwrap();

        let docs = store.get_documents();
        assert_eq!(docs.len(), 1);
        let doc = &docs["doc_1"];
        assert_eq!(doc.sections.len(), 6);
        assert_eq!(doc.section(SectionId::ExecutiveSummary).unwrap().plain_text(), "kept");
    }

    #[test]
    fn test_writes_keep_unloadable_entries() {
        let store = make_store();
        let kept = json!({
            "id": "doc_old",
            "created": 1700000000000u64,
            "modified": 1700000000000u64,
            "sections": {"executive-summary": "precious"}
        });
        store
            .backend
            .set(DOCUMENTS_KEY, &json!({"doc_old": kept.clone()}).to_string())
            .unwrap();

        let doc = saved(&store, "Fresh");
        assert!(store.touch_document(&doc.id).unwrap());
        let other = saved(&store, "Other");
        assert!(store.delete_document(&other.id).unwrap());
        store.import_documents(&source_bundle()).unwrap();

        let raw: Value =
            serde_json::from_str(&store.backend.get(DOCUMENTS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw["doc_old"], kept);
        assert!(store.get_document("doc_old").is_none());
        assert_eq!(store.get_documents().len(), 2);
    }

    fn source_bundle() -> String {
        let source = make_store();
        saved(&source, "Incoming");
        source.export_all_documents().unwrap()
    }

    #[test]
    fn test_failed_save_leaves_document_unchanged() {
        let store = DocumentStore::with_backend(MemBackend::with_capacity(200));
        let mut doc = store.create_document(Some("Too big"));
        let earlier = Utc::now() - Duration::hours(1);
        doc.modified = earlier;

        assert_eq!(store.save_document(&mut doc), Err(SaveError::StorageFull));
        assert_eq!(doc.modified, earlier);
        assert!(store.unsaved_documents().contains_key(&doc.id));

        let roomy = make_store();
        roomy.save_document(&mut doc).unwrap();
        assert!(doc.modified > earlier);
        assert!(roomy.unsaved_documents().is_empty());
    }

    #[test]
    fn test_clearing_forgets_unsaved_documents() {
        let store = DocumentStore::with_backend(MemBackend::with_capacity(200));
        let mut doc = store.create_document(None);
        assert!(store.save_document(&mut doc).is_err());
        store.clear_documents().unwrap();
        assert!(store.unsaved_documents().is_empty());
    }

    #[test]
    fn test_validate_document() {
        let mut missing = json!({"id": "x", "name": "n", "created": "c", "modified": "m"});
        assert_eq!(
            validate_document(&mut missing),
            Err(ValidationError::MissingField("sections"))
        );

        let mut bad_sections =
            json!({"id": "x", "name": "n", "created": "c", "modified": "m", "sections": []});
        assert_eq!(
            validate_document(&mut bad_sections),
            Err(ValidationError::InvalidSections)
        );

        let mut repairable =
            json!({"id": "x", "name": "n", "created": "c", "modified": "m", "sections": {}});
        assert!(validate_document(&mut repairable).is_ok());
        assert_eq!(repairable["sections"]["risks-mitigations"], json!(""));

        assert_eq!(
            validate_document(&mut json!([])),
            Err(ValidationError::NotAnObject)
        );
    }

    #[test]
    fn test_delete_current_clears_pointer() {
        let store = make_store();
        let a = saved(&store, "A");
        let b = saved(&store, "B");

        store.set_current_document_id(Some(&a.id)).unwrap();
        assert!(store.delete_document(&b.id).unwrap());
        assert_eq!(store.current_document_id(), Some(a.id.clone()));

        assert!(store.delete_document(&a.id).unwrap());
        assert_eq!(store.current_document_id(), None);
        assert!(store.get_current_document().is_none());
    }

    #[test]
    fn test_delete_nonexistent_is_noop() {
        let store = make_store();
        let a = saved(&store, "A");
        assert!(!store.delete_document("doc_missing").unwrap());
        assert_eq!(store.get_documents().len(), 1);
        assert!(store.get_document(&a.id).is_some());
    }

    #[test]
    fn test_touch_document() {
        let store = make_store();
        let doc = saved(&store, "A");
        assert!(store.touch_document(&doc.id).unwrap());
        assert!(store.get_document(&doc.id).unwrap().modified >= doc.modified);
        assert!(!store.touch_document("nope").unwrap());
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_and_text() {
        let store = make_store();
        let mut prd = store.create_document(Some("Product Requirements"));
        prd.set_section(
            SectionId::FunctionalRequirements,
            SectionContent::Legacy("The requirements are listed here".into()),
        );
        store.save_document(&mut prd).unwrap();

        let mut guide = store.create_document(Some("User Guide"));
        guide.set_section(
            SectionId::ExecutiveSummary,
            SectionContent::Legacy("Guide for end users".into()),
        );
        store.save_document(&mut guide).unwrap();

        let hits = store.search_documents("requirements");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, prd.id);

        let hits = store.search_documents("Guide");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, guide.id);

        let hits = store.search_documents("END USERS");
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_search_matches_rich_text() {
        let store = make_store();
        let mut doc = store.create_document(Some("Plain"));
        doc.set_section(
            SectionId::RisksMitigations,
            SectionContent::from_markdown("Vendor **lock-in**"),
        );
        store.save_document(&mut doc).unwrap();
        assert_eq!(store.search_documents("lock-in").len(), 1);
    }

    #[test]
    fn test_recent_documents_newest_first() {
        let store = make_store();
        let base = Utc::now();
        let mut docs = Documents::new();
        for (i, name) in ["old", "mid", "new"].into_iter().enumerate() {
            let mut doc = store.create_document(Some(name));
            doc.modified = base + Duration::minutes(i as i64);
            docs.insert(doc.id.clone(), doc);
        }
        store.save_documents(&docs).unwrap();

        let recent = store.get_recent_documents(2);
        let names: Vec<_> = recent.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["new", "mid"]);
        assert_eq!(store.get_recent_documents(10).len(), 3);
    }

    #[test]
    fn test_export_import_round_trip() {
        let source = make_store();
        let a = saved(&source, "Alpha");
        let b = saved(&source, "Beta");
        let json = source.export_all_documents().unwrap();

        let target = make_store();
        assert_eq!(target.import_documents(&json).unwrap(), 2);
        let docs = target.get_documents();
        assert_eq!(docs.len(), 2);
        for doc in docs.values() {
            assert!(doc.name.ends_with(" (Imported)"));
            assert_ne!(doc.id, a.id);
            assert_ne!(doc.id, b.id);
            assert!(docs.contains_key(&doc.id));
        }
    }

    #[test]
    fn test_export_bundle_shape() {
        let store = make_store();
        saved(&store, "Alpha");
        let value: Value = serde_json::from_str(&store.export_all_documents().unwrap()).unwrap();
        assert_eq!(value["version"], json!("1.0.0"));
        assert!(value["exported"].is_string());
        assert_eq!(value["documents"].as_object().unwrap().len(), 1);
        assert_eq!(value["preferences"]["theme"], json!("light"));
    }

    #[test]
    fn test_malformed_import_does_not_mutate() {
        let store = make_store();
        saved(&store, "Existing");
        let before = store.backend.get(DOCUMENTS_KEY).unwrap();

        for bad in [
            "{not json",
            "{}",
            r#"{"documents": []}"#,
            r#"{"documents": {"x": {"id": "x", "name": "no dates"}}}"#,
        ] {
            let err = store.import_documents(bad).unwrap_err();
            assert_eq!(err.code(), "IMPORT_MALFORMED", "input: {}", bad);
        }
        assert_eq!(store.backend.get(DOCUMENTS_KEY).unwrap(), before);
    }

    #[test]
    fn test_backup_clear_restore() {
        let store = make_store();
        saved(&store, "A");
        saved(&store, "B");
        let mut prefs = Preferences::default();
        prefs.theme = "dark".into();
        prefs.auto_save_interval = 10_000;
        store.save_preferences(&prefs).unwrap();
        store.backend.set("other-app", "untouched").unwrap();

        let backup = store.create_backup();
        assert!(backup.data.keys().all(|k| k.starts_with("prd-")));

        assert!(store.clear_all_storage());
        assert!(store.get_documents().is_empty());
        assert_eq!(store.get_preferences(), Preferences::default());

        store.restore_backup(&backup).unwrap();
        assert_eq!(store.get_documents().len(), 2);
        assert_eq!(store.get_preferences(), prefs);
        assert_eq!(
            store.backend.get("other-app").unwrap().as_deref(),
            Some("untouched")
        );
    }

    #[test]
    fn test_restore_replaces_namespace() {
        let store = make_store();
        let backup = store.create_backup();
        saved(&store, "Later");
        store.restore_backup(&backup).unwrap();
        assert!(store.get_documents().is_empty());
    }

    #[test]
    fn test_restore_backup_json() {
        let store = make_store();
        saved(&store, "A");
        let json = serde_json::to_string(&store.create_backup()).unwrap();
        store.clear_all_storage();
        store.restore_backup_json(&json).unwrap();
        assert_eq!(store.get_documents().len(), 1);

        assert!(matches!(
            store.restore_backup_json(r#"{"timestamp": "x"}"#),
            Err(RestoreError::Invalid(_))
        ));
    }

    #[test]
    fn test_clear_documents_keeps_preferences() {
        let store = make_store();
        let doc = saved(&store, "A");
        store.set_current_document_id(Some(&doc.id)).unwrap();
        let mut prefs = Preferences::default();
        prefs.theme = "dark".into();
        store.save_preferences(&prefs).unwrap();

        store.clear_documents().unwrap();
        assert!(store.get_documents().is_empty());
        assert_eq!(store.current_document_id(), None);
        assert_eq!(store.get_preferences().theme, "dark");
    }

    #[test]
    fn test_preferences_default_on_corruption() {
        let store = make_store();
        store.backend.set(PREFERENCES_KEY, "{oops").unwrap();
        assert_eq!(store.get_preferences(), Preferences::default());
    }

    #[test]
    fn test_collapse_states_per_document() {
        let store = make_store();
        assert!(store.get_collapse_states("doc_a").is_empty());

        let mut states = CollapseStates::new();
        states.insert("executive-summary".into(), true);
        store.save_collapse_states("doc_a", &states).unwrap();
        store
            .save_collapse_states("doc_b", &CollapseStates::new())
            .unwrap();

        assert_eq!(store.get_collapse_states("doc_a"), states);
        assert!(store.get_collapse_states("doc_b").is_empty());

        store.backend.set(COLLAPSE_STATES_KEY, "garbage").unwrap();
        assert!(store.get_collapse_states("doc_a").is_empty());
    }

    #[test]
    fn test_stats_track_usage() {
        let store = make_store();
        let empty = store.stats();
        assert_eq!(empty.used, 0);
        saved(&store, "A");
        let stats = store.stats();
        assert!(stats.used > 0);
        assert_eq!(stats.limit, 10 * 1024 * 1024);
        assert_eq!(stats.available, stats.limit - stats.used);
    }
}
