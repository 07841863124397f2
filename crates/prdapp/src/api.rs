//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single
//! entry point for controllers.
//!
//! The API facade:
//! - **Normalizes inputs**: document selectors (`None`, `"2"`, an id or a name)
//!   and section names arrive as strings and are parsed here
//! - **Dispatches** to the matching `commands::*` function
//! - **Re-measures storage** after every write and appends the monitor's alert,
//!   if any, to the result
//!
//! It does no I/O of its own beyond the store: artifacts are returned, never
//! written, and nothing is printed.
//!
//! ## Generic Over StorageBackend
//!
//! `PrdApi<B: StorageBackend>` runs over any medium:
//! - Production: `PrdApi<FsBackend>` (see [`PrdApi::from_config`])
//! - Testing: `PrdApi<MemBackend>`

use crate::attachments::FileSource;
use crate::commands::helpers::{parse_section, DocumentSelector};
use crate::commands::list::ListFilter;
use crate::commands::section::SectionInput;
use crate::commands::{self, CmdMessage, CmdResult};
use crate::config::PrdConfig;
use crate::error::Result;
use crate::export::ExportFormat;
use crate::monitor::StorageMonitor;
use crate::store::{DocumentStore, FsBackend, StorageBackend};
use std::time::Instant;

pub struct PrdApi<B: StorageBackend> {
    store: DocumentStore<B>,
    monitor: StorageMonitor,
}

impl PrdApi<FsBackend> {
    /// A file-backed API rooted at the configured data directory.
    pub fn from_config(config: &PrdConfig) -> Result<Self> {
        let backend = FsBackend::new(config.data_dir()?).with_capacity(config.quota_bytes);
        Ok(Self::new(DocumentStore::with_backend(backend), config.monitor()))
    }
}

impl<B: StorageBackend> PrdApi<B> {
    pub fn new(store: DocumentStore<B>, monitor: StorageMonitor) -> Self {
        Self { store, monitor }
    }

    pub fn store(&self) -> &DocumentStore<B> {
        &self.store
    }

    fn selector(doc: Option<&str>) -> DocumentSelector {
        DocumentSelector::parse(doc)
    }

    /// Appends the storage alert after a write.
    fn after_write(&self, mut result: CmdResult) -> CmdResult {
        let report = self.monitor.report(self.store.backend());
        if let Some(message) = commands::usage::alert_message(&report) {
            result.add_message(message);
        }
        result
    }

    pub fn create_document(&self, name: Option<&str>) -> Result<CmdResult> {
        commands::create::run(&self.store, name).map(|r| self.after_write(r))
    }

    pub fn list_documents(&self, filter: &ListFilter) -> Result<CmdResult> {
        commands::list::run(&self.store, filter)
    }

    pub fn select_document(&self, doc: Option<&str>) -> Result<CmdResult> {
        commands::select::run(&self.store, &Self::selector(doc))
    }

    pub fn view_document(&self, doc: Option<&str>) -> Result<CmdResult> {
        commands::view::run(&self.store, &Self::selector(doc))
    }

    pub fn rename_document(&self, doc: Option<&str>, name: &str) -> Result<CmdResult> {
        commands::rename::run(&self.store, &Self::selector(doc), name).map(|r| self.after_write(r))
    }

    pub fn delete_document(&self, doc: Option<&str>) -> Result<CmdResult> {
        commands::delete::run(&self.store, &Self::selector(doc)).map(|r| self.after_write(r))
    }

    pub fn get_section(&self, doc: Option<&str>, section: &str) -> Result<CmdResult> {
        commands::section::get(&self.store, &Self::selector(doc), parse_section(section)?)
    }

    pub fn set_section(
        &self,
        doc: Option<&str>,
        section: &str,
        input: SectionInput,
    ) -> Result<CmdResult> {
        let id = parse_section(section)?;
        commands::section::set(&self.store, &Self::selector(doc), id, input)
            .map(|r| self.after_write(r))
    }

    pub fn attach_files<F>(
        &self,
        doc: Option<&str>,
        files: &[&dyn FileSource],
        progress: F,
    ) -> Result<CmdResult>
    where
        F: FnMut(usize, usize, &str),
    {
        commands::attach::add(&self.store, &Self::selector(doc), files, progress)
            .map(|r| self.after_write(r))
    }

    pub fn list_attachments(&self, doc: Option<&str>) -> Result<CmdResult> {
        commands::attach::list(&self.store, &Self::selector(doc))
    }

    pub fn detach(&self, doc: Option<&str>, key: &str) -> Result<CmdResult> {
        commands::attach::remove(&self.store, &Self::selector(doc), key)
            .map(|r| self.after_write(r))
    }

    pub fn clear_attachments(&self, doc: Option<&str>) -> Result<CmdResult> {
        commands::attach::clear(&self.store, &Self::selector(doc)).map(|r| self.after_write(r))
    }

    pub fn export_document(&self, doc: Option<&str>, format: ExportFormat) -> Result<CmdResult> {
        commands::export::run(&self.store, &Self::selector(doc), format)
    }

    pub fn dump(&self) -> Result<CmdResult> {
        commands::transfer::dump(&self.store)
    }

    pub fn import(&self, json: &str) -> Result<CmdResult> {
        commands::transfer::import(&self.store, json).map(|r| self.after_write(r))
    }

    pub fn backup(&self) -> Result<CmdResult> {
        commands::transfer::backup(&self.store)
    }

    pub fn restore(&self, json: &str) -> Result<CmdResult> {
        commands::transfer::restore(&self.store, json).map(|r| self.after_write(r))
    }

    pub fn usage(&self) -> Result<CmdResult> {
        commands::usage::run(&self.store, &self.monitor)
    }

    /// The monitor's alert when its poll period has elapsed and usage is high.
    pub fn poll_usage(&mut self, now: Instant) -> Option<CmdMessage> {
        let report = self.monitor.poll(now, self.store.backend())?;
        commands::usage::alert_message(&report)
    }

    pub fn preferences(&self) -> Result<CmdResult> {
        commands::prefs::show(&self.store)
    }

    pub fn set_preference(&self, key: &str, value: &str) -> Result<CmdResult> {
        commands::prefs::set(&self.store, key, value).map(|r| self.after_write(r))
    }

    pub fn collapse_states(&self, doc: Option<&str>) -> Result<CmdResult> {
        commands::collapse::get(&self.store, &Self::selector(doc))
    }

    pub fn set_collapsed(
        &self,
        doc: Option<&str>,
        section: Option<&str>,
        collapsed: bool,
    ) -> Result<CmdResult> {
        let section = section.map(parse_section).transpose()?;
        commands::collapse::set(&self.store, &Self::selector(doc), section, collapsed)
            .map(|r| self.after_write(r))
    }

    pub fn clear_all(&self) -> Result<CmdResult> {
        commands::clear::all(&self.store).map(|r| self.after_write(r))
    }

    pub fn clear_documents(&self) -> Result<CmdResult> {
        commands::clear::documents(&self.store).map(|r| self.after_write(r))
    }

    pub fn overflow_backup(&self) -> Result<CmdResult> {
        commands::clear::overflow(&self.store)
    }
}
