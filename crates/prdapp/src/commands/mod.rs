//! # Command Layer
//!
//! The business logic of every user-facing operation. Each command lives in its
//! own submodule as plain functions over a [`DocumentStore`](crate::store::DocumentStore).
//!
//! Commands:
//! - Operate on [`Document`], [`SectionContent`](crate::content::SectionContent)
//!   and the other domain types
//! - Return a structured [`CmdResult`] with the affected documents, listings,
//!   artifacts and messages
//! - Never print, prompt or touch the terminal. Confirmations are the caller's
//!   job: commands return data, the UI decides.
//!
//! Exported files come back as [`Artifact`]s; writing them somewhere is the
//! caller's concern too.
//!
//! ## Testing Strategy
//!
//! Most behaviour is tested here, against a `MemBackend` store.
//!
//! ## Command Modules
//!
//! - [`create`]: New documents
//! - [`list`]: Listing, search and recency
//! - [`select`]: Switch the current document
//! - [`view`]: One document with all its sections
//! - [`rename`]: Change a document's name
//! - [`delete`]: Remove a document
//! - [`section`]: Read and write section content
//! - [`attach`]: Attachment ingestion and removal
//! - [`export`]: Word, PDF and Markdown artifacts
//! - [`transfer`]: JSON dump/import and raw backup/restore
//! - [`usage`]: Storage budget report
//! - [`prefs`]: Editor preferences
//! - [`collapse`]: Per-document section collapse flags
//! - [`clear`]: Wiping storage and the overflow plan
//! - [`helpers`]: Document selectors and ordering

use crate::export::Artifact;
use crate::model::{Attachment, CollapseStates, Document, DocumentSummary, Preferences};
use crate::monitor::UsageReport;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub mod attach;
pub mod clear;
pub mod collapse;
pub mod create;
pub mod delete;
pub mod export;
pub mod helpers;
pub mod list;
pub mod prefs;
pub mod rename;
pub mod section;
pub mod select;
pub mod transfer;
pub mod usage;
pub mod view;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// A document as shown in a list: its position in the recency order plus
/// progress counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentListing {
    /// 1-based position in the most-recently-modified order.
    pub index: usize,
    pub id: String,
    pub name: String,
    pub modified: DateTime<Utc>,
    pub completed_sections: usize,
    pub total_sections: usize,
    pub attachments: usize,
    pub is_current: bool,
}

/// One section rendered for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    pub key: &'static str,
    pub title: &'static str,
    pub complete: bool,
    pub text: String,
    pub markdown: String,
    pub collapsed: bool,
}

/// Attachment metadata without its payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentInfo {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&Attachment> for AttachmentInfo {
    fn from(attachment: &Attachment) -> Self {
        Self {
            id: attachment.id.clone(),
            name: attachment.name.clone(),
            size: attachment.size,
            mime_type: attachment.mime_type.clone(),
            uploaded_at: attachment.uploaded_at,
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_documents: Vec<DocumentSummary>,
    pub listed_documents: Vec<DocumentListing>,
    pub sections: Vec<SectionView>,
    pub attachments: Vec<AttachmentInfo>,
    pub artifacts: Vec<Artifact>,
    pub usage: Option<UsageReport>,
    pub preferences: Option<Preferences>,
    pub collapse_states: Option<CollapseStates>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_document(mut self, doc: &Document) -> Self {
        self.affected_documents.push(doc.summary());
        self
    }

    pub fn with_listed_documents(mut self, listings: Vec<DocumentListing>) -> Self {
        self.listed_documents = listings;
        self
    }

    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifacts.push(artifact);
        self
    }
}
