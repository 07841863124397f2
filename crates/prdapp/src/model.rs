//! # Domain Model
//!
//! This module defines the persisted shapes of prdapp: [`Document`], its
//! [`Attachment`]s, the process-wide [`Preferences`] record and the [`Backup`]
//! snapshot format.
//!
//! ## Fixed Sections
//!
//! Every document carries exactly six named content slots, identified by
//! [`SectionId`]. The order of [`SectionId::ALL`] is the canonical order used
//! by every export format.
//!
//! | Id                            | Title                       |
//! |-------------------------------|-----------------------------|
//! | `executive-summary`           | Executive Summary           |
//! | `goals-objectives`            | Goals & Objectives          |
//! | `functional-requirements`     | Functional Requirements     |
//! | `non-functional-requirements` | Non-functional Requirements |
//! | `technical-specifications`    | Technical Specifications    |
//! | `risks-mitigations`           | Risks & Mitigations         |
//!
//! Sections are stored in a string-keyed map so that documents written by other
//! versions (extra keys, missing keys) still load; missing keys are repaired on
//! read by [`crate::store::validate_document`].
//!
//! ## Timestamps
//!
//! `created` and `modified` serialize as RFC 3339 strings. `modified` never goes
//! backwards: [`Document::touch`] takes the max of the wall clock and the
//! previous value.

use crate::content::SectionContent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const DEFAULT_DOCUMENT_NAME: &str = "Untitled PRD";
pub const DOCUMENT_VERSION: &str = "1.0.0";
pub const DEFAULT_STATUS: &str = "draft";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionId {
    ExecutiveSummary,
    GoalsObjectives,
    FunctionalRequirements,
    NonFunctionalRequirements,
    TechnicalSpecifications,
    RisksMitigations,
}

impl SectionId {
    pub const ALL: [SectionId; 6] = [
        SectionId::ExecutiveSummary,
        SectionId::GoalsObjectives,
        SectionId::FunctionalRequirements,
        SectionId::NonFunctionalRequirements,
        SectionId::TechnicalSpecifications,
        SectionId::RisksMitigations,
    ];

    /// The storage key of the section.
    pub fn key(self) -> &'static str {
        match self {
            SectionId::ExecutiveSummary => "executive-summary",
            SectionId::GoalsObjectives => "goals-objectives",
            SectionId::FunctionalRequirements => "functional-requirements",
            SectionId::NonFunctionalRequirements => "non-functional-requirements",
            SectionId::TechnicalSpecifications => "technical-specifications",
            SectionId::RisksMitigations => "risks-mitigations",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SectionId::ExecutiveSummary => "Executive Summary",
            SectionId::GoalsObjectives => "Goals & Objectives",
            SectionId::FunctionalRequirements => "Functional Requirements",
            SectionId::NonFunctionalRequirements => "Non-functional Requirements",
            SectionId::TechnicalSpecifications => "Technical Specifications",
            SectionId::RisksMitigations => "Risks & Mitigations",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SectionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        SectionId::ALL
            .into_iter()
            .find(|id| id.key() == needle || id.title().to_lowercase() == needle)
            .ok_or_else(|| format!("Unknown section: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub author: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_version() -> String {
    DOCUMENT_VERSION.to_string()
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            version: default_version(),
            author: String::new(),
            status: default_status(),
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    /// `data:<mime>;base64,<payload>`
    pub data: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub sections: BTreeMap<String, SectionContent>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl Document {
    /// A fresh, unsaved document with all six sections empty.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        let sections = SectionId::ALL
            .into_iter()
            .map(|id| (id.key().to_string(), SectionContent::default()))
            .collect();
        Self {
            id: generate_id("doc"),
            name: name.into(),
            created: now,
            modified: now,
            sections,
            attachments: Vec::new(),
            metadata: DocumentMetadata::default(),
        }
    }

    pub fn section(&self, id: SectionId) -> Option<&SectionContent> {
        self.sections.get(id.key())
    }

    pub fn set_section(&mut self, id: SectionId, content: SectionContent) {
        self.sections.insert(id.key().to_string(), content);
    }

    /// Bump `modified` to now, never moving it backwards.
    pub fn touch(&mut self) {
        self.modified = Utc::now().max(self.modified);
    }

    pub fn completed_sections(&self) -> usize {
        SectionId::ALL
            .into_iter()
            .filter(|id| self.section(*id).is_some_and(SectionContent::is_complete))
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.completed_sections() == SectionId::ALL.len()
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            modified: self.modified,
        }
    }
}

/// The `{id, name, modified}` triple returned by search and recency queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: String,
    pub name: String,
    pub modified: DateTime<Utc>,
}

pub type Documents = BTreeMap<String, Document>;

/// Per-document map of section id to collapsed flag.
pub type CollapseStates = BTreeMap<String, bool>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub auto_save_enabled: bool,
    /// Milliseconds between autosaves.
    pub auto_save_interval: u64,
    pub theme: String,
    pub default_view: String,
    pub show_storage_indicator: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            auto_save_enabled: true,
            auto_save_interval: 30_000,
            theme: "light".to_string(),
            default_view: "expanded".to_string(),
            show_storage_indicator: true,
        }
    }
}

impl Preferences {
    /// Set a preference from its camelCase key and a string value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let parse_bool = |v: &str| match v.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(format!("Expected a boolean for {}, got '{}'", key, v)),
        };
        match key {
            "autoSaveEnabled" => self.auto_save_enabled = parse_bool(value)?,
            "autoSaveInterval" => {
                self.auto_save_interval = value
                    .trim()
                    .parse()
                    .map_err(|_| format!("Expected milliseconds for {}, got '{}'", key, value))?
            }
            "theme" => self.theme = value.to_string(),
            "defaultView" => self.default_view = value.to_string(),
            "showStorageIndicator" => self.show_storage_indicator = parse_bool(value)?,
            _ => return Err(format!("Unknown preference: {}", key)),
        }
        Ok(())
    }
}

/// Snapshot of every namespaced key on the backing medium.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backup {
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub data: BTreeMap<String, String>,
}

/// `<prefix>_<unix millis>_<9 random chars>`
pub(crate) fn generate_id(prefix: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{}",
        prefix,
        Utc::now().timestamp_millis(),
        &random[..9]
    )
}
