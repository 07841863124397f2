//! # Export
//!
//! Three stateless transforms turn a [`Document`] into a downloadable
//! [`Artifact`]:
//!
//! | Format                     | Module       | Structure kept                 |
//! |----------------------------|--------------|--------------------------------|
//! | [`ExportFormat::Word`]     | [`docx`]     | rich tree walked into styles   |
//! | [`ExportFormat::Pdf`]      | [`pdf`]      | none, derived plain text only  |
//! | [`ExportFormat::Markdown`] | [`markdown`] | rich tree walked into markdown |
//!
//! All three share the section order of [`SectionId::ALL`], the header line
//! from [`header_line`] and the rule that a section whose text is blank is left
//! out. Sections without a stored delta fall back to their plain text.
//!
//! Word and PDF rendering sit behind the `docx` and `pdf` Cargo features. With
//! a feature disabled the transform fails with
//! [`ExportError::LibraryUnavailable`] before producing anything.
//!
//! Artifacts are built fully in memory. [`Artifact::write_to`] writes through a
//! temp file and a rename, so a failed export never leaves a partial file.

pub mod docx;
pub mod markdown;
pub mod pdf;

use crate::content::SectionContent;
use crate::error::ExportError;
use crate::model::{Document, SectionId};
use chrono::{DateTime, Local, Utc};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

pub const DEFAULT_FILENAME: &str = "PRD-Document";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Word,
    Pdf,
    Markdown,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Word, ExportFormat::Pdf, ExportFormat::Markdown];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Word => "docx",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Markdown => "md",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Markdown => "text/markdown",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Word => "Word",
            ExportFormat::Pdf => "PDF",
            ExportFormat::Markdown => "Markdown",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "docx" | "word" => Ok(ExportFormat::Word),
            "pdf" => Ok(ExportFormat::Pdf),
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            other => Err(format!("Unknown export format: {}", other)),
        }
    }
}

/// A fully rendered file, not yet on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Writes into `dir` atomically and returns the final path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
        let target = dir.join(&self.filename);
        let tmp = dir.join(format!(".{}-{}.tmp", self.filename, Uuid::new_v4()));
        fs::write(&tmp, &self.bytes)?;
        if let Err(e) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(target)
    }
}

pub fn export(doc: &Document, format: ExportFormat) -> Result<Artifact, ExportError> {
    let bytes = match format {
        ExportFormat::Word => docx::render(doc)?,
        ExportFormat::Pdf => pdf::render(doc)?,
        ExportFormat::Markdown => markdown::render(doc).into_bytes(),
    };
    let artifact = Artifact {
        filename: artifact_filename(doc, format),
        mime_type: format.mime_type().to_string(),
        bytes,
    };
    tracing::info!(
        id = %doc.id,
        file = %artifact.filename,
        bytes = artifact.bytes.len(),
        "Exported {}",
        format
    );
    Ok(artifact)
}

pub fn artifact_filename(doc: &Document, format: ExportFormat) -> String {
    format!("{}.{}", sanitize_filename(&doc.name), format.extension())
}

/// Keeps ASCII letters, digits, whitespace, `-` and `_`; trims; falls back to
/// `PRD-Document`.
pub fn sanitize_filename(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect();
    let trimmed = kept.trim();
    if trimmed.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// `0 Bytes`, `1 KB`, `1.5 KB`, `5 MB`. Values are rounded to two decimals
/// and never scaled past MB.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["Bytes", "KB", "MB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    while unit + 1 < UNITS.len() && bytes >= 1024u64.pow(unit as u32 + 1) {
        unit += 1;
    }
    let scaled = bytes as f64 / 1024f64.powi(unit as i32);
    let rounded = (scaled * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

/// `Created: <date> | Modified: <date time>` in local time.
pub fn header_line(doc: &Document) -> String {
    let local = |t: &DateTime<Utc>| t.with_timezone(&Local);
    format!(
        "Created: {} | Modified: {}",
        local(&doc.created).format("%Y-%m-%d"),
        local(&doc.modified).format("%Y-%m-%d %H:%M:%S")
    )
}

/// Sections with non-blank text, in canonical order.
pub(crate) fn exportable_sections(
    doc: &Document,
) -> impl Iterator<Item = (SectionId, &SectionContent)> {
    SectionId::ALL.into_iter().filter_map(|id| {
        doc.section(id)
            .filter(|content| content.is_complete())
            .map(|content| (id, content))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1234), "1.21 KB");
        assert_eq!(format_file_size(5_242_880), "5 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3072 MB");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("My PRD: v2/final!"), "My PRD v2final");
        assert_eq!(sanitize_filename("  spaced_out-name  "), "spaced_out-name");
        assert_eq!(sanitize_filename("Café"), "Caf");
        assert_eq!(sanitize_filename("???"), "PRD-Document");
        assert_eq!(sanitize_filename(""), "PRD-Document");
    }

    #[test]
    fn test_format_parsing_and_names() {
        assert_eq!("DOCX".parse::<ExportFormat>().unwrap(), ExportFormat::Word);
        assert_eq!("markdown".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert!("odt".parse::<ExportFormat>().is_err());

        let doc = Document::new("Launch Plan");
        assert_eq!(artifact_filename(&doc, ExportFormat::Pdf), "Launch Plan.pdf");
        assert_eq!(artifact_filename(&doc, ExportFormat::Markdown), "Launch Plan.md");
    }

    #[test]
    fn test_header_line_shape() {
        let doc = Document::new("A");
        let line = header_line(&doc);
        assert!(line.starts_with("Created: "));
        assert!(line.contains(" | Modified: "));
    }

    #[test]
    fn test_exportable_sections_skip_blank() {
        let mut doc = Document::new("A");
        doc.set_section(SectionId::RisksMitigations, SectionContent::Legacy("r".into()));
        doc.set_section(SectionId::ExecutiveSummary, SectionContent::Legacy("e".into()));
        doc.set_section(SectionId::GoalsObjectives, SectionContent::Legacy(" \n ".into()));
        let ids: Vec<_> = exportable_sections(&doc).map(|(id, _)| id).collect();
        assert_eq!(ids, vec![SectionId::ExecutiveSummary, SectionId::RisksMitigations]);
    }

    #[test]
    fn test_artifact_write_is_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = Artifact {
            filename: "out.md".into(),
            mime_type: "text/markdown".into(),
            bytes: b"# hi\n".to_vec(),
        };
        let path = artifact.write_to(dir.path()).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"# hi\n");
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
