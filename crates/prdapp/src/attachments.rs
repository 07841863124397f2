//! # Attachments
//!
//! Files attached to a document are stored inline: each [`Attachment`] holds
//! its bytes as a `data:<mime>;base64,<payload>` URI inside the document, so
//! attachments live and die with their document and there is no separate blob
//! store.
//!
//! ## Rules
//!
//! - A file larger than [`MAX_FILE_SIZE`] (5 MiB) is rejected.
//! - A file whose name matches an existing attachment, or a file accepted
//!   earlier in the same batch, is rejected. Names are compared exactly;
//!   content is never compared.
//!
//! Rejections are reported per file. A batch keeps going after a rejection or a
//! read failure, and what was accepted is kept.
//!
//! ## Batches
//!
//! [`add_files`] validates every candidate first, then reads the accepted ones
//! in order, calling the progress callback with `(position, accepted_count,
//! name)` before each read. It only mutates the in-memory document; the caller
//! saves once afterwards.

use crate::error::AttachmentError;
use crate::export::format_file_size;
use crate::model::{generate_id, Attachment, Document};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

pub const IMAGE_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/gif", "image/webp"];

const OCTET_STREAM: &str = "application/octet-stream";

/// A file offered for attachment.
pub trait FileSource {
    fn name(&self) -> &str;
    fn size(&self) -> u64;
    fn mime_type(&self) -> String;
    fn read_all(&self) -> std::io::Result<Vec<u8>>;
}

fn guess_mime(name: &str) -> String {
    mime_guess::from_path(name)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}

/// A file on disk. Size comes from metadata so oversize files are rejected
/// without being read.
#[derive(Debug, Clone)]
pub struct DiskFile {
    path: PathBuf,
    name: String,
    size: u64,
}

impl DiskFile {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let meta = fs::metadata(&path)?;
        if !meta.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            path,
            name,
            size: meta.len(),
        })
    }
}

impl FileSource for DiskFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn mime_type(&self) -> String {
        guess_mime(&self.name)
    }

    fn read_all(&self) -> std::io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}

#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    mime_type: Option<String>,
    bytes: Vec<u8>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: None,
            bytes,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

impl FileSource for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn mime_type(&self) -> String {
        self.mime_type
            .clone()
            .unwrap_or_else(|| guess_mime(&self.name))
    }

    fn read_all(&self) -> std::io::Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

pub fn data_uri(mime_type: &str, bytes: &[u8]) -> String {
    let mime_type = if mime_type.is_empty() {
        OCTET_STREAM
    } else {
        mime_type
    };
    format!("data:{};base64,{}", mime_type, BASE64.encode(bytes))
}

impl Attachment {
    /// The raw bytes behind the data URI.
    pub fn decode(&self) -> Result<Vec<u8>, AttachmentError> {
        let read_error = |message: String| AttachmentError::Read {
            name: self.name.clone(),
            message,
        };
        let payload = self
            .data
            .split_once(";base64,")
            .map(|(_, payload)| payload)
            .ok_or_else(|| read_error("not a base64 data URI".to_string()))?;
        BASE64
            .decode(payload)
            .map_err(|e| read_error(e.to_string()))
    }

    pub fn is_image(&self) -> bool {
        IMAGE_TYPES.contains(&self.mime_type.as_str())
    }
}

/// Checks size and name against the attachments already present.
pub fn validate(existing: &[Attachment], name: &str, size: u64) -> Result<(), AttachmentError> {
    if size > MAX_FILE_SIZE {
        return Err(AttachmentError::TooLarge {
            name: name.to_string(),
            size,
            limit_label: format_file_size(MAX_FILE_SIZE),
        });
    }
    if existing.iter().any(|att| att.name == name) {
        return Err(AttachmentError::Duplicate {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Reads and encodes one file. Does not validate.
pub fn encode<F: FileSource + ?Sized>(file: &F) -> Result<Attachment, AttachmentError> {
    let bytes = file.read_all().map_err(|e| AttachmentError::Read {
        name: file.name().to_string(),
        message: e.to_string(),
    })?;
    let mime_type = file.mime_type();
    Ok(Attachment {
        id: generate_id("att"),
        name: file.name().to_string(),
        size: bytes.len() as u64,
        data: data_uri(&mime_type, &bytes),
        mime_type,
        uploaded_at: Utc::now(),
    })
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub added: Vec<Attachment>,
    pub failures: Vec<AttachmentError>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Validates, reads and appends `files` to `doc`. See the module docs.
pub fn add_files<F>(
    doc: &mut Document,
    files: &[&dyn FileSource],
    mut progress: F,
) -> BatchReport
where
    F: FnMut(usize, usize, &str),
{
    let mut report = BatchReport::default();

    let mut accepted: Vec<&dyn FileSource> = Vec::new();
    let mut seen: Vec<&str> = Vec::new();
    for file in files {
        let verdict = validate(&doc.attachments, file.name(), file.size()).and_then(|()| {
            if seen.contains(&file.name()) {
                Err(AttachmentError::Duplicate {
                    name: file.name().to_string(),
                })
            } else {
                Ok(())
            }
        });
        match verdict {
            Ok(()) => {
                seen.push(file.name());
                accepted.push(*file);
            }
            Err(e) => {
                tracing::warn!("Rejected attachment: {}", e);
                report.failures.push(e);
            }
        }
    }

    let total = accepted.len();
    for (i, file) in accepted.into_iter().enumerate() {
        progress(i + 1, total, file.name());
        match encode(file) {
            Ok(attachment) => {
                doc.attachments.push(attachment.clone());
                report.added.push(attachment);
            }
            Err(e) => {
                tracing::warn!("{}", e);
                report.failures.push(e);
            }
        }
    }
    report
}

pub fn remove(doc: &mut Document, attachment_id: &str) -> Option<Attachment> {
    let index = doc.attachments.iter().position(|a| a.id == attachment_id)?;
    Some(doc.attachments.remove(index))
}

/// Finds by id, then by exact name.
pub fn find<'a>(doc: &'a Document, key: &str) -> Option<&'a Attachment> {
    doc.attachments
        .iter()
        .find(|a| a.id == key)
        .or_else(|| doc.attachments.iter().find(|a| a.name == key))
}

pub fn clear(doc: &mut Document) -> usize {
    let count = doc.attachments.len();
    doc.attachments.clear();
    count
}

pub fn total_size(doc: &Document) -> u64 {
    doc.attachments.iter().map(|a| a.size).sum()
}
