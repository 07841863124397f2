//! # Rendering
//!
//! Turns `CmdResult` data into terminal text. Every `render_*` function returns
//! a `String` so layout can be tested without a terminal; the CLI prints it.
//!
//! ## List Layout
//!
//! ```text
//! ▸ 1. Checkout Revamp                                     3/6 ⎘2   5 minutes ago
//!   2. Pricing Page                                        0/6        2 days ago
//! ```
//!
//! - marker (2): `▸` for the current document
//! - index: position in the recency order, usable as a selector
//! - name (fill): truncated with `…` to keep lines at `LINE_WIDTH`
//! - progress (9): completed sections, attachment count
//! - time (14, right-aligned): last modification

use super::styles;
use chrono::{DateTime, Utc};
use console::Style;
use prdapp::commands::{
    AttachmentInfo, CmdMessage, CmdResult, DocumentListing, MessageLevel, SectionView,
};
use prdapp::export::format_file_size;
use prdapp::model::{CollapseStates, DocumentSummary, Preferences, SectionId};
use prdapp::monitor::{UsageLevel, UsageReport};
use serde::Serialize;
use std::fmt::Write;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const PROGRESS_WIDTH: usize = 9;
const CURRENT_MARKER: &str = "▸ ";
const ATTACHMENT_MARKER: &str = "⎘";
const DONE_MARKER: &str = "✓";
const EMPTY_MARKER: &str = "○";
const RULE: &str = "────────────────────────────────────────";

pub fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        println!("{}", message_style(&message.level).apply_to(&message.content));
    }
}

fn message_style(level: &MessageLevel) -> &'static Style {
    match level {
        MessageLevel::Info => &*styles::INFO,
        MessageLevel::Success => &*styles::SUCCESS,
        MessageLevel::Warning => &*styles::WARNING,
        MessageLevel::Error => &*styles::ERROR,
    }
}

pub fn render_document_list(docs: &[DocumentListing]) -> String {
    let mut out = String::new();
    for doc in docs {
        let marker = if doc.is_current { CURRENT_MARKER } else { "  " };
        let index = format!("{}. ", doc.index);

        let mut progress = format!("{}/{}", doc.completed_sections, doc.total_sections);
        if doc.attachments > 0 {
            progress.push_str(&format!(" {}{}", ATTACHMENT_MARKER, doc.attachments));
        }
        let progress = pad_right(&progress, PROGRESS_WIDTH);

        let fixed = marker.width() + index.width() + PROGRESS_WIDTH + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed);
        let name = truncate_to_width(&doc.name, available);
        let padding = available.saturating_sub(name.width());

        let progress_style = if doc.completed_sections == doc.total_sections {
            &styles::COMPLETE
        } else {
            &styles::MUTED
        };
        let (marker, index) = if doc.is_current {
            (
                styles::CURRENT.apply_to(marker).to_string(),
                styles::CURRENT.apply_to(&index).to_string(),
            )
        } else {
            (marker.to_string(), styles::INDEX.apply_to(&index).to_string())
        };

        let _ = writeln!(
            out,
            "{}{}{}{}{}{}",
            marker,
            index,
            name,
            " ".repeat(padding),
            progress_style.apply_to(progress),
            styles::TIME.apply_to(format_time_ago(doc.modified))
        );
    }
    out
}

/// A whole document: header, every section (collapsed ones as a title only)
/// and the attachment list.
pub fn render_document(
    summary: &DocumentSummary,
    listing: Option<&DocumentListing>,
    sections: &[SectionView],
    attachments: &[AttachmentInfo],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", styles::TITLE.apply_to(&summary.name));

    let completed = sections.iter().filter(|s| s.complete).count();
    let mut meta = format!(
        "{} · {}/{} complete · modified {}",
        summary.id,
        completed,
        SectionId::ALL.len(),
        format_time_ago(summary.modified).trim()
    );
    if let Some(listing) = listing {
        meta = format!("#{} · {}", listing.index, meta);
    }
    let _ = writeln!(out, "{}", styles::MUTED.apply_to(meta));
    let _ = writeln!(out, "{}", styles::MUTED.apply_to(RULE));

    for section in sections {
        out.push('\n');
        out.push_str(&render_section(section));
    }

    if !attachments.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "{}", styles::TITLE.apply_to("Attachments"));
        out.push_str(&render_attachments(attachments));
    }
    out
}

pub fn render_section(section: &SectionView) -> String {
    let mut out = String::new();
    let (marker, style) = if section.complete {
        (DONE_MARKER, &styles::COMPLETE)
    } else {
        (EMPTY_MARKER, &styles::INCOMPLETE)
    };
    let mut heading = format!("{} {}", style.apply_to(marker), styles::TITLE.apply_to(section.title));
    if section.collapsed {
        heading.push_str(&format!(" {}", styles::MUTED.apply_to("(collapsed)")));
        let _ = writeln!(out, "{}", heading);
        return out;
    }
    let _ = writeln!(out, "{}", heading);

    if section.markdown.trim().is_empty() {
        let _ = writeln!(out, "  {}", styles::MUTED.apply_to("(empty)"));
    } else {
        for line in section.markdown.lines() {
            if line.is_empty() {
                out.push('\n');
            } else {
                let _ = writeln!(out, "  {}", line);
            }
        }
    }
    out
}

pub fn render_attachments(attachments: &[AttachmentInfo]) -> String {
    let mut out = String::new();
    if attachments.is_empty() {
        let _ = writeln!(out, "{}", styles::MUTED.apply_to("No attachments."));
        return out;
    }
    let name_width = attachments
        .iter()
        .map(|a| a.name.width())
        .max()
        .unwrap_or(0)
        .min(LINE_WIDTH / 2);
    for attachment in attachments {
        let name = truncate_to_width(&attachment.name, name_width + 1);
        let _ = writeln!(
            out,
            "  {}  {}  {}  {}",
            pad_right(&name, name_width),
            pad_left(&format_file_size(attachment.size), 10),
            styles::MUTED.apply_to(&attachment.mime_type),
            styles::MUTED.apply_to(&attachment.id)
        );
    }
    out
}

pub fn render_usage(report: &UsageReport) -> String {
    let stats = &report.stats;
    let style = match report.level {
        UsageLevel::Nominal => &styles::COMPLETE,
        UsageLevel::Caution => &styles::WARNING,
        UsageLevel::Critical => &styles::ERROR,
    };
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Storage: {} of {} used ({})",
        format_file_size(stats.used),
        format_file_size(stats.limit),
        style.apply_to(format!("{:.1}%", stats.percentage))
    );
    let _ = writeln!(out, "Available: {}", format_file_size(stats.available));
    out
}

pub fn render_preferences(prefs: &Preferences) -> String {
    let mut out = String::new();
    for (key, value) in [
        ("autoSaveEnabled", prefs.auto_save_enabled.to_string()),
        ("autoSaveInterval", prefs.auto_save_interval.to_string()),
        ("theme", prefs.theme.clone()),
        ("defaultView", prefs.default_view.clone()),
        ("showStorageIndicator", prefs.show_storage_indicator.to_string()),
    ] {
        let _ = writeln!(out, "{} = {}", pad_right(key, 20), value);
    }
    out
}

pub fn render_collapse_states(states: &CollapseStates) -> String {
    let mut out = String::new();
    for id in SectionId::ALL {
        let collapsed = states.get(id.key()).copied().unwrap_or(false);
        let state = if collapsed {
            styles::MUTED.apply_to("collapsed")
        } else {
            styles::COMPLETE.apply_to("expanded")
        };
        let _ = writeln!(out, "{}  {}", pad_right(id.key(), 28), state);
    }
    out
}

#[derive(Serialize)]
struct JsonView<'a> {
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    documents: &'a [DocumentListing],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    affected: &'a [DocumentSummary],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    sections: &'a [SectionView],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    attachments: &'a [AttachmentInfo],
    #[serde(skip_serializing_if = "Option::is_none")]
    usage: Option<&'a UsageReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preferences: Option<&'a Preferences>,
    #[serde(skip_serializing_if = "Option::is_none")]
    collapse_states: Option<&'a CollapseStates>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    files: &'a [String],
    messages: &'a [CmdMessage],
}

/// The result as pretty JSON. `files` are the paths the CLI wrote artifacts to.
pub fn render_json(result: &CmdResult, files: &[String]) -> String {
    let view = JsonView {
        documents: &result.listed_documents,
        affected: &result.affected_documents,
        sections: &result.sections,
        attachments: &result.attachments,
        usage: result.usage.as_ref(),
        preferences: result.preferences.as_ref(),
        collapse_states: result.collapse_states.as_ref(),
        files,
        messages: &result.messages,
    };
    serde_json::to_string_pretty(&view).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

fn pad_right(s: &str, width: usize) -> String {
    format!("{}{}", s, " ".repeat(width.saturating_sub(s.width())))
}

fn pad_left(s: &str, width: usize) -> String {
    format!("{}{}", " ".repeat(width.saturating_sub(s.width())), s)
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);

    let formatter = Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());

    // Singular units get an extra space so plural and singular columns align
    let time_str = time_str
        .replace("hour ago", "hour  ago")
        .replace("minute ago", "minute  ago")
        .replace("second ago", "second  ago")
        .replace("day ago", "day  ago")
        .replace("week ago", "week  ago")
        .replace("month ago", "month  ago")
        .replace("year ago", "year  ago");

    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
