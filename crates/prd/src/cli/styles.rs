//! Terminal styles.
//!
//! Code refers to styles by what the text *is* (an index, a timestamp, a
//! completed section), never by color. Colors are dropped automatically when
//! stdout is not a terminal.

use console::Style;
use once_cell::sync::Lazy;

pub static INDEX: Lazy<Style> = Lazy::new(|| Style::new().yellow());
pub static CURRENT: Lazy<Style> = Lazy::new(|| Style::new().cyan().bold());
pub static TITLE: Lazy<Style> = Lazy::new(|| Style::new().bold());
pub static TIME: Lazy<Style> = Lazy::new(|| Style::new().color256(247).italic());
pub static MUTED: Lazy<Style> = Lazy::new(|| Style::new().dim());

pub static COMPLETE: Lazy<Style> = Lazy::new(|| Style::new().green());
pub static INCOMPLETE: Lazy<Style> = Lazy::new(|| Style::new().dim());

pub static INFO: Lazy<Style> = Lazy::new(|| Style::new().dim());
pub static SUCCESS: Lazy<Style> = Lazy::new(|| Style::new().green());
pub static WARNING: Lazy<Style> = Lazy::new(|| Style::new().yellow());
pub static ERROR: Lazy<Style> = Lazy::new(|| Style::new().red());
