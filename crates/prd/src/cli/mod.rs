//! # CLI Behavior
//!
//! This is **one possible UI client** for prdapp, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes and
//! output formatting.
//!
//! ## Selecting Documents
//!
//! Commands that act on a document take `-d/--doc`. Without it they act on the
//! current document (the one last created or selected). A document can be named
//! by its position in `prd list`, its id, or its name.
//!
//! ### Naked Execution (`prd`)
//!
//! Running `prd` with no arguments defaults to `prd list`.
//!
//! ## Files
//!
//! Exports, dumps and backups are written into `--out` (default: the working
//! directory). Writes are atomic, so a failed export never leaves a partial file.
//!
//! ## Storage Full
//!
//! When a write is refused because the store is full, the CLI writes
//! `prd-documents-backup.json` into the working directory and asks before
//! clearing documents. `--yes` answers for you; without a terminal and without
//! `--yes` nothing is cleared.
//!
//! ## Module Structure
//!
//! - `commands`: Dispatch and per-command handlers
//! - `render`: Output formatting (lists, sections, usage, messages)
//! - `setup`: Argument parsing via clap
//! - `styles`: Terminal styles

mod commands;
mod render;
pub mod setup;
mod styles;

pub use commands::run;
