//! # prd CLI
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, while this file
//! only invokes `cli::run()` and handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/prdapp/`: UI-agnostic library (documents, storage, export)
//! - `crates/prd/`: this CLI, one client of the library
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/prd/src/cli/)                            │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Dispatch, prompts, artifact writing (commands.rs)        │
//! │  - Terminal rendering (render.rs, styles.rs)                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/prdapp/src/api.rs)                       │
//! │  - Parses selectors and section names                       │
//! │  - Returns structured `CmdResult` values                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything from `api.rs` inward returns data. Printing, confirmation
//! prompts, exit codes and writing exported files to disk happen here.
//!
//! ## Testing Approach
//!
//! - Rendering is tested with canned `CmdResult` data in `render.rs`.
//! - `tests/` drives the real binary against a temporary data directory
//!   (`PRD_DATA_DIR`).

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
