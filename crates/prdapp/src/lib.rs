//! # prdapp Architecture
//!
//! prdapp is a **UI-agnostic editor core for product requirements documents**:
//! six fixed rich-text sections per document, kept in a size-limited local
//! key-value store and exported to Word, PDF or Markdown. The `prd` binary is
//! one client of it; a GUI or a web view would be another.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Controller (the `prd` binary, or any other UI)             │
//! │  - Prompts, confirmations, writing artifacts to disk        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Parses selectors and section names                       │
//! │  - Appends storage alerts after writes                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Business logic, returns CmdResult                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                 ┌────────────┼─────────────┐
//!                 ▼            ▼             ▼
//!       ┌──────────────┐ ┌───────────┐ ┌──────────────┐
//!       │ session.rs   │ │ export/   │ │ attachments  │
//!       │ autosave     │ │ docx pdf  │ │ base64 files │
//!       │              │ │ markdown  │ │              │
//!       └──────────────┘ └───────────┘ └──────────────┘
//!                 │            │
//!                 ▼            ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/) + content model (content/)          │
//! │  - DocumentStore over the StorageBackend trait              │
//! │  - FsBackend (production), MemBackend (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes regular Rust values and returns
//! `Result<CmdResult>`. It never writes to stdout or stderr and never exits the
//! process. Exports come back as in-memory [`export::Artifact`]s.
//!
//! ## Testing Strategy
//!
//! 1. **Commands** and **store**: thorough unit tests against `MemBackend`.
//! 2. **API**: dispatch and input normalization.
//! 3. **Integration** (`tests/`): `FsBackend` in a temp dir, round trips
//!    through the real filesystem.
//!
//! ## Module Overview
//!
//! - [`api`]: The facade, entry point for all operations
//! - [`commands`]: Business logic for each operation
//! - [`store`]: Document store and storage backends
//! - [`content`]: Section content, deltas and the rich tree walker
//! - [`model`]: `Document`, `SectionId`, `Preferences` and friends
//! - [`session`]: One open document with autosave
//! - [`monitor`]: Storage budget measurement and alerts
//! - [`attachments`]: File ingestion
//! - [`export`]: Word, PDF and Markdown transforms
//! - [`config`]: Operator configuration
//! - [`error`]: Error types

pub mod api;
pub mod attachments;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod export;
pub mod model;
pub mod monitor;
pub mod session;
pub mod store;
