use clap::{Args, Parser, Subcommand, ValueEnum};
use prdapp::export::ExportFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "prd", bin_name = "prd", version)]
#[command(
    about = "Write product requirements documents and export them to Word, PDF or Markdown",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (debug logs on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,

    /// Answer yes to confirmation prompts
    #[arg(short, long, global = true, help_heading = "Options")]
    pub yes: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputMode::Term, help_heading = "Options")]
    pub output: OutputMode,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Styled text for a terminal
    Term,
    /// Machine-readable JSON
    Json,
}

/// The document a command acts on.
#[derive(Args, Debug, Clone, Default)]
pub struct DocArg {
    /// Document index, id or name (default: the current document)
    #[arg(short, long = "doc", value_name = "DOC")]
    pub doc: Option<String>,
}

impl DocArg {
    pub fn as_deref(&self) -> Option<&str> {
        self.doc.as_deref()
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutArg {
    /// Directory to write into (default: the working directory)
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new document and make it current
    #[command(alias = "create", display_order = 1)]
    New {
        /// Name words (joined with spaces)
        #[arg(trailing_var_arg = true)]
        name: Vec<String>,
    },

    /// List documents, most recently modified first
    #[command(alias = "ls", display_order = 2)]
    List {
        /// Only documents whose name or text matches
        #[arg(short, long)]
        search: Option<String>,

        /// Only the N most recently modified
        #[arg(short, long, value_name = "N")]
        recent: Option<usize>,
    },

    /// Search documents by name and section text
    #[command(display_order = 3)]
    Search { term: String },

    /// Make a document current
    #[command(display_order = 10)]
    Select {
        /// Document index, id or name
        doc: String,
    },

    /// Show a document with all its sections
    #[command(alias = "view", display_order = 11)]
    Show {
        /// Document index, id or name (default: the current document)
        doc: Option<String>,
    },

    /// Rename a document
    #[command(display_order = 12)]
    Rename {
        #[command(flatten)]
        doc: DocArg,

        /// New name words (joined with spaces)
        #[arg(required = true, trailing_var_arg = true)]
        name: Vec<String>,
    },

    /// Delete a document
    #[command(alias = "rm", display_order = 13)]
    Delete {
        /// Document index, id or name
        doc: String,
    },

    /// Read or write one section
    #[command(subcommand, display_order = 14)]
    Section(SectionCommands),

    /// Attach files to a document
    #[command(display_order = 20)]
    Attach {
        #[command(flatten)]
        doc: DocArg,

        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
    },

    /// List a document's attachments
    #[command(display_order = 21)]
    Attachments {
        #[command(flatten)]
        doc: DocArg,
    },

    /// Remove an attachment (by id or name), or all of them
    #[command(display_order = 22)]
    Detach {
        #[command(flatten)]
        doc: DocArg,

        #[arg(required_unless_present = "all", conflicts_with = "all")]
        attachment: Option<String>,

        /// Remove every attachment
        #[arg(long)]
        all: bool,
    },

    /// Export a document to Word, PDF or Markdown
    #[command(display_order = 30)]
    Export {
        #[command(flatten)]
        doc: DocArg,

        /// docx, pdf or md
        #[arg(short, long, default_value = "docx")]
        format: ExportFormat,

        #[command(flatten)]
        out: OutArg,
    },

    /// Write every document to a portable JSON file
    #[command(display_order = 31)]
    Dump {
        #[command(flatten)]
        out: OutArg,
    },

    /// Add the documents of a dump file as new copies
    #[command(display_order = 32)]
    Import { file: PathBuf },

    /// Snapshot all stored data to a JSON file
    #[command(display_order = 33)]
    Backup {
        #[command(flatten)]
        out: OutArg,
    },

    /// Replace all stored data with a backup file
    #[command(display_order = 34)]
    Restore { file: PathBuf },

    /// Show how much of the storage quota is used
    #[command(display_order = 40)]
    Usage,

    /// Show or set editor preferences
    #[command(display_order = 41)]
    Prefs {
        /// Preference key (e.g. autoSaveEnabled, theme)
        key: Option<String>,

        /// Value to set (if omitted, prints all preferences)
        value: Option<String>,
    },

    /// Show, collapse or expand sections
    #[command(display_order = 42)]
    Collapse {
        #[command(flatten)]
        doc: DocArg,

        /// Section key or title
        section: Option<String>,

        /// Apply to every section
        #[arg(long, conflicts_with = "section")]
        all: bool,

        /// Expand instead of collapse
        #[arg(long)]
        expand: bool,
    },

    /// Delete stored data
    #[command(display_order = 43)]
    Clear {
        /// Only documents; preferences are kept
        #[arg(long)]
        documents: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum SectionCommands {
    /// Print a section
    Get {
        #[command(flatten)]
        doc: DocArg,

        /// Section key or title (e.g. executive-summary)
        section: String,
    },

    /// Replace a section's content (reads stdin when no source is given)
    Set {
        #[command(flatten)]
        doc: DocArg,

        /// Section key or title (e.g. executive-summary)
        section: String,

        #[command(flatten)]
        source: SectionSource,
    },
}

#[derive(Args, Debug, Clone, Default)]
#[group(multiple = false)]
pub struct SectionSource {
    /// Plain text, one paragraph per line
    #[arg(long)]
    pub text: Option<String>,

    /// Markdown
    #[arg(long)]
    pub markdown: Option<String>,

    /// A rich-text delta as JSON (`{"ops": [...]}`)
    #[arg(long)]
    pub delta: Option<String>,

    /// Read markdown from a file
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}
