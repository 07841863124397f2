//! # Dispatch
//!
//! `run()` parses arguments, builds the [`AppContext`] and hands each
//! subcommand to its `handle_*` function. Handlers call the API, write any
//! artifacts to disk and print the result.
//!
//! Errors bubble up as `anyhow::Error` to `main`, which prints them and exits
//! with status 1. A write refused for lack of space is intercepted first: see
//! [`handle_storage_full`].

use super::render::{
    print_messages, render_attachments, render_collapse_states, render_document,
    render_document_list, render_json, render_preferences, render_section, render_usage,
};
use super::setup::{Cli, Commands, DocArg, OutArg, OutputMode, SectionCommands, SectionSource};
use super::styles;
use anyhow::{bail, Context, Result};
use clap::Parser;
use prdapp::api::PrdApi;
use prdapp::attachments::{DiskFile, FileSource};
use prdapp::commands::list::ListFilter;
use prdapp::commands::section::SectionInput;
use prdapp::commands::{CmdMessage, CmdResult};
use prdapp::config::PrdConfig;
use prdapp::content::Delta;
use prdapp::error::PrdError;
use prdapp::export::ExportFormat;
use prdapp::store::FsBackend;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

struct AppContext {
    api: PrdApi<FsBackend>,
    output: OutputMode,
    yes: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut ctx = init_context(&cli)?;
    let command = cli.command.unwrap_or(Commands::List {
        search: None,
        recent: None,
    });

    match dispatch(&mut ctx, command) {
        Err(e) if is_storage_full(&e) => {
            handle_storage_full(&ctx)?;
            Err(e)
        }
        other => other,
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("prdapp=debug,prd=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let config = PrdConfig::load()?;
    tracing::debug!(?config, "Loaded configuration");
    let api = PrdApi::from_config(&config)?;
    Ok(AppContext {
        api,
        output: cli.output,
        yes: cli.yes,
    })
}

fn dispatch(ctx: &mut AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::New { name } => handle_new(ctx, name),
        Commands::List { search, recent } => handle_list(ctx, ListFilter { search, recent }),
        Commands::Search { term } => handle_list(
            ctx,
            ListFilter {
                search: Some(term),
                recent: None,
            },
        ),
        Commands::Select { doc } => handle_select(ctx, &doc),
        Commands::Show { doc } => handle_show(ctx, doc.as_deref()),
        Commands::Rename { doc, name } => handle_rename(ctx, &doc, name),
        Commands::Delete { doc } => handle_delete(ctx, &doc),
        Commands::Section(SectionCommands::Get { doc, section }) => {
            handle_section_get(ctx, &doc, &section)
        }
        Commands::Section(SectionCommands::Set {
            doc,
            section,
            source,
        }) => handle_section_set(ctx, &doc, &section, source),
        Commands::Attach { doc, files } => handle_attach(ctx, &doc, &files),
        Commands::Attachments { doc } => handle_attachments(ctx, &doc),
        Commands::Detach {
            doc,
            attachment,
            all,
        } => handle_detach(ctx, &doc, attachment, all),
        Commands::Export { doc, format, out } => handle_export(ctx, &doc, format, &out),
        Commands::Dump { out } => handle_dump(ctx, &out),
        Commands::Import { file } => handle_import(ctx, &file),
        Commands::Backup { out } => handle_backup(ctx, &out),
        Commands::Restore { file } => handle_restore(ctx, &file),
        Commands::Usage => handle_usage(ctx),
        Commands::Prefs { key, value } => handle_prefs(ctx, key, value),
        Commands::Collapse {
            doc,
            section,
            all,
            expand,
        } => handle_collapse(ctx, &doc, section, all, expand),
        Commands::Clear { documents } => handle_clear(ctx, documents),
    }
}

/// Prints a result: `body` then messages in a terminal, one JSON object
/// otherwise.
fn finish(ctx: &AppContext, result: &CmdResult, files: &[String], body: Option<String>) {
    match ctx.output {
        OutputMode::Json => println!("{}", render_json(result, files)),
        OutputMode::Term => {
            if let Some(body) = body {
                print!("{}", body);
            }
            print_messages(&result.messages);
        }
    }
}

fn handle_new(ctx: &mut AppContext, name: Vec<String>) -> Result<()> {
    let name = name.join(" ");
    let name = Some(name.as_str()).filter(|n| !n.trim().is_empty());
    let result = ctx.api.create_document(name)?;
    finish(ctx, &result, &[], None);
    Ok(())
}

fn handle_list(ctx: &mut AppContext, filter: ListFilter) -> Result<()> {
    let result = ctx.api.list_documents(&filter)?;
    let body = render_document_list(&result.listed_documents);
    finish(ctx, &result, &[], Some(body));
    Ok(())
}

fn handle_select(ctx: &mut AppContext, doc: &str) -> Result<()> {
    let result = ctx.api.select_document(Some(doc))?;
    finish(ctx, &result, &[], None);
    Ok(())
}

fn handle_show(ctx: &mut AppContext, doc: Option<&str>) -> Result<()> {
    let result = ctx.api.view_document(doc)?;
    let body = result.affected_documents.first().map(|summary| {
        render_document(
            summary,
            result.listed_documents.first(),
            &result.sections,
            &result.attachments,
        )
    });
    finish(ctx, &result, &[], body);
    Ok(())
}

fn handle_rename(ctx: &mut AppContext, doc: &DocArg, name: Vec<String>) -> Result<()> {
    let result = ctx.api.rename_document(doc.as_deref(), &name.join(" "))?;
    finish(ctx, &result, &[], None);
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, doc: &str) -> Result<()> {
    // Resolve once so the prompt names the document and the delete targets its id
    let target = ctx.api.view_document(Some(doc))?;
    let Some(summary) = target.affected_documents.first() else {
        bail!("Document not found: {}", doc);
    };
    if !confirm(ctx, &format!("Delete '{}'?", summary.name))? {
        return cancelled(ctx);
    }
    let result = ctx.api.delete_document(Some(summary.id.as_str()))?;
    finish(ctx, &result, &[], None);
    Ok(())
}

fn handle_section_get(ctx: &mut AppContext, doc: &DocArg, section: &str) -> Result<()> {
    let result = ctx.api.get_section(doc.as_deref(), section)?;
    let body = result.sections.first().map(render_section);
    finish(ctx, &result, &[], body);
    Ok(())
}

fn handle_section_set(
    ctx: &mut AppContext,
    doc: &DocArg,
    section: &str,
    source: SectionSource,
) -> Result<()> {
    let input = read_section_input(source)?;
    let result = ctx.api.set_section(doc.as_deref(), section, input)?;
    finish(ctx, &result, &[], None);
    Ok(())
}

/// The explicit source, or piped stdin read as markdown.
fn read_section_input(source: SectionSource) -> Result<SectionInput> {
    if let Some(text) = source.text {
        return Ok(SectionInput::Text(text));
    }
    if let Some(markdown) = source.markdown {
        return Ok(SectionInput::Markdown(markdown));
    }
    if let Some(json) = source.delta {
        let delta: Delta = serde_json::from_str(&json).context("Invalid delta JSON")?;
        return Ok(SectionInput::Delta(delta));
    }
    if let Some(path) = source.file {
        let markdown = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return Ok(SectionInput::Markdown(markdown));
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        bail!("No content given: use --text, --markdown, --delta, --file or pipe it on stdin");
    }
    let mut buffer = String::new();
    stdin
        .lock()
        .read_to_string(&mut buffer)
        .context("Failed to read stdin")?;
    Ok(SectionInput::Markdown(buffer))
}

fn handle_attach(ctx: &mut AppContext, doc: &DocArg, paths: &[PathBuf]) -> Result<()> {
    let files = paths
        .iter()
        .map(|path| DiskFile::open(path).with_context(|| format!("Failed to open {}", path.display())))
        .collect::<Result<Vec<_>>>()?;
    let sources: Vec<&dyn FileSource> = files.iter().map(|f| f as &dyn FileSource).collect();

    let show_progress = ctx.output == OutputMode::Term && sources.len() > 1;
    let result = ctx.api.attach_files(doc.as_deref(), &sources, |index, total, name| {
        if show_progress {
            eprintln!("{}", styles::MUTED.apply_to(format!("[{}/{}] {}", index, total, name)));
        }
    })?;
    finish(ctx, &result, &[], None);
    Ok(())
}

fn handle_attachments(ctx: &mut AppContext, doc: &DocArg) -> Result<()> {
    let result = ctx.api.list_attachments(doc.as_deref())?;
    let body = render_attachments(&result.attachments);
    finish(ctx, &result, &[], Some(body));
    Ok(())
}

fn handle_detach(
    ctx: &mut AppContext,
    doc: &DocArg,
    attachment: Option<String>,
    all: bool,
) -> Result<()> {
    let result = match (all, attachment) {
        (true, _) => ctx.api.clear_attachments(doc.as_deref())?,
        (false, Some(key)) => ctx.api.detach(doc.as_deref(), &key)?,
        (false, None) => bail!("Name an attachment or pass --all"),
    };
    finish(ctx, &result, &[], None);
    Ok(())
}

fn handle_export(
    ctx: &mut AppContext,
    doc: &DocArg,
    format: ExportFormat,
    out: &OutArg,
) -> Result<()> {
    let mut result = ctx.api.export_document(doc.as_deref(), format)?;
    let files = write_artifacts(&mut result, &out_dir(out)?)?;
    finish(ctx, &result, &files, None);
    Ok(())
}

fn handle_dump(ctx: &mut AppContext, out: &OutArg) -> Result<()> {
    let mut result = ctx.api.dump()?;
    let files = write_artifacts(&mut result, &out_dir(out)?)?;
    finish(ctx, &result, &files, None);
    Ok(())
}

fn handle_import(ctx: &mut AppContext, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let result = ctx.api.import(&json)?;
    finish(ctx, &result, &[], None);
    Ok(())
}

fn handle_backup(ctx: &mut AppContext, out: &OutArg) -> Result<()> {
    let mut result = ctx.api.backup()?;
    let files = write_artifacts(&mut result, &out_dir(out)?)?;
    finish(ctx, &result, &files, None);
    Ok(())
}

fn handle_restore(ctx: &mut AppContext, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    if !confirm(ctx, "Replace all stored data with this backup?")? {
        return cancelled(ctx);
    }
    let result = ctx.api.restore(&json)?;
    finish(ctx, &result, &[], None);
    Ok(())
}

fn handle_usage(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.usage()?;
    let body = result.usage.as_ref().map(render_usage);
    finish(ctx, &result, &[], body);
    Ok(())
}

fn handle_prefs(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    match (key, value) {
        (None, _) => {
            let result = ctx.api.preferences()?;
            let body = result.preferences.as_ref().map(render_preferences);
            finish(ctx, &result, &[], body);
        }
        (Some(key), None) => {
            let result = ctx.api.preferences()?;
            let prefs = serde_json::to_value(&result.preferences)?;
            let Some(value) = prefs.get(&key) else {
                bail!("Unknown preference: {}", key);
            };
            let value = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
            finish(ctx, &result, &[], Some(format!("{} = {}\n", key, value)));
        }
        (Some(key), Some(value)) => {
            let result = ctx.api.set_preference(&key, &value)?;
            finish(ctx, &result, &[], None);
        }
    }
    Ok(())
}

fn handle_collapse(
    ctx: &mut AppContext,
    doc: &DocArg,
    section: Option<String>,
    all: bool,
    expand: bool,
) -> Result<()> {
    if section.is_none() && !all {
        let result = ctx.api.collapse_states(doc.as_deref())?;
        let body = result.collapse_states.as_ref().map(render_collapse_states);
        finish(ctx, &result, &[], body);
        return Ok(());
    }
    let result = ctx
        .api
        .set_collapsed(doc.as_deref(), section.as_deref(), !expand)?;
    finish(ctx, &result, &[], None);
    Ok(())
}

fn handle_clear(ctx: &mut AppContext, documents_only: bool) -> Result<()> {
    let prompt = if documents_only {
        "Delete every document? Preferences are kept."
    } else {
        "Delete all stored data, preferences included?"
    };
    if !confirm(ctx, prompt)? {
        return cancelled(ctx);
    }
    let result = if documents_only {
        ctx.api.clear_documents()?
    } else {
        ctx.api.clear_all()?
    };
    finish(ctx, &result, &[], None);
    Ok(())
}

/// Writes the overflow backup into the working directory, then offers to clear
/// documents so the next save can succeed.
fn handle_storage_full(ctx: &AppContext) -> Result<()> {
    let mut result = ctx.api.overflow_backup()?;
    let dir = std::env::current_dir().context("Failed to determine the working directory")?;
    let files = write_artifacts(&mut result, &dir)?;

    if confirm(ctx, "Storage is full. Clear all documents to free space?")? {
        let cleared = ctx.api.clear_documents()?;
        result.messages.extend(cleared.messages);
    } else {
        result.add_message(CmdMessage::info(
            "Documents kept. Run `prd clear --documents` once the backup is safe.",
        ));
    }
    finish(ctx, &result, &files, None);
    Ok(())
}

fn is_storage_full(err: &anyhow::Error) -> bool {
    err.downcast_ref::<PrdError>()
        .is_some_and(PrdError::is_storage_full)
}

fn out_dir(out: &OutArg) -> Result<PathBuf> {
    match &out.out {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir().context("Failed to determine the working directory"),
    }
}

/// Writes every artifact of `result` into `dir` and records where.
fn write_artifacts(result: &mut CmdResult, dir: &Path) -> Result<Vec<String>> {
    let mut written = Vec::new();
    for artifact in &result.artifacts {
        let path = artifact
            .write_to(dir)
            .with_context(|| format!("Failed to write {}", artifact.filename))?;
        written.push(path.display().to_string());
    }
    for path in &written {
        result.add_message(CmdMessage::success(format!("Saved: {}", path)));
    }
    Ok(written)
}

/// `--yes` confirms; without a terminal to ask on, the answer is no.
fn confirm(ctx: &AppContext, prompt: &str) -> Result<bool> {
    if ctx.yes {
        return Ok(true);
    }
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return Ok(false);
    }
    eprint!("{} [y/N] ", styles::WARNING.apply_to(prompt));
    io::stderr().flush()?;
    let mut answer = String::new();
    stdin.lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn cancelled(ctx: &AppContext) -> Result<()> {
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::warning("Cancelled (pass --yes to confirm)"));
    finish(ctx, &result, &[], None);
    Ok(())
}
