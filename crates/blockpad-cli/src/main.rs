use anyhow::{Context, Result, bail};
use blockpad_config::Config;
use blockpad_engine::editing::{EditorSession, HistoryOptions, SystemClock};
use blockpad_engine::parsing::{BlockTypeDetector, list_number, serialize_document};
use blockpad_engine::text::utf16_len;
use blockpad_engine::wikilink::WikiLinkSession;
use blockpad_engine::{BlockKind, Document, IoError, NotesDirIndex, io};
use clap::{Parser, Subcommand};
use relative_path::RelativePathBuf;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "blockpad", version, about = "Work with blockpad notes from the terminal")]
struct Cli {
    /// Notes directory (defaults to `notes_path` from the config file)
    #[arg(long, global = true, value_name = "DIR")]
    notes: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a note in canonical markdown form
    Fmt {
        /// Note path relative to the notes directory
        note: String,
        /// Rewrite the note in place instead of printing it
        #[arg(short, long)]
        write: bool,
    },
    /// Type a line at the end of a note, creating the note if needed
    Append {
        /// Note path relative to the notes directory
        note: String,
        /// Markdown for one block, e.g. "- buy milk"
        text: String,
    },
    /// List the blocks a note parses into
    Blocks { note: String },
    /// Show which block type typed text would turn into
    Detect { text: String },
    /// Suggest notes for a wiki-link query
    Links { query: String },
}

fn main() -> Result<()> {
    // info by default, RUST_LOG overrides
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Detect { text } => detect(&text),
        Command::Fmt { note, write } => {
            let (notes_path, _) = resolve_notes(cli.notes)?;
            fmt(&notes_path, &note, write)
        }
        Command::Append { note, text } => {
            let (notes_path, config) = resolve_notes(cli.notes)?;
            append(&notes_path, &config, &note, &text)
        }
        Command::Blocks { note } => {
            let (notes_path, _) = resolve_notes(cli.notes)?;
            blocks(&notes_path, &note)
        }
        Command::Links { query } => {
            let (notes_path, config) = resolve_notes(cli.notes)?;
            links(&notes_path, &config, &query)
        }
    }
}

/// Notes directory from the flag or the config file, plus the config to use
/// for engine settings.
fn resolve_notes(flag: Option<PathBuf>) -> Result<(PathBuf, Config)> {
    let config = Config::load().context("Failed to load config file")?;
    let notes_path = match (flag, &config) {
        (Some(path), _) => {
            log::info!("Using notes path from --notes: {}", path.display());
            path
        }
        (None, Some(config)) => {
            log::info!("Using notes path from config: {}", config.notes_path.display());
            config.notes_path.clone()
        }
        (None, None) => bail!(
            "No notes directory given and no config file found; pass --notes or create {}",
            Config::config_path().display()
        ),
    };
    io::validate_notes_dir(&notes_path)
        .with_context(|| format!("Cannot use notes directory {}", notes_path.display()))?;
    let config = config.unwrap_or_else(|| Config::new(notes_path.clone()));
    Ok((notes_path, config))
}

fn fmt(notes_path: &Path, note: &str, write: bool) -> Result<()> {
    let path = RelativePathBuf::from(note);
    let doc = io::load_document(&path, notes_path)?;

    if write {
        io::save_document(&path, notes_path, &doc)?;
        log::info!("Formatted {path}");
    } else {
        print!("{}", serialize_document(&doc));
    }
    Ok(())
}

fn history_options(config: &Config) -> HistoryOptions {
    HistoryOptions {
        max_undo_levels: config.history.max_undo_levels,
        grouping_window_ms: config.history.grouping_window_ms,
    }
}

fn append(notes_path: &Path, config: &Config, note: &str, text: &str) -> Result<()> {
    let path = RelativePathBuf::from(note);
    let doc = match io::load_document(&path, notes_path) {
        Ok(doc) => doc,
        Err(IoError::NotFound(_)) => {
            log::info!("Creating {path}");
            Document::new()
        }
        Err(err) => return Err(err.into()),
    };

    let mut session = EditorSession::with_clock(doc, history_options(config), SystemClock);
    let index = if session.document().is_blank() {
        0
    } else {
        let last = session.document().block_count() - 1;
        session.insert_paragraph(last)?;
        last + 1
    };
    session.handle_content_change(index, text)?;
    // typed markers such as `# ` or `- ` convert the block
    session.handle_space(index)?;
    log::debug!(
        "append: {} undo step(s) recorded",
        session.history().undo_len()
    );

    io::save_document(&path, notes_path, session.document())?;
    log::info!("Appended to {path}");
    Ok(())
}

fn blocks(notes_path: &Path, note: &str) -> Result<()> {
    let doc = io::load_document(&RelativePathBuf::from(note), notes_path)?;
    for (index, block) in doc.blocks().iter().enumerate() {
        println!(
            "{index:>4}  {:<14} {:<10} {}",
            block.block_type().name(),
            describe_kind(&doc, index),
            block.content().lines().next().unwrap_or("")
        );
    }
    Ok(())
}

fn describe_kind(doc: &Document, index: usize) -> String {
    match doc.blocks()[index].kind() {
        BlockKind::BulletList { level } => format!("level={level}"),
        BlockKind::NumberedList { level } => {
            format!("#{} level={level}", list_number(doc.blocks(), index))
        }
        BlockKind::CodeBlock {
            language: Some(language),
        } => format!("lang={language}"),
        _ => String::new(),
    }
}

fn detect(text: &str) -> Result<()> {
    match BlockTypeDetector::default().detect(text) {
        Some(detected) => {
            println!("type:      {}", detected.block_type);
            println!("prefix:    {}", detected.matched_prefix_len);
            println!("remaining: {:?}", detected.remaining_content);
            if let Some(language) = detected.language {
                println!("language:  {language}");
            }
        }
        None => println!("type:      paragraph (no trigger)"),
    }
    Ok(())
}

fn links(notes_path: &Path, config: &Config, query: &str) -> Result<()> {
    let index = NotesDirIndex::new(notes_path);
    let mut session = WikiLinkSession::with_result_limit(config.wikilink.result_limit);
    let typed = format!("[[{query}");
    let caret = utf16_len(&typed);
    if session.on_text_change(0, &typed, caret).is_none() {
        bail!("Query {query:?} cannot be part of a wiki link");
    }
    session.refresh_results(&index);

    let Some(active) = session.active() else {
        return Ok(());
    };
    if active.results.is_empty() {
        log::info!("No notes match {query:?}");
    }
    for title in &active.results {
        println!("[[{title}]]");
    }
    Ok(())
}
