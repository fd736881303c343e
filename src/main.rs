//! markstudio - live Markdown rendering from the command line.
//!
//! # Usage
//!
//! ```bash
//! markstudio render README.md -o preview.html
//! markstudio spans README.md --json
//! markstudio watch README.md -o preview.html
//! markstudio export README.md -o print.html
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use markstudio::app::{DEFAULT_AUTOSAVE_PERIOD_MS, DEFAULT_DEBOUNCE_MS, Session, Watch};
use markstudio::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    save_config_flags,
};
use markstudio::files;
use markstudio::perf;
use markstudio::render::DEFAULT_PDF_FONT;

/// Live Markdown preview and highlighting
#[derive(Parser, Debug)]
#[command(name = "markstudio", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Never autosave the document
    #[arg(long, global = true)]
    no_autosave: bool,

    /// Quiet period before re-rendering after an edit
    #[arg(long, global = true, value_name = "MS")]
    debounce_ms: Option<u64>,

    /// Autosave period
    #[arg(long, global = true, value_name = "SECS")]
    autosave_secs: Option<u64>,

    /// Font declared on the print page
    #[arg(long, global = true, value_name = "NAME")]
    pdf_font: Option<String>,

    /// Print timing information to stderr
    #[arg(long, global = true)]
    perf: bool,

    /// Write detailed render events to a file
    #[arg(long, global = true, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long, global = true)]
    save: bool,

    /// Clear saved defaults
    #[arg(long, global = true)]
    clear: bool,
}

impl Cli {
    fn flags(&self) -> ConfigFlags {
        ConfigFlags {
            no_autosave: self.no_autosave,
            perf: self.perf,
            debounce_ms: self.debounce_ms,
            autosave_secs: self.autosave_secs,
            pdf_font: self.pdf_font.clone(),
            render_debug_log: self.render_debug_log.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the styled preview markup
    Render {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the highlight spans
    Spans {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Print document statistics
    Stats {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Write the print-ready page for a PDF renderer
    Export {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Re-render whenever the file changes on disk
    Watch {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Rewrite this file after every render
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Exit after this many renders
        #[arg(long)]
        max_renders: Option<u64>,
    },
}

fn build_session(flags: &ConfigFlags) -> Session {
    let mut session = Session::new()
        .with_debounce_ms(flags.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS))
        .with_autosave_period_ms(
            flags
                .autosave_period_ms()
                .unwrap_or(DEFAULT_AUTOSAVE_PERIOD_MS),
        )
        .with_pdf_font(
            flags
                .pdf_font
                .clone()
                .unwrap_or_else(|| DEFAULT_PDF_FONT.to_string()),
        );
    session.set_autosave_enabled(!flags.no_autosave);
    session
}

fn load(session: &mut Session, file: &Path) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }
    let _scope = perf::scope("main.load");
    let text = files::read_document(file)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    session.load_document(&text, Some(file.to_path_buf()));
    Ok(())
}

fn emit(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => files::write_document(path, text)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

fn run(command: Command, mut session: Session) -> Result<()> {
    match command {
        Command::Render { file, output } => {
            load(&mut session, &file)?;
            emit(output.as_deref(), session.styled_markup())
        }
        Command::Spans { file, json } => {
            load(&mut session, &file)?;
            let spans = session.style_spans();
            if json {
                let out = serde_json::to_string_pretty(spans.as_slice())
                    .context("Failed to serialize spans")?;
                println!("{out}");
            } else {
                for span in spans.iter() {
                    println!(
                        "{}:{}-{} {}",
                        span.line + 1,
                        span.start,
                        span.end,
                        span.kind.tag_name()
                    );
                }
            }
            Ok(())
        }
        Command::Stats { file, json } => {
            load(&mut session, &file)?;
            let stats = session.stats();
            if json {
                let out =
                    serde_json::to_string_pretty(&stats).context("Failed to serialize stats")?;
                println!("{out}");
            } else {
                println!("Characters: {}", stats.chars);
                println!("Words:      {}", stats.words);
                println!("Lines:      {}", stats.lines);
                println!("Paragraphs: {}", stats.paragraphs);
            }
            Ok(())
        }
        Command::Export { file, output } => {
            load(&mut session, &file)?;
            session
                .export(0, &output)
                .with_context(|| format!("Failed to export {}", file.display()))
        }
        Command::Watch {
            file,
            output,
            max_renders,
        } => Watch::new(file)
            .with_output(output)
            .with_max_renders(max_renders)
            .run(&mut session)
            .context("Watch error"),
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = cli.flags();

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);
    tracing::debug!(?effective, "effective flags");

    perf::set_enabled(effective.perf);
    let render_debug_log_path = effective
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os("MARKSTUDIO_RENDER_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(render_debug_log_path.as_deref()) {
        tracing::warn!(
            path = %render_debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            %err,
            "failed to initialize render debug log"
        );
    }

    let session = build_session(&effective);
    run(cli.command, session)
}
