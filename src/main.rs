//! # Context Keep CLI (`ctxk`)
//!
//! The `ctxk` binary manages a project's context files from the command
//! line and can start the JSON HTTP server the file-management UI talks to.
//!
//! ## Usage
//!
//! ```bash
//! ctxk --config ./config/ctxk.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ctxk init` | Create the context directory |
//! | `ctxk list` | List stored context file names |
//! | `ctxk show <name>` | Print one context file |
//! | `ctxk add <name>` | Add or overwrite a file from `--content` or `--file` |
//! | `ctxk drop <path>` | Ingest a file directly under its own name |
//! | `ctxk rm <name>` | Delete a context file |
//! | `ctxk reset` | Empty the context directory |
//! | `ctxk issues` | List repository issues via the `gh` CLI |
//! | `ctxk serve` | Start the JSON HTTP server |

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use context_keep::classify::{self, ViewState};
use context_keep::config::{self, Config};
use context_keep::ingest::{self, DroppedItem, DroppedPayload};
use context_keep::issues;
use context_keep::models::FileKind;
use context_keep::server;
use context_keep::store::ContextStore;

/// Context Keep CLI — a local-first context file manager for project
/// workspaces.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file naming the project's context directory.
#[derive(Parser)]
#[command(
    name = "ctxk",
    about = "Context Keep — a local-first context file manager for project workspaces",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/ctxk.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Create the context directory.
    ///
    /// Idempotent: running it when the directory already exists is safe
    /// and leaves existing files untouched.
    Init,

    /// List stored context file names in stable (sorted) order.
    List,

    /// Print one context file's kind and content.
    Show {
        /// Context file name.
        name: String,
    },

    /// Add or overwrite a context file.
    ///
    /// Writing an existing name silently replaces its content (last write
    /// wins). Content comes from exactly one of `--content` or `--file`;
    /// image files given via `--file` are stored as base64 data-URLs.
    Add {
        /// Context file name (stored verbatim; spaces and parentheses are fine).
        name: String,

        /// Inline text content. An empty string is a valid value.
        #[arg(long)]
        content: Option<String>,

        /// Read content from this file on disk.
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Ingest a file from disk directly, with no dialog step.
    ///
    /// The stored name is the dropped file's own name and the content is
    /// its text or encoded bytes, mirroring a drop onto the main view.
    Drop {
        /// Path of the file to ingest.
        path: PathBuf,
    },

    /// Delete a context file. Fails if the name does not exist.
    Rm {
        /// Context file name.
        name: String,
    },

    /// Empty the context directory and recreate it.
    Reset,

    /// List repository issues via the `gh` CLI.
    ///
    /// Requires the configured repo directory to have a GitHub `origin`
    /// remote; otherwise reports the missing remote and exits non-zero.
    Issues {
        /// Which issues to show: `open`, `closed`, or `all` (open first).
        #[arg(long, default_value = "all")]
        state: String,

        /// Print the full JSON response instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Start the JSON HTTP server.
    ///
    /// Binds to the address configured in `[server].bind` and serves the
    /// context CRUD and issues endpoints.
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            ContextStore::open(&cfg.project.context_dir)?;
            println!(
                "Context directory ready: {}",
                cfg.project.context_dir.display()
            );
        }
        Commands::List => {
            let store = ContextStore::open(&cfg.project.context_dir)?;
            for name in store.list()? {
                println!("{}", name);
            }
        }
        Commands::Show { name } => {
            let store = ContextStore::open(&cfg.project.context_dir)?;
            let file = match store.read(&name) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            println!("name: {}", file.name);
            println!(
                "kind: {}",
                match file.kind {
                    FileKind::Text => "text",
                    FileKind::Image => "image",
                }
            );
            // Markdown opens in preview, plain text in the editor
            println!(
                "view: {}",
                match classify::classify(&file.name).initial_view() {
                    ViewState::Preview => "preview",
                    ViewState::Edit => "edit",
                    ViewState::Image => "image",
                }
            );
            println!();
            println!("{}", file.content);
        }
        Commands::Add {
            name,
            content,
            file,
        } => {
            let store = ContextStore::open(&cfg.project.context_dir)?;
            let staged = match (content, file) {
                (Some(text), None) => {
                    ingest::manual(&name, &text, classify::kind_of(&name))?
                }
                (None, Some(path)) => {
                    let item = dropped_item_from_path(&path, Some(name))?;
                    ingest::stage(&item)?
                }
                _ => bail!("provide exactly one of --content or --file"),
            };
            ingest::commit(&store, &staged)?;
            println!("added {}", staged.name);
        }
        Commands::Drop { path } => {
            let store = ContextStore::open(&cfg.project.context_dir)?;
            let item = dropped_item_from_path(&path, None)?;
            let file = ingest::drop_onto_view(&store, &item)?;
            println!("dropped {}", file.name);
        }
        Commands::Rm { name } => {
            let store = ContextStore::open(&cfg.project.context_dir)?;
            match store.delete(&name) {
                Ok(()) => println!("deleted {}", name),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Reset => {
            let store = ContextStore::open(&cfg.project.context_dir)?;
            store.reset()?;
            println!("context directory reset");
        }
        Commands::Issues { state, json } => {
            run_issues(&cfg, &state, json)?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}

/// Build a dropped item from a file on disk. The stored name defaults to
/// the file's own name, matching drag-and-drop auto-population.
fn dropped_item_from_path(path: &Path, name_override: Option<String>) -> Result<DroppedItem> {
    let name = match name_override {
        Some(n) => n,
        None => path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| anyhow::anyhow!("cannot derive a file name from {}", path.display()))?,
    };

    let bytes = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;

    Ok(DroppedItem {
        name,
        payload: DroppedPayload::Bytes(bytes),
    })
}

fn run_issues(cfg: &Config, state: &str, json: bool) -> Result<()> {
    if !matches!(state, "open" | "closed" | "all") {
        bail!("unknown state '{}'. Must be open, closed, or all.", state);
    }

    let report = match issues::fetch_issues(&cfg.issues) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if json {
        let body = serde_json::json!({
            "open": report.open,
            "closed": report.closed,
            "all": report.combined(),
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let selected: Vec<&issues::Issue> = match state {
        "open" => report.open.iter().collect(),
        "closed" => report.closed.iter().collect(),
        _ => report.open.iter().chain(report.closed.iter()).collect(),
    };

    println!("{:<7} {:<8} TITLE", "NUMBER", "STATE");
    for issue in &selected {
        let labels = issue
            .labels
            .iter()
            .map(|l| l.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        if labels.is_empty() {
            println!("#{:<6} {:<8} {}", issue.number, issue.state, issue.title);
        } else {
            println!(
                "#{:<6} {:<8} {} [{}]",
                issue.number, issue.state, issue.title, labels
            );
        }
    }
    println!();
    println!(
        "open: {}  closed: {}",
        report.open.len(),
        report.closed.len()
    );

    Ok(())
}
