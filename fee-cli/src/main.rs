use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;

use fee_cli::app::{self, App, ExportedFile};
use fee_cli::logging;
use fee_core::db::DbConfig;
use fee_core::{CurrencyDisplay, Discipline};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Design fee calculator for structural and architectural projects.
///
/// Prices forms against the fee tables, explains every step of the
/// calculation and keeps a workspace of saved projects per discipline.
#[derive(Debug, Parser)]
#[command(name = "design-fee", version)]
struct Cli {
    /// Project store backend (`sqlite` or `memory`).
    #[arg(long, env = "DESIGN_FEE_BACKEND", default_value = "sqlite", global = true)]
    backend: String,

    /// Store connection string.
    /// For SQLite this is a file path (e.g. `projects.db`) or `:memory:`.
    #[arg(long, env = "DESIGN_FEE_DB", default_value = "design-fee.db", global = true)]
    db: String,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `fee_core=trace`. Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// CSV file replacing the built-in structural construction types.
    #[arg(long, global = true)]
    construction_types: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Calculate a form (or the current form) and print the explained result.
    Calc {
        /// Form JSON file. Without it the discipline's current form is used.
        form: Option<PathBuf>,
        #[arg(short, long, value_parser = parse_discipline)]
        discipline: Discipline,
        /// Display currency: eur, bgn or both. Defaults to the form's preference.
        #[arg(long, value_parser = parse_currency)]
        currency: Option<CurrencyDisplay>,
        /// Print the structured result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print a discipline's price tables.
    Tables {
        #[arg(value_parser = parse_discipline)]
        discipline: Discipline,
        /// Write the structural table as CSV, in the `--construction-types` layout.
        #[arg(long)]
        csv: bool,
    },
    /// Import project bundles, workspace exports or bare forms.
    Import {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Discipline for entries that do not name one.
        #[arg(short, long, value_parser = parse_discipline)]
        discipline: Discipline,
    },
    /// List saved projects, newest first.
    List {
        #[arg(short, long, value_parser = parse_discipline)]
        discipline: Discipline,
        /// Include archived projects.
        #[arg(long)]
        all: bool,
    },
    /// Calculate a saved project and print the result.
    Show {
        id: String,
        #[arg(long, value_parser = parse_currency)]
        currency: Option<CurrencyDisplay>,
    },
    /// Export a saved project's calculation as plain text.
    ExportTxt {
        id: String,
        /// Output file. Prints to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, value_parser = parse_currency)]
        currency: Option<CurrencyDisplay>,
    },
    /// Export a discipline's whole workspace as JSON.
    ExportWorkspace {
        #[arg(short, long, value_parser = parse_discipline)]
        discipline: Discipline,
        /// Output file. Prints to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Move a project to the archive.
    Archive { id: String },
    /// Restore an archived project.
    Unarchive { id: String },
    /// Delete a saved project.
    Delete { id: String },
    /// Save a form into the workspace.
    Save {
        form: PathBuf,
        #[arg(short, long, value_parser = parse_discipline)]
        discipline: Discipline,
        /// Overwrite this saved project instead of creating a new one.
        #[arg(long)]
        project: Option<String>,
        /// Save as a new project even when `--project` is given.
        #[arg(long)]
        as_new: bool,
    },
    /// Show or rename the workspace.
    Workspace {
        #[arg(short, long, value_parser = parse_discipline)]
        discipline: Discipline,
        /// New workspace name.
        #[arg(long)]
        rename: Option<String>,
    },
    /// Remove every saved project of a discipline.
    Clear {
        #[arg(short, long, value_parser = parse_discipline)]
        discipline: Discipline,
        /// Confirm the removal.
        #[arg(long)]
        yes: bool,
    },
}

fn parse_discipline(s: &str) -> Result<Discipline, String> {
    Discipline::parse(s).ok_or_else(|| format!("unknown discipline '{s}' (expected arch or struct)"))
}

fn parse_currency(s: &str) -> Result<CurrencyDisplay, String> {
    CurrencyDisplay::parse(s).ok_or_else(|| format!("unknown currency '{s}' (expected eur, bgn or both)"))
}

// ─── helpers ─────────────────────────────────────────────────────────────────

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read '{}'", path.display()))
}

fn emit(
    exported: ExportedFile,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, exported.contents)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            println!("{}", path.display());
        }
        None => {
            debug!(suggested = %exported.suggested_name, "writing export to stdout");
            print!("{}", exported.contents);
        }
    }
    Ok(())
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_default_logging();

    let cli = Cli::parse();
    if let Some(level) = &cli.log_level {
        logging::set_log_level(level)?;
    }
    if let Some(path) = &cli.log_file {
        logging::enable_file_logging(path)?;
    }

    let db_config = DbConfig {
        backend: cli.backend,
        connection_string: cli.db,
    };

    debug!("connecting to {} backend", db_config.backend);
    let registry = app::build_registry();
    let repo = registry.create(&db_config).await?;
    let types = app::load_construction_types(cli.construction_types.as_deref())?;
    let app = App::new(repo, types);

    match cli.command {
        Command::Calc {
            form,
            discipline,
            currency,
            json,
        } => {
            let text = form.as_deref().map(read_file).transpose()?;
            print!("{}", app.calc(discipline, text.as_deref(), currency, json).await?);
        }
        Command::Tables { discipline, csv } => print!("{}", app.tables(discipline, csv)?),
        Command::Import { files, discipline } => {
            let files = files
                .iter()
                .map(|path| -> anyhow::Result<(String, String)> {
                    Ok((path.display().to_string(), read_file(path)?))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            let count = app.import(discipline, &files).await?;
            println!("Импортирани проекти: {count}");
        }
        Command::List { discipline, all } => print!("{}", app.list(discipline, all).await?),
        Command::Show { id, currency } => print!("{}", app.show(&id, currency).await?),
        Command::ExportTxt { id, out, currency } => {
            emit(app.export_txt(&id, currency).await?, out.as_deref())?
        }
        Command::ExportWorkspace { discipline, out } => {
            emit(app.export_workspace(discipline).await?, out.as_deref())?
        }
        Command::Archive { id } => app.set_archived(&id, true).await?,
        Command::Unarchive { id } => app.set_archived(&id, false).await?,
        Command::Delete { id } => app.delete(&id).await?,
        Command::Save {
            form,
            discipline,
            project,
            as_new,
        } => {
            let text = read_file(&form)?;
            let saved = app.save(discipline, &text, project.as_deref(), as_new).await?;
            println!("{}  {}", saved.id, saved.name);
        }
        Command::Workspace { discipline, rename } => {
            println!("{}", app.workspace(discipline, rename.as_deref()).await?)
        }
        Command::Clear { discipline, yes } => {
            if !yes {
                anyhow::bail!("refusing to clear the {} workspace without --yes", discipline.as_str());
            }
            println!("Изтрити проекти: {}", app.clear(discipline).await?);
        }
    }

    Ok(())
}
