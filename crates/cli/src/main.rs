//! BiosAudit CLI
//!
//! Fleet BIOS compliance scanner, catalog admin tool and web server runner.

use anyhow::{Context, Result};
use biosaudit_analyzer::{export_file_name, write_csv, Analyzer, CatalogSnapshot, Report};
use biosaudit_api::{create_router, AppState};
use biosaudit_database::{version_map_from_json, ReferenceStore, StoreConfig};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufWriter;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "biosaudit")]
#[command(about = "BiosAudit - Fleet BIOS Version Compliance")]
#[command(version)]
struct Cli {
    /// Database file path [default: $BIOSAUDIT_DATABASE or bios_database.db]
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// JSON mirror file path [default: $BIOSAUDIT_JSON_DB or bios_versions.json]
    #[arg(short, long)]
    json_db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        /// Address to bind to
        #[arg(short, long, default_value = "127.0.0.1:5000")]
        bind: SocketAddr,

        /// Static files directory
        #[arg(short, long)]
        static_dir: Option<PathBuf>,
    },

    /// Analyze an inventory export and print the compliance report
    Scan {
        /// Inventory file (CSV, comma or semicolon separated)
        file: PathBuf,

        /// Print every row, not only the problems
        #[arg(short, long)]
        all: bool,
    },

    /// Analyze an inventory export and write the report as CSV
    Export {
        /// Inventory file
        file: PathBuf,

        /// Output path (defaults to Raport_BIOS_<date>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage the reference catalog
    #[command(subcommand)]
    Refs(RefsCommand),

    /// Copy the JSON mirror into the database
    Sync,
}

#[derive(Subcommand)]
enum RefsCommand {
    /// List catalog entries
    List,

    /// Add an entry
    Add {
        /// Vendor ("Other" keeps the model name as given)
        vendor: String,
        model: String,
        version: String,
    },

    /// Change an entry's latest version
    Edit {
        id: i64,
        version: String,

        /// Mark the model as no longer supported
        #[arg(long)]
        old: bool,
    },

    /// Delete an entry
    Delete { id: i64 },

    /// Merge a {"Model": "Version"} JSON file into the catalog
    Import { file: PathBuf },

    /// Print the JSON mirror
    Dump,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    let mut config = StoreConfig::default();
    if let Some(path) = cli.database {
        config.database_path = path;
    }
    if let Some(path) = cli.json_db {
        config.json_path = path;
    }

    let store = ReferenceStore::open(&config).await?;

    match cli.command {
        Commands::Serve { bind, static_dir } => {
            serve(store, bind, static_dir).await?;
        }
        Commands::Scan { file, all } => {
            scan(&store, &file, all).await?;
        }
        Commands::Export { file, output } => {
            export(&store, &file, output).await?;
        }
        Commands::Refs(command) => {
            refs(&store, command).await?;
        }
        Commands::Sync => {
            let summary = store.sync().await?;
            println!("Inserted {}, updated {}", summary.inserted, summary.updated);
        }
    }

    Ok(())
}

async fn serve(store: ReferenceStore, bind: SocketAddr, static_dir: Option<PathBuf>) -> Result<()> {
    let summary = store.sync().await?;
    info!(inserted = summary.inserted, updated = summary.updated, "Catalog synced at startup");

    let state = Arc::new(AppState::new(store));
    let router = create_router(state, static_dir.clone());

    info!("Starting BiosAudit server on {}", bind);
    if let Some(ref dir) = static_dir {
        info!("Serving static files from {}", dir.display());
    }
    info!("API available at http://{}/api/v1", bind);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

async fn analyze(store: &ReferenceStore, file: &Path) -> Result<Report> {
    let catalog = CatalogSnapshot::new(store.list().await?);
    if catalog.is_empty() {
        eprintln!("Warning: reference catalog is empty, every row will lack a reference.");
    }

    Analyzer::analyze_file(file, &catalog)
        .with_context(|| format!("Failed to analyze {}", file.display()))
}

async fn scan(store: &ReferenceStore, file: &Path, all: bool) -> Result<()> {
    let report = analyze(store, file).await?;
    let stats = &report.statistics;

    println!("Analysis date: {}", stats.analysis_date.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"));
    println!("Machines:      {}", stats.total);
    println!("  Up to date:  {}", stats.ok);
    println!("  Newer:       {}", stats.newer);
    println!("  Outdated:    {}", stats.outdated);
    println!("  Unknown:     {}", stats.unknown);
    println!("Compliance:    {:.1}%", stats.compliance_rate);
    println!("Outdated:      {:.1}%", stats.outdated_pct);
    println!("Risk:          {}", stats.risk.label());

    if !stats.departments.is_empty() {
        println!();
        println!("{:<12} {:>6} {:>6} {:>9} {:>8} {:>7}", "DEPARTMENT", "TOTAL", "OK", "OUTDATED", "UNKNOWN", "SCORE");
        println!("{}", "-".repeat(53));
        for dept in &stats.departments {
            println!(
                "{:<12} {:>6} {:>6} {:>9} {:>8} {:>6.1}%",
                dept.name, dept.total, dept.ok, dept.outdated, dept.unknown, dept.score
            );
        }
    }

    let rows: Vec<_> = report
        .rows
        .iter()
        .filter(|r| all || !r.classification.is_ok())
        .collect();

    if !rows.is_empty() {
        println!();
        println!("{:<16} {:<28} {:<12} {:<12} {}", "NAME", "MODEL", "VER PC", "VER BAZA", "STATUS");
        println!("{}", "-".repeat(84));
        for row in rows {
            println!(
                "{:<16} {:<28} {:<12} {:<12} {}",
                row.computer_name, row.model, row.current_version, row.latest_version, row.status
            );
        }
    }

    Ok(())
}

async fn export(store: &ReferenceStore, file: &Path, output: Option<PathBuf>) -> Result<()> {
    let report = analyze(store, file).await?;
    let output = output.unwrap_or_else(|| PathBuf::from(export_file_name(Local::now().date_naive())));

    let out = File::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    write_csv(&report.rows, BufWriter::new(out))?;

    println!("Wrote {} rows to {}", report.rows.len(), output.display());
    Ok(())
}

async fn refs(store: &ReferenceStore, command: RefsCommand) -> Result<()> {
    match command {
        RefsCommand::List => {
            let entries = store.list().await?;

            println!("{:<5} {:<8} {:<32} {:<12} {:<4} {}", "ID", "VENDOR", "MODEL", "VERSION", "OLD", "CHECKED");
            println!("{}", "-".repeat(84));
            for entry in &entries {
                println!(
                    "{:<5} {:<8} {:<32} {:<12} {:<4} {}",
                    entry.id,
                    entry.vendor,
                    entry.model_name,
                    entry.latest_version,
                    if entry.is_old { "yes" } else { "-" },
                    entry.last_checked.format("%Y-%m-%d %H:%M")
                );
            }

            if entries.is_empty() {
                println!("No references yet. Run 'biosaudit refs add' or 'biosaudit refs import' first.");
            }
        }
        RefsCommand::Add { vendor, model, version } => {
            let entry = store.add_manual(&vendor, &model, &version).await?;
            println!("Added: {} ({})", entry.model_name, entry.latest_version);
        }
        RefsCommand::Edit { id, version, old } => {
            let entry = store.edit(id, &version, old).await?;
            let flag = if entry.is_old { " (marked OLD)" } else { "" };
            println!("Updated: {} -> {}{}", entry.model_name, entry.latest_version, flag);
        }
        RefsCommand::Delete { id } => {
            store.delete(id).await?;
            println!("Deleted reference {}", id);
        }
        RefsCommand::Import { file } => {
            let raw = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let document: serde_json::Value = serde_json::from_slice(&raw)
                .with_context(|| format!("{} is not valid JSON", file.display()))?;
            let incoming = version_map_from_json(document)?;
            let changed = store.import(incoming).await?;
            println!("Imported. Updated/added {} models.", changed);
        }
        RefsCommand::Dump => {
            let data = store.mirror().load();
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
    }

    Ok(())
}
