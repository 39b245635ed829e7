use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ruta_agent::{FareConcierge, MemorySessionStore};
use ruta_core::{MatchConfig, TurnInput};
use ruta_fares::FareTable;
use ruta_observability::{init_tracing, AppMetrics};

#[derive(Debug, Parser)]
#[command(name = "rutero")]
#[command(about = "Consulta de tarifas interurbanas de Córdoba")]
struct Cli {
    /// Fare table, ';'-delimited CSV with ORIGEN/DESTINO/EMPRESA/MODALIDAD.
    #[arg(long, default_value = "tarifas.csv", env = "RUTA_TABLE")]
    table: PathBuf,

    /// Optional JSON overrides for thresholds, noise words and phrase sets.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive chat session.
    Chat,
    /// One-shot resolution without a session.
    Resolve {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: String,
    },
    /// Fare table inspection.
    Table {
        #[command(subcommand)]
        command: TableCommand,
    },
}

#[derive(Debug, Subcommand)]
enum TableCommand {
    /// Record and locality counts.
    Stats,
    /// Load and validate only; exits non-zero on a malformed table.
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("ruta_cli");
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MatchConfig::from_json_file(path)?,
        None => MatchConfig::default(),
    };

    match cli.command {
        Command::Chat => {
            let concierge = build_concierge(&cli.table, config)?;
            run_chat(concierge, &cli.table).await?;
        }
        Command::Resolve { from, to } => {
            let concierge = build_concierge(&cli.table, config)?;
            let origin = from.unwrap_or_else(|| concierge.config().home_city.clone());
            let reply = concierge
                .handle_turn(TurnInput {
                    session_id: None,
                    text: format!("de {origin} a {to}"),
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        Command::Table { command } => match command {
            TableCommand::Stats => {
                let table = load_table(&cli.table, &config)?;
                println!("{}", serde_json::to_string_pretty(&table.stats())?);
            }
            TableCommand::Check => {
                let table = load_table(&cli.table, &config)?;
                let stats = table.stats();
                println!(
                    "ok: {} registros, {} localidades",
                    stats.records, stats.localities
                );
            }
        },
    }

    Ok(())
}

async fn run_chat(
    concierge: FareConcierge<MemorySessionStore>,
    table_path: &PathBuf,
) -> Result<()> {
    let mut session_id: Option<String> = None;

    println!("Rutero 🚌 — escribí tu consulta ('salir' para terminar, 'recargar' para releer la tabla).");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("salir") || message.eq_ignore_ascii_case("exit") {
            break;
        }
        if message.is_empty() {
            continue;
        }

        if message.eq_ignore_ascii_case("recargar") {
            let stats = concierge
                .reload_table(table_path)
                .context("failed reloading fare table")?;
            println!("tabla recargada: {} registros\n", stats.records);
            continue;
        }

        let reply = concierge
            .handle_turn(TurnInput {
                session_id: session_id.clone(),
                text: message.to_string(),
            })
            .await?;

        session_id = Some(reply.session_id.clone());
        println!("\n{}\n", reply.reply_text);
    }

    Ok(())
}

fn build_concierge(
    table_path: &PathBuf,
    config: MatchConfig,
) -> Result<FareConcierge<MemorySessionStore>> {
    let table = load_table(table_path, &config)?;
    Ok(FareConcierge::new(
        table,
        config,
        Arc::new(MemorySessionStore::new()),
        AppMetrics::shared(),
    ))
}

fn load_table(path: &PathBuf, config: &MatchConfig) -> Result<FareTable> {
    FareTable::from_csv_path(path, config)
        .with_context(|| format!("failed loading fare table from {}", path.display()))
}
