use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use configuration::{Backend, Settings, init_tracing, load_settings};
use database::{MemoryStore, PgStore, Store};
use pagination::PageLimits;
use scheduling::{Scheduling, TableCount};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Shift scheduling service: REST API plus store maintenance commands.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML settings file. Defaults to `config.toml` when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides `storage.backend` from the settings.
    #[arg(long, global = true, value_enum)]
    backend: Option<Backend>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve {
        /// Overrides `server.host` and `server.port`.
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
    /// Write the reference dataset into an empty store.
    Seed,
    /// Delete every row and restart the id counters.
    Reset,
    /// Reset, then seed, in one transaction.
    ResetAndSeed,
    /// Show the live row count of every table.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref(), cli.backend)?;
    let _log_guard = init_tracing(&settings.logging);

    if let Commands::Serve { addr: Some(addr) } = &cli.command {
        settings.server.host = addr.ip().to_string();
        settings.server.port = addr.port();
    }

    let limits = PageLimits {
        default_size: settings.pagination.default_page_size,
        max_size: settings.pagination.max_page_size,
    };

    match settings.storage.backend {
        Backend::Postgres => {
            let pool = database::connect(&settings.storage).await?;
            if settings.storage.run_migrations {
                database::run_migrations(&pool).await?;
            }
            run(cli.command, &settings, Scheduling::new(PgStore::new(pool), limits)).await
        }
        Backend::Memory => {
            tracing::warn!("using the in-memory store, data is lost on exit");
            run(cli.command, &settings, Scheduling::new(MemoryStore::new(), limits)).await
        }
    }
}

async fn run<S: Store>(
    command: Commands,
    settings: &Settings,
    service: Scheduling<S>,
) -> anyhow::Result<()> {
    match command {
        Commands::Serve { .. } => web_server::run_server(&settings.server, service).await,
        Commands::Seed => {
            let counts = service.lifecycle().seed().await?;
            print_counts("Seeded", &counts);
            Ok(())
        }
        Commands::Reset => {
            service.lifecycle().reset().await?;
            println!("Store reset: every table is empty.");
            Ok(())
        }
        Commands::ResetAndSeed => {
            let counts = service.lifecycle().reset_and_seed().await?;
            print_counts("Reset and seeded", &counts);
            Ok(())
        }
        Commands::Status => {
            let counts = service.lifecycle().status().await?;
            print_counts("Live rows", &counts);
            Ok(())
        }
    }
}

fn print_counts(title: &str, counts: &[TableCount]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Entity", "Table", "Rows"]);
    for count in counts {
        table.add_row(vec![
            Cell::new(count.kind),
            Cell::new(count.table),
            Cell::new(count.rows),
        ]);
    }
    let total: u64 = counts.iter().map(|c| c.rows).sum();
    println!("{title} ({total} rows)\n{table}");
}
