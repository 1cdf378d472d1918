use anyhow::Context;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Book catalog REST API
#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Migrate the database and serve the HTTP API (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Print the HTTP routes the server would expose
    Routes,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing::info!(env = ?settings.environment, "starting bookshelf server");
            bookshelf_app::run(&settings).await
        }
        Command::Migrate => {
            let applied = bookshelf_app::migrate(&settings).await?;
            tracing::info!(applied, "migrations complete");
            Ok(())
        }
        Command::Routes => {
            for line in bookshelf_app::route_table(&settings)? {
                println!("{line}");
            }
            Ok(())
        }
    }
}
