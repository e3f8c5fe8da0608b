use anyhow::Context;
use bookstore_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Operate the bookstore service
#[derive(Debug, Parser)]
#[command(name = "bookstore-cli", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API until interrupted
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Print the effective environment and database URL
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookstore settings")?;
    bookstore_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Serve => bookstore_app::run(&settings).await?,
        Command::Migrate => {
            let applied = bookstore_app::migrate(&settings).await?;
            tracing::info!(applied, "migrations applied");
        }
        Command::Config => {
            println!("environment: {:?}", settings.environment);
            println!("database:    {}", settings.database_url());
            println!(
                "listen:      {}:{}",
                settings.server.host, settings.server.port
            );
        }
    }

    Ok(())
}
