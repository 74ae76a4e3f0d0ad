mod reconcile;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::reconcile::ReconcileArgs;

#[derive(Debug, Parser)]
#[command(name = "cardvault")]
#[command(about = "Card catalog price reconciliation")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database operations
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Link cards to remote products and refresh their prices
    Reconcile(ReconcileArgs),
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = cardvault_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = cardvault_db::PoolConfig::from_app_config(&config);
    let pool = cardvault_db::connect_pool(&config.database_url, pool_config)
        .await
        .context("failed to connect to database")?;

    match command {
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            cardvault_db::ping(&pool).await?;
            println!("database ok");
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let applied = cardvault_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Reconcile(args) => {
            let options = args.into_options(&config);
            reconcile::run(&pool, &config, &options).await?;
        }
    }

    Ok(())
}
