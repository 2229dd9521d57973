use anyhow::Context;
use clap::{Parser, Subcommand};
use shelf_authz::TokenService;
use shelf_kernel::settings::{Settings, StorageBackend};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "Operator tools for the shelf service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the effective settings with secrets redacted
    Config,
    /// Mint a bearer token for a user id with the configured secret
    Token {
        #[arg(long)]
        user_id: u64,
        /// Override the configured lifetime
        #[arg(long)]
        ttl_ms: Option<u64>,
    },
    /// Connect to the configured backend and create its schema
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    let settings = Settings::load().context("failed to load shelf settings")?;

    match cli.command {
        Command::Config => {
            println!("{settings:#?}");
        }
        Command::Token { user_id, ttl_ms } => {
            let ttl_ms = ttl_ms.unwrap_or(settings.auth.token_ttl_ms);
            let tokens = TokenService::new(&settings.auth.jwt_secret, ttl_ms);
            let token = tokens
                .issue(user_id)
                .with_context(|| format!("failed to issue token for user {user_id}"))?;
            tracing::info!(user_id, ttl_ms, "token issued");
            println!("{token}");
        }
        Command::Migrate => {
            shelf_db::connect(&settings.storage)
                .await
                .context("schema setup failed")?;
            let note = match settings.storage.backend {
                StorageBackend::Memory => "memory backend has no schema",
                StorageBackend::Relational | StorageBackend::Document => "schema ready",
            };
            println!("{:?}: {note}", settings.storage.backend);
        }
    }

    Ok(())
}
