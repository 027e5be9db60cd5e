//! Bazaar CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! bazaar migrate
//!
//! # Create an account
//! bazaar user create -u Olga -e olga@example.com -p 'correct horse'
//!
//! # Create the demo accounts
//! bazaar seed
//! ```
//!
//! The database is taken from `BAZAAR_DATABASE_URL` (or `DATABASE_URL`),
//! like the storefront.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Bazaar CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Create demo accounts for local testing
    Seed,
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new account
    Create {
        /// Display name
        #[arg(short, long)]
        username: String,

        /// Login e-mail address
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let pool = commands::connect().await?;

    match cli.command {
        Commands::Migrate => commands::migrate::run(&pool).await?,
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                email,
                password,
            } => {
                commands::user::create(&pool, &username, &email, &password).await?;
            }
        },
        Commands::Seed => commands::seed::run(&pool).await?,
    }
    Ok(())
}
