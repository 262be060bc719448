//! Cardnet CLI - Command-line interface for Cardnet
//!
//! Manages the friend graph of a business-card network: registering people,
//! linking and unlinking friends, querying recommendations, and serving
//! the graph to the API layer.

use cardnet_core::{Person, PersonUpdate};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "cardnet")]
#[command(author = "Cardnet Contributors")]
#[command(version)]
#[command(about = "Friend graph for digital business cards", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project directory holding the .cardnet folder
    #[arg(short = 'C', long, global = true, default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Cardnet in the project directory
    Init,

    /// Register a new person
    Add {
        user_id: String,
        name: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        position: Option<String>,
    },

    /// Update a person's card details
    Update {
        user_id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        position: Option<String>,
    },

    /// Show a person
    Show {
        user_id: String,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Make two people friends
    Befriend { user_id: String, friend_id: String },

    /// Remove a friendship
    Unfriend { user_id: String, friend_id: String },

    /// List direct friends
    Friends {
        user_id: String,

        #[arg(long)]
        json: bool,
    },

    /// Recommend people within two hops
    Recommend {
        user_id: String,

        #[arg(long)]
        json: bool,
    },

    /// Show everyone within three hops
    Network {
        user_id: String,

        #[arg(long)]
        json: bool,
    },

    /// Show friends two people have in common
    Mutual {
        user_id: String,
        other_id: String,

        #[arg(long)]
        json: bool,
    },

    /// Show store status and statistics
    Status,

    /// Import people and friendships from a JSON file
    Import { file: PathBuf },

    /// Export the graph to JSON
    Export {
        /// Output file
        #[arg(short, long, default_value = "cardnet-graph.json")]
        output: PathBuf,
    },

    /// Start the Cardnet server
    Serve {
        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Headless mode: bind to 0.0.0.0 for remote access
        #[arg(long)]
        headless: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let root = cli.dir;
    let result = match cli.command {
        Commands::Init => commands::init(&root),
        Commands::Add {
            user_id,
            name,
            email,
            company,
            position,
        } => {
            let person = Person {
                email,
                company,
                position,
                ..Person::new(user_id, name)
            };
            commands::add(&root, person)
        }
        Commands::Update {
            user_id,
            name,
            email,
            company,
            position,
        } => commands::update(
            &root,
            &user_id,
            PersonUpdate {
                name,
                email,
                company,
                position,
            },
        ),
        Commands::Show { user_id, json } => commands::show(&root, &user_id, json),
        Commands::Befriend { user_id, friend_id } => {
            commands::befriend(&root, &user_id, &friend_id)
        }
        Commands::Unfriend { user_id, friend_id } => {
            commands::unfriend(&root, &user_id, &friend_id)
        }
        Commands::Friends { user_id, json } => commands::friends(&root, &user_id, json),
        Commands::Recommend { user_id, json } => commands::recommend(&root, &user_id, json),
        Commands::Network { user_id, json } => commands::network(&root, &user_id, json),
        Commands::Mutual {
            user_id,
            other_id,
            json,
        } => commands::mutual(&root, &user_id, &other_id, json),
        Commands::Status => commands::status(&root),
        Commands::Import { file } => commands::import(&root, &file),
        Commands::Export { output } => commands::export(&root, &output),
        Commands::Serve { port, headless } => commands::serve(&root, port, headless).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
