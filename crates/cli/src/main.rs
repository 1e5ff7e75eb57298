use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sayahat_agents::TripPlannerAgent;
use sayahat_core::{TripRequest, DEFAULT_PROVIDER};
use sayahat_observability::{init_tracing, AppMetrics};
use sayahat_storage::{import_seed, CatalogSeed, Store};

#[derive(Debug, Parser)]
#[command(name = "sayahat")]
#[command(about = "Sayahat itinerary planner CLI")]
struct Cli {
    /// SQLite catalog; an in-memory store is used when unset.
    #[arg(long, env = "SAYAHAT_DATABASE_URL")]
    database_url: Option<String>,

    /// Interest-mapping provider key.
    #[arg(long, env = "SAYAHAT_PROVIDER", default_value = DEFAULT_PROVIDER)]
    provider: String,

    /// JSON catalog seed loaded before the command runs.
    #[arg(long)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Plan {
        #[arg(long)]
        city: String,
        #[arg(long, default_value_t = 2)]
        days: u32,
        #[arg(long)]
        budget: Option<i64>,
        #[arg(long = "interest")]
        interests: Vec<String>,
        #[arg(long)]
        pace: Option<String>,
        #[arg(long)]
        travel_style: Option<String>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        no_preferences: bool,
    },
    Import,
    Interests,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("sayahat_cli");
    let cli = Cli::parse();

    let store = match &cli.database_url {
        Some(database_url) => Store::sqlite(database_url).await?,
        None => Store::memory(),
    };

    let imported = match &cli.catalog {
        Some(path) => {
            let seed = CatalogSeed::from_json_file(path)?;
            let summary = import_seed(&store, seed)
                .await
                .with_context(|| format!("failed importing catalog {}", path.display()))?;
            tracing::info!(
                places = summary.places,
                preferences = summary.preferences,
                interest_mappings = summary.interest_mappings,
                "catalog imported"
            );
            Some(summary)
        }
        None => None,
    };

    let agent = TripPlannerAgent::new(Arc::new(store), AppMetrics::shared(), cli.provider);

    match cli.command {
        Command::Plan {
            city,
            days,
            budget,
            interests,
            pace,
            travel_style,
            user,
            no_preferences,
        } => {
            let request = TripRequest {
                city,
                days,
                budget,
                interests,
                pace,
                travel_style,
                use_preferences: !no_preferences,
            };

            let plan = agent.plan_trip(user.as_deref(), request).await?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Import => {
            anyhow::ensure!(
                cli.database_url.is_some(),
                "import needs --database-url, an in-memory store is discarded on exit"
            );
            let summary = imported.context("import needs --catalog")?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Interests => {
            let table = agent.interest_table().await?;
            println!("{}", serde_json::to_string_pretty(&table)?);
        }
    }

    Ok(())
}
