mod cache;
mod generate;
mod shopping_list;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chefmate")]
#[command(about = "ChefMate CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a recipe in three variants and print it as JSON
    Generate {
        /// Dish name, ingredient list or link, depending on the source
        prompt: Option<String>,
        /// search, pantry, scan or social
        #[arg(long, default_value = "search")]
        source: String,
        /// Photo of a menu or dish (required for scan)
        #[arg(long)]
        image: Option<PathBuf>,
        /// Print streaming progress to stderr
        #[arg(long)]
        stream: bool,
        /// Reject responses that lack a variant
        #[arg(long)]
        strict: bool,
        /// Cache responses on disk (default: ~/.chefmate/ai-cache)
        #[arg(long)]
        cache: bool,
        /// Only answer from the cache
        #[arg(long)]
        offline: bool,
        /// Comma-separated model chain, overrides CHEFMATE_AI_MODELS
        #[arg(long)]
        models: Option<String>,
        /// Also write the recipe JSON to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the JSON schema the model is asked to follow
    Schema,
    /// Aggregate saved recipes into a shopping list
    ShoppingList {
        /// Recipe JSON file, optionally suffixed with :student, :profi or :airfryer
        #[arg(long = "recipe", required = true)]
        recipes: Vec<String>,
    },
    /// Inspect or clear the AI response cache
    Cache {
        #[command(subcommand)]
        action: cache::CacheAction,
        /// Cache directory (default: ~/.chefmate/ai-cache)
        #[arg(long, env = "CHEFMATE_AI_CACHE_DIR")]
        dir: Option<PathBuf>,
    },
    /// Ping a running server (unauthenticated)
    Ping {
        /// Server URL (default: http://localhost:3000)
        #[arg(long, default_value = "http://localhost:3000")]
        server: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the JSON output, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            prompt,
            source,
            image,
            stream,
            strict,
            cache,
            offline,
            models,
            output,
        } => {
            let args = generate::GenerateArgs {
                prompt: prompt.unwrap_or_default(),
                source,
                image,
                stream,
                strict,
                cache,
                offline,
                models,
                output,
            };
            generate::generate(args).await?;
        }
        Commands::Schema => {
            let schema = chefmate_core::ai::prompts::recipe_response_schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Commands::ShoppingList { recipes } => {
            shopping_list::shopping_list(&recipes)?;
        }
        Commands::Cache { action, dir } => {
            cache::run(action, dir)?;
        }
        Commands::Ping { server } => {
            ping(&server).await?;
        }
    }

    Ok(())
}

async fn ping(server: &str) -> Result<()> {
    #[derive(serde::Deserialize)]
    struct PingResponse {
        message: String,
    }

    let url = format!("{}/api/test/unauthed-ping", server.trim_end_matches('/'));
    let response: PingResponse = reqwest::get(&url)
        .await?
        .error_for_status()?
        .json()
        .await?;

    println!("{}", response.message);

    Ok(())
}
