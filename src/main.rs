use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod config;
mod db;
mod error;
mod lookup;
mod models;
mod query;
mod report;

use config::Config;
use db::PgLookup;
use lookup::{MemoryLookup, Outcome, StudentLookup};

#[derive(Parser)]
#[command(name = "grade-lookup")]
#[command(about = "Look up a student's course grade by ID or email", long_about = None)]
struct Cli {
    /// Read grades from a CSV export instead of the hosted table
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    /// Print outcomes as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a single ID or email
    Lookup { query: String },
    /// Answer one lookup per line read from stdin
    Interactive,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let lookup = build_lookup(cli.csv.as_deref()).await?;

    match cli.command {
        Commands::Lookup { query } => {
            let outcome = lookup::submit(lookup.as_ref(), &query).await;
            print_outcome(&outcome, cli.json)?;
        }
        Commands::Interactive => {
            if !cli.json {
                println!("{}", report::header());
                println!("Enter your ID number or email to look up your grade (\"quit\" to exit).");
            }

            let mut lines = BufReader::new(stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                if matches!(line.trim(), "quit" | "exit") {
                    break;
                }

                let outcome = lookup::submit(lookup.as_ref(), &line).await;
                print_outcome(&outcome, cli.json)?;
            }

            if !cli.json {
                println!("{}", report::footer());
            }
        }
    }

    Ok(())
}

async fn build_lookup(csv: Option<&std::path::Path>) -> anyhow::Result<Box<dyn StudentLookup>> {
    if let Some(path) = csv {
        let lookup = MemoryLookup::from_csv(path)
            .with_context(|| format!("failed to load grades from {}", path.display()))?;
        return Ok(Box::new(lookup));
    }

    let config = Config::from_env()
        .context("failed to initialize the grade store, check SUPABASE_URL and SUPABASE_KEY")?;
    let pool = db::connect(&config)
        .await
        .context("failed to initialize the grade store, check SUPABASE_URL and SUPABASE_KEY")?;

    info!("Querying table {}", config.table);
    Ok(Box::new(PgLookup::new(pool, &config.table)))
}

fn print_outcome(outcome: &Outcome, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", report::render_json(outcome)?);
    } else {
        print!("{}", report::render(outcome));
    }

    Ok(())
}
