mod db;
mod models;
mod notify;
mod publisher;
mod schema;
mod seed;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use afflux_core::ideation::{CuratedIdeation, IdeationAgent, LlmIdeation};
use afflux_core::llm::create_provider_from_env;
use afflux_core::{
    ImagePool, Pipeline, PipelineConfig, ProbeClient, ReviewPolicy, TopicPool,
};

use crate::publisher::DieselPublisher;

#[derive(Parser)]
#[command(name = "afflux")]
#[command(about = "Afflux content pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReviewPolicyArg {
    /// Stop the run when review rejects the draft (default)
    StrictHalt,
    /// Publish anyway and carry the review feedback as warnings
    BestEffort,
}

impl From<ReviewPolicyArg> for ReviewPolicy {
    fn from(arg: ReviewPolicyArg) -> Self {
        match arg {
            ReviewPolicyArg::StrictHalt => ReviewPolicy::StrictHalt,
            ReviewPolicyArg::BestEffort => ReviewPolicy::BestEffort,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AgentArg {
    /// Pick a topic from the curated pool
    Curated,
    /// Ask the configured LLM provider for a topic
    Llm,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline once: select, generate, review, validate, publish
    Run {
        /// Topic pool JSON file (default: builtin pool)
        #[arg(long)]
        topics: Option<PathBuf>,
        /// Image pool JSON file (default: builtin pool)
        #[arg(long)]
        images: Option<PathBuf>,
        /// RNG seed for reproducible topic and image selection
        #[arg(long)]
        seed: Option<u64>,
        /// What to do when review rejects the draft
        #[arg(long, value_enum, default_value_t = ReviewPolicyArg::StrictHalt)]
        review_policy: ReviewPolicyArg,
        /// Topic selection agent
        #[arg(long, value_enum, default_value_t = AgentArg::Curated)]
        agent: AgentArg,
        /// Postgres connection string (default: DATABASE_URL)
        #[arg(long)]
        database_url: Option<String>,
    },
    /// Create the admin user and starter categories/tags (idempotent)
    Seed {
        /// Postgres connection string (default: DATABASE_URL)
        #[arg(long)]
        database_url: Option<String>,
    },
}

fn resolve_database_url(flag: Option<String>) -> Result<String> {
    match flag {
        Some(url) => Ok(url),
        None => std::env::var("DATABASE_URL")
            .context("DATABASE_URL is not set and --database-url was not given"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            topics,
            images,
            seed,
            review_policy,
            agent,
            database_url,
        } => {
            let database_url = resolve_database_url(database_url)?;
            let outcome = run_pipeline(topics, images, seed, review_policy, agent, &database_url)
                .await?;
            notify::print_notification(&outcome);
            if !outcome.success {
                std::process::exit(1);
            }
        }
        Commands::Seed { database_url } => {
            let database_url = resolve_database_url(database_url)?;
            let pool = db::create_pool(&database_url)?;
            seed::seed(&pool)?;
        }
    }

    Ok(())
}

async fn run_pipeline(
    topics: Option<PathBuf>,
    images: Option<PathBuf>,
    seed: Option<u64>,
    review_policy: ReviewPolicyArg,
    agent: AgentArg,
    database_url: &str,
) -> Result<afflux_core::PipelineOutcome> {
    let topic_pool = match topics {
        Some(path) => {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read topic pool: {}", path.display()))?;
            TopicPool::from_json(&json)
                .with_context(|| format!("Invalid topic pool JSON: {}", path.display()))?
        }
        None => TopicPool::builtin(),
    };
    let image_pool = match images {
        Some(path) => {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read image pool: {}", path.display()))?;
            ImagePool::from_json(&json)
                .with_context(|| format!("Invalid image pool JSON: {}", path.display()))?
        }
        None => ImagePool::builtin(),
    };

    let ideation: Box<dyn IdeationAgent> = match agent {
        AgentArg::Curated => Box::new(CuratedIdeation::new(topic_pool, seed)),
        AgentArg::Llm => {
            let provider = create_provider_from_env().context("Failed to create LLM provider")?;
            Box::new(LlmIdeation::new(provider))
        }
    };

    let http = ProbeClient::builder()
        .build()
        .context("Failed to build HTTP probe client")?;
    let pool = db::create_pool(database_url)?;
    let publisher = DieselPublisher::new(pool);

    let pipeline = Pipeline {
        ideation: ideation.as_ref(),
        http: &http,
        images: &image_pool,
        publisher: &publisher,
        config: PipelineConfig {
            review_policy: review_policy.into(),
            seed,
            ..PipelineConfig::default()
        },
    };
    Ok(pipeline.run().await)
}
