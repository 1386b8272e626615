//! Verdict CLI
//!
//! Runs the moderation engine over JSON input files and prints JSON results.

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use verdict_consensus::{
    AggregatedTally, ArbiterInput, ArbiterMode, AutoResolvePolicy, ConsensusResult, Vote, VoteBook,
};
use verdict_core::{Amount, CampaignId, ContentId, ContentKind, VerdictError};
use verdict_economics::{
    rank_top_completions, CampaignEconomics, CompletionCandidate, ModeratorPayout,
    ModeratorStake, SettlementPlan, TopCompletion,
};
use verdict_engine::{EngineConfig, ModerationEngine};

#[derive(Parser)]
#[command(name = "verdict")]
#[command(version)]
#[command(about = "Verdict - hybrid moderation consensus and reward settlement", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "VERDICT_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive campaign economics from unit price and completion budget
    Derive {
        /// Fee each completer pays
        #[arg(long)]
        unit_price: Amount,

        /// Completion budget
        #[arg(long, allow_negative_numbers = true)]
        max_completions: i64,
    },

    /// Evaluate the votes on one content item
    Evaluate {
        /// Input file (votes, economics, times, policy)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Blend a consensus result with a super-arbiter judgment
    Blend {
        /// Input file (result, arbiter, mode)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Settle a finalised campaign
    Settle {
        /// Input file (economics, completion count, top completions)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Project settlements across completion counts
    Quote {
        #[arg(long)]
        unit_price: Amount,

        #[arg(long, allow_negative_numbers = true)]
        max_completions: i64,

        /// Completion count step between projected points
        #[arg(long, default_value = "1")]
        step: u64,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Debug, Deserialize)]
struct EvaluateInput {
    content_id: ContentId,
    #[serde(default)]
    kind: ContentKind,
    votes: Vec<Vote>,
    economics: CampaignEconomics,
    now: DateTime<Utc>,
    window_end: DateTime<Utc>,
    policy: AutoResolvePolicy,
}

#[derive(Debug, Serialize)]
struct EvaluateOutput {
    tally: AggregatedTally,
    result: ConsensusResult,
    notices: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BlendInput {
    result: ConsensusResult,
    #[serde(default)]
    arbiter: Option<ArbiterInput>,
    #[serde(default)]
    arbiter_mode: ArbiterMode,
}

#[derive(Debug, Deserialize)]
struct SettleInput {
    #[serde(default)]
    campaign_id: Option<CampaignId>,
    economics: CampaignEconomics,
    completion_count: u64,
    /// Already ranked top completions
    #[serde(default)]
    top_completions: Vec<TopCompletion>,
    /// Candidates to rank when `top_completions` is empty
    #[serde(default)]
    candidates: Vec<CompletionCandidate>,
    /// Moderators to split the moderator line across
    #[serde(default)]
    moderators: Vec<ModeratorStake>,
}

#[derive(Debug, Serialize)]
struct SettleOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    fingerprint: Option<String>,
    plan: SettlementPlan,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    moderator_payouts: Vec<ModeratorPayout>,
}

fn init_logging(verbose: bool, json: bool) {
    let env_filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // stdout carries results, logs go to stderr
    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn read_input<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading input file {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing input file {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    let config = EngineConfig::load(cli.config.as_deref()).context("loading engine configuration")?;
    let engine = ModerationEngine::new(config)?;

    match cli.command {
        Commands::Derive {
            unit_price,
            max_completions,
        } => {
            let economics = engine.derive_economics(unit_price, max_completions)?;
            print_json(&economics)?;
        }

        Commands::Evaluate { input } => {
            let input: EvaluateInput = read_input(&input)?;
            let (book, notices) = VoteBook::from_votes(input.content_id, input.kind, input.votes)?;
            for notice in &notices {
                tracing::warn!("{}", notice);
            }

            let tally = engine.tally(&book);
            let result = engine.evaluate(
                &tally,
                &input.economics,
                input.now,
                input.window_end,
                input.policy,
            );
            tracing::info!(
                "{}: {} ({} votes, community score {})",
                book.content_id(),
                result.status,
                book.len(),
                result.community_score
            );

            print_json(&EvaluateOutput {
                tally,
                result,
                notices: notices.iter().map(VerdictError::to_string).collect(),
            })?;
        }

        Commands::Blend { input } => {
            let input: BlendInput = read_input(&input)?;
            let decision = engine.blend(&input.result, input.arbiter, input.arbiter_mode)?;
            print_json(&decision)?;
        }

        Commands::Settle { input } => {
            let input: SettleInput = read_input(&input)?;
            let top = if input.top_completions.is_empty() {
                rank_top_completions(&input.candidates)
            } else {
                input.top_completions
            };

            let plan = engine.settle(&input.economics, input.completion_count, &top)?;
            let fingerprint = input.campaign_id.as_ref().map(|id| plan.fingerprint(id));
            let moderator_payouts = engine.moderator_payouts(&plan, &input.moderators)?;
            print_json(&SettleOutput {
                fingerprint,
                plan,
                moderator_payouts,
            })?;
        }

        Commands::Quote {
            unit_price,
            max_completions,
            step,
        } => {
            let economics = engine.derive_economics(unit_price, max_completions)?;
            let projection = engine.project(&economics, step)?;
            print_json(&serde_json::json!({
                "economics": economics,
                "projection": projection,
            }))?;
        }

        Commands::Config => {
            print!("{}", engine.config().to_toml_string()?);
        }
    }

    Ok(())
}
