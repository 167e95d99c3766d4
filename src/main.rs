use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scout_compare::api::{build_router, state::AppState};
use scout_compare::calculate::{aggregate_with, compare_squads, ComparisonSet};
use scout_compare::config::AppConfig;
use scout_compare::fetch::{Fetcher, FetcherConfig};
use scout_compare::hydrate::{EntityRef, Hydrator};
use scout_compare::models::{EntityId, PercentileMode, PositionGroup};
use scout_compare::templates::catalogue;

#[derive(Parser)]
#[command(name = "scout-compare")]
#[command(about = "Percentile radars and squad comparisons for football scouting")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Override the data source base URL
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },

    /// Compare 2-3 players and print the report as JSON
    ComparePlayers {
        /// Player ids
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,

        /// Percentile mode: league or global
        #[arg(long, default_value = "league")]
        mode: String,

        /// Position group overriding the first player's template (GK, CB, WB, DM, CM, AM, FW)
        #[arg(long)]
        template: Option<String>,
    },

    /// Compare teams by their own payloads, or by squads with --squad
    CompareTeams {
        /// Team ids (ignored when --squad is given)
        ids: Vec<String>,

        /// Squad as TEAM=PLAYER,PLAYER,...; repeat once per team
        #[arg(long = "squad")]
        squads: Vec<String>,

        #[arg(long, default_value = "league")]
        mode: String,
    },

    /// Aggregate a squad over the all-round axes
    Squad {
        /// Player ids
        #[arg(required = true, num_args = 1..)]
        player_ids: Vec<String>,

        #[arg(long, default_value = "league")]
        mode: String,
    },

    /// List position templates and the all-round axis set
    Templates,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&PathBuf::from(&cli.config))
        .with_context(|| format!("loading config from {}", cli.config))?;
    if let Some(url) = &cli.base_url {
        config.source.base_url = url.clone();
        config.validate()?;
    }

    // Initialize tracing; logs go to stderr so stdout stays pipeable JSON
    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Starting scout-compare v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let hydrator = build_hydrator(&config)?;
            let state = AppState::new(config, hydrator);
            let app = build_router(state);

            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::ComparePlayers { ids, mode, template } => {
            let mode = parse_mode(&mode)?;
            check_count(ids.len(), config.engine.max_entities, "players")?;
            let template = template
                .as_deref()
                .map(str::parse::<PositionGroup>)
                .transpose()
                .map_err(anyhow::Error::msg)?;

            let hydrator = build_hydrator(&config)?;
            let refs: Vec<EntityRef> = ids.into_iter().map(EntityRef::player).collect();
            let profiles = hydrator.hydrate(&refs).await;
            let report = ComparisonSet::new(profiles, mode)
                .with_template_override(template)
                .with_detector(config.engine.detector())
                .report();
            print_json(&report)?;
        }
        Commands::CompareTeams { ids, squads, mode } => {
            let mode = parse_mode(&mode)?;
            let hydrator = build_hydrator(&config)?;

            let report = if squads.is_empty() {
                check_count(ids.len(), config.engine.max_entities, "teams")?;
                let refs: Vec<EntityRef> = ids.into_iter().map(EntityRef::team).collect();
                let profiles = hydrator.hydrate(&refs).await;
                ComparisonSet::new(profiles, mode)
                    .with_detector(config.engine.detector())
                    .report()
            } else {
                check_count(squads.len(), config.engine.max_entities, "teams")?;
                let mut hydrated = Vec::with_capacity(squads.len());
                for arg in &squads {
                    let (team, players) = parse_squad_arg(arg)?;
                    hydrated.push(hydrator.hydrate_squad(&EntityRef::team(team), &players).await);
                }
                compare_squads(&hydrated, mode, &config.engine.detector())
            };
            print_json(&report)?;
        }
        Commands::Squad { player_ids, mode } => {
            let mode = parse_mode(&mode)?;
            let hydrator = build_hydrator(&config)?;
            let refs: Vec<EntityRef> = player_ids.into_iter().map(EntityRef::player).collect();
            let players = hydrator.hydrate(&refs).await;
            let aggregate = aggregate_with(&players, mode, &config.engine.detector());
            if aggregate.is_insufficient() {
                tracing::warn!("No player in the squad has percentile data");
            }
            print_json(&aggregate)?;
        }
        Commands::Templates => {
            print_json(&catalogue())?;
        }
    }

    Ok(())
}

fn build_hydrator(config: &AppConfig) -> Result<Hydrator> {
    let fetcher = Fetcher::new(FetcherConfig::from_source(&config.source)?)?;
    Ok(Hydrator::new(Arc::new(fetcher), config.source.fetch_width))
}

fn parse_mode(mode: &str) -> Result<PercentileMode> {
    mode.parse().map_err(anyhow::Error::msg)
}

fn check_count(count: usize, max: usize, what: &str) -> Result<()> {
    if count < 2 {
        bail!("at least 2 {} are required, got {}", what, count);
    }
    if count > max {
        bail!("at most {} {} can be compared, got {}", max, what, count);
    }
    Ok(())
}

/// Parse `TEAM=P1,P2,...` into a team id and its player ids.
fn parse_squad_arg(arg: &str) -> Result<(EntityId, Vec<EntityId>)> {
    let (team, players) = arg
        .split_once('=')
        .with_context(|| format!("squad '{}' must look like TEAM=PLAYER,PLAYER", arg))?;
    let team = EntityId::new(team);
    if team.is_empty() {
        bail!("squad '{}' has an empty team id", arg);
    }
    let players: Vec<EntityId> = players
        .split(',')
        .map(EntityId::new)
        .filter(|id| !id.is_empty())
        .collect();
    Ok((team, players))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
