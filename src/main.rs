use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;

use setup_trainer::{
    api, chart,
    terminal::{self, PlayOptions},
    AppState, ChartKind, GameConfig,
};

const MAX_STARTING_BALANCE: i64 = 1_000_000_000_000;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Balance every session starts with
    #[arg(
        long,
        global = true,
        env = "TRAINER_STARTING_BALANCE",
        default_value = "10000",
        value_parser = clap::value_parser!(i64).range(0..=MAX_STARTING_BALANCE)
    )]
    starting_balance: i64,

    /// Fixed chart seed (random per session when unset)
    #[arg(long, global = true, env = "TRAINER_SEED")]
    seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the web trainer
    Serve {
        /// Port to run the web server on
        #[arg(short, long, env = "TRAINER_PORT", default_value = "3000")]
        port: u16,

        /// Directory holding the frontend
        #[arg(long, env = "TRAINER_FRONTEND_DIR", default_value = "frontend")]
        frontend_dir: PathBuf,

        /// Seconds a session may sit idle before it is dropped
        #[arg(long, env = "TRAINER_SESSION_TTL_SECS", default_value = "3600")]
        session_ttl_secs: u64,

        /// Most sessions kept in memory at once
        #[arg(
            long,
            env = "TRAINER_MAX_SESSIONS",
            default_value = "10000",
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        max_sessions: u64,
    },

    /// Play in the terminal
    Play {
        /// Write each scenario chart as SVG into this directory
        #[arg(long)]
        chart_dir: Option<PathBuf>,
    },

    /// Render a single pattern chart to an SVG file
    Chart {
        /// Pattern to draw (liquidity, fvg, bos, orb)
        #[arg(short, long)]
        kind: ChartKind,

        /// Output file
        #[arg(short, long, default_value = "chart.svg")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Logs go to stderr so terminal play stays readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("setup_trainer=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = GameConfig::with_starting_balance(args.starting_balance);

    match args.command {
        Commands::Serve {
            port,
            frontend_dir,
            session_ttl_secs,
            max_sessions,
        } => {
            let config = GameConfig {
                session_ttl_secs,
                max_sessions: usize::try_from(max_sessions).unwrap_or(usize::MAX),
                ..config
            };
            serve(config, args.seed, port, frontend_dir).await
        }
        Commands::Play { chart_dir } => {
            let options = PlayOptions {
                config,
                chart_seed: args.seed.unwrap_or_else(rand::random::<u64>),
                chart_dir,
            };
            let stdin = std::io::stdin();
            let session = terminal::play(stdin.lock(), std::io::stdout(), &options)?;
            info!(
                "Session {} ended at scenario {} with balance {}",
                session.id,
                session.scenario_index(),
                session.balance()
            );
            Ok(())
        }
        Commands::Chart { kind, out } => {
            let seed = args.seed.unwrap_or_else(rand::random::<u64>);
            let svg = chart::generate(kind, seed)?
                .render_svg(chart::DEFAULT_WIDTH, chart::DEFAULT_HEIGHT)?;
            std::fs::write(&out, svg)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            info!("Wrote {} chart (seed {}) to {}", kind, seed, out.display());
            Ok(())
        }
    }
}

async fn serve(config: GameConfig, seed: Option<u64>, port: u16, frontend_dir: PathBuf) -> Result<()> {
    info!("Starting setup trainer server");
    info!("Starting balance: {}", config.starting_balance);
    info!(
        "Session limits: {}s idle TTL, {} max",
        config.session_ttl_secs, config.max_sessions
    );
    info!("Frontend: {}", frontend_dir.display());
    if let Some(seed) = seed {
        info!("Fixed chart seed: {}", seed);
    }

    let state = Arc::new(AppState::new(config, seed));

    // Build router
    let app = api::router(state)
        .fallback_service(ServeDir::new(frontend_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Server running at http://{}", addr);
    info!("Open http://localhost:{} in your browser", port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
