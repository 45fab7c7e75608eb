use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use anagrams::{AppState, JobConfig, RunArgs, ServeArgs, router, run_job};

#[derive(Parser)]
#[command(name = "anagrams")]
#[command(about = "Group the words of a text corpus into anagram classes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a batch job over a file or directory of partitions.
    Run(RunArgs),
    /// Serve the classifier over HTTP.
    Serve(ServeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Serve(args) => {
            serve(args).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run(args: RunArgs) -> anyhow::Result<ExitCode> {
    let config = JobConfig::try_from(args)?;
    info!("reading {}", config.input.display());
    info!("writing {}", config.output.display());
    if let Some(skip) = &config.skip_file {
        info!("skip list at {}", skip.display());
    }

    let start = Instant::now();
    match run_job(config).await {
        Ok(summary) => {
            info!(
                "job completed in {} ms: {} records from {} partitions",
                start.elapsed().as_millis(),
                summary.records,
                summary.partitions
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            error!("job failed: {err:#}");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let addr = args.addr()?;
    info!("binding to {addr}");
    info!("max request text: {} bytes", args.max_text_bytes);

    let state = AppState {
        max_text_bytes: args.max_text_bytes,
    };
    let app = router(state).layer(TraceLayer::new_for_http());
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
