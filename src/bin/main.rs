use anyhow::Result;
use clap::Parser;
use pricewatch::config::{Config, ConfigBuilder};
use pricewatch::fetcher::PriceFetcher;
use pricewatch::instrument::FxPair;
use pricewatch::provider::{QuoteProvider, ReplayProvider, YahooProvider};
use pricewatch::report::{ConsoleReporter, Reporter};
use pricewatch::scheduler::Scheduler;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(version, about = "Values a portfolio from live quotes and alerts on price targets")]
struct Args {
    /// JSON portfolio file, the compiled-in portfolio is used otherwise
    #[arg(long, env = "PRICEWATCH_CONFIG")]
    config: Option<PathBuf>,
    /// Seconds between cycles
    #[arg(long, env = "PRICEWATCH_INTERVAL")]
    interval: Option<u64>,
    /// Currency pair converting quotes into the home currency, e.g. USDJPY
    #[arg(long, env = "PRICEWATCH_FX", value_parser = parse_pair)]
    fx: Option<FxPair>,
    /// Replay recorded quotes from a JSON lines file instead of querying the provider
    #[arg(long)]
    replay: Option<PathBuf>,
    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,
}

fn parse_pair(value: &str) -> Result<FxPair, String> {
    FxPair::try_from(value)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    match args.replay {
        Some(path) => {
            let provider = ReplayProvider::load(&path).await?;
            run(&config, provider, args.once).await
        }
        None => run(&config, YahooProvider::new()?, args.once).await,
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let mut builder = match &args.config {
        Some(path) => ConfigBuilder::load_from_file(path)?,
        None => ConfigBuilder::default(),
    };
    if let Some(secs) = args.interval {
        builder = builder.with_period(Duration::from_secs(secs));
    }
    if let Some(fx) = &args.fx {
        builder.fx = fx.clone();
    }
    Ok(builder.build()?)
}

async fn run<P: QuoteProvider>(config: &Config, provider: P, once: bool) -> Result<()> {
    let mut reporter = ConsoleReporter::stdout();
    reporter.banner(config);

    let mut scheduler = Scheduler::new(config, PriceFetcher::new(provider), reporter);
    if once {
        let outcome = scheduler.run_once().await;
        info!(completed = outcome.is_completed(), "Single cycle done");
        return Ok(());
    }

    scheduler
        .run(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for interrupt : {err}");
                std::future::pending::<()>().await;
            }
        })
        .await;
    Ok(())
}
