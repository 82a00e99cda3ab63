use std::future::poll_fn;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use catfacts::logging::init_tracing;
use catfacts::{
    ui_context, Config, FactResult, FactSession, FactSource, HttpFactProvider, OfflineProvider,
    RemoteFactProvider, TokioScheduler,
};
use clap::Parser;
use futures_core::Stream;
use tokio::sync::watch;

/// Print a cat fact every few seconds.
#[derive(Debug, Parser)]
#[command(name = "catfacts", version)]
struct Cli {
    /// Config file (default: ~/.config/catfacts/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pause between facts in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Base URL of the fact service
    #[arg(long)]
    base_url: Option<String>,

    /// Never contact the fact service; every fact is local
    #[arg(long, conflicts_with = "local")]
    offline: bool,

    /// Print the local periodic feed instead of the session stream
    #[arg(long)]
    local: bool,

    /// Exit after this many facts
    #[arg(long)]
    count: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&config.logging.level);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("catfacts-bg")
        .build()
        .context("Failed to start async runtime")?;

    if cli.local {
        return runtime.block_on(run_local(&config, cli.count));
    }

    let provider: Arc<dyn RemoteFactProvider> = if cli.offline {
        Arc::new(OfflineProvider)
    } else {
        Arc::new(HttpFactProvider::new(&config.remote).context("Failed to create fact client")?)
    };

    let background = TokioScheduler::new(runtime.handle().clone());
    let (ui, ui_loop) = ui_context();
    let session = FactSession::from_config(&config, provider, &background, Arc::new(ui))
        .context("Failed to start fact session")?;
    let results = session.results();

    // The UI loop and the renderer run here, on the main thread.
    runtime.block_on(async {
        tokio::select! {
            _ = ui_loop.run() => {}
            _ = render(results, cli.count) => {}
            _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted"),
        }
    });

    session.close();
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let path = cli.config.clone().unwrap_or_else(Config::config_path);
    let mut config = Config::load_from(&path)?;

    if let Some(interval_ms) = cli.interval_ms {
        config.stream.interval_ms = interval_ms;
    }
    if let Some(base_url) = &cli.base_url {
        config.remote.base_url = base_url.clone();
    }

    config.validate()?;
    Ok(config)
}

async fn render(mut results: watch::Receiver<Option<FactResult>>, count: Option<u64>) {
    let mut shown = 0u64;
    while results.changed().await.is_ok() {
        let Some(result) = results.borrow_and_update().clone() else {
            continue;
        };

        match result {
            FactResult::Success(fact) => {
                println!("{}", fact);
                shown += 1;
                if count.is_some_and(|limit| shown >= limit) {
                    return;
                }
            }
            FactResult::Error(message) => {
                eprintln!("error: {}", message);
                return;
            }
            FactResult::ServerError => {
                eprintln!("error: fact service failed");
                return;
            }
        }
    }
}

async fn run_local(config: &Config, count: Option<u64>) -> Result<()> {
    let source = Arc::new(FactSource::new(config.facts.pool.clone())?);
    let mut feed = source.periodic_facts(Duration::from_millis(config.stream.interval_ms));
    let mut shown = 0u64;

    loop {
        let next = tokio::select! {
            fact = poll_fn(|cx| Pin::new(&mut feed).poll_next(cx)) => fact,
            _ = tokio::signal::ctrl_c() => break,
        };
        let Some(fact) = next else {
            break;
        };

        println!("{}", fact);
        shown += 1;
        if count.is_some_and(|limit| shown >= limit) {
            break;
        }
    }

    Ok(())
}
