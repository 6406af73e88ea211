use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use caveman_runner::cli::output::{
    create_progress_bar, format_job_event, style, update_progress, CHECK, CROSS, INFO,
};
use caveman_runner::cli::Cli;
use caveman_runner::execution::{CavemanInvoker, RunController, SchedulingStrategy};
use caveman_runner::persistence::JobStore;
use caveman_runner::RunStatus;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Validate before any job exists
    let config = Arc::new(cli.to_config());
    config
        .validate()
        .context("invalid pipeline configuration")?;

    // caveman.pl expects its log directory to exist up front
    tokio::fs::create_dir_all(config.clogs_dir())
        .await
        .with_context(|| format!("failed to create {}", config.clogs_dir().display()))?;

    let store = build_store(&cli).await?;
    let mut controller = RunController::new(
        CavemanInvoker::new(),
        store,
        Arc::clone(&config),
        SchedulingStrategy::LimitedParallel(cli.workers),
    );

    println!(
        "{} Job store: {}",
        INFO,
        style(cli.jobstore.display()).bold()
    );

    let progress = create_progress_bar(0);
    let bar = progress.clone();
    let verbose = cli.verbose;
    controller.add_event_handler(move |event| {
        if verbose {
            bar.println(format_job_event(event));
        }
        update_progress(&bar, event);
    });

    let status = controller.run(cli.restart).await?;

    match status {
        RunStatus::Completed => {
            println!(
                "{} Pipeline {} - flagged VCF written under {}",
                CHECK,
                style("completed").green(),
                style(config.outdir.display()).bold()
            );
            Ok(())
        }
        _ => {
            println!(
                "{} Pipeline {} - fix the failure and re-run with {}",
                CROSS,
                style("failed").red(),
                style("--restart").bold()
            );
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "sqlite")]
async fn build_store(cli: &Cli) -> Result<Arc<dyn JobStore>> {
    use caveman_runner::persistence::SqliteJobStore;

    let store = if cli.restart {
        SqliteJobStore::open(&cli.jobstore).await?
    } else {
        SqliteJobStore::create(&cli.jobstore).await?
    };
    Ok(Arc::new(store))
}

#[cfg(not(feature = "sqlite"))]
async fn build_store(cli: &Cli) -> Result<Arc<dyn JobStore>> {
    use caveman_runner::persistence::InMemoryJobStore;

    if cli.restart {
        anyhow::bail!("built without the sqlite feature; --restart cannot survive the process");
    }
    tracing::warn!("built without the sqlite feature; run state will not be persisted");
    Ok(Arc::new(InMemoryJobStore::new()))
}
