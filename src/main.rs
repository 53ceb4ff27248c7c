use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use tokio_util::sync::CancellationToken;

use wpeg::cli::{Cli, CliTask};
use wpeg::{
    resolve, spawn_listener, Bus, LogReload, Pipeline, Registry, ReloadCoordinator, Runner,
    Subscribe, TimingReporter,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if !cli.has_tasks() {
        // No task selected: help, exit 0.
        let _ = Cli::command().print_help();
        println!();
        return ExitCode::SUCCESS;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let ts = chrono::Local::now().format("%H:%M:%S");
            eprintln!("[{ts}] Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let targets = resolve(&cli.config)?;

    let bus = Bus::default();
    let registry = Arc::new(Registry::builtin(bus.clone()));
    let runner = Runner::new(registry, bus.clone());
    let reload = Arc::new(ReloadCoordinator::new(bus.clone(), Arc::new(LogReload)));

    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(TimingReporter::new())];
    let listener = spawn_listener(&bus, subscribers);

    let is_dev = cli.watch;
    let pipeline = Arc::new(Pipeline::new(runner, bus, reload, targets, is_dev));

    let mut result = Ok(());
    for task in cli.selected() {
        let step = match task {
            CliTask::Clean => pipeline.run_clean().await,
            CliTask::Build => pipeline.run_build().await,
            CliTask::Zip => pipeline.run_zip().await,
        };
        if let Err(e) = step {
            result = Err(e);
            break;
        }
    }

    if result.is_ok() && cli.watch {
        let cancel = CancellationToken::new();
        let signal = cancel.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            signal.cancel();
        });
        result = wpeg::watch::run(pipeline.clone(), cancel).await;
    }

    // Dropping the last bus sender closes the listener's receiver; give it a
    // moment to flush pending status lines.
    drop(pipeline);
    let _ = tokio::time::timeout(Duration::from_millis(200), listener).await;

    result.map_err(Into::into)
}
