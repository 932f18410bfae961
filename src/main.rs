use clap::Parser;

use freezepack::cli::{Cli, Commands};
use freezepack::config::ConfigManager;
use freezepack::log_collector::get_global_logs_path;
use freezepack::orchestrator::BuildOrchestrator;
use freezepack::system::ProcessRunner;
use freezepack::{log_parsed, BuildError, LogCollector};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let level = cli.log_level();

    // Logging first so config resolution is captured too
    let log_dir = get_global_logs_path(&cli.project_root);
    let log_collector = match LogCollector::new(log_dir, level) {
        Ok(collector) => {
            if let Err(e) = collector.clone().install(level) {
                eprintln!("[Main] WARNING: Failed to register logger: {}", e);
            }
            Some(collector)
        }
        Err(e) => {
            eprintln!("[Main] WARNING: LogCollector initialization failed: {}", e);
            None
        }
    };

    let result = run(&cli).await;

    let code = match &result {
        Ok(()) => 0,
        Err(e) => {
            log::error!("{}", e);
            exit_code_for(e.as_ref())
        }
    };

    if let Some(collector) = log_collector {
        if let Err(e) = collector.wait_for_empty() {
            eprintln!("[Main] WARNING: Log flush failed: {}", e);
        }
    }

    // Without a registered logger the error would otherwise go unseen
    if let Err(e) = &result {
        if log::max_level() == log::LevelFilter::Off {
            eprintln!("Error: {}", e);
        }
    }
    std::process::exit(code);
}

async fn run(cli: &Cli) -> freezepack::Result<()> {
    let manager = ConfigManager::resolve(&cli.project_root, cli.config.as_deref())?;
    if let Some(source) = manager.source() {
        log::info!("[Main] Using configuration {}", source.display());
    }
    let orchestrator = BuildOrchestrator::new(manager.into_config(), Box::new(ProcessRunner::new()));

    match cli.command() {
        Commands::Freeze => orchestrator.run_freeze().await?,
        Commands::Plan => {
            let spec = orchestrator.plan()?;
            println!("{}", serde_json::to_string_pretty(&spec)?);
        }
        Commands::Locales => {
            for locale in orchestrator.locales()? {
                println!("{}", locale);
            }
        }
        Commands::InstallerLangs { msi } => {
            let report = orchestrator.installer_languages(&msi)?;
            log_parsed!(
                "Languages: {}",
                report
                    .locales
                    .iter()
                    .map(|l| l.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
    Ok(())
}

/// The freeze tool's own exit code is passed through; everything else is 1.
fn exit_code_for(error: &(dyn std::error::Error + 'static)) -> i32 {
    match error.downcast_ref::<BuildError>() {
        Some(BuildError::FreezeFailed { code: Some(code) }) if *code != 0 => *code,
        _ => 1,
    }
}
