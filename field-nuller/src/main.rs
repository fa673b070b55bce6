use clap::{Parser, Subcommand};
use field_nuller::{
    build_client, collect_failed_identifiers, BatchDispatcher, Config, OAuthTokenAcquirer,
    Orchestrator, RunOptions, RunReport, TerminalPrompter,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "field-nuller", version, about = "Clear fields on contact records in bulk")]
struct Cli {
    /// Overrides OUTPUT_DIR
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Clear the given fields on every contact listed in INPUT
    Run {
        /// One contact identifier per line
        input: PathBuf,
        /// Comma-separated field names; prompted for when omitted
        #[arg(long)]
        fields: Option<String>,
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Write the identifiers of failed batches to a file, one per line
    FailedIds {
        /// Defaults to <output-dir>/failed_ids.txt
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match execute(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> anyhow::Result<u8> {
    let mut config = Config::from_env()?;
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }

    match cli.command {
        Command::Run { input, fields, yes } => {
            let cancel = CancellationToken::new();
            tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

            let client = build_client(&config)?;
            let token_acquirer = OAuthTokenAcquirer::new(client.clone(), &config);
            let dispatcher = BatchDispatcher::new(client, &config);
            let orchestrator = Orchestrator::new(
                config,
                Box::new(TerminalPrompter::new()),
                Box::new(token_acquirer),
                dispatcher,
            );

            let options = RunOptions { fields, assume_yes: yes };
            let report = orchestrator.run(&input, &options, &cancel).await?;
            match &report {
                RunReport::Declined => println!("Operation cancelled."),
                RunReport::Completed(summary) => println!("Done: {}", summary),
                RunReport::Interrupted(summary) => println!("Interrupted: {}", summary),
            }
            Ok(report.exit_code())
        }
        Command::FailedIds { out } => {
            let out = out.unwrap_or_else(|| config.output_dir.join("failed_ids.txt"));
            let identifiers = collect_failed_identifiers(config.results_dir()).await?;
            let mut content = identifiers
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            if !content.is_empty() {
                content.push('\n');
            }
            tokio::fs::write(&out, content).await?;
            info!("Wrote {} identifiers to {}", identifiers.len(), out.display());
            Ok(0)
        }
    }
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            warn!("Received Ctrl+C, stopping after the current step");
            cancel.cancel();
        }
        Err(e) => warn!("Failed to install Ctrl+C handler: {}", e),
    }
}
