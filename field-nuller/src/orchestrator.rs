use crate::auth::Credentials;
use crate::batch_builder::BatchBuilder;
use crate::config::Config;
use crate::dispatcher::BatchDispatcher;
use crate::loader::IdentifierLoader;
use crate::recorder::ResultRecorder;
use crate::staging::StagingStore;
use crate::traits::{Prompter, TokenAcquirer};
use crate::types::{FieldSet, NullerError, Result, RunReport, RunSummary};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Answers that may be supplied up front instead of at the prompt.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Comma-separated field list; prompts when `None`.
    pub fields: Option<String>,
    /// Skip the confirmation prompt.
    pub assume_yes: bool,
}

/// Sequences one bulk field-clearing run from input file to summary.
pub struct Orchestrator {
    config: Config,
    prompter: Box<dyn Prompter>,
    token_acquirer: Box<dyn TokenAcquirer>,
    dispatcher: BatchDispatcher,
    recorder: ResultRecorder,
    staging: StagingStore,
}

impl Orchestrator {
    /// Results and staging paths are derived from `config.output_dir`.
    pub fn new(
        config: Config,
        prompter: Box<dyn Prompter>,
        token_acquirer: Box<dyn TokenAcquirer>,
        dispatcher: BatchDispatcher,
    ) -> Self {
        let recorder = ResultRecorder::new(config.results_dir());
        let staging = StagingStore::new(config.staging_path());
        Self {
            config,
            prompter,
            token_acquirer,
            dispatcher,
            recorder,
            staging,
        }
    }

    /// Setup and authentication problems come back as `Err` before any
    /// update request is sent. Batch failures do not; they are counted in
    /// the returned summary.
    pub async fn run(&self, input: &Path, options: &RunOptions, cancel: &CancellationToken) -> Result<RunReport> {
        match self.execute(input, options, cancel).await {
            Err(NullerError::Interrupted) => {
                warn!("Interrupted before any batches were built; nothing was sent");
                Ok(RunReport::Interrupted(RunSummary::default()))
            }
            other => other,
        }
    }

    async fn execute(&self, input: &Path, options: &RunOptions, cancel: &CancellationToken) -> Result<RunReport> {
        let identifiers = IdentifierLoader::load_path(input).await?;
        let credentials = self.credentials(cancel).await?;

        let field_list = match &options.fields {
            Some(fields) => fields.clone(),
            None => {
                self.ask("Enter the fields to clear, separated by commas:", cancel)
                    .await?
            }
        };
        let fields = FieldSet::parse(&field_list)?;

        let builder = BatchBuilder::new(self.config.batch_size);
        let batches = builder.build(&identifiers, &fields);
        info!(
            "Prepared {} batches for {} contacts, clearing fields: {}",
            batches.len(),
            identifiers.len(),
            fields.iter().collect::<Vec<_>>().join(", ")
        );

        if !options.assume_yes {
            let question = format!(
                "Clear {} field(s) on {} contacts in {} batches via {}? (y/n):",
                fields.len(),
                identifiers.len(),
                batches.len(),
                self.dispatcher.update_url()
            );
            let confirmed = match until_cancelled(cancel, self.prompter.confirm(&question)).await {
                Err(NullerError::Interrupted) => {
                    warn!("Interrupted at confirmation; no batches were sent");
                    return Ok(RunReport::Interrupted(untouched(batches.len())));
                }
                other => other?,
            };
            if !confirmed {
                info!("Operation cancelled by operator");
                return Ok(RunReport::Declined);
            }
        }

        if cancel.is_cancelled() {
            return Ok(RunReport::Interrupted(untouched(batches.len())));
        }

        self.staging.write(&batches).await?;
        let batches = self.staging.read().await?;

        let token = match until_cancelled(cancel, self.token_acquirer.acquire_token(&credentials)).await {
            Err(NullerError::Interrupted) => {
                warn!("Interrupted during token exchange; no batches were sent");
                return Ok(RunReport::Interrupted(untouched(batches.len())));
            }
            other => other?,
        };

        self.recorder.ensure_dir().await?;
        let report = self
            .dispatcher
            .dispatch_all(&batches, &token, cancel, &self.recorder)
            .await;

        let mut summary = ResultRecorder::summarize(&report.outcomes);
        summary.unrecorded = report.unrecorded;
        summary.not_attempted = batches.len() - report.outcomes.len();
        summary.total_batches = batches.len();

        if report.interrupted {
            warn!("Run interrupted: {}", summary);
            return Ok(RunReport::Interrupted(summary));
        }

        info!("Run complete: {}", summary);
        if summary.failed > 0 {
            warn!(
                "Failed batches are saved under {}; collect their identifiers with `failed-ids`",
                self.recorder.results_dir().display()
            );
        }
        Ok(RunReport::Completed(summary))
    }

    async fn ask(&self, question: &str, cancel: &CancellationToken) -> Result<String> {
        until_cancelled(cancel, self.prompter.ask(question)).await
    }

    async fn credentials(&self, cancel: &CancellationToken) -> Result<Credentials> {
        let client_id = match &self.config.api_key {
            Some(key) => key.clone(),
            None => self.ask("Enter API key:", cancel).await?.trim().to_string(),
        };
        let client_secret = match &self.config.api_secret {
            Some(secret) => secret.clone(),
            None => self.ask("Enter API secret:", cancel).await?.trim().to_string(),
        };
        if client_id.is_empty() || client_secret.is_empty() {
            return Err(NullerError::Config("API key and secret are both required".to_string()));
        }
        Ok(Credentials::new(client_id, client_secret))
    }
}

/// Summary for a run stopped before its first batch went out.
fn untouched(total_batches: usize) -> RunSummary {
    RunSummary {
        total_batches,
        not_attempted: total_batches,
        ..Default::default()
    }
}

async fn until_cancelled<T, F>(cancel: &CancellationToken, future: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    tokio::select! {
        _ = cancel.cancelled() => Err(NullerError::Interrupted),
        result = future => result,
    }
}
