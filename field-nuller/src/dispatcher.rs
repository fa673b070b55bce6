use crate::auth::BearerToken;
use crate::config::Config;
use crate::traits::OutcomeSink;
use crate::types::{Batch, BatchOutcome, Result};
use chrono::Utc;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Shared HTTP client for the token exchange and the update endpoint.
pub fn build_client(config: &Config) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(config.request_timeout)
        .build()?;
    Ok(client)
}

/// What `dispatch_all` saw before it returned.
#[derive(Debug)]
pub struct DispatchReport {
    /// One per dispatched batch, in submission order.
    pub outcomes: Vec<BatchOutcome>,
    pub unrecorded: usize,
    pub interrupted: bool,
}

/// Sends batches to the update endpoint one at a time.
pub struct BatchDispatcher {
    client: Client,
    update_url: String,
    delay: Duration,
}

impl BatchDispatcher {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            update_url: config.update_url(),
            delay: config.dispatch_delay,
        }
    }

    pub fn update_url(&self) -> &str {
        &self.update_url
    }

    /// Submit one batch. Every failure mode becomes a `Failure` outcome.
    pub async fn dispatch(&self, batch_index: usize, batch: &Batch, token: &BearerToken) -> BatchOutcome {
        let start_time = Instant::now();

        match self.send(batch, token).await {
            Ok(response_body) => {
                debug!(
                    "Batch {} accepted in {} ms",
                    batch_index,
                    start_time.elapsed().as_millis()
                );
                BatchOutcome::Success {
                    batch_index,
                    response_body,
                }
            }
            Err(error_message) => BatchOutcome::Failure {
                batch_index,
                error_message,
                batch: batch.clone(),
                timestamp: Utc::now(),
            },
        }
    }

    async fn send(&self, batch: &Batch, token: &BearerToken) -> std::result::Result<serde_json::Value, String> {
        let response = self
            .client
            .post(&self.update_url)
            .bearer_auth(token.secret())
            .json(batch)
            .send()
            .await
            .map_err(|e| format!("update request could not be sent: {}", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("could not read response (status: {}): {}", status.as_u16(), e))?;

        if !status.is_success() {
            return Err(format!(
                "update request failed with status: {}, body: {}",
                status.as_u16(),
                body
            ));
        }

        serde_json::from_str(&body)
            .map_err(|e| format!("response body is not valid JSON (status: {}): {}", status.as_u16(), e))
    }

    /// Dispatch `batches` strictly in order, handing each outcome to `sink`
    /// before the next request starts. A failed batch never stops the run;
    /// only `cancel` does.
    pub async fn dispatch_all(
        &self,
        batches: &[Batch],
        token: &BearerToken,
        cancel: &CancellationToken,
        sink: &dyn OutcomeSink,
    ) -> DispatchReport {
        let total = batches.len();
        let mut report = DispatchReport {
            outcomes: Vec::with_capacity(total),
            unrecorded: 0,
            interrupted: false,
        };

        for (position, batch) in batches.iter().enumerate() {
            let batch_index = position + 1;

            if cancel.is_cancelled() {
                report.interrupted = true;
                break;
            }

            info!("Dispatching batch {}/{} ({} records)", batch_index, total, batch.len());

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!("Interrupted while batch {} was in flight; abandoning it", batch_index);
                    report.interrupted = true;
                    break;
                }
                outcome = self.dispatch(batch_index, batch, token) => outcome,
            };

            match &outcome {
                BatchOutcome::Success { .. } => info!("Batch {}/{} succeeded", batch_index, total),
                BatchOutcome::Failure { error_message, .. } => {
                    error!("Batch {}/{} failed: {}", batch_index, total, error_message)
                }
            }

            if let Err(e) = sink.record(&outcome).await {
                error!("Could not save result of batch {}: {}", batch_index, e);
                report.unrecorded += 1;
            }
            report.outcomes.push(outcome);

            if batch_index < total && !self.delay.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        report.interrupted = true;
                        break;
                    }
                    _ = tokio::time::sleep(self.delay) => {}
                }
            }
        }

        if report.interrupted {
            warn!(
                "Dispatch interrupted after {} of {} batches",
                report.outcomes.len(),
                total
            );
        }

        report
    }
}
