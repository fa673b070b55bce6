use crate::auth::{BearerToken, Credentials};
use crate::types::{BatchOutcome, Result};
use async_trait::async_trait;

/// Exchanges client credentials for a bearer token
#[async_trait]
pub trait TokenAcquirer: Send + Sync {
    async fn acquire_token(&self, credentials: &Credentials) -> Result<BearerToken>;
}

/// Source of operator answers (a terminal in production, a script in tests)
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Ask a free-form question and return the answer line without its line ending.
    async fn ask(&self, question: &str) -> Result<String>;

    /// Ask a yes/no question. Only an explicit yes counts.
    async fn confirm(&self, question: &str) -> Result<bool> {
        let answer = self.ask(question).await?;
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }
}

/// Receives each batch outcome as soon as it is known, before the next
/// batch is dispatched.
#[async_trait]
pub trait OutcomeSink: Send + Sync {
    async fn record(&self, outcome: &BatchOutcome) -> Result<()>;
}
