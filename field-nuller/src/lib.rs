pub mod types;
pub mod config;
pub mod traits;
pub mod loader;
pub mod batch_builder;
pub mod auth;
pub mod dispatcher;
pub mod recorder;
pub mod staging;
pub mod prompt;
pub mod orchestrator;

pub use types::*;
pub use config::Config;
pub use traits::{OutcomeSink, Prompter, TokenAcquirer};
pub use loader::IdentifierLoader;
pub use batch_builder::BatchBuilder;
pub use auth::{BearerToken, Credentials, OAuthTokenAcquirer};
pub use dispatcher::{build_client, BatchDispatcher, DispatchReport};
pub use recorder::{collect_failed_identifiers, ResultRecorder};
pub use staging::StagingStore;
pub use prompt::TerminalPrompter;
pub use orchestrator::{Orchestrator, RunOptions};
