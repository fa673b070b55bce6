#![allow(dead_code)]

use async_trait::async_trait;
use field_nuller::{BatchOutcome, Config, NullerError, OutcomeSink, Prompter, Result};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};
use std::time::Duration;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const TEST_TOKEN: &str = "test-token";
pub const UPDATE_PATH: &str = "/v1/contacts/update";
pub const TOKEN_PATH: &str = "/oauth/token";

/// Config pointed at a mock server with no inter-batch delay.
pub fn test_config(server_uri: &str, output_dir: &Path) -> Config {
    Config {
        base_url: format!("{}/v1", server_uri),
        token_url: format!("{}{}", server_uri, TOKEN_PATH),
        dispatch_delay: Duration::ZERO,
        request_timeout: Duration::from_secs(5),
        output_dir: output_dir.to_path_buf(),
        api_key: Some("key".to_string()),
        api_secret: Some("secret".to_string()),
        ..Config::default()
    }
}

pub fn contact_ids(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("contact-{:03}", i)).collect()
}

pub fn write_input(dir: &Path, lines: &[String]) -> PathBuf {
    let path = dir.join("ids.txt");
    std::fs::write(&path, lines.join("\n")).expect("write input file");
    path
}

/// Hands out canned answers in order and remembers every question.
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
    pub asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn ask(&self, question: &str) -> Result<String> {
        self.asked.lock().unwrap().push(question.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| NullerError::Prompt(format!("unexpected question: {}", question)))
    }
}

#[derive(Default)]
pub struct MemorySink {
    pub outcomes: Mutex<Vec<BatchOutcome>>,
}

#[async_trait]
impl OutcomeSink for MemorySink {
    async fn record(&self, outcome: &BatchOutcome) -> Result<()> {
        self.outcomes.lock().unwrap().push(outcome.clone());
        Ok(())
    }
}

pub struct FailingSink;

#[async_trait]
impl OutcomeSink for FailingSink {
    async fn record(&self, _outcome: &BatchOutcome) -> Result<()> {
        Err(NullerError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        )))
    }
}
