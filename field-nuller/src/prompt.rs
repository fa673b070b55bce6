use crate::traits::Prompter;
use crate::types::{NullerError, Result};
use async_trait::async_trait;
use std::io::{BufRead, BufReader};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

type LineReceiver = mpsc::UnboundedReceiver<std::io::Result<String>>;

/// Prompts on stdout, answers from stdin.
///
/// Lines are read on a plain OS thread and handed over through a channel, so
/// an abandoned prompt never keeps the runtime from shutting down.
pub struct TerminalPrompter {
    reader: std::sync::Mutex<Option<Box<dyn BufRead + Send>>>,
    lines: Mutex<Option<LineReceiver>>,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self::from_reader(BufReader::new(std::io::stdin()))
    }

    /// Answer prompts from any line source. Nothing is read until the first question.
    pub fn from_reader(reader: impl BufRead + Send + 'static) -> Self {
        Self {
            reader: std::sync::Mutex::new(Some(Box::new(reader))),
            lines: Mutex::new(None),
        }
    }

    fn start_reader(&self) -> Result<LineReceiver> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| NullerError::Prompt("input reader lock poisoned".to_string()))?
            .take()
            .ok_or_else(|| NullerError::Prompt("input reader already started".to_string()))?;

        let (sender, receiver) = mpsc::unbounded_channel();
        std::thread::Builder::new()
            .name("prompt-input".to_string())
            .spawn(move || read_lines(reader, sender))?;
        debug!("Started prompt input thread");
        Ok(receiver)
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

fn read_lines(mut reader: Box<dyn BufRead + Send>, sender: mpsc::UnboundedSender<std::io::Result<String>>) {
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                if sender.send(Ok(line)).is_err() {
                    break;
                }
            }
            Err(e) => {
                let _ = sender.send(Err(e));
                break;
            }
        }
    }
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn ask(&self, question: &str) -> Result<String> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(format!("{} ", question.trim_end()).as_bytes()).await?;
        stdout.flush().await?;

        let mut lines = self.lines.lock().await;
        if lines.is_none() {
            *lines = Some(self.start_reader()?);
        }
        let Some(receiver) = lines.as_mut() else {
            return Err(NullerError::Prompt("input reader unavailable".to_string()));
        };

        match receiver.recv().await {
            Some(Ok(line)) => Ok(line.trim_end_matches(['\r', '\n']).to_string()),
            Some(Err(e)) => Err(NullerError::Io(e)),
            None => Err(NullerError::Prompt(format!("no answer given to \"{}\"", question.trim()))),
        }
    }
}
