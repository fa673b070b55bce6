use field_nuller::{NullerError, Prompter, TerminalPrompter};
use std::io::{Cursor, Read};
use std::time::Duration;

/// A terminal nobody ever types into.
struct IdleTerminal;

impl Read for IdleTerminal {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
        loop {
            std::thread::park();
        }
    }
}

#[tokio::test]
async fn test_answers_are_read_in_order() {
    let prompter = TerminalPrompter::from_reader(Cursor::new("api-key\r\n  email, phone \nYes\n"));

    assert_eq!(prompter.ask("Enter API key:").await.unwrap(), "api-key");
    assert_eq!(prompter.ask("Fields:").await.unwrap(), "  email, phone ");
    assert!(prompter.confirm("Proceed? (y/n):").await.unwrap());
}

#[tokio::test]
async fn test_end_of_input_is_a_prompt_error() {
    let prompter = TerminalPrompter::from_reader(Cursor::new("n\n"));

    assert!(!prompter.confirm("Proceed? (y/n):").await.unwrap());
    assert!(matches!(prompter.ask("Again?").await, Err(NullerError::Prompt(_))));
}

// The runtime must be able to shut down while a question is still unanswered;
// if the read held a blocking-pool thread this test would never finish.
#[tokio::test]
async fn test_abandoned_prompt_does_not_hold_the_runtime() {
    let prompter = TerminalPrompter::from_reader(std::io::BufReader::new(IdleTerminal));

    let result = tokio::time::timeout(Duration::from_millis(100), prompter.ask("Enter API key:")).await;
    assert!(result.is_err());
}
