use anyhow::Result;
use ragchat_runner::ChatRunner;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::commands::{info, print_outcome};

/// A line typed at the chat prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum ReplInput<'a> {
    Quit,
    Clear,
    Info,
    Empty,
    Question(&'a str),
}

impl<'a> ReplInput<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line.to_lowercase().as_str() {
            "" => Self::Empty,
            "quit" | "exit" => Self::Quit,
            "clear" => Self::Clear,
            "info" => Self::Info,
            _ => Self::Question(line),
        }
    }
}

pub async fn run(runner: &mut ChatRunner) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    println!("{}", "=".repeat(60));
    println!("Ask questions about your documents.");
    println!("Commands: 'clear' resets the history, 'info' shows settings, 'quit' exits.");
    println!("{}", "=".repeat(60));

    loop {
        let line = match editor.readline("\nYou> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        match ReplInput::parse(&line) {
            ReplInput::Empty => continue,
            ReplInput::Quit => break,
            ReplInput::Clear => {
                runner.clear_conversation();
                println!("Conversation history cleared.");
            }
            ReplInput::Info => info(runner).await?,
            ReplInput::Question(question) => {
                let _ = editor.add_history_entry(question);
                let outcome = runner.converse(question).await;
                print_outcome(&outcome);
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_case_insensitively() {
        assert_eq!(ReplInput::parse("  QUIT "), ReplInput::Quit);
        assert_eq!(ReplInput::parse("exit"), ReplInput::Quit);
        assert_eq!(ReplInput::parse("Clear"), ReplInput::Clear);
        assert_eq!(ReplInput::parse("info"), ReplInput::Info);
        assert_eq!(ReplInput::parse("   "), ReplInput::Empty);
    }

    #[test]
    fn anything_else_is_a_question() {
        assert_eq!(
            ReplInput::parse(" What does Policy A do? "),
            ReplInput::Question("What does Policy A do?")
        );
        assert_eq!(ReplInput::parse("clear the air?"), ReplInput::Question("clear the air?"));
    }
}
