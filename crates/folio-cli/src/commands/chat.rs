//! Interactive terminal chat against one conversation engine.

use anyhow::Context;
use folio_chat::{ChatResources, ConversationEngine};
use folio_core::config::Config;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::sync::Arc;

const PROMPT: &str = "Ask me anything: ";

/// Words that end the session.
pub const EXIT_WORDS: &[&str] = &["exit", "quit", "bye"];

/// Whether `line` asks to leave.
pub fn is_exit(line: &str) -> bool {
    let line = line.trim();
    EXIT_WORDS.iter().any(|w| line.eq_ignore_ascii_case(w))
}

fn history_file() -> PathBuf {
    folio_core::paths::base_dir()
        .map(|d| d.join("chat_history"))
        .unwrap_or_else(|_| PathBuf::from(".folio_chat_history"))
}

/// Run the chat command.
pub async fn run(config: Config) -> anyhow::Result<()> {
    eprintln!("{}", console::style("Indexing portfolio documents...").dim());
    let resources = ChatResources::from_config(&config)
        .await
        .context("Failed to initialize chatbot")?;
    eprintln!(
        "{} {} chunks indexed. Type {} to leave.",
        console::style("Ready.").green().bold(),
        resources.index.len(),
        EXIT_WORDS.join(", ")
    );

    let mut engine = ConversationEngine::new(Arc::new(resources));
    let mut rl = DefaultEditor::new()?;
    let history = history_file();
    let _ = rl.load_history(&history);

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                if is_exit(&line) {
                    break;
                }
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.trim());

                let answer = engine.get_response(&line).await;
                println!("{}", answer);
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}: {}", console::style("Error").red(), err);
                break;
            }
        }
    }

    let _ = rl.save_history(&history);
    println!("Goodbye!");
    Ok(())
}
