//! Interactive chat loop

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use vibebus_core::orchestration::Orchestrator;
use vibebus_core::session::SessionContext;

const EXIT_WORDS: [&str; 3] = ["quit", "exit", "q"];

fn is_exit(input: &str) -> bool {
    let input = input.trim();
    EXIT_WORDS.iter().any(|w| input.eq_ignore_ascii_case(w))
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.blue} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message("Thinking...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_reply(reply: &str) {
    if reply.starts_with("Error: ") {
        println!("{}", style(reply).red());
    } else {
        println!("{}: {}", style("Assistant").bold().green(), reply);
    }
}

async fn turn(orchestrator: &Orchestrator, session: &mut SessionContext, input: &str) -> String {
    let spinner = thinking_spinner();
    let reply = orchestrator.handle_turn(session, input).await;
    spinner.finish_and_clear();
    reply
}

pub async fn run_one_shot(orchestrator: &Orchestrator, mut session: SessionContext, prompt: &str) {
    let reply = turn(orchestrator, &mut session, prompt).await;
    print_reply(&reply);
}

pub async fn run_chat(orchestrator: &Orchestrator, mut session: SessionContext) -> anyhow::Result<()> {
    println!(
        "{} {}",
        style("🚌 Vibebus").bold().cyan(),
        style(format!("(model: {})", orchestrator.model())).dim()
    );
    println!(
        "{}",
        style("Ask about the weather, bus departures, stops or the time. Type 'quit' to exit.").dim()
    );
    println!();

    let mut editor = DefaultEditor::new()?;

    loop {
        let line = match editor.readline("You: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if is_exit(input) {
            break;
        }
        let _ = editor.add_history_entry(input);

        let reply = turn(orchestrator, &mut session, input).await;
        print_reply(&reply);
        println!();
    }

    tracing::debug!(session = %session.id(), messages = session.conversation.len(), "Session ended");
    println!("{}", style("Goodbye!").dim());
    Ok(())
}
