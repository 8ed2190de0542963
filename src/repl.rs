// repl.rs

use std::io::{self, Write};

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config, Editor};

use crate::completion::ShellHelper;
use crate::config::ShellConfig;
use crate::dispatch::{Flow, Shell};
use crate::executor::ForkExecutor;

const PROMPT: &str = "$ ";

/// Runs the interactive loop until `exit` or end of input, then saves state.
pub fn start_repl(config: ShellConfig) -> Result<()> {
    let editor_config = Config::builder()
        .completion_type(CompletionType::List)
        .auto_add_history(false)
        .build();
    let mut rl: Editor<ShellHelper, DefaultHistory> =
        Editor::with_config(editor_config).context("failed to create line editor")?;
    rl.set_helper(Some(ShellHelper::new()));

    let mut shell = Shell::new(&config, ForkExecutor);
    shell.startup();

    let mut stdout = io::stdout();
    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = rl.add_history_entry(line.as_str()) {
                        tracing::debug!("line editor history: {}", e);
                    }
                }
                let flow = match shell.process_line(&line, &mut stdout) {
                    Ok(flow) => flow,
                    Err(e) => {
                        eprintln!("{}", e);
                        Flow::Continue
                    }
                };
                stdout.flush().ok();
                if flow == Flow::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("error: {}", err);
                break;
            }
        }
    }

    shell.shutdown();
    Ok(())
}
