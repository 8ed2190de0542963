mod alias;
mod builtins;
mod completion;
mod config;
mod dispatch;
mod environment;
mod error;
mod executor;
mod history;
mod repl;
mod store;
mod tokenizer;
mod util;

use std::process::ExitCode;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    // RUST_LOG overrides; warnings are on by default so store problems show up
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();

    match repl::start_repl(config::ShellConfig::from_env()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:?}");
            ExitCode::FAILURE
        }
    }
}
