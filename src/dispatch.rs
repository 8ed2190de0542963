// dispatch.rs

use std::collections::HashSet;
use std::io::Write;

use itertools::Itertools;

use crate::alias::AliasTable;
use crate::builtins::{run_builtin, Builtin};
use crate::config::ShellConfig;
use crate::environment::Environment;
use crate::error::ShellError;
use crate::executor::{ExecOutcome, Executor};
use crate::history::{HistoryRing, Recall};
use crate::store::Stores;
use crate::tokenizer::{split_words, strip_line_ending};

/// What the REPL should do after a line has been handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// The mutable tables the builtins operate on.
pub struct ShellState {
    pub aliases: AliasTable,
    pub history: HistoryRing,
    pub env: Environment,
}

pub struct Shell<E> {
    state: ShellState,
    stores: Stores,
    executor: E,
}

impl<E: Executor> Shell<E> {
    pub fn new(config: &ShellConfig, executor: E) -> Self {
        Self {
            state: ShellState {
                aliases: AliasTable::with_capacity(config.alias_capacity),
                history: HistoryRing::with_capacity(config.history_capacity),
                env: Environment::new(config.home.clone(), config.search_path.clone()),
            },
            stores: config.stores.clone(),
            executor,
        }
    }

    /// Enters the home directory and loads the persisted tables.
    pub fn startup(&mut self) {
        self.state.env.enter_home();
        self.stores
            .load(&mut self.state.aliases, &mut self.state.history);
    }

    /// Saves both tables and puts the startup `PATH` back.
    pub fn shutdown(&mut self) {
        self.stores.save(&self.state.aliases, &self.state.history);
        self.state.env.restore_search_path();
    }

    /// Handles one raw input line. Blank lines are ignored entirely; anything
    /// else is recorded in history before it is resolved and run.
    pub fn process_line(&mut self, raw: &str, out: &mut dyn Write) -> Result<Flow, ShellError> {
        let line = strip_line_ending(raw);
        let tokens = split_words(line);
        if tokens.is_empty() {
            return Ok(Flow::Continue);
        }
        self.state.history.record(line);

        let tokens = match Recall::parse(line) {
            Some(_) => {
                let recalled = self.expand_history(line)?;
                tracing::debug!(%line, %recalled, "history substitution");
                split_words(&recalled)
            }
            None => tokens,
        };
        if tokens.is_empty() {
            return Ok(Flow::Continue);
        }
        let argv = self.expand_aliases(tokens)?;
        self.dispatch(argv, out)
    }

    /// Rewrites a bang line into the command it recalls. A recalled line that
    /// is itself a reference is resolved in turn; revisiting one is an error.
    fn expand_history(&self, line: &str) -> Result<String, ShellError> {
        let mut current = line.to_string();
        let mut seen = HashSet::new();
        while let Some((recall, rest)) = Recall::parse(&current) {
            if !seen.insert(current.clone()) {
                return Err(crate::history::HistoryError::NoValidCommand.into());
            }
            let recalled = self.state.history.resolve(recall)?;
            current = std::iter::once(recalled)
                .chain(split_words(rest).iter().map(String::as_str))
                .join(" ");
        }
        Ok(current)
    }

    /// Replaces a leading alias with its value, keeping the remaining
    /// arguments, until the first word is no longer an alias.
    fn expand_aliases(&self, mut argv: Vec<String>) -> Result<Vec<String>, ShellError> {
        let mut expanded = HashSet::new();
        while let Some(value) = argv.first().and_then(|name| self.state.aliases.get(name)) {
            let name = argv.remove(0);
            if !expanded.insert(name.clone()) {
                return Err(ShellError::RecursiveAlias(name));
            }
            let mut words = split_words(value);
            tracing::debug!(alias = %name, ?words, "alias expansion");
            words.append(&mut argv);
            argv = words;
        }
        Ok(argv)
    }

    fn dispatch(&mut self, argv: Vec<String>, out: &mut dyn Write) -> Result<Flow, ShellError> {
        let Some(name) = argv.first() else {
            return Ok(Flow::Continue);
        };
        if let Some(builtin) = Builtin::from_name(name) {
            return run_builtin(builtin, &argv[1..], &mut self.state, out);
        }
        out.flush()?;
        tracing::debug!(?argv, "spawning external command");
        match self.executor.run(&argv) {
            ExecOutcome::SpawnFailed(errno) => Err(ShellError::spawn(name, errno)),
            outcome => {
                tracing::debug!(?outcome, "external command finished");
                Ok(Flow::Continue)
            }
        }
    }
}
