// completion.rs

use std::os::unix::fs::PermissionsExt;

use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Context, Helper};

use crate::builtins::BUILTINS;
use crate::tokenizer::DELIMITERS;

/// Line-editor helper: the first word completes to a builtin or an
/// executable on `PATH`, later words to file names.
pub struct ShellHelper {
    files: FilenameCompleter,
}

impl ShellHelper {
    pub fn new() -> Self {
        Self {
            files: FilenameCompleter::new(),
        }
    }
}

fn executables_on_path(prefix: &str) -> Vec<String> {
    let Ok(path_var) = std::env::var("PATH") else {
        return Vec::new();
    };
    let mut names = Vec::new();
    for dir in path_var.split(':').filter(|d| !d.is_empty()) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if !name.starts_with(prefix) {
                continue;
            }
            let executable = entry
                .metadata()
                .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
                .unwrap_or(false);
            if executable {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Candidates for the command word.
pub fn command_candidates(prefix: &str) -> Vec<String> {
    let mut names: Vec<String> = BUILTINS
        .iter()
        .filter(|b| b.starts_with(prefix))
        .map(|b| b.to_string())
        .collect();
    names.extend(executables_on_path(prefix));
    names.sort();
    names.dedup();
    names
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Result<(usize, Vec<Pair>), ReadlineError> {
        let before = &line[..pos];
        let start = before
            .rfind(DELIMITERS)
            .map(|i| i + 1)
            .unwrap_or(0);
        if !before[..start].trim_matches(DELIMITERS).is_empty() {
            return self.files.complete(line, pos, ctx);
        }
        let pairs = command_candidates(&before[start..])
            .into_iter()
            .map(|name| Pair {
                replacement: format!("{} ", name),
                display: name,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> Result<ValidationResult, ReadlineError> {
        Ok(ValidationResult::Valid(None))
    }
}

impl Helper for ShellHelper {}
