// builtins.rs

use std::io::Write;

use crate::alias::AddOutcome;
use crate::dispatch::{Flow, ShellState};
use crate::error::ShellError;
use crate::util::writeln_ignore_broken_pipe;

pub const BUILTINS: [&str; 9] = [
    "cd", "pwd", "getpath", "setpath", "history", "alias", "unalias", "exit", "help",
];

const HELP_TEXT: &str = "\
alias\t list aliases, or alias <name> <command...> to add one
unalias\t remove an alias
cd\t change the working directory (home when no argument)
pwd\t print the working directory
getpath\t print the search path
setpath\t replace the search path
history\t list previous commands
!!\t run the previous command
!<n>\t run command number <n> from history
help\t list the builtin commands
exit\t save aliases and history, then leave the shell";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    Cd,
    Pwd,
    GetPath,
    SetPath,
    History,
    Alias,
    Unalias,
    Exit,
    Help,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "cd" => Builtin::Cd,
            "pwd" => Builtin::Pwd,
            "getpath" => Builtin::GetPath,
            "setpath" => Builtin::SetPath,
            "history" => Builtin::History,
            "alias" => Builtin::Alias,
            "unalias" => Builtin::Unalias,
            "exit" => Builtin::Exit,
            "help" => Builtin::Help,
            _ => return None,
        })
    }

    fn usage(self) -> &'static str {
        match self {
            Builtin::Cd => "cd [dir]",
            Builtin::Pwd => "pwd",
            Builtin::GetPath => "getpath",
            Builtin::SetPath => "setpath <path>",
            Builtin::History => "history",
            Builtin::Alias => "alias [<name> <command>...]",
            Builtin::Unalias => "unalias <name>",
            Builtin::Exit => "exit",
            Builtin::Help => "help",
        }
    }

    /// Number of arguments (not counting the command name) each accepts.
    fn accepts(self, argc: usize) -> bool {
        match self {
            Builtin::Cd => argc <= 1,
            Builtin::SetPath | Builtin::Unalias => argc == 1,
            Builtin::Alias => argc != 1,
            Builtin::Pwd | Builtin::GetPath | Builtin::History | Builtin::Exit | Builtin::Help => {
                argc == 0
            }
        }
    }
}

pub fn run_builtin(
    builtin: Builtin,
    args: &[String],
    state: &mut ShellState,
    out: &mut dyn Write,
) -> Result<Flow, ShellError> {
    if !builtin.accepts(args.len()) {
        return Err(ShellError::Usage(builtin.usage()));
    }
    match builtin {
        Builtin::Cd => state.env.change_dir(args.first().map(String::as_str))?,
        Builtin::Pwd => {
            let dir = state.env.current_dir()?;
            writeln_ignore_broken_pipe(&mut *out, dir.display().to_string())?;
        }
        Builtin::GetPath => {
            let path = state.env.search_path().ok_or(ShellError::PathNotSet)?;
            writeln_ignore_broken_pipe(&mut *out, path)?;
        }
        Builtin::SetPath => state.env.set_search_path(&args[0]),
        Builtin::History => {
            let entries = state.history.display();
            if entries.is_empty() {
                return Err(ShellError::EmptyHistory);
            }
            for entry in entries {
                writeln_ignore_broken_pipe(&mut *out, format!("{:>5}  {}", entry.sequence, entry.text))?;
            }
        }
        Builtin::Alias if args.is_empty() => {
            if state.aliases.is_empty() {
                writeln_ignore_broken_pipe(&mut *out, "no aliases defined")?;
            }
            for entry in state.aliases.list() {
                writeln_ignore_broken_pipe(&mut *out, format!("alias {}='{}'", entry.key, entry.value))?;
            }
        }
        Builtin::Alias => {
            let key = &args[0];
            let value = args[1..].join(" ");
            if state.aliases.add(key, &value)? == AddOutcome::Overwritten {
                eprintln!("warning: overwriting alias '{}'", key);
            }
        }
        Builtin::Unalias => {
            state
                .aliases
                .remove(&args[0])
                .ok_or_else(|| ShellError::UnknownAlias(args[0].clone()))?;
        }
        Builtin::Exit => return Ok(Flow::Exit),
        Builtin::Help => writeln_ignore_broken_pipe(&mut *out, HELP_TEXT)?,
    }
    Ok(Flow::Continue)
}
