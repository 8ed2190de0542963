// error.rs

use nix::errno::Errno;
use thiserror::Error;

use crate::alias::AliasError;
use crate::history::HistoryError;

/// Everything that can go wrong while handling one input line. None of these
/// end the shell; the REPL prints them and prompts again.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Alias(#[from] AliasError),

    #[error("{0}: recursive alias")]
    RecursiveAlias(String),

    #[error("unalias: {0}: no such alias")]
    UnknownAlias(String),

    #[error("cd: {path}: {source}")]
    ChangeDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("pwd: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("cd: HOME not set")]
    HomeNotSet,

    #[error("getpath: PATH not set")]
    PathNotSet,

    #[error("history: no commands recorded")]
    EmptyHistory,

    #[error("{0}: command not found")]
    CommandNotFound(String),

    #[error("{program}: {}", .errno.desc())]
    Spawn { program: String, errno: Errno },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ShellError {
    pub(crate) fn spawn(program: &str, errno: Errno) -> Self {
        match errno {
            Errno::ENOENT => ShellError::CommandNotFound(program.to_string()),
            errno => ShellError::Spawn {
                program: program.to_string(),
                errno,
            },
        }
    }
}
