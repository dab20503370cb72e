use std::ffi::NulError;
use std::io;

use thiserror::Error;

/// Failures inside the evaluator. None of them unwind past a tree node:
/// each is reported on the error stream and folded into an exit status.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("cannot open '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot rebind {stream}: {source}")]
    Rebind {
        stream: &'static str,
        #[source]
        source: nix::Error,
    },
    #[error("cannot change directory to '{path}': {source}")]
    ChangeDir {
        path: String,
        #[source]
        source: nix::Error,
    },
    #[error("invalid variable name '{0}'")]
    InvalidName(String),
    #[error("argument contains a NUL byte: {0}")]
    Nul(#[from] NulError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unterminated {0} quote")]
    UnterminatedQuote(char),
    #[error("unterminated ${{...}} reference")]
    UnterminatedBrace,
    #[error("expected a command before '{0}'")]
    MissingCommand(String),
    #[error("expected a file name after '{0}'")]
    MissingTarget(String),
    #[error("unexpected '{0}'")]
    Unexpected(String),
}
