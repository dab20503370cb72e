use std::fs::{File, OpenOptions};
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::process;

use log::{debug, error};
use nix::unistd::dup2;

use super::context::ShellContext;
use crate::shell::error::ExecError;
use crate::shell::parser::ast::{IoMode, SimpleCommand};

/// Exit status of a child whose redirections could not be set up.
pub const REDIRECT_FAILED: i32 = 255;

const CREATE_MODE: u32 = 0o644;

/// Resolved redirection targets of one simple command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Targets {
    pub input: Option<String>,
    pub output: Option<String>,
    pub error: Option<String>,
    pub out_mode: IoMode,
    pub err_mode: IoMode,
}

impl Targets {
    pub fn resolve(ctx: &ShellContext, command: &SimpleCommand) -> Self {
        Self {
            input: ctx.resolve(command.input.as_ref()),
            output: ctx.resolve(command.output.as_ref()),
            error: ctx.resolve(command.error.as_ref()),
            out_mode: command.out_mode,
            err_mode: command.err_mode,
        }
    }

    /// Output and error aimed at the very same path.
    pub fn is_shared(&self) -> bool {
        matches!((&self.output, &self.error), (Some(out), Some(err)) if out == err)
    }
}

/// Files opened for a command's redirections. Dropping it closes them.
#[derive(Debug, Default)]
pub struct Redirections {
    input: Option<File>,
    output: Option<File>,
    error: Option<File>,
    shared: Option<File>,
}

impl Redirections {
    pub fn open(targets: &Targets) -> Result<Self, ExecError> {
        let mut redirections = Redirections::default();

        if let Some(path) = &targets.input {
            redirections.input = Some(open_input(path)?);
        }

        if targets.is_shared() {
            // 同一个文件只打开一次，stdout 和 stderr 共用
            if let Some(path) = &targets.output {
                redirections.shared = Some(open_output(path, targets.out_mode)?);
            }
        } else {
            if let Some(path) = &targets.output {
                redirections.output = Some(open_output(path, targets.out_mode)?);
            }
            if let Some(path) = &targets.error {
                redirections.error = Some(open_output(path, targets.err_mode)?);
            }
        }

        Ok(redirections)
    }

    /// Rebinds the standard streams of the calling process onto the open files.
    pub fn apply(&self) -> Result<(), ExecError> {
        if let Some(file) = &self.input {
            rebind(file, libc::STDIN_FILENO, "standard input")?;
        }
        if let Some(file) = &self.shared {
            rebind(file, libc::STDOUT_FILENO, "standard output")?;
            rebind(file, libc::STDERR_FILENO, "standard error")?;
        }
        if let Some(file) = &self.output {
            rebind(file, libc::STDOUT_FILENO, "standard output")?;
        }
        if let Some(file) = &self.error {
            rebind(file, libc::STDERR_FILENO, "standard error")?;
        }
        Ok(())
    }

    pub fn error_stream(&mut self) -> Option<&mut File> {
        self.shared.as_mut().or(self.error.as_mut())
    }
}

/// Opens and rebinds, or exits with [`REDIRECT_FAILED`].
pub fn redirect_or_exit(targets: &Targets) {
    let result = Redirections::open(targets).and_then(|redirections| redirections.apply());
    if let Err(e) = result {
        error!("重定向失败: {}", e);
        eprintln!("cmdtree: {}", e);
        process::exit(REDIRECT_FAILED);
    }
}

fn open_input(path: &str) -> Result<File, ExecError> {
    File::open(path).map_err(|source| ExecError::Open {
        path: path.to_string(),
        source,
    })
}

fn open_output(path: &str, mode: IoMode) -> Result<File, ExecError> {
    debug!("打开重定向文件: {} ({:?})", path, mode);
    let mut options = OpenOptions::new();
    options.create(true).mode(CREATE_MODE);
    match mode {
        IoMode::Truncate => options.write(true).truncate(true),
        IoMode::Append => options.append(true),
    };
    options.open(path).map_err(|source| ExecError::Open {
        path: path.to_string(),
        source,
    })
}

fn rebind(file: &File, target: RawFd, stream: &'static str) -> Result<(), ExecError> {
    dup2(file.as_raw_fd(), target)
        .map(|_| ())
        .map_err(|source| ExecError::Rebind { stream, source })
}
