use std::env;
use std::os::fd::RawFd;

use log::debug;

use crate::shell::error::ExecError;
use crate::shell::parser::ast::{SimpleCommand, Word};
use crate::shell::resolver::{EnvResolver, WordResolver};
use crate::utils::config::Config;

/// Everything the evaluator may touch outside the command tree itself.
///
/// The working directory and environment are process-wide and must stay
/// so, since launched programs inherit them; all changes to them go
/// through here.
pub struct ShellContext {
    resolver: Box<dyn WordResolver>,
    trace_fd: Option<RawFd>,
}

impl ShellContext {
    pub fn new(resolver: Box<dyn WordResolver>) -> Self {
        Self {
            resolver,
            trace_fd: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Box::new(EnvResolver::new())).with_trace_fd(config.trace_fd)
    }

    pub fn with_trace_fd(mut self, fd: Option<RawFd>) -> Self {
        self.trace_fd = fd;
        self
    }

    pub fn trace_fd(&self) -> Option<RawFd> {
        self.trace_fd
    }

    pub fn resolve(&self, word: Option<&Word>) -> Option<String> {
        self.resolver.resolve_word(word)
    }

    pub fn resolve_arguments(&self, command: &SimpleCommand) -> Vec<String> {
        self.resolver.resolve_arguments(command)
    }

    pub fn home_dir(&self) -> Option<String> {
        env::var_os("HOME").map(|home| home.to_string_lossy().into_owned())
    }

    pub fn change_dir(&mut self, path: &str) -> Result<(), ExecError> {
        debug!("切换目录: {}", path);
        nix::unistd::chdir(path).map_err(|source| ExecError::ChangeDir {
            path: path.to_string(),
            source,
        })
    }

    /// Sets (or overwrites) an environment variable.
    pub fn set_var(&mut self, name: &str, value: &str) -> Result<(), ExecError> {
        if name.is_empty() || name.contains(['=', '\0']) || value.contains('\0') {
            return Err(ExecError::InvalidName(name.to_string()));
        }
        debug!("设置环境变量: {}={}", name, value);
        env::set_var(name, value);
        Ok(())
    }
}

impl Default for ShellContext {
    fn default() -> Self {
        Self::new(Box::new(EnvResolver::new()))
    }
}
