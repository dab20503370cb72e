use std::io::{self, Write};
use std::os::fd::RawFd;

use log::{debug, warn};
use nix::unistd::close;

use super::context::ShellContext;
use super::redirect::{Redirections, Targets};
use super::status::Outcome;
use crate::shell::parser::ast::SimpleCommand;

pub const CD_ERROR: &str = "Error at changing directory";

/// Commands that must run inside the shell process itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Cd,
    Exit,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        match name {
            "cd" => Some(Builtin::Cd),
            "exit" | "quit" => Some(Builtin::Exit),
            _ => None,
        }
    }

    pub fn run(self, ctx: &mut ShellContext, command: &SimpleCommand) -> Outcome {
        match self {
            Builtin::Cd => builtin_cd(ctx, command),
            Builtin::Exit => builtin_exit(ctx),
        }
    }
}

/// `cd [dir]`: no argument means `$HOME`; with `HOME` unset too, nothing
/// changes and the command succeeds.
///
/// Output and error redirections are honoured (files get created even
/// though `cd` prints nothing on success); input redirection is ignored.
fn builtin_cd(ctx: &mut ShellContext, command: &SimpleCommand) -> Outcome {
    let mut targets = Targets::resolve(ctx, command);
    targets.input = None;

    let mut redirections = match Redirections::open(&targets) {
        Ok(redirections) => redirections,
        Err(e) => {
            warn!("cd 重定向失败: {}", e);
            eprintln!("cmdtree: {}", e);
            return Outcome::FAILURE;
        }
    };

    let path = match ctx.resolve(command.params.first()) {
        Some(path) => path,
        None => match ctx.home_dir() {
            Some(home) => home,
            None => {
                debug!("HOME 未设置, 保持当前目录");
                return Outcome::SUCCESS;
            }
        },
    };

    match ctx.change_dir(&path) {
        Ok(()) => Outcome::SUCCESS,
        Err(e) => {
            debug!("{}", e);
            let written = match redirections.error_stream() {
                Some(file) => writeln!(file, "{}", CD_ERROR),
                None => writeln!(io::stderr(), "{}", CD_ERROR),
            };
            if let Err(e) = written {
                warn!("无法写入错误信息: {}", e);
            }
            Outcome::FAILURE
        }
    }
}

fn builtin_exit(ctx: &mut ShellContext) -> Outcome {
    debug!("执行 exit, 停止后续命令");
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();

    let fds = [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO];
    close_descriptors(fds.into_iter().chain(ctx.trace_fd()));
    Outcome::Stop
}

fn close_descriptors<I: IntoIterator<Item = RawFd>>(fds: I) {
    for fd in fds {
        if let Err(e) = close(fd) {
            debug!("关闭描述符 {} 失败: {}", fd, e);
        }
    }
}
