use std::io::{self, Write};
use std::process;

use log::{debug, error};
use nix::errno::Errno;
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{fork, ForkResult, Pid};

use super::status::Outcome;

/// Logs, reports and aborts the whole shell.
pub fn fatal(what: &str, err: nix::Error) -> ! {
    error!("{}: {}", what, err);
    eprintln!("cmdtree: {}: {}", what, err);
    process::abort()
}

/// Forks, aborting the shell on failure. The child gets the default
/// `SIGPIPE` action back.
pub fn fork_or_abort() -> ForkResult {
    // 先刷新缓冲区，避免子进程重复输出
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();

    // SAFETY: the evaluator runs single-threaded; the child either execs
    // or evaluates its subtree and leaves through `process::exit`.
    match unsafe { fork() } {
        Ok(ForkResult::Child) => {
            restore_default_signals();
            ForkResult::Child
        }
        Ok(result) => result,
        Err(e) => fatal("Fork error", e),
    }
}

// Rust 运行时忽略 SIGPIPE，exec 会继承；管道读端关闭时写端应当被信号终止
fn restore_default_signals() {
    // SAFETY: SigDfl installs no handler code.
    if let Err(e) = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) } {
        debug!("恢复 SIGPIPE 失败: {}", e);
    }
}

/// `Some(code)` for a normal exit, `None` otherwise.
pub fn wait_child(pid: Pid) -> Option<i32> {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => {
                debug!("子进程 {} 退出: {}", pid, code);
                return Some(code);
            }
            Ok(WaitStatus::Signaled(_, signal, _core_dumped)) => {
                debug!("子进程 {} 被信号终止: {:?}", pid, signal);
                return None;
            }
            Ok(other) => {
                debug!("子进程 {} 状态: {:?}", pid, other);
                return None;
            }
            Err(Errno::EINTR) => continue,
            Err(e) => {
                error!("waitpid {} 失败: {}", pid, e);
                return None;
            }
        }
    }
}

pub fn spawn_branch<F>(branch: F) -> Pid
where
    F: FnOnce() -> Outcome,
{
    match fork_or_abort() {
        ForkResult::Parent { child } => child,
        ForkResult::Child => {
            let outcome = branch();
            exit_with(outcome)
        }
    }
}

pub fn exit_with(outcome: Outcome) -> ! {
    let _ = io::stdout().flush();
    process::exit(outcome.exit_code())
}
