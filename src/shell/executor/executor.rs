use std::os::fd::{AsRawFd, IntoRawFd, OwnedFd, RawFd};

use log::{debug, trace};
use nix::unistd::{dup2, pipe, ForkResult};

use super::builtins::Builtin;
use super::context::ShellContext;
use super::external::run_external;
use super::process::{exit_with, fatal, fork_or_abort, spawn_branch, wait_child};
use super::redirect::REDIRECT_FAILED;
use super::status::Outcome;
use super::variable::{assign, is_assignment};
use crate::shell::parser::ast::{CommandNode, SimpleCommand};

/// Walks a command tree and runs it.
pub struct Executor {
    ctx: ShellContext,
}

impl Executor {
    pub fn new(ctx: ShellContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &ShellContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut ShellContext {
        &mut self.ctx
    }

    /// Evaluates `node` and returns its status.
    ///
    /// A missing node or a negative `level` yields [`Outcome::Stop`]
    /// without running anything. `parent` is the enclosing node, if any,
    /// and only shows up in logs.
    pub fn evaluate(
        &mut self,
        node: Option<&CommandNode>,
        level: i32,
        parent: Option<&CommandNode>,
    ) -> Outcome {
        let node = match node {
            Some(node) if level >= 0 => node,
            _ => return Outcome::Stop,
        };
        trace!(
            "求值 {} (层级 {}, 父节点 {})",
            node.kind(),
            level,
            parent.map(CommandNode::kind).unwrap_or("-")
        );

        let next = level.saturating_add(1);
        match node {
            CommandNode::Simple(command) => self.execute_simple(command, next),
            CommandNode::Sequential { left, right } => {
                let first = self.evaluate(Some(left), next, Some(node));
                if first.is_stop() {
                    return first;
                }
                first.or(self.evaluate(Some(right), next, Some(node)))
            }
            CommandNode::ConditionalIfNonzero { left, right } => {
                let first = self.evaluate(Some(left), next, Some(node));
                match first {
                    Outcome::Status(code) if code != 0 => {
                        self.evaluate(Some(right), next, Some(node))
                    }
                    _ => first,
                }
            }
            CommandNode::ConditionalIfZero { left, right } => {
                let first = self.evaluate(Some(left), next, Some(node));
                if first.is_success() {
                    self.evaluate(Some(right), next, Some(node))
                } else {
                    first
                }
            }
            CommandNode::Parallel { left, right } => self.run_in_parallel(left, right, next, node),
            CommandNode::Pipe { left, right } => self.run_on_pipe(left, right, next, node),
        }
    }

    fn execute_simple(&mut self, command: &SimpleCommand, level: i32) -> Outcome {
        let name = self.ctx.resolve(Some(&command.verb)).unwrap_or_default();
        debug!("简单命令 {:?} (层级 {})", name, level);

        if let Some(builtin) = Builtin::lookup(&name) {
            debug!("执行内建命令: {}", name);
            return builtin.run(&mut self.ctx, command);
        }

        if is_assignment(&name) {
            return assign(&mut self.ctx, command, &name);
        }

        run_external(&self.ctx, command, &name)
    }

    fn run_in_parallel(
        &mut self,
        left: &CommandNode,
        right: &CommandNode,
        level: i32,
        node: &CommandNode,
    ) -> Outcome {
        let first = spawn_branch(|| self.evaluate(Some(left), level, Some(node)));
        let second = spawn_branch(|| self.evaluate(Some(right), level, Some(node)));

        let first = wait_child(first);
        let second = wait_child(second);
        debug!("并行命令结束: {:?} {:?}", first, second);
        match (first, second) {
            (Some(first), Some(second)) => Outcome::Status(first | second),
            _ => Outcome::FAILURE,
        }
    }

    // 只返回右侧状态
    fn run_on_pipe(
        &mut self,
        left: &CommandNode,
        right: &CommandNode,
        level: i32,
        node: &CommandNode,
    ) -> Outcome {
        let (reader, writer) = match pipe() {
            Ok(ends) => ends,
            Err(e) => fatal("Error at creating the pipe", e),
        };

        let producer = match fork_or_abort() {
            ForkResult::Parent { child } => child,
            ForkResult::Child => {
                drop(reader);
                bind_end(writer, libc::STDOUT_FILENO);
                exit_with(self.evaluate(Some(left), level, Some(node)))
            }
        };

        let consumer = match fork_or_abort() {
            ForkResult::Parent { child } => child,
            ForkResult::Child => {
                drop(writer);
                bind_end(reader, libc::STDIN_FILENO);
                exit_with(self.evaluate(Some(right), level, Some(node)))
            }
        };

        // 父进程不读也不写管道
        drop(reader);
        drop(writer);

        let _ = wait_child(producer);
        let outcome = Outcome::from_wait(wait_child(consumer));
        debug!("管道命令结束: {}", outcome);
        outcome
    }
}

// dup2 之后原描述符随 OwnedFd 一起关闭
fn bind_end(end: OwnedFd, target: RawFd) {
    if end.as_raw_fd() == target {
        // 已经在目标位置上，不能关闭
        let _ = end.into_raw_fd();
        return;
    }
    if let Err(e) = dup2(end.as_raw_fd(), target) {
        drop(end);
        eprintln!("cmdtree: cannot rebind pipe: {}", e);
        std::process::exit(REDIRECT_FAILED);
    }
}
