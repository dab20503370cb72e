use std::ffi::CString;
use std::process;

use log::{debug, error};
use nix::unistd::{execvp, ForkResult};

use super::context::ShellContext;
use super::process::{fork_or_abort, wait_child};
use super::redirect::{redirect_or_exit, Targets};
use super::status::Outcome;
use crate::shell::error::ExecError;
use crate::shell::parser::ast::SimpleCommand;

/// Runs a program in a child process and waits for it.
///
/// The child applies the command's redirections and replaces itself with
/// the program found on `PATH`, inheriting the current environment. If the
/// program cannot be executed the child prints a diagnostic and aborts,
/// which the parent sees as status 1.
pub fn run_external(ctx: &ShellContext, command: &SimpleCommand, name: &str) -> Outcome {
    let argv = ctx.resolve_arguments(command);
    debug!("执行外部命令: {}", shell_words::join(&argv));

    let (program, c_argv) = match to_c_strings(name, &argv) {
        Ok(strings) => strings,
        Err(e) => {
            error!("无法执行 {}: {}", name, e);
            eprintln!("Execution failed for '{}'", name);
            return Outcome::FAILURE;
        }
    };
    let targets = Targets::resolve(ctx, command);

    match fork_or_abort() {
        ForkResult::Parent { child } => {
            let outcome = Outcome::from_wait(wait_child(child));
            debug!("外部命令 {} 结束: {}", name, outcome);
            outcome
        }
        ForkResult::Child => exec_child(&program, &c_argv, &targets, name),
    }
}

fn exec_child(program: &CString, argv: &[CString], targets: &Targets, name: &str) -> ! {
    // 打开并重定向后，原始描述符已经关闭
    redirect_or_exit(targets);

    let err = match execvp(program, argv) {
        Ok(never) => match never {},
        Err(e) => e,
    };
    error!("execvp {} 失败: {}", name, err);
    eprintln!("Execution failed for '{}'", name);
    process::abort()
}

fn to_c_strings(name: &str, argv: &[String]) -> Result<(CString, Vec<CString>), ExecError> {
    let program = CString::new(name)?;
    let argv = argv
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((program, argv))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_c_strings() {
        let argv = vec!["ls".to_string(), "-l".to_string()];
        let (program, c_argv) = to_c_strings("ls", &argv).unwrap_or_else(|e| panic!("{}", e));
        assert_eq!(program.as_bytes(), b"ls");
        assert_eq!(c_argv.len(), 2);
        assert_eq!(c_argv[1].as_bytes(), b"-l");
    }

    #[test]
    fn test_to_c_strings_rejects_nul() {
        let argv = vec!["echo".to_string(), "a\0b".to_string()];
        assert!(matches!(to_c_strings("echo", &argv), Err(ExecError::Nul(_))));
    }
}
