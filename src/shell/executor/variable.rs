use log::warn;

use super::context::ShellContext;
use super::status::Outcome;
use crate::shell::parser::ast::SimpleCommand;

/// `NAME=value` as a command of its own.
///
/// The value is resolved again after splitting so it may itself refer to
/// other variables (`PATH=$HOME/bin`). `resolved` is the already-resolved
/// command name, used when the `=` did not come from literal text.
pub fn assign(ctx: &mut ShellContext, command: &SimpleCommand, resolved: &str) -> Outcome {
    let (name, value) = match command.verb.split_assignment() {
        Some((name, value)) => {
            let value = ctx.resolve(Some(&value)).unwrap_or_default();
            (name, value)
        }
        None => match resolved.split_once('=') {
            Some((name, value)) => (name.to_string(), value.to_string()),
            None => (resolved.to_string(), String::new()),
        },
    };

    match ctx.set_var(&name, &value) {
        Ok(()) => Outcome::SUCCESS,
        Err(e) => {
            warn!("赋值失败: {}", e);
            eprintln!("cmdtree: {}", e);
            Outcome::FAILURE
        }
    }
}

/// Whether a resolved command name is an assignment rather than a program.
pub fn is_assignment(name: &str) -> bool {
    name.contains('=')
}
