mod builtins;
mod context;
#[allow(clippy::module_inception)]
mod executor;
mod external;
mod process;
mod redirect;
mod status;
mod variable;

pub use builtins::{Builtin, CD_ERROR};
pub use context::ShellContext;
pub use executor::Executor;
pub use redirect::{Redirections, Targets, REDIRECT_FAILED};
pub use status::{Outcome, SHELL_EXIT};
