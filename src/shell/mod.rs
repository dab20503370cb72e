pub mod error;
pub mod executor;
pub mod parser;
pub mod resolver;
#[allow(clippy::module_inception)]
mod shell;

pub use shell::Shell;
