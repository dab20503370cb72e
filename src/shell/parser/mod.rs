pub mod ast;
mod lexer;
#[allow(clippy::module_inception)]
mod parser;

pub use parser::Parser;

use crate::shell::error::ParseError;
use ast::CommandNode;

/// Parses one input line into a command tree; `None` for a blank line.
pub fn parse_line(line: &str) -> Result<Option<CommandNode>, ParseError> {
    Parser::new(line)?.parse_line()
}
