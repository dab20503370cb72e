use super::ast::{CommandNode, IoMode, SimpleCommand};
use super::lexer::{Lexer, RedirectOp, Token};
use crate::shell::error::ParseError;

/// Recursive-descent parser for one command line.
///
/// Binding, loosest first: `;`, `&`, `&&`/`||`, `|`. Every operator is
/// left-associative.
pub struct Parser {
    lexer: Lexer,
    current_token: Token,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
        })
    }

    fn next_token(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    /// Parses the whole line. A blank line yields `None`.
    pub fn parse_line(&mut self) -> Result<Option<CommandNode>, ParseError> {
        if self.current_token == Token::EOF {
            return Ok(None);
        }
        let node = self.parse_sequence()?;
        match &self.current_token {
            Token::EOF => Ok(Some(node)),
            token => Err(ParseError::Unexpected(token.to_string())),
        }
    }

    fn parse_sequence(&mut self) -> Result<CommandNode, ParseError> {
        let mut node = self.parse_parallel()?;
        while self.current_token == Token::Semi {
            self.next_token()?;
            if self.current_token == Token::EOF {
                break;
            }
            let right = self.parse_parallel()?;
            node = CommandNode::sequential(node, right);
        }
        Ok(node)
    }

    fn parse_parallel(&mut self) -> Result<CommandNode, ParseError> {
        let mut node = self.parse_conditional()?;
        while self.current_token == Token::Background {
            self.next_token()?;
            let right = self.parse_conditional()?;
            node = CommandNode::parallel(node, right);
        }
        Ok(node)
    }

    fn parse_conditional(&mut self) -> Result<CommandNode, ParseError> {
        let mut node = self.parse_pipeline()?;
        loop {
            match self.current_token {
                Token::And => {
                    self.next_token()?;
                    let right = self.parse_pipeline()?;
                    node = CommandNode::if_zero(node, right);
                }
                Token::Or => {
                    self.next_token()?;
                    let right = self.parse_pipeline()?;
                    node = CommandNode::if_nonzero(node, right);
                }
                _ => return Ok(node),
            }
        }
    }

    fn parse_pipeline(&mut self) -> Result<CommandNode, ParseError> {
        let mut node = CommandNode::Simple(self.parse_simple_command()?);
        while self.current_token == Token::Pipe {
            self.next_token()?;
            let right = CommandNode::Simple(self.parse_simple_command()?);
            node = CommandNode::pipe(node, right);
        }
        Ok(node)
    }

    fn parse_simple_command(&mut self) -> Result<SimpleCommand, ParseError> {
        let mut command = SimpleCommand::default();
        let mut has_verb = false;

        loop {
            match &self.current_token {
                Token::Word(word) => {
                    if has_verb {
                        command.params.push(word.clone());
                    } else {
                        command.verb = word.clone();
                        has_verb = true;
                    }
                    self.next_token()?;
                }
                Token::Redirect(op) => {
                    let op = *op;
                    self.parse_redirection(&mut command, op)?;
                }
                token => {
                    if !has_verb {
                        return Err(ParseError::MissingCommand(token.to_string()));
                    }
                    return Ok(command);
                }
            }
        }
    }

    fn parse_redirection(
        &mut self,
        command: &mut SimpleCommand,
        op: RedirectOp,
    ) -> Result<(), ParseError> {
        let operator = Token::Redirect(op).to_string();
        self.next_token()?; // 跳过重定向操作符

        let target = match &self.current_token {
            Token::Word(word) => word.clone(),
            _ => return Err(ParseError::MissingTarget(operator)),
        };
        self.next_token()?;

        match op {
            RedirectOp::Input => command.input = Some(target),
            RedirectOp::Output => {
                command.output = Some(target);
                command.out_mode = IoMode::Truncate;
            }
            RedirectOp::Append => {
                command.output = Some(target);
                command.out_mode = IoMode::Append;
            }
            RedirectOp::Error => {
                command.error = Some(target);
                command.err_mode = IoMode::Truncate;
            }
            RedirectOp::ErrorAppend => {
                command.error = Some(target);
                command.err_mode = IoMode::Append;
            }
            RedirectOp::OutputError => {
                command.output = Some(target.clone());
                command.error = Some(target);
                command.out_mode = IoMode::Truncate;
                command.err_mode = IoMode::Truncate;
            }
        }
        Ok(())
    }
}
