use std::fmt;

use super::ast::{Word, WordPart};
use crate::shell::error::ParseError;

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Word(Word),
    Pipe,
    And,
    Or,
    Background,
    Semi,
    Redirect(RedirectOp),
    EOF,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum RedirectOp {
    Input,       // <
    Output,      // >
    Append,      // >>
    Error,       // 2>
    ErrorAppend, // 2>>
    OutputError, // &>
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Word(_) => "word",
            Token::Pipe => "|",
            Token::And => "&&",
            Token::Or => "||",
            Token::Background => "&",
            Token::Semi => ";",
            Token::Redirect(RedirectOp::Input) => "<",
            Token::Redirect(RedirectOp::Output) => ">",
            Token::Redirect(RedirectOp::Append) => ">>",
            Token::Redirect(RedirectOp::Error) => "2>",
            Token::Redirect(RedirectOp::ErrorAppend) => "2>>",
            Token::Redirect(RedirectOp::OutputError) => "&>",
            Token::EOF => "end of line",
        };
        f.write_str(text)
    }
}

pub struct Lexer {
    input: Vec<char>,
    pos: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace();

        let token = match self.peek_char() {
            None => Token::EOF,
            Some(c) => match c {
                '|' => {
                    self.read_char();
                    if self.eat('|') {
                        Token::Or
                    } else {
                        Token::Pipe
                    }
                }
                ';' => {
                    self.read_char();
                    Token::Semi
                }
                '&' => {
                    self.read_char();
                    if self.eat('&') {
                        Token::And
                    } else if self.eat('>') {
                        Token::Redirect(RedirectOp::OutputError)
                    } else {
                        Token::Background
                    }
                }
                '<' => {
                    self.read_char();
                    Token::Redirect(RedirectOp::Input)
                }
                '>' => {
                    self.read_char();
                    if self.eat('>') {
                        Token::Redirect(RedirectOp::Append)
                    } else {
                        Token::Redirect(RedirectOp::Output)
                    }
                }
                '2' if self.peek_at(1) == Some('>') => {
                    self.pos += 2;
                    if self.eat('>') {
                        Token::Redirect(RedirectOp::ErrorAppend)
                    } else {
                        Token::Redirect(RedirectOp::Error)
                    }
                }
                _ => Token::Word(self.read_word()?),
            },
        };
        Ok(token)
    }

    fn read_char(&mut self) -> Option<char> {
        let c = self.input.get(self.pos).copied();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn peek_char(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if !c.is_whitespace() {
                break;
            }
            self.read_char();
        }
    }

    fn read_word(&mut self) -> Result<Word, ParseError> {
        let mut parts = PartBuffer::default();

        while let Some(c) = self.peek_char() {
            if c.is_whitespace() || ";<>|&".contains(c) {
                break;
            }
            self.read_char();
            match c {
                '\'' => {
                    let text = self.read_single_quoted()?;
                    parts.push_quoted(&text);
                }
                '"' => self.read_double_quoted(&mut parts)?,
                '\\' => {
                    if let Some(escaped) = self.read_char() {
                        parts.push_quoted(&escaped.to_string());
                    }
                }
                '$' => self.read_variable(&mut parts, false)?,
                c => parts.push_literal(c),
            }
        }

        Ok(parts.finish())
    }

    fn read_single_quoted(&mut self) -> Result<String, ParseError> {
        let mut text = String::new();
        loop {
            match self.read_char() {
                Some('\'') => return Ok(text),
                Some(c) => text.push(c),
                None => return Err(ParseError::UnterminatedQuote('\'')),
            }
        }
    }

    fn read_double_quoted(&mut self, parts: &mut PartBuffer) -> Result<(), ParseError> {
        // "" still yields a (possibly empty) word
        parts.push_quoted("");
        loop {
            match self.read_char() {
                Some('"') => return Ok(()),
                Some('\\') => match self.read_char() {
                    Some(c @ ('"' | '\\' | '$')) => parts.push_quoted(&c.to_string()),
                    Some(c) => parts.push_quoted(&format!("\\{}", c)),
                    None => return Err(ParseError::UnterminatedQuote('"')),
                },
                Some('$') => self.read_variable(parts, true)?,
                Some(c) => parts.push_quoted(&c.to_string()),
                None => return Err(ParseError::UnterminatedQuote('"')),
            }
        }
    }

    // Called with the `$` already consumed.
    fn read_variable(&mut self, parts: &mut PartBuffer, quoted: bool) -> Result<(), ParseError> {
        if self.eat('{') {
            let mut name = String::new();
            loop {
                match self.read_char() {
                    Some('}') => break,
                    Some(c) => name.push(c),
                    None => return Err(ParseError::UnterminatedBrace),
                }
            }
            parts.push_variable(name);
            return Ok(());
        }

        let mut name = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '_' {
                name.push(c);
                self.read_char();
            } else {
                break;
            }
        }

        if name.is_empty() {
            if quoted {
                parts.push_quoted("$");
            } else {
                parts.push_literal('$');
            }
        } else {
            parts.push_variable(name);
        }
        Ok(())
    }
}

/// Accumulates word parts, merging runs of the same kind of text.
#[derive(Default)]
struct PartBuffer {
    parts: Vec<WordPart>,
}

impl PartBuffer {
    fn push_literal(&mut self, c: char) {
        match self.parts.last_mut() {
            Some(WordPart::Literal(text)) => text.push(c),
            _ => self.parts.push(WordPart::Literal(c.to_string())),
        }
    }

    fn push_quoted(&mut self, s: &str) {
        match self.parts.last_mut() {
            Some(WordPart::Quoted(text)) => text.push_str(s),
            _ => self.parts.push(WordPart::Quoted(s.to_string())),
        }
    }

    fn push_variable(&mut self, name: String) {
        self.parts.push(WordPart::Variable(name));
    }

    fn finish(self) -> Word {
        Word::new(self.parts)
    }
}
