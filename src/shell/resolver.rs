use std::env;

use crate::shell::parser::ast::{SimpleCommand, Word, WordPart};

/// Turns parsed words into the final strings handed to the evaluator.
pub trait WordResolver {
    /// `None` only when there is no word at all.
    fn resolve_word(&self, word: Option<&Word>) -> Option<String>;

    /// The full argument vector, resolved verb first.
    fn resolve_arguments(&self, command: &SimpleCommand) -> Vec<String> {
        let mut argv = Vec::with_capacity(command.params.len() + 1);
        argv.push(self.resolve_word(Some(&command.verb)).unwrap_or_default());
        argv.extend(
            command
                .params
                .iter()
                .map(|param| self.resolve_word(Some(param)).unwrap_or_default()),
        );
        argv
    }
}

/// Resolves variable references against the live process environment.
///
/// Unset variables expand to the empty string. A word that starts with an
/// unquoted `~` gets home-directory expansion.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvResolver;

impl EnvResolver {
    pub fn new() -> Self {
        Self
    }
}

impl WordResolver for EnvResolver {
    fn resolve_word(&self, word: Option<&Word>) -> Option<String> {
        let word = word?;
        let mut result = String::new();

        for (index, part) in word.parts.iter().enumerate() {
            match part {
                WordPart::Literal(text) if index == 0 && text.starts_with('~') => {
                    result.push_str(&shellexpand::tilde(text));
                }
                WordPart::Literal(text) | WordPart::Quoted(text) => result.push_str(text),
                WordPart::Variable(name) => {
                    if let Some(value) = env::var_os(name) {
                        result.push_str(&value.to_string_lossy());
                    }
                }
            }
        }
        Some(result)
    }
}
