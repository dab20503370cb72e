/// One piece of a word as produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordPart {
    /// Unquoted text. A leading `~` is subject to home expansion.
    Literal(String),
    /// Text that came from inside quotes and is taken verbatim.
    Quoted(String),
    /// `$NAME` or `${NAME}`.
    Variable(String),
}

/// A command-line word: literal text and variable references glued together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Word {
    pub parts: Vec<WordPart>,
}

impl Word {
    pub fn new(parts: Vec<WordPart>) -> Self {
        Self { parts }
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Self::new(vec![WordPart::Literal(text.into())])
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(vec![WordPart::Variable(name.into())])
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Splits `NAME=value` at the first `=` found in unquoted literal text.
    ///
    /// The name is returned as plain text; the value keeps its remaining
    /// parts so variable references in it can still be resolved.
    pub fn split_assignment(&self) -> Option<(String, Word)> {
        let mut name = String::new();
        for (index, part) in self.parts.iter().enumerate() {
            match part {
                WordPart::Literal(text) => {
                    if let Some((head, tail)) = text.split_once('=') {
                        name.push_str(head);
                        let mut rest = Vec::with_capacity(self.parts.len() - index);
                        if !tail.is_empty() {
                            rest.push(WordPart::Literal(tail.to_string()));
                        }
                        rest.extend(self.parts[index + 1..].iter().cloned());
                        return Some((name, Word::new(rest)));
                    }
                    name.push_str(text);
                }
                WordPart::Quoted(text) => name.push_str(text),
                WordPart::Variable(_) => return None,
            }
        }
        None
    }
}

/// How an output or error redirection target is opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IoMode {
    /// Create or overwrite (`>`, `2>`, `&>`).
    #[default]
    Truncate,
    /// Create if missing, write at the end (`>>`, `2>>`).
    Append,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleCommand {
    pub verb: Word,
    pub params: Vec<Word>,
    pub input: Option<Word>,
    pub output: Option<Word>,
    pub error: Option<Word>,
    pub out_mode: IoMode,
    pub err_mode: IoMode,
}

impl SimpleCommand {
    pub fn new(verb: Word) -> Self {
        Self {
            verb,
            ..Default::default()
        }
    }

    pub fn arg(mut self, word: Word) -> Self {
        self.params.push(word);
        self
    }

    pub fn stdin(mut self, word: Word) -> Self {
        self.input = Some(word);
        self
    }

    pub fn stdout(mut self, word: Word, mode: IoMode) -> Self {
        self.output = Some(word);
        self.out_mode = mode;
        self
    }

    pub fn stderr(mut self, word: Word, mode: IoMode) -> Self {
        self.error = Some(word);
        self.err_mode = mode;
        self
    }
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandNode {
    Simple(SimpleCommand),
    /// `left ; right`
    Sequential {
        left: Box<CommandNode>,
        right: Box<CommandNode>,
    },
    /// `left & right`
    Parallel {
        left: Box<CommandNode>,
        right: Box<CommandNode>,
    },
    /// `left || right`
    ConditionalIfNonzero {
        left: Box<CommandNode>,
        right: Box<CommandNode>,
    },
    /// `left && right`
    ConditionalIfZero {
        left: Box<CommandNode>,
        right: Box<CommandNode>,
    },
    /// `left | right`
    Pipe {
        left: Box<CommandNode>,
        right: Box<CommandNode>,
    },
}

impl CommandNode {
    pub fn sequential(left: CommandNode, right: CommandNode) -> Self {
        Self::Sequential {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn parallel(left: CommandNode, right: CommandNode) -> Self {
        Self::Parallel {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn if_nonzero(left: CommandNode, right: CommandNode) -> Self {
        Self::ConditionalIfNonzero {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn if_zero(left: CommandNode, right: CommandNode) -> Self {
        Self::ConditionalIfZero {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn pipe(left: CommandNode, right: CommandNode) -> Self {
        Self::Pipe {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Simple(_) => "simple",
            Self::Sequential { .. } => "sequential",
            Self::Parallel { .. } => "parallel",
            Self::ConditionalIfNonzero { .. } => "or",
            Self::ConditionalIfZero { .. } => "and",
            Self::Pipe { .. } => "pipe",
        }
    }
}

impl From<SimpleCommand> for CommandNode {
    fn from(command: SimpleCommand) -> Self {
        Self::Simple(command)
    }
}
