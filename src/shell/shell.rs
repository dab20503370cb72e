use log::{debug, error, info};
use std::error::Error;
use std::io::BufRead;

use crate::shell::executor::{Executor, Outcome, ShellContext};
use crate::shell::parser;
use crate::utils::config::Config;

/// Status reported for a line that does not parse.
pub const SYNTAX_ERROR: i32 = 2;

/// Reads command lines and hands each parsed tree to the executor.
pub struct Shell {
    executor: Executor,
    last: Outcome,
}

impl Shell {
    pub fn new(config: &Config) -> Self {
        Self {
            executor: Executor::new(ShellContext::from_config(config)),
            last: Outcome::SUCCESS,
        }
    }

    /// Runs every line of `input` until EOF or until `exit` stops the shell.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<i32, Box<dyn Error>> {
        debug!("初始化 cmdtree...");
        for line in input.lines() {
            let line = line?;
            if self.handle_input(&line).is_stop() {
                debug!("收到 exit, 停止读取输入");
                break;
            }
        }
        debug!("退出 cmdtree...");
        Ok(self.exit_code())
    }

    /// Parses and evaluates one line.
    pub fn handle_input(&mut self, line: &str) -> Outcome {
        if line.trim().is_empty() {
            return self.last;
        }

        info!("执行命令: {}", line);
        let outcome = match parser::parse_line(line) {
            Ok(node) => match node {
                Some(node) => self.executor.evaluate(Some(&node), 0, None),
                None => self.last,
            },
            Err(e) => {
                error!("解析失败: {}", e);
                eprintln!("cmdtree: syntax error: {}", e);
                Outcome::Status(SYNTAX_ERROR)
            }
        };
        debug!("命令结束: {}", outcome);
        self.last = outcome;
        outcome
    }

    /// Process exit code for the last evaluated line; `exit` counts as success.
    pub fn exit_code(&self) -> i32 {
        self.last.exit_code() & 0xff
    }
}
