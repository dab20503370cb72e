//! Command-tree executor for a small shell.
//!
//! A parsed line is a tree of simple commands joined by `;`, `&`, `&&`,
//! `||` and `|`. [`shell::executor::Executor`] runs such a tree: builtins
//! and variable assignments in-process, everything else in child
//! processes, and folds the results into one exit status.
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod shell;
pub mod utils;
