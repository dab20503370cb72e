use std::fmt;

/// Integer form of [`Outcome::Stop`] for drivers that only deal in numbers.
pub const SHELL_EXIT: i32 = -100;

/// Result of evaluating one node of a command tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// An ordinary exit status; 0 is success.
    Status(i32),
    /// `exit`/`quit` ran: stop evaluating anything further.
    Stop,
}

impl Outcome {
    pub const SUCCESS: Outcome = Outcome::Status(0);
    pub const FAILURE: Outcome = Outcome::Status(1);

    /// Status of a waited-for child: its exit code, or 1 if it did not
    /// exit normally.
    pub fn from_wait(code: Option<i32>) -> Outcome {
        code.map_or(Outcome::FAILURE, Outcome::Status)
    }

    pub fn is_stop(self) -> bool {
        matches!(self, Outcome::Stop)
    }

    pub fn is_success(self) -> bool {
        self == Outcome::SUCCESS
    }

    /// Folds two statuses with bitwise OR, so 2 and 1 give 3.
    pub fn or(self, other: Outcome) -> Outcome {
        match (self, other) {
            (Outcome::Status(a), Outcome::Status(b)) => Outcome::Status(a | b),
            _ => Outcome::Stop,
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            Outcome::Status(code) => code,
            Outcome::Stop => SHELL_EXIT,
        }
    }

    /// Code used when this outcome has to leave a forked branch as a
    /// process exit status. `Stop` only ends the branch itself.
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Status(code) => code,
            // 不映射为 exit(SHELL_EXIT) 的 156：分支内的 exit 视为正常结束
            Outcome::Stop => 0,
        }
    }
}

impl From<i32> for Outcome {
    fn from(code: i32) -> Self {
        Outcome::Status(code)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Status(code) => write!(f, "{}", code),
            Outcome::Stop => f.write_str("stop"),
        }
    }
}
