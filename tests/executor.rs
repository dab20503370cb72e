#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn command(&self) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_cmdtree"));
        command
            .current_dir(self.dir.path())
            .env("CMDTREE_LOG_DIR", self.path("logs"))
            .env_remove("CMDTREE_TRACE_FD");
        command
    }

    fn run(&self, line: &str) -> Output {
        self.command().arg("-c").arg(line).output().expect("run cmdtree")
    }

    fn status(&self, line: &str) -> i32 {
        self.run(line).status.code().expect("exit code")
    }

    fn write(&self, name: &str, content: &str) {
        fs::write(self.path(name), content).expect("write file");
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).unwrap_or_default()
    }

    fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    fn canonical(&self, name: &str) -> String {
        let path = self.dir.path().join(name).canonicalize().expect("canonical path");
        format!("{}\n", path.display())
    }
}

// ── simple commands ──

#[test]
fn simple_command_reports_exit_code() {
    let sandbox = Sandbox::new();
    assert_eq!(sandbox.status("sh -c \"exit 3\""), 3);
    assert_eq!(sandbox.status("true"), 0);
}

#[test]
fn arguments_are_passed_through() {
    let sandbox = Sandbox::new();
    assert_eq!(sandbox.status("printf \"%s-%s\" a 'b c' > out.txt"), 0);
    assert_eq!(sandbox.read("out.txt"), "a-b c");
}

#[test]
fn unknown_command_fails_with_diagnostic() {
    let sandbox = Sandbox::new();
    assert_eq!(sandbox.status("no-such-command-for-cmdtree 2> err.txt"), 1);
    assert!(sandbox
        .read("err.txt")
        .contains("Execution failed for 'no-such-command-for-cmdtree'"));
}

// ── sequential and conditional nodes ──

#[test]
fn sequential_combines_with_bitwise_or() {
    let sandbox = Sandbox::new();
    assert_eq!(sandbox.status("sh -c \"exit 2\" ; sh -c \"exit 1\""), 3);
}

#[test]
fn sequential_always_runs_right() {
    let sandbox = Sandbox::new();
    assert_eq!(sandbox.status("false ; touch ran"), 1);
    assert!(sandbox.exists("ran"));
}

#[test]
fn and_skips_right_after_failure() {
    let sandbox = Sandbox::new();
    assert_eq!(sandbox.status("sh -c \"exit 3\" && touch ran"), 3);
    assert!(!sandbox.exists("ran"));
}

#[test]
fn and_runs_right_after_success() {
    let sandbox = Sandbox::new();
    assert_eq!(sandbox.status("true && sh -c \"exit 4\""), 4);
}

#[test]
fn or_skips_right_after_success() {
    let sandbox = Sandbox::new();
    assert_eq!(sandbox.status("true || touch ran"), 0);
    assert!(!sandbox.exists("ran"));
}

#[test]
fn or_runs_right_after_failure() {
    let sandbox = Sandbox::new();
    assert_eq!(sandbox.status("false || sh -c \"exit 5\""), 5);
}

// ── pipes ──

#[test]
fn pipe_carries_bytes_unchanged() {
    let sandbox = Sandbox::new();
    let content = "line one\n\ttabbed line\n\nlast line without newline";
    sandbox.write("in.txt", content);
    assert_eq!(sandbox.status("cat in.txt | cat > out.txt"), 0);
    assert_eq!(sandbox.read("out.txt"), content);
}

#[test]
fn pipe_reports_consumer_status() {
    let sandbox = Sandbox::new();
    assert_eq!(sandbox.status("sh -c \"exit 7\" | true"), 0);
    assert_eq!(sandbox.status("true | sh -c \"exit 6\""), 6);
}

#[test]
fn pipe_reports_failure_for_killed_consumer() {
    let sandbox = Sandbox::new();
    assert_eq!(sandbox.status("true | sh -c 'kill -9 $$'"), 1);
}

#[test]
fn producer_ends_quietly_when_consumer_closes() {
    let sandbox = Sandbox::new();
    let output = sandbox.run("yes | head -n 1 ; echo done");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "y\ndone\n");
    assert_eq!(String::from_utf8_lossy(&output.stderr), "");
}

#[test]
fn pipe_chain() {
    let sandbox = Sandbox::new();
    sandbox.write("in.txt", "b\na\nc\na\n");
    assert_eq!(sandbox.status("cat in.txt | sort | uniq > out.txt"), 0);
    assert_eq!(sandbox.read("out.txt"), "a\nb\nc\n");
}

// ── parallel ──

#[test]
fn parallel_combines_with_bitwise_or() {
    let sandbox = Sandbox::new();
    assert_eq!(sandbox.status("true & sh -c \"exit 4\""), 4);
    assert_eq!(sandbox.status("sh -c \"exit 1\" & sh -c \"exit 2\""), 3);
}

#[test]
fn parallel_reports_failure_for_killed_branch() {
    let sandbox = Sandbox::new();
    assert_eq!(sandbox.status("true & sh -c 'kill -9 $$'"), 1);
    assert_eq!(sandbox.status("sh -c 'kill -9 $$' & sh -c \"exit 4\""), 5);
}

#[test]
fn parallel_waits_for_both_branches() {
    let sandbox = Sandbox::new();
    assert_eq!(
        sandbox.status("sh -c \"sleep 0.2; touch slow\" & touch fast"),
        0
    );
    assert!(sandbox.exists("slow"));
    assert!(sandbox.exists("fast"));
}

// ── redirections ──

#[test]
fn truncate_replaces_existing_content() {
    let sandbox = Sandbox::new();
    sandbox.write("out.txt", "old content\n");
    assert_eq!(sandbox.status("echo new > out.txt"), 0);
    assert_eq!(sandbox.read("out.txt"), "new\n");
}

#[test]
fn append_keeps_existing_content() {
    let sandbox = Sandbox::new();
    sandbox.write("out.txt", "old content\n");
    assert_eq!(sandbox.status("echo new >> out.txt"), 0);
    assert_eq!(sandbox.read("out.txt"), "old content\nnew\n");
}

#[test]
fn error_append_keeps_existing_content() {
    let sandbox = Sandbox::new();
    sandbox.write("err.txt", "first\n");
    assert_eq!(sandbox.status("sh -c \"echo second >&2\" 2>> err.txt"), 0);
    assert_eq!(sandbox.read("err.txt"), "first\nsecond\n");
}

#[test]
fn output_and_error_to_same_file() {
    let sandbox = Sandbox::new();
    assert_eq!(
        sandbox.status("sh -c \"echo out; echo err >&2\" &> both.txt"),
        0
    );
    assert_eq!(sandbox.read("both.txt"), "out\nerr\n");
}

#[test]
fn input_redirection() {
    let sandbox = Sandbox::new();
    sandbox.write("in.txt", "from a file\n");
    assert_eq!(sandbox.status("cat < in.txt > out.txt"), 0);
    assert_eq!(sandbox.read("out.txt"), "from a file\n");
}

#[test]
fn missing_input_fails_the_command_only() {
    let sandbox = Sandbox::new();
    let output = sandbox.run("cat < missing.txt ; touch after");
    assert_eq!(output.status.code(), Some(255));
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing.txt"));
    assert!(sandbox.exists("after"));
}

// ── builtins ──

#[test]
fn cd_to_missing_directory() {
    let sandbox = Sandbox::new();
    let status = sandbox.status("cd /definitely/not/here 2> err.txt ; pwd > where.txt");
    assert_eq!(status, 1);
    assert_eq!(sandbox.read("err.txt"), "Error at changing directory\n");
    assert_eq!(sandbox.read("where.txt"), sandbox.canonical(""));
}

#[test]
fn cd_error_goes_to_stderr_without_redirection() {
    let sandbox = Sandbox::new();
    let output = sandbox.run("cd /definitely/not/here");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stderr),
        "Error at changing directory\n"
    );
}

#[test]
fn cd_changes_directory_for_later_commands() {
    let sandbox = Sandbox::new();
    fs::create_dir(sandbox.path("sub")).unwrap();
    assert_eq!(sandbox.status("cd sub ; pwd > where.txt"), 0);
    assert_eq!(
        fs::read_to_string(sandbox.path("sub/where.txt")).unwrap(),
        sandbox.canonical("sub")
    );
}

#[test]
fn cd_without_argument_goes_home() {
    let sandbox = Sandbox::new();
    fs::create_dir(sandbox.path("home")).unwrap();
    let output = sandbox
        .command()
        .env("HOME", sandbox.path("home"))
        .arg("-c")
        .arg("cd && pwd > where.txt")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        fs::read_to_string(sandbox.path("home/where.txt")).unwrap(),
        sandbox.canonical("home")
    );
}

#[test]
fn cd_without_home_stays_put() {
    let sandbox = Sandbox::new();
    let output = sandbox
        .command()
        .env_remove("HOME")
        .env("CMDTREE_LOG_DIR", sandbox.path("logs"))
        .arg("-c")
        .arg("cd && pwd > where.txt")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(sandbox.read("where.txt"), sandbox.canonical(""));
}

#[test]
fn exit_stops_the_whole_tree() {
    let sandbox = Sandbox::new();
    assert_eq!(sandbox.status("exit ; touch after"), 0);
    assert!(!sandbox.exists("after"));

    assert_eq!(sandbox.status("true && quit ; touch after"), 0);
    assert!(!sandbox.exists("after"));
}

#[test]
fn exit_inside_a_pipe_ends_only_its_branch() {
    let sandbox = Sandbox::new();
    assert_eq!(sandbox.status("exit | true ; touch after"), 0);
    assert!(sandbox.exists("after"));
}

// ── environment ──

#[test]
fn assignment_is_inherited_by_programs() {
    let sandbox = Sandbox::new();
    assert_eq!(
        sandbox.status("CMDTREE_T=hello ; sh -c 'echo $CMDTREE_T' > out.txt"),
        0
    );
    assert_eq!(sandbox.read("out.txt"), "hello\n");
}

#[test]
fn assignment_value_is_resolved() {
    let sandbox = Sandbox::new();
    let line = "CMDTREE_A=x ; CMDTREE_B=${CMDTREE_A}y ; sh -c 'echo $CMDTREE_B' > out.txt";
    assert_eq!(sandbox.status(line), 0);
    assert_eq!(sandbox.read("out.txt"), "xy\n");
}

#[test]
fn variables_expand_in_arguments() {
    let sandbox = Sandbox::new();
    assert_eq!(
        sandbox.status("GREETING=hi ; echo \"$GREETING there\" > out.txt"),
        0
    );
    assert_eq!(sandbox.read("out.txt"), "hi there\n");
}

// ── driver ──

#[test]
fn reads_lines_until_exit() {
    let sandbox = Sandbox::new();
    let mut child = sandbox
        .command()
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"echo one > a.txt\n\nexit\necho two > b.txt\n")
        .unwrap();
    let status = child.wait().unwrap();

    assert_eq!(status.code(), Some(0));
    assert_eq!(sandbox.read("a.txt"), "one\n");
    assert!(!sandbox.exists("b.txt"));
}

#[test]
fn syntax_error_is_reported() {
    let sandbox = Sandbox::new();
    let output = sandbox.run("echo >");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("syntax error"));
}
