use std::process::{Command, Stdio};

pub trait RunInfo {
    /// Returns true if the command could not be started at all (not found, or general I/O error)
    fn not_found(&self) -> bool;

    /// Returns true if the command returned a non-zero exit code
    fn non_zero_exit(&self) -> bool;

    /// Returns true if there was a failure of the command (either not found or non-zero exit code)
    fn failure(&self) -> bool {
        self.not_found() | self.non_zero_exit()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct RunDetails {
    stdout: String,
    stderr: String,
    exit_code: isize,
}

/// Outcome of a command whose output was captured
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    result: Option<RunDetails>,
    command: String,
}

impl RunInfo for RunResult {
    fn not_found(&self) -> bool {
        self.result.is_none()
    }

    fn non_zero_exit(&self) -> bool {
        self.result.as_ref().map_or(false, |r| r.exit_code != 0)
    }
}

impl RunResult {
    pub fn completed(command: &str, stdout: &str, stderr: &str, exit_code: isize) -> Self {
        RunResult {
            result: Some(RunDetails {
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                exit_code,
            }),
            command: command.to_string(),
        }
    }

    pub fn did_not_run(command: &str) -> Self {
        RunResult { result: None, command: command.to_string() }
    }

    /// Empty when the command did not run
    pub fn stdout(&self) -> &str {
        self.result.as_ref().map_or("", |r| r.stdout.as_str())
    }

    /// Best human readable reason for a failed run
    pub fn failure_reason(&self) -> String {
        match &self.result {
            None => format!("could not run command {}", self.command),
            Some(r) if r.stderr.trim().is_empty() => format!("command returned non-zero code ({})", r.exit_code),
            Some(r) => format!("command returned non-zero code ({}): {}", r.exit_code, r.stderr.trim()),
        }
    }
}

/// Outcome of a command that wrote straight to the terminal
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    exit_code: isize,
    did_run: bool,
}

impl RunSummary {
    pub fn new(did_run: bool, exit_code: isize) -> Self {
        RunSummary { exit_code, did_run }
    }

    pub fn exit_code(&self) -> isize {
        self.exit_code
    }
}

impl RunInfo for RunSummary {
    fn not_found(&self) -> bool {
        !self.did_run
    }

    fn non_zero_exit(&self) -> bool {
        self.did_run && self.exit_code != 0
    }
}

/// Everything the pipelines need from the outside world to run provider CLIs.
/// `ShellRunner` is the real thing, tests script their own.
pub trait CommandRunner {
    /// Runs the command and captures stdout and stderr
    fn run(&self, command: &str) -> RunResult;

    /// Runs the command with the terminal attached (stdin, stdout and stderr inherited)
    fn run_interactive(&self, command: &str) -> RunSummary;

    /// Whether the given binary can be started at all
    fn command_exists(&self, binary: &str) -> bool;
}

pub struct ShellRunner {
    shell: String,
}

impl ShellRunner {
    pub fn new(shell: &str) -> Self {
        ShellRunner { shell: shell.to_string() }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> RunResult {
        run_command(command, &self.shell)
    }

    fn run_interactive(&self, command: &str) -> RunSummary {
        run_command_interactive(command, &self.shell)
    }

    fn command_exists(&self, binary: &str) -> bool {
        check_command_exist(binary)
    }
}

/// `command` is a path or a bare binary name, spaces included, never a shell line
pub fn check_command_exist(command: &str) -> bool {
    Command::new(command).stdout(Stdio::null()).stderr(Stdio::null()).output().is_ok()
}

pub fn run_command(command: &str, shell: &str) -> RunResult {
    let output = Command::new(shell)
            .arg("-c")
            .arg(command)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output();

    match output {
        Ok(o) => RunResult::completed(
            command,
            &String::from_utf8_lossy(&o.stdout),
            &String::from_utf8_lossy(&o.stderr),
            // killed by a signal: no code
            o.status.code().unwrap_or(-1) as isize,
        ),
        Err(_) => RunResult::did_not_run(command),
    }
}

pub fn run_command_interactive(command: &str, shell: &str) -> RunSummary {
    let output = Command::new(shell).arg("-c")
            .arg(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status();

    match output {
        Ok(status) => RunSummary::new(true, status.code().unwrap_or(-1) as isize),
        Err(_) => RunSummary::new(false, 0),
    }
}

/// Quotes a single argument for `sh -c`, leaving plain words untouched
pub fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty() && arg.chars().all(|c| c.is_ascii_alphanumeric() || "-_./:=@,+%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_words_are_not_quoted() {
        assert_eq!(shell_quote("ubuntu-2004"), "ubuntu-2004");
        assert_eq!(shell_quote("Standard_B1s"), "Standard_B1s");
        assert_eq!(shell_quote("us-east1-b"), "us-east1-b");
    }

    #[test]
    fn special_characters_are_single_quoted() {
        assert_eq!(shell_quote("P@ss w0rd!"), "'P@ss w0rd!'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn run_info_flags() {
        let ok = RunResult::completed("az group create", "{}", "", 0);
        assert!(!ok.failure());
        let bad = RunResult::completed("az group create", "", "AuthorizationFailed\n", 3);
        assert!(bad.non_zero_exit());
        assert_eq!(bad.failure_reason(), "command returned non-zero code (3): AuthorizationFailed");
        let missing = RunResult::did_not_run("az group create");
        assert!(missing.not_found() && missing.failure());
        assert_eq!(missing.stdout(), "");

        assert!(RunSummary::new(true, 1).non_zero_exit());
        assert!(RunSummary::new(false, 0).not_found());
    }

    #[test]
    fn shell_commands_run_through_the_shell() {
        let res = run_command("echo hello", "sh");
        assert!(!res.failure());
        assert_eq!(res.stdout().trim(), "hello");
        assert!(run_command("exit 4", "sh").non_zero_exit());
    }

    #[test]
    fn binary_paths_with_spaces_are_just_missing() {
        assert!(!check_command_exist("/no such/dir/gcloud"));
        assert!(check_command_exist("sh"));
    }
}
