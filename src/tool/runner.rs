//! Module to run mediainfo as a child process

use std::{
    io::Read,
    path::Path,
    process::{Command, Stdio},
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use crate::error::{MediaInfoError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Merged stdout/stderr of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutput {
    pub success: bool,
    pub text: String,
}

/// Executes a prepared command line.
///
/// Arguments inside `command` are already escaped for the shell.
pub trait ToolRunner: Send + Sync {
    fn run_command(&self, command: &str) -> Result<RawOutput>;
}

/// Runs command lines through the platform shell with a hard timeout
#[derive(Debug, Clone)]
pub struct ShellRunner {
    timeout: Duration,
}

impl ShellRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    #[cfg(not(target_os = "windows"))]
    fn shell(command: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(format!("exec 2>&1; exec {command}"));
        cmd
    }

    #[cfg(target_os = "windows")]
    fn shell(command: &str) -> Command {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(format!("{command} 2>&1"));
        cmd
    }
}

impl ToolRunner for ShellRunner {
    fn run_command(&self, command: &str) -> Result<RawOutput> {
        let mut child = Self::shell(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("child stdout was not captured"))?;
        let (sender, output) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = sender.send(stdout.read_to_end(&mut buf).map(|_| buf));
        });

        let timed_out = || MediaInfoError::Timeout {
            command: command.to_string(),
            after: self.timeout,
        };

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(timed_out());
            }
            thread::sleep(POLL_INTERVAL);
        };

        // a process spawned in the background by the tool can keep the pipe open after it exits
        let bytes = match output.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(read) => read?,
            Err(RecvTimeoutError::Timeout) => return Err(timed_out()),
            Err(RecvTimeoutError::Disconnected) => {
                return Err(std::io::Error::other("output reader stopped without a result").into());
            }
        };

        Ok(RawOutput {
            success: status.success(),
            text: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// Wraps `s` in double quotes, escaping what the shell would expand inside them
pub fn escape_double_quotes(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Leaves plain words alone, quotes everything else
pub fn shell_word(s: &str) -> String {
    let plain = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:+@%=,".contains(c));
    if plain {
        s.to_string()
    } else {
        escape_double_quotes(s)
    }
}

/// Runs `<tool> <input> --Output=XML` and returns its merged output.
///
/// `input` must already be escaped for the shell.
pub fn run(runner: &dyn ToolRunner, tool_path: &Path, input: Option<&str>) -> Result<String> {
    let input = input
        .filter(|i| !i.trim().is_empty())
        .ok_or_else(|| MediaInfoError::Argument("Your input cannot be blank.".to_string()))?;

    let command = format!(
        "{} {input} --Output=XML",
        shell_word(&tool_path.to_string_lossy())
    );
    log::debug!("running {command}");

    let output = runner.run_command(&command)?;
    if !output.success {
        return Err(MediaInfoError::Execution {
            command,
            output: output.text,
        });
    }

    log::debug!("mediainfo produced {} bytes", output.text.len());
    Ok(output.text)
}
