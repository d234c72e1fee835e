use std::time::Duration;
use tokio::process::Command;
use tracing::{self, error, info};

use crate::config::CommandLine;
use crate::error::{AutodockError, Result};

/// Captured output of a finished command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// stdout followed by stderr
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
        }
    }
}

/// Runs `command` to completion, or kills it once `timeout` elapses.
/// A non-zero exit status is an error.
pub async fn run_command(command: &CommandLine, timeout: Duration) -> Result<CommandOutput> {
    info!("Running: {}", command);

    let mut cmd = Command::new(command.program());
    cmd.args(command.args()).kill_on_drop(true);
    let child = cmd.output();

    let output = match tokio::time::timeout(timeout, child).await {
        Ok(result) => result.map_err(|e| {
            error!("'{}' failed to start: {}", command.program(), e);
            AutodockError::CommandSpawn(e)
        })?,
        Err(_) => {
            error!("'{}' still running after {:?}, killed", command, timeout);
            return Err(AutodockError::CommandTimeout(timeout));
        }
    };

    let captured = CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    if output.status.success() {
        info!("'{}' output:\n{}", command, captured.combined());
        Ok(captured)
    } else {
        error!(
            "'{}' exited with {}:\n{}",
            command,
            output.status,
            captured.combined()
        );
        Err(AutodockError::CommandFailed {
            code: output.status.code(),
            stderr: captured.stderr,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn cmd(line: &str) -> CommandLine {
        CommandLine::parse(line).unwrap()
    }

    #[tokio::test]
    async fn captures_stdout() {
        let output = run_command(&cmd("echo hi:there"), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(output.stdout.trim(), "hi:there");
    }

    #[tokio::test]
    async fn non_zero_exit_is_an_error() {
        let err = run_command(&cmd("false"), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, AutodockError::CommandFailed { code: Some(1), .. }));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let err = run_command(&cmd("/nonexistent/autodock-test-bin"), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, AutodockError::CommandSpawn(_)));
    }

    #[tokio::test]
    async fn slow_command_times_out() {
        let err = run_command(&cmd("sleep 5"), Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, AutodockError::CommandTimeout(_)));
    }

    #[test]
    fn combined_output_joins_streams() {
        let output = CommandOutput {
            stdout: "out".to_string(),
            stderr: "err".to_string(),
        };
        assert_eq!(output.combined(), "out\nerr");
    }
}
