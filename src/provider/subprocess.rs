use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use super::{Provider, ProviderError};

/// Backend that shells out to a local CLI tool, feeding the prompt over
/// stdin and reading the full stdout as the raw response.
#[derive(Debug)]
pub struct SubprocessProvider {
    label: &'static str,
    command: String,
    args: Vec<String>,
}

impl SubprocessProvider {
    pub fn new(label: &'static str, command: impl Into<String>, args: Vec<String>) -> Self {
        SubprocessProvider {
            label,
            command: command.into(),
            args,
        }
    }

    fn run(&self, prompt: &str) -> Result<String, ProviderError> {
        log::debug!("running {} via `{}`", self.label, self.command);

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => ProviderError::Transport(format!(
                    "{} command not found: {}. Install it or configure the correct command \
                     with 'committer config'",
                    self.label, self.command
                )),
                _ => ProviderError::Transport(format!(
                    "Failed to execute {}: {err}",
                    self.label
                )),
            })?;

        // Closing stdin signals end of prompt to the tool.
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(prompt.as_bytes()).map_err(|err| {
                ProviderError::Transport(format!(
                    "Failed to write prompt to {}: {err}",
                    self.label
                ))
            })?;
        }

        let output = child.wait_with_output().map_err(|err| {
            ProviderError::Transport(format!("Failed to execute {}: {err}", self.label))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = if stderr.trim().is_empty() {
                format!(
                    "{} exited with code {}",
                    self.label,
                    output.status.code().unwrap_or(-1)
                )
            } else {
                stderr.trim().to_string()
            };
            return Err(ProviderError::Transport(format!(
                "{} error: {detail}",
                self.label
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.is_empty() {
            return Err(ProviderError::Transport(format!(
                "No output from {}",
                self.label
            )));
        }

        Ok(stdout)
    }
}

impl Provider for SubprocessProvider {
    fn execute(&self, prompt: &str) -> Result<String, ProviderError> {
        self.run(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell(script: &str) -> SubprocessProvider {
        SubprocessProvider::new(
            "Test Tool",
            "sh",
            vec!["-c".to_string(), script.to_string()],
        )
    }

    #[test]
    #[cfg(unix)]
    fn stdout_is_returned_trimmed() {
        let provider = shell("cat >/dev/null; printf '  hello from tool  '");
        assert_eq!(provider.execute("prompt").unwrap(), "hello from tool");
    }

    #[test]
    #[cfg(unix)]
    fn prompt_is_delivered_over_stdin() {
        let provider = shell("cat");
        assert_eq!(provider.execute("echo me back").unwrap(), "echo me back");
    }

    #[test]
    #[cfg(unix)]
    fn nonzero_exit_reports_stderr() {
        let provider = shell("cat >/dev/null; echo 'model not found' >&2; exit 1");
        let err = provider.execute("prompt").unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
        assert!(err.to_string().contains("model not found"));
    }

    #[test]
    #[cfg(unix)]
    fn nonzero_exit_without_stderr_reports_code() {
        let provider = shell("cat >/dev/null; exit 3");
        let err = provider.execute("prompt").unwrap_err();
        assert!(err.to_string().contains("exited with code 3"));
    }

    #[test]
    #[cfg(unix)]
    fn empty_stdout_is_an_error() {
        let provider = shell("cat >/dev/null");
        let err = provider.execute("prompt").unwrap_err();
        assert!(err.to_string().contains("No output from Test Tool"));
    }

    #[test]
    fn missing_command_names_the_fix() {
        let provider = SubprocessProvider::new(
            "Test Tool",
            "committer-no-such-binary-xyz",
            Vec::new(),
        );
        let err = provider.execute("prompt").unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
        assert!(err.to_string().contains("command not found"));
        assert!(err.to_string().contains("committer config"));
    }
}
