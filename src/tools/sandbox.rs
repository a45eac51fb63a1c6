//! Time-bounded code execution.
//!
//! Snippets are written to a scratch file and run by an interpreter subprocess
//! under a hard wall-clock cap, so a runaway snippet never stalls the async
//! scheduler.
//!
//! The pre-execution check is a plain substring ban list: any snippet that
//! contains a banned token anywhere (including inside unrelated identifiers
//! such as `cost` or `posix`) is rejected. This is not a sandboxing guarantee.

use std::io::Write;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::config::SandboxConfig;
use crate::error::ChatError;

/// Captured result of one interpreter run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl SandboxOutput {
    /// User-facing rendering of the run
    pub fn render(&self) -> String {
        if self.success {
            format!("Code executed successfully:\n{}", self.stdout)
        } else {
            format!("Code execution error:\n{}", self.stderr)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sandbox {
    interpreter: String,
    timeout: Duration,
    banned_tokens: Vec<String>,
}

impl Sandbox {
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            interpreter: config.interpreter.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            banned_tokens: config.banned_tokens.clone(),
        }
    }

    /// Reject snippets mentioning a banned token
    pub fn check(&self, code: &str) -> Result<(), ChatError> {
        match self.banned_tokens.iter().find(|token| code.contains(token.as_str())) {
            Some(token) => Err(ChatError::ExecutionRejected(token.clone())),
            None => Ok(()),
        }
    }

    /// Check, then run the snippet with the configured interpreter
    pub async fn run(&self, code: &str) -> Result<SandboxOutput, ChatError> {
        if let Err(e) = self.check(code) {
            tracing::warn!("Rejected code snippet: {}", e);
            return Err(e);
        }

        let mut script = tempfile::Builder::new()
            .prefix("oasiz-")
            .suffix(".py")
            .tempfile()?;
        script.write_all(code.as_bytes())?;
        script.flush()?;

        let child = Command::new(&self.interpreter)
            .arg(script.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // On timeout the child future is dropped, which kills the process
        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => {
                let output = output?;
                Ok(SandboxOutput {
                    success: output.status.success(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
            Err(_) => {
                tracing::warn!("Code execution exceeded {:?}", self.timeout);
                Err(ChatError::ExecutionTimeout(self.timeout.as_secs()))
            }
        }
    }
}
