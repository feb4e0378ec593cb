//! External skill process invocation.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use luccibot_config::SkillsConfig;
use luccibot_protocols::{DispatchRequest, SkillError};

/// Launches skills as child processes and captures their standard output.
///
/// A skill named `swap` resolves to `<skills_dir>/swap`. With a runner
/// configured (`bun`, `node`, ...) the runner is launched with the resolved
/// path as its first argument; otherwise the file is executed directly.
/// Arguments are always passed as separate process arguments, never through
/// a shell.
#[derive(Debug, Clone)]
pub struct SkillRunner {
    skills_dir: PathBuf,
    runner: Option<String>,
    timeout: Option<Duration>,
}

impl SkillRunner {
    pub fn new(skills_dir: impl Into<PathBuf>) -> Self {
        Self {
            skills_dir: skills_dir.into(),
            runner: None,
            timeout: None,
        }
    }

    pub fn with_runner(mut self, runner: impl Into<String>) -> Self {
        self.runner = Some(runner.into());
        self
    }

    /// Bound each invocation. `None` lets skills run until cancelled.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_config(config: &SkillsConfig) -> Self {
        let runner = Self::new(config.dir_path()).with_timeout(config.timeout());
        match &config.runner {
            Some(r) => runner.with_runner(r.clone()),
            None => runner,
        }
    }

    pub fn skills_dir(&self) -> &Path {
        &self.skills_dir
    }

    /// Resolve a skill name to its path inside the skills directory.
    ///
    /// Names are restricted to ASCII alphanumerics, `-`, `_` and `.` so a
    /// request can never escape the directory.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, SkillError> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

        if !valid {
            return Err(SkillError::InvalidName(name.to_string()));
        }
        Ok(self.skills_dir.join(name))
    }

    fn command(&self, path: &Path, arguments: &[String]) -> Command {
        let mut cmd = match &self.runner {
            Some(runner) => {
                let mut cmd = Command::new(runner);
                cmd.arg(path);
                cmd
            }
            None => Command::new(path),
        };
        cmd.args(arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Run the requested skill and return its captured stdout.
    ///
    /// The child is killed if `cancel` fires or the timeout elapses first.
    pub async fn run(
        &self,
        request: &DispatchRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, SkillError> {
        let path = self.resolve(&request.skill_name)?;
        debug!(skill = %request.skill_name, path = %path.display(), "Launching skill");

        let child = self.command(&path, &request.arguments).spawn()?;
        let output = child.wait_with_output();

        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SkillError::Cancelled),
            output = async {
                match self.timeout {
                    Some(limit) => timeout(limit, output)
                        .await
                        .map_err(|_| SkillError::Timeout(limit.as_secs())),
                    None => Ok(output.await),
                }
            } => output??,
        };

        if !output.status.success() {
            return Err(SkillError::NonZeroExit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(
            skill = %request.skill_name,
            bytes = output.stdout.len(),
            "Skill finished"
        );
        Ok(output.stdout)
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
