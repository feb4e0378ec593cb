//! Skill invocation errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkillError {
    #[error("Invalid skill name: {0:?}")]
    InvalidName(String),

    #[error("Failed to launch skill: {0}")]
    LaunchFailed(#[from] std::io::Error),

    #[error("Skill timed out after {0} seconds")]
    Timeout(u64),

    #[error("Skill exited with {}: {stderr}", exit_code_text(.code))]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("Skill invocation was cancelled")]
    Cancelled,
}

fn exit_code_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_error_invalid_name() {
        let err = SkillError::InvalidName("../swap".to_string());
        assert!(err.to_string().contains("Invalid skill name"));
        assert!(err.to_string().contains("../swap"));
    }

    #[test]
    fn test_skill_error_launch_failed_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: SkillError = io_err.into();
        assert!(err.to_string().contains("launch"));
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn test_skill_error_timeout() {
        let err = SkillError::Timeout(30);
        assert!(err.to_string().contains("timed out"));
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_skill_error_non_zero_exit() {
        let err = SkillError::NonZeroExit {
            code: Some(2),
            stderr: "bad amount".to_string(),
        };
        assert!(err.to_string().contains("exit code 2"));
        assert!(err.to_string().contains("bad amount"));
    }

    #[test]
    fn test_skill_error_killed_by_signal() {
        let err = SkillError::NonZeroExit {
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("signal"));
    }
}
