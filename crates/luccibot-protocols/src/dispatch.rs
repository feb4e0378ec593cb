//! Skill dispatch requests.

use serde::{Deserialize, Serialize};

/// A request to run a named skill with ordered string arguments.
///
/// Produced by the interpreter, consumed exactly once by the executor and
/// never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRequest {
    /// Identifier resolved to an executable inside the skills directory.
    pub skill_name: String,
    /// Arguments passed to the skill as separate process arguments.
    #[serde(default)]
    pub arguments: Vec<String>,
}

impl DispatchRequest {
    pub fn new(skill_name: impl Into<String>) -> Self {
        Self {
            skill_name: skill_name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }
}

impl std::fmt::Display for DispatchRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:?}", self.skill_name, self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let req = DispatchRequest::new("swap").with_arguments(["1", "eth"]);
        assert_eq!(req.skill_name, "swap");
        assert_eq!(req.arguments, vec!["1".to_string(), "eth".to_string()]);
    }

    #[test]
    fn test_display() {
        let req = DispatchRequest::new("swap").with_arguments(["1", "eth"]);
        assert_eq!(req.to_string(), r#"swap ["1", "eth"]"#);
    }

    #[test]
    fn test_deserialize_without_arguments() {
        let req: DispatchRequest = serde_json::from_str(r#"{"skill_name":"balance"}"#).unwrap();
        assert!(req.arguments.is_empty());
    }
}
