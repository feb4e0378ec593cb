//! Bus events exchanged between the interface and the core.

use serde::{Serialize, Serializer};

/// A notification carried on the inbound or outbound channel.
///
/// The set of kinds is closed; each kind carries its own payload type so
/// consumers never inspect payloads at runtime to learn what they hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Event {
    /// Free text typed by the user.
    UserMessage(String),
    /// Diagnostic line for the interface's log area.
    Log(String),
    /// Direct reply to the user.
    Response(String),
    /// Positive outcome notice.
    Success(String),
    /// User-visible failure description.
    Error(String),
    /// A skill artifact together with its signature.
    Signed(SignedArtifact),
}

/// Kind tag of an [`Event`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    UserMessage,
    Log,
    Response,
    Success,
    Error,
    Signed,
}

impl Event {
    pub fn user_message(text: impl Into<String>) -> Self {
        Event::UserMessage(text.into())
    }

    pub fn log(text: impl Into<String>) -> Self {
        Event::Log(text.into())
    }

    pub fn response(text: impl Into<String>) -> Self {
        Event::Response(text.into())
    }

    pub fn error(text: impl Into<String>) -> Self {
        Event::Error(text.into())
    }

    /// The kind tag of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::UserMessage(_) => EventKind::UserMessage,
            Event::Log(_) => EventKind::Log,
            Event::Response(_) => EventKind::Response,
            Event::Success(_) => EventKind::Success,
            Event::Error(_) => EventKind::Error,
            Event::Signed(_) => EventKind::Signed,
        }
    }

    /// Text payload, if this kind carries one.
    pub fn text(&self) -> Option<&str> {
        match self {
            Event::UserMessage(t)
            | Event::Log(t)
            | Event::Response(t)
            | Event::Success(t)
            | Event::Error(t) => Some(t),
            Event::Signed(_) => None,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::UserMessage => write!(f, "user_message"),
            EventKind::Log => write!(f, "log"),
            EventKind::Response => write!(f, "response"),
            EventKind::Success => write!(f, "success"),
            EventKind::Error => write!(f, "error"),
            EventKind::Signed => write!(f, "signed"),
        }
    }
}

/// Payload of [`Event::Signed`]: the raw skill output and its signature.
///
/// Both byte fields are opaque; they serialize as lossy UTF-8 text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedArtifact {
    /// Skill that produced the artifact.
    pub skill_name: String,
    /// Captured standard output of the skill.
    #[serde(rename = "raw_tx", serialize_with = "lossy_utf8")]
    pub artifact: Vec<u8>,
    /// Signature returned by the signer.
    #[serde(serialize_with = "lossy_utf8")]
    pub signature: Vec<u8>,
}

impl SignedArtifact {
    pub fn new(skill_name: impl Into<String>, artifact: Vec<u8>, signature: Vec<u8>) -> Self {
        Self {
            skill_name: skill_name.into(),
            artifact,
            signature,
        }
    }

    pub fn artifact_text(&self) -> String {
        String::from_utf8_lossy(&self.artifact).into_owned()
    }

    pub fn signature_text(&self) -> String {
        String::from_utf8_lossy(&self.signature).into_owned()
    }
}

fn lossy_utf8<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
