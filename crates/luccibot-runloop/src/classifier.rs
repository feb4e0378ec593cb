//! Keyword-based intent classification.

use luccibot_protocols::{Classifier, DispatchRequest, Intent};

/// Reply to greetings.
pub const GREETING: &str =
    "Hello! I am LucciBot. I can help you swap assets or sign transactions.";

/// Substring rules over lower-cased input, checked in order:
///
/// 1. contains `swap`: dispatch the `swap` skill with the tokens that follow
///    the first token containing `swap`
/// 2. contains `hello`: greet
/// 3. anything else: unrecognized
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Intent {
        let lower = text.to_lowercase();

        if lower.contains("swap") {
            let tokens: Vec<&str> = lower.split_whitespace().collect();
            let arguments = tokens
                .iter()
                .position(|t| t.contains("swap"))
                .map(|i| &tokens[i + 1..])
                .unwrap_or_default();
            let request = DispatchRequest::new("swap").with_arguments(arguments.iter().copied());
            return Intent::Dispatch(request);
        }

        if lower.contains("hello") {
            return Intent::Reply(GREETING.to_string());
        }

        Intent::Unrecognized
    }
}
