//! Failure classification for the adaptive write path.
//!
//! The document store reports schema mismatches only as free text. The
//! classifier turns that text into a [`Diagnosis`]. The match is a heuristic
//! over the store's message wording, not a contract: a store that rewords its
//! messages silently disables repair, and every write failure then surfaces
//! as-is.

use std::sync::LazyLock;

use regex::Regex;

static MISSING_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)missing required attribute(?::\s*|\s+)"?([^"\s]+)"?"#)
        .expect("missing-attribute pattern compiles")
});

static UNKNOWN_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)unknown attribute(?::\s*|\s+)"?([^"\s]+)"?"#)
        .expect("unknown-attribute pattern compiles")
});

/// What a single failed write says about the payload's shape.
///
/// `Unrecognized` does not carry the failure: the caller still holds the
/// error it classified and surfaces that one unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnosis {
    /// The schema requires an attribute the payload lacks.
    MissingAttribute(String),
    /// The payload carries an attribute the schema does not know.
    UnknownAttribute(String),
    /// Anything else: permissions, connectivity, invalid values, ...
    Unrecognized,
}

impl Diagnosis {
    /// Whether the payload can be repaired and the write retried.
    pub fn is_repairable(&self) -> bool {
        !matches!(self, Diagnosis::Unrecognized)
    }
}

/// Turns a failure message into a [`Diagnosis`].
///
/// Swap implementations to follow a store with different wording without
/// touching the retry loop.
pub trait FailureClassifier: Send + Sync {
    fn classify(&self, message: &str) -> Diagnosis;
}

/// Classifier for the `Missing required attribute "x"` /
/// `Unknown attribute: "x"` wording.
///
/// Matching is case-insensitive and the quotes are optional. The missing
/// phrase is checked first, so a message carrying both phrases is a
/// `MissingAttribute`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageClassifier;

impl FailureClassifier for MessageClassifier {
    fn classify(&self, message: &str) -> Diagnosis {
        if let Some(name) = capture_name(&MISSING_ATTRIBUTE, message) {
            return Diagnosis::MissingAttribute(name);
        }
        if let Some(name) = capture_name(&UNKNOWN_ATTRIBUTE, message) {
            return Diagnosis::UnknownAttribute(name);
        }
        Diagnosis::Unrecognized
    }
}

fn capture_name(pattern: &Regex, message: &str) -> Option<String> {
    pattern
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
