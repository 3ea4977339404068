//! Adaptive write executor.
//!
//! Runs one write against a store whose schema is unknown to the client.
//! When the store rejects the payload's shape, the payload is repaired and
//! the same operation runs again:
//!
//! ```text
//!            ┌──────────── attempt(payload) ────────────┐
//!            │                                          │
//!         success                                    failure
//!            │                                          │
//!          return            classify(message) ─────────┼─────────────┐
//!                                  │                    │             │
//!                      MissingAttribute(n)   UnknownAttribute(n)  Unrecognized
//!                       payload[n] = synth     remove payload[n]      │
//!                                  └──── next attempt ──┘         return error
//! ```
//!
//! After `max_attempts` failed attempts the last error is returned. Callers
//! cannot tell exhaustion apart from a failure that happened on the first
//! attempt; both arrive as the store's own error.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use orderdesk_storage::Payload;

use crate::classify::{Diagnosis, FailureClassifier, MessageClassifier};
use crate::synthesize::Synthesizer;

/// Attempts per write unless configured otherwise.
pub const DEFAULT_MAX_ATTEMPTS: usize = 7;

/// Bounded repair-and-retry runner for a single write.
#[derive(Clone)]
pub struct WriteExecutor {
    classifier: Arc<dyn FailureClassifier>,
    synthesizer: Synthesizer,
    max_attempts: usize,
}

impl Default for WriteExecutor {
    fn default() -> Self {
        WriteExecutor {
            classifier: Arc::new(MessageClassifier),
            synthesizer: Synthesizer::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl fmt::Debug for WriteExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteExecutor")
            .field("synthesizer", &self.synthesizer)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

impl WriteExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of attempts per write. Values below 1 become 1.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn FailureClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: Synthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Run `operation` until it succeeds, fails in a way that cannot be
    /// repaired, or has been attempted `max_attempts` times.
    ///
    /// Every attempt receives its own copy of the current payload; `initial`
    /// is never modified. Attempts run strictly one after another.
    pub async fn execute<T, E, F, Fut>(&self, initial: &Payload, mut operation: F) -> Result<T, E>
    where
        E: fmt::Display,
        F: FnMut(Payload) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut payload = initial.clone();
        let mut attempt = 1;

        loop {
            let err = match operation(payload.clone()).await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::debug!(attempt, "write succeeded after payload repair");
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            let diagnosis = self.classifier.classify(&err.to_string());
            if !diagnosis.is_repairable() {
                return Err(err);
            }
            if attempt >= self.max_attempts {
                tracing::warn!(
                    attempts = attempt,
                    "write still rejected after {attempt} attempts: {err}"
                );
                return Err(err);
            }

            self.repair(&mut payload, diagnosis);
            attempt += 1;
        }
    }

    fn repair(&self, payload: &mut Payload, diagnosis: Diagnosis) {
        match diagnosis {
            Diagnosis::MissingAttribute(name) => {
                let value = self.synthesizer.synthesize(&name);
                tracing::warn!(
                    attribute = %name,
                    %value,
                    "required attribute missing from payload; adding placeholder"
                );
                payload.insert(name, value);
            }
            Diagnosis::UnknownAttribute(name) => {
                tracing::warn!(
                    attribute = %name,
                    "attribute unknown to the store; removing it from payload"
                );
                payload.shift_remove(&name);
            }
            Diagnosis::Unrecognized => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use serde_json::json;

    /// Failure carrying only a message, like a store error.
    #[derive(Debug, Clone, PartialEq)]
    struct Failure(String);

    impl fmt::Display for Failure {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    fn missing(name: &str) -> Failure {
        Failure(format!(
            "Invalid document structure: Missing required attribute \"{name}\""
        ))
    }

    fn unknown(name: &str) -> Failure {
        Failure(format!("Invalid document structure: Unknown attribute: \"{name}\""))
    }

    fn payload(value: serde_json::Value) -> Payload {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    /// Operation that replays scripted failures, then succeeds, recording
    /// every payload it receives.
    struct Scripted {
        failures: Mutex<Vec<Failure>>,
        seen: Mutex<Vec<Payload>>,
    }

    impl Scripted {
        fn new(mut failures: Vec<Failure>) -> Self {
            failures.reverse();
            Scripted {
                failures: Mutex::new(failures),
                seen: Mutex::new(Vec::new()),
            }
        }

        async fn call(&self, p: Payload) -> Result<Payload, Failure> {
            self.seen.lock().unwrap().push(p.clone());
            match self.failures.lock().unwrap().pop() {
                Some(failure) => Err(failure),
                None => Ok(p),
            }
        }

        fn seen(&self) -> Vec<Payload> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[tokio::test]
    async fn succeeds_first_time_without_repair() {
        let op = Scripted::new(vec![]);
        let initial = payload(json!({"a": 1}));
        let out = WriteExecutor::new()
            .execute(&initial, |p| op.call(p))
            .await
            .unwrap();
        assert_eq!(out, initial);
        assert_eq!(op.seen().len(), 1);
    }

    #[tokio::test]
    async fn missing_attribute_is_synthesized_then_succeeds() {
        let op = Scripted::new(vec![missing("foo")]);
        let initial = payload(json!({"a": 1}));
        let out = WriteExecutor::new()
            .execute(&initial, |p| op.call(p))
            .await
            .unwrap();

        let seen = op.seen();
        assert_eq!(seen.len(), 2);
        assert!(!seen[0].contains_key("foo"));
        assert_eq!(seen[1]["foo"], json!("fix_value"));
        assert_eq!(out["foo"], json!("fix_value"));
        // The caller's payload is untouched.
        assert!(!initial.contains_key("foo"));
    }

    #[tokio::test]
    async fn unknown_attribute_is_removed_preserving_order() {
        let op = Scripted::new(vec![unknown("bar")]);
        let initial = payload(json!({"a": 1, "bar": 2, "c": 3}));
        WriteExecutor::new()
            .execute(&initial, |p| op.call(p))
            .await
            .unwrap();

        let seen = op.seen();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].contains_key("bar"));
        let keys: Vec<&String> = seen[1].keys().collect();
        assert_eq!(keys, ["a", "c"]);
    }

    #[tokio::test]
    async fn several_repairs_in_sequence() {
        let op = Scripted::new(vec![missing("isActive"), unknown("legacy"), missing("size")]);
        let initial = payload(json!({"legacy": "x", "name": "n"}));
        let out = WriteExecutor::new()
            .execute(&initial, |p| op.call(p))
            .await
            .unwrap();
        assert_eq!(op.seen().len(), 4);
        assert_eq!(out, payload(json!({"name": "n", "isActive": true, "size": 1})));
    }

    #[tokio::test]
    async fn unrecognized_failure_is_not_retried() {
        let denied = Failure("The current user is not authorized".to_string());
        let op = Scripted::new(vec![denied.clone(), missing("never")]);
        let err = WriteExecutor::new()
            .execute(&payload(json!({})), |p| op.call(p))
            .await
            .unwrap_err();
        assert_eq!(err, denied);
        assert_eq!(op.seen().len(), 1);
    }

    #[tokio::test]
    async fn exhaustion_stops_after_exactly_max_attempts() {
        let calls = Mutex::new(0usize);
        let executor = WriteExecutor::new().with_max_attempts(5);
        let err = executor
            .execute(&payload(json!({})), |_p| {
                *calls.lock().unwrap() += 1;
                async { Err::<(), _>(missing("x")) }
            })
            .await
            .unwrap_err();
        assert_eq!(*calls.lock().unwrap(), 5);
        assert_eq!(err, missing("x"));
    }

    #[tokio::test]
    async fn default_budget_is_seven_attempts() {
        let calls = Mutex::new(0usize);
        let result = WriteExecutor::new()
            .execute(&payload(json!({})), |_p| {
                *calls.lock().unwrap() += 1;
                async { Err::<(), _>(unknown("y")) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(*calls.lock().unwrap(), DEFAULT_MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn flip_flop_exhausts_instead_of_looping() {
        let calls = Mutex::new(0usize);
        let result = WriteExecutor::new()
            .with_max_attempts(4)
            .execute(&payload(json!({})), |p| {
                let mut n = calls.lock().unwrap();
                *n += 1;
                let failure = if p.contains_key("a") { unknown("a") } else { missing("a") };
                async move { Err::<(), _>(failure) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(*calls.lock().unwrap(), 4);
    }

    #[test]
    fn zero_attempts_clamped_to_one() {
        assert_eq!(WriteExecutor::new().with_max_attempts(0).max_attempts(), 1);
    }

    struct NeverRepair;

    impl FailureClassifier for NeverRepair {
        fn classify(&self, _message: &str) -> Diagnosis {
            Diagnosis::Unrecognized
        }
    }

    #[tokio::test]
    async fn classifier_is_pluggable() {
        let op = Scripted::new(vec![missing("foo")]);
        let result = WriteExecutor::new()
            .with_classifier(Arc::new(NeverRepair))
            .execute(&payload(json!({})), |p| op.call(p))
            .await;
        assert!(result.is_err());
        assert_eq!(op.seen().len(), 1);
    }
}
