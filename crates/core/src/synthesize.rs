//! Placeholder values for attributes the remote schema demands.
//!
//! The values only aim to pass validation. They are not business defaults:
//! a caller that cares about an attribute must write the real value itself.

use std::collections::BTreeMap;

use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Suffix conventionally used for timestamp attributes (`createdAt`, ...).
const TIMESTAMP_SUFFIX: &str = "At";
const FALLBACK_TEXT: &str = "fix_value";

/// Name-driven value synthesizer.
///
/// Rules, first match wins:
/// 1. known boolean flag → `true`
/// 2. name contains `date` (any case) or ends with `At` → current time, RFC 3339
/// 3. known numeric counter → its integer
/// 4. known text field → its placeholder text
/// 5. anything else → `"fix_value"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesizer {
    boolean_flags: Vec<String>,
    counters: BTreeMap<String, i64>,
    text_values: BTreeMap<String, String>,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Synthesizer {
            boolean_flags: vec!["isActive".to_string()],
            counters: BTreeMap::from([("draft".to_string(), 0), ("size".to_string(), 1)]),
            text_values: BTreeMap::from([
                ("value".to_string(), "schema_fix".to_string()),
                ("datatype".to_string(), "text".to_string()),
            ]),
        }
    }
}

impl Synthesizer {
    /// Register another boolean flag attribute.
    pub fn with_flag(mut self, name: &str) -> Self {
        self.boolean_flags.push(name.to_string());
        self
    }

    /// Register a numeric counter attribute and the integer it receives.
    pub fn with_counter(mut self, name: &str, value: i64) -> Self {
        self.counters.insert(name.to_string(), value);
        self
    }

    /// Register a text attribute and the placeholder it receives.
    pub fn with_text(mut self, name: &str, value: &str) -> Self {
        self.text_values.insert(name.to_string(), value.to_string());
        self
    }

    /// Value for `attribute`, reading the clock for timestamp attributes.
    pub fn synthesize(&self, attribute: &str) -> Value {
        self.synthesize_at(attribute, OffsetDateTime::now_utc())
    }

    /// Value for `attribute`, with `now` as the current time.
    pub fn synthesize_at(&self, attribute: &str, now: OffsetDateTime) -> Value {
        if self.boolean_flags.iter().any(|f| f == attribute) {
            return Value::Bool(true);
        }
        if attribute.to_lowercase().contains("date") || attribute.ends_with(TIMESTAMP_SUFFIX) {
            let stamp = now
                .format(&Rfc3339)
                .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string());
            return Value::String(stamp);
        }
        if let Some(n) = self.counters.get(attribute) {
            return Value::from(*n);
        }
        if let Some(text) = self.text_values.get(attribute) {
            return Value::String(text.clone());
        }
        Value::String(FALLBACK_TEXT.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2025-03-04 05:06:07 UTC);

    fn synth(name: &str) -> Value {
        Synthesizer::default().synthesize_at(name, NOW)
    }

    #[test]
    fn flag_gets_true() {
        assert_eq!(synth("isActive"), json!(true));
    }

    #[test]
    fn dates_and_timestamps_get_now() {
        let expected = json!("2025-03-04T05:06:07Z");
        assert_eq!(synth("dueDate"), expected);
        assert_eq!(synth("DATE"), expected);
        assert_eq!(synth("closedAt"), expected);
        assert_eq!(synth("updatedAt"), expected);
    }

    #[test]
    fn counters_get_integers() {
        assert_eq!(synth("draft"), json!(0));
        assert_eq!(synth("size"), json!(1));
    }

    #[test]
    fn text_fields_get_placeholders() {
        assert_eq!(synth("value"), json!("schema_fix"));
        assert_eq!(synth("datatype"), json!("text"));
    }

    #[test]
    fn anything_else_gets_fallback() {
        assert_eq!(synth("supervisor"), json!("fix_value"));
        assert_eq!(synth("at"), json!("fix_value"));
    }

    #[test]
    fn flag_rule_precedes_date_rule() {
        let s = Synthesizer::default().with_flag("updatedAt");
        assert_eq!(s.synthesize_at("updatedAt", NOW), json!(true));
    }

    #[test]
    fn custom_rules() {
        let s = Synthesizer::default()
            .with_counter("retries", 3)
            .with_text("region", "unset");
        assert_eq!(s.synthesize_at("retries", NOW), json!(3));
        assert_eq!(s.synthesize_at("region", NOW), json!("unset"));
    }

    #[test]
    fn synthesize_reads_clock() {
        let value = Synthesizer::default().synthesize("createdAt");
        let text = value.as_str().unwrap();
        assert!(OffsetDateTime::parse(text, &Rfc3339).is_ok());
    }
}
