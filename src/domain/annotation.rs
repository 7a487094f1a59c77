use chrono::Utc;
use serde::Serialize;

/// Longest message the annotation gateway accepts, in characters.
pub const MAX_MESSAGE_CHARS: usize = 256;

const ELLIPSIS: &str = "...";
const TRUNCATED_PREFIX_CHARS: usize = 252;

/// Event status level. The gateway treats a missing level as `INFO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventLevel {
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for EventLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A timeline annotation posted to the event gateway.
///
/// Only built through [`AnnotationEvent::new`], so the message is always
/// within the gateway limit. Events are encode-only:
///
/// ```compile_fail
/// let event: stackdriver::AnnotationEvent =
///     serde_json::from_str(r#"{"message":"m","event_epoch":1}"#).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationEvent {
    message: String,
    /// Person or robot the annotation should be attributed to.
    #[serde(skip_serializing_if = "Option::is_none")]
    annotated_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<EventLevel>,
    /// Events with an instance id show up under that instance's context.
    #[serde(skip_serializing_if = "Option::is_none")]
    instance_id: Option<String>,
    /// Unix timestamp of where the event appears in the timeline.
    event_epoch: i64,
}

impl AnnotationEvent {
    /// Creates an event, truncating `message` to the gateway limit.
    pub fn new(message: impl AsRef<str>, event_epoch: i64) -> Self {
        Self {
            message: truncate_message(message.as_ref()),
            annotated_by: None,
            level: None,
            instance_id: None,
            event_epoch,
        }
    }

    /// Creates an event stamped with the current time.
    pub fn now(message: impl AsRef<str>) -> Self {
        Self::new(message, Utc::now().timestamp())
    }

    pub fn annotated_by(mut self, annotated_by: &str) -> Self {
        self.annotated_by = super::non_empty(Some(annotated_by));
        self
    }

    pub fn level(mut self, level: EventLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn instance_id(mut self, instance_id: &str) -> Self {
        self.instance_id = super::non_empty(Some(instance_id));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn event_epoch(&self) -> i64 {
        self.event_epoch
    }
}

/// Messages over 256 characters keep their first 252 characters plus `...`.
///
/// Counts `char`s, so multi-byte text is never split inside a code point.
pub fn truncate_message(message: &str) -> String {
    if message.chars().count() <= MAX_MESSAGE_CHARS {
        return message.to_string();
    }

    let mut truncated: String = message.chars().take(TRUNCATED_PREFIX_CHARS).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn short_messages_are_unchanged() {
        assert_eq!(truncate_message(""), "");
        assert_eq!(truncate_message("deployed"), "deployed");

        let exact = "a".repeat(256);
        assert_eq!(truncate_message(&exact), exact);
    }

    #[test]
    fn long_messages_are_truncated_with_ellipsis() {
        let long = "b".repeat(257);
        let truncated = truncate_message(&long);

        assert_eq!(truncated.chars().count(), 255);
        assert!(truncated.ends_with("..."));
        assert_eq!(&truncated[..252], &long[..252]);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let long = "é".repeat(300);
        let truncated = truncate_message(&long);

        assert_eq!(truncated.chars().count(), 255);
        assert!(truncated.starts_with(&"é".repeat(252)));
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn optional_fields_are_omitted() {
        let event = AnnotationEvent::new("restarted", 1_700_000_000);

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"message": "restarted", "event_epoch": 1_700_000_000})
        );
    }

    #[test]
    fn builder_sets_every_field() {
        let event = AnnotationEvent::new("disk full", 42)
            .annotated_by("ops-bot")
            .level(EventLevel::Error)
            .instance_id("i-1234");

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "message": "disk full",
                "annotated_by": "ops-bot",
                "level": "ERROR",
                "instance_id": "i-1234",
                "event_epoch": 42
            })
        );
    }

    #[test]
    fn empty_optional_strings_are_treated_as_absent() {
        let event = AnnotationEvent::new("noop", 1).annotated_by("").instance_id("");
        let value = serde_json::to_value(&event).unwrap();

        assert!(value.get("annotated_by").is_none());
        assert!(value.get("instance_id").is_none());
    }

    #[test]
    fn constructor_truncates_message() {
        let event = AnnotationEvent::new("x".repeat(1000), 1);
        assert_eq!(event.message().len(), 255);
    }
}
