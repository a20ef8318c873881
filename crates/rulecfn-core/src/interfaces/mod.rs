// crates/rulecfn-core/src/interfaces/mod.rs
// ============================================================================
// Module: Rulecfn Interfaces
// Description: Collaborator contracts for rule sources and notification delivery.
// Purpose: Keep file discovery and message delivery outside the compiler core.
// Dependencies: crate::core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The compiler core performs no I/O. Rule definitions arrive through a
//! [`RuleSource`], and alarm messages leave through a [`NotificationSender`].
//! In-memory implementations of both are provided for tests and dry runs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::RuleConfig;
use crate::core::names::ALARM_TOPIC_KEY;
use crate::fragments::BuildError;

// ============================================================================
// SECTION: Rule Source
// ============================================================================

/// A rule config together with the module path it was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDefinition {
    /// Module path used for namespacing and as the source locator.
    pub module_path: String,
    /// Declared rule config.
    pub config: RuleConfig,
}

impl RuleDefinition {
    /// Creates a definition.
    #[must_use]
    pub fn new(module_path: impl Into<String>, config: RuleConfig) -> Self {
        Self {
            module_path: module_path.into(),
            config,
        }
    }
}

/// Rule source errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SourceError {
    /// A rule definition could not be read.
    #[error("rule source io error: {0}")]
    Io(String),
    /// A rule definition could not be decoded.
    #[error("rule definition {path} is invalid: {source}")]
    Decode {
        /// Module path of the offending definition.
        path: String,
        /// Decoding failure.
        source: BuildError,
    },
}

/// Supplies rule definitions in a stable order.
pub trait RuleSource {
    /// Returns every rule definition in compile order.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when a definition cannot be read or decoded.
    fn rules(&self) -> Result<Vec<RuleDefinition>, SourceError>;
}

/// Rule source backed by an in-memory list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticRuleSource {
    /// Definitions in compile order.
    definitions: Vec<RuleDefinition>,
}

impl StaticRuleSource {
    /// Creates a source over `definitions`.
    #[must_use]
    pub const fn new(definitions: Vec<RuleDefinition>) -> Self {
        Self {
            definitions,
        }
    }
}

impl RuleSource for StaticRuleSource {
    fn rules(&self) -> Result<Vec<RuleDefinition>, SourceError> {
        Ok(self.definitions.clone())
    }
}

/// Decodes a rule definition document: one rule object or an array of them.
///
/// # Errors
///
/// Returns [`BuildError::InvalidShape`] when the document is neither, or when
/// an element fails to decode.
pub fn decode_rule_set(value: Value) -> Result<Vec<RuleConfig>, BuildError> {
    match value {
        Value::Array(items) => items.into_iter().map(RuleConfig::from_json).collect(),
        Value::Object(_) => Ok(vec![RuleConfig::from_json(value)?]),
        _ => Err(BuildError::InvalidShape(
            "rule definitions must be an object or an array of objects".to_string(),
        )),
    }
}

// ============================================================================
// SECTION: Notifications
// ============================================================================

/// Alarm or status message raised by rule logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Message subject line.
    pub subject: String,
    /// Human-readable summary placed before the event dump.
    pub summary: String,
    /// Triggering event, rendered as pretty JSON.
    pub event: Value,
}

/// Publish call handed to a notification transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PublishRequest {
    /// Destination topic identifier.
    pub topic_arn: String,
    /// Message subject line.
    pub subject: String,
    /// Message body.
    pub message: String,
}

impl Notification {
    /// Renders the publish call for `topic_arn`.
    ///
    /// The body is the summary, a blank line, then the event as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Render`] when the event cannot be serialized.
    pub fn publish_request(
        &self,
        topic_arn: impl Into<String>,
    ) -> Result<PublishRequest, NotifyError> {
        let event = serde_json::to_string_pretty(&self.event)
            .map_err(|err| NotifyError::Render(err.to_string()))?;
        Ok(PublishRequest {
            topic_arn: topic_arn.into(),
            subject: self.subject.clone(),
            message: format!("{}\n\n{event}", self.summary),
        })
    }
}

/// Notification delivery errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The alarm topic variable is not set.
    #[error("notification topic variable {0} is not set")]
    MissingTopic(&'static str),
    /// The message could not be rendered.
    #[error("notification render error: {0}")]
    Render(String),
    /// The transport rejected the message.
    #[error("notification transport error: {0}")]
    Transport(String),
}

/// Delivers publish calls to a notification transport.
pub trait NotificationSender {
    /// Publishes one message and returns the transport's message identifier.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when delivery fails.
    fn publish(&self, request: PublishRequest) -> Result<String, NotifyError>;
}

/// Sends `notification` to the alarm topic named in `vars`.
///
/// # Errors
///
/// Returns [`NotifyError::MissingTopic`] when no alarm topic variable is
/// present, or any error raised by rendering or the sender.
pub fn notify<'a, S, I>(
    sender: &S,
    vars: I,
    notification: &Notification,
) -> Result<String, NotifyError>
where
    S: NotificationSender + ?Sized,
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let topic_arn = vars
        .into_iter()
        .find(|(name, value)| *name == ALARM_TOPIC_KEY && !value.is_empty())
        .map(|(_, value)| value)
        .ok_or(NotifyError::MissingTopic(ALARM_TOPIC_KEY))?;
    sender.publish(notification.publish_request(topic_arn)?)
}

/// Sender that records publish calls instead of delivering them.
#[derive(Debug, Default)]
pub struct RecordingSender {
    /// Recorded calls in publish order.
    sent: Mutex<Vec<PublishRequest>>,
}

impl RecordingSender {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded calls.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Transport`] when the recorder lock is poisoned.
    pub fn sent(&self) -> Result<Vec<PublishRequest>, NotifyError> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .map_err(|_| NotifyError::Transport("recorder lock poisoned".to_string()))
    }
}

impl NotificationSender for RecordingSender {
    fn publish(&self, request: PublishRequest) -> Result<String, NotifyError> {
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| NotifyError::Transport("recorder lock poisoned".to_string()))?;
        sent.push(request);
        Ok(format!("recorded-{}", sent.len()))
    }
}
