// crates/rulecfn-core/src/fragments/pubsub.rs
// ============================================================================
// Module: Pub/Sub Fragments
// Description: Per-rule topic, publisher identity, credential, alarm topic.
// Purpose: Let external publishers fan messages into a rule's compute unit.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! A pub/sub rule gets its own topic subscribed by the compute unit, plus an
//! identity and access key that may publish to it. The alarm topic is shared
//! by every rule and delivers alarm notifications by email.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::json;

use crate::core::Resource;
use crate::core::RuleConfig;
use crate::core::names::ALARM_EMAIL_PARAMETER;
use crate::core::names::topic_key;
use crate::core::names::topic_user_key;
use crate::core::template::ACCESS_KEY_TYPE;
use crate::core::template::TOPIC_TYPE;
use crate::core::template::USER_TYPE;
use crate::fragments::BuildError;

// ============================================================================
// SECTION: Rule Topic
// ============================================================================

/// Builds the rule's topic, subscribed by its compute unit.
///
/// # Errors
///
/// Returns [`BuildError::MissingName`] when the rule has no name.
pub fn topic(rule: &RuleConfig) -> Result<Resource, BuildError> {
    let name = rule.require_name("topic")?;
    let topic_name = json!({ "Fn::Join": ["-", [{ "Ref": "AWS::StackName" }, name]] });
    Ok(Resource::new(
        TOPIC_TYPE,
        json!({
            "DisplayName": topic_name,
            "TopicName": topic_name,
            "Subscription": [{ "Endpoint": { "Fn::GetAtt": [name, "Arn"] }, "Protocol": "lambda" }],
        }),
    ))
}

/// Builds the identity allowed to publish to the rule's topic.
///
/// # Errors
///
/// Returns [`BuildError::MissingName`] when the rule has no name.
pub fn topic_user(rule: &RuleConfig) -> Result<Resource, BuildError> {
    let name = rule.require_name("topic user")?;
    Ok(Resource::new(
        USER_TYPE,
        json!({
            "Policies": [{
                "PolicyName": format!("{name}SNSTopicPolicy"),
                "PolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [
                        {
                            "Resource": [{ "Ref": topic_key(name) }],
                            "Action": ["sns:ListTopics", "sns:Publish"],
                            "Effect": "Allow"
                        },
                        {
                            "Resource": [{
                                "Fn::Join": ["", [
                                    "arn:aws:sns:",
                                    { "Ref": "AWS::Region" },
                                    ":",
                                    { "Ref": "AWS::AccountId" },
                                    ":*"
                                ]]
                            }],
                            "Action": ["sns:ListTopics"],
                            "Effect": "Allow"
                        }
                    ]
                }
            }]
        }),
    ))
}

/// Builds the access key credential of the rule's publisher identity.
///
/// # Errors
///
/// Returns [`BuildError::MissingName`] when the rule has no name.
pub fn topic_access_key(rule: &RuleConfig) -> Result<Resource, BuildError> {
    let name = rule.require_name("topic access key")?;
    Ok(Resource::new(ACCESS_KEY_TYPE, json!({ "UserName": { "Ref": topic_user_key(name) } })))
}

// ============================================================================
// SECTION: Alarm Topic
// ============================================================================

/// Builds the shared alarm-notification topic.
#[must_use]
pub fn alarm_topic() -> Resource {
    Resource::new(
        TOPIC_TYPE,
        json!({
            "TopicName": { "Ref": "AWS::StackName" },
            "Subscription": [{ "Endpoint": { "Ref": ALARM_EMAIL_PARAMETER }, "Protocol": "email" }],
        }),
    )
}
