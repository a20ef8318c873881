// crates/rulecfn-core/src/fragments/policy.rs
// ============================================================================
// Module: Policy Fragments
// Description: Per-rule policy stanzas and the shared execution role.
// Purpose: Validate permission statements and aggregate them onto one role.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! A rule's statements become one named policy. All rule policies are
//! appended, in fold order, after a fixed base policy on the single execution
//! role shared by every compute unit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;

use crate::core::Policy;
use crate::core::PolicyDocument;
use crate::core::PolicyStatement;
use crate::core::Resource;
use crate::core::RuleConfig;
use crate::core::names::ALARM_TOPIC_KEY;
use crate::core::template::ROLE_TYPE;
use crate::fragments::BuildError;
use crate::fragments::is_empty_value;
use crate::fragments::to_json;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Name of the base policy every execution role carries.
pub const BASE_POLICY_NAME: &str = "basic";

/// Services allowed to assume the execution role.
const TRUSTED_SERVICES: [&str; 3] =
    ["lambda.amazonaws.com", "apigateway.amazonaws.com", "events.amazonaws.com"];

// ============================================================================
// SECTION: Rule Policy
// ============================================================================

/// Builds the policy stanza for `rule`.
///
/// Returns `Ok(None)` when the rule declares no statements. An empty statement
/// list still produces a (statement-less) policy.
///
/// # Errors
///
/// Returns [`BuildError::MissingName`] for an unnamed rule with statements
/// and [`BuildError::MissingField`] when a statement lacks `Effect`, a
/// resource selector, or an action selector.
pub fn policy(rule: &RuleConfig) -> Result<Option<Policy>, BuildError> {
    let Some(statements) = &rule.statements else {
        return Ok(None);
    };
    let name = rule.require_name("policy")?;
    for statement in statements {
        validate_statement(statement)?;
    }
    Ok(Some(Policy {
        name: name.to_string(),
        document: PolicyDocument {
            version: None,
            statements: statements.clone(),
        },
    }))
}

/// Checks that a statement carries its required selectors.
///
/// Empty strings, arrays, and objects count as missing.
fn validate_statement(statement: &PolicyStatement) -> Result<(), BuildError> {
    let missing = |field| BuildError::MissingField {
        context: "statement".to_string(),
        field,
    };
    if !present(statement.effect.as_ref()) {
        return Err(missing("Effect"));
    }
    if !present(statement.resource.as_ref()) && !present(statement.not_resource.as_ref()) {
        return Err(missing("Resource or NotResource"));
    }
    if !present(statement.action.as_ref()) && !present(statement.not_action.as_ref()) {
        return Err(missing("Action or NotAction"));
    }
    Ok(())
}

/// Returns true when a statement field holds a non-empty value.
fn present(value: Option<&Value>) -> bool {
    value.is_some_and(|value| !is_empty_value(value))
}

// ============================================================================
// SECTION: Execution Role
// ============================================================================

/// Returns the base policy granted to every compute unit.
#[must_use]
pub fn base_policy() -> Policy {
    Policy {
        name: BASE_POLICY_NAME.to_string(),
        document: PolicyDocument {
            version: None,
            statements: vec![
                PolicyStatement::allow(json!(["logs:*"]), json!("arn:aws:logs:*:*:*")),
                PolicyStatement::allow(
                    json!(["dynamodb:GetItem"]),
                    json!({
                        "Fn::Join": ["", [
                            "arn:aws:dynamodb:us-east-1:",
                            { "Ref": "AWS::AccountId" },
                            ":table/streambot-env*"
                        ]]
                    }),
                ),
                PolicyStatement::allow(json!(["sns:Publish"]), json!({ "Ref": ALARM_TOPIC_KEY })),
                PolicyStatement::allow(json!(["iam:SimulateCustomPolicy"]), json!("*")),
            ],
        },
    }
}

/// Builds the shared execution role carrying the base policy followed by
/// `policies` in the given order.
///
/// # Errors
///
/// Returns [`BuildError::Serialization`] when a policy cannot be rendered.
pub fn execution_role(policies: &[Policy]) -> Result<Resource, BuildError> {
    let trust: Vec<Value> = TRUSTED_SERVICES
        .iter()
        .map(|service| {
            json!({
                "Sid": "",
                "Effect": "Allow",
                "Principal": { "Service": service },
                "Action": "sts:AssumeRole",
            })
        })
        .collect();
    let mut attached = Vec::with_capacity(policies.len() + 1);
    attached.push(to_json(&base_policy())?);
    for policy in policies {
        attached.push(to_json(policy)?);
    }
    Ok(Resource::new(
        ROLE_TYPE,
        json!({
            "AssumeRolePolicyDocument": { "Statement": trust },
            "Path": "/",
            "Policies": attached,
        }),
    ))
}
