// crates/rulecfn-core/src/core/template.rs
// ============================================================================
// Module: Template Document Types
// Description: Resource, output, policy, bundle, and template document shapes.
// Purpose: Give fragments and the compiled template a typed, stable wire form.
// Dependencies: crate::core::rule, serde, serde_json
// ============================================================================

//! ## Overview
//! These types mirror the infrastructure template format directly: key names
//! are serialized exactly as the provisioning engine expects them. Maps are
//! ordered by key so a compiled document always serializes identically.
//! Unknown keys in a pre-populated base document are preserved.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::rule::ParameterSpec;
use crate::core::rule::PolicyStatement;

// ============================================================================
// SECTION: Resource Types
// ============================================================================

/// Compute-unit resource type.
pub const FUNCTION_TYPE: &str = "AWS::Lambda::Function";
/// Invoke-permission resource type.
pub const PERMISSION_TYPE: &str = "AWS::Lambda::Permission";
/// Environment-injection custom resource type.
pub const ENVIRONMENT_TYPE: &str = "Custom::StreambotEnv";
/// Event rule resource type (pattern and schedule triggers).
pub const EVENT_RULE_TYPE: &str = "AWS::Events::Rule";
/// Pub/sub topic resource type.
pub const TOPIC_TYPE: &str = "AWS::SNS::Topic";
/// Subscriber identity resource type.
pub const USER_TYPE: &str = "AWS::IAM::User";
/// Subscriber credential resource type.
pub const ACCESS_KEY_TYPE: &str = "AWS::IAM::AccessKey";
/// Shared execution role resource type.
pub const ROLE_TYPE: &str = "AWS::IAM::Role";
/// Alarm resource type.
pub const ALARM_TYPE: &str = "AWS::CloudWatch::Alarm";
/// HTTP gateway resource type.
pub const REST_API_TYPE: &str = "AWS::ApiGateway::RestApi";
/// HTTP route resource type.
pub const ROUTE_TYPE: &str = "AWS::ApiGateway::Resource";
/// HTTP method resource type.
pub const METHOD_TYPE: &str = "AWS::ApiGateway::Method";
/// Gateway access key resource type.
pub const API_KEY_TYPE: &str = "AWS::ApiGateway::ApiKey";
/// Stage deployment resource type.
pub const DEPLOYMENT_TYPE: &str = "AWS::ApiGateway::Deployment";

// ============================================================================
// SECTION: Resource
// ============================================================================

/// A single template resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource type identifier.
    #[serde(rename = "Type")]
    pub kind: String,
    /// Resources that must be created first.
    #[serde(rename = "DependsOn", default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Value>,
    /// Resource properties.
    #[serde(rename = "Properties", default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
    /// Resource metadata.
    #[serde(rename = "Metadata", default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Additional resource attributes.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Resource {
    /// Creates a resource from a type and a JSON object of properties.
    ///
    /// Non-object property values are ignored.
    #[must_use]
    pub fn new(kind: &str, properties: Value) -> Self {
        let properties = match properties {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            kind: kind.to_string(),
            depends_on: None,
            properties,
            metadata: None,
            extra: BTreeMap::new(),
        }
    }

    /// Sets the `DependsOn` attribute.
    #[must_use]
    pub fn with_depends_on(mut self, depends_on: Value) -> Self {
        self.depends_on = Some(depends_on);
        self
    }

    /// Sets the `Metadata` attribute.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Returns true when this resource is an HTTP method trigger.
    #[must_use]
    pub fn is_gateway_method(&self) -> bool {
        self.kind == METHOD_TYPE
    }

    /// Returns true when this resource is a compute unit.
    #[must_use]
    pub fn is_function(&self) -> bool {
        self.kind == FUNCTION_TYPE
    }
}

// ============================================================================
// SECTION: Outputs
// ============================================================================

/// Template output declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    /// Output value expression.
    #[serde(rename = "Value")]
    pub value: Value,
    /// Additional output attributes.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Output {
    /// Creates an output for the given value expression.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self {
            value,
            extra: BTreeMap::new(),
        }
    }
}

// ============================================================================
// SECTION: Policies
// ============================================================================

/// Named inline policy attached to the shared execution role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Policy name.
    #[serde(rename = "PolicyName")]
    pub name: String,
    /// Policy document.
    #[serde(rename = "PolicyDocument")]
    pub document: PolicyDocument,
}

/// Inline policy document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDocument {
    /// Optional policy language version.
    #[serde(rename = "Version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Permission statements in declaration order.
    #[serde(rename = "Statement")]
    pub statements: Vec<PolicyStatement>,
}

// ============================================================================
// SECTION: Rule Bundle
// ============================================================================

/// Fragments contributed by one rule.
///
/// # Invariants
/// - Entries keep builder order; uniqueness is enforced by the compiler.
/// - `policy` is `None` when the rule declared no statements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleBundle {
    /// Namespaced rule name.
    pub name: String,
    /// Namespaced parameter declarations.
    #[serde(rename = "Parameters")]
    pub parameters: Vec<(String, ParameterSpec)>,
    /// Resources keyed by template identifier.
    #[serde(rename = "Resources")]
    pub resources: Vec<(String, Resource)>,
    /// Policy appended to the shared execution role.
    #[serde(rename = "Policy", skip_serializing_if = "Option::is_none")]
    pub policy: Option<Policy>,
    /// Outputs keyed by template identifier.
    #[serde(rename = "Outputs")]
    pub outputs: Vec<(String, Output)>,
}

// ============================================================================
// SECTION: Template Document
// ============================================================================

/// Infrastructure template document.
///
/// Used both as the (possibly pre-populated) base document and as the compiled
/// result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateDocument {
    /// Template format version.
    #[serde(rename = "AWSTemplateFormatVersion", default, skip_serializing_if = "Option::is_none")]
    pub format_version: Option<String>,
    /// Template description.
    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Template parameters.
    #[serde(rename = "Parameters", default)]
    pub parameters: BTreeMap<String, ParameterSpec>,
    /// Template resources.
    #[serde(rename = "Resources", default)]
    pub resources: BTreeMap<String, Resource>,
    /// Template outputs.
    #[serde(rename = "Outputs", default)]
    pub outputs: BTreeMap<String, Output>,
    /// Other top-level sections (`Mappings`, `Conditions`, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
