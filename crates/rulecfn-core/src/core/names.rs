// crates/rulecfn-core/src/core/names.rs
// ============================================================================
// Module: Rule Naming
// Description: Namespacing of rule names and template key conventions.
// Purpose: Keep rules from different packages from colliding on short names.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The [`Namer`] prefixes a rule name with the package it was loaded from so
//! that two packages can ship a rule called `rootLogin` without clashing in
//! the compiled template. The package list is supplied explicitly at
//! construction time.
//!
//! The key helpers in this module define every template identifier derived
//! from a rule name. Those identifiers are part of the output contract and
//! must stay stable.

// ============================================================================
// SECTION: Namer
// ============================================================================

/// Derives namespaced rule identifiers from module paths.
///
/// # Invariants
/// - Packages are matched in the order they were supplied; the first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namer {
    /// Known external package names.
    packages: Vec<String>,
}

impl Namer {
    /// Creates a namer over the given package names.
    #[must_use]
    pub fn new<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            packages: packages.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the configured package names.
    #[must_use]
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// Returns the first package whose name occurs in `module_path`,
    /// compared case-insensitively.
    #[must_use]
    pub fn matching_package(&self, module_path: &str) -> Option<&str> {
        let haystack = module_path.to_lowercase();
        self.packages
            .iter()
            .find(|package| !package.is_empty() && haystack.contains(&package.to_lowercase()))
            .map(String::as_str)
    }

    /// Namespaces `name` with the package matched from `module_path`.
    ///
    /// Returns `name` unchanged when no package matches.
    #[must_use]
    pub fn namespace(&self, name: &str, module_path: &str) -> String {
        match self.matching_package(module_path) {
            Some(package) => format!("{}{name}", strip_punctuation(package)),
            None => name.to_string(),
        }
    }
}

/// Removes every character that is not an ASCII letter or digit.
#[must_use]
pub fn strip_punctuation(value: &str) -> String {
    value.chars().filter(char::is_ascii_alphanumeric).collect()
}

// ============================================================================
// SECTION: Template Keys
// ============================================================================

/// Shared execution role key.
pub const ROLE_KEY: &str = "LambdaCfnRole";
/// Shared alarm-notification topic key.
pub const ALARM_TOPIC_KEY: &str = "LambdaCfnAlarmSNSTopic";
/// Shared HTTP gateway key.
pub const API_GATEWAY_KEY: &str = "ApiGateway";
/// Shared gateway access key.
pub const API_KEY_KEY: &str = "ApiKey";
/// Gateway latency alarm key.
pub const API_LATENCY_ALARM_KEY: &str = "ApiLatencyAlarm";
/// Gateway client-error alarm key.
pub const API_4XX_ALARM_KEY: &str = "Api4xxAlarm";
/// Gateway request-count alarm key.
pub const API_COUNT_ALARM_KEY: &str = "ApiCountAlarm";
/// Output exposing the gateway access key.
pub const API_KEY_OUTPUT_KEY: &str = "APIKey";
/// Prefix of the stage deployment key.
pub const DEPLOYMENT_KEY_PREFIX: &str = "ApiDeployment";

/// Code bucket parameter.
pub const CODE_BUCKET_PARAMETER: &str = "CodeS3Bucket";
/// Code prefix parameter.
pub const CODE_PREFIX_PARAMETER: &str = "CodeS3Prefix";
/// Code revision parameter.
pub const REVISION_PARAMETER: &str = "GitSha";
/// Environment service token parameter.
pub const SERVICE_TOKEN_PARAMETER: &str = "StreambotEnv";
/// Alarm destination email parameter.
pub const ALARM_EMAIL_PARAMETER: &str = "AlarmEmail";

/// Key of the invoke permission for `name`.
#[must_use]
pub fn permission_key(name: &str) -> String {
    format!("{name}Permission")
}

/// Key of the environment-injection resource for `name`.
#[must_use]
pub fn environment_key(name: &str) -> String {
    format!("StreambotEnv{name}")
}

/// Key of the pub/sub topic for `name`.
#[must_use]
pub fn topic_key(name: &str) -> String {
    format!("{name}SNSTopic")
}

/// Key of the pub/sub subscriber identity for `name`.
#[must_use]
pub fn topic_user_key(name: &str) -> String {
    format!("{name}SNSUser")
}

/// Key of the pub/sub subscriber credential for `name`.
#[must_use]
pub fn topic_access_key_key(name: &str) -> String {
    format!("{name}SNSUserAccessKey")
}

/// Key of the pattern trigger for `name`.
#[must_use]
pub fn event_rule_key(name: &str) -> String {
    format!("{name}EventRule")
}

/// Key of the scheduled trigger for `name`.
#[must_use]
pub fn scheduled_rule_key(name: &str) -> String {
    format!("{name}ScheduledRule")
}

/// Key of the HTTP route for `name`.
#[must_use]
pub fn gateway_resource_key(name: &str) -> String {
    format!("{name}GatewayRuleResource")
}

/// Key of the HTTP method for `name`.
#[must_use]
pub fn gateway_method_key(name: &str) -> String {
    format!("{name}GatewayRuleMethod")
}

/// Key of the alarm of `kind` for `name`.
#[must_use]
pub fn alarm_key(name: &str, kind: &str) -> String {
    format!("{name}Alarm{kind}")
}

/// Key of the stage deployment for a revision suffix.
#[must_use]
pub fn deployment_key(revision: &str) -> String {
    format!("{DEPLOYMENT_KEY_PREFIX}{revision}")
}
