// Activation model: when a rule applies, and how that maps onto editor fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::frontmatter::RuleHeader;

/// Canonical activation policy of a rule document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Activation {
    Always,
    Glob,
    AgentRequested,
    Manual,
}

impl Activation {
    pub const ALL: [Activation; 4] =
        [Activation::Always, Activation::Glob, Activation::AgentRequested, Activation::Manual];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Glob => "glob",
            Self::AgentRequested => "agent-requested",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Activation {
    type Err = ActivationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "always" => Ok(Self::Always),
            "glob" => Ok(Self::Glob),
            "agent-requested" => Ok(Self::AgentRequested),
            "manual" => Ok(Self::Manual),
            other => Err(ActivationError::InvalidActivation(other.to_string())),
        }
    }
}

/// Windsurf-style trigger value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Always,
    Glob,
    Model,
    Manual,
}

impl Trigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Glob => "glob",
            Self::Model => "model",
            Self::Manual => "manual",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "always" => Some(Self::Always),
            "glob" => Some(Self::Glob),
            "model" => Some(Self::Model),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }

    pub fn activation(self) -> Activation {
        match self {
            Self::Always => Activation::Always,
            Self::Glob => Activation::Glob,
            Self::Model => Activation::AgentRequested,
            Self::Manual => Activation::Manual,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActivationError {
    #[error(
        "missing required 'activation' field; must be one of: always, glob, agent-requested, manual"
    )]
    MissingActivation,

    #[error(
        "invalid activation type: {0}; must be one of: always, glob, agent-requested, manual"
    )]
    InvalidActivation(String),

    #[error("activation: glob requires non-empty globs: field")]
    GlobRequired,

    #[error("activation: {0} should not have globs field")]
    GlobsNotAllowed(Activation),
}

/// Editor-facing fields derived from `(activation, globs)`. Never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorFields {
    pub always_apply: bool,
    pub globs: String,
    pub trigger: Trigger,
}

/// A validated activation together with its globs (empty unless `Glob`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationRule {
    pub activation: Activation,
    pub globs: String,
}

impl ActivationRule {
    pub fn editor_fields(&self) -> EditorFields {
        match self.activation {
            Activation::Always => {
                EditorFields { always_apply: true, globs: String::new(), trigger: Trigger::Always }
            }
            Activation::Glob => EditorFields {
                always_apply: false,
                globs: self.globs.trim().to_string(),
                trigger: Trigger::Glob,
            },
            Activation::AgentRequested => {
                EditorFields { always_apply: false, globs: String::new(), trigger: Trigger::Model }
            }
            Activation::Manual => {
                EditorFields { always_apply: false, globs: String::new(), trigger: Trigger::Manual }
            }
        }
    }
}

/// Check the activation/globs combination of a header.
pub fn validate(header: &RuleHeader) -> Result<ActivationRule, ActivationError> {
    let raw = header
        .activation
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(ActivationError::MissingActivation)?;
    let activation: Activation = raw.parse()?;
    check_globs(activation, header.effective_globs())
}

/// Derive the editor field set for an activation name and globs.
pub fn derive_editor_fields(
    activation: &str,
    globs: Option<&str>,
) -> Result<EditorFields, ActivationError> {
    let activation: Activation = activation.parse()?;
    let globs = globs.map(str::trim).filter(|globs| !globs.is_empty());
    let rule = match activation {
        Activation::Glob => check_globs(activation, globs)?,
        _ => ActivationRule { activation, globs: String::new() },
    };
    Ok(rule.editor_fields())
}

fn check_globs(
    activation: Activation,
    globs: Option<&str>,
) -> Result<ActivationRule, ActivationError> {
    match (activation, globs) {
        (Activation::Glob, None) => Err(ActivationError::GlobRequired),
        (Activation::Glob, Some(globs)) => Ok(ActivationRule { activation, globs: globs.to_string() }),
        (_, Some(_)) => Err(ActivationError::GlobsNotAllowed(activation)),
        (_, None) => Ok(ActivationRule { activation, globs: String::new() }),
    }
}

/// Infer an activation for a header written with the older
/// `alwaysApply` / `globs` / `trigger` fields.
///
/// Precedence: `alwaysApply: true`, then non-blank globs, then
/// `trigger: manual`, otherwise agent-requested. Only `description` is
/// carried over besides the derived fields.
pub fn convert_legacy(header: &RuleHeader) -> RuleHeader {
    let (activation, globs) = if header.always_apply == Some(true) {
        (Activation::Always, None)
    } else if let Some(globs) = header.effective_globs() {
        (Activation::Glob, Some(globs.to_string()))
    } else if header.trigger.as_deref().map(str::trim) == Some("manual") {
        (Activation::Manual, None)
    } else {
        (Activation::AgentRequested, None)
    };

    RuleHeader {
        description: header.description.clone(),
        activation: Some(activation.as_str().to_string()),
        globs,
        ..RuleHeader::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::parse_fields;

    fn header(text: &str) -> RuleHeader {
        RuleHeader::from_fields(parse_fields(text))
    }

    #[test]
    fn missing_activation_is_rejected() {
        assert_eq!(validate(&header("description: Test rule")), Err(ActivationError::MissingActivation));
        assert_eq!(validate(&header("activation: ")), Err(ActivationError::MissingActivation));
    }

    #[test]
    fn unknown_activation_is_rejected() {
        assert_eq!(
            validate(&header("activation: invalid")),
            Err(ActivationError::InvalidActivation("invalid".into()))
        );
    }

    #[test]
    fn glob_requires_globs() {
        assert_eq!(validate(&header("activation: glob")), Err(ActivationError::GlobRequired));
        assert_eq!(
            validate(&header("activation: glob\nglobs: \"  \"")),
            Err(ActivationError::GlobRequired)
        );
    }

    #[test]
    fn globs_rejected_for_non_glob_activations() {
        for activation in ["always", "agent-requested", "manual"] {
            let result = validate(&header(&format!("activation: {activation}\nglobs: \"**/*.ts\"")));
            assert!(
                matches!(result, Err(ActivationError::GlobsNotAllowed(found)) if found.as_str() == activation),
                "{activation} with globs should fail, got {result:?}"
            );
        }
    }

    #[test]
    fn error_messages_name_the_problem() {
        assert_eq!(
            ActivationError::GlobsNotAllowed(Activation::Always).to_string(),
            "activation: always should not have globs field"
        );
        assert!(ActivationError::InvalidActivation("invalid".into())
            .to_string()
            .starts_with("invalid activation type: invalid"));
    }

    #[test]
    fn valid_combinations_pass() {
        let rule = validate(&header("activation: glob\nglobs: \"**/*.ts,**/*.tsx\"")).unwrap();
        assert_eq!(rule.activation, Activation::Glob);
        assert_eq!(rule.globs, "**/*.ts,**/*.tsx");

        let rule = validate(&header("activation: manual\nglobs: ")).unwrap();
        assert_eq!(rule.activation, Activation::Manual);
        assert_eq!(rule.globs, "");
    }

    #[test]
    fn derivation_table() {
        let cases = [
            ("always", None, true, "", Trigger::Always),
            ("glob", Some(" **/*.ts "), false, "**/*.ts", Trigger::Glob),
            ("agent-requested", None, false, "", Trigger::Model),
            ("manual", None, false, "", Trigger::Manual),
        ];
        for (activation, globs, always_apply, expected_globs, trigger) in cases {
            let fields = derive_editor_fields(activation, globs).unwrap();
            assert_eq!(fields.always_apply, always_apply, "{activation}");
            assert_eq!(fields.globs, expected_globs, "{activation}");
            assert_eq!(fields.trigger, trigger, "{activation}");
        }
    }

    #[test]
    fn derivation_rejects_unknown_and_globless_glob() {
        assert_eq!(
            derive_editor_fields("invalid", None),
            Err(ActivationError::InvalidActivation("invalid".into()))
        );
        assert_eq!(derive_editor_fields("glob", None), Err(ActivationError::GlobRequired));
    }

    #[test]
    fn trigger_maps_back_to_activation() {
        for activation in Activation::ALL {
            let rule = ActivationRule {
                activation,
                globs: if activation == Activation::Glob { "*.rs".into() } else { String::new() },
            };
            assert_eq!(rule.editor_fields().trigger.activation(), activation);
        }
    }

    #[test]
    fn legacy_always_apply_wins() {
        let converted = convert_legacy(&header("description: d\nalwaysApply: true\nglobs: *.ts"));
        assert_eq!(converted.activation.as_deref(), Some("always"));
        assert_eq!(converted.globs, None);
        assert_eq!(converted.description.as_deref(), Some("d"));
    }

    #[test]
    fn legacy_globs_become_glob_activation() {
        let converted = convert_legacy(&header("alwaysApply: false\nglobs: **/*.py"));
        assert_eq!(converted.activation.as_deref(), Some("glob"));
        assert_eq!(converted.globs.as_deref(), Some("**/*.py"));
        assert!(validate(&converted).is_ok());
    }

    #[test]
    fn legacy_null_globs_fall_through() {
        let converted = convert_legacy(&header("globs: null\ntrigger: manual"));
        assert_eq!(converted.activation.as_deref(), Some("manual"));
    }

    #[test]
    fn legacy_default_is_agent_requested() {
        let converted = convert_legacy(&header("description: only a description"));
        assert_eq!(converted.activation.as_deref(), Some("agent-requested"));
        assert_eq!(converted.description.as_deref(), Some("only a description"));
    }
}
