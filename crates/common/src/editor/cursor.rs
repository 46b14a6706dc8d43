// Cursor: `.cursor/rules/**/*.mdc`, `description` / `globs` / `alwaysApply`.

use tracing::warn;

use super::{push_description, EditorProfile};
use crate::activation::{Activation, ActivationRule, Trigger};
use crate::frontmatter::{RuleHeader, DELIMITER};
use crate::links;

#[derive(Debug, Clone, Copy, Default)]
pub struct Cursor;

impl EditorProfile for Cursor {
    fn editor_dir(&self) -> &'static str {
        ".cursor"
    }

    fn rules_dir(&self) -> &'static str {
        ".cursor/rules"
    }

    fn extension(&self) -> &'static str {
        "mdc"
    }

    fn placeholder(&self) -> (&'static str, &'static str) {
        (links::CURSOR_PLACEHOLDER, links::CURSOR_RULES_PREFIX)
    }

    fn forward_link(&self, target: &str) -> Option<String> {
        links::cursor_forward_target(target)
    }

    fn reverse_link(&self, target: &str, project_basename: Option<&str>) -> Option<String> {
        links::cursor_reverse_target(target, project_basename)
    }

    /// Manual rules go out without a description; that is how Cursor tells
    /// them apart from agent-requested ones.
    fn serialize_header(&self, description: &str, rule: &ActivationRule) -> String {
        let fields = rule.editor_fields();
        if reads_back_as_manual(description, rule) {
            warn!("agent-requested rule without a description will read back from Cursor as manual");
        }
        let description = if fields.trigger == Trigger::Manual { "" } else { description };

        let mut out = String::from(DELIMITER);
        out.push('\n');
        push_description(&mut out, description);
        match fields.trigger {
            Trigger::Glob => {
                out.push_str("globs: ");
                out.push_str(&fields.globs);
                out.push('\n');
            }
            _ => {
                out.push_str("globs: \nalwaysApply: ");
                out.push_str(if fields.always_apply { "true" } else { "false" });
                out.push('\n');
            }
        }
        out.push_str(DELIMITER);
        out.push('\n');
        out
    }

    fn body_gap(&self) -> &'static str {
        "\n"
    }

    fn activation_of(&self, header: &RuleHeader) -> Activation {
        if header.always_apply == Some(true) {
            Activation::Always
        } else if header.effective_globs().is_some() {
            Activation::Glob
        } else if header.always_apply == Some(false) && header.effective_description().is_none() {
            Activation::Manual
        } else {
            Activation::AgentRequested
        }
    }
}

/// Cursor only tells manual from agent-requested by the description, so a
/// blank one loses the distinction.
pub(crate) fn reads_back_as_manual(description: &str, rule: &ActivationRule) -> bool {
    rule.activation == Activation::AgentRequested && description.trim().is_empty()
}
