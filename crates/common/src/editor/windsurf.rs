// Windsurf: `.windsurf/rules/**/*.md`, `trigger` / `description` / `globs`.

use super::{push_description, EditorProfile};
use crate::activation::{Activation, ActivationRule, Trigger};
use crate::frontmatter::{RuleHeader, DELIMITER};
use crate::links;

#[derive(Debug, Clone, Copy, Default)]
pub struct Windsurf;

impl EditorProfile for Windsurf {
    fn editor_dir(&self) -> &'static str {
        ".windsurf"
    }

    fn rules_dir(&self) -> &'static str {
        ".windsurf/rules"
    }

    fn extension(&self) -> &'static str {
        "md"
    }

    fn placeholder(&self) -> (&'static str, &'static str) {
        (links::WINDSURF_PLACEHOLDER, links::WINDSURF_RULES_PREFIX)
    }

    fn forward_link(&self, target: &str) -> Option<String> {
        links::windsurf_forward_target(target)
    }

    fn reverse_link(&self, target: &str, _project_basename: Option<&str>) -> Option<String> {
        links::windsurf_reverse_target(target)
    }

    fn serialize_header(&self, description: &str, rule: &ActivationRule) -> String {
        let fields = rule.editor_fields();

        let mut out = String::from(DELIMITER);
        out.push_str("\ntrigger: ");
        out.push_str(fields.trigger.as_str());
        out.push('\n');
        push_description(&mut out, description);
        out.push_str("globs: ");
        out.push_str(&fields.globs);
        out.push('\n');
        out.push_str(DELIMITER);
        out.push('\n');
        out
    }

    fn body_gap(&self) -> &'static str {
        ""
    }

    /// Absent trigger means Windsurf's default (model); unknown values fall
    /// back to manual.
    fn activation_of(&self, header: &RuleHeader) -> Activation {
        match header.trigger.as_deref() {
            None => Activation::AgentRequested,
            Some(trigger) => Trigger::parse(trigger)
                .map(Trigger::activation)
                .unwrap_or(Activation::Manual),
        }
    }
}
