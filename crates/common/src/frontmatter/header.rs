use super::{FieldValue, Fields};

pub const DESCRIPTION: &str = "description";
pub const ACTIVATION: &str = "activation";
pub const GLOBS: &str = "globs";
pub const ALWAYS_APPLY: &str = "alwaysApply";
pub const TRIGGER: &str = "trigger";
pub const PRIORITY: &str = "priority";
pub const SINGLE_FILE: &str = "single_file";

/// Typed view over a parsed header.
///
/// The keys this crate branches on are lifted into fields; everything else
/// stays in `extra`, in original order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleHeader {
    pub description: Option<String>,
    /// Raw activation text. Validation turns it into an `Activation`.
    pub activation: Option<String>,
    pub globs: Option<String>,
    pub always_apply: Option<bool>,
    pub trigger: Option<String>,
    pub priority: Option<String>,
    pub single_file: Option<FieldValue>,
    pub extra: Fields,
}

impl RuleHeader {
    pub fn from_fields(fields: Fields) -> Self {
        let mut header = Self::default();
        for (key, value) in fields {
            match key.as_str() {
                DESCRIPTION => header.description = Some(value.into_text()),
                ACTIVATION => header.activation = Some(value.into_text()),
                GLOBS => header.globs = Some(value.into_text()),
                ALWAYS_APPLY => header.always_apply = value.as_bool(),
                TRIGGER => header.trigger = Some(value.into_text()),
                PRIORITY => header.priority = Some(value.into_text()),
                SINGLE_FILE => header.single_file = Some(value),
                _ => header.extra.insert(key, value),
            }
        }
        header
    }

    /// Parse a full document and lift its header.
    pub fn parse(content: &str) -> (Self, &str) {
        let parsed = super::parse_document(content);
        (Self::from_fields(parsed.fields), parsed.body)
    }

    /// True when nothing at all was present in the header.
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.activation.is_none()
            && self.globs.is_none()
            && self.always_apply.is_none()
            && self.trigger.is_none()
            && self.priority.is_none()
            && self.single_file.is_none()
            && self.extra.is_empty()
    }

    /// Globs with the `null` sentinel and surrounding whitespace removed.
    pub fn effective_globs(&self) -> Option<&str> {
        self.globs
            .as_deref()
            .map(str::trim)
            .filter(|globs| !globs.is_empty() && *globs != "null")
    }

    /// Description if present and not blank.
    pub fn effective_description(&self) -> Option<&str> {
        self.description.as_deref().filter(|description| !description.trim().is_empty())
    }
}
