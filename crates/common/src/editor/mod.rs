// Editor transforms: canonical rule documents to and from editor rule files.
//
// Both directions are one generic driver parameterized by an `EditorProfile`.
// Profiles supply the header layout, link conventions and the reverse
// activation mapping; the driver owns validation and ordering of the steps.

pub mod canonical;
mod cursor;
mod windsurf;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activation::{self, convert_legacy, Activation, ActivationError, ActivationRule};
use crate::frontmatter::RuleHeader;
use crate::links::{resolve_placeholders, rewrite_link_targets};

pub use cursor::Cursor;
pub use windsurf::Windsurf;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error(transparent)]
    Activation(#[from] ActivationError),

    #[error("body is empty after transform")]
    EmptyBodyAfterTransform,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported editor: {0}; must be one of: cursor, windsurf")]
pub struct UnsupportedEditor(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Editor {
    Cursor,
    Windsurf,
}

impl Editor {
    pub const ALL: [Editor; 2] = [Editor::Cursor, Editor::Windsurf];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cursor => "cursor",
            Self::Windsurf => "windsurf",
        }
    }

    pub fn profile(self) -> &'static dyn EditorProfile {
        match self {
            Self::Cursor => &Cursor,
            Self::Windsurf => &Windsurf,
        }
    }
}

impl fmt::Display for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Editor {
    type Err = UnsupportedEditor;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cursor" => Ok(Self::Cursor),
            "windsurf" => Ok(Self::Windsurf),
            _ => Err(UnsupportedEditor(value.to_string())),
        }
    }
}

const DESCRIPTION_INDENT: &str = "  ";

/// Everything that differs between editors.
pub trait EditorProfile: Send + Sync {
    /// Editor settings directory relative to a project root.
    fn editor_dir(&self) -> &'static str;

    /// Rules directory relative to a project root.
    fn rules_dir(&self) -> &'static str;

    /// File extension of rule files, without the dot.
    fn extension(&self) -> &'static str;

    /// `(token, replacement)` for the body placeholder.
    fn placeholder(&self) -> (&'static str, &'static str);

    fn forward_link(&self, target: &str) -> Option<String>;

    fn reverse_link(&self, target: &str, project_basename: Option<&str>) -> Option<String>;

    /// Header block including the closing delimiter line.
    fn serialize_header(&self, description: &str, rule: &ActivationRule) -> String;

    /// Text between the header and the body.
    fn body_gap(&self) -> &'static str;

    /// Map the editor's native header fields back to an activation.
    fn activation_of(&self, header: &RuleHeader) -> Activation;
}

/// Continuation lines of a multi-line description are indented so the
/// parser never reads them as entries or as the closing delimiter.
pub(crate) fn push_description(out: &mut String, description: &str) {
    out.push_str("description: ");
    if !description.trim().is_empty() {
        let mut lines = description.lines();
        if let Some(first) = lines.next() {
            out.push_str(first);
        }
        for line in lines {
            out.push('\n');
            if !line.trim().is_empty() {
                out.push_str(DESCRIPTION_INDENT);
                out.push_str(line);
            }
        }
    }
    out.push('\n');
}

/// Canonical document → editor rule file.
///
/// A header without `activation` goes through legacy conversion first; a
/// document without any header fails validation.
pub fn to_editor_format(editor: Editor, source: &str) -> Result<String, TransformError> {
    let profile = editor.profile();
    let (mut header, body) = RuleHeader::parse(source);
    if !header.is_empty() && header.activation.is_none() {
        header = convert_legacy(&header);
    }
    let rule = activation::validate(&header)?;

    let body = rewrite_link_targets(body, |target| profile.forward_link(target));
    let (token, prefix) = profile.placeholder();
    let body = resolve_placeholders(&body, token, prefix);

    let description = header.description.as_deref().unwrap_or_default();
    let mut out = profile.serialize_header(description, &rule);
    out.push_str(profile.body_gap());
    out.push_str(&body);
    Ok(out)
}

/// Editor rule file → canonical document.
///
/// `master_description` replaces a blank editor description. An empty body is
/// refused rather than written.
pub fn from_editor_format(
    editor: Editor,
    content: &str,
    project_basename: Option<&str>,
    master_description: Option<&str>,
) -> Result<String, TransformError> {
    let profile = editor.profile();
    let (header, body) = RuleHeader::parse(content);
    let body = body.strip_prefix(profile.body_gap()).unwrap_or(body);
    let body = rewrite_link_targets(body, |target| profile.reverse_link(target, project_basename));

    if body.trim().is_empty() {
        return Err(TransformError::EmptyBodyAfterTransform);
    }

    let description = header
        .effective_description()
        .or(master_description.filter(|description| !description.trim().is_empty()))
        .unwrap_or_default();
    let activation = profile.activation_of(&header);
    let globs = match activation {
        Activation::Glob => header.effective_globs().unwrap_or_default(),
        _ => "",
    };

    Ok(canonical::dump(description, activation, globs, &body))
}
