// Single-file aggregation: fold always-on rules into one instructions file
// per target, plus one file per `section:<path>` bucket.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use pulldown_cmark::{Event, Parser, Tag};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activation::{self, ActivationError};
use crate::frontmatter::{FieldValue, RuleHeader};
use crate::links::strip_rule_links;
use crate::path::{normalize_section_path, section_title, spaced, SectionPathError};

/// Priority of a rule file without a numeric prefix.
pub const DEFAULT_PRIORITY: u32 = 999;

const SECTION_PREFIX: &str = "section:";
const RULE_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("{}: {source}", path.display())]
    Invalid { path: PathBuf, source: ActivationError },

    #[error("{}: {source}", path.display())]
    SectionPath { path: PathBuf, source: SectionPathError },
}

impl AggregateError {
    pub fn path(&self) -> &Path {
        match self {
            Self::Invalid { path, .. } | Self::SectionPath { path, .. } => path,
        }
    }
}

/// Where a document goes in single-file mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingleFileDirective {
    Off,
    Skip,
    Main,
    Section(String),
}

impl SingleFileDirective {
    pub fn parse(value: Option<&FieldValue>) -> Result<Self, SectionPathError> {
        let text = match value {
            None | Some(FieldValue::Bool(false)) => return Ok(Self::Off),
            Some(FieldValue::Bool(true)) => return Ok(Self::Main),
            Some(FieldValue::Text(text)) => text.trim(),
        };

        if let Some(section) = text.strip_prefix(SECTION_PREFIX) {
            return normalize_section_path(section).map(Self::Section);
        }
        Ok(match text {
            "true" => Self::Main,
            "skip" => Self::Skip,
            _ => Self::Off,
        })
    }
}

/// One single-file output flavour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputTarget {
    pub file_name: String,
    #[serde(default)]
    pub preamble: Option<String>,
    /// Section file heading; `{title}` becomes the title-cased last segment.
    #[serde(default = "default_section_heading")]
    pub section_heading: String,
}

fn default_section_heading() -> String {
    "{title} Instructions".to_string()
}

impl OutputTarget {
    pub fn claude() -> Self {
        Self {
            file_name: "CLAUDE.md".to_string(),
            preamble: Some(
                "# CLAUDE.md\n\nThis file provides guidance to Claude Code (claude.ai/code) when working with code in this repository.\n\n"
                    .to_string(),
            ),
            section_heading: "{title} Instructions for Claude Code".to_string(),
        }
    }

    pub fn conventions() -> Self {
        Self {
            file_name: "CONVENTIONS.md".to_string(),
            preamble: None,
            section_heading: default_section_heading(),
        }
    }

    pub fn defaults() -> Vec<Self> {
        vec![Self::claude(), Self::conventions()]
    }
}

/// A canonical rule file as read from disk.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub content: String,
}

/// Rendered outputs. Section keys are normalized section paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    pub main: String,
    pub sections: BTreeMap<String, String>,
}

#[derive(Debug)]
struct Entry {
    name: String,
    priority: u32,
    description: String,
    body: String,
}

fn priority_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d{1,2})-").expect("priority pattern should compile"))
}

/// Leading one- or two-digit prefix followed by `-`: `05-core.md` → 5.
pub fn priority_from_file_name(file_name: &str) -> u32 {
    priority_pattern()
        .captures(file_name)
        .and_then(|captures| captures[1].parse().ok())
        .unwrap_or(DEFAULT_PRIORITY)
}

/// Select, order and render the documents for one target.
///
/// Documents qualify when `activation` is `always` and the `single_file`
/// directive routes them to the main file or a section. A qualifying document
/// that fails validation aborts the aggregation.
pub fn aggregate(
    documents: &[SourceDocument],
    target: &OutputTarget,
) -> Result<Aggregation, AggregateError> {
    let mut main: Vec<Entry> = Vec::new();
    let mut sections: BTreeMap<String, Vec<Entry>> = BTreeMap::new();

    for document in documents {
        let (header, body) = RuleHeader::parse(&document.content);
        let directive = SingleFileDirective::parse(header.single_file.as_ref()).map_err(|source| {
            AggregateError::SectionPath { path: document.path.clone(), source }
        })?;
        if matches!(directive, SingleFileDirective::Off | SingleFileDirective::Skip) {
            continue;
        }
        if header.activation.as_deref().map(str::trim) != Some("always") {
            continue;
        }
        activation::validate(&header)
            .map_err(|source| AggregateError::Invalid { path: document.path.clone(), source })?;

        let file_name = document
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let entry = Entry {
            name: file_name.strip_suffix(".md").unwrap_or(&file_name).to_string(),
            priority: priority_from_file_name(&file_name),
            description: header.description.clone().unwrap_or_default(),
            body: strip_rule_links(body),
        };

        match directive {
            SingleFileDirective::Section(section) => sections.entry(section).or_default().push(entry),
            _ => main.push(entry),
        }
    }

    main.sort_by_key(|entry| entry.priority);

    let mut out = String::new();
    if let Some(preamble) = &target.preamble {
        out.push_str(preamble);
        if !sections.is_empty() {
            out.push_str("## Conditional Instructions\n\n");
            for section in sections.keys() {
                out.push_str(&format!(
                    "- When working with {}, consult `/{section}/{}` for additional instructions.\n",
                    spaced(section),
                    target.file_name
                ));
            }
            out.push('\n');
        }
        if !main.is_empty() {
            out.push_str("## Core Rules\n\n");
        }
    }
    out.push_str(&render_entries(&main));

    let sections = sections
        .into_iter()
        .map(|(section, mut entries)| {
            entries.sort_by_key(|entry| entry.priority);
            let heading = target.section_heading.replace("{title}", &section_title(&section));
            let mut content = format!(
                "# {heading}\n\nThese instructions apply when working with {}.\n\n",
                spaced(&section)
            );
            content.push_str(&render_entries(&entries));
            (section, content)
        })
        .collect();

    Ok(Aggregation { main: out, sections })
}

fn render_entries(entries: &[Entry]) -> String {
    entries
        .iter()
        .map(|entry| {
            format!(
                "# Rule: {}\n\n## {}\n\n{}",
                entry.name,
                entry.description,
                demote_headings(entry.body.trim())
            )
        })
        .collect::<Vec<_>>()
        .join(RULE_SEPARATOR)
}

/// Push every ATX heading one level down. Lines inside code blocks and
/// setext headings are left alone.
pub fn demote_headings(markdown: &str) -> String {
    let mut inserts = Vec::new();
    for (event, range) in Parser::new(markdown).into_offset_iter() {
        if let Event::Start(Tag::Heading { .. }) = event {
            let rest = &markdown[range.start..];
            let indent = rest.len() - rest.trim_start_matches(' ').len();
            if rest[indent..].starts_with('#') {
                inserts.push(range.start + indent);
            }
        }
    }

    let mut out = String::with_capacity(markdown.len() + inserts.len());
    let mut last = 0;
    for at in inserts {
        out.push_str(&markdown[last..at]);
        out.push('#');
        last = at;
    }
    out.push_str(&markdown[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(path: &str, header: &str, body: &str) -> SourceDocument {
        SourceDocument {
            path: PathBuf::from(path),
            content: format!("---\n{header}\n---\n{body}"),
        }
    }

    fn always(path: &str, single_file: &str, body: &str) -> SourceDocument {
        let name = path.rsplit('/').next().unwrap_or(path);
        doc(
            path,
            &format!("description: About {name}\nactivation: always\nsingle_file: {single_file}"),
            body,
        )
    }

    #[test]
    fn main_rules_sorted_by_priority_and_filtered_by_activation() {
        let documents = vec![
            always("rules/20-a.md", "true", "A body"),
            always("rules/10-b.md", "true", "B body"),
            doc("rules/05-c.md", "description: C\nactivation: manual\nsingle_file: true", "C body"),
        ];
        let result = aggregate(&documents, &OutputTarget::conventions()).unwrap();

        let b = result.main.find("# Rule: 10-b").unwrap();
        let a = result.main.find("# Rule: 20-a").unwrap();
        assert!(b < a);
        assert!(!result.main.contains("05-c"));
        assert_eq!(
            result.main,
            "# Rule: 10-b\n\n## About 10-b.md\n\nB body\n\n---\n\n# Rule: 20-a\n\n## About 20-a.md\n\nA body"
        );
    }

    #[test]
    fn missing_prefix_sorts_last() {
        let documents = vec![
            always("rules/zeta.md", "true", "Z"),
            always("rules/99-last.md", "true", "L"),
            always("rules/alpha.md", "true", "A"),
        ];
        let result = aggregate(&documents, &OutputTarget::conventions()).unwrap();

        let order: Vec<usize> = ["# Rule: 99-last", "# Rule: zeta", "# Rule: alpha"]
            .iter()
            .map(|needle| result.main.find(needle).unwrap())
            .collect();
        assert!(order[0] < order[1] && order[1] < order[2], "{}", result.main);
    }

    #[test]
    fn priority_prefix_parsing() {
        assert_eq!(priority_from_file_name("05-core.md"), 5);
        assert_eq!(priority_from_file_name("42-x.md"), 42);
        assert_eq!(priority_from_file_name("100-x.md"), DEFAULT_PRIORITY);
        assert_eq!(priority_from_file_name("core.md"), DEFAULT_PRIORITY);
    }

    #[test]
    fn claude_target_wording() {
        let target = OutputTarget::claude();
        assert_eq!(
            target.preamble.as_deref(),
            Some("# CLAUDE.md\n\nThis file provides guidance to Claude Code (claude.ai/code) when working with code in this repository.\n\n")
        );
        assert_eq!(target.section_heading, "{title} Instructions for Claude Code");
    }

    #[test]
    fn zero_documents_yield_preamble_only() {
        let claude = aggregate(&[], &OutputTarget::claude()).unwrap();
        assert_eq!(claude.main, OutputTarget::claude().preamble.unwrap());
        assert!(claude.sections.is_empty());

        let conventions = aggregate(&[], &OutputTarget::conventions()).unwrap();
        assert_eq!(conventions.main, "");
    }

    #[test]
    fn skip_false_and_absent_directives_are_excluded() {
        let documents = vec![
            always("rules/a.md", "skip", "A"),
            always("rules/b.md", "false", "B"),
            doc("rules/c.md", "description: C\nactivation: always", "C"),
        ];
        let result = aggregate(&documents, &OutputTarget::conventions()).unwrap();
        assert_eq!(result.main, "");
    }

    #[test]
    fn sections_get_their_own_files_and_a_cross_reference() {
        let documents = vec![
            always("rules/01-core.md", "true", "Core"),
            always("rules/frontend.md", "section:memory-bank/frontend", "# Frontend\n\n## Details\nText"),
        ];
        let result = aggregate(&documents, &OutputTarget::claude()).unwrap();

        assert!(result.main.contains(
            "## Conditional Instructions\n\n- When working with memory-bank frontend, consult `/memory-bank/frontend/CLAUDE.md` for additional instructions.\n\n## Core Rules\n\n# Rule: 01-core"
        ));
        assert!(!result.main.contains("# Rule: frontend"));

        let section = &result.sections["memory-bank/frontend"];
        assert_eq!(
            section,
            "# Frontend Instructions for Claude Code\n\nThese instructions apply when working with memory-bank frontend.\n\n# Rule: frontend\n\n## About frontend.md\n\n## Frontend\n\n### Details\nText"
        );
    }

    #[test]
    fn rule_links_are_flattened() {
        let documents = vec![always(
            "rules/a.md",
            "true",
            "See [planning](rules/workflow/planning.md) and [notes](memory-bank/n.md).",
        )];
        let result = aggregate(&documents, &OutputTarget::conventions()).unwrap();
        assert!(result.main.contains("See **planning** and [notes](memory-bank/n.md)."));
    }

    #[test]
    fn invalid_qualifying_document_reports_its_path() {
        let documents = vec![doc(
            "rules/bad.md",
            "description: bad\nactivation: always\nglobs: \"*.rs\"\nsingle_file: true",
            "body",
        )];
        let error = aggregate(&documents, &OutputTarget::conventions()).unwrap_err();
        assert_eq!(error.path(), Path::new("rules/bad.md"));
        assert!(matches!(error, AggregateError::Invalid { .. }));
    }

    #[test]
    fn traversal_in_section_path_is_rejected() {
        let documents = vec![always("rules/a.md", "section:../outside", "body")];
        let error = aggregate(&documents, &OutputTarget::conventions()).unwrap_err();
        assert!(matches!(
            error,
            AggregateError::SectionPath { source: SectionPathError::Traversal(_), .. }
        ));
    }

    #[test]
    fn directive_values() {
        let text = |value: &str| FieldValue::Text(value.to_string());
        assert_eq!(SingleFileDirective::parse(None), Ok(SingleFileDirective::Off));
        assert_eq!(SingleFileDirective::parse(Some(&FieldValue::Bool(true))), Ok(SingleFileDirective::Main));
        assert_eq!(SingleFileDirective::parse(Some(&text("true"))), Ok(SingleFileDirective::Main));
        assert_eq!(SingleFileDirective::parse(Some(&text("skip"))), Ok(SingleFileDirective::Skip));
        assert_eq!(SingleFileDirective::parse(Some(&text("maybe"))), Ok(SingleFileDirective::Off));
        assert_eq!(
            SingleFileDirective::parse(Some(&text("section:/docs//api/"))),
            Ok(SingleFileDirective::Section("docs/api".into()))
        );
    }

    #[test]
    fn demotion_skips_code_blocks() {
        let markdown = "# Title\n\n```bash\n# comment\n```\n\n  ## Indented\n\nSetext\n======\n";
        assert_eq!(
            demote_headings(markdown),
            "## Title\n\n```bash\n# comment\n```\n\n  ### Indented\n\nSetext\n======\n"
        );
    }
}
