// Frontmatter codec: the `---` delimited header that precedes a rule body.
//
// The header grammar is a deliberately small YAML subset: scalar values,
// double-quoted strings, booleans, a `null` sentinel, `|` literal blocks and
// comma-continued values. Documents without a header are valid input.

mod header;
mod parser;

pub use header::RuleHeader;
pub use parser::parse_fields;

/// Line that opens and closes a frontmatter block.
pub const DELIMITER: &str = "---";

/// Value stored under a frontmatter key.
///
/// `null` is kept as the literal text `"null"` so it can be re-emitted verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            Self::Text(_) => None,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Bool(value) => value.to_string(),
        }
    }
}

/// Ordered key/value mapping parsed from a header.
///
/// Insertion order is preserved; re-inserting an existing key replaces the
/// value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    entries: Vec<(String, FieldValue)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(existing, _)| existing == key).map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut FieldValue> {
        self.entries.iter_mut().find(|(existing, _)| existing == key).map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Fields {
    type Item = (String, FieldValue);
    type IntoIter = std::vec::IntoIter<(String, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A document split into its header fields and the remaining body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument<'a> {
    pub fields: Fields,
    pub body: &'a str,
}

/// Split `content` into header fields and body.
///
/// Never fails: text without a leading `---` block comes back as an empty
/// mapping with the full text as body.
pub fn parse_document(content: &str) -> ParsedDocument<'_> {
    match split_frontmatter(content) {
        Some((header, body)) => {
            ParsedDocument { fields: parse_fields(header), body }
        }
        None => ParsedDocument { fields: Fields::new(), body: content },
    }
}

/// Locate the header block. Returns `(header_text, body)` without the
/// delimiter lines, or `None` when the text does not open with `---`.
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let (first, mut rest_start) = match content.find('\n') {
        Some(index) => (&content[..index], index + 1),
        None => return None,
    };
    if first.trim_end() != DELIMITER {
        return None;
    }

    let header_start = rest_start;
    while rest_start <= content.len() {
        let line_end = content[rest_start..]
            .find('\n')
            .map(|offset| rest_start + offset)
            .unwrap_or(content.len());
        let line = &content[rest_start..line_end];

        if line.trim_end() == DELIMITER {
            let header_end = rest_start.saturating_sub(1).max(header_start);
            let body_start = (line_end + 1).min(content.len());
            return Some((&content[header_start..header_end], &content[body_start..]));
        }

        if line_end == content.len() {
            break;
        }
        rest_start = line_end + 1;
    }

    None
}
