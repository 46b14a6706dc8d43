// Section path canonicalization for `single_file: section:<path>` directives.

use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Maximum allowed section path length in characters.
const MAX_PATH_CHARS: usize = 512;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SectionPathError {
    #[error("section path is empty")]
    Empty,

    #[error("section path exceeds maximum length of {MAX_PATH_CHARS} characters")]
    TooLong,

    #[error("section path contains directory traversal component: {0}")]
    Traversal(String),

    #[error("section path contains null byte")]
    NullByte,

    #[error("section path contains invalid component: {0}")]
    InvalidComponent(String),
}

/// Normalize a section path so it can be joined onto a project root.
///
/// - Unicode NFKC, `\` becomes `/`, repeated and edge slashes collapse
/// - `.` / `..` components, NUL bytes and whitespace-only segments are rejected
pub fn normalize_section_path(input: &str) -> Result<String, SectionPathError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SectionPathError::Empty);
    }
    if input.contains('\0') {
        return Err(SectionPathError::NullByte);
    }

    let normalized: String = input.nfkc().collect();
    let unified = normalized.replace('\\', "/");
    let components: Vec<&str> = unified.split('/').filter(|s| !s.is_empty()).collect();

    if components.is_empty() {
        return Err(SectionPathError::Empty);
    }

    for component in &components {
        if matches!(*component, "." | "..") {
            return Err(SectionPathError::Traversal(component.to_string()));
        }
        if component.trim().is_empty() {
            return Err(SectionPathError::InvalidComponent(
                "(whitespace-only component)".to_string(),
            ));
        }
    }

    let result = components.join("/");
    if result.chars().count() > MAX_PATH_CHARS {
        return Err(SectionPathError::TooLong);
    }

    Ok(result)
}

/// Human form of a section path: `memory-bank/frontend` → `memory-bank frontend`.
pub fn spaced(section: &str) -> String {
    section.replace('/', " ")
}

/// Title-case the last segment: `memory-bank/frontend-web` → `Frontend-Web`.
///
/// Every letter that follows a non-letter starts a new word.
pub fn section_title(section: &str) -> String {
    let last = section.rsplit('/').next().unwrap_or(section);
    let mut title = String::with_capacity(last.len());
    let mut word_start = true;
    for ch in last.chars() {
        if ch.is_alphabetic() {
            if word_start {
                title.extend(ch.to_uppercase());
            } else {
                title.extend(ch.to_lowercase());
            }
            word_start = false;
        } else {
            title.push(ch);
            word_start = true;
        }
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_section() {
        assert_eq!(normalize_section_path("memory-bank/frontend").unwrap(), "memory-bank/frontend");
    }

    #[test]
    fn test_backslash_and_edge_slashes() {
        assert_eq!(normalize_section_path("\\frontend\\web\\").unwrap(), "frontend/web");
        assert_eq!(normalize_section_path(" /docs//api/ ").unwrap(), "docs/api");
    }

    #[test]
    fn test_unicode_nfkc() {
        assert_eq!(normalize_section_path("\u{FB01}les").unwrap(), "files");
    }

    #[test]
    fn test_reject_traversal() {
        assert_eq!(
            normalize_section_path("frontend/../../etc"),
            Err(SectionPathError::Traversal("..".to_string()))
        );
        assert_eq!(
            normalize_section_path("./frontend"),
            Err(SectionPathError::Traversal(".".to_string()))
        );
    }

    #[test]
    fn test_reject_empty_and_null() {
        assert_eq!(normalize_section_path(""), Err(SectionPathError::Empty));
        assert_eq!(normalize_section_path("//"), Err(SectionPathError::Empty));
        assert_eq!(normalize_section_path("a\0b"), Err(SectionPathError::NullByte));
    }

    #[test]
    fn test_reject_whitespace_component() {
        assert!(matches!(
            normalize_section_path("frontend/   /web"),
            Err(SectionPathError::InvalidComponent(_))
        ));
    }

    #[test]
    fn test_reject_too_long() {
        assert_eq!(normalize_section_path(&"a/".repeat(300)), Err(SectionPathError::TooLong));
    }

    #[test]
    fn test_title_and_spacing() {
        assert_eq!(section_title("memory-bank/frontend"), "Frontend");
        assert_eq!(section_title("BACKEND"), "Backend");
        assert_eq!(section_title("docs/frontend-web_2x"), "Frontend-Web_2X");
        assert_eq!(spaced("memory-bank/frontend"), "memory-bank frontend");
    }
}
