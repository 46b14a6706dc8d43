// Line-oriented state machine for the header grammar.

use super::{FieldValue, Fields};

/// Indent stripped from each line of a `|` literal block.
const BLOCK_INDENT: &str = "  ";

/// Parse the text between the `---` delimiters into an ordered mapping.
///
/// Rules, per `key: value` line:
/// - empty value stores `""`, `null` (any case) stores the text `"null"`
/// - `"quoted"` values lose their quotes
/// - `true` / `false` (any case) become booleans
/// - `|` starts a literal block of two-space indented (or blank) lines
/// - a value ending in `,` or `|` continues over following non-key lines,
///   joined by single spaces, with trailing commas removed
///
/// Lines that are not entries extend the preceding plain value with a
/// newline, which is how multi-line descriptions are written unquoted by the
/// editor serializers.
pub fn parse_fields(header: &str) -> Fields {
    let lines: Vec<&str> = header.lines().collect();
    let mut fields = Fields::new();
    let mut open_plain: Option<String> = None;
    let mut index = 0usize;

    while index < lines.len() {
        let line = lines[index];
        index += 1;

        let Some((key, value)) = split_entry(line) else {
            let extra = line.trim();
            if extra.is_empty() || extra.starts_with('#') {
                continue;
            }
            if let Some(FieldValue::Text(text)) =
                open_plain.as_deref().and_then(|key| fields.get_mut(key))
            {
                text.push('\n');
                text.push_str(extra);
            }
            continue;
        };

        open_plain = None;
        let value = value.trim();

        if value.is_empty() {
            fields.insert(key, FieldValue::Text(String::new()));
        } else if value.eq_ignore_ascii_case("null") {
            fields.insert(key, FieldValue::Text("null".to_string()));
        } else if value == "|" {
            let (block, consumed) = read_literal_block(&lines[index..]);
            index += consumed;
            fields.insert(key, FieldValue::Text(block));
        } else if value.ends_with(',') || value.ends_with('|') {
            let (joined, consumed) = read_continuation(value, &lines[index..]);
            index += consumed;
            fields.insert(key, FieldValue::Text(joined));
        } else if value.eq_ignore_ascii_case("true") {
            fields.insert(key, FieldValue::Bool(true));
        } else if value.eq_ignore_ascii_case("false") {
            fields.insert(key, FieldValue::Bool(false));
        } else if let Some(unquoted) = strip_quotes(value) {
            fields.insert(key, FieldValue::Text(unquoted.to_string()));
        } else {
            fields.insert(key, FieldValue::Text(value.to_string()));
            open_plain = Some(key.to_string());
        }
    }

    fields
}

/// Recognize `key: value` at column zero. Keys are single tokens that do not
/// start with `#`.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    if line.starts_with(char::is_whitespace) {
        return None;
    }
    let (key, value) = line.split_once(':')?;
    let key = key.trim_end();
    if key.is_empty() || key.starts_with('#') || key.contains(char::is_whitespace) {
        return None;
    }
    Some((key, value))
}

fn strip_quotes(value: &str) -> Option<&str> {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Some(&value[1..value.len() - 1])
    } else {
        None
    }
}

/// Consume a `|` block. Returns the joined text and the number of lines used.
fn read_literal_block(lines: &[&str]) -> (String, usize) {
    let mut block: Vec<&str> = Vec::new();
    let mut consumed = 0usize;

    for line in lines {
        if let Some(stripped) = line.strip_prefix(BLOCK_INDENT) {
            block.push(stripped);
        } else if line.trim().is_empty() {
            block.push("");
        } else {
            break;
        }
        consumed += 1;
    }

    while block.last().is_some_and(|line| line.is_empty()) {
        block.pop();
    }

    (block.join("\n"), consumed)
}

/// Consume lines continuing a comma- or pipe-terminated value.
fn read_continuation(first: &str, lines: &[&str]) -> (String, usize) {
    let mut joined = first.to_string();
    let mut consumed = 0usize;

    for line in lines {
        if split_entry(line).is_some() {
            break;
        }
        let part = line.trim();
        if !part.is_empty() {
            joined.push(' ');
            joined.push_str(part);
        }
        consumed += 1;
    }

    let trimmed = joined.trim().trim_end_matches(',');
    (trimmed.to_string(), consumed)
}
