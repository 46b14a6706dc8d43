use rulebridge_common::editor::{from_editor_format, to_editor_format, Editor};
use rulebridge_common::frontmatter::RuleHeader;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
struct GoldenCase {
    name: String,
    canonical: String,
    cursor: String,
    windsurf: String,
}

impl GoldenCase {
    fn editor_file(&self, editor: Editor) -> &str {
        match editor {
            Editor::Cursor => &self.cursor,
            Editor::Windsurf => &self.windsurf,
        }
    }
}

#[test]
fn editor_transform_golden_cases() {
    let cases_dir = golden_cases_dir();
    let cases = load_cases(&cases_dir);

    assert!(
        !cases.is_empty(),
        "no golden cases found in {}",
        cases_dir.display()
    );

    let mut failures = Vec::new();
    for case in &cases {
        for editor in Editor::ALL {
            if let Err(message) = run_case(case, editor) {
                failures.push(message);
            }
        }
    }

    if !failures.is_empty() {
        panic!(
            "{} golden case(s) failed:\n\n{}",
            failures.len(),
            failures.join("\n\n")
        );
    }
}

fn golden_cases_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../tests/golden/cases")
}

fn load_cases(cases_dir: &Path) -> Vec<GoldenCase> {
    let mut case_dirs: Vec<PathBuf> = fs::read_dir(cases_dir)
        .unwrap_or_else(|error| panic!("failed to read {}: {error}", cases_dir.display()))
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if path.is_dir() { Some(path) } else { None }
        })
        .collect();
    case_dirs.sort();
    case_dirs.into_iter().map(load_case).collect()
}

fn load_case(case_dir: PathBuf) -> GoldenCase {
    let name = case_dir
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or("<unnamed-case>")
        .to_owned();

    GoldenCase {
        name,
        canonical: read_required(&case_dir.join("canonical.md")),
        cursor: read_required(&case_dir.join("cursor.mdc")),
        windsurf: read_required(&case_dir.join("windsurf.md")),
    }
}

/// Forward output must match the fixture byte for byte, and the fixture must
/// come back to the canonical document given the canonical description.
fn run_case(case: &GoldenCase, editor: Editor) -> Result<(), String> {
    let expected = case.editor_file(editor);

    let forward = to_editor_format(editor, &case.canonical)
        .map_err(|error| format!("case `{}` ({editor}) forward failed: {error}", case.name))?;
    if forward != expected {
        return Err(format!(
            "case `{}` ({editor}) forward mismatch.\nexpected: {:?}\nactual:   {:?}",
            case.name, expected, forward
        ));
    }

    let (master, _) = RuleHeader::parse(&case.canonical);
    let reverse = from_editor_format(editor, expected, None, master.description.as_deref())
        .map_err(|error| format!("case `{}` ({editor}) reverse failed: {error}", case.name))?;
    if reverse != case.canonical {
        return Err(format!(
            "case `{}` ({editor}) reverse mismatch.\nexpected: {:?}\nactual:   {:?}",
            case.name, case.canonical, reverse
        ));
    }

    Ok(())
}

fn read_required(path: &Path) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|error| panic!("failed to read {}: {error}", path.display()))
}
