use crate::activation::Activation;
use crate::frontmatter::DELIMITER;

/// Render a canonical document.
///
/// Field order is fixed: `description`, `activation`, then `globs` for glob
/// rules only. A multi-line description is written as a `|` literal block.
pub fn dump(description: &str, activation: Activation, globs: &str, body: &str) -> String {
    let mut out = String::with_capacity(body.len() + 96);
    out.push_str(DELIMITER);
    out.push('\n');

    if description.contains('\n') {
        out.push_str("description: |\n");
        for line in description.lines() {
            if !line.is_empty() {
                out.push_str("  ");
                out.push_str(line);
            }
            out.push('\n');
        }
    } else {
        out.push_str("description: ");
        out.push_str(description);
        out.push('\n');
    }

    out.push_str("activation: ");
    out.push_str(activation.as_str());
    out.push('\n');

    if activation == Activation::Glob {
        if globs.is_empty() {
            out.push_str("globs: \n");
        } else {
            out.push_str("globs: \"");
            out.push_str(globs);
            out.push_str("\"\n");
        }
    }

    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(body);
    out
}
