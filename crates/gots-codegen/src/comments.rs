//! Comment handling shared by the builder and the emitter.

/// Whether a comment line is a tool directive (`go:generate`, `nolint:all`).
///
/// Directives are written without a space after `//`, so after the comment
/// marker is stripped they start with a lower-case word followed by `:`.
fn is_directive(line: &str) -> bool {
    let Some((word, rest)) = line.split_once(':') else {
        return false;
    };
    !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        && rest
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// Drop directive lines and surrounding blank lines from a comment.
///
/// Returns `None` when nothing but directives and whitespace remain.
pub fn clean(text: &str) -> Option<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .filter(|line| !is_directive(line))
        .collect();

    let start = lines.iter().position(|l| !l.trim().is_empty())?;
    let end = lines.iter().rposition(|l| !l.trim().is_empty())?;
    Some(lines[start..=end].join("\n"))
}

pub(crate) fn indent(out: &mut String, depth: usize, width: usize) {
    out.extend(std::iter::repeat_n(' ', depth * width));
}

/// Write a `/** ... */` block, one ` * ` line per non-blank comment line.
pub(crate) fn write_doc(out: &mut String, text: &str, depth: usize, width: usize) {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return;
    }

    indent(out, depth, width);
    out.push_str("/**\n");
    for line in lines {
        indent(out, depth, width);
        out.push_str(" * ");
        out.push_str(&line.trim_end().replace("*/", "*\\/"));
        out.push('\n');
    }
    indent(out, depth, width);
    out.push_str(" */\n");
}

/// Append ` // text` to the current line. Multi-line text is joined.
pub(crate) fn write_inline(out: &mut String, text: &str) {
    let joined = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if !joined.is_empty() {
        out.push_str(" // ");
        out.push_str(&joined);
    }
}

/// Text placed inside a `/* ... */` comment.
pub(crate) fn block_safe(text: &str) -> String {
    text.replace("*/", "*\\/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_strips_directives() {
        let doc = "User is a person.\ngo:generate stringer -type=User\nnolint:revive";
        assert_eq!(clean(doc).as_deref(), Some("User is a person."));
        assert_eq!(clean("revive:disable-line:exported"), None);
        assert_eq!(clean("\n\n"), None);
    }

    #[test]
    fn test_clean_keeps_prose_with_colons() {
        assert_eq!(clean("Note: ids are stable").as_deref(), Some("Note: ids are stable"));
        assert_eq!(clean("see http://example.com").as_deref(), Some("see http://example.com"));
        assert_eq!(clean("todo: fix").as_deref(), Some("todo: fix"));
    }

    #[test]
    fn test_clean_keeps_url_lines() {
        let doc = "User mirrors the upstream schema, see\nhttps://example.com/schema\nlint:ignore";
        assert_eq!(
            clean(doc).as_deref(),
            Some("User mirrors the upstream schema, see\nhttps://example.com/schema")
        );
        assert_eq!(clean("file:///etc/gots").as_deref(), Some("file:///etc/gots"));
    }

    #[test]
    fn test_write_doc_block() {
        let mut out = String::new();
        write_doc(&mut out, "First line\n\nSecond */ line", 1, 2);
        assert_eq!(out, "  /**\n   * First line\n   * Second *\\/ line\n   */\n");
    }

    #[test]
    fn test_write_inline() {
        let mut out = String::from("x: number;");
        write_inline(&mut out, "count of\nthings");
        assert_eq!(out, "x: number; // count of things");

        let mut out = String::new();
        write_inline(&mut out, "   ");
        assert!(out.is_empty());
    }
}
