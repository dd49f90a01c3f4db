/* Escaping for C string literals and comments in generated sources */

use std::fmt::Write;

/* Escape raw bytes for use inside a double-quoted C string literal */
pub fn c_escape(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b'"' => out.push_str("\\\""),
            b'\'' => out.push_str("\\'"),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7e => out.push(b as char),
            _ => write!(out, "\\{:03o}", b).unwrap(),
        }
    }
    out
}

/* `??` starts a trigraph in C; break every pair */
pub fn escape_trigraphs(text: &str) -> String {
    text.replace("??", "?\\?")
}

/* Format schema comment text as a doc comment block, ending with a newline */
pub fn doc_comment(text: Option<&str>) -> String {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return String::new();
    };
    let text = escape_trigraphs(&text.replace("*/", "*\\/"));
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    if let [only] = lines.as_slice() {
        return format!("/** {} */\n", only);
    }
    let mut out = String::from("/**\n");
    for line in lines {
        if line.is_empty() {
            out.push_str(" *\n");
        } else {
            writeln!(out, " * {}", line).unwrap();
        }
    }
    out.push_str(" **/\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c_escape() {
        assert_eq!(c_escape(b"plain"), "plain");
        assert_eq!(c_escape(b"a\"b\\c\n"), "a\\\"b\\\\c\\n");
        assert_eq!(c_escape(&[0, 1, 0xff]), "\\000\\001\\377");
        assert_eq!(c_escape(b"it's"), "it\\'s");
    }

    #[test]
    fn test_trigraphs() {
        assert_eq!(escape_trigraphs("what??!"), "what?\\?!");
        assert_eq!(escape_trigraphs("one?"), "one?");
    }

    #[test]
    fn test_doc_comment() {
        assert_eq!(doc_comment(None), "");
        assert_eq!(doc_comment(Some("  ")), "");
        assert_eq!(doc_comment(Some("Count of items.")), "/** Count of items. */\n");
        assert_eq!(
            doc_comment(Some("First line.\n\nSecond */ line.")),
            "/**\n * First line.\n *\n * Second *\\/ line.\n **/\n"
        );
    }
}
