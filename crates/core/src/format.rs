//! Diagnostic text formatting
//!
//! Hook failure messages are consumed by tooling that matches on their exact
//! shape, so these helpers keep the historical renderings: command vectors
//! as `[ls -a]`, pods as `name_namespace(uid)`, and quoted strings with
//! C-style escapes (`\n`, `\"`, `\x00`, `\u200b`, `\U000e0001`) and invalid
//! UTF-8 bytes shown as `\xNN`.

use crate::container::PodIdentity;
use std::fmt::Write;

/// Render a command vector as `[word word ...]`
pub fn format_command(command: &[String]) -> String {
    format!("[{}]", command.join(" "))
}

/// Render a pod as `name_namespace(uid)`
pub fn format_pod(pod: &PodIdentity) -> String {
    format!(
        "{}_{}({})",
        pod.name,
        pod.namespace,
        pod.uid.as_deref().unwrap_or_default()
    )
}

/// Double-quote `s`, escaping quotes, backslashes, and non-printable characters
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        push_escaped(&mut out, c);
    }
    out.push('"');
    out
}

/// Like [`quote`], but invalid UTF-8 bytes are rendered as `\xNN`
pub fn quote_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');
    let mut rest = bytes;
    while !rest.is_empty() {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                valid.chars().for_each(|c| push_escaped(&mut out, c));
                break;
            }
            Err(err) => {
                let (valid, after) = rest.split_at(err.valid_up_to());
                // valid_up_to() guarantees this prefix is UTF-8
                if let Ok(valid) = std::str::from_utf8(valid) {
                    valid.chars().for_each(|c| push_escaped(&mut out, c));
                }
                let invalid_len = err.error_len().unwrap_or(after.len());
                for byte in &after[..invalid_len] {
                    let _ = write!(out, "\\x{:02x}", byte);
                }
                rest = &after[invalid_len..];
            }
        }
    }
    out.push('"');
    out
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '"' => out.push_str("\\\""),
        '\\' => out.push_str("\\\\"),
        '\u{07}' => out.push_str("\\a"),
        '\u{08}' => out.push_str("\\b"),
        '\u{0c}' => out.push_str("\\f"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '\u{0b}' => out.push_str("\\v"),
        c if (c as u32) < 0x20 || c == '\u{7f}' => {
            let _ = write!(out, "\\x{:02x}", c as u32);
        }
        c if !is_printable(c) => {
            if (c as u32) > 0xffff {
                let _ = write!(out, "\\U{:08x}", c as u32);
            } else {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
        }
        c => out.push(c),
    }
}

/// Graphic characters and ASCII space print as-is. Controls, format
/// characters, non-ASCII spaces, separators, private use and
/// noncharacters are escaped.
fn is_printable(c: char) -> bool {
    let code = c as u32;
    if c.is_control() || code & 0xfffe == 0xfffe {
        return false;
    }
    !matches!(
        code,
        // space and line/paragraph separators
        0x00a0 | 0x1680 | 0x2000..=0x200a | 0x2028 | 0x2029 | 0x202f | 0x205f | 0x3000
        // format characters
        | 0x00ad
        | 0x0600..=0x0605
        | 0x061c
        | 0x06dd
        | 0x070f
        | 0x0890..=0x0891
        | 0x08e2
        | 0x180e
        | 0x200b..=0x200f
        | 0x202a..=0x202e
        | 0x2060..=0x2064
        | 0x2066..=0x206f
        | 0xfeff
        | 0xfff9..=0xfffb
        | 0x110bd
        | 0x110cd
        | 0x13430..=0x1343f
        | 0x1bca0..=0x1bca3
        | 0x1d173..=0x1d17a
        | 0xe0001
        | 0xe0020..=0xe007f
        // noncharacters and private use
        | 0xfdd0..=0xfdef
        | 0xe000..=0xf8ff
        | 0xf0000..=0x10ffff
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_command() {
        let command = vec!["ls".to_string(), "--a".to_string()];
        assert_eq!(format_command(&command), "[ls --a]");
        assert_eq!(format_command(&[]), "[]");
    }

    #[test]
    fn test_format_pod() {
        let pod = PodIdentity::new("nsFoo", "podFoo");
        assert_eq!(format_pod(&pod), "podFoo_nsFoo()");
        assert_eq!(format_pod(&pod.with_uid("abc-123")), "podFoo_nsFoo(abc-123)");
    }

    #[test]
    fn test_quote_plain_and_escapes() {
        assert_eq!(quote("invalid command"), "\"invalid command\"");
        assert_eq!(quote(""), "\"\"");
        assert_eq!(quote("a\"b\\c"), "\"a\\\"b\\\\c\"");
        assert_eq!(quote("line\nnext\ttab"), "\"line\\nnext\\ttab\"");
        assert_eq!(quote("\u{0}\u{7f}"), "\"\\x00\\x7f\"");
        assert_eq!(quote("\u{85}"), "\"\\u0085\"");
        assert_eq!(quote("héllo"), "\"héllo\"");
    }

    #[test]
    fn test_quote_escapes_invisible_characters() {
        assert_eq!(quote("soft\u{ad}hyphen"), "\"soft\\u00adhyphen\"");
        assert_eq!(quote("zero\u{200b}width"), "\"zero\\u200bwidth\"");
        assert_eq!(quote("\u{feff}bom"), "\"\\ufeffbom\"");
        assert_eq!(quote("a\u{a0}b\u{2028}"), "\"a\\u00a0b\\u2028\"");
        assert_eq!(quote("\u{e0001}"), "\"\\U000e0001\"");
        assert_eq!(quote("\u{e000}"), "\"\\ue000\"");
        assert_eq!(quote("a b ü 日本 😀"), "\"a b ü 日本 😀\"");
    }

    #[test]
    fn test_quote_bytes_invalid_utf8() {
        assert_eq!(quote_bytes(b"ok"), "\"ok\"");
        assert_eq!(quote_bytes(b"a\xffb"), "\"a\\xffb\"");
        assert_eq!(quote_bytes(b"\xe2\x82"), "\"\\xe2\\x82\"");
    }
}
