//! Escape/unescape helpers.
//!
//! The scanner decodes escape sequences while copying literal text, so that
//! `\<` can put a tag start into the output without opening a tag. The
//! standard table is backslash based:
//!
//! ```text
//! \\  \"  \0  \a  \v  \t  \b  \f  \n      \uXXXX for any other control character
//! ```
//!
//! A [`CustomEscape`] gets the first chance at every character (escaping) or
//! position (unescaping), which lets a use-site layer its own rules on top,
//! e.g. [`CsvEscape`] doubling quotes. `unescape_with(escape_with(s, e), e) == s`
//! holds for every string and both provided escapers.
//!
//! Unknown sequences such as `\<` decode to the escaped character; a trailing
//! lone backslash is kept as is.

use std::fmt::Write as _;

/// Per-use-site escaping rules layered over the standard table.
pub trait CustomEscape {
    /// Write a custom escape for `c` into `out` and return true, or return
    /// false to fall back to the standard table.
    fn escape(&self, c: char, out: &mut String) -> bool;

    /// Decode a custom sequence at the start of `input` into `out`, returning
    /// the number of bytes consumed, or `None` to fall back to the standard
    /// table.
    fn unescape(&self, input: &str, out: &mut String) -> Option<usize>;
}

/// The standard backslash table only.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEscape;

impl CustomEscape for StandardEscape {
    fn escape(&self, _c: char, _out: &mut String) -> bool {
        false
    }

    fn unescape(&self, _input: &str, _out: &mut String) -> Option<usize> {
        None
    }
}

/// CSV-style quoting: `"` is written as `""`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvEscape;

impl CustomEscape for CsvEscape {
    fn escape(&self, c: char, out: &mut String) -> bool {
        if c == '"' {
            out.push_str("\"\"");
            return true;
        }
        false
    }

    fn unescape(&self, input: &str, out: &mut String) -> Option<usize> {
        if input.starts_with("\"\"") {
            out.push('"');
            return Some(2);
        }
        None
    }
}

/// Escape `input` with the standard table.
pub fn escape(input: &str) -> String {
    escape_with(input, &StandardEscape)
}

/// Unescape `input` with the standard table.
pub fn unescape(input: &str) -> String {
    unescape_with(input, &StandardEscape)
}

/// Escape `input`, consulting `custom` before the standard table.
pub fn escape_with(input: &str, custom: &dyn CustomEscape) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if !custom.escape(c, &mut out) {
            escape_standard(c, &mut out);
        }
    }
    out
}

/// Unescape `input`, consulting `custom` before the standard table.
pub fn unescape_with(input: &str, custom: &dyn CustomEscape) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pos = 0;
    while pos < input.len() {
        let rest = &input[pos..];
        if let Some(consumed) = unescape_at(rest, custom, &mut out) {
            pos += consumed;
            continue;
        }
        // `rest` is non-empty, so there is always a next char.
        if let Some(c) = rest.chars().next() {
            out.push(c);
            pos += c.len_utf8();
        }
    }
    out
}

/// Decode one escape sequence at the start of `input`.
///
/// Returns the bytes consumed, or `None` when `input` does not start with an
/// escape sequence.
pub(crate) fn unescape_at(input: &str, custom: &dyn CustomEscape, out: &mut String) -> Option<usize> {
    if let Some(consumed) = custom.unescape(input, out) {
        return Some(consumed);
    }

    let mut chars = input.chars();
    if chars.next() != Some('\\') {
        return None;
    }
    let Some(next) = chars.next() else {
        // Lone trailing backslash: not a sequence.
        return None;
    };

    let decoded = match next {
        '\\' => '\\',
        '"' => '"',
        '0' => '\0',
        'a' => '\u{07}',
        'v' => '\u{0B}',
        't' => '\t',
        'b' => '\u{08}',
        'f' => '\u{0C}',
        'n' => '\n',
        'u' => {
            if let Some(c) = decode_unicode(&input[2..]) {
                out.push(c);
                return Some(6);
            }
            'u'
        }
        other => other,
    };
    out.push(decoded);
    Some(1 + next.len_utf8())
}

fn escape_standard(c: char, out: &mut String) {
    match c {
        '\\' => out.push_str("\\\\"),
        '"' => out.push_str("\\\""),
        '\0' => out.push_str("\\0"),
        '\u{07}' => out.push_str("\\a"),
        '\u{0B}' => out.push_str("\\v"),
        '\t' => out.push_str("\\t"),
        '\u{08}' => out.push_str("\\b"),
        '\u{0C}' => out.push_str("\\f"),
        '\n' => out.push_str("\\n"),
        // Every control character lives in the BMP, so four digits suffice.
        c if c.is_control() => {
            let _ = write!(out, "\\u{:04X}", c as u32);
        }
        c => out.push(c),
    }
}

/// Parse exactly four hex digits at the start of `digits`.
fn decode_unicode(digits: &str) -> Option<char> {
    let hex = digits.get(..4)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let code = u32::from_str_radix(hex, 16).ok()?;
    char::from_u32(code)
}
