//! Bracket-expression parsing: shorthand normalization, escape sequences
//! and range scanning.

use once_cell::sync::Lazy;

use crate::set::{Builder, CharacterSet, CharacterSetError};

/// Literal expansion of the `\s` shorthand.
const SPACE_CLASS: &str = "\r\n\t\x0C\x0B ";
/// Literal expansion of the `\d` shorthand.
const DIGIT_CLASS: &str = "0-9";
/// Literal expansion of the `\w` shorthand.
const WORD_CLASS: &str = "a-zA-Z0-9_";

static NOT_SPACE: Lazy<CharacterSet> =
    Lazy::new(|| CharacterSet::negated(&[0x0D, 0x0A, 0x09, 0x0C, 0x0B, 0x20], &[]));
static NOT_DIGIT: Lazy<CharacterSet> = Lazy::new(|| CharacterSet::negated(&[], &[(0x30, 0x39)]));
static NOT_WORD: Lazy<CharacterSet> =
    Lazy::new(|| CharacterSet::negated(&[0x5F], &[(0x61, 0x7A), (0x41, 0x5A), (0x30, 0x39)]));

/// The negated shorthand class for an uppercase escape tag.
pub(crate) fn negated_class(tag: char) -> Option<&'static CharacterSet> {
    match tag {
        'S' => Some(&NOT_SPACE),
        'D' => Some(&NOT_DIGIT),
        'W' => Some(&NOT_WORD),
        _ => None,
    }
}

/// Splits off a leading negation marker and substitutes the `\s`, `\d`
/// and `\w` shorthand tokens with their literal class bodies.
pub(crate) fn normalize(source: &str) -> (String, bool) {
    let (negate, rest) = match source.strip_prefix('^') {
        Some(rest) => (true, rest),
        None => (false, source),
    };

    let mut out = String::with_capacity(rest.len());
    let mut chars = rest.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            let expansion = match chars.peek() {
                Some('s') => Some(SPACE_CLASS),
                Some('d') => Some(DIGIT_CLASS),
                Some('w') => Some(WORD_CLASS),
                _ => None,
            };
            if let Some(expansion) = expansion {
                out.push_str(expansion);
                chars.next();
                continue;
            }
        }
        out.push(ch);
    }
    (out, negate)
}

/// Scans a normalized source, accumulating characters, ranges and negated
/// shorthand classes into `builder`. The only hard error is a range whose
/// start code point exceeds its end.
pub(crate) fn scan(builder: &mut Builder, source: &str) -> Result<(), CharacterSetError> {
    let chars: Vec<char> = source.chars().collect();
    let mut range_start: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let mut ch = chars[i];

        if ch == '\\' {
            if let Some(&(tag @ ('S' | 'D' | 'W'))) = chars.get(i + 1) {
                builder.push_class(tag);
                i += 2;
                continue;
            }
            let (unescaped, consumed) = unescape_at(&chars, i);
            ch = unescaped;
            i += consumed - 1;
        }

        match range_start.take() {
            Some(start) if start != ch => {
                let (from, to) = (start as u32, ch as u32);
                if from > to {
                    return Err(CharacterSetError::OutOfOrderRange { start: from, end: to });
                }
                builder.push_range(from, to);
                i += 1;
                continue;
            }
            // Degenerate range like `a-a`: fall through to a single char.
            Some(_) => {}
            None => {
                if chars.get(i + 1) == Some(&'-') && i + 2 < chars.len() {
                    range_start = Some(ch);
                    i += 2;
                    continue;
                }
            }
        }

        builder.use_char(ch);
        i += 1;
    }

    Ok(())
}

/// Decodes the escape sequence starting at `chars[i]` (a backslash).
/// Returns the decoded character and the total number of chars consumed.
/// Malformed sequences degrade to the character after the backslash.
fn unescape_at(chars: &[char], i: usize) -> (char, usize) {
    let Some(&next) = chars.get(i + 1) else {
        return ('\\', 1);
    };
    match next {
        'n' => ('\n', 2),
        'r' => ('\r', 2),
        't' => ('\t', 2),
        'f' => ('\x0C', 2),
        'v' => ('\x0B', 2),
        'b' => ('\x08', 2),
        'x' => match hex_escape(chars, i + 2, 2) {
            Some(ch) => (ch, 4),
            None => ('x', 2),
        },
        'u' => {
            if chars.get(i + 2) == Some(&'{') {
                if let Some(digits) = chars[i + 3..].iter().position(|&c| c == '}') {
                    if (1..=6).contains(&digits) {
                        if let Some(ch) = hex_escape(chars, i + 3, digits) {
                            return (ch, digits + 4);
                        }
                    }
                }
                ('u', 2)
            } else {
                match hex_escape(chars, i + 2, 4) {
                    Some(ch) => (ch, 6),
                    None => ('u', 2),
                }
            }
        }
        other => (other, 2),
    }
}

/// Reads `len` hex digits starting at `chars[start]` as a code point.
fn hex_escape(chars: &[char], start: usize, len: usize) -> Option<char> {
    if start + len > chars.len() {
        return None;
    }
    let mut value: u32 = 0;
    for &c in &chars[start..start + len] {
        value = value.checked_mul(16)?.checked_add(c.to_digit(16)?)?;
    }
    char::from_u32(value)
}
