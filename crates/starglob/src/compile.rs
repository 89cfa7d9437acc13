//! Glob-to-regex translation.

use std::ops::Range;

use itertools::Itertools;

use crate::options::{Boundary, GlobOptions};

/// Outcome of translating a glob pattern: unanchored regex source plus
/// whether any wildcard or charset token was seen.
pub(crate) struct Translation {
    pub(crate) source: String,
    pub(crate) is_glob: bool,
}

/// Builds the negated character class excluding every boundary character.
/// An empty boundary excludes nothing and yields a match-any atom.
pub(crate) fn boundary_class(boundary: &Boundary) -> String {
    let chars: Vec<char> = match boundary {
        Boundary::Chars(chars) => chars.chars().unique().collect(),
        Boundary::Words(words) => words.iter().flat_map(|word| word.chars()).unique().collect(),
    };
    if chars.is_empty() {
        return "(?s:.)".to_owned();
    }
    let mut class = String::from("[^");
    for ch in chars {
        push_class_char(&mut class, ch);
    }
    class.push(']');
    class
}

/// Translates `pattern` into regex source, without anchors.
///
/// `?` becomes the boundary class, `*` zero-or-more boundary-excluded
/// characters or escape pairs, `**` crosses boundaries unless globstar is
/// disabled, `[...]` becomes a regex class, and everything else is
/// emitted as literal text.
pub(crate) fn translate(pattern: &str, options: &GlobOptions, boundary_class: &str) -> Translation {
    let boundary_sequence = format!("(?:{boundary_class}|\\\\.)*");
    let chars: Vec<char> = pattern.chars().collect();
    let mut source = String::with_capacity(pattern.len() * 2);
    let mut is_glob = false;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => match chars.get(i + 1) {
                Some(&next) if next != '\\' && next != '/' => {
                    push_literal(&mut source, next);
                    i += 2;
                }
                _ => {
                    push_literal(&mut source, '\\');
                    i += 1;
                }
            },
            '?' => {
                is_glob = true;
                source.push_str(boundary_class);
                i += 1;
            }
            '*' => {
                is_glob = true;
                if chars.get(i + 1) == Some(&'*') {
                    source.push_str(if options.no_globstar {
                        &boundary_sequence
                    } else {
                        ".*"
                    });
                    i += 2;
                } else {
                    source.push_str(&boundary_sequence);
                    i += 1;
                }
            }
            '[' => match scan_charset(&chars, i) {
                Some(token) => {
                    if options.no_charset {
                        push_literal(&mut source, '[');
                        if token.negated {
                            push_literal(&mut source, '!');
                        }
                        for &ch in &chars[token.body.clone()] {
                            push_literal(&mut source, ch);
                        }
                        push_literal(&mut source, ']');
                    } else {
                        is_glob = true;
                        emit_class(&mut source, token.negated, &chars[token.body.clone()]);
                    }
                    i = token.end;
                }
                None => {
                    push_literal(&mut source, '[');
                    i += 1;
                }
            },
            other => {
                push_literal(&mut source, other);
                i += 1;
            }
        }
    }

    Translation { source, is_glob }
}

/// Returns true if `pattern` contains at least one unescaped wildcard or
/// complete charset token.
///
/// ```rust
/// assert!(starglob::is_glob("*.txt"));
/// assert!(starglob::is_glob("[a-c].txt"));
/// assert!(!starglob::is_glob("plain.txt"));
/// assert!(!starglob::is_glob("a\\*b"));
/// ```
pub fn is_glob(pattern: &str) -> bool {
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => match chars.get(i + 1) {
                Some(&next) if next != '\\' && next != '/' => i += 2,
                _ => i += 1,
            },
            '?' | '*' => return true,
            '[' => {
                if scan_charset(&chars, i).is_some() {
                    return true;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    false
}

/// A complete `[...]` token found during scanning.
struct CharsetToken {
    negated: bool,
    /// Body char indices, escapes still in place.
    body: Range<usize>,
    /// Index one past the closing bracket.
    end: usize,
}

/// Scans a charset token starting at `chars[start]` (a `[`). The body may
/// not contain an unescaped `/`, and `[]` is not a token at all.
fn scan_charset(chars: &[char], start: usize) -> Option<CharsetToken> {
    let mut j = start + 1;
    if chars.get(j) == Some(&']') {
        return None;
    }
    let negated = chars.get(j) == Some(&'!');
    if negated {
        j += 1;
    }
    let body_start = j;
    while j < chars.len() {
        match chars[j] {
            ']' => {
                return Some(CharsetToken {
                    negated,
                    body: body_start..j,
                    end: j + 1,
                });
            }
            '\\' => {
                if j + 1 >= chars.len() {
                    return None;
                }
                j += 2;
            }
            '/' => return None,
            _ => j += 1,
        }
    }
    None
}

/// Emits a regex character class from a raw charset body: unescape the
/// content, guard a leading caret, re-escape class metacharacters.
fn emit_class(out: &mut String, negated: bool, body: &[char]) {
    let mut unescaped = Vec::with_capacity(body.len());
    let mut k = 0;
    while k < body.len() {
        if body[k] == '\\' && k + 1 < body.len() {
            unescaped.push(body[k + 1]);
            k += 2;
        } else {
            unescaped.push(body[k]);
            k += 1;
        }
    }

    // `[!]` in the source: a negated empty class matches anything.
    if unescaped.is_empty() {
        out.push_str("(?s:.)");
        return;
    }

    out.push('[');
    if negated {
        out.push('^');
    }
    for (pos, &ch) in unescaped.iter().enumerate() {
        match ch {
            '^' if pos == 0 => out.push_str("\\^"),
            '\\' | '[' | ']' | '&' | '~' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out.push(']');
}

/// Appends `ch` to the regex source, escaped if it is a metacharacter.
fn push_literal(out: &mut String, ch: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
}

/// Escapes `ch` for use inside a regex character class.
fn push_class_char(out: &mut String, ch: char) {
    if matches!(ch, '\\' | '[' | ']' | '^' | '-' | '&' | '~') {
        out.push('\\');
    }
    out.push(ch);
}
