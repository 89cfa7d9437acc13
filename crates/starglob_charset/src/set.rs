//! The compiled character-set matcher and its build pipeline.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{casing, parse};

pub(crate) type CodePoints = SmallVec<[u32; 8]>;
pub(crate) type Ranges = SmallVec<[(u32, u32); 4]>;

/// Range count above which membership switches from a linear scan to a
/// binary search over sorted ranges.
const BISECT_THRESHOLD: usize = 5;

/// Structured source form of a character set: explicit code points and
/// inclusive code-point ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetSpec {
    /// Individually listed code points.
    pub characters: Vec<u32>,
    /// Inclusive `(start, end)` code-point ranges.
    pub ranges: Vec<(u32, u32)>,
    /// Invert the match sense.
    pub negate: bool,
}

/// Errors produced while compiling a character set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CharacterSetError {
    /// A range's start code point exceeds its end code point.
    #[error("range [{}-{}] is out of order", print_code_point(.start), print_code_point(.end))]
    OutOfOrderRange {
        /// Start code point of the offending range.
        start: u32,
        /// End code point of the offending range.
        end: u32,
    },
}

/// A compiled character-set matcher.
///
/// Produced by [`CharacterSet::parse`] (bracket-expression syntax) or
/// [`CharacterSet::from_spec`] (structured form). Matching is a pure
/// membership test over the compiled data.
#[derive(Debug, Clone)]
pub struct CharacterSet {
    characters: CodePoints,
    ranges: Ranges,
    classes: Vec<&'static CharacterSet>,
    negate: bool,
    bisect: bool,
}

impl CharacterSet {
    /// Compiles a bracket-expression source string.
    ///
    /// A leading `^` negates the set. `x-y` forms an inclusive range; a
    /// dangling `-` degrades to literal characters. The escape vocabulary
    /// covers `\n \r \t \f \v \b`, `\xHH`, `\uHHHH`, `\u{...}`, the
    /// shorthand classes `\s \d \w` and their negated forms `\S \D \W`;
    /// any other escaped character stands for itself.
    pub fn parse(source: &str, case_insensitive: bool) -> Result<Self, CharacterSetError> {
        let (normalized, negate) = parse::normalize(source);
        let mut builder = Builder::new(negate);
        parse::scan(&mut builder, &normalized)?;
        Ok(builder.finish(case_insensitive))
    }

    /// Compiles a structured [`SetSpec`].
    pub fn from_spec(spec: &SetSpec, case_insensitive: bool) -> Result<Self, CharacterSetError> {
        let mut builder = Builder::new(spec.negate);
        for &cp in &spec.characters {
            builder.use_code_point(cp);
        }
        for &(start, end) in &spec.ranges {
            if start > end {
                return Err(CharacterSetError::OutOfOrderRange { start, end });
            }
            builder.push_range(start, end);
        }
        Ok(builder.finish(case_insensitive))
    }

    /// Tests whether `ch` is a member of the set.
    pub fn contains(&self, ch: char) -> bool {
        let cp = ch as u32;
        let mut member = self.characters.iter().any(|&c| c == cp);
        if !member {
            member = if self.bisect {
                self.ranges
                    .binary_search_by(|&(start, end)| {
                        if cp < start {
                            std::cmp::Ordering::Greater
                        } else if cp > end {
                            std::cmp::Ordering::Less
                        } else {
                            std::cmp::Ordering::Equal
                        }
                    })
                    .is_ok()
            } else {
                self.ranges.iter().any(|&(start, end)| cp >= start && cp <= end)
            };
        }
        if !member {
            member = self.classes.iter().any(|class| class.contains(ch));
        }
        member != self.negate
    }

    /// True if the overall match sense is inverted.
    pub fn is_negated(&self) -> bool {
        self.negate
    }

    /// True if the set has no characters, ranges or nested classes. An
    /// empty set matches nothing, or everything when negated.
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty() && self.ranges.is_empty() && self.classes.is_empty()
    }

    /// A negated set built directly from its parts, bypassing parsing.
    /// Backs the static `\S`/`\D`/`\W` classes.
    pub(crate) fn negated(characters: &[u32], ranges: &[(u32, u32)]) -> Self {
        CharacterSet {
            characters: CodePoints::from_slice(characters),
            ranges: Ranges::from_slice(ranges),
            classes: Vec::new(),
            negate: true,
            bisect: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn ranges(&self) -> &[(u32, u32)] {
        &self.ranges
    }

    #[cfg(test)]
    pub(crate) fn characters(&self) -> &[u32] {
        &self.characters
    }
}

impl FromStr for CharacterSet {
    type Err = CharacterSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CharacterSet::parse(s, false)
    }
}

/// Accumulates set members during parsing, then freezes them into a
/// [`CharacterSet`].
pub(crate) struct Builder {
    pub(crate) characters: CodePoints,
    pub(crate) ranges: Ranges,
    classes: Vec<&'static CharacterSet>,
    class_tags: SmallVec<[char; 3]>,
    seen: HashSet<u32>,
    negate: bool,
}

impl Builder {
    pub(crate) fn new(negate: bool) -> Self {
        Builder {
            characters: CodePoints::new(),
            ranges: Ranges::new(),
            classes: Vec::new(),
            class_tags: SmallVec::new(),
            seen: HashSet::new(),
            negate,
        }
    }

    /// Records a code point unless it was already listed.
    pub(crate) fn use_code_point(&mut self, cp: u32) -> bool {
        if !self.seen.insert(cp) {
            return false;
        }
        self.characters.push(cp);
        true
    }

    pub(crate) fn use_char(&mut self, ch: char) -> bool {
        self.use_code_point(ch as u32)
    }

    pub(crate) fn push_range(&mut self, start: u32, end: u32) {
        self.ranges.push((start, end));
    }

    /// Folds in a negated shorthand class (`\S`, `\D`, `\W`) at most once
    /// per compile.
    pub(crate) fn push_class(&mut self, tag: char) {
        if self.class_tags.contains(&tag) {
            return;
        }
        if let Some(class) = parse::negated_class(tag) {
            self.class_tags.push(tag);
            self.classes.push(class);
        }
    }

    pub(crate) fn finish(mut self, case_insensitive: bool) -> CharacterSet {
        if case_insensitive {
            casing::expand(&mut self);
        }
        collapse_ranges(&mut self.ranges);
        remove_covered(&mut self.characters, &self.ranges);

        let bisect = self.ranges.len() > BISECT_THRESHOLD;
        if bisect {
            self.ranges.sort_unstable();
        }

        tracing::trace!(
            characters = self.characters.len(),
            ranges = self.ranges.len(),
            classes = self.classes.len(),
            "compiled character set"
        );

        CharacterSet {
            characters: self.characters,
            ranges: self.ranges,
            classes: self.classes,
            negate: self.negate,
            bisect,
        }
    }
}

/// Merges two ranges whenever the merged span is smaller than the sum of
/// the individual spans plus two, i.e. whenever they overlap or touch.
fn collapse_ranges(ranges: &mut Ranges) {
    let mut i = 0;
    while i < ranges.len() {
        let mut shift = 0;
        for j in (i + 1)..ranges.len() {
            let (start_i, end_i) = ranges[i];
            let (start_j, end_j) = ranges[j];
            let start = start_i.min(start_j);
            let end = end_i.max(end_j);
            let extent = u64::from(end - start);
            let combined = u64::from(end_i - start_i) + u64::from(end_j - start_j) + 2;
            ranges[j - shift] = (start_j, end_j);
            if extent < combined {
                ranges[i] = (start, end);
                shift += 1;
            }
        }
        let len = ranges.len();
        ranges.truncate(len - shift);
        i += 1;
    }
}

/// Drops listed characters that a range already covers.
fn remove_covered(characters: &mut CodePoints, ranges: &Ranges) {
    characters.retain(|cp| {
        let cp = *cp;
        !ranges.iter().any(|&(start, end)| cp >= start && cp <= end)
    });
}

fn print_code_point(cp: &u32) -> String {
    match char::from_u32(*cp) {
        Some('\n') => "\\n".to_owned(),
        Some('\r') => "\\r".to_owned(),
        Some('\t') => "\\t".to_owned(),
        Some('\x0C') => "\\f".to_owned(),
        Some('\x0B') => "\\v".to_owned(),
        Some('\x08') => "\\b".to_owned(),
        Some(ch) => ch.to_string(),
        None => format!("\\u{{{cp:x}}}"),
    }
}
