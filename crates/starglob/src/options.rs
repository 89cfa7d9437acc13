//! Compilation options for glob patterns.

use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Regex-level flags recognized by the glob compiler.
///
/// `case_insensitive` maps onto the compiled regex; `global` has no
/// compile-time effect (match iteration is explicit in Rust) but keeps
/// otherwise-identical patterns distinct in the compiler cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MatchFlags {
    /// `g`: global matching.
    pub global: bool,
    /// `i`: case-insensitive matching.
    pub case_insensitive: bool,
}

impl MatchFlags {
    /// The `i` flag alone.
    pub const CASE_INSENSITIVE: MatchFlags = MatchFlags {
        global: false,
        case_insensitive: true,
    };

    /// The `g` flag alone.
    pub const GLOBAL: MatchFlags = MatchFlags {
        global: true,
        case_insensitive: false,
    };

    /// Both `g` and `i`.
    pub const GLOBAL_CASE_INSENSITIVE: MatchFlags = MatchFlags {
        global: true,
        case_insensitive: true,
    };
}

/// Error when parsing [`MatchFlags`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown match flag '{0}', expected 'g' or 'i'")]
pub struct ParseMatchFlagsError(
    /// The unrecognized flag character.
    pub char,
);

impl FromStr for MatchFlags {
    type Err = ParseMatchFlagsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = MatchFlags::default();
        for ch in s.chars() {
            match ch {
                'g' => flags.global = true,
                'i' => flags.case_insensitive = true,
                other => return Err(ParseMatchFlagsError(other)),
            }
        }
        Ok(flags)
    }
}

impl Display for MatchFlags {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.global {
            f.write_str("g")?;
        }
        if self.case_insensitive {
            f.write_str("i")?;
        }
        Ok(())
    }
}

impl Serialize for MatchFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MatchFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Cow::<'de, str>::deserialize(deserializer)?;
        MatchFlags::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// The disallowed-character class that `?` and a single `*` may not
/// cross. Every character of every entry is excluded; the default
/// boundary is the path separator `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Boundary {
    /// The characters of a single string.
    Chars(String),
    /// The characters of each word in the list.
    Words(Vec<String>),
}

impl Default for Boundary {
    fn default() -> Self {
        Boundary::Chars("/".to_owned())
    }
}

impl Boundary {
    /// Cache key distinguishing boundary specifications.
    pub(crate) fn cache_key(&self) -> String {
        match self {
            Boundary::Chars(chars) => chars.clone(),
            Boundary::Words(words) => words.join("//"),
        }
    }
}

/// Options controlling glob compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobOptions {
    /// Skip the `^` anchor.
    pub no_match_start: bool,
    /// Skip the `$` anchor.
    pub no_match_end: bool,
    /// Skip both anchors.
    pub no_match_full: bool,
    /// Treat `**` like a single `*`.
    pub no_globstar: bool,
    /// Treat `[...]` tokens as literal text.
    pub no_charset: bool,
    /// Regex-level flags.
    pub flags: MatchFlags,
    /// Disallowed-character class for `?` and single `*`.
    pub boundary: Boundary,
}

impl GlobOptions {
    /// The `i` template: case-insensitive matching.
    pub fn case_insensitive() -> Self {
        GlobOptions {
            flags: MatchFlags::CASE_INSENSITIVE,
            ..GlobOptions::default()
        }
    }

    /// The `g` template: global matching.
    pub fn global() -> Self {
        GlobOptions {
            flags: MatchFlags::GLOBAL,
            ..GlobOptions::default()
        }
    }

    /// The `gi` template: global, case-insensitive matching.
    pub fn global_insensitive() -> Self {
        GlobOptions {
            flags: MatchFlags::GLOBAL_CASE_INSENSITIVE,
            ..GlobOptions::default()
        }
    }
}
