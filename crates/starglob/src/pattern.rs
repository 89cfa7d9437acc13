//! Compiled glob patterns.

use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::compiler::compile_glob;
use crate::error::GlobError;
use crate::options::GlobOptions;

/// A glob pattern compiled to an anchored regular expression.
///
/// Obtained from [`GlobCompiler::compile`](crate::GlobCompiler::compile),
/// or with default options via [`FromStr`].
#[derive(Debug, Clone)]
pub struct GlobPattern {
    pattern: String,
    regex: Regex,
    is_glob: bool,
}

impl GlobPattern {
    pub(crate) fn new(pattern: String, regex: Regex, is_glob: bool) -> Self {
        GlobPattern {
            pattern,
            regex,
            is_glob,
        }
    }

    /// Tests `text` against the compiled pattern.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// The original glob source.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// The compiled regular expression.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// True if the pattern contained at least one wildcard or charset
    /// token.
    pub fn is_glob(&self) -> bool {
        self.is_glob
    }
}

impl Hash for GlobPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pattern.hash(state);
        self.regex.as_str().hash(state);
    }
}

impl PartialEq for GlobPattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.regex.as_str() == other.regex.as_str()
    }
}

impl Eq for GlobPattern {}

impl Display for GlobPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

impl FromStr for GlobPattern {
    type Err = GlobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        compile_glob(s, &GlobOptions::default()).map(|compiled| (*compiled).clone())
    }
}

impl Serialize for GlobPattern {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.pattern)
    }
}

impl<'de> Deserialize<'de> for GlobPattern {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Cow::<'de, str>::deserialize(deserializer)?;
        GlobPattern::from_str(&s).map_err(serde::de::Error::custom)
    }
}
