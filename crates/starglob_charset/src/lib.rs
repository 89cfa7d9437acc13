#![deny(missing_docs)]
//! Compile character-class specifications into reusable membership
//! matchers.
//!
//! A [`CharacterSet`] is built either from bracket-expression syntax
//! (`"a-z\\d"`, with an optional leading `^` for negation) or from a
//! structured [`SetSpec`]. Compilation substitutes the shorthand tokens
//! `\s`, `\d` and `\w`, resolves escape sequences, optionally folds in
//! case counterparts, collapses touching ranges and removes characters a
//! range already covers. The result is a matcher whose
//! [`contains`](CharacterSet::contains) is a plain membership test, meant
//! to be compiled once and reused.
//!
//! ```rust
//! use starglob_charset::CharacterSet;
//!
//! let set = CharacterSet::parse("a-c", false).unwrap();
//! assert!(set.contains('b'));
//! assert!(!set.contains('d'));
//!
//! let negated = CharacterSet::parse("^a-c", false).unwrap();
//! assert!(negated.contains('d'));
//! ```

mod casing;
mod parse;
mod set;

pub use set::{CharacterSet, CharacterSetError, SetSpec};
