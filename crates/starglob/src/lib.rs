#![deny(missing_docs)]
//! Compile glob patterns (`?`, `*`, `**`, `[...]`) into anchored regular
//! expressions.
//!
//! Single wildcards never cross the configurable boundary class (the
//! path separator by default); the globstar `**` does. Backslash escapes
//! turn wildcards into literals, and anything the scanner does not
//! recognize is literal text. Compilation results are memoized per
//! [`GlobCompiler`]; the free functions share one process-default
//! compiler.
//!
//! ```rust
//! use starglob::{match_glob, GlobOptions};
//!
//! let options = GlobOptions::default();
//! assert!(match_glob("a.txt", "*.txt", &options));
//! assert!(!match_glob("a/b.txt", "*.txt", &options));
//! assert!(match_glob("a/b/c.txt", "**/*.txt", &options));
//! ```

mod compile;
mod compiler;
mod error;
mod options;
mod pattern;

pub use compile::is_glob;
pub use compiler::{compile_glob, glob_to_regex, match_glob, GlobCompiler};
pub use error::GlobError;
pub use options::{Boundary, GlobOptions, MatchFlags, ParseMatchFlagsError};
pub use pattern::GlobPattern;
