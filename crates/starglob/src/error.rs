//! Error types.

use thiserror::Error;

/// Errors produced while compiling a glob pattern.
///
/// Glob syntax itself cannot fail: unrecognized tokens degrade to literal
/// text. The only failure mode is the regex engine rejecting an emitted
/// character class, e.g. the out-of-order range in `[z-a]`.
#[derive(Debug, Clone, Error)]
pub enum GlobError {
    /// The emitted regex source was rejected by the regex engine.
    #[error("invalid glob pattern '{pattern}'")]
    Regex {
        /// The offending glob pattern.
        pattern: String,
        /// The regex engine's rejection.
        #[source]
        source: regex::Error,
    },
}
