//! The caching glob compiler.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::{Regex, RegexBuilder};
use tracing::{debug, trace};

use crate::compile;
use crate::error::GlobError;
use crate::options::{Boundary, GlobOptions, MatchFlags};
use crate::pattern::GlobPattern;

/// Cache identity of a compilation: pattern, flags, the four behavior
/// switches and the boundary specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    pattern: String,
    flags: MatchFlags,
    match_start: bool,
    match_end: bool,
    globstar: bool,
    charset: bool,
    boundary: String,
}

/// Compiles glob patterns into [`GlobPattern`]s, memoizing results.
///
/// Each compiler owns its caches; independent compilers share nothing.
/// Identical `(pattern, options)` pairs return clones of the same
/// [`Arc`], so results are reference-stable for the lifetime of the
/// cache entry. Failed compilations are never cached.
pub struct GlobCompiler {
    patterns: Mutex<LruCache<CacheKey, Arc<GlobPattern>>>,
    boundaries: Mutex<HashMap<String, Arc<str>>>,
}

impl GlobCompiler {
    /// Creates a compiler with an unbounded pattern cache.
    pub fn new() -> Self {
        GlobCompiler {
            patterns: Mutex::new(LruCache::unbounded()),
            boundaries: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a compiler that keeps at most `capacity` compiled
    /// patterns, evicting the least recently used entry.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        GlobCompiler {
            patterns: Mutex::new(LruCache::new(capacity)),
            boundaries: Mutex::new(HashMap::new()),
        }
    }

    /// Compiles `pattern`, returning a cached result when one exists for
    /// the same pattern and options.
    pub fn compile(
        &self,
        pattern: &str,
        options: &GlobOptions,
    ) -> Result<Arc<GlobPattern>, GlobError> {
        let match_start = !options.no_match_start && !options.no_match_full;
        let match_end = !options.no_match_end && !options.no_match_full;

        let key = CacheKey {
            pattern: pattern.to_owned(),
            flags: options.flags,
            match_start,
            match_end,
            globstar: !options.no_globstar,
            charset: !options.no_charset,
            boundary: options.boundary.cache_key(),
        };

        if let Some(compiled) = self.patterns.lock().get(&key) {
            trace!(pattern, "glob cache hit");
            return Ok(Arc::clone(compiled));
        }

        let boundary_class = self.boundary_class(&options.boundary);
        let translation = compile::translate(pattern, options, &boundary_class);

        let mut source = translation.source;
        if match_start {
            source.insert(0, '^');
        }
        if match_end {
            source.push('$');
        }

        let regex = RegexBuilder::new(&source)
            .case_insensitive(options.flags.case_insensitive)
            .build()
            .map_err(|source| GlobError::Regex {
                pattern: pattern.to_owned(),
                source,
            })?;
        debug!(pattern, regex = regex.as_str(), "compiled glob");

        let compiled = Arc::new(GlobPattern::new(
            pattern.to_owned(),
            regex,
            translation.is_glob,
        ));
        self.patterns.lock().put(key, Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Compiles (or fetches) `pattern` and tests `text` against it. A
    /// pattern the regex engine rejects matches nothing.
    pub fn matches(&self, text: &str, pattern: &str, options: &GlobOptions) -> bool {
        self.compile(pattern, options)
            .map(|compiled| compiled.is_match(text))
            .unwrap_or(false)
    }

    /// The compiled regular expression for `pattern`, or `None` when the
    /// emitted source is rejected.
    pub fn to_regex(&self, pattern: &str, options: &GlobOptions) -> Option<Regex> {
        self.compile(pattern, options)
            .ok()
            .map(|compiled| compiled.regex().clone())
    }

    /// Drops every cached pattern and boundary class.
    pub fn clear_cache(&self) {
        self.patterns.lock().clear();
        self.boundaries.lock().clear();
    }

    fn boundary_class(&self, boundary: &Boundary) -> Arc<str> {
        let key = boundary.cache_key();
        let mut cache = self.boundaries.lock();
        if let Some(class) = cache.get(&key) {
            return Arc::clone(class);
        }
        let class: Arc<str> = compile::boundary_class(boundary).into();
        cache.insert(key, Arc::clone(&class));
        class
    }
}

impl Default for GlobCompiler {
    fn default() -> Self {
        GlobCompiler::new()
    }
}

/// Process-default compiler backing the free functions.
static DEFAULT: Lazy<GlobCompiler> = Lazy::new(GlobCompiler::new);

/// Compiles `pattern` with the process-default compiler.
pub fn compile_glob(pattern: &str, options: &GlobOptions) -> Result<Arc<GlobPattern>, GlobError> {
    DEFAULT.compile(pattern, options)
}

/// Tests `text` against `pattern` using the process-default compiler.
pub fn match_glob(text: &str, pattern: &str, options: &GlobOptions) -> bool {
    DEFAULT.matches(text, pattern, options)
}

/// The compiled regular expression for `pattern`, from the
/// process-default compiler, or `None` when compilation fails.
pub fn glob_to_regex(pattern: &str, options: &GlobOptions) -> Option<Regex> {
    DEFAULT.to_regex(pattern, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    #[rstest]
    #[case("*.txt", "a.txt", true)]
    #[case("*.txt", "a/b.txt", false)]
    #[case("**/*.txt", "a/b/c.txt", true)]
    #[case("a?c", "abc", true)]
    #[case("a?c", "ac", false)]
    #[case("a?c", "a/c", false)]
    #[case("[a-c]x", "bx", true)]
    #[case("[a-c]x", "dx", false)]
    #[case("[!a-c]x", "dx", true)]
    #[case("[!a-c]x", "bx", false)]
    #[case("a\\*b", "a*b", true)]
    #[case("a\\*b", "axb", false)]
    fn default_matching(#[case] pattern: &str, #[case] text: &str, #[case] expected: bool) {
        let compiler = GlobCompiler::new();
        assert_eq!(
            compiler.matches(text, pattern, &GlobOptions::default()),
            expected
        );
    }

    #[test]
    fn identical_compilations_are_reference_stable() {
        let compiler = GlobCompiler::new();
        let options = GlobOptions::default();
        let first = compiler.compile("*.txt", &options).unwrap();
        let second = compiler.compile("*.txt", &options).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn distinct_options_compile_separately() {
        let compiler = GlobCompiler::new();
        let plain = compiler.compile("*.txt", &GlobOptions::default()).unwrap();
        let insensitive = compiler
            .compile("*.txt", &GlobOptions::case_insensitive())
            .unwrap();
        assert!(!Arc::ptr_eq(&plain, &insensitive));
    }

    #[test]
    fn case_insensitive_flag_applies() {
        let compiler = GlobCompiler::new();
        assert!(compiler.matches("A.TXT", "*.txt", &GlobOptions::case_insensitive()));
        assert!(!compiler.matches("A.TXT", "*.txt", &GlobOptions::default()));
    }

    #[test]
    fn no_match_full_disables_both_anchors() {
        let compiler = GlobCompiler::new();
        let options = GlobOptions {
            no_match_full: true,
            ..GlobOptions::default()
        };
        assert!(compiler.matches("prefix-abc-suffix", "a?c", &options));
    }

    #[test]
    fn no_match_start_keeps_the_end_anchor() {
        let compiler = GlobCompiler::new();
        let options = GlobOptions {
            no_match_start: true,
            ..GlobOptions::default()
        };
        assert!(compiler.matches("prefix-a.txt", "*.txt", &options));
        assert!(!compiler.matches("a.txt-suffix", "*.txt", &options));
    }

    #[test]
    fn custom_boundary() {
        let compiler = GlobCompiler::new();
        let options = GlobOptions {
            boundary: Boundary::Chars(".".to_owned()),
            ..GlobOptions::default()
        };
        assert!(compiler.matches("a/b", "*", &options));
        assert!(!compiler.matches("a.b", "*", &options));
    }

    #[test]
    fn invalid_charset_range_is_rejected() {
        let compiler = GlobCompiler::new();
        assert_matches!(
            compiler.compile("[z-a]", &GlobOptions::default()),
            Err(GlobError::Regex { .. })
        );
        assert!(!compiler.matches("b", "[z-a]", &GlobOptions::default()));
        assert!(compiler.compile("[z-a]", &GlobOptions::default()).is_err());
    }

    #[test]
    fn bounded_cache_evicts_least_recently_used() {
        let compiler = GlobCompiler::with_capacity(NonZeroUsize::new(1).unwrap());
        let options = GlobOptions::default();
        let first = compiler.compile("*.txt", &options).unwrap();
        compiler.compile("*.rs", &options).unwrap();
        let again = compiler.compile("*.txt", &options).unwrap();
        assert!(!Arc::ptr_eq(&first, &again));
    }

    #[test]
    fn clear_cache_recompiles() {
        let compiler = GlobCompiler::new();
        let options = GlobOptions::default();
        let first = compiler.compile("*.txt", &options).unwrap();
        compiler.clear_cache();
        let second = compiler.compile("*.txt", &options).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn free_functions_share_the_default_compiler() {
        let options = GlobOptions::default();
        let first = compile_glob("free-fn-*.txt", &options).unwrap();
        let second = compile_glob("free-fn-*.txt", &options).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(match_glob("free-fn-a.txt", "free-fn-*.txt", &options));
        assert!(glob_to_regex("free-fn-*.txt", &options).is_some());
        assert!(glob_to_regex("[z-a]", &options).is_none());
    }

    #[test]
    fn is_glob_is_reported_on_the_compiled_pattern() {
        let compiler = GlobCompiler::new();
        let options = GlobOptions::default();
        assert!(compiler.compile("*.txt", &options).unwrap().is_glob());
        assert!(!compiler.compile("plain.txt", &options).unwrap().is_glob());
    }
}
