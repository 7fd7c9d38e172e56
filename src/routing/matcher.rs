//! Glob matching for request paths and source files.
//!
//! # Responsibilities
//! - Match a trimmed request path against a route pattern
//! - Match asset-root-relative file paths against a source glob union
//!
//! # Design Decisions
//! - Full-path glob semantics: `*` never crosses `/`, `**/` spans directories
//! - Paths are always `/`-separated and relative (no leading slash)
//! - A source glob keeps its original patterns for display and diagnostics

use std::fmt;

use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};

/// Trait for matching relative paths against a pattern.
pub trait PathMatcher: Send + Sync + fmt::Debug {
    /// Returns true if `path` matches.
    fn matches(&self, path: &str) -> bool;
}

/// Compile a single glob with path-aware semantics.
pub fn build_glob(pattern: &str) -> Result<Glob, globset::Error> {
    GlobBuilder::new(pattern).literal_separator(true).build()
}

/// Escape glob metacharacters so `input` only matches itself.
pub fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '*' | '?' | '[' | ']' | '{' | '}' => {
                escaped.push('[');
                escaped.push(c);
                escaped.push(']');
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Matches request paths against one route pattern.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: String,
    matcher: GlobMatcher,
}

impl PatternMatcher {
    pub fn new(pattern: impl Into<String>) -> Result<Self, globset::Error> {
        let pattern = pattern.into();
        let matcher = build_glob(&pattern)?.compile_matcher();
        Ok(Self { pattern, matcher })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl PathMatcher for PatternMatcher {
    fn matches(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }
}

/// Union of glob patterns selecting the source files of one request.
#[derive(Debug, Clone)]
pub struct SourceGlob {
    patterns: Vec<String>,
    set: GlobSet,
}

impl SourceGlob {
    /// Build the union of `patterns`. Duplicates are dropped, order is kept.
    pub fn new<I, S>(patterns: I) -> Result<Self, globset::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for pattern in patterns {
            let pattern = pattern.into();
            if !unique.contains(&pattern) {
                unique.push(pattern);
            }
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in &unique {
            builder.add(build_glob(pattern)?);
        }
        Ok(Self {
            patterns: unique,
            set: builder.build()?,
        })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl PathMatcher for SourceGlob {
    fn matches(&self, path: &str) -> bool {
        self.set.is_match(path)
    }
}

impl fmt::Display for SourceGlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.patterns.as_slice() {
            [single] => f.write_str(single),
            many => write!(f, "{{{}}}", many.join(",")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_does_not_cross_separator() {
        let matcher = PatternMatcher::new("*.css").unwrap();
        assert!(matcher.matches("styles.css"));
        assert!(!matcher.matches("css/another.css"));
    }

    #[test]
    fn test_globstar_matches_any_depth() {
        let matcher = PatternMatcher::new("**/*.{css,scss}").unwrap();
        assert!(matcher.matches("styles.scss"));
        assert!(matcher.matches("css/another.css"));
        assert!(matcher.matches("a/b/c.css"));
        assert!(!matcher.matches("a/b/c.js"));
    }

    #[test]
    fn test_literal_pattern() {
        let matcher = PatternMatcher::new("libraries.js").unwrap();
        assert!(matcher.matches("libraries.js"));
        assert!(!matcher.matches("js/libraries.js"));
    }

    #[test]
    fn test_source_glob_union() {
        let glob = SourceGlob::new(["js/libraries/*.js", "vendor/*.js", "js/libraries/*.js"]).unwrap();
        assert_eq!(glob.patterns().len(), 2);
        assert!(glob.matches("js/libraries/a.js"));
        assert!(glob.matches("vendor/b.js"));
        assert!(!glob.matches("js/other.js"));
        assert_eq!(glob.to_string(), "{js/libraries/*.js,vendor/*.js}");

        let single = SourceGlob::new(["date.js"]).unwrap();
        assert_eq!(single.to_string(), "date.js");
    }

    #[test]
    fn test_escape() {
        let glob = SourceGlob::new([format!("{}.{{js,coffee}}", escape("odd[1]*"))]).unwrap();
        assert!(glob.matches("odd[1]*.js"));
        assert!(!glob.matches("odd1x.js"));
    }
}
