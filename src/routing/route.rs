//! A registered asset route.

use crate::pipeline::Stage;
use crate::routing::matcher::{PathMatcher, PatternMatcher};

/// Association between a URL pattern, an optional source glob and the
/// stages that compile matched requests.
///
/// Routes are only created by [`RouteHandle::finish`](super::RouteHandle::finish)
/// and are immutable afterwards.
#[derive(Debug, Clone)]
pub struct Route {
    matcher: PatternMatcher,
    source: Option<String>,
    stages: Vec<Stage>,
}

impl Route {
    pub(crate) fn new(matcher: PatternMatcher, source: Option<String>, stages: Vec<Stage>) -> Self {
        Self {
            matcher,
            source,
            stages,
        }
    }

    /// Alias-expanded URL pattern.
    pub fn pattern(&self) -> &str {
        self.matcher.pattern()
    }

    /// Explicit source glob, if the route overrides it.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Returns true if the trimmed request path matches this route.
    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }
}
