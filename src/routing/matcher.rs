//! Route matching logic.
//!
//! # Responsibilities
//! - Match a service prefix on a segment boundary
//! - Match endpoint path templates such as `/api/scripts/{script_id}/status`
//! - Capture path parameters
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Parameters match exactly one non-empty segment
//! - No regex to guarantee O(n) matching

/// One segment of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(&'static str),
    Param(&'static str),
}

/// A parsed path template.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: &'static str,
    segments: Vec<Segment>,
}

/// Parameters captured by a successful match, in template order.
pub type PathParams<'p> = Vec<(&'static str, &'p str)>;

impl PathPattern {
    /// Parse a template. `{name}` segments become parameters.
    pub fn parse(raw: &'static str) -> Self {
        let segments = raw
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => Segment::Param(name),
                None => Segment::Literal(s),
            })
            .collect();
        Self { raw, segments }
    }

    /// The template as written.
    pub fn as_str(&self) -> &'static str {
        self.raw
    }

    /// Number of literal segments; more literals means a more specific route.
    pub fn specificity(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    /// Match a normalized path, returning captured parameters.
    pub fn match_path<'p>(&self, path: &'p str) -> Option<PathParams<'p>> {
        let mut parts = path.strip_prefix('/')?.split('/');
        let mut params = Vec::new();

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(lit) if *lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(_) if part.is_empty() => return None,
                Segment::Param(name) => params.push((*name, part)),
            }
        }

        if parts.next().is_some() {
            return None;
        }
        Some(params)
    }
}

/// Matches a path prefix on a segment boundary.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: &'static str,
}

impl PathPrefixMatcher {
    pub fn new(prefix: &'static str) -> Self {
        Self { prefix }
    }

    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// `/api/scripts` matches `/api/scripts` and `/api/scripts/x`, not `/api/scriptsx`.
    pub fn matches(&self, path: &str) -> bool {
        self.strip(path).is_some()
    }

    /// The part of `path` after the prefix (empty or starting with `/`).
    pub fn strip<'p>(&self, path: &'p str) -> Option<&'p str> {
        let rest = path.strip_prefix(self.prefix)?;
        if rest.is_empty() || rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }
}
