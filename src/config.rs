use crate::error::TrawlError;

/// Configuration consumed by a crawl job.
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Glob patterns excluding paths from the crawl entirely.
    pub ignore_patterns: Vec<String>,
    /// When set, documents are written to the index inline with the
    /// walk instead of through the async queue.
    pub low_memory: bool,
    /// When set, included files get report entries and the report is
    /// written to disk at end of run.
    pub log_indexed: bool,
    /// Capacity of the async index queue (documents).
    pub queue_capacity: usize,
    /// Files larger than this are an extraction failure.
    pub max_file_size: u64,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            low_memory: false,
            log_indexed: false,
            queue_capacity: 1024,
            max_file_size: 1_048_576,
        }
    }
}

/// Precompiled exclude patterns.
///
/// A path is ignored when any pattern matches the full unix-style path
/// or any single path component, so `node_modules` excludes the
/// directory at any depth while `src/generated/*` stays anchored.
#[derive(Debug)]
pub struct IgnoreRules {
    patterns: Vec<glob::Pattern>,
}

impl IgnoreRules {
    pub fn compile(patterns: &[String]) -> Result<Self, TrawlError> {
        let patterns = patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn matches(&self, path_unix: &str) -> bool {
        self.patterns.iter().any(|pattern| {
            pattern.matches(path_unix)
                || path_unix
                    .split('/')
                    .any(|segment| !segment.is_empty() && pattern.matches(segment))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(patterns: &[&str]) -> IgnoreRules {
        let owned: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        IgnoreRules::compile(&owned).unwrap()
    }

    #[test]
    fn segment_pattern_matches_any_depth() {
        let rules = rules(&["node_modules"]);
        assert!(rules.matches("/repo/web/node_modules/left-pad/index.js"));
        assert!(!rules.matches("/repo/src/modules.rs"));
    }

    #[test]
    fn extension_pattern_matches_file_name() {
        let rules = rules(&["*.min.js"]);
        assert!(rules.matches("/repo/static/vendor.min.js"));
        assert!(!rules.matches("/repo/static/vendor.js"));
    }

    #[test]
    fn full_path_pattern() {
        let rules = rules(&["/repo/generated/*"]);
        assert!(rules.matches("/repo/generated/schema.rs"));
        assert!(!rules.matches("/repo/src/schema.rs"));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(IgnoreRules::compile(&["[".to_string()]).is_err());
    }

    #[test]
    fn empty_rules_match_nothing() {
        let rules = rules(&[]);
        assert!(rules.is_empty());
        assert!(!rules.matches("/repo/src/main.rs"));
    }
}
