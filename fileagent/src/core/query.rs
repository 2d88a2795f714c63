//! Search query parsing and per-line matching.
//!
//! A query wrapped in `/.../` is a regular expression; anything else is a
//! literal substring. Matching is unanchored in both modes.

use regex::{Regex, RegexBuilder};

use crate::error::ToolError;

/// Compiled form of a search query.
#[derive(Debug, Clone)]
pub enum QueryMatcher {
    Literal {
        /// Lower-cased when `case_sensitive` is false.
        needle: String,
        case_sensitive: bool,
    },
    Regex(Regex),
}

impl QueryMatcher {
    /// Select the query mode and compile it.
    ///
    /// `regex_size_limit` caps the compiled program size; the regex engine
    /// itself runs in linear time, so no backtracking limit is needed.
    pub fn parse(
        query: &str,
        case_sensitive: bool,
        regex_size_limit: usize,
    ) -> Result<Self, ToolError> {
        if query.is_empty() {
            return Err(ToolError::InvalidQuery("query must be non-empty".to_string()));
        }

        if let Some(pattern) = regex_body(query) {
            if pattern.is_empty() {
                return Err(ToolError::InvalidQuery(
                    "regex pattern between '/' delimiters must be non-empty".to_string(),
                ));
            }
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(!case_sensitive)
                .size_limit(regex_size_limit)
                .build()
                .map_err(|err| ToolError::InvalidQuery(format!("invalid regex: {err}")))?;
            return Ok(QueryMatcher::Regex(regex));
        }

        let needle = if case_sensitive {
            query.to_string()
        } else {
            query.to_lowercase()
        };
        Ok(QueryMatcher::Literal {
            needle,
            case_sensitive,
        })
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, QueryMatcher::Regex(_))
    }

    pub fn matches(&self, line: &str) -> bool {
        match self {
            QueryMatcher::Literal {
                needle,
                case_sensitive: true,
            } => line.contains(needle.as_str()),
            QueryMatcher::Literal {
                needle,
                case_sensitive: false,
            } => line.to_lowercase().contains(needle.as_str()),
            QueryMatcher::Regex(regex) => regex.is_match(line),
        }
    }
}

fn regex_body(query: &str) -> Option<&str> {
    if query.len() >= 2 && query.starts_with('/') && query.ends_with('/') {
        Some(&query[1..query.len() - 1])
    } else {
        None
    }
}
