//! Content search over the file catalog.
//!
//! Files are decoded best-effort: invalid UTF-8 is replaced rather than
//! failing the search, and files that cannot be read are skipped. A search
//! that finds nothing is an empty result, never an error.

use std::fs;
use std::path::Path;

use tracing::{debug, instrument, trace};

use crate::core::query::QueryMatcher;
use crate::core::snippet::{render_snippet, split_lines};
use crate::core::types::SearchHit;
use crate::error::ToolError;
use crate::io::catalog::walk_allowed;
use crate::io::sandbox::Sandbox;

/// Parameters for one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest<'a> {
    /// Literal text, or a regex when wrapped in `/.../`.
    pub query: &'a str,
    pub max_hits: usize,
    pub context_lines: usize,
    pub case_sensitive: bool,
}

/// Engine-wide limits that do not come from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Maximum number of files visited, independent of `max_hits`.
    pub file_ceiling: usize,
    pub regex_size_limit: usize,
}

/// Search allowed files and return at most `max_hits` hits, ordered by file
/// visit order then line number.
#[instrument(skip_all, fields(query = request.query, max_hits = request.max_hits))]
pub fn search_files(
    sandbox: &Sandbox,
    request: &SearchRequest<'_>,
    limits: SearchLimits,
) -> Result<Vec<SearchHit>, ToolError> {
    sandbox.ensure_root()?;
    let matcher = QueryMatcher::parse(
        request.query,
        request.case_sensitive,
        limits.regex_size_limit,
    )?;

    let mut hits = Vec::new();
    if request.max_hits == 0 {
        return Ok(hits);
    }

    for path in walk_allowed(sandbox).take(limits.file_ceiling) {
        let Some(text) = read_lossy(&path) else {
            continue;
        };
        let lines = split_lines(&text);
        for (idx, line) in lines.iter().enumerate() {
            if !matcher.matches(line) {
                continue;
            }
            let line_no = idx + 1;
            hits.push(SearchHit {
                path: path.display().to_string(),
                line_no,
                snippet: render_snippet(&lines, line_no, request.context_lines),
            });
            if hits.len() >= request.max_hits {
                debug!(hits = hits.len(), "max hits reached");
                return Ok(hits);
            }
        }
    }

    debug!(hits = hits.len(), regex = matcher.is_regex(), "search finished");
    Ok(hits)
}

fn read_lossy(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) => {
            trace!(path = %path.display(), err = %err, "skipping unreadable file");
            None
        }
    }
}
