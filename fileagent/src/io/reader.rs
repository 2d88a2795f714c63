//! Sandboxed file reader with character-based truncation.

use std::fs;

use tracing::{debug, instrument};

use crate::error::ToolError;
use crate::io::sandbox::Sandbox;

/// Appended after the first `max_chars` characters of an oversized file.
pub const TRUNCATION_MARKER: &str = "\n\n...[TRUNCATED]...";

/// Read a file under the root, replacing undecodable bytes.
///
/// Content longer than `max_chars` characters is cut to exactly `max_chars`
/// characters followed by [`TRUNCATION_MARKER`].
#[instrument(skip_all, fields(path = path, max_chars = max_chars))]
pub fn read_file(sandbox: &Sandbox, path: &str, max_chars: usize) -> Result<String, ToolError> {
    let resolved = sandbox.resolve(path)?;

    if !sandbox.extensions().allows(&resolved) {
        let suffix = resolved
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        return Err(ToolError::ExtensionNotAllowed(suffix));
    }
    if !resolved.is_file() {
        return Err(ToolError::FileNotFound(resolved));
    }

    let bytes = fs::read(&resolved).map_err(|_| ToolError::FileNotFound(resolved.clone()))?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(truncate_chars(&text, max_chars))
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            debug!(max_chars, "truncating file content");
            format!("{}{TRUNCATION_MARKER}", &text[..cut])
        }
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::sandbox::ExtensionSet;

    fn fixture() -> (tempfile::TempDir, Sandbox) {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("notes.txt"), "abcdefghijklmnopqrst").expect("write");
        fs::write(temp.path().join("image.png"), "png").expect("write");
        fs::create_dir_all(temp.path().join("dir.txt")).expect("mkdir");
        let sandbox = Sandbox::new(temp.path(), ExtensionSet::new(["txt"])).expect("sandbox");
        (temp, sandbox)
    }

    #[test]
    fn oversized_content_is_cut_with_marker() {
        let (_temp, sandbox) = fixture();
        let text = read_file(&sandbox, "notes.txt", 5).expect("read");
        assert_eq!(text, format!("abcde{TRUNCATION_MARKER}"));
    }

    #[test]
    fn content_at_limit_is_unmodified() {
        let (_temp, sandbox) = fixture();
        assert_eq!(
            read_file(&sandbox, "notes.txt", 20).expect("read"),
            "abcdefghijklmnopqrst"
        );
        assert_eq!(
            read_file(&sandbox, "notes.txt", 100).expect("read"),
            "abcdefghijklmnopqrst"
        );
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("héllo wörld", 4), format!("héll{TRUNCATION_MARKER}"));
        assert_eq!(truncate_chars("héllo", 5), "héllo");
    }

    #[test]
    fn escape_is_access_denied() {
        let (_temp, sandbox) = fixture();
        let err = read_file(&sandbox, "../../etc/passwd", 100).unwrap_err();
        assert_eq!(err.kind(), "AccessDenied");
    }

    #[cfg(unix)]
    #[test]
    fn reads_the_file_the_filesystem_would_open() {
        let (temp, sandbox) = fixture();
        let root = temp.path();
        fs::create_dir_all(root.join("a/b")).expect("mkdir");
        fs::write(root.join("a/secret.txt"), "INSIDE_A").expect("write");
        fs::write(root.join("secret.txt"), "AT_ROOT").expect("write");
        std::os::unix::fs::symlink(root.join("a/b"), root.join("link")).expect("symlink");

        let text = read_file(&sandbox, "link/../secret.txt", 100).expect("read");
        assert_eq!(text, "INSIDE_A");
    }

    #[test]
    fn disallowed_extension_is_rejected() {
        let (_temp, sandbox) = fixture();
        let err = read_file(&sandbox, "image.png", 100).unwrap_err();
        assert_eq!(err.kind(), "ExtensionNotAllowed");
        assert!(err.to_string().contains(".png"));
    }

    #[test]
    fn missing_file_or_directory_is_not_found() {
        let (_temp, sandbox) = fixture();
        assert_eq!(
            read_file(&sandbox, "missing.txt", 100).unwrap_err().kind(),
            "FileNotFound"
        );
        assert_eq!(
            read_file(&sandbox, "dir.txt", 100).unwrap_err().kind(),
            "FileNotFound"
        );
    }
}
