//! File catalog: allowed files under the sandbox root in a stable order.

use std::path::PathBuf;

use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::error::ToolError;
use crate::io::sandbox::Sandbox;

/// Iterate allowed files under the root, depth-first with entries sorted by
/// file name.
///
/// Symlinks are not followed and symlinked files are skipped, so every
/// yielded path is a real descendant of the root. Unreadable directory
/// entries are skipped.
pub fn walk_allowed(sandbox: &Sandbox) -> impl Iterator<Item = PathBuf> + '_ {
    WalkDir::new(sandbox.root())
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| sandbox.extensions().allows(path))
}

/// List up to `max_files` allowed files as absolute paths.
///
/// A larger tree yields a partial list, not an error.
#[instrument(skip_all, fields(root = %sandbox.root().display(), max_files = max_files))]
pub fn list_files(sandbox: &Sandbox, max_files: usize) -> Result<Vec<PathBuf>, ToolError> {
    sandbox.ensure_root()?;
    let files: Vec<PathBuf> = walk_allowed(sandbox).take(max_files).collect();
    debug!(count = files.len(), "listed files");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::sandbox::ExtensionSet;
    use std::fs;

    fn fixture() -> (tempfile::TempDir, Sandbox) {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        fs::create_dir_all(root.join("b/nested")).expect("mkdir");
        fs::create_dir_all(root.join("a")).expect("mkdir");
        fs::write(root.join("z.txt"), "z").expect("write");
        fs::write(root.join("b/nested/deep.md"), "deep").expect("write");
        fs::write(root.join("b/first.log"), "log").expect("write");
        fs::write(root.join("a/image.png"), "png").expect("write");
        fs::write(root.join("a/readme.MD"), "readme").expect("write");
        let sandbox =
            Sandbox::new(root, ExtensionSet::new(["txt", "md", "log"])).expect("sandbox");
        (temp, sandbox)
    }

    fn relative(sandbox: &Sandbox, paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| {
                p.strip_prefix(sandbox.root())
                    .expect("under root")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn lists_allowed_files_depth_first_sorted() {
        let (_temp, sandbox) = fixture();
        let files = list_files(&sandbox, 100).expect("list");
        assert_eq!(
            relative(&sandbox, &files),
            vec!["a/readme.MD", "b/first.log", "b/nested/deep.md", "z.txt"]
        );
        assert!(files.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn order_is_stable_across_calls() {
        let (_temp, sandbox) = fixture();
        let first = list_files(&sandbox, 100).expect("list");
        let second = list_files(&sandbox, 100).expect("list");
        assert_eq!(first, second);
    }

    #[test]
    fn stops_at_max_files() {
        let (_temp, sandbox) = fixture();
        let files = list_files(&sandbox, 2).expect("list");
        assert_eq!(relative(&sandbox, &files), vec!["a/readme.MD", "b/first.log"]);
    }

    #[test]
    fn vanished_root_is_reported() {
        let (temp, sandbox) = fixture();
        drop(temp);
        let err = list_files(&sandbox, 10).unwrap_err();
        assert_eq!(err.kind(), "RootNotFound");
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_files_are_not_listed() {
        let (temp, sandbox) = fixture();
        let outside = tempfile::tempdir().expect("tempdir");
        fs::write(outside.path().join("secret.txt"), "secret").expect("write");
        std::os::unix::fs::symlink(
            outside.path().join("secret.txt"),
            temp.path().join("link.txt"),
        )
        .expect("symlink");

        let files = list_files(&sandbox, 100).expect("list");
        assert!(!relative(&sandbox, &files).contains(&"link.txt".to_string()));
    }
}
