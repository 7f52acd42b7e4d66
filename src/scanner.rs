use crate::{
    error::Error,
    file::{normalize_relative, read_text, FileData, SkippedFile},
    pattern::IgnoreMatcher,
};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::{DirEntry, WalkDir};

/// Statistics collected during scanning.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    /// Files discovered by the walk
    pub discovered: usize,

    /// Files rejected by an ignore pattern or as the tool's own artifacts
    pub excluded: usize,

    /// Files that could not be read
    pub skipped: usize,

    /// Files read successfully
    pub included: usize,
}

/// Everything a scan produced.
#[derive(Debug, Default)]
pub(crate) struct ScanOutcome {
    pub(crate) files: Vec<FileData>,
    pub(crate) skipped: Vec<SkippedFile>,
    pub(crate) stats: ScanStats,
}

/// Walks a directory tree and collects the text of every non-excluded file.
pub(crate) struct Scanner<'a> {
    root_dir: PathBuf,
    matcher: &'a IgnoreMatcher,
    reserved: Vec<String>,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner over `root_dir` filtered by `matcher`.
    pub(crate) fn new(root_dir: impl Into<PathBuf>, matcher: &'a IgnoreMatcher) -> Self {
        Self {
            root_dir: root_dir.into(),
            matcher,
            reserved: Vec::new(),
        }
    }

    /// Always skips these paths (output document, store, ignore file), whatever the patterns say.
    ///
    /// Paths outside the root are dropped.
    pub(crate) fn reserve<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.reserved.extend(
            paths
                .into_iter()
                .filter_map(|path| relative_to_root(&self.root_dir, path.as_ref())),
        );
        self
    }

    /// Walks the tree depth-first in filesystem order.
    ///
    /// Unreadable files and walk errors are logged and recorded, never fatal.
    pub(crate) fn scan(&self) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();

        debug!("Starting scan of {}", self.root_dir.display());

        for result in WalkDir::new(&self.root_dir).follow_links(false) {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Walk error: {}", e);
                    let relative_path = e
                        .path()
                        .and_then(|p| pathdiff::diff_paths(p, &self.root_dir))
                        .map(|p| normalize_relative(&p))
                        .unwrap_or_default();
                    outcome.skipped.push(SkippedFile {
                        relative_path,
                        reason: Error::walk(&e),
                    });
                    outcome.stats.skipped += 1;
                    continue;
                }
            };

            if !is_file_like(&entry) {
                continue;
            }
            outcome.stats.discovered += 1;

            let relative_path = self.relative_path(entry.path());

            if self.reserved.contains(&relative_path) || self.matcher.is_excluded(&relative_path) {
                trace!("Excluded: {}", relative_path);
                outcome.stats.excluded += 1;
                continue;
            }

            match read_text(entry.path()) {
                Ok(content) => {
                    trace!("Read {} ({} bytes)", relative_path, content.len());
                    outcome.files.push(FileData::new(relative_path, content));
                    outcome.stats.included += 1;
                }
                Err(e) => {
                    warn!("Failed to read {}: {}", entry.path().display(), e);
                    outcome.skipped.push(SkippedFile {
                        relative_path,
                        reason: e,
                    });
                    outcome.stats.skipped += 1;
                }
            }
        }

        debug!(
            "Scan complete: {} discovered, {} excluded, {} skipped, {} included",
            outcome.stats.discovered,
            outcome.stats.excluded,
            outcome.stats.skipped,
            outcome.stats.included
        );

        outcome
    }

    fn relative_path(&self, path: &Path) -> String {
        let relative =
            pathdiff::diff_paths(path, &self.root_dir).unwrap_or_else(|| path.to_path_buf());
        normalize_relative(&relative)
    }
}

/// Regular files, plus symlinks that do not resolve to a directory (broken ones included).
fn is_file_like(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && !entry.path().is_dir())
}

/// Expresses `target` relative to `root`, resolving both through the filesystem.
fn relative_to_root(root: &Path, target: &Path) -> Option<String> {
    let root = root.canonicalize().ok()?;
    let file_name = target.file_name()?;
    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let target = parent.canonicalize().ok()?.join(file_name);

    let relative = target.strip_prefix(&root).ok()?;
    Some(normalize_relative(relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{DEFAULT_IGNORE_PATTERNS, MatchOptions};
    use assert_fs::prelude::*;

    fn default_matcher() -> IgnoreMatcher {
        IgnoreMatcher::new(DEFAULT_IGNORE_PATTERNS, MatchOptions::default())
    }

    fn paths(outcome: &ScanOutcome) -> Vec<&str> {
        let mut paths: Vec<&str> = outcome.files.iter().map(|f| f.relative_path.as_str()).collect();
        paths.sort_unstable();
        paths
    }

    #[test]
    fn test_scanner_finds_nested_files() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("src/main.rs").write_str("fn main() {}").unwrap();
        temp.child("src/lib.rs").write_str("pub fn test() {}").unwrap();
        temp.child("tests/test.rs").write_str("#[test]\nfn test() {}").unwrap();

        let matcher = default_matcher();
        let outcome = Scanner::new(temp.path(), &matcher).scan();

        assert_eq!(paths(&outcome), vec!["src/lib.rs", "src/main.rs", "tests/test.rs"]);
        assert_eq!(outcome.stats.included, 3);
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_scanner_applies_patterns() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.txt").write_str("hello world").unwrap();
        temp.child("secret.pem").write_str("-----BEGIN-----").unwrap();
        temp.child("node_modules/pkg/index.js").write_str("x").unwrap();
        temp.child("src/build/gen.rs").write_str("x").unwrap();

        let matcher = default_matcher();
        let outcome = Scanner::new(temp.path(), &matcher).scan();

        assert_eq!(paths(&outcome), vec!["a.txt"]);
        assert_eq!(outcome.stats.discovered, 4);
        assert_eq!(outcome.stats.excluded, 3);
    }

    #[test]
    fn test_scanner_skips_unreadable_files() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("good.txt").write_str("fine").unwrap();
        temp.child("bad.txt").write_binary(&[0xff, 0xfe, 0xfd]).unwrap();
        temp.child("blob.dat").write_binary(&[1, 0, 2, 0]).unwrap();

        let matcher = default_matcher();
        let outcome = Scanner::new(temp.path(), &matcher).scan();

        assert_eq!(paths(&outcome), vec!["good.txt"]);
        let mut skipped: Vec<&str> = outcome
            .skipped
            .iter()
            .map(|s| s.relative_path.as_str())
            .collect();
        skipped.sort_unstable();
        assert_eq!(skipped, vec!["bad.txt", "blob.dat"]);
        assert!(outcome.skipped.iter().all(|s| s.reason.is_unreadable_file()));
    }

    #[cfg(unix)]
    #[test]
    fn test_scanner_reports_broken_symlink() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("real.txt").write_str("present").unwrap();
        std::os::unix::fs::symlink(
            temp.path().join("missing.txt"),
            temp.path().join("dangling.txt"),
        )
        .unwrap();

        let matcher = default_matcher();
        let outcome = Scanner::new(temp.path(), &matcher).scan();

        assert_eq!(paths(&outcome), vec!["real.txt"]);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].relative_path, "dangling.txt");
        assert!(outcome.skipped[0].reason.is_io());
    }

    #[test]
    fn test_reserved_paths_are_excluded_without_patterns() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("context/out.md").write_str("previous run").unwrap();
        temp.child("main.py").write_str("print(1)").unwrap();

        let matcher = IgnoreMatcher::default();
        let outcome = Scanner::new(temp.path(), &matcher)
            .reserve([temp.path().join("context/out.md")])
            .scan();

        assert_eq!(paths(&outcome), vec!["main.py"]);
    }

    #[test]
    fn test_reserve_ignores_paths_outside_root() {
        let root = assert_fs::TempDir::new().unwrap();
        let elsewhere = assert_fs::TempDir::new().unwrap();

        let matcher = IgnoreMatcher::default();
        let scanner =
            Scanner::new(root.path(), &matcher).reserve([elsewhere.path().join("out.md")]);

        assert!(scanner.reserved.is_empty());
    }

    #[test]
    fn test_scanner_empty_directory() {
        let temp = assert_fs::TempDir::new().unwrap();

        let matcher = default_matcher();
        let outcome = Scanner::new(temp.path(), &matcher).scan();

        assert!(outcome.files.is_empty());
        assert_eq!(outcome.stats, ScanStats::default());
    }
}
