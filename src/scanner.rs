//! Search path scanner producing launch candidates

use std::collections::{HashSet, VecDeque};
use std::env;
use std::ffi::OsStr;
use std::fs::{self, DirEntry};
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::{Candidate, MAX_CANDIDATES};

/// Scan counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanProgress {
    /// Directories read successfully
    pub visited:    usize,
    /// Directories that could not be read
    pub skipped:    usize,
    /// Unique candidates collected
    pub candidates: usize,
}

/// Scanner over the directories of a search path
///
/// Directories are processed in search path order, so the first directory
/// providing a name wins.
#[derive(Debug)]
pub struct PathScanner {
    /// Directories still to read, in search order
    queue:      VecDeque<PathBuf>,
    /// Names already claimed by an earlier directory
    seen:       HashSet<String>,
    /// Collected candidates
    candidates: Vec<Candidate>,
    /// Names matching these patterns are left out
    exclude:    GlobSet,
    /// Maximum number of candidates collected
    limit:      usize,
    /// Scan counters
    progress:   ScanProgress,
}

/// Scan `path_list` to completion
///
/// Convenience wrapper around [`PathScanner`] with no exclusions.
#[must_use]
pub fn scan(path_list: impl AsRef<OsStr>) -> Vec<Candidate> {
    PathScanner::new(path_list).finish()
}

impl PathScanner {
    /// Create a scanner over a platform path list such as the value of `PATH`
    ///
    /// Empty entries are ignored.
    pub fn new(path_list: impl AsRef<OsStr>) -> Self {
        Self::from_dirs(env::split_paths(path_list.as_ref()))
    }

    /// Create a scanner over the `PATH` of the current process
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(env::var_os("PATH").unwrap_or_default())
    }

    /// Create a scanner over an explicit list of directories
    ///
    /// Existing directories are canonicalized; others are made absolute.
    pub fn from_dirs(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        let queue = dirs
            .into_iter()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(|dir| {
                fs::canonicalize(&dir).or_else(|_| std::path::absolute(&dir)).unwrap_or(dir)
            })
            .collect();

        Self {
            queue,
            seen: HashSet::new(),
            candidates: Vec::new(),
            exclude: GlobSet::empty(),
            limit: MAX_CANDIDATES,
            progress: ScanProgress::default(),
        }
    }

    /// Leave out names matching any of `patterns`
    ///
    /// # Errors
    /// Returns error if a pattern is not a valid glob.
    pub fn with_exclusions<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        self.exclude = compile_exclusions(patterns)?;
        Ok(self)
    }

    /// Stop collecting once `limit` candidates are found
    ///
    /// The limit is clamped to `1..=MAX_CANDIDATES`.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.clamp(1, MAX_CANDIDATES);
        self
    }

    /// Current scan counters
    #[must_use = "Progress information should be used for monitoring"]
    pub const fn progress(&self) -> ScanProgress {
        self.progress
    }

    /// Read the next directory of the search path
    ///
    /// Returns the number of new candidates it contributed, or `None` once
    /// every directory has been processed. Unreadable directories and entries
    /// are skipped.
    pub fn process_next(&mut self) -> Option<usize> {
        let dir = self.queue.pop_front()?;

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "skipping search path entry");
                self.progress.skipped += 1;
                return Some(0);
            },
        };
        self.progress.visited += 1;

        let before = self.candidates.len();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                    continue;
                },
            };

            if let Some(candidate) = self.admit(&entry) {
                self.candidates.push(candidate);
            }

            if self.candidates.len() >= self.limit {
                warn!(limit = self.limit, "candidate limit reached, stopping scan");
                self.queue.clear();
                break;
            }
        }

        let added = self.candidates.len() - before;
        self.progress.candidates = self.candidates.len();
        assert!(self.candidates.len() <= self.limit, "Candidate count must not exceed limit");

        Some(added)
    }

    /// Finish the scan and return candidates ordered by length, then name
    #[must_use]
    pub fn finish(mut self) -> Vec<Candidate> {
        while self.process_next().is_some() {}

        let ScanProgress { visited, skipped, candidates } = self.progress;
        info!(visited, skipped, candidates, "search path scanned");

        self.candidates.sort_by_cached_key(|c| (c.name.chars().count(), c.name.clone()));
        self.candidates
    }

    /// Turn a directory entry into a candidate if it is an unclaimed executable
    fn admit(&mut self, entry: &DirEntry) -> Option<Candidate> {
        let path = entry.path();
        let Ok(name) = entry.file_name().into_string() else {
            debug!(path = %path.display(), "skipping non UTF-8 file name");
            return None;
        };

        if self.seen.contains(&name) || self.exclude.is_match(&name) {
            return None;
        }
        if !is_executable(&path) {
            return None;
        }

        self.seen.insert(name.clone());
        Some(Candidate { name, path })
    }
}

/// Compile exclusion globs into one set
///
/// # Errors
/// Returns error if a pattern is not a valid glob.
pub fn compile_exclusions<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern.as_ref()).map_err(|e| {
            Error::config(&format!("Invalid exclude pattern {:?}: {e}", pattern.as_ref()))
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| Error::config(&format!("Invalid exclude patterns: {e}")))
}

/// Whether `path` is a regular file (after following links) that can be run
#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path).is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

/// Whether `path` is a regular file (after following links) that can be run
#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|meta| meta.is_file())
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs::File;
    use std::os::unix::fs::{PermissionsExt, symlink};

    use tempfile::TempDir;

    use super::*;

    fn create_executable(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        File::create(&path).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn create_plain(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        File::create(&path).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        path
    }

    fn path_list(dirs: &[&Path]) -> std::ffi::OsString {
        env::join_paths(dirs).unwrap()
    }

    fn names(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_empty_path() {
        assert!(scan("").is_empty());

        let mut scanner = PathScanner::new("");
        assert!(scanner.process_next().is_none());
        assert_eq!(scanner.progress(), ScanProgress::default());
    }

    #[test]
    fn test_only_executable_files() {
        let temp_dir = TempDir::new().unwrap();
        create_executable(temp_dir.path(), "run-me");
        create_plain(temp_dir.path(), "README");
        fs::create_dir(temp_dir.path().join("subdir")).unwrap();

        let candidates = scan(temp_dir.path());
        assert_eq!(names(&candidates), ["run-me"]);
        assert_eq!(candidates[0].path, fs::canonicalize(temp_dir.path()).unwrap().join("run-me"));
    }

    #[test]
    fn test_first_directory_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        create_executable(first.path(), "tool");
        let winner = fs::canonicalize(first.path()).unwrap().join("tool");
        create_executable(second.path(), "tool");
        create_executable(second.path(), "other");

        let candidates = scan(path_list(&[first.path(), second.path()]));
        assert_eq!(names(&candidates), ["tool", "other"]);
        assert_eq!(candidates[0].path, winner);
    }

    #[test]
    fn test_no_duplicate_names() {
        let dirs: Vec<TempDir> = (0..4).map(|_| TempDir::new().unwrap()).collect();
        for dir in &dirs {
            create_executable(dir.path(), "sh");
            create_executable(dir.path(), "env");
        }
        let list: Vec<&Path> = dirs.iter().map(TempDir::path).collect();

        let candidates = scan(path_list(&list));
        let unique: HashSet<_> = candidates.iter().map(|c| &c.name).collect();
        assert_eq!(unique.len(), candidates.len());
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_unreadable_directories_skipped() {
        let good = TempDir::new().unwrap();
        create_executable(good.path(), "ok");
        let missing = good.path().join("does-not-exist");
        let not_a_dir = create_executable(good.path(), "file-entry");

        let list = path_list(&[missing.as_path(), not_a_dir.as_path(), good.path()]);
        let mut scanner = PathScanner::new(list);
        assert_eq!(scanner.process_next(), Some(0));
        assert_eq!(scanner.process_next(), Some(0));
        assert_eq!(scanner.process_next(), Some(2));
        assert_eq!(scanner.process_next(), None);

        let progress = scanner.progress();
        assert_eq!(progress.skipped, 2);
        assert_eq!(progress.visited, 1);
        assert_eq!(progress.candidates, 2);
    }

    #[test]
    fn test_symlinks() {
        let temp_dir = TempDir::new().unwrap();
        let target = create_executable(temp_dir.path(), "real");
        symlink(&target, temp_dir.path().join("alias")).unwrap();
        symlink(temp_dir.path().join("gone"), temp_dir.path().join("broken")).unwrap();

        let candidates = scan(temp_dir.path());
        assert_eq!(names(&candidates), ["real", "alias"]);
    }

    #[test]
    fn test_exclusions() {
        let temp_dir = TempDir::new().unwrap();
        create_executable(temp_dir.path(), "firefox");
        create_executable(temp_dir.path(), "libfoo.so");
        create_executable(temp_dir.path(), "x86_64-linux-gnu-ld");

        let candidates = PathScanner::new(temp_dir.path())
            .with_exclusions(&["*.so", "x86_64-*"])
            .unwrap()
            .finish();
        assert_eq!(names(&candidates), ["firefox"]);

        assert!(matches!(
            PathScanner::new(temp_dir.path()).with_exclusions(&["[unclosed"]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_sorted_by_length_then_name() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["zsh", "bash", "ls", "cat", "awk"] {
            create_executable(temp_dir.path(), name);
        }

        let candidates = scan(temp_dir.path());
        assert_eq!(names(&candidates), ["ls", "awk", "cat", "zsh", "bash"]);
    }

    #[test]
    fn test_candidate_limit() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        create_executable(first.path(), "aa");
        create_executable(second.path(), "bb");
        create_executable(second.path(), "cc");

        let mut scanner = PathScanner::new(path_list(&[first.path(), second.path()])).with_limit(2);
        assert_eq!(scanner.process_next(), Some(1));
        assert_eq!(scanner.process_next(), Some(1));
        assert!(scanner.queue.is_empty());
        assert_eq!(scanner.progress().candidates, 2);

        let candidates = scanner.finish();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].name, "aa");
    }

    #[test]
    fn test_limit_reached_skips_later_directories() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        create_executable(first.path(), "one");
        create_executable(second.path(), "two");

        let mut scanner = PathScanner::new(path_list(&[first.path(), second.path()])).with_limit(1);
        assert_eq!(scanner.process_next(), Some(1));
        assert!(scanner.process_next().is_none());
        assert_eq!(names(&scanner.finish()), ["one"]);
    }

    #[test]
    fn test_parent_components_resolved() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("x")).unwrap();
        create_executable(temp_dir.path(), "tool");

        let candidates = scan(temp_dir.path().join("x").join(".."));
        assert_eq!(names(&candidates), ["tool"]);
        assert_eq!(candidates[0].path, fs::canonicalize(temp_dir.path()).unwrap().join("tool"));
        assert!(candidates[0].path.components().all(|c| c != std::path::Component::ParentDir));
    }

    #[test]
    fn test_relative_entries_resolved() {
        let scanner = PathScanner::new("relative/bin");
        assert!(scanner.queue.iter().all(|dir| dir.is_absolute()));
    }
}
