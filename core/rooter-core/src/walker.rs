//! Ancestor walk that picks the project root for a starting directory.
//!
//! Starting at the given directory, every configured pattern is tested in
//! order. The first non-negated pattern that matches selects the current
//! directory as the root. Otherwise the walk moves to the parent, ending with
//! no match once the filesystem root has been tested.
//!
//! Negated patterns (`!inner`) never select a root. A negated pattern that
//! evaluates true only means that pattern contributes nothing at this level;
//! the remaining patterns are still tried.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cache::ListingCache;
use crate::paths::normalize_lexical;
use crate::pattern::{parent_dir, Pattern};

/// A resolved root and the pattern that selected it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootMatch {
    pub dir: PathBuf,
    pub pattern: Pattern,
}

/// State for one walk. Owns its own listing cache, so independent walks never
/// share mutable state.
#[derive(Debug)]
pub struct WalkState<'p> {
    current: PathBuf,
    patterns: &'p [Pattern],
    cache: ListingCache,
    levels_visited: usize,
}

impl<'p> WalkState<'p> {
    /// `..` and `.` in `start_dir` are resolved first, so the walk only ever
    /// moves upward.
    pub fn new(start_dir: &Path, patterns: &'p [Pattern]) -> Self {
        Self {
            current: normalize_lexical(start_dir),
            patterns,
            cache: ListingCache::new(),
            levels_visited: 0,
        }
    }

    /// Directory currently under test.
    pub fn current(&self) -> &Path {
        &self.current
    }

    /// Number of directories tested so far.
    pub fn levels_visited(&self) -> usize {
        self.levels_visited
    }

    /// Listing scans performed so far.
    pub fn scans(&self) -> usize {
        self.cache.scans()
    }

    /// Tests every pattern against the current directory, first match wins.
    fn match_current(&mut self) -> Option<&'p Pattern> {
        self.levels_visited += 1;
        let patterns = self.patterns;
        for pattern in patterns {
            let matched = pattern.matches(&self.current, &mut self.cache);
            if matched && !pattern.is_negated() {
                return Some(pattern);
            }
        }
        None
    }

    /// Moves to the parent directory. Returns false at the filesystem root.
    fn ascend(&mut self) -> bool {
        match parent_dir(&self.current) {
            Some(parent) => {
                self.current = parent.to_path_buf();
                true
            }
            None => false,
        }
    }

    /// Runs the walk to completion.
    pub fn run(&mut self) -> Option<RootMatch> {
        loop {
            if let Some(pattern) = self.match_current() {
                return Some(RootMatch {
                    dir: self.current.clone(),
                    pattern: pattern.clone(),
                });
            }
            if !self.ascend() {
                return None;
            }
        }
    }
}

/// Finds the project root for `start_dir`, or `None` if no directory up to the
/// filesystem root matches any pattern.
///
/// Blocking: lists directories for entry patterns. Use
/// [`Dispatcher`](crate::dispatch::Dispatcher) to run it off the caller's thread.
pub fn resolve(start_dir: &Path, patterns: &[Pattern]) -> Option<RootMatch> {
    let mut walk = WalkState::new(start_dir, patterns);
    let result = walk.run();
    tracing::debug!(
        start = %start_dir.display(),
        levels = walk.levels_visited(),
        scans = walk.scans(),
        root = ?result.as_ref().map(|m| m.dir.display().to_string()),
        pattern = ?result.as_ref().map(|m| m.pattern.as_str()),
        "Root walk finished"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn patterns(list: &[&str]) -> Vec<Pattern> {
        list.iter().map(|p| Pattern::from(*p)).collect()
    }

    fn create_dir(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::create_dir_all(&path).expect("Failed to create dir");
        path
    }

    fn create_file(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").expect("Failed to create file");
    }

    #[test]
    fn finds_marker_in_start_directory() {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        create_file(tmp.path(), "Cargo.toml");

        let result = resolve(tmp.path(), &patterns(&["Cargo.toml"])).expect("root");

        assert_eq!(result.dir, tmp.path());
        assert_eq!(result.pattern.as_str(), "Cargo.toml");
    }

    #[test]
    fn walks_up_to_nearest_marker() {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        create_dir(tmp.path(), ".git");
        let deep = create_dir(tmp.path(), "a/b/c/d");

        let result = resolve(&deep, &patterns(&[".git"])).expect("root");

        assert_eq!(result.dir, tmp.path());
    }

    #[test]
    fn nearer_level_beats_earlier_pattern() {
        // /a/b/.git and start at /a/b/src/c: "=src" matches at /a/b/src,
        // which is reached before /a/b.
        let tmp = TempDir::new().expect("Failed to create temp dir");
        let b = create_dir(tmp.path(), "a/b");
        create_dir(&b, ".git");
        let c = create_dir(&b, "src/c");

        let result = resolve(&c, &patterns(&[".git", "=src"])).expect("root");

        assert_eq!(result.dir, b.join("src"));
        assert_eq!(result.pattern.as_str(), "=src");
    }

    #[test]
    fn earlier_pattern_wins_at_same_level() {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        create_file(tmp.path(), "Makefile");
        create_file(tmp.path(), "package.json");

        let result =
            resolve(tmp.path(), &patterns(&["package.json", "Makefile"])).expect("root");
        assert_eq!(result.pattern.as_str(), "package.json");

        let result =
            resolve(tmp.path(), &patterns(&["Makefile", "package.json"])).expect("root");
        assert_eq!(result.pattern.as_str(), "Makefile");
    }

    #[test]
    fn parent_dir_components_never_walk_down() {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        let proj = create_dir(tmp.path(), "proj");
        let sub = create_dir(&proj, "sub");
        create_file(&sub, "Cargo.toml");
        let start = sub.join("..");

        let walk = WalkState::new(&start, &[]);
        assert_eq!(walk.current(), proj);

        let result = resolve(&start, &patterns(&["Cargo.toml"]));
        assert!(result.map_or(true, |found| found.dir != sub));
    }

    #[test]
    fn empty_pattern_list_is_not_found() {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        assert!(resolve(tmp.path(), &[]).is_none());
    }

    #[test]
    fn no_match_reaches_filesystem_root() {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        let deep = create_dir(tmp.path(), "x/y");
        let list = patterns(&["=this-name-does-not-exist-anywhere"]);

        let mut walk = WalkState::new(&deep, &list);
        assert!(walk.run().is_none());
        assert_eq!(walk.current(), Path::new("/"));
        assert_eq!(walk.levels_visited(), deep.ancestors().count());
    }

    #[test]
    fn negated_pattern_never_selects_root() {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        let start = create_dir(tmp.path(), "work");

        // "!=.git" is true at "work" (it is not named .git) but must not stop the walk.
        let list = patterns(&["!=.git", "=work"]);
        let result = resolve(&start, &list).expect("root");

        assert_eq!(result.dir, start);
        assert_eq!(result.pattern.as_str(), "=work");
    }

    #[test]
    fn negated_match_does_not_block_other_patterns() {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        let dot_git = create_dir(tmp.path(), ".git");
        create_file(&dot_git, "HEAD");

        let result = resolve(&dot_git, &patterns(&["!=.git", "HEAD"])).expect("root");

        assert_eq!(result.dir, dot_git);
        assert_eq!(result.pattern.as_str(), "HEAD");
    }

    #[test]
    fn parent_and_ancestor_patterns_in_walk() {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        let plugin = create_dir(tmp.path(), "plugins/spell/lua");

        let result = resolve(&plugin, &patterns(&[">plugins"])).expect("root");
        assert_eq!(result.dir, tmp.path().join("plugins/spell"));

        let result = resolve(&plugin, &patterns(&["^plugins"])).expect("root");
        assert_eq!(result.dir, plugin);
    }

    #[test]
    fn scans_once_per_level() {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        let start = create_dir(tmp.path(), "one/two");
        create_file(tmp.path(), "go.mod");

        let list = patterns(&["a", "b", "c", "go.mod"]);
        let mut walk = WalkState::new(&start, &list);
        let result = walk.run().expect("root");

        assert_eq!(result.dir, tmp.path());
        assert_eq!(walk.levels_visited(), 3);
        assert_eq!(walk.scans(), 3);
    }

    #[test]
    fn missing_start_directory_still_terminates() {
        let result = resolve(
            Path::new("/definitely/does/not/exist"),
            &patterns(&["=definitely"]),
        )
        .expect("root");
        assert_eq!(result.dir, Path::new("/definitely"));
    }

    #[test]
    fn deterministic_across_runs() {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        create_file(tmp.path(), "pyproject.toml");
        let start = create_dir(tmp.path(), "pkg/mod");
        let list = patterns(&[".hg", "pyproject.toml", "=pkg"]);

        let first = resolve(&start, &list);
        let second = resolve(&start, &list);

        assert_eq!(first, second);
        assert_eq!(first.expect("root").pattern.as_str(), "=pkg");
    }
}
