//! Root identification patterns.
//!
//! A pattern is a plain string whose first character selects how it is tested
//! against a candidate directory:
//!
//! | Form       | Matches when                                                  |
//! |------------|---------------------------------------------------------------|
//! | `=name`    | the candidate's own basename is `name`                        |
//! | `^name`    | some strict ancestor of the candidate has basename `name`     |
//! | `>name`    | the candidate's immediate parent has basename `name`          |
//! | `!inner`   | `inner` (any other form) does NOT match                       |
//! | `name`     | the candidate has a direct child entry named exactly `name`   |
//!
//! Every string is a valid pattern: anything without a recognised sigil is an
//! entry pattern. Entry patterns compare names literally, there are no wildcards.

use std::ffi::OsStr;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cache::ListingCache;

const EXACT: char = '=';
const ANCESTOR: char = '^';
const PARENT: char = '>';
const NEGATE: char = '!';

/// A single root identification pattern, e.g. `.git`, `=src`, `^fixtures`, `!>vendor`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern(String);

/// How a pattern is tested, decided by its leading sigil.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind<'a> {
    Exact(&'a str),
    Ancestor(&'a str),
    Parent(&'a str),
    Negated(&'a str),
    Entry(&'a str),
}

impl<'a> PatternKind<'a> {
    pub fn parse(pattern: &'a str) -> Self {
        // Every sigil is a single ASCII byte.
        match pattern.chars().next() {
            Some(EXACT) => PatternKind::Exact(&pattern[1..]),
            Some(ANCESTOR) => PatternKind::Ancestor(&pattern[1..]),
            Some(PARENT) => PatternKind::Parent(&pattern[1..]),
            Some(NEGATE) => PatternKind::Negated(&pattern[1..]),
            _ => PatternKind::Entry(pattern),
        }
    }
}

impl Pattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> PatternKind<'_> {
        PatternKind::parse(&self.0)
    }

    /// Negated patterns only ever suppress, they never select a root.
    pub fn is_negated(&self) -> bool {
        matches!(self.kind(), PatternKind::Negated(_))
    }

    pub fn matches(&self, dir: &Path, cache: &mut ListingCache) -> bool {
        evaluate(&self.0, dir, cache)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Pattern {
    fn from(pattern: &str) -> Self {
        Self(pattern.to_string())
    }
}

impl From<String> for Pattern {
    fn from(pattern: String) -> Self {
        Self(pattern)
    }
}

impl AsRef<str> for Pattern {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Tests one pattern string against one candidate directory.
///
/// Entry patterns consult (and may repopulate) `cache`. Never fails: a directory
/// that cannot be listed simply has no entries.
pub fn evaluate(pattern: &str, dir: &Path, cache: &mut ListingCache) -> bool {
    match PatternKind::parse(pattern) {
        PatternKind::Exact(name) => has_basename(dir, name),
        PatternKind::Parent(name) => {
            parent_dir(dir).is_some_and(|parent| has_basename(parent, name))
        }
        PatternKind::Ancestor(name) => {
            ancestors(dir).any(|ancestor| has_basename(ancestor, name))
        }
        PatternKind::Negated(inner) => !evaluate(inner, dir, cache),
        PatternKind::Entry(name) => cache.contains(dir, name),
    }
}

/// Returns the parent of `dir`, or `None` once the walk cannot go higher.
///
/// The filesystem root has no parent, and neither does a bare relative name
/// (its lexical parent would be the empty path).
pub fn parent_dir(dir: &Path) -> Option<&Path> {
    dir.parent()
        .filter(|parent| *parent != dir && !parent.as_os_str().is_empty())
}

/// Strict ancestors of `dir`, nearest first, ending at the filesystem root.
fn ancestors(dir: &Path) -> impl Iterator<Item = &Path> {
    std::iter::successors(parent_dir(dir), |&current| parent_dir(current))
}

fn has_basename(dir: &Path, name: &str) -> bool {
    dir.file_name() == Some(OsStr::new(name))
}
