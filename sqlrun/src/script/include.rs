//! Script inclusion: `@@file`, `@file`, `START file`.
//!
//! `@@` resolves against the directory of the script currently being read
//! (the top of the [`DirStack`]); `@` and `START` resolve against the
//! process working directory. The interpreter pushes an included script's
//! directory before recursing into it and pops it on return, on every exit
//! path, so nested `@@` includes always see the right base.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::script::classify::{ends_with_ci, starts_with_ci};

// ── Directory stack ───────────────────────────────────────────────────────────

/// Stack of script directories; the top entry belongs to the script whose
/// lines are currently being interpreted.
#[derive(Debug, Default)]
pub struct DirStack {
    stack: Vec<PathBuf>,
}

impl DirStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, dir: PathBuf) {
        self.stack.push(dir);
    }

    pub fn pop(&mut self) -> Option<PathBuf> {
        self.stack.pop()
    }

    pub fn top(&self) -> Option<&Path> {
        self.stack.last().map(PathBuf::as_path)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The current script directory, falling back to the working directory
    /// when no script file is on the stack (stream-based input).
    pub fn script_dir(&self) -> PathBuf {
        match self.top() {
            Some(dir) => dir.to_path_buf(),
            None => {
                let dir = working_dir();
                warn!("no script directory on the stack, using working directory {}", dir.display());
                dir
            }
        }
    }
}

/// The process working directory, used by `@`/`START` includes.
pub fn working_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// The directory a script path contributes to the stack while it runs.
pub(crate) fn script_dir_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

// ── Include-line parsing ──────────────────────────────────────────────────────

/// Which base directory an include resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeBase {
    /// `@@file`: the including script's directory.
    ScriptDir,
    /// `@file` / `START file`: the process working directory.
    WorkingDir,
}

/// Split an include line into its base kind and file name.
///
/// Strips the directive token and an optional trailing SQL terminator.
/// Returns `None` when no file name remains (a recoverable condition: the
/// caller warns and moves on).
pub fn parse_include(line: &str, sql_terminator: &str) -> Option<(IncludeBase, String)> {
    let (base, rest) = if let Some(rest) = line.strip_prefix("@@") {
        (IncludeBase::ScriptDir, rest)
    } else if let Some(rest) = line.strip_prefix('@') {
        (IncludeBase::WorkingDir, rest)
    } else if starts_with_ci(line, "START") {
        let rest = &line[5..];
        if !rest.starts_with(|c: char| c.is_whitespace()) {
            return None;
        }
        (IncludeBase::WorkingDir, rest)
    } else {
        return None;
    };

    let mut name = rest.trim();
    if ends_with_ci(name, sql_terminator) {
        name = name[..name.len() - sql_terminator.len()].trim_end();
    }
    if name.is_empty() {
        return None;
    }
    Some((base, name.to_owned()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
