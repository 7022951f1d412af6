//! Line classification.
//!
//! Every trimmed input line maps to exactly one [`Category`], decided by an
//! ordered list of predicates — first match wins. The order is part of the
//! dialect: a comment wins over a block end, a block end over a block start,
//! and so on down to the continuation fallback. Keeping the predicates as
//! plain functions (no regex) makes each rule testable on its own.
//!
//! Prefix/suffix keyword checks are case-insensitive substring matches, not
//! whole-word matches: `SELECT exit` ends an idle script just like `EXIT`
//! does. That looseness is inherited dialect behaviour, not an accident.

use crate::settings::Settings;

// ── State and categories ──────────────────────────────────────────────────────

/// Where the interpreter is in the statement lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserState {
    /// No statement in progress.
    #[default]
    Idle,
    /// Accumulating a plain SQL statement.
    Statement,
    /// Accumulating a procedural block; only a block end closes it.
    Block,
}

/// The classification of one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Empty,
    Comment,
    BlockEnd,
    BlockStart,
    Include,
    Exit,
    Set,
    Define,
    SqlEnd,
    Continuation,
}

// ── Classifier ────────────────────────────────────────────────────────────────

/// Classify one trimmed line. Pure: no side effects, no buffer access.
pub fn classify(line: &str, state: ParserState, settings: &Settings) -> Category {
    if line.is_empty() && state != ParserState::Block {
        return Category::Empty;
    }
    if is_comment(line) {
        return Category::Comment;
    }
    if state == ParserState::Block && is_block_end(line, settings) {
        return Category::BlockEnd;
    }
    if state == ParserState::Idle && is_block_start(line) {
        return Category::BlockStart;
    }
    if state == ParserState::Idle && is_include(line) {
        return Category::Include;
    }
    if state == ParserState::Idle && ends_with_ci(line, "EXIT") {
        return Category::Exit;
    }
    if state == ParserState::Idle && starts_with_ci(line, "SET") {
        return Category::Set;
    }
    if state != ParserState::Block && starts_with_ci(line, "DEFINE") {
        return Category::Define;
    }
    if state != ParserState::Block && is_sql_end(line, settings) {
        return Category::SqlEnd;
    }
    Category::Continuation
}

// ── Predicates ────────────────────────────────────────────────────────────────

fn is_comment(line: &str) -> bool {
    line.starts_with("--") || line.starts_with('#') || line.starts_with("//")
}

/// A block ends on a line that is exactly `/` or exactly the configured
/// block terminator.
fn is_block_end(line: &str, settings: &Settings) -> bool {
    line == "/" || line == settings.block_terminator
}

/// A block starts on `CREATE [OR REPLACE] <unit-kind> …` (the `CREATE` may
/// sit at the start of the line or after a space) or on a line beginning
/// with `BEGIN` or `DECLARE`.
fn is_block_start(line: &str) -> bool {
    if starts_with_ci(line, "BEGIN") || starts_with_ci(line, "DECLARE") {
        return true;
    }
    let mut prev: Option<char> = None;
    for (i, c) in line.char_indices() {
        let at_word_start = prev.is_none_or(|p| p.is_whitespace());
        if at_word_start && matches!(c, 'C' | 'c') && matches_create_unit(&line[i..]) {
            return true;
        }
        prev = Some(c);
    }
    false
}

/// Word-scan for `CREATE (OR REPLACE)? (FUNCTION|LIBRARY|PACKAGE( BODY)?|
/// PROCEDURE|TRIGGER|TYPE)` with at least one more token after the unit kind
/// (the unit's name). Whitespace between words is flexible.
fn matches_create_unit(s: &str) -> bool {
    const UNIT_KINDS: [&str; 6] =
        ["FUNCTION", "LIBRARY", "PACKAGE", "PROCEDURE", "TRIGGER", "TYPE"];

    let mut words = s.split_whitespace();
    if !words.next().is_some_and(|w| w.eq_ignore_ascii_case("CREATE")) {
        return false;
    }
    let mut next = words.next();
    if next.is_some_and(|w| w.eq_ignore_ascii_case("OR")) {
        if !words.next().is_some_and(|w| w.eq_ignore_ascii_case("REPLACE")) {
            return false;
        }
        next = words.next();
    }
    let Some(kind) = next else { return false };
    if !UNIT_KINDS.iter().any(|k| kind.eq_ignore_ascii_case(k)) {
        return false;
    }
    words.next().is_some()
}

fn is_include(line: &str) -> bool {
    line.starts_with('@') || starts_with_ci(line, "START")
}

fn is_sql_end(line: &str, settings: &Settings) -> bool {
    ends_with_ci(line, &settings.sql_terminator) || line.ends_with('/')
}

/// Remove the terminator that made [`is_sql_end`] fire. The remainder is
/// what gets appended to the statement buffer.
pub(crate) fn strip_sql_end<'a>(line: &'a str, settings: &Settings) -> &'a str {
    let term = &settings.sql_terminator;
    if ends_with_ci(line, term) {
        &line[..line.len() - term.len()]
    } else if let Some(rest) = line.strip_suffix('/') {
        rest
    } else {
        line
    }
}

// ── Case-insensitive substring helpers ────────────────────────────────────────

pub(crate) fn starts_with_ci(line: &str, prefix: &str) -> bool {
    !prefix.is_empty()
        && line
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

pub(crate) fn ends_with_ci(line: &str, suffix: &str) -> bool {
    !suffix.is_empty()
        && line.len() >= suffix.len()
        && line
            .get(line.len() - suffix.len()..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
