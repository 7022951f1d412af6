//! Substitution-variable expansion.
//!
//! A reference has the shape `ESCAPER? PREFIX IDENT DELIM` where IDENT is
//! one or more ASCII alphanumeric/underscore characters and DELIM is one of
//! `'`, `"`, any whitespace character, end-of-text, or the configured
//! substitution terminator. With the defaults (`&` prefix, `.` terminator,
//! `\` escape):
//!
//! | Input          | `a = hello`     | Notes                              |
//! |----------------|-----------------|------------------------------------|
//! | `&a.`          | `hello`         | terminator consumed                |
//! | `&a `          | `hello `        | other delimiters kept              |
//! | `&a`           | `hello`         | end-of-text delimits               |
//! | `\&a.`         | `\&a.`          | escaped: copied verbatim           |
//! | `&missing.`    | (empty) + warn  | undefined substitutes empty        |
//! | `&a-b`         | `&a-b`          | `-` is no delimiter: not a match   |
//!
//! The scan is a single left-to-right pass over the finished statement text;
//! matches never overlap and substituted values are not rescanned. Prefix,
//! escaper and terminator match case-insensitively; the IDENT lookup in the
//! variable table is exact-case.

use tracing::warn;

use crate::settings::Settings;
use crate::var::VarTable;

// ── Match model ───────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum Delim {
    /// The configured substitution terminator: consumed.
    Terminator,
    /// A quote or whitespace character: preserved in the output.
    Char(char),
    /// End of text.
    End,
}

#[derive(Debug)]
struct RefMatch<'a> {
    /// Total matched length in bytes, including escaper and delimiter.
    len: usize,
    escaped: bool,
    name: &'a str,
    delim: Delim,
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// Expand every variable reference in `text`. Applied exactly once, to the
/// whole finished statement, never per input line.
pub fn substitute(text: &str, settings: &Settings, vars: &VarTable) -> String {
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        if let Some(m) = match_reference(rest, settings) {
            if m.escaped {
                // Non-stripping escape: the escaper stays in the output.
                out.push_str(&rest[..m.len]);
            } else {
                match vars.get(m.name) {
                    Some(value) => out.push_str(value),
                    None => warn!(
                        "substitution variable {}{} is not defined, substituting empty text",
                        settings.subst_prefix, m.name
                    ),
                }
                if let Delim::Char(c) = m.delim {
                    out.push(c);
                }
            }
            i += m.len;
        } else {
            let Some(c) = rest.chars().next() else { break };
            out.push(c);
            i += c.len_utf8();
        }
    }
    out
}

/// Try to match a reference at the start of `s`.
fn match_reference<'a>(s: &'a str, settings: &Settings) -> Option<RefMatch<'a>> {
    let prefix = &settings.subst_prefix;
    let escaper = &settings.escaper;

    let (escaped, body) = if token_at(s, escaper) && token_at(&s[escaper.len()..], prefix) {
        (true, escaper.len())
    } else {
        (false, 0)
    };
    if !token_at(&s[body..], prefix) {
        return None;
    }

    let name_start = body + prefix.len();
    let name_len = s[name_start..]
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    if name_len == 0 {
        return None;
    }
    let name_end = name_start + name_len;

    let tail = &s[name_end..];
    let (delim, delim_len) = if tail.is_empty() {
        (Delim::End, 0)
    } else if token_at(tail, &settings.subst_terminator) {
        (Delim::Terminator, settings.subst_terminator.len())
    } else {
        let c = tail.chars().next()?;
        if c == '\'' || c == '"' || c.is_whitespace() {
            (Delim::Char(c), c.len_utf8())
        } else {
            return None;
        }
    };

    Some(RefMatch {
        len: name_end + delim_len,
        escaped,
        name: &s[name_start..name_end],
        delim,
    })
}

/// Case-insensitive check for a non-empty token at the start of `s`.
fn token_at(s: &str, token: &str) -> bool {
    !token.is_empty()
        && s.get(..token.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(token))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
