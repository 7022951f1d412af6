//! Runtime delimiter settings and the `SET` directive.
//!
//! The scripting dialect lets a script change its own delimiters while it
//! runs:
//!
//! | Option name       | Controls                              | Default |
//! |-------------------|---------------------------------------|---------|
//! | `SQLTERMINATOR`   | end-of-statement marker               | `;`     |
//! | `BLOCKTERMINATOR` | end-of-block marker line              | `.`     |
//! | `DEFINE`          | substitution-variable prefix          | `&`     |
//! | `CONCAT`          | substitution-variable terminator      | `.`     |
//! | `ESCAPE`          | substitution-variable escape          | `\`     |
//!
//! `SET <name>` with no value restores the default. Option names match
//! case-insensitively; an unknown or malformed `SET` line is a fatal error
//! (see [`crate::script::ScriptError::Configuration`]).

use tracing::debug;

// ── Options ───────────────────────────────────────────────────────────────────

/// One settable delimiter, as named by the `SET` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOption {
    SqlTerminator,
    BlockTerminator,
    /// Substitution-variable prefix (`SET DEFINE`).
    Define,
    /// Substitution-variable terminator (`SET CONCAT`).
    Concat,
    /// Substitution-variable escape (`SET ESCAPE`).
    Escape,
}

impl SetOption {
    /// The value restored when `SET <name>` is given with no argument.
    pub fn default_value(self) -> &'static str {
        match self {
            SetOption::SqlTerminator => ";",
            SetOption::BlockTerminator => ".",
            SetOption::Define => "&",
            SetOption::Concat => ".",
            SetOption::Escape => "\\",
        }
    }

    /// Resolve a `SET` option name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        const NAMES: [(&str, SetOption); 5] = [
            ("SQLTERMINATOR", SetOption::SqlTerminator),
            ("BLOCKTERMINATOR", SetOption::BlockTerminator),
            ("DEFINE", SetOption::Define),
            ("CONCAT", SetOption::Concat),
            ("ESCAPE", SetOption::Escape),
        ];
        NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, opt)| opt)
    }
}

// ── Settings ──────────────────────────────────────────────────────────────────

/// The live delimiter strings for one interpreter run.
///
/// One instance is shared (not copied) across the whole include tree, so a
/// `SET` inside an included script affects the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub sql_terminator: String,
    pub block_terminator: String,
    pub subst_prefix: String,
    pub subst_terminator: String,
    pub escaper: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            sql_terminator: SetOption::SqlTerminator.default_value().to_owned(),
            block_terminator: SetOption::BlockTerminator.default_value().to_owned(),
            subst_prefix: SetOption::Define.default_value().to_owned(),
            subst_terminator: SetOption::Concat.default_value().to_owned(),
            escaper: SetOption::Escape.default_value().to_owned(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one option. `None` restores the default.
    pub fn apply(&mut self, option: SetOption, value: Option<&str>) {
        let value = value.unwrap_or_else(|| option.default_value());
        let slot = match option {
            SetOption::SqlTerminator => &mut self.sql_terminator,
            SetOption::BlockTerminator => &mut self.block_terminator,
            SetOption::Define => &mut self.subst_prefix,
            SetOption::Concat => &mut self.subst_terminator,
            SetOption::Escape => &mut self.escaper,
        };
        debug!("changing {option:?} from {slot:?} to {value:?}");
        *slot = value.to_owned();
    }
}

// ── SET parsing ───────────────────────────────────────────────────────────────

/// Parse a `SET name [value]` line (already classified as a `SET`).
///
/// Returns the resolved option and the optional value token, or an error
/// message when the line is malformed or names an unknown option.
pub fn parse_set(line: &str) -> Result<(SetOption, Option<String>), String> {
    // The classifier guarantees the line starts with "SET" (ASCII, any case).
    let rest = &line[3..];
    if !rest.starts_with(|c: char| c.is_whitespace()) {
        return Err(format!("malformed SET directive: {line}"));
    }

    let mut tokens = rest.split_whitespace();
    let name = tokens
        .next()
        .ok_or_else(|| format!("SET requires an option name: {line}"))?;
    let value = tokens.next().map(str::to_owned);
    if tokens.next().is_some() {
        return Err(format!("malformed SET directive: {line}"));
    }

    let option =
        SetOption::from_name(name).ok_or_else(|| format!("unknown SET option: {name}"))?;
    Ok((option, value))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::new();
        assert_eq!(s.sql_terminator, ";");
        assert_eq!(s.block_terminator, ".");
        assert_eq!(s.subst_prefix, "&");
        assert_eq!(s.subst_terminator, ".");
        assert_eq!(s.escaper, "\\");
    }

    #[test]
    fn option_names_case_insensitive() {
        assert_eq!(SetOption::from_name("sqlterminator"), Some(SetOption::SqlTerminator));
        assert_eq!(SetOption::from_name("BlockTerminator"), Some(SetOption::BlockTerminator));
        assert_eq!(SetOption::from_name("DEFINE"), Some(SetOption::Define));
        assert_eq!(SetOption::from_name("concat"), Some(SetOption::Concat));
        assert_eq!(SetOption::from_name("Escape"), Some(SetOption::Escape));
        assert_eq!(SetOption::from_name("PAGESIZE"), None);
    }

    #[test]
    fn apply_and_reset() {
        let mut s = Settings::new();
        s.apply(SetOption::SqlTerminator, Some("!"));
        assert_eq!(s.sql_terminator, "!");
        s.apply(SetOption::SqlTerminator, None);
        assert_eq!(s.sql_terminator, ";");
    }

    #[test]
    fn parse_with_value() {
        let (opt, value) = parse_set("SET SQLTERMINATOR !").unwrap();
        assert_eq!(opt, SetOption::SqlTerminator);
        assert_eq!(value.as_deref(), Some("!"));
    }

    #[test]
    fn parse_without_value() {
        let (opt, value) = parse_set("set concat").unwrap();
        assert_eq!(opt, SetOption::Concat);
        assert_eq!(value, None);
    }

    #[test]
    fn parse_unknown_option() {
        assert!(parse_set("SET PAGESIZE 20").is_err());
    }

    #[test]
    fn parse_bare_set_is_malformed() {
        assert!(parse_set("SET").is_err());
    }

    #[test]
    fn parse_glued_name_is_malformed() {
        assert!(parse_set("SETTINGS on").is_err());
    }

    #[test]
    fn parse_trailing_junk_is_malformed() {
        assert!(parse_set("SET ESCAPE a b").is_err());
    }
}
