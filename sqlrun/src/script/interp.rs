//! The interpreter driver.
//!
//! [`Interpreter`] reads one trimmed line at a time, asks the classifier
//! what the line is, and advances the statement lifecycle:
//!
//! ```text
//! Idle --BlockStart--> Block --BlockEnd--> dispatch --> Idle
//! Idle --Continuation--> Statement --SqlEnd--> dispatch --> Idle
//! ```
//!
//! Directives (`SET`, `DEFINE`, includes, `EXIT`) run as side effects while
//! the buffer is untouched. On dispatch the buffer is trimmed, substituted
//! once as a whole, and handed to the [`StatementExecutor`]. Includes
//! recurse into the same interpreter, sharing the settings and the variable
//! table; the directory stack is pushed before and popped after every
//! recursion, also when an error propagates through.

use std::fs;
use std::io::{self, BufRead, Read};
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::exec::{ExecError, StatementExecutor};
use crate::script::classify::{classify, strip_sql_end, Category, ParserState};
use crate::script::include::{
    parse_include, script_dir_of, working_dir, DirStack, IncludeBase,
};
use crate::script::subst::substitute;
use crate::settings::{parse_set, Settings};
use crate::var::VarTable;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Fatal interpreter error. Recoverable conditions (missing include files,
/// undefined variables, an unterminated trailing statement) are warnings,
/// not errors.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Unknown option name or malformed `SET` line.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// I/O failure while reading a script source.
    #[error("error reading script source: {0}")]
    Read(#[from] io::Error),
    /// The executor rejected a statement; aborts all enclosing includes.
    #[error("statement execution failed: {0}")]
    Execution(ExecError),
}

// ── Control flow ──────────────────────────────────────────────────────────────

/// How a script source finished: ran to its end, or hit an `EXIT` directive.
/// `Exit` unwinds through every enclosing include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

// ── DEFINE parsing ────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum DefineCmd {
    /// `DEFINE name = value`
    Assign { name: String, value: String },
    /// `DEFINE name`
    Show(String),
    /// bare `DEFINE`
    ShowAll,
}

/// Parse a line already classified as a `DEFINE`. `None` means malformed
/// (recoverable: warn and skip).
fn parse_define(line: &str) -> Option<DefineCmd> {
    // The classifier guarantees the "DEFINE" prefix (ASCII, any case).
    let rest = &line[6..];
    if rest.is_empty() {
        return Some(DefineCmd::ShowAll);
    }
    if !rest.starts_with(|c: char| c.is_whitespace()) {
        return None;
    }
    let rest = rest.trim();
    if rest.is_empty() {
        return Some(DefineCmd::ShowAll);
    }

    let name_len = rest
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    if name_len == 0 {
        return None;
    }
    let name = &rest[..name_len];

    let after = rest[name_len..].trim_start();
    if after.is_empty() {
        return Some(DefineCmd::Show(name.to_owned()));
    }
    let value = after.strip_prefix('=')?.trim();
    if value.is_empty() {
        return None;
    }
    Some(DefineCmd::Assign { name: name.to_owned(), value: value.to_owned() })
}

// ── Interpreter ───────────────────────────────────────────────────────────────

/// Script interpreter for one run. Owns the delimiter settings, the
/// substitution-variable table and the script-directory stack — all three
/// are shared across the whole include tree of the run.
pub struct Interpreter<'e> {
    settings: Settings,
    vars: VarTable,
    dirs: DirStack,
    executor: &'e mut dyn StatementExecutor,
    /// User-visible output (`DEFINE` listings). Drained by the caller.
    pub output: Vec<String>,
}

impl<'e> Interpreter<'e> {
    pub fn new(executor: &'e mut dyn StatementExecutor) -> Self {
        Interpreter {
            settings: Settings::new(),
            vars: VarTable::new(),
            dirs: DirStack::new(),
            executor,
            output: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn vars(&self) -> &VarTable {
        &self.vars
    }

    // ── Entry points ─────────────────────────────────────────────────────────

    /// Run a script file. The file's directory is pushed for the duration of
    /// the run (including error paths) so `@@` includes resolve against it.
    /// A missing file warns and returns successfully, like a missing include.
    pub fn run_file(&mut self, path: impl AsRef<Path>, args: &[String]) -> Result<(), ScriptError> {
        self.run_file_flow(path.as_ref(), args).map(|_| ())
    }

    /// Run a script from a raw byte source.
    pub fn run_read<R: Read>(&mut self, reader: R, args: &[String]) -> Result<(), ScriptError> {
        self.bind_args(args);
        self.run_lines(io::BufReader::new(reader).lines()).map(|_| ())
    }

    /// Run a script from already-decoded text.
    pub fn run_str(&mut self, source: &str, args: &[String]) -> Result<(), ScriptError> {
        self.bind_args(args);
        self.run_lines(source.lines().map(|l| Ok(l.to_owned()))).map(|_| ())
    }

    /// Bind positional arguments as variables `"1"`, `"2"`, …
    fn bind_args(&mut self, args: &[String]) {
        for (i, arg) in args.iter().enumerate() {
            self.vars.set((i + 1).to_string(), arg.clone());
        }
    }

    // ── File recursion ───────────────────────────────────────────────────────

    fn run_file_flow(&mut self, path: &Path, args: &[String]) -> Result<Flow, ScriptError> {
        self.dirs.push(script_dir_of(path));
        let result = self.run_file_inner(path, args);
        self.dirs.pop();
        result
    }

    fn run_file_inner(&mut self, path: &Path, args: &[String]) -> Result<Flow, ScriptError> {
        if !path.exists() {
            warn!("cannot run script {}: file does not exist", path.display());
            return Ok(Flow::Continue);
        }
        let file = fs::File::open(path)?;
        self.bind_args(args);
        self.run_lines(io::BufReader::new(file).lines())
    }

    // ── Core loop ────────────────────────────────────────────────────────────

    fn run_lines<I>(&mut self, lines: I) -> Result<Flow, ScriptError>
    where
        I: IntoIterator<Item = io::Result<String>>,
    {
        let mut buffer = String::new();
        let mut state = ParserState::Idle;

        for line in lines {
            let raw = line?;
            let line = raw.trim();
            let category = classify(line, state, &self.settings);
            trace!("{state:?} {category:?}: {line}");

            match category {
                Category::Empty | Category::Comment => {}
                Category::BlockEnd => {
                    self.dispatch(&buffer)?;
                    buffer.clear();
                    state = ParserState::Idle;
                }
                Category::BlockStart => {
                    buffer.push_str(line);
                    buffer.push('\n');
                    state = ParserState::Block;
                }
                Category::Include => {
                    if self.handle_include(line)? == Flow::Exit {
                        return Ok(Flow::Exit);
                    }
                }
                Category::Exit => {
                    debug!("exit directive");
                    return Ok(Flow::Exit);
                }
                Category::Set => self.apply_set(line)?,
                Category::Define => self.apply_define(line),
                Category::SqlEnd => {
                    buffer.push_str(strip_sql_end(line, &self.settings));
                    self.dispatch(&buffer)?;
                    buffer.clear();
                    state = ParserState::Idle;
                }
                Category::Continuation => {
                    buffer.push_str(line);
                    buffer.push('\n');
                    if state == ParserState::Idle {
                        state = ParserState::Statement;
                    }
                }
            }
        }

        if !buffer.is_empty() {
            warn!("end of input with an unterminated statement, discarding: {buffer:?}");
        }
        Ok(Flow::Continue)
    }

    // ── Actions ──────────────────────────────────────────────────────────────

    /// Trim, substitute once over the whole text, and hand the statement to
    /// the executor. Executor failure is fatal.
    fn dispatch(&mut self, buffer: &str) -> Result<(), ScriptError> {
        let sql = substitute(buffer.trim(), &self.settings, &self.vars);
        debug!("dispatching statement: {sql:?}");
        self.executor.execute_statement(&sql).map_err(ScriptError::Execution)
    }

    fn handle_include(&mut self, line: &str) -> Result<Flow, ScriptError> {
        let Some((base, name)) = parse_include(line, &self.settings.sql_terminator) else {
            warn!("ignoring malformed include directive: {line}");
            return Ok(Flow::Continue);
        };
        let base_dir = match base {
            IncludeBase::ScriptDir => self.dirs.script_dir(),
            IncludeBase::WorkingDir => working_dir(),
        };
        let path = base_dir.join(&name);
        debug!("including script {}", path.display());
        self.run_file_flow(&path, &[])
    }

    fn apply_set(&mut self, line: &str) -> Result<(), ScriptError> {
        let (option, value) = parse_set(line).map_err(ScriptError::Configuration)?;
        self.settings.apply(option, value.as_deref());
        Ok(())
    }

    fn apply_define(&mut self, line: &str) {
        match parse_define(line) {
            None => warn!("ignoring malformed DEFINE directive: {line}"),
            Some(DefineCmd::Assign { name, value }) => {
                // Substituting at definition time makes chained references
                // resolve against the values in effect right now.
                let value = substitute(&value, &self.settings, &self.vars);
                debug!("defining {name} = {value:?}");
                self.vars.set(name, value);
            }
            Some(DefineCmd::Show(name)) => self.print_variable(&name),
            Some(DefineCmd::ShowAll) => {
                for name in self.vars.names_sorted() {
                    self.print_variable(&name);
                }
            }
        }
    }

    fn print_variable(&mut self, name: &str) {
        let value = match self.vars.get(name) {
            Some(v) => v.to_owned(),
            None => {
                warn!("substitution variable {name} is not defined");
                String::new()
            }
        };
        self.output.push(format!("DEFINE {name} = \"{value}\""));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
