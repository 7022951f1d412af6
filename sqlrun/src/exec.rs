//! The executor boundary.
//!
//! By the time a statement reaches an executor it is an opaque text blob:
//! classification, accumulation and variable substitution have already
//! happened. Executors do not see directives, comments or terminators.

use std::io::{self, Write};

use tracing::info;

/// Error type reported by a [`StatementExecutor`]. Any execution failure is
/// fatal to the run — the interpreter does not retry or skip.
pub type ExecError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// External consumer of completed, substituted statements.
pub trait StatementExecutor {
    fn execute_statement(&mut self, sql: &str) -> Result<(), ExecError>;
}

// ── EchoExecutor ──────────────────────────────────────────────────────────────

/// Writes each statement to a writer, one blank line between statements.
///
/// This is the bin's default sink: it turns the interpreter into a dry-run
/// preprocessor whose output is the stream of statements a database client
/// would receive. Each statement is also logged at info level.
pub struct EchoExecutor<W: Write> {
    out: W,
}

impl EchoExecutor<io::Stdout> {
    pub fn stdout() -> Self {
        EchoExecutor { out: io::stdout() }
    }
}

impl<W: Write> EchoExecutor<W> {
    pub fn new(out: W) -> Self {
        EchoExecutor { out }
    }
}

impl<W: Write> StatementExecutor for EchoExecutor<W> {
    fn execute_statement(&mut self, sql: &str) -> Result<(), ExecError> {
        info!("{sql}");
        writeln!(self.out, "{sql}")?;
        writeln!(self.out)?;
        Ok(())
    }
}

// ── CollectExecutor ───────────────────────────────────────────────────────────

/// Captures every statement it receives. Used by tests and by callers that
/// want the preprocessed statement list as data rather than as output.
#[derive(Debug, Default)]
pub struct CollectExecutor {
    pub statements: Vec<String>,
}

impl CollectExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatementExecutor for CollectExecutor {
    fn execute_statement(&mut self, sql: &str) -> Result<(), ExecError> {
        self.statements.push(sql.to_owned());
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
