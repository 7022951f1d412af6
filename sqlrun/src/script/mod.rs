//! The scripting dialect.
//!
//! Scripts are processed one trimmed line at a time:
//!
//! - Plain statements accumulate until the SQL terminator (default `;`) or
//!   a `/`; procedural blocks (`CREATE PROCEDURE …`, `BEGIN`, `DECLARE`)
//!   accumulate until a lone `/` or the block terminator line.
//! - `SET`, `DEFINE`, `@@`/`@`/`START` includes and `EXIT` are directives,
//!   interpreted rather than forwarded.
//! - Completed statements get one variable-substitution pass and go to the
//!   [`StatementExecutor`](crate::exec::StatementExecutor).
//!
//! # Quick start
//!
//! ```rust
//! use sqlrun::exec::CollectExecutor;
//! use sqlrun::script::Interpreter;
//!
//! let mut exec = CollectExecutor::new();
//! let mut interp = Interpreter::new(&mut exec);
//! interp
//!     .run_str("DEFINE who = world\nSELECT 'hello, &who.' FROM dual;", &[])
//!     .unwrap();
//! assert_eq!(exec.statements, vec!["SELECT 'hello, world' FROM dual"]);
//! ```

pub mod classify;
pub mod include;
pub mod interp;
pub mod subst;

// Re-exports for convenience.
pub use classify::{classify, Category, ParserState};
pub use interp::{Interpreter, ScriptError};
pub use subst::substitute;
