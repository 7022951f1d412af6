//! End-to-end scenario tests: a script goes in, the dispatched statement
//! list comes out. File-based cases build their script trees in a temp
//! directory so include resolution runs against the real filesystem.

use std::fs;
use std::path::Path;

use sqlrun::exec::{CollectExecutor, ExecError, StatementExecutor};
use sqlrun::script::{Interpreter, ScriptError};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn run_src(source: &str, args: &[&str]) -> Vec<String> {
    let args: Vec<String> = args.iter().map(|&s| s.to_owned()).collect();
    let mut exec = CollectExecutor::new();
    let mut interp = Interpreter::new(&mut exec);
    interp.run_str(source, &args).expect("script failed");
    exec.statements
}

fn run_file(path: &Path) -> Vec<String> {
    let mut exec = CollectExecutor::new();
    let mut interp = Interpreter::new(&mut exec);
    interp.run_file(path, &[]).expect("script failed");
    exec.statements
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).expect("write fixture");
}

/// Fails on one marker statement, collects the rest.
struct FailOn {
    marker: &'static str,
    statements: Vec<String>,
}

impl StatementExecutor for FailOn {
    fn execute_statement(&mut self, sql: &str) -> Result<(), ExecError> {
        if sql == self.marker {
            return Err("simulated execution failure".into());
        }
        self.statements.push(sql.to_owned());
        Ok(())
    }
}

// ── Plain statements ──────────────────────────────────────────────────────────

#[test]
fn terminator_is_stripped() {
    assert_eq!(run_src("SELECT * FROM t;", &[]), vec!["SELECT * FROM t"]);
}

#[test]
fn comments_never_reach_the_executor() {
    let src = "-- top comment\nSELECT 1;\n# hash comment\nBEGIN\n-- inside a block\nNULL;\nEND;\n/\n// tail";
    let statements = run_src(src, &[]);
    assert_eq!(statements, vec!["SELECT 1", "BEGIN\nNULL;\nEND;"]);
    for s in &statements {
        assert!(!s.contains("comment"));
    }
}

#[test]
fn unterminated_trailing_statement_is_not_dispatched() {
    assert_eq!(run_src("SELECT 1;\nSELECT 2", &[]), vec!["SELECT 1"]);
}

// ── Substitution ──────────────────────────────────────────────────────────────

#[test]
fn define_then_reference_with_terminator() {
    let src = "DEFINE a = hello\nSELECT '&a.' FROM dual;";
    assert_eq!(run_src(src, &[]), vec!["SELECT 'hello' FROM dual"]);
}

#[test]
fn escaped_reference_is_dispatched_verbatim() {
    let src = "DEFINE a = hello\nSELECT '\\&a.' FROM dual;";
    assert_eq!(run_src(src, &[]), vec!["SELECT '\\&a.' FROM dual"]);
}

#[test]
fn positional_arguments_bind_to_numbered_variables() {
    let src = "SELECT '&1', '&2' FROM dual;";
    assert_eq!(run_src(src, &["x", "y"]), vec!["SELECT 'x', 'y' FROM dual"]);
}

#[test]
fn undefined_variable_becomes_empty_text() {
    assert_eq!(run_src("SELECT '&nope.' FROM dual;", &[]), vec!["SELECT '' FROM dual"]);
}

// ── Blocks ────────────────────────────────────────────────────────────────────

#[test]
fn procedural_block_dispatches_without_the_slash() {
    let src = "CREATE OR REPLACE PROCEDURE p AS\nBEGIN\nNULL;\nEND;\n/";
    let statements = run_src(src, &[]);
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0], "CREATE OR REPLACE PROCEDURE p AS\nBEGIN\nNULL;\nEND;");
}

#[test]
fn sql_terminator_inside_a_block_does_not_dispatch() {
    let src = "BEGIN\nUPDATE t SET x = 1;\nCOMMIT;\nEND;\n/";
    // One statement, not three: the `;` lines stay inside the block.
    assert_eq!(run_src(src, &[]), vec!["BEGIN\nUPDATE t SET x = 1;\nCOMMIT;\nEND;"]);
}

// ── SET ───────────────────────────────────────────────────────────────────────

#[test]
fn set_sqlterminator_takes_effect() {
    assert_eq!(run_src("SET SQLTERMINATOR !\nSELECT 1!", &[]), vec!["SELECT 1"]);
}

#[test]
fn unknown_set_option_aborts() {
    let mut exec = CollectExecutor::new();
    let mut interp = Interpreter::new(&mut exec);
    let err = interp.run_str("SET LINESIZE 80", &[]).unwrap_err();
    assert!(matches!(err, ScriptError::Configuration(_)));
}

// ── Includes ──────────────────────────────────────────────────────────────────

#[test]
fn include_resolves_against_the_script_directory() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "main.sql", "@@sub.sql\nSELECT main;\n");
    write(tmp.path(), "sub.sql", "SELECT sub;\n");

    let statements = run_file(&tmp.path().join("main.sql"));
    assert_eq!(statements, vec!["SELECT sub", "SELECT main"]);
}

#[test]
fn nested_includes_resolve_against_each_including_script() {
    let tmp = tempfile::tempdir().unwrap();
    fs::create_dir(tmp.path().join("nested")).unwrap();
    write(tmp.path(), "main.sql", "@@nested/inner.sql\nSELECT main;\n");
    write(&tmp.path().join("nested"), "inner.sql", "@@deep.sql\nSELECT inner;\n");
    write(&tmp.path().join("nested"), "deep.sql", "SELECT deep;\n");

    let statements = run_file(&tmp.path().join("main.sql"));
    assert_eq!(statements, vec!["SELECT deep", "SELECT inner", "SELECT main"]);
}

#[test]
fn include_token_may_carry_a_trailing_terminator() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "main.sql", "@@sub.sql;\n");
    write(tmp.path(), "sub.sql", "SELECT sub;\n");

    assert_eq!(run_file(&tmp.path().join("main.sql")), vec!["SELECT sub"]);
}

#[test]
fn missing_include_warns_and_continues() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "main.sql", "@@no_such_file.sql\nSELECT after;\n");

    // No error: the missing file is a warning, the next line still runs.
    assert_eq!(run_file(&tmp.path().join("main.sql")), vec!["SELECT after"]);
}

#[test]
fn definitions_and_settings_persist_across_includes() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        "main.sql",
        "@@prelude.sql\nSELECT '&owner.' FROM dual!\n",
    );
    write(tmp.path(), "prelude.sql", "DEFINE owner = scott\nSET SQLTERMINATOR !\n");

    assert_eq!(
        run_file(&tmp.path().join("main.sql")),
        vec!["SELECT 'scott' FROM dual"]
    );
}

#[test]
fn exit_inside_an_include_unwinds_the_whole_run() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "main.sql", "SELECT before;\n@@stop.sql\nSELECT after;\n");
    write(tmp.path(), "stop.sql", "SELECT inner;\nEXIT\nSELECT unreached;\n");

    assert_eq!(
        run_file(&tmp.path().join("main.sql")),
        vec!["SELECT before", "SELECT inner"]
    );
}

// ── Failure paths ─────────────────────────────────────────────────────────────

#[test]
fn executor_failure_aborts_enclosing_scripts_and_unwinds_the_stack() {
    let tmp = tempfile::tempdir().unwrap();
    fs::create_dir(tmp.path().join("sub")).unwrap();
    write(tmp.path(), "main.sql", "@@sub/bad.sql\nSELECT after;\n");
    write(&tmp.path().join("sub"), "bad.sql", "BOOM;\n");
    write(&tmp.path().join("sub"), "probe.sql", "SELECT probe;\n");

    let mut exec = FailOn { marker: "BOOM", statements: Vec::new() };
    let mut interp = Interpreter::new(&mut exec);
    let err = interp.run_file(&tmp.path().join("main.sql"), &[]).unwrap_err();
    assert!(matches!(err, ScriptError::Execution(_)));

    // Had the failure leaked a directory-stack frame, `@@probe.sql` would
    // now resolve inside sub/ and dispatch; a balanced stack resolves it
    // against the working directory, where no probe.sql exists.
    interp.run_str("@@probe.sql", &[]).unwrap();

    assert!(exec.statements.iter().all(|s| s != "SELECT probe"));
    assert!(exec.statements.iter().all(|s| s != "SELECT after"));
}

#[test]
fn stream_input_resolves_script_dir_includes_against_working_directory() {
    // No file on the directory stack: `@@` falls back to the working
    // directory with a warning; a missing target is skipped.
    assert_eq!(
        run_src("@@surely_not_here_12345.sql\nSELECT 1;", &[]),
        vec!["SELECT 1"]
    );
}
