//! Command-line argument parsing.
//!
//! Usage:
//!   sqlrun [-v] <script> [arg…]
//!   sqlrun [-v] -          [arg…]     (read the script from stdin)
//!   sqlrun [-v] -c<text>   [arg…]     (run an inline script)

use std::path::PathBuf;

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug)]
pub struct CliArgs {
    /// Raise the log filter to debug (`-v`).
    pub verbose: bool,
    /// Where the script text comes from.
    pub source: Source,
    /// Positional arguments bound as `&1`, `&2`, … for the run.
    pub script_args: Vec<String>,
}

/// Where the script text comes from.
#[derive(Debug, PartialEq, Eq)]
pub enum Source {
    /// A script file path.
    File(PathBuf),
    /// Standard input (`-`).
    Stdin,
    /// Inline text (`-c<text>`).
    Inline(String),
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(&raw[1..])
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut verbose = false;
    let mut inline: Option<String> = None;
    let mut positional: Vec<String> = Vec::new();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // `--` ends flag processing.
        if arg == "--" {
            i += 1;
            positional.extend(argv[i..].iter().cloned());
            break;
        }

        // Non-flag argument (a lone `-` means stdin and is positional).
        if !arg.starts_with('-') || arg == "-" {
            positional.push(arg.to_owned());
            i += 1;
            continue;
        }

        // Flag argument: iterate over characters after the leading `-`.
        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                'v' => verbose = true,

                // -c<text>
                'c' => {
                    let text = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len(); // consumed rest of this arg
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err("-c requires a script argument".to_owned());
                    };
                    inline = Some(text);
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    // Positional arguments: the first names the script source, unless an
    // inline script was given, in which case all of them are script args.
    let source = match inline {
        Some(text) => Source::Inline(text),
        None => {
            if positional.is_empty() {
                return Err("no script given".to_owned());
            }
            match positional.remove(0).as_str() {
                "-" => Source::Stdin,
                path => Source::File(PathBuf::from(path)),
            }
        }
    };

    Ok(CliArgs { verbose, source, script_args: positional })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
