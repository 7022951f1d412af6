use sqlrun::cli::{self, Source};
use sqlrun::exec::EchoExecutor;
use sqlrun::fsutil;
use sqlrun::script::Interpreter;
use tracing::warn;

fn main() {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("sqlrun: {e}");
            eprintln!("Usage: sqlrun [-v] (<script> | - | -c<text>) [arg…]");
            std::process::exit(2);
        }
    };

    if args.verbose {
        tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();
    } else {
        tracing_subscriber::fmt::init();
    }

    // The library treats a missing script like a missing include (warn and
    // carry on); as a command-line tool that would just do nothing, so
    // refuse the typo'd path up front.
    if let Source::File(path) = &args.source {
        if !path.exists() {
            eprintln!("sqlrun: no such script: {}", path.display());
            std::process::exit(1);
        }
        if !fsutil::has_extension(path, "sql") {
            warn!("script {} does not have the .sql extension", path.display());
        }
    }

    let mut exec = EchoExecutor::stdout();
    let mut interp = Interpreter::new(&mut exec);
    let result = match &args.source {
        Source::File(path) => interp.run_file(path, &args.script_args),
        Source::Stdin => interp.run_read(std::io::stdin().lock(), &args.script_args),
        Source::Inline(text) => interp.run_str(text, &args.script_args),
    };

    // DEFINE listings go to the user, not to the statement stream.
    for line in interp.output.drain(..) {
        println!("{line}");
    }

    if let Err(e) = result {
        eprintln!("sqlrun: {e}");
        std::process::exit(1);
    }
}
