//! `sri-gen <path> <algorithm>`: print the integrity value of one file.
//!
//! Exit status is the whole error channel: 0 with the value on stdout on
//! success, 0 with no output when the path or algorithm is missing, 1 with no
//! output when the file cannot be read or the algorithm is not supported.

use clap::Parser;
use sri_core::digest::{integrity_of_path, Algorithm};
use sri_core::logging;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::Path;

#[derive(Debug, Parser)]
#[command(name = "sri-gen")]
#[command(about = "Print the subresource integrity value of a file", long_about = None)]
struct Args {
    /// File to hash.
    #[arg(allow_hyphen_values = true)]
    path: Option<OsString>,

    /// Digest algorithm: sha256 or sha512.
    algorithm: Option<OsString>,

    /// Ignored.
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    rest: Vec<OsString>,
}

fn main() {
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }
    let args = Args::parse();
    std::process::exit(run(&args, &mut io::stdout().lock()));
}

fn run(args: &Args, out: &mut impl Write) -> i32 {
    let path = args.path.as_deref().filter(|p| !p.is_empty());
    let algorithm = args.algorithm.as_deref().filter(|a| !a.is_empty());
    let (Some(path), Some(algorithm)) = (path, algorithm) else {
        tracing::debug!(?args, "missing path or algorithm, nothing to do");
        return 0;
    };

    let algorithm: Algorithm = match algorithm.to_string_lossy().parse() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("sri-gen error: {}", e);
            return 1;
        }
    };

    let result = match integrity_of_path(Path::new(path), algorithm) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("sri-gen: {}", e);
            return 1;
        }
    };

    match write!(out, "{}", result).and_then(|_| out.flush()) {
        Ok(()) => 0,
        // Nobody is reading: same as having no output sink.
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => 0,
        Err(e) => {
            tracing::warn!("sri-gen: write stdout: {}", e);
            1
        }
    }
}
