//! Pixel engine speaking the pixdiff protocol on stdin/stdout.
//!
//! Reads one request and one command, writes one response and exits.
//! Failures go to stderr, which the client reports as the failure detail.

use std::io::{self, BufReader, BufWriter};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let mut input = BufReader::new(io::stdin().lock());
    let mut output = BufWriter::new(io::stdout().lock());
    match pixdiff_engine::serve(&mut input, &mut output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("bitmaptools: {}", e);
            ExitCode::FAILURE
        }
    }
}
