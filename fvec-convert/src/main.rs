use std::{
    io::{self, BufWriter},
    path::PathBuf,
};

use clap::Parser;
use fvec_convert::convert_file;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Print the vectors of a texmex fvecs file as text, one per line.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Command {
    /// fvecs file to convert
    input: PathBuf,
}

fn main() -> anyhow::Result<()> {
    // stdout carries the converted rows, so logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Command::parse();
    let out = BufWriter::new(io::stdout().lock());

    match convert_file(&args.input, out) {
        Ok(summary) => {
            info!(dim = summary.dim, rows = summary.rows, "done");
            Ok(())
        }
        Err(e) if e.is_broken_pipe() => {
            debug!("output closed early");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
