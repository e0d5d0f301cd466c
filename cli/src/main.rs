use anyhow::{Context, Result};
use bytebucket::{ByteBucketArray, NUM_BUCKETS};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Count how often each byte value occurs in a file.
#[derive(Parser, Debug)]
#[command(name = "bbhist", version, about)]
struct Args {
    /// File to read, or `-` for stdin
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Release buckets whose counts are all below this value before printing
    #[arg(long, value_name = "N")]
    trim_below: Option<u64>,

    /// Print every slot of every allocated bucket, including zero counts
    #[arg(long)]
    all: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut counts = ByteBucketArray::<u64>::new();
    let total = count_bytes(open(&args.input)?, &mut counts)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    log::debug!(
        "read {} bytes into {} buckets",
        total,
        counts.allocated_buckets()
    );

    if let Some(threshold) = args.trim_below {
        counts.trim_buckets(|&count| count < threshold);
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for (byte, &count) in &counts {
        if args.all || count != 0 {
            writeln!(out, "{:#04x} {}", byte, count)?;
        }
    }
    writeln!(
        out,
        "{} bytes, {}/{} buckets allocated",
        total,
        counts.allocated_buckets(),
        NUM_BUCKETS
    )?;
    out.flush()?;
    Ok(())
}

/// Open the input path, treating `-` as stdin.
fn open(path: &Path) -> Result<Box<dyn BufRead>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Add one to the count of every byte read, returning the number of bytes.
fn count_bytes<R: BufRead>(mut reader: R, counts: &mut ByteBucketArray<u64>) -> io::Result<u64> {
    let mut total = 0u64;
    loop {
        let chunk = reader.fill_buf()?;
        if chunk.is_empty() {
            return Ok(total);
        }
        for &byte in chunk {
            *counts.item_mut(usize::from(byte)) += 1;
        }
        let len = chunk.len();
        total += len as u64;
        reader.consume(len);
    }
}
