// Demonstration driver for keyed-table.
//
// Usage:
//   keyed-table [--buckets N] [--secret HEX] key=value ...
//
// Every outcome is reported through the logger on stderr; set RUST_LOG to
// change verbosity.

use clap::Parser;
use env_logger::Builder;
use keyed_table::{KeyedHashTable, Secret, TableError};
use log::{info, warn, LevelFilter};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "keyed-table")]
#[command(about = "Exercise a keyed hash table with key=value pairs", long_about = None)]
struct Args {
    /// Pairs to insert; arguments without '=' are only looked up
    #[arg(value_name = "KEY=VALUE")]
    pairs: Vec<String>,

    /// Number of buckets (default: number of pairs + 1)
    #[arg(short, long)]
    buckets: Option<usize>,

    /// 128-bit hash secret as 32 hex digits (default: random)
    #[arg(short, long, env = "KEYED_TABLE_SECRET", hide_env_values = true)]
    secret: Option<String>,
}

fn initialize_logger() {
    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Info)
        .format_timestamp_millis()
        .parse_default_env();
    let _ = builder.try_init();
}

fn split_pair(arg: &str) -> (&str, Option<&str>) {
    match arg.split_once('=') {
        Some((k, v)) => (k, Some(v)),
        None => (arg, None),
    }
}

/// Result of one table call, kept so the driver can be checked without a logger.
#[derive(Debug, PartialEq, Eq)]
struct Outcome {
    op: &'static str,
    subject: String,
    // Retrieved bytes for a successful retrieve, `None` for other successes.
    result: Result<Option<Vec<u8>>, TableError>,
}

impl Outcome {
    fn new(op: &'static str, subject: impl Into<String>, res: Result<(), TableError>) -> Self {
        Outcome {
            op,
            subject: subject.into(),
            result: res.map(|()| None),
        }
    }

    fn retrieve(table: &KeyedHashTable, key: &str) -> Self {
        Outcome {
            op: "retrieve",
            subject: key.to_string(),
            result: table.retrieve(key.as_bytes()).map(|v| Some(v.to_vec())),
        }
    }

    fn log(&self) {
        match &self.result {
            Ok(Some(v)) => info!(
                "{} worked {}={}",
                self.op,
                self.subject,
                String::from_utf8_lossy(v)
            ),
            Ok(None) => info!("{} worked {}", self.op, self.subject),
            Err(e) => warn!("{} failed {}: {}", self.op, self.subject, e),
        }
    }
}

/// Insert every `key=value` argument, then look up the key part of every
/// argument.
fn run_pairs(table: &mut KeyedHashTable, pairs: &[String]) -> Vec<Outcome> {
    let mut out = Vec::new();
    for arg in pairs {
        if let (key, Some(value)) = split_pair(arg) {
            out.push(Outcome::new(
                "insert",
                format!("{}={}", key, value),
                table.insert(key.as_bytes(), value.as_bytes()),
            ));
        }
    }
    for arg in pairs {
        out.push(Outcome::retrieve(table, split_pair(arg).0));
    }
    out
}

/// Fixed insert/update/delete walk over the key "hello".
fn run_script(table: &mut KeyedHashTable) -> Vec<Outcome> {
    let mut out = Vec::new();
    out.push(Outcome::new("insert", "hello=world", table.insert(b"hello", b"world")));
    out.push(Outcome::retrieve(table, "hello"));
    out.push(Outcome::new("update", "hello=dog", table.update(b"hello", b"dog")));
    out.push(Outcome::retrieve(table, "hello"));
    out.push(Outcome::new("delete", "hello", table.delete(b"hello")));
    out.push(Outcome::retrieve(table, "hello"));
    out
}

fn main() -> ExitCode {
    let args = Args::parse();
    initialize_logger();

    let secret = match args.secret.as_deref() {
        Some(hex) => match Secret::from_hex(hex) {
            Ok(s) => s,
            Err(e) => {
                warn!("bad secret: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Secret::random(),
    };
    let buckets = args.buckets.unwrap_or(args.pairs.len() + 1);
    let mut table = match KeyedHashTable::create(buckets, secret) {
        Ok(t) => t,
        Err(e) => {
            warn!("create failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for outcome in run_pairs(&mut table, &args.pairs) {
        outcome.log();
    }
    for outcome in run_script(&mut table) {
        outcome.log();
    }

    let released = table.destroy();
    info!("destroy released {} entries", released);
    ExitCode::SUCCESS
}
