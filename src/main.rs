use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dotenvy::dotenv;
use std::collections::BTreeMap;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use xtp_dat::{DataType, DatReader, DecodeOptions, Frame, PayloadCheck, Record};

#[derive(Debug, Parser)]
#[command(version, about = "Print the records of an XTP .dat market-data capture")]
struct Args {
    /// Capture file to read
    path: PathBuf,

    /// Accept payloads larger than the record layout (trailing bytes ignored)
    #[arg(long, env = "XTP_DAT_LENIENT", default_value_t = false)]
    lenient: bool,

    /// Print one JSON object per record instead of the text dump
    #[arg(long, env = "XTP_DAT_JSON", default_value_t = false)]
    json: bool,

    /// Only print records of this type
    #[arg(long, value_enum)]
    only: Option<Kind>,

    /// Stop after printing this many records
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    limit: Option<u64>,

    /// Print nothing but the final summary
    #[arg(long, short = 'q', default_value_t = false)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    Snapshot,
    Tick,
    OrderBook,
    Static,
    Unknown,
}

impl Kind {
    fn matches(self, data_type: DataType) -> bool {
        matches!(
            (self, data_type),
            (Kind::Snapshot, DataType::Snapshot)
                | (Kind::Tick, DataType::Tick)
                | (Kind::OrderBook, DataType::OrderBook)
                | (Kind::Static, DataType::Static)
                | (Kind::Unknown, DataType::Unknown(_))
        )
    }
}

fn print_text(out: &mut impl Write, frame: &Frame) -> io::Result<()> {
    let h = &frame.header;
    writeln!(
        out,
        "data_type={} size={} magic={} time={}",
        h.data_type,
        h.payload_size,
        h.magic,
        h.timestamp_trimmed()
    )?;
    match &frame.record {
        Record::Snapshot(s) => writeln!(out, "{s:?}")?,
        Record::TickByTick(t) => writeln!(out, "{t}")?,
        Record::Unparsed { payload } => writeln!(out, "<{} unparsed bytes>", payload.len())?,
    }
    writeln!(out, "{}", "-".repeat(50))
}

fn run(args: &Args) -> Result<()> {
    let check = if args.lenient { PayloadCheck::Lenient } else { PayloadCheck::Exact };
    let options = DecodeOptions::default().with_payload_check(check);
    let file = std::fs::File::open(&args.path).with_context(|| format!("open {:?}", args.path))?;
    let mut reader = DatReader::with_options(io::BufReader::new(file), options);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut printed = 0u64;
    let mut outcome = Ok(());

    for item in reader.records() {
        let frame = match item {
            Ok(f) => f,
            Err(e) => {
                outcome = Err(e).with_context(|| format!("decode {:?}", args.path));
                break;
            }
        };
        *counts.entry(frame.data_type().to_string()).or_default() += 1;
        if args.quiet || args.only.is_some_and(|k| !k.matches(frame.data_type())) {
            continue;
        }
        if args.limit.is_some_and(|n| printed >= n) {
            break;
        }
        if args.json {
            serde_json::to_writer(&mut out, &frame).context("encode json")?;
            writeln!(out)?;
        } else {
            print_text(&mut out, &frame)?;
        }
        printed += 1;
    }
    out.flush()?;

    let total: usize = counts.values().sum();
    info!(records = total, printed, bytes = reader.offset(), ?counts, "done");
    outcome
}

fn main() -> ExitCode {
    let _ = dotenv();
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    if !args.path.exists() {
        eprintln!("file {} not exists", args.path.display());
        return ExitCode::from(1);
    }
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
