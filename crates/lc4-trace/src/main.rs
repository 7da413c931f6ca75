//! CLI entry point for the LC4 trace simulator.

use std::env;
use std::ffi::OsString;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use lc4_core::{load_object_file, run, MachineState, RunStop, SimConfig, TraceWriter};
#[cfg(test)]
use tempfile as _;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const USAGE_TEXT: &str = "\
Usage: lc4-trace [options] <output> <object>...

Loads each object file in order, runs from the reset vector, and writes one
trace line per executed instruction to <output>.

Options:
  --max-cycles <n>  Stop after <n> executed instructions
  -v, --verbose     Log loader and run details to stderr
  -h, --help        Show this help message

Examples:
  lc4-trace trace.txt os.obj program.obj
  lc4-trace --max-cycles 1000 trace.txt program.obj
";

#[derive(Debug, PartialEq, Eq)]
struct TraceArgs {
    output: PathBuf,
    objects: Vec<PathBuf>,
    max_cycles: Option<u64>,
    verbose: bool,
}

#[derive(Debug)]
enum ParseResult {
    Run(TraceArgs),
    Help,
}

#[allow(clippy::while_let_on_iterator)]
fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut paths: Vec<PathBuf> = Vec::new();
    let mut max_cycles: Option<u64> = None;
    let mut verbose = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(ParseResult::Help);
        }

        if arg == "--verbose" || arg == "-v" {
            verbose = true;
            continue;
        }

        if arg == "--max-cycles" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --max-cycles".to_string())?;
            let text = value.to_string_lossy();
            let limit = text
                .parse::<u64>()
                .map_err(|_| format!("invalid cycle count: {text}"))?;
            max_cycles = Some(limit);
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        paths.push(PathBuf::from(arg));
    }

    let mut paths = paths.into_iter();
    let output = paths
        .next()
        .ok_or_else(|| "missing output path".to_string())?;
    let objects: Vec<PathBuf> = paths.collect();
    if objects.is_empty() {
        return Err("missing object file".to_string());
    }

    Ok(ParseResult::Run(TraceArgs {
        output,
        objects,
        max_cycles,
        verbose,
    }))
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Only fails when a global subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run_trace(args: &TraceArgs) -> Result<(), i32> {
    let mut state = MachineState::new();

    for object in &args.objects {
        match load_object_file(&mut state.memory, object) {
            Ok(summary) => debug!(
                path = %object.display(),
                segments = summary.segments,
                words = summary.words,
                "object loaded"
            ),
            Err(e) => {
                eprintln!("error: {e}");
                return Err(1);
            }
        }
    }

    let file = match File::create(&args.output) {
        Ok(file) => file,
        Err(e) => {
            eprintln!(
                "error: cannot create trace file `{}`: {e}",
                args.output.display()
            );
            return Err(1);
        }
    };
    let mut writer = TraceWriter::new(BufWriter::new(file));
    let config = SimConfig {
        max_cycles: args.max_cycles,
    };

    let outcome = match run(&mut state, &mut writer, &config) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("error: failed to write trace: {e}");
            return Err(1);
        }
    };
    if let Err(e) = writer.flush() {
        eprintln!("error: failed to write trace: {e}");
        return Err(1);
    }

    info!(cycles = outcome.cycles, stop = ?outcome.stop(), "simulation finished");

    if let RunStop::Fault(cause) = outcome.stop() {
        eprintln!(
            "error: {cause} (code {}) at PC {:04X} after {} cycles",
            cause.as_u8(),
            state.arch.pc(),
            outcome.cycles
        );
    }
    Ok(())
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Run(args)) => {
            init_logging(args.verbose);
            match run_trace(&args) {
                Ok(()) => 0,
                Err(code) => code,
            }
        }
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            1
        }
    };

    std::process::exit(exit_code);
}
