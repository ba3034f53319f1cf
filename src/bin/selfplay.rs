//! Self-play game generation CLI.
//!
//! Plays Grid War games between two policies and writes one JSON record per
//! game.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]
//!
//! Options:
//!   --games N        Number of games to play (default: 10)
//!   --mode M         classic or competitive (default: classic)
//!   --precision P    whole or half (default: whole)
//!   --p1 POLICY      scripted or random (default: scripted)
//!   --p2 POLICY      scripted or random (default: random)
//!   --max-turns N    Turn cap before a game counts as a draw (default: 200)
//!   --threads N      Number of parallel threads (default: 4)
//!   --seed N         Random seed, 0 for entropy (default: 0)
//!   --output FILE    Output file path (default: stdout)
//!   --quiet          Suppress progress and summary output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process;
use std::str::FromStr;
use std::time::Instant;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use gridwar::board::{GameMode, Precision};
use gridwar::selfplay::{self, Policy, SelfPlayConfig};

/// Fetches and parses the value following a flag.
fn value<T: FromStr>(args: &[String], i: &mut usize, flag: &str) -> Result<T, String> {
    *i += 1;
    let raw = args
        .get(*i)
        .ok_or_else(|| format!("missing value for {}", flag))?;
    raw.parse()
        .map_err(|_| format!("invalid {} value: '{}'", flag, raw))
}

fn named<T>(raw: String, flag: &str, parse: fn(&str) -> Option<T>) -> Result<T, String> {
    parse(&raw).ok_or_else(|| format!("invalid {} value: '{}'", flag, raw))
}

fn parse_args(args: &[String]) -> Result<Option<(SelfPlayConfig, Option<String>)>, String> {
    let mut config = SelfPlayConfig::default();
    let mut output_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--games" => config.num_games = value(args, &mut i, "--games")?,
            "--mode" => {
                config.mode = named(value(args, &mut i, "--mode")?, "--mode", GameMode::from_name)?
            }
            "--precision" => {
                config.precision = named(
                    value(args, &mut i, "--precision")?,
                    "--precision",
                    Precision::from_name,
                )?
            }
            "--p1" => config.policies[0] = named(value(args, &mut i, "--p1")?, "--p1", Policy::from_name)?,
            "--p2" => config.policies[1] = named(value(args, &mut i, "--p2")?, "--p2", Policy::from_name)?,
            "--max-turns" => config.max_turns = value(args, &mut i, "--max-turns")?,
            "--threads" => config.threads = value(args, &mut i, "--threads")?,
            "--seed" => config.seed = value(args, &mut i, "--seed")?,
            "--output" => output_path = Some(value(args, &mut i, "--output")?),
            "--quiet" => config.quiet = true,
            "--help" | "-h" => return Ok(None),
            other => return Err(format!("unknown argument: {}", other)),
        }
        i += 1;
    }
    Ok(Some((config, output_path)))
}

fn print_usage() {
    eprintln!("Usage: selfplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N        Number of games to play (default: 10)");
    eprintln!("  --mode M         classic or competitive (default: classic)");
    eprintln!("  --precision P    whole or half (default: whole)");
    eprintln!("  --p1 POLICY      scripted or random (default: scripted)");
    eprintln!("  --p2 POLICY      scripted or random (default: random)");
    eprintln!("  --max-turns N    Turn cap before a draw (default: 200)");
    eprintln!("  --threads N      Number of parallel threads (default: 4)");
    eprintln!("  --seed N         Random seed, 0 for entropy (default: 0)");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --quiet          Suppress progress and summary output");
    eprintln!("  --help           Show this help");
}

fn run(config: &SelfPlayConfig, output_path: Option<String>) -> io::Result<()> {
    let start = Instant::now();
    let games = selfplay::run_self_play(config).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let elapsed = start.elapsed();

    if !config.quiet {
        eprintln!(
            "Completed {} games in {:.1}s",
            games.len(),
            elapsed.as_secs_f64()
        );
        eprintln!("{}", selfplay::summarize(&games));
    }

    let mut writer: Box<dyn Write> = match &output_path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    selfplay::write_jsonl(&games, &mut writer)?;
    if let (Some(path), false) = (&output_path, config.quiet) {
        eprintln!("Wrote {} games to {}", games.len(), path);
    }
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let (config, output_path) = match parse_args(&args) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return;
        }
        Err(e) => {
            eprintln!("{}", e);
            print_usage();
            process::exit(1);
        }
    };

    if !config.quiet {
        eprintln!(
            "Self-play: {} games, {} mode, {:?} vs {:?}, {} threads",
            config.num_games,
            config.mode.name(),
            config.policies[0],
            config.policies[1],
            config.threads
        );
    }

    if let Err(e) = run(&config, output_path) {
        tracing::error!(error = %e, "self-play failed");
        process::exit(1);
    }
}
