//! Grid War -- an interactive text front end for the rules engine.
//!
//! Reads commands from stdin and writes the board, prompts and replies to
//! stdout. Diagnostics go to stderr through `tracing`; set `RUST_LOG` to
//! see them.

use std::io::{self, BufRead, Write};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use gridwar::config::GameConfig;
use gridwar::engine::Engine;
use gridwar::protocol::{parse_command, Command};
use gridwar::render::{format_board, RenderSink, TextRenderer};

/// Writes the handshake: id lines, option declarations, then `gwiok`.
fn handle_gwi<W: Write>(config: &GameConfig, out: &mut W) -> io::Result<()> {
    writeln!(out, "id name gridwar {}", env!("CARGO_PKG_VERSION"))?;
    for line in config.option_lines() {
        writeln!(out, "{}", line)?;
    }
    writeln!(out, "gwiok")?;
    out.flush()
}

fn run() -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let renderer = TextRenderer::new(io::BufWriter::new(stdout.lock()));
    let mut engine = Engine::new(GameConfig::default(), renderer);

    for line in stdin.lock().lines() {
        let line = line?;
        let Some(cmd) = parse_command(&line) else {
            continue;
        };

        match cmd {
            Command::Gwi => {
                let config = engine.config().clone();
                handle_gwi(&config, engine.sink_mut().get_mut())?;
            }
            Command::IsReady => {
                let out = engine.sink_mut().get_mut();
                writeln!(out, "readyok")?;
                out.flush()?;
            }
            Command::SetOption { name, value } => {
                if let Err(e) = engine.set_option(&name, value.as_deref()) {
                    engine.sink_mut().message(&e.to_string());
                }
            }
            Command::NewGame => {
                // Rejections are already reported through the sink.
                let _ = engine.new_game();
            }
            Command::Play(input) => {
                let _ = engine.apply(input);
            }
            Command::Go => {
                if let Err(e) = engine.play_ai_turn() {
                    engine.sink_mut().message(&e.to_string());
                }
            }
            Command::State => {
                let board = format_board(engine.state());
                let out = engine.sink_mut().get_mut();
                out.write_all(board.as_bytes())?;
                out.flush()?;
            }
            Command::Snapshot => match engine.snapshot().to_json() {
                Ok(json) => {
                    let out = engine.sink_mut().get_mut();
                    writeln!(out, "snapshot {}", json)?;
                    out.flush()?;
                }
                Err(e) => tracing::error!(error = %e, "snapshot encoding failed"),
            },
            Command::Quit => break,
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run() {
        tracing::error!(error = %e, "i/o failure");
        std::process::exit(1);
    }
}
