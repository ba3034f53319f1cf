//! Self-play game generation.
//!
//! Plays complete games between two policies (the scripted AI or the
//! seeded random policy) through the same engine front ends use, so every
//! input is validated exactly as a player's would be. Games run in
//! parallel on a rayon pool and are delivered to a callback as they
//! finish. Records serialize to JSONL for offline analysis.

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::board::{ActionKind, GameMode, Input, Phase, Precision, Seat};
use crate::config::GameConfig;
use crate::engine::Engine;
use crate::movegen::random_turn;
use crate::protocol::Snapshot;

/// Who picks a seat's turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    Scripted,
    Random,
}

impl Policy {
    pub fn from_name(s: &str) -> Option<Policy> {
        match s {
            "scripted" | "ai" => Some(Policy::Scripted),
            "random" => Some(Policy::Random),
            _ => None,
        }
    }
}

/// Configuration for self-play game generation.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    pub mode: GameMode,
    pub precision: Precision,
    /// Policies for seat one and seat two.
    pub policies: [Policy; 2],
    /// Games still running after this many rounds are recorded as draws.
    pub max_turns: u32,
    /// Number of parallel threads for concurrent games.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
    /// Suppress per-game progress logging.
    pub quiet: bool,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            mode: GameMode::Classic,
            precision: Precision::Whole,
            policies: [Policy::Scripted, Policy::Random],
            max_turns: 200,
            threads: 4,
            seed: 0,
            quiet: false,
        }
    }
}

/// How often a seat chose each action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionCounts {
    pub moves: u32,
    pub places: u32,
    pub farms: u32,
}

impl ActionCounts {
    fn record(&mut self, action: ActionKind) {
        match action {
            ActionKind::Move => self.moves += 1,
            ActionKind::Place => self.places += 1,
            ActionKind::Farm => self.farms += 1,
        }
    }
}

/// A complete self-play game record.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    pub game_id: usize,
    pub mode: GameMode,
    pub policies: [Policy; 2],
    /// Winning seat number, `0` when the turn cap was reached.
    pub winner: u8,
    pub turns: u32,
    pub actions: [ActionCounts; 2],
    pub final_state: Snapshot,
}

fn make_rng(seed: u64, game_id: usize) -> SmallRng {
    if seed != 0 {
        SmallRng::seed_from_u64(seed.wrapping_add(game_id as u64))
    } else {
        SmallRng::from_entropy()
    }
}

/// Ends the turn from wherever a failed input sequence left it.
fn force_end_turn(engine: &mut Engine) {
    if matches!(engine.state().phase, Phase::AwaitingAmount(_)) {
        let _ = engine.apply(Input::Cancel);
    }
    let input = if engine.state().phase == Phase::Action {
        Input::Action(ActionKind::Farm)
    } else {
        Input::EndTurn
    };
    let _ = engine.apply(input);
}

/// Plays one turn for `seat` with the random policy.
fn play_random_turn(engine: &mut Engine, seat: Seat, precision: Precision, rng: &mut impl Rng) {
    for input in random_turn(engine.state(), seat, precision, rng) {
        if let Err(e) = engine.apply(input) {
            tracing::debug!(?input, error = %e, "random input rejected");
            break;
        }
    }
    if engine.state().current == seat && !engine.state().game_over {
        force_end_turn(engine);
    }
}

/// Plays one complete game.
pub fn play_game(config: &SelfPlayConfig, game_id: usize, rng: &mut impl Rng) -> GameRecord {
    let game_config = GameConfig {
        mode: config.mode,
        precision: config.precision,
        ..GameConfig::default()
    };
    let mut engine = Engine::headless(game_config);
    let mut actions = [ActionCounts::default(); 2];

    while !engine.state().game_over && engine.state().turn <= config.max_turns {
        let seat = engine.state().current;
        match config.policies[seat.index()] {
            Policy::Scripted => {
                if let Err(e) = engine.play_ai_turn() {
                    tracing::warn!(game_id, error = %e, "scripted turn failed");
                    break;
                }
            }
            Policy::Random => play_random_turn(&mut engine, seat, config.precision, rng),
        }
        if let Some(action) = engine.state().player(seat).last_action {
            actions[seat.index()].record(action);
        }
    }

    let state = engine.state();
    GameRecord {
        game_id,
        mode: config.mode,
        policies: config.policies,
        winner: state.winner.map_or(0, Seat::number),
        turns: state.turn,
        actions,
        final_state: Snapshot::from_state(state),
    }
}

fn log_progress(config: &SelfPlayConfig, done: usize, game: &GameRecord, started: Instant) {
    if config.quiet {
        return;
    }
    tracing::info!(
        game = done,
        of = config.num_games,
        winner = game.winner,
        turns = game.turns,
        secs = started.elapsed().as_secs_f64(),
        "game finished"
    );
}

/// Runs self-play generation, producing every game record.
pub fn run_self_play(config: &SelfPlayConfig) -> Result<Vec<GameRecord>, rayon::ThreadPoolBuildError> {
    let mut games = Vec::with_capacity(config.num_games);
    run_self_play_with_callback(config, |game| games.push(game))?;
    games.sort_by_key(|g| g.game_id);
    Ok(games)
}

/// Runs self-play generation, calling `on_game` with each completed game
/// in completion order.
pub fn run_self_play_with_callback<F>(
    config: &SelfPlayConfig,
    on_game: F,
) -> Result<(), rayon::ThreadPoolBuildError>
where
    F: FnMut(GameRecord),
{
    if config.threads > 1 {
        run_self_play_parallel(config, on_game)
    } else {
        run_self_play_sequential(config, on_game);
        Ok(())
    }
}

fn run_self_play_sequential<F>(config: &SelfPlayConfig, mut on_game: F)
where
    F: FnMut(GameRecord),
{
    for i in 0..config.num_games {
        let started = Instant::now();
        let mut rng = make_rng(config.seed, i);
        let game = play_game(config, i, &mut rng);
        log_progress(config, i + 1, &game, started);
        on_game(game);
    }
}

/// Plays games on a rayon pool; finished games travel back over a channel
/// so the callback runs on the calling thread.
fn run_self_play_parallel<F>(
    config: &SelfPlayConfig,
    mut on_game: F,
) -> Result<(), rayon::ThreadPoolBuildError>
where
    F: FnMut(GameRecord),
{
    use rayon::prelude::*;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;
    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<GameRecord>();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            pool.install(|| {
                (0..config.num_games)
                    .into_par_iter()
                    .for_each_with(tx, |tx, i| {
                        let started = Instant::now();
                        let mut rng = make_rng(config.seed, i);
                        let game = play_game(config, i, &mut rng);
                        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        log_progress(config, done, &game, started);
                        let _ = tx.send(game);
                    });
            });
        });

        for game in rx {
            on_game(game);
        }
    });
    Ok(())
}

/// Writes game records as JSONL, one game per line.
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Aggregate results over a batch of games.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub games: usize,
    /// Wins per seat.
    pub wins: [usize; 2],
    pub draws: usize,
    pub avg_turns: f64,
    pub actions: [ActionCounts; 2],
}

/// Computes the aggregate results of `games`.
pub fn summarize(games: &[GameRecord]) -> Summary {
    let mut summary = Summary {
        games: games.len(),
        ..Summary::default()
    };
    let mut total_turns = 0u64;
    for game in games {
        match Seat::from_number(game.winner) {
            Some(seat) => summary.wins[seat.index()] += 1,
            None => summary.draws += 1,
        }
        total_turns += u64::from(game.turns);
        for (sum, counts) in summary.actions.iter_mut().zip(game.actions.iter()) {
            sum.moves += counts.moves;
            sum.places += counts.places;
            sum.farms += counts.farms;
        }
    }
    if !games.is_empty() {
        summary.avg_turns = total_turns as f64 / games.len() as f64;
    }
    summary
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Self-play summary ({} games) ===", self.games)?;
        let pct = |n: usize| {
            if self.games == 0 {
                0.0
            } else {
                n as f64 * 100.0 / self.games as f64
            }
        };
        for seat in [Seat::One, Seat::Two] {
            let i = seat.index();
            let a = self.actions[i];
            writeln!(
                f,
                "player {}: {} wins ({:.1}%), moves {} places {} farms {}",
                seat.number(),
                self.wins[i],
                pct(self.wins[i]),
                a.moves,
                a.places,
                a.farms
            )?;
        }
        writeln!(f, "draws: {} ({:.1}%)", self.draws, pct(self.draws))?;
        write!(f, "average turns: {:.1}", self.avg_turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config(num_games: usize, threads: usize) -> SelfPlayConfig {
        SelfPlayConfig {
            num_games,
            threads,
            seed: 42,
            quiet: true,
            max_turns: 60,
            ..SelfPlayConfig::default()
        }
    }

    #[test]
    fn play_single_game_completes() {
        let config = quiet_config(1, 1);
        let mut rng = SmallRng::seed_from_u64(1);
        let game = play_game(&config, 0, &mut rng);

        assert!(game.turns >= 1);
        assert!(game.winner <= 2);
        if game.winner == 0 {
            assert!(game.turns > config.max_turns);
        } else {
            assert!(game.final_state.game_over);
        }
        game.final_state.validate().unwrap();
    }

    #[test]
    fn scripted_mirror_is_deterministic() {
        let config = SelfPlayConfig {
            policies: [Policy::Scripted, Policy::Scripted],
            ..quiet_config(1, 1)
        };
        let a = play_game(&config, 0, &mut SmallRng::seed_from_u64(1));
        let b = play_game(&config, 0, &mut SmallRng::seed_from_u64(2));
        assert_eq!(a.final_state, b.final_state);
        assert_eq!(a.actions, b.actions);
    }

    #[test]
    fn sequential_run_produces_correct_count() {
        let games = run_self_play(&quiet_config(3, 1)).unwrap();
        assert_eq!(games.len(), 3);
        assert_eq!(
            games.iter().map(|g| g.game_id).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn parallel_run_matches_sequential() {
        let sequential = run_self_play(&quiet_config(4, 1)).unwrap();
        let parallel = run_self_play(&quiet_config(4, 2)).unwrap();
        assert_eq!(parallel.len(), 4);
        for (s, p) in sequential.iter().zip(parallel.iter()) {
            assert_eq!(s.final_state, p.final_state);
        }
    }

    #[test]
    fn jsonl_output_is_valid() {
        let games = run_self_play(&quiet_config(2, 1)).unwrap();
        let mut buf = Vec::new();
        write_jsonl(&games, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let v: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(v["game_id"].is_u64());
            assert_eq!(v["policies"][0], "scripted");
            assert!(v["final_state"]["grid"].is_array());
            // The embedded snapshot decodes on its own.
            let snap: Snapshot = serde_json::from_value(v["final_state"].clone()).unwrap();
            snap.validate().unwrap();
        }
    }

    #[test]
    fn summary_counts_outcomes() {
        let games = run_self_play(&quiet_config(5, 1)).unwrap();
        let summary = summarize(&games);
        assert_eq!(summary.games, 5);
        assert_eq!(summary.wins[0] + summary.wins[1] + summary.draws, 5);
        assert!(summary.avg_turns >= 1.0);
        assert!(summary.to_string().contains("=== Self-play summary (5 games) ==="));
        assert_eq!(summarize(&[]), Summary::default());
    }

    #[test]
    fn policy_names() {
        assert_eq!(Policy::from_name("ai"), Some(Policy::Scripted));
        assert_eq!(Policy::from_name("random"), Some(Policy::Random));
        assert_eq!(Policy::from_name("mcts"), None);
    }
}
