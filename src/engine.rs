//! The turn state machine.
//!
//! `Engine` owns the game state and is the only thing that mutates it.
//! Front ends feed it `Input`s; each one is checked against turn gating and
//! the current phase, delegated to the rule functions in `resolve`, logged,
//! and followed by a render. Rejected inputs leave the state untouched and
//! their reason goes to the message sink.
//!
//! When the scripted AI is enabled it plays seat one synchronously as soon
//! as that seat's turn starts. In an online session the engine pushes a
//! snapshot after every completed turn and applies incoming snapshots only
//! when they hand the turn to the local seat or end the game.

use crate::ai::{self, AiDecision};
use crate::board::{
    ActionKind, AmountRequest, Coord, GameState, Input, PendingIntent, Phase, Seat, Troops,
};
use crate::config::{ConfigError, GameConfig};
use crate::movegen::{deployable_cells, placeable_reserves};
use crate::protocol::snapshot::Snapshot;
use crate::render::{NullSink, RenderSink};
use crate::resolve::{
    check_counter, farm, is_deployable, next_turn, place_troops, resolve_move, CombatOutcome,
    MoveError, PlaceError,
};
use crate::sync::OnlineSession;

/// Reasons an input is rejected. The display text is shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("the game is over")]
    GameOver,

    #[error("waiting for the opponent")]
    NotYourTurn,

    #[error("choose move, place or farm first")]
    ChooseActionFirst,

    #[error("an action was already chosen this turn")]
    ActionAlreadyChosen,

    #[error("confirm or cancel the amount first")]
    AmountPending,

    #[error("no amount was requested")]
    NoAmountRequested,

    #[error("no source cell is selected")]
    NoSelection,

    #[error("you have no troops that can move")]
    NoMovableTroops,

    #[error("not enough reserves to place")]
    NoReserves,

    #[error("your deployment column is held by the enemy")]
    DeploymentBlocked,

    #[error("troops at {0} have already moved this turn")]
    AlreadyMoved(Coord),

    #[error("choose a cell you own with unmoved troops")]
    NotMovable(Coord),

    #[error("too few troops at {0} to move at this precision")]
    TooFewToMove(Coord),

    #[error("choose a cell adjacent to {from}")]
    NotAdjacent { from: Coord, to: Coord },

    #[error("choose an open cell in your deployment column")]
    NotDeployable(Coord),

    #[error("reserves are used up, end your turn")]
    ReservesExhausted,

    #[error("restart is not available in an online game")]
    RestartOnline,

    #[error(transparent)]
    Move(#[from] MoveError),

    #[error(transparent)]
    Place(#[from] PlaceError),
}

/// What happened to an incoming remote snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOutcome {
    Applied,
    /// It does not hand the turn to this seat; usually our own echo.
    StaleEcho,
    /// It failed validation.
    Rejected,
    /// The engine is not in an online session.
    Offline,
}

fn fresh_state(config: &GameConfig) -> GameState {
    GameState::new(config.mode, config.starting_reserves(), config.base_hp)
}

/// Owns one game and drives it from player inputs.
pub struct Engine<S: RenderSink = NullSink> {
    state: GameState,
    config: GameConfig,
    sink: S,
    online: Option<OnlineSession>,
}

impl Engine<NullSink> {
    /// Creates an engine that renders nowhere.
    pub fn headless(config: GameConfig) -> Self {
        Engine::new(config, NullSink)
    }
}

impl<S: RenderSink> Engine<S> {
    /// Starts a new game. If the AI is enabled it plays its opening turn
    /// before this returns.
    pub fn new(config: GameConfig, sink: S) -> Self {
        let state = fresh_state(&config);
        let mut engine = Engine {
            state,
            config,
            sink,
            online: None,
        };
        engine.start();
        engine
    }

    /// Wraps an existing state without logging or running the AI.
    pub fn from_state(config: GameConfig, state: GameState, sink: S) -> Self {
        Engine {
            state,
            config,
            sink,
            online: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// The seat played locally in an online session.
    pub fn online_seat(&self) -> Option<Seat> {
        self.online.as_ref().map(|s| s.seat)
    }

    /// Applies a named option. Mode, reserves and hit points take effect at
    /// the next new game; the rest apply immediately.
    pub fn set_option(&mut self, name: &str, value: Option<&str>) -> Result<(), ConfigError> {
        self.config.set_option(name, value)?;
        tracing::debug!(name, ?value, "option set");
        Ok(())
    }

    /// Restarts with a fresh state. Not allowed online.
    pub fn new_game(&mut self) -> Result<(), ActionError> {
        if self.online.is_some() {
            self.sink.message(&ActionError::RestartOnline.to_string());
            return Err(ActionError::RestartOnline);
        }
        self.state = fresh_state(&self.config);
        self.start();
        Ok(())
    }

    /// Replaces the state wholesale, as when resuming from a snapshot.
    pub fn load_state(&mut self, state: GameState) {
        self.state = state;
        self.sink.render(&self.state);
        self.prompt();
    }

    /// Joins an online room. The AI is switched off for online play.
    pub fn connect(&mut self, session: OnlineSession) {
        tracing::info!(room = %session.room, seat = session.seat.number(), "online session attached");
        self.config.ai_enabled = false;
        self.online = Some(session);
        self.prompt();
    }

    /// The serialized form of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_state(&self.state)
    }

    /// Whether local input may act right now.
    pub fn is_my_turn(&self) -> bool {
        if self.config.ai_enabled {
            return self.state.current == Seat::Two;
        }
        match &self.online {
            Some(session) => self.state.current == session.seat,
            None => true,
        }
    }

    /// Handles one player input.
    pub fn apply(&mut self, input: Input) -> Result<(), ActionError> {
        let result = self.dispatch(input);
        if let Err(e) = &result {
            tracing::debug!(?input, error = %e, "input rejected");
            self.sink.message(&e.to_string());
        }
        result
    }

    /// Plays the current seat's turn with the scripted policy. Online, only
    /// the local seat's turn can be played.
    pub fn play_ai_turn(&mut self) -> Result<AiDecision, ActionError> {
        if self.state.game_over {
            return Err(ActionError::GameOver);
        }
        let seat = self.state.current;
        if self.online_seat().is_some_and(|local| local != seat) {
            return Err(ActionError::NotYourTurn);
        }
        self.state.reset_selection();
        self.state.phase = Phase::Action;

        let decision = ai::decide(&self.state, seat);
        tracing::debug!(seat = seat.number(), ?decision, "ai decided");
        match decision {
            AiDecision::Advance { from, to, amount } => {
                self.counter_check(seat, ActionKind::Move);
                let outcome = resolve_move(&mut self.state.grid, seat, from, to, amount)?;
                self.log_move(seat, from, to, outcome);
            }
            AiDecision::Deploy { at, amount } => {
                self.counter_check(seat, ActionKind::Place);
                place_troops(&mut self.state, seat, at, amount)?;
                self.log(format!("player {} places {} at {}", seat.number(), amount, at));
            }
            AiDecision::Farm => self.do_farm(seat),
        }
        self.sink.render(&self.state);
        self.finish_turn();
        Ok(decision)
    }

    /// Applies every snapshot received since the last poll and returns how
    /// many were accepted.
    pub fn poll_remote(&mut self) -> usize {
        let payloads = match &self.online {
            Some(session) => session.drain(),
            None => return 0,
        };
        let mut applied = 0;
        for payload in payloads {
            match Snapshot::from_json(&payload) {
                Ok(snapshot) => {
                    if self.apply_remote(&snapshot) == RemoteOutcome::Applied {
                        applied += 1;
                    }
                }
                Err(e) => tracing::warn!(error = %e, "ignoring malformed snapshot"),
            }
        }
        applied
    }

    /// Loads a remote snapshot if it hands the turn to the local seat or
    /// reports the game over. Anything else is a stale echo.
    pub fn apply_remote(&mut self, snapshot: &Snapshot) -> RemoteOutcome {
        let Some(seat) = self.online_seat() else {
            return RemoteOutcome::Offline;
        };
        if snapshot.current_player != seat.number() && !snapshot.game_over {
            tracing::debug!(turn = snapshot.turn, "stale snapshot ignored");
            return RemoteOutcome::StaleEcho;
        }
        match snapshot.to_state() {
            Ok(state) => {
                tracing::debug!(turn = state.turn, "remote snapshot applied");
                self.load_state(state);
                RemoteOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring invalid snapshot");
                RemoteOutcome::Rejected
            }
        }
    }

    fn start(&mut self) {
        self.log(format!("new {} game", self.state.mode.name()));
        self.sink.render(&self.state);
        self.prompt();
        self.maybe_run_ai();
    }

    fn dispatch(&mut self, input: Input) -> Result<(), ActionError> {
        if self.state.game_over {
            return Err(ActionError::GameOver);
        }
        if !self.is_my_turn() {
            return Err(ActionError::NotYourTurn);
        }

        match (self.state.phase, input) {
            (_, Input::Cancel) => {
                self.cancel();
                Ok(())
            }
            (Phase::Action, Input::Action(kind)) => self.choose_action(kind),
            (Phase::Action, _) => Err(ActionError::ChooseActionFirst),
            (Phase::AwaitingAmount(req), Input::Amount(amount)) => self.confirm_amount(req, amount),
            (Phase::AwaitingAmount(_), _) => Err(ActionError::AmountPending),
            (_, Input::EndTurn) => {
                self.state.turn_action = None;
                self.finish_turn();
                Ok(())
            }
            (Phase::MoveSource, Input::Select(at)) => self.select_source(at),
            (Phase::MoveTarget, Input::Select(at)) => self.select_target(at),
            (Phase::PlaceTarget, Input::Select(at)) => self.select_deployment(at),
            (_, Input::Action(_)) => Err(ActionError::ActionAlreadyChosen),
            (_, Input::Amount(_)) => Err(ActionError::NoAmountRequested),
            (Phase::GameOver, _) => Err(ActionError::GameOver),
        }
    }

    fn choose_action(&mut self, kind: ActionKind) -> Result<(), ActionError> {
        let seat = self.state.current;
        let precision = self.config.precision;
        match kind {
            ActionKind::Move => {
                if !self.state.grid.has_movable(seat) {
                    return Err(ActionError::NoMovableTroops);
                }
                self.counter_check(seat, kind);
                self.state.turn_action = Some(kind);
                self.state.phase = Phase::MoveSource;
                self.sink.render(&self.state);
                self.sink.message("choose a cell to move troops from");
            }
            ActionKind::Place => {
                if placeable_reserves(&self.state, seat, precision) < precision.step() {
                    return Err(ActionError::NoReserves);
                }
                if deployable_cells(&self.state, seat).is_empty() {
                    return Err(ActionError::DeploymentBlocked);
                }
                self.counter_check(seat, kind);
                self.state.turn_action = Some(kind);
                self.state.phase = Phase::PlaceTarget;
                self.sink.render(&self.state);
                self.sink.message("choose a cell in your deployment column");
            }
            ActionKind::Farm => {
                self.do_farm(seat);
                self.finish_turn();
            }
        }
        Ok(())
    }

    fn select_source(&mut self, at: Coord) -> Result<(), ActionError> {
        let seat = self.state.current;
        let step = self.config.precision.step();
        let cell = self.state.grid[at];

        if !cell.is_owned_by(seat) || cell.troops.is_zero() {
            return Err(if cell.is_owned_by(seat) && !cell.moved.is_zero() {
                ActionError::AlreadyMoved(at)
            } else {
                ActionError::NotMovable(at)
            });
        }
        if cell.troops.floor_to(self.config.precision) < step {
            return Err(ActionError::TooFewToMove(at));
        }

        self.state.selected = Some(at);
        self.state.phase = Phase::MoveTarget;
        self.sink.render(&self.state);
        self.sink.message(&format!(
            "choose where to move (movable troops: {})",
            cell.troops
        ));
        Ok(())
    }

    fn select_target(&mut self, to: Coord) -> Result<(), ActionError> {
        let from = self.state.selected.ok_or(ActionError::NoSelection)?;
        if !from.is_adjacent(to) {
            return Err(ActionError::NotAdjacent { from, to });
        }

        let precision = self.config.precision;
        let request = AmountRequest {
            min: precision.step(),
            max: self.state.grid[from].troops.floor_to(precision),
            intent: PendingIntent::Move { from, to },
        };
        self.state.target = Some(to);
        self.open_amount(request, "move");
        Ok(())
    }

    fn select_deployment(&mut self, at: Coord) -> Result<(), ActionError> {
        let seat = self.state.current;
        if !is_deployable(&self.state, seat, at) {
            return Err(ActionError::NotDeployable(at));
        }

        let precision = self.config.precision;
        let max = placeable_reserves(&self.state, seat, precision);
        if max < precision.step() {
            return Err(ActionError::ReservesExhausted);
        }
        let request = AmountRequest {
            min: precision.step(),
            max,
            intent: PendingIntent::Place { at },
        };
        self.state.target = Some(at);
        self.open_amount(request, "place");
        Ok(())
    }

    fn open_amount(&mut self, request: AmountRequest, verb: &str) {
        self.state.phase = Phase::AwaitingAmount(request);
        self.sink.render(&self.state);
        self.sink.message(&format!(
            "choose how many troops to {} ({} ~ {})",
            verb, request.min, request.max
        ));
    }

    fn confirm_amount(&mut self, request: AmountRequest, amount: Troops) -> Result<(), ActionError> {
        let seat = self.state.current;
        let amount = request.clamp(amount.floor_to(self.config.precision));

        match request.intent {
            PendingIntent::Move { from, to } => {
                let outcome = resolve_move(&mut self.state.grid, seat, from, to, amount)?;
                self.log_move(seat, from, to, outcome);
                self.state.selected = None;
                self.state.target = None;
                self.state.phase = Phase::MoveSource;
                self.sink.render(&self.state);
                self.sink.message("choose more troops to move, or end the turn");
            }
            PendingIntent::Place { at } => {
                place_troops(&mut self.state, seat, at, amount)?;
                self.log(format!("player {} places {} at {}", seat.number(), amount, at));
                self.state.target = None;
                self.state.phase = Phase::PlaceTarget;
                self.sink.render(&self.state);
                let precision = self.config.precision;
                if placeable_reserves(&self.state, seat, precision) < precision.step() {
                    self.sink.message(&ActionError::ReservesExhausted.to_string());
                } else {
                    self.sink.message("choose another deployment cell, or end the turn");
                }
            }
        }
        Ok(())
    }

    /// Backs out one level. Mid-turn this returns to the action's first
    /// step; before an action is chosen it stays in the action phase.
    fn cancel(&mut self) {
        self.state.selected = None;
        self.state.target = None;
        self.state.phase = match self.state.turn_action {
            Some(ActionKind::Move) => Phase::MoveSource,
            Some(ActionKind::Place) => Phase::PlaceTarget,
            _ => Phase::Action,
        };
        self.sink.render(&self.state);
        self.prompt();
    }

    fn counter_check(&mut self, seat: Seat, kind: ActionKind) {
        if let Some(bonus) = check_counter(&mut self.state, seat, kind) {
            self.log(format!("player {} {}", seat.number(), bonus));
        }
    }

    fn do_farm(&mut self, seat: Seat) {
        let report = farm(&mut self.state, seat);
        if let Some(bonus) = report.counter {
            self.log(format!("player {} {}", seat.number(), bonus));
        }
        self.log(format!("player {} {}", seat.number(), report));
    }

    fn log_move(&mut self, seat: Seat, from: Coord, to: Coord, outcome: CombatOutcome) {
        let line = match outcome {
            CombatOutcome::Reinforced { amount } => format!(
                "player {} moves {} from {} to {}",
                seat.number(),
                amount,
                from,
                to
            ),
            _ => format!("player {} attacks {} from {}: {}", seat.number(), to, from, outcome),
        };
        self.log(line);
    }

    fn log(&mut self, line: String) {
        tracing::info!(turn = self.state.turn, "{}", line);
        self.state.push_log(&line, self.config.log_capacity);
    }

    /// Passes the turn, reports start-of-turn effects, syncs, and lets the
    /// AI move if the new seat is scripted.
    fn finish_turn(&mut self) {
        let start = next_turn(&mut self.state, self.config.damage_policy);
        let seat = start.seat.number();

        if let Some(damage) = start.damage.filter(|d| !d.damage.is_zero()) {
            self.log(format!(
                "player {} base takes {} damage, {} hp left",
                seat, damage.damage, damage.remaining_hp
            ));
        }
        if let Some(income) = start.income {
            self.log(format!("player {} income {}", seat, income));
        }
        if let Some(winner) = self.state.winner.filter(|_| self.state.game_over) {
            self.log(format!(
                "player {} wins by destroying the enemy base on turn {}",
                winner.number(),
                self.state.turn
            ));
        }
        tracing::debug!(seat, turn = start.turn, "turn started");

        self.push_online();
        self.sink.render(&self.state);
        self.prompt();
        self.maybe_run_ai();
    }

    fn prompt(&mut self) {
        let text = match self.state.winner {
            Some(winner) if self.state.game_over => format!("player {} wins", winner.number()),
            _ if self.is_my_turn() => format!(
                "player {}: choose move, place or farm",
                self.state.current.number()
            ),
            _ => ActionError::NotYourTurn.to_string(),
        };
        if self.state.phase == Phase::Action || self.state.game_over {
            self.sink.message(&text);
        }
    }

    fn maybe_run_ai(&mut self) {
        if !self.config.ai_enabled || self.state.game_over || self.state.current != Seat::One {
            return;
        }
        if let Err(e) = self.play_ai_turn() {
            tracing::warn!(error = %e, "ai turn failed");
            self.sink.message(&e.to_string());
        }
    }

    fn push_online(&self) {
        let Some(session) = &self.online else {
            return;
        };
        let pushed = self
            .snapshot()
            .to_json()
            .map_err(|e| e.to_string())
            .and_then(|json| session.push(json).map_err(|e| e.to_string()));
        if let Err(e) = pushed {
            tracing::warn!(room = %session.room, error = %e, "state push failed");
        }
    }
}
