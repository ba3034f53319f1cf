//! Game configuration.
//!
//! Collects every rule knob in one place. Front ends set options by name
//! (`setoption name Mode value competitive`), the same way engine options
//! are exchanged over the text protocol.

use crate::board::{GameMode, Precision, Troops};

/// Default starting reserves for each seat.
pub const INITIAL_RESERVES: u32 = 6;

/// Default base hit points.
pub const BASE_HP: u32 = 50;

/// Default number of log lines retained in the state.
pub const LOG_CAPACITY: usize = 100;

/// Upper bound for configured starting reserves and hit points.
pub const MAX_STARTING_AMOUNT: Troops = Troops::whole(10_000);

/// Upper bound for the retained log.
pub const MAX_LOG_CAPACITY: usize = 10_000;

/// Errors raised while applying a named option.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("option '{name}' requires a value")]
    MissingValue { name: String },

    #[error("invalid value '{value}' for option '{name}'")]
    InvalidValue { name: String, value: String },
}

/// What happens to enemy troops after they damage a deployment column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DamagePolicy {
    /// The attacking troops are destroyed after dealing damage.
    #[default]
    Kamikaze,
    /// The attacking troops stay and hit again next turn.
    Persist,
}

/// Rule configuration for a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub mode: GameMode,
    /// Seat one is played by the scripted AI.
    pub ai_enabled: bool,
    pub damage_policy: DamagePolicy,
    pub precision: Precision,
    pub initial_reserves: Troops,
    pub base_hp: Troops,
    pub log_capacity: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            mode: GameMode::Classic,
            ai_enabled: false,
            damage_policy: DamagePolicy::Kamikaze,
            precision: Precision::Whole,
            initial_reserves: Troops::whole(INITIAL_RESERVES),
            base_hp: Troops::whole(BASE_HP),
            log_capacity: LOG_CAPACITY,
        }
    }
}

impl GameConfig {
    pub fn with_mode(mode: GameMode) -> Self {
        GameConfig {
            mode,
            ..GameConfig::default()
        }
    }

    /// Starting reserves per seat. Seat two gets one extra in competitive
    /// mode to offset moving second.
    pub fn starting_reserves(&self) -> [Troops; 2] {
        match self.mode {
            GameMode::Classic => [self.initial_reserves, self.initial_reserves],
            GameMode::Competitive => [self.initial_reserves, self.initial_reserves + Troops::ONE],
        }
    }

    /// Applies a named option.
    ///
    /// Recognized names: `Mode`, `AI`, `Kamikaze`, `Precision`,
    /// `InitialReserves`, `BaseHp`, `LogCapacity`.
    pub fn set_option(&mut self, name: &str, value: Option<&str>) -> Result<(), ConfigError> {
        let value = value.ok_or_else(|| ConfigError::MissingValue {
            name: name.to_string(),
        })?;
        let invalid = || ConfigError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        };

        match name {
            "Mode" => self.mode = GameMode::from_name(value).ok_or_else(invalid)?,
            "AI" => self.ai_enabled = parse_bool(value).ok_or_else(invalid)?,
            "Kamikaze" => {
                self.damage_policy = match parse_bool(value).ok_or_else(invalid)? {
                    true => DamagePolicy::Kamikaze,
                    false => DamagePolicy::Persist,
                }
            }
            "Precision" => self.precision = Precision::from_name(value).ok_or_else(invalid)?,
            "InitialReserves" => {
                let reserves: Troops = value.parse().map_err(|_| invalid())?;
                if reserves > MAX_STARTING_AMOUNT {
                    return Err(invalid());
                }
                self.initial_reserves = reserves;
            }
            "BaseHp" => {
                let hp: Troops = value.parse().map_err(|_| invalid())?;
                if hp.is_zero() || hp > MAX_STARTING_AMOUNT {
                    return Err(invalid());
                }
                self.base_hp = hp;
            }
            "LogCapacity" => {
                let cap: usize = value.parse().map_err(|_| invalid())?;
                if cap == 0 || cap > MAX_LOG_CAPACITY {
                    return Err(invalid());
                }
                self.log_capacity = cap;
            }
            other => return Err(ConfigError::UnknownOption(other.to_string())),
        }
        Ok(())
    }

    /// Option declarations advertised during the protocol handshake.
    pub fn option_lines(&self) -> Vec<String> {
        vec![
            format!(
                "option name Mode type combo default {} var classic var competitive",
                self.mode.name()
            ),
            format!("option name AI type check default {}", self.ai_enabled),
            format!(
                "option name Kamikaze type check default {}",
                self.damage_policy == DamagePolicy::Kamikaze
            ),
            "option name Precision type combo default whole var whole var half".to_string(),
            format!(
                "option name InitialReserves type string default {}",
                self.initial_reserves
            ),
            format!("option name BaseHp type string default {}", self.base_hp),
            format!(
                "option name LogCapacity type spin default {} min 1 max {}",
                self.log_capacity, MAX_LOG_CAPACITY
            ),
        ]
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "on" | "1" => Some(true),
        "false" | "off" | "0" => Some(false),
        _ => None,
    }
}
