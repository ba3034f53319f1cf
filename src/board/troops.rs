//! Exact troop quantities.
//!
//! Every amount in the game (troops, reserves, hit points) is a multiple of
//! one half. `Troops` stores the count of halves so arithmetic and equality
//! are exact, and converts to a plain JSON number at the transport edge.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

/// Errors produced when converting a number or string into `Troops`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TroopsError {
    #[error("troop amount must be between 0 and 1000000, got {0}")]
    OutOfRange(f64),

    #[error("troop amount must be a multiple of 0.5, got {0}")]
    NotHalfStep(f64),

    #[error("invalid troop amount: '{0}'")]
    Unparsable(String),
}

/// Granularity a player may choose when picking an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Precision {
    #[default]
    Whole,
    Half,
}

impl Precision {
    /// The smallest selectable amount.
    pub const fn step(self) -> Troops {
        match self {
            Precision::Whole => Troops::ONE,
            Precision::Half => Troops::HALF,
        }
    }

    pub fn from_name(s: &str) -> Option<Precision> {
        match s {
            "whole" | "1" => Some(Precision::Whole),
            "half" | "0.5" => Some(Precision::Half),
            _ => None,
        }
    }
}

/// A non-negative troop quantity in half-unit resolution.
///
/// Serialized as a JSON integer when whole and as a float otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "f64")]
pub struct Troops(u32);

impl Troops {
    pub const ZERO: Troops = Troops(0);
    pub const HALF: Troops = Troops(1);
    pub const ONE: Troops = Troops(2);
    /// Largest amount accepted from text or JSON.
    pub const MAX: Troops = Troops(2_000_000);

    /// Creates an amount of `n` whole troops.
    pub const fn whole(n: u32) -> Self {
        Troops(n * 2)
    }

    /// Creates an amount from a count of halves.
    pub const fn from_halves(halves: u32) -> Self {
        Troops(halves)
    }

    pub const fn halves(self) -> u32 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Rounds down to a multiple of the precision step.
    pub const fn floor_to(self, precision: Precision) -> Self {
        match precision {
            Precision::Whole => Troops(self.0 - self.0 % 2),
            Precision::Half => self,
        }
    }

    pub const fn checked_add(self, rhs: Troops) -> Option<Troops> {
        match self.0.checked_add(rhs.0) {
            Some(halves) => Some(Troops(halves)),
            None => None,
        }
    }

    pub const fn saturating_sub(self, rhs: Troops) -> Self {
        Troops(self.0.saturating_sub(rhs.0))
    }

    pub const fn abs_diff(self, rhs: Troops) -> Self {
        Troops(self.0.abs_diff(rhs.0))
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

impl Add for Troops {
    type Output = Troops;

    fn add(self, rhs: Troops) -> Troops {
        Troops(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Troops {
    fn add_assign(&mut self, rhs: Troops) {
        *self = *self + rhs;
    }
}

impl Sub for Troops {
    type Output = Troops;

    fn sub(self, rhs: Troops) -> Troops {
        debug_assert!(rhs.0 <= self.0, "troop subtraction underflow");
        Troops(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Troops {
    fn sub_assign(&mut self, rhs: Troops) {
        *self = *self - rhs;
    }
}

impl fmt::Display for Troops {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 2 == 0 {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}.5", self.0 / 2)
        }
    }
}

impl TryFrom<f64> for Troops {
    type Error = TroopsError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value < 0.0 || value > Troops::MAX.as_f64() {
            return Err(TroopsError::OutOfRange(value));
        }
        let doubled = value * 2.0;
        if doubled.fract() != 0.0 {
            return Err(TroopsError::NotHalfStep(value));
        }
        // Range and integrality were checked above.
        Ok(Troops(doubled as u32))
    }
}

impl Serialize for Troops {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 2 == 0 {
            serializer.serialize_u32(self.0 / 2)
        } else {
            serializer.serialize_f64(self.as_f64())
        }
    }
}

impl From<Troops> for f64 {
    fn from(t: Troops) -> f64 {
        t.as_f64()
    }
}

impl FromStr for Troops {
    type Err = TroopsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| TroopsError::Unparsable(s.to_string()))?;
        Troops::try_from(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_game_formatting() {
        assert_eq!(Troops::whole(3).to_string(), "3");
        assert_eq!(Troops::from_halves(5).to_string(), "2.5");
        assert_eq!(Troops::HALF.to_string(), "0.5");
        assert_eq!(Troops::ZERO.to_string(), "0");
    }

    #[test]
    fn parse_accepts_halves_only() {
        assert_eq!("4".parse::<Troops>(), Ok(Troops::whole(4)));
        assert_eq!("1.5".parse::<Troops>(), Ok(Troops::from_halves(3)));
        assert!(matches!("1.25".parse::<Troops>(), Err(TroopsError::NotHalfStep(_))));
        assert!(matches!("-1".parse::<Troops>(), Err(TroopsError::OutOfRange(_))));
        assert!(matches!("abc".parse::<Troops>(), Err(TroopsError::Unparsable(_))));
        assert_eq!("1000000".parse::<Troops>(), Ok(Troops::MAX));
        assert!(matches!("1000000.5".parse::<Troops>(), Err(TroopsError::OutOfRange(_))));
        assert!(matches!("2147483647".parse::<Troops>(), Err(TroopsError::OutOfRange(_))));
    }

    #[test]
    fn floor_to_precision() {
        let t = Troops::from_halves(7);
        assert_eq!(t.floor_to(Precision::Whole), Troops::whole(3));
        assert_eq!(t.floor_to(Precision::Half), t);
    }

    #[test]
    fn saturating_sub_clamps_at_zero() {
        assert_eq!(Troops::whole(3).saturating_sub(Troops::whole(5)), Troops::ZERO);
        assert_eq!(Troops::whole(5).abs_diff(Troops::whole(3)), Troops::whole(2));
    }

    #[test]
    fn addition_never_wraps() {
        let top = Troops::from_halves(u32::MAX);
        assert_eq!(top + Troops::ONE, top);
        assert_eq!(top.checked_add(Troops::HALF), None);
        assert_eq!(Troops::ONE.checked_add(Troops::HALF), Some(Troops::from_halves(3)));
        let mut t = Troops::from_halves(u32::MAX - 1);
        t += Troops::ONE;
        assert_eq!(t, top);
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&Troops::from_halves(3)).unwrap();
        assert_eq!(json, "1.5");
        assert_eq!(serde_json::to_string(&Troops::whole(2)).unwrap(), "2");
        let back: Troops = serde_json::from_str("2").unwrap();
        assert_eq!(back, Troops::whole(2));
        assert!(serde_json::from_str::<Troops>("0.3").is_err());
    }
}
