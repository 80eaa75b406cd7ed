//! Dice rolling system
//!
//! Parses and rolls dice notation like "2d6+3" or "1D20".
//!
//! Only the additive form is understood: there is no "4d6-2" subtraction
//! syntax. All whitespace is stripped before matching, so " 2 d 6 + 3 " is
//! the same expression as "2d6+3".

use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static DICE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([0-9]+)d([0-9]+)(?:\+([0-9]+))?$").unwrap());

/// Dice notation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("invalid dice expression: {0:?}")]
    InvalidExpression(String),
}

/// A source of die faces.
///
/// Every resolver draws through this trait so callers can swap the
/// process-wide generator for a fixed sequence.
pub trait DiceSource {
    /// Roll one die with `sides` faces, returning a value in `[1, sides]`
    fn roll_die(&mut self, sides: u32) -> u32;
}

impl<R: Rng> DiceSource for R {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.random_range(1..=sides)
    }
}

/// A parsed dice expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiceExpression {
    count: u32,
    sides: u32,
    modifier: i32,
}

impl DiceExpression {
    /// A single twenty-sided die, used for attack rolls
    pub const D20: DiceExpression = DiceExpression {
        count: 1,
        sides: 20,
        modifier: 0,
    };

    /// Bare fists
    pub const UNARMED: DiceExpression = DiceExpression {
        count: 1,
        sides: 2,
        modifier: 0,
    };

    /// Create a new dice expression, rejecting zero dice, zero-sided dice,
    /// and negative modifiers (the notation has no subtraction form)
    pub fn new(count: u32, sides: u32, modifier: i32) -> Result<Self, DiceError> {
        if count < 1 || sides < 1 || modifier < 0 {
            return Err(DiceError::InvalidExpression(format!(
                "{}d{}+{}",
                count, sides, modifier
            )));
        }
        Ok(Self {
            count,
            sides,
            modifier,
        })
    }

    /// Number of dice to roll
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Number of sides per die
    pub fn sides(&self) -> u32 {
        self.sides
    }

    /// Flat amount added after the dice are summed
    pub fn modifier(&self) -> i32 {
        self.modifier
    }

    /// Same expression with twice as many dice; the modifier is untouched
    pub fn with_doubled_dice(&self) -> Self {
        Self {
            count: self.count.saturating_mul(2),
            ..*self
        }
    }

    /// Roll the dice and return the total
    pub fn roll<D: DiceSource + ?Sized>(&self, dice: &mut D) -> i32 {
        roll(self, dice)
    }

    /// Get the minimum possible result
    pub fn min(&self) -> i64 {
        self.count as i64 + self.modifier as i64
    }

    /// Get the maximum possible result
    pub fn max(&self) -> i64 {
        self.count as i64 * self.sides as i64 + self.modifier as i64
    }

    /// Get the expected average (rounded down)
    pub fn average(&self) -> i64 {
        let avg_per_die = (1.0 + self.sides as f64) / 2.0;
        (self.count as f64 * avg_per_die + self.modifier as f64) as i64
    }
}

impl FromStr for DiceExpression {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl TryFrom<String> for DiceExpression {
    type Error = DiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse(&value)
    }
}

impl From<DiceExpression> for String {
    fn from(expr: DiceExpression) -> Self {
        expr.to_string()
    }
}

impl std::fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifier > 0 {
            write!(f, "{}d{}+{}", self.count, self.sides, self.modifier)
        } else {
            write!(f, "{}d{}", self.count, self.sides)
        }
    }
}

/// Parse a dice notation string like "2d6+3"
pub fn parse(notation: &str) -> Result<DiceExpression, DiceError> {
    let compact: String = notation.chars().filter(|c| !c.is_whitespace()).collect();
    let invalid = || DiceError::InvalidExpression(notation.to_string());

    let caps = DICE_REGEX.captures(&compact).ok_or_else(invalid)?;

    // Digits-only captures can still overflow the integer types
    let count: u32 = caps[1].parse().map_err(|_| invalid())?;
    let sides: u32 = caps[2].parse().map_err(|_| invalid())?;
    let modifier: i32 = match caps.get(3) {
        Some(m) => m.as_str().parse().map_err(|_| invalid())?,
        None => 0,
    };

    DiceExpression::new(count, sides, modifier).map_err(|_| invalid())
}

/// Roll every die in the expression and add the modifier
pub fn roll<D: DiceSource + ?Sized>(expr: &DiceExpression, dice: &mut D) -> i32 {
    let mut total: i32 = 0;
    for _ in 0..expr.count {
        let face = dice.roll_die(expr.sides);
        total = total.saturating_add(i32::try_from(face).unwrap_or(i32::MAX));
    }
    total.saturating_add(expr.modifier)
}

/// Parse then roll a textual term such as "1d20+4"
pub fn roll_text<D: DiceSource + ?Sized>(term: &str, dice: &mut D) -> Result<i32, DiceError> {
    let expr = parse(term)?;
    Ok(roll(&expr, dice))
}

/// Replays a fixed list of die faces, for deterministic combat.
///
/// Panics when the script runs dry or a face does not fit the die being
/// rolled, so a test that draws more than it expects fails loudly.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    faces: VecDeque<u32>,
    draws: usize,
}

impl ScriptedDice {
    /// Create a script that yields `faces` in order
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
            draws: 0,
        }
    }

    /// Queue more faces at the end of the script
    pub fn push(&mut self, faces: impl IntoIterator<Item = u32>) {
        self.faces.extend(faces);
    }

    /// How many dice have been drawn so far
    pub fn draws(&self) -> usize {
        self.draws
    }

    /// Faces not yet consumed
    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl DiceSource for ScriptedDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        let face = self
            .faces
            .pop_front()
            .unwrap_or_else(|| panic!("dice script exhausted after {} draws", self.draws));
        assert!(
            (1..=sides).contains(&face),
            "scripted face {} does not fit a d{}",
            face,
            sides
        );
        self.draws += 1;
        face
    }
}
