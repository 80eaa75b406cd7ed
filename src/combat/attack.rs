//! Attack resolution
//!
//! A d20 plus the attacker's bonus against the defender's armor class.
//! A natural 1 always misses and a natural 20 always hits, whatever the
//! arithmetic says.

use serde::{Deserialize, Serialize};

use super::dice::{DiceExpression, DiceSource};

/// Natural roll that always hits and doubles damage dice
pub const CRITICAL_ROLL: i32 = 20;

/// Natural roll that always misses
pub const FUMBLE_ROLL: i32 = 1;

/// Result of an attack roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOutcome {
    /// The natural d20 roll
    pub raw_die: i32,
    /// Total attack value (roll + bonus)
    pub total: i32,
    /// Whether the attack hit
    pub hit: bool,
    /// Whether it was a critical hit
    pub critical: bool,
    /// Whether it was a fumble
    pub fumble: bool,
}

impl AttackOutcome {
    /// Classify a natural roll against a target's armor class
    pub fn from_roll(raw_die: i32, attack_modifier: i32, target_ac: i32) -> Self {
        let total = raw_die.saturating_add(attack_modifier);

        if raw_die == FUMBLE_ROLL {
            return Self {
                raw_die,
                total,
                hit: false,
                critical: false,
                fumble: true,
            };
        }

        if raw_die == CRITICAL_ROLL {
            return Self {
                raw_die,
                total,
                hit: true,
                critical: true,
                fumble: false,
            };
        }

        Self {
            raw_die,
            total,
            hit: total >= target_ac,
            critical: false,
            fumble: false,
        }
    }
}

/// Roll a d20 attack
pub fn resolve_attack<D: DiceSource + ?Sized>(
    attack_modifier: i32,
    target_ac: i32,
    dice: &mut D,
) -> AttackOutcome {
    let raw_die = DiceExpression::D20.roll(dice);
    AttackOutcome::from_roll(raw_die, attack_modifier, target_ac)
}
