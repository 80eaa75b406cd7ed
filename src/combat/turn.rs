//! A single combat turn: attack roll, then damage if it lands

use serde::{Deserialize, Serialize};

use super::attack::resolve_attack;
use super::damage::resolve_damage;
use super::dice::{DiceExpression, DiceSource};

/// Outcome of one attack against one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TurnResult {
    /// Whether the attack hit
    pub success: bool,
    /// Whether it was a critical hit
    pub critical: bool,
    /// Whether the damage dropped the target to 0 HP or below
    pub killed: bool,
    /// Damage dealt (0 on a miss)
    pub damage: i32,
}

impl TurnResult {
    /// A missed (or fumbled) attack
    pub fn miss() -> Self {
        Self::default()
    }
}

/// Resolve one turn. No damage is rolled on a miss.
pub fn run_turn<D: DiceSource + ?Sized>(
    attack_modifier: i32,
    weapon: &DiceExpression,
    target_ac: i32,
    target_hp: i32,
    dice: &mut D,
) -> TurnResult {
    let attack = resolve_attack(attack_modifier, target_ac, dice);
    if !attack.hit {
        return TurnResult::miss();
    }

    let damage = resolve_damage(weapon, attack.critical, dice);
    TurnResult {
        success: true,
        critical: attack.critical,
        killed: target_hp.saturating_sub(damage.total) <= 0,
        damage: damage.total,
    }
}
