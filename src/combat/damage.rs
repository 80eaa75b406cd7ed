//! Damage resolution
//!
//! Critical hits roll twice the weapon's dice. The flat modifier is added
//! once, never doubled.

use serde::{Deserialize, Serialize};

use super::dice::{DiceExpression, DiceSource};

/// Result of a damage roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageOutcome {
    /// Damage dealt
    pub total: i32,
    /// Whether the dice were doubled
    pub critical: bool,
    /// The expression that was actually rolled
    pub expression_used: DiceExpression,
}

/// Roll weapon damage, doubling the dice on a critical
pub fn resolve_damage<D: DiceSource + ?Sized>(
    expr: &DiceExpression,
    critical: bool,
    dice: &mut D,
) -> DamageOutcome {
    let effective = if critical {
        expr.with_doubled_dice()
    } else {
        *expr
    };

    DamageOutcome {
        total: effective.roll(dice),
        critical,
        expression_used: effective,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::dice::{parse, ScriptedDice};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_normal_damage() {
        let expr = parse("1d8+3").unwrap();
        let mut dice = ScriptedDice::new([5]);
        let result = resolve_damage(&expr, false, &mut dice);
        assert_eq!(result.total, 8);
        assert!(!result.critical);
        assert_eq!(result.expression_used, expr);
        assert_eq!(dice.draws(), 1);
    }

    #[test]
    fn test_critical_doubles_dice_not_modifier() {
        let expr = parse("2d6+2").unwrap();
        let mut dice = ScriptedDice::new([1, 2, 3, 4]);
        let result = resolve_damage(&expr, true, &mut dice);

        assert_eq!(result.expression_used.to_string(), "4d6+2");
        assert_eq!(result.total, 12); // 1 + 2 + 3 + 4 + 2
        assert!(result.critical);
        assert_eq!(dice.draws(), 4);
    }

    #[test]
    fn test_critical_range() {
        let expr = parse("2d6+2").unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let result = resolve_damage(&expr, true, &mut rng);
            assert!(
                (6..=26).contains(&result.total),
                "critical damage {} outside [6, 26]",
                result.total
            );
        }
    }
}
