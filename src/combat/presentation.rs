//! Player-facing combat text

use super::turn::TurnResult;

/// Sent when `attack` names nobody nearby
pub const TARGET_REQUIRED: &str = "Attack whom?";

/// Describe a turn from the attacker's point of view
pub fn describe_turn(result: &TurnResult, target_name: &str) -> String {
    if !result.success {
        return format!("You miss {}.", target_name);
    }

    let mut text = if result.critical {
        format!(
            "You land a critical hit on {} for {} damage!",
            target_name, result.damage
        )
    } else {
        format!("You hit {} for {} damage.", target_name, result.damage)
    };

    if result.killed {
        text.push_str(&format!(" You have slain {}!", target_name));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_turn() {
        assert_eq!(describe_turn(&TurnResult::miss(), "the bat"), "You miss the bat.");

        let hit = TurnResult {
            success: true,
            critical: false,
            killed: false,
            damage: 4,
        };
        assert_eq!(describe_turn(&hit, "the bat"), "You hit the bat for 4 damage.");

        let crit_kill = TurnResult {
            success: true,
            critical: true,
            killed: true,
            damage: 12,
        };
        let text = describe_turn(&crit_kill, "the bat");
        assert!(text.starts_with("You land a critical hit on the bat for 12 damage!"));
        assert!(text.ends_with("You have slain the bat!"));
    }
}
