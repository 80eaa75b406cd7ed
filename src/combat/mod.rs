//! Combat system module
//!
//! Implements D&D-style melee combat with:
//! - Dice rolling (e.g., "2d6+3")
//! - Attack resolution with natural 1 / natural 20 overrides
//! - Damage with critical dice doubling
//! - Per-actor attack scheduling with retargeting and cancellation

mod attack;
mod damage;
pub mod dice;
mod presentation;
mod scheduler;
mod session;
mod turn;

pub use attack::{resolve_attack, AttackOutcome, CRITICAL_ROLL, FUMBLE_ROLL};
pub use damage::{resolve_damage, DamageOutcome};
pub use dice::{parse, roll, roll_text, DiceError, DiceExpression, DiceSource, ScriptedDice};
pub use presentation::{describe_turn, TARGET_REQUIRED};
pub use scheduler::{AttackScheduler, CombatError, DEFAULT_COOLDOWN};
pub use session::{CombatSession, SessionState};
pub use turn::{run_turn, TurnResult};
