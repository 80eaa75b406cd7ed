//! Common test utilities - a small scripted arena

use std::sync::Arc;
use std::time::Duration;

use mudcombat::combat::ScriptedDice;
use mudcombat::timers::TimerManager;
use mudcombat::world::World;
use mudcombat::Arena;

pub const HERO: &str = "/players/hero";
pub const BAT: &str = "/npcs/giant-bat";
pub const GOBLIN: &str = "/npcs/goblin";

pub const COOLDOWN: Duration = Duration::from_millis(1000);

/// The passage: a hero (+5, 1d4+1), a bat (AC 15, 12 HP) and a goblin
/// (AC 12, 2 HP). A rat waits in the next room.
pub const WORLD: &str = r#"
[[entity]]
id = "/players/hero"
name = "Hero"
room = "/rooms/passage"
attack_bonus = 5
weapon = "1d4+1"
armor_class = 14
hp = 30

[[entity]]
id = "/npcs/giant-bat"
name = "the giant bat"
keywords = ["bat"]
room = "/rooms/passage"
armor_class = 15
hp = 12

[[entity]]
id = "/npcs/goblin"
name = "the goblin"
keywords = ["goblin", "gob"]
room = "/rooms/passage"
attack_bonus = 2
weapon = "1d6"
armor_class = 12
hp = 2

[[entity]]
id = "/npcs/rat"
name = "the rat"
keywords = ["rat"]
room = "/rooms/sewer"
hp = 3
"#;

/// Start an arena on a manual clock with the given dice script
pub fn start(faces: &[u32]) -> Arena<ScriptedDice> {
    let world = World::from_toml(WORLD).expect("Failed to parse test world");
    Arena::new(
        world,
        Arc::new(TimerManager::manual(0)),
        COOLDOWN,
        ScriptedDice::new(faces.iter().copied()),
    )
}

/// Advance the clock one cooldown and fire whatever is due
pub fn next_round(arena: &mut Arena<ScriptedDice>) -> Vec<mudcombat::FollowUp> {
    arena.timers().advance(COOLDOWN);
    arena.tick()
}
