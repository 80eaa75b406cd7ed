//! Entity model used by combat
//!
//! The combat core only sees the world through [`EntityModel`]. [`World`] is
//! an in-memory, room-based implementation loaded from TOML, used by the
//! CLI and tests.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{ensure, Context};
use figment::providers::{Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::combat::DiceExpression;

/// Unique entity identifier (path-based, e.g., "/npcs/giant-bat")
pub type EntityId = String;

/// What an attacker brings to a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackerProfile {
    pub attack_modifier: i32,
    pub weapon: DiceExpression,
}

/// What a defender brings to a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefenderProfile {
    pub armor_class: i32,
    pub hit_points: i32,
}

/// Lookups and mutations the combat scheduler needs from the game world.
///
/// Implementations own HP bookkeeping and must keep `apply_damage` atomic
/// with respect to concurrent `defender` reads.
pub trait EntityModel {
    /// Attack bonus and weapon damage for an actor
    fn attacker(&self, id: &str) -> Option<AttackerProfile>;

    /// Armor class and current hit points for a target
    fn defender(&self, id: &str) -> Option<DefenderProfile>;

    /// Find a living entity by name or keyword near the actor
    fn find_in_vicinity(&self, actor_id: &str, keyword: &str) -> Option<EntityId>;

    /// Whether `target_id` is still next to `actor_id`
    fn is_in_vicinity(&self, actor_id: &str, target_id: &str) -> bool;

    /// Subtract HP from a target, returning what is left
    fn apply_damage(&mut self, target_id: &str, amount: i32) -> Option<i32>;

    /// Name shown to players
    fn display_name(&self, id: &str) -> Option<String>;

    /// Whether the entity exists and has HP left
    fn is_alive(&self, id: &str) -> bool {
        self.defender(id).is_some_and(|d| d.hit_points > 0)
    }
}

fn default_weapon() -> DiceExpression {
    DiceExpression::UNARMED
}

fn default_armor_class() -> i32 {
    10
}

/// A combatant standing in a room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    /// Extra words players can use to refer to this entity
    #[serde(default)]
    pub keywords: Vec<String>,
    pub room: String,
    #[serde(default)]
    pub attack_bonus: i32,
    #[serde(default = "default_weapon")]
    pub weapon: DiceExpression,
    #[serde(default = "default_armor_class")]
    pub armor_class: i32,
    pub hp: i32,
    #[serde(default)]
    pub max_hp: i32,
}

impl Entity {
    /// Create an entity with default stats
    pub fn new(id: &str, name: &str, room: &str, max_hp: i32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            keywords: Vec::new(),
            room: room.to_string(),
            attack_bonus: 0,
            weapon: default_weapon(),
            armor_class: default_armor_class(),
            hp: max_hp,
            max_hp,
        }
    }

    pub fn with_attack(mut self, attack_bonus: i32, weapon: DiceExpression) -> Self {
        self.attack_bonus = attack_bonus;
        self.weapon = weapon;
        self
    }

    pub fn with_armor_class(mut self, armor_class: i32) -> Self {
        self.armor_class = armor_class;
        self
    }

    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    /// Check if entity is dead
    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// Take damage, returning remaining HP
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        self.hp = self.hp.saturating_sub(amount.max(0));
        self.hp
    }

    /// Whether a player typing `keyword` means this entity
    pub fn answers_to(&self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return false;
        }
        self.name.eq_ignore_ascii_case(keyword)
            || self
                .name
                .split_whitespace()
                .any(|w| w.eq_ignore_ascii_case(keyword))
            || self.keywords.iter().any(|k| k.eq_ignore_ascii_case(keyword))
    }
}

/// World file layout: a list of `[[entity]]` tables
#[derive(Debug, Default, Deserialize)]
struct WorldFile {
    #[serde(default, rename = "entity")]
    entities: Vec<Entity>,
}

/// In-memory world keyed by entity ID
#[derive(Debug, Default)]
pub struct World {
    entities: BTreeMap<EntityId, Entity>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a world from a TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        ensure!(path.exists(), "world file {} not found", path.display());
        let file: WorldFile = Figment::from(Toml::file(path))
            .extract()
            .with_context(|| format!("failed to read world file {}", path.display()))?;
        Ok(Self::from_entities(file.entities))
    }

    /// Parse a world from TOML text
    pub fn from_toml(text: &str) -> Result<Self, figment::Error> {
        let file: WorldFile = Figment::from(Toml::string(text)).extract()?;
        Ok(Self::from_entities(file.entities))
    }

    fn from_entities(entities: Vec<Entity>) -> Self {
        let mut world = Self::new();
        for entity in entities {
            world.insert(entity);
        }
        world
    }

    /// Add or replace an entity
    pub fn insert(&mut self, mut entity: Entity) {
        if entity.max_hp < entity.hp {
            entity.max_hp = entity.hp;
        }
        self.entities.insert(entity.id.clone(), entity);
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Entity> {
        self.entities.remove(id)
    }

    /// Move an entity to another room
    pub fn move_to(&mut self, id: &str, room: &str) -> bool {
        match self.entities.get_mut(id) {
            Some(entity) => {
                entity.room = room.to_string();
                true
            }
            None => false,
        }
    }

    /// Entities in a room, in ID order
    pub fn entities_in_room<'a>(&'a self, room: &'a str) -> impl Iterator<Item = &'a Entity> + 'a {
        self.entities.values().filter(move |e| e.room == room)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl EntityModel for World {
    fn attacker(&self, id: &str) -> Option<AttackerProfile> {
        self.get(id).map(|e| AttackerProfile {
            attack_modifier: e.attack_bonus,
            weapon: e.weapon,
        })
    }

    fn defender(&self, id: &str) -> Option<DefenderProfile> {
        self.get(id).map(|e| DefenderProfile {
            armor_class: e.armor_class,
            hit_points: e.hp,
        })
    }

    fn find_in_vicinity(&self, actor_id: &str, keyword: &str) -> Option<EntityId> {
        let actor = self.get(actor_id)?;
        self.entities_in_room(&actor.room)
            .filter(|e| e.id != actor.id && !e.is_dead())
            .find(|e| e.answers_to(keyword))
            .map(|e| e.id.clone())
    }

    fn is_in_vicinity(&self, actor_id: &str, target_id: &str) -> bool {
        match (self.get(actor_id), self.get(target_id)) {
            (Some(actor), Some(target)) => actor.id != target.id && actor.room == target.room,
            _ => false,
        }
    }

    fn apply_damage(&mut self, target_id: &str, amount: i32) -> Option<i32> {
        self.entities
            .get_mut(target_id)
            .map(|e| e.take_damage(amount))
    }

    fn display_name(&self, id: &str) -> Option<String> {
        self.get(id).map(|e| e.name.clone())
    }
}
