//! Arena - one world with its combat loop
//!
//! Routes player commands into the attack scheduler and dispatches
//! follow-up turns when their timers come due.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::combat::{AttackScheduler, CombatError, DiceSource, TurnResult};
use crate::commands::{Command, CommandError};
use crate::messaging::{GameMessage, MessageQueue};
use crate::timers::{TimerHandle, TimerManager, COMBAT_TURN};
use crate::world::{EntityId, EntityModel, World};
use crate::Config;

/// A follow-up turn that ran during a tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowUp {
    pub actor_id: EntityId,
    pub result: TurnResult,
}

/// A world, its combat scheduler, and everything they talk to
pub struct Arena<D: DiceSource = StdRng> {
    world: World,
    scheduler: AttackScheduler<Arc<TimerManager>>,
    timers: Arc<TimerManager>,
    messages: Arc<MessageQueue>,
    dice: D,
}

impl Arena<StdRng> {
    /// Build an arena from configuration, seeding the dice if asked
    pub fn from_config(world: World, config: &Config) -> Self {
        let dice = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(world, TimerManager::shared(), config.cooldown(), dice)
    }
}

impl<D: DiceSource> Arena<D> {
    /// Assemble an arena from its parts
    pub fn new(world: World, timers: Arc<TimerManager>, cooldown: Duration, dice: D) -> Self {
        Self {
            world,
            scheduler: AttackScheduler::new(timers.clone(), cooldown),
            timers,
            messages: MessageQueue::shared(),
            dice,
        }
    }

    /// Run a player command on behalf of `actor_id`
    pub fn command(&mut self, actor_id: &str, line: &str) -> Result<TurnResult, CommandError> {
        match Command::parse(line)? {
            Command::Attack { target } => {
                let target_id = target
                    .as_deref()
                    .and_then(|keyword| self.world.find_in_vicinity(actor_id, keyword));
                let result = self.scheduler.begin_attack(
                    &mut self.world,
                    self.messages.as_ref(),
                    &mut self.dice,
                    actor_id,
                    target_id.as_deref(),
                )?;
                Ok(result)
            }
        }
    }

    /// Fire every due timer and return the turns that ran
    pub fn tick(&mut self) -> Vec<FollowUp> {
        let mut turns = Vec::new();

        for fired in self.timers.tick() {
            if fired.method != COMBAT_TURN {
                warn!("Ignoring timer {} with unknown method {}", fired.id, fired.method);
                continue;
            }

            let handle = TimerHandle(fired.id);
            match self.scheduler.fire(
                &mut self.world,
                self.messages.as_ref(),
                &mut self.dice,
                &fired.object_id,
                &handle,
            ) {
                Ok(Some(result)) => turns.push(FollowUp {
                    actor_id: fired.object_id,
                    result,
                }),
                Ok(None) => {}
                Err(CombatError::TargetUnresolvable(target_id)) => {
                    debug!("{} stops attacking {}", fired.object_id, target_id);
                }
                Err(e) => warn!("Follow-up for {} failed: {}", fired.object_id, e),
            }
        }

        turns
    }

    /// Whether any actor still has a turn queued
    pub fn is_quiet(&self) -> bool {
        self.scheduler.pending_count() == 0
    }

    /// Drain messages waiting for delivery
    pub fn drain_messages(&self) -> Vec<GameMessage> {
        self.messages.drain()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn scheduler(&self) -> &AttackScheduler<Arc<TimerManager>> {
        &self.scheduler
    }

    pub fn timers(&self) -> &Arc<TimerManager> {
        &self.timers
    }

    pub fn messages(&self) -> &Arc<MessageQueue> {
        &self.messages
    }

    pub fn dice_mut(&mut self) -> &mut D {
        &mut self.dice
    }
}
