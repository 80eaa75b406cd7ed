//! Attack scheduling
//!
//! Drives repeated attacks for each actor:
//! - `begin_attack` engages (or retargets) and runs a turn immediately
//! - every turn that leaves the target alive queues one follow-up after
//!   the cooldown
//! - `fire` runs that follow-up, or quietly drops the session if the
//!   target has gone
//!
//! Each actor has at most one pending follow-up at any time.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use super::presentation::{describe_turn, TARGET_REQUIRED};
use super::session::{CombatSession, Engagement, SessionState};
use super::turn::{run_turn, TurnResult};
use super::DiceSource;
use crate::messaging::Notifier;
use crate::timers::{TimerHandle, TimerHost, COMBAT_TURN};
use crate::world::{EntityId, EntityModel};

/// Default delay between an actor's consecutive attacks
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(1);

/// Combat scheduling errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("no target to attack")]
    MissingTarget,

    #[error("target {0} can no longer be attacked")]
    TargetUnresolvable(EntityId),

    #[error("actor {0} cannot attack")]
    UnknownActor(EntityId),
}

/// Attack scheduler for every actor in a world
#[derive(Debug)]
pub struct AttackScheduler<H: TimerHost> {
    sessions: HashMap<EntityId, CombatSession>,
    timers: H,
    cooldown: Duration,
}

impl<H: TimerHost> AttackScheduler<H> {
    /// Create a scheduler that queues follow-ups on `timers`
    pub fn new(timers: H, cooldown: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            timers,
            cooldown,
        }
    }

    /// Delay between consecutive attacks
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Current state of an actor
    pub fn state(&self, actor_id: &str) -> SessionState {
        self.sessions
            .get(actor_id)
            .map(CombatSession::state)
            .unwrap_or(SessionState::Idle)
    }

    /// Session for an actor, if engaged
    pub fn session(&self, actor_id: &str) -> Option<&CombatSession> {
        self.sessions.get(actor_id)
    }

    /// Whether an actor has a follow-up turn queued
    pub fn has_pending(&self, actor_id: &str) -> bool {
        self.sessions
            .get(actor_id)
            .is_some_and(|s| s.pending_turn().is_some())
    }

    /// Number of follow-up turns queued across all actors
    pub fn pending_count(&self) -> usize {
        self.sessions
            .values()
            .filter(|s| s.pending_turn().is_some())
            .count()
    }

    /// Start (or redirect) an attack and resolve the first turn now.
    ///
    /// With no target the actor drops out of combat and is told to pick one.
    pub fn begin_attack<W, N, D>(
        &mut self,
        world: &mut W,
        notifier: &N,
        dice: &mut D,
        source_id: &str,
        target_id: Option<&str>,
    ) -> Result<TurnResult, CombatError>
    where
        W: EntityModel + ?Sized,
        N: Notifier + ?Sized,
        D: DiceSource + ?Sized,
    {
        let Some(target_id) = target_id else {
            self.disengage(source_id);
            notifier.notify(source_id, TARGET_REQUIRED);
            return Err(CombatError::MissingTarget);
        };

        let session = self.sessions.entry(source_id.to_string()).or_default();
        match session.engage(target_id) {
            Engagement::Started => info!("{} engages {}", source_id, target_id),
            Engagement::Retargeted { previous } => {
                info!("{} switches from {} to {}", source_id, previous, target_id)
            }
            Engagement::Continued => debug!("{} presses on {}", source_id, target_id),
        }

        self.strike(world, notifier, dice, source_id)
    }

    /// Run a follow-up turn that has come due.
    ///
    /// Returns `Ok(None)` when the handle is stale or the actor is idle, and
    /// `TargetUnresolvable` (after clearing the session) when the target has
    /// left, died, or the actor itself can no longer fight.
    pub fn fire<W, N, D>(
        &mut self,
        world: &mut W,
        notifier: &N,
        dice: &mut D,
        actor_id: &str,
        handle: &TimerHandle,
    ) -> Result<Option<TurnResult>, CombatError>
    where
        W: EntityModel + ?Sized,
        N: Notifier + ?Sized,
        D: DiceSource + ?Sized,
    {
        let Some(session) = self.sessions.get_mut(actor_id) else {
            debug!("Dropping follow-up for idle actor {}", actor_id);
            return Ok(None);
        };
        if session.pending_turn() != Some(handle) {
            debug!("Dropping stale follow-up {} for {}", handle.0, actor_id);
            return Ok(None);
        }
        if let Some(handle) = session.take_pending() {
            self.timers.cancel(&handle);
        }

        self.strike(world, notifier, dice, actor_id).map(Some)
    }

    /// Leave combat, cancelling any queued follow-up
    pub fn disengage(&mut self, actor_id: &str) -> bool {
        let Some(mut session) = self.sessions.remove(actor_id) else {
            return false;
        };
        if let Some(handle) = session.take_pending() {
            self.timers.cancel(&handle);
        }
        debug!("{} leaves combat", actor_id);
        true
    }

    /// Resolve one turn against the session's current target
    fn strike<W, N, D>(
        &mut self,
        world: &mut W,
        notifier: &N,
        dice: &mut D,
        source_id: &str,
    ) -> Result<TurnResult, CombatError>
    where
        W: EntityModel + ?Sized,
        N: Notifier + ?Sized,
        D: DiceSource + ?Sized,
    {
        let Some(target_id) = self
            .sessions
            .get(source_id)
            .and_then(|s| s.active_target())
            .map(str::to_string)
        else {
            return Err(CombatError::MissingTarget);
        };

        let Some(attacker) = world.attacker(source_id).filter(|_| world.is_alive(source_id))
        else {
            self.disengage(source_id);
            return Err(CombatError::UnknownActor(source_id.to_string()));
        };

        let defender = world
            .defender(&target_id)
            .filter(|d| d.hit_points > 0 && world.is_in_vicinity(source_id, &target_id));
        let Some(defender) = defender else {
            debug!("{} lost track of {}", source_id, target_id);
            self.disengage(source_id);
            return Err(CombatError::TargetUnresolvable(target_id));
        };

        let result = run_turn(
            attacker.attack_modifier,
            &attacker.weapon,
            defender.armor_class,
            defender.hit_points,
            dice,
        );
        if result.success {
            world.apply_damage(&target_id, result.damage);
        }

        let target_name = world
            .display_name(&target_id)
            .unwrap_or_else(|| target_id.clone());
        notifier.notify(source_id, &describe_turn(&result, &target_name));

        if result.killed {
            info!("{} killed {}", source_id, target_id);
            self.disengage(source_id);
            // The dead don't swing back
            self.disengage(&target_id);
        } else {
            self.requeue(source_id);
        }

        Ok(result)
    }

    /// Queue the actor's next turn, replacing any that is already waiting
    fn requeue(&mut self, actor_id: &str) {
        let Some(session) = self.sessions.get_mut(actor_id) else {
            return;
        };
        let handle = self.timers.schedule(self.cooldown, actor_id, COMBAT_TURN);
        if let Some(previous) = session.set_pending(handle) {
            self.timers.cancel(&previous);
        }
    }
}
