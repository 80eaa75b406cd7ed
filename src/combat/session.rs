//! Per-actor combat session
//!
//! A session exists while an actor is engaged. It names one target and
//! holds the actor's single pending follow-up turn. Only the scheduler
//! creates, mutates, or clears sessions.

use serde::Serialize;

use crate::timers::TimerHandle;
use crate::world::EntityId;

/// Where an actor is in the attack loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    Engaged { target_id: EntityId },
}

/// How `engage` changed the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Engagement {
    Started,
    Continued,
    Retargeted { previous: EntityId },
}

/// Combat state for a single attacking actor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombatSession {
    active_target_id: Option<EntityId>,
    pending_turn: Option<TimerHandle>,
}

impl CombatSession {
    /// Entity currently being attacked
    pub fn active_target(&self) -> Option<&str> {
        self.active_target_id.as_deref()
    }

    /// The follow-up turn waiting to fire, if any
    pub fn pending_turn(&self) -> Option<&TimerHandle> {
        self.pending_turn.as_ref()
    }

    pub(crate) fn engage(&mut self, target_id: &str) -> Engagement {
        let engagement = match self.active_target_id.take() {
            None => Engagement::Started,
            Some(current) if current == target_id => Engagement::Continued,
            Some(previous) => Engagement::Retargeted { previous },
        };
        self.active_target_id = Some(target_id.to_string());
        engagement
    }

    pub(crate) fn set_pending(&mut self, handle: TimerHandle) -> Option<TimerHandle> {
        self.pending_turn.replace(handle)
    }

    pub(crate) fn take_pending(&mut self) -> Option<TimerHandle> {
        self.pending_turn.take()
    }

    pub(crate) fn state(&self) -> SessionState {
        match &self.active_target_id {
            Some(target_id) => SessionState::Engaged {
                target_id: target_id.clone(),
            },
            None => SessionState::Idle,
        }
    }
}
