//! Timer and delayed execution system
//!
//! Provides one-shot call-outs keyed by the object that owns them. The
//! combat scheduler uses these for follow-up attacks; whoever drives the
//! event loop calls [`TimerManager::tick`] and dispatches what fired.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Method name used for combat follow-up call-outs
pub const COMBAT_TURN: &str = "combat_turn";

/// Opaque handle to a scheduled timer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(pub String);

/// Something that can run a callback for an object after a delay.
pub trait TimerHost {
    /// Schedule `method` to fire for `object_id` after `delay`
    fn schedule(&self, delay: Duration, object_id: &str, method: &str) -> TimerHandle;

    /// Cancel a pending timer; false if it already fired or never existed
    fn cancel(&self, handle: &TimerHandle) -> bool;
}

impl<T: TimerHost + ?Sized> TimerHost for Arc<T> {
    fn schedule(&self, delay: Duration, object_id: &str, method: &str) -> TimerHandle {
        (**self).schedule(delay, object_id, method)
    }

    fn cancel(&self, handle: &TimerHandle) -> bool {
        (**self).cancel(handle)
    }
}

/// A one-shot timer that fires after a delay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timer {
    /// Unique timer ID
    pub id: String,
    /// Object that owns this timer
    pub object_id: String,
    /// Method to call when timer fires
    pub method: String,
    /// Timestamp (ms) when the timer was created
    pub created_at: i64,
    /// Timestamp (ms) when timer should fire
    pub fire_at: i64,
}

impl Timer {
    /// Create a new timer relative to `now`
    pub fn new(object_id: &str, method: &str, now: i64, delay_ms: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            object_id: object_id.to_string(),
            method: method.to_string(),
            created_at: now,
            fire_at: now.saturating_add(i64::try_from(delay_ms).unwrap_or(i64::MAX)),
        }
    }

    /// Check if timer is due to fire
    pub fn is_due(&self, now: i64) -> bool {
        now >= self.fire_at
    }

    /// Time remaining until fire (0 if already due)
    pub fn time_remaining_ms(&self, now: i64) -> u64 {
        if now >= self.fire_at {
            0
        } else {
            (self.fire_at - now) as u64
        }
    }
}

/// Result of firing a timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerFired {
    pub id: String,
    pub object_id: String,
    pub method: String,
}

/// Where the manager reads the current time from
#[derive(Debug)]
enum Clock {
    System,
    Manual(AtomicI64),
}

impl Clock {
    fn now_ms(&self) -> i64 {
        match self {
            Clock::System => chrono::Utc::now().timestamp_millis(),
            Clock::Manual(now) => now.load(Ordering::SeqCst),
        }
    }
}

/// In-memory timer manager
#[derive(Debug)]
pub struct TimerManager {
    timers: RwLock<HashMap<String, Timer>>,
    clock: Clock,
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerManager {
    /// Create a timer manager on the wall clock
    pub fn new() -> Self {
        Self {
            timers: RwLock::new(HashMap::new()),
            clock: Clock::System,
        }
    }

    /// Create a timer manager whose time only moves via [`advance`](Self::advance)
    pub fn manual(start_ms: i64) -> Self {
        Self {
            timers: RwLock::new(HashMap::new()),
            clock: Clock::Manual(AtomicI64::new(start_ms)),
        }
    }

    /// Create a shared instance
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Current time in milliseconds
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Move a manual clock forward. No effect on the wall clock.
    pub fn advance(&self, by: Duration) {
        if let Clock::Manual(now) = &self.clock {
            let by = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
            // fetch_update never fails when the closure always returns Some
            let _ = now.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.saturating_add(by))
            });
        }
    }

    /// Add a one-shot timer
    pub fn add_timer(&self, timer: Timer) -> String {
        let id = timer.id.clone();
        debug!(
            "Timer {} scheduled for {} ({}) at {}",
            id, timer.object_id, timer.method, timer.fire_at
        );
        self.timers.write().insert(id.clone(), timer);
        id
    }

    /// Remove a timer by ID
    pub fn remove_timer(&self, timer_id: &str) -> bool {
        self.timers.write().remove(timer_id).is_some()
    }

    /// Remove all timers for an object
    pub fn remove_timers_for_object(&self, object_id: &str) {
        self.timers.write().retain(|_, t| t.object_id != object_id);
    }

    /// Look up a pending timer
    pub fn get(&self, timer_id: &str) -> Option<Timer> {
        self.timers.read().get(timer_id).cloned()
    }

    /// Pending timers owned by an object
    pub fn timers_for_object(&self, object_id: &str) -> Vec<Timer> {
        self.timers
            .read()
            .values()
            .filter(|t| t.object_id == object_id)
            .cloned()
            .collect()
    }

    /// Remove and return every timer that is due, earliest first
    pub fn tick(&self) -> Vec<TimerFired> {
        let now = self.now_ms();
        let mut due: Vec<Timer> = {
            let mut timers = self.timers.write();
            let ids: Vec<String> = timers
                .values()
                .filter(|t| t.is_due(now))
                .map(|t| t.id.clone())
                .collect();
            ids.iter().filter_map(|id| timers.remove(id)).collect()
        };
        due.sort_by_key(|t| (t.fire_at, t.created_at));

        due.into_iter()
            .map(|timer| TimerFired {
                id: timer.id,
                object_id: timer.object_id,
                method: timer.method,
            })
            .collect()
    }

    /// Get count of active timers
    pub fn timer_count(&self) -> usize {
        self.timers.read().len()
    }
}

impl TimerHost for TimerManager {
    fn schedule(&self, delay: Duration, object_id: &str, method: &str) -> TimerHandle {
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        let timer = Timer::new(object_id, method, self.now_ms(), delay_ms);
        TimerHandle(self.add_timer(timer))
    }

    fn cancel(&self, handle: &TimerHandle) -> bool {
        self.remove_timer(&handle.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_creation() {
        let timer = Timer::new("obj1", "on_timer", 5_000, 1000);
        assert_eq!(timer.object_id, "obj1");
        assert_eq!(timer.method, "on_timer");
        assert_eq!(timer.fire_at, 6_000);
        assert!(!timer.is_due(5_999));
        assert!(timer.is_due(6_000));
        assert_eq!(timer.time_remaining_ms(5_500), 500);
        assert_eq!(timer.time_remaining_ms(7_000), 0);
    }

    #[test]
    fn test_timer_manager_add_remove() {
        let manager = TimerManager::new();

        let handle = manager.schedule(Duration::from_secs(10), "obj1", "test_method");
        assert_eq!(manager.timer_count(), 1);

        assert!(manager.cancel(&handle));
        assert!(!manager.cancel(&handle));
        assert_eq!(manager.timer_count(), 0);
    }

    #[test]
    fn test_tick_fires_due_timers() {
        let manager = TimerManager::manual(0);
        manager.schedule(Duration::from_millis(1000), "obj1", "on_fire");

        assert!(manager.tick().is_empty());

        manager.advance(Duration::from_millis(999));
        assert!(manager.tick().is_empty());

        manager.advance(Duration::from_millis(1));
        let fired = manager.tick();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].object_id, "obj1");
        assert_eq!(fired[0].method, "on_fire");

        // Timer should be removed after firing
        assert_eq!(manager.timer_count(), 0);
    }

    #[test]
    fn test_tick_orders_by_fire_time() {
        let manager = TimerManager::manual(0);
        manager.schedule(Duration::from_millis(300), "late", COMBAT_TURN);
        manager.schedule(Duration::from_millis(100), "early", COMBAT_TURN);

        manager.advance(Duration::from_secs(1));
        let fired: Vec<String> = manager.tick().into_iter().map(|f| f.object_id).collect();
        assert_eq!(fired, vec!["early", "late"]);
    }

    #[test]
    fn test_huge_delay_never_fires_early() {
        let manager = TimerManager::manual(0);
        let handle = manager.schedule(Duration::from_millis(u64::MAX), "obj1", COMBAT_TURN);
        assert_eq!(manager.get(&handle.0).unwrap().fire_at, i64::MAX);
        assert!(manager.tick().is_empty());

        manager.advance(Duration::from_secs(3600));
        assert!(manager.tick().is_empty());
        assert_eq!(manager.timer_count(), 1);

        let timer = Timer::new("obj2", "m", 10, u64::MAX);
        assert_eq!(timer.fire_at, i64::MAX);
        assert!(!timer.is_due(i64::MAX - 1));
    }

    #[test]
    fn test_advance_saturates() {
        let manager = TimerManager::manual(i64::MAX - 5);
        manager.advance(Duration::MAX);
        assert_eq!(manager.now_ms(), i64::MAX);
    }

    #[test]
    fn test_remove_timers_for_object() {
        let manager = TimerManager::new();

        manager.schedule(Duration::from_secs(10), "obj1", "m1");
        manager.schedule(Duration::from_secs(10), "obj1", "m2");
        manager.schedule(Duration::from_secs(10), "obj2", "m1");

        assert_eq!(manager.timer_count(), 3);
        assert_eq!(manager.timers_for_object("obj1").len(), 2);

        manager.remove_timers_for_object("obj1");
        assert_eq!(manager.timer_count(), 1); // Only obj2's timer remains
    }

    #[test]
    fn test_shared_manager_is_a_host() {
        let manager = TimerManager::shared();
        let handle = manager.schedule(Duration::from_secs(1), "obj1", COMBAT_TURN);
        assert!(manager.get(&handle.0).is_some());
    }
}
