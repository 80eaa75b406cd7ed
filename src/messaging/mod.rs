//! Messaging system
//!
//! Collects player-facing messages produced during combat for later
//! delivery by whatever owns the connections.

use std::sync::Arc;

use parking_lot::Mutex;

/// Receives text addressed to a single player
pub trait Notifier {
    fn notify(&self, target_id: &str, message: &str);
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(&self, target_id: &str, message: &str) {
        (**self).notify(target_id, message)
    }
}

/// A message waiting to be delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMessage {
    pub target_id: String,
    pub message: String,
}

/// Queue of undelivered messages
#[derive(Debug, Default)]
pub struct MessageQueue {
    messages: Mutex<Vec<GameMessage>>,
}

impl MessageQueue {
    /// Create a new message queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in Arc for sharing
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Queue a message for a specific player
    pub fn send(&self, target_id: &str, message: &str) {
        self.messages.lock().push(GameMessage {
            target_id: target_id.to_string(),
            message: message.to_string(),
        });
    }

    /// Drain all messages from the queue
    pub fn drain(&self) -> Vec<GameMessage> {
        std::mem::take(&mut *self.messages.lock())
    }

    /// Messages queued for one player, without draining
    pub fn pending_for(&self, target_id: &str) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter(|m| m.target_id == target_id)
            .map(|m| m.message.clone())
            .collect()
    }

    /// Get count of pending messages
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl Notifier for MessageQueue {
    fn notify(&self, target_id: &str, message: &str) {
        self.send(target_id, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_queue() {
        let queue = MessageQueue::shared();

        queue.send("player_1", "Hello!");
        queue.notify("player_2", "You miss the rat.");

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pending_for("player_2"), vec!["You miss the rat."]);

        let messages = queue.drain();
        assert_eq!(
            messages[0],
            GameMessage {
                target_id: "player_1".to_string(),
                message: "Hello!".to_string(),
            }
        );
        assert_eq!(messages[1].target_id, "player_2");

        assert!(queue.is_empty());
    }
}
