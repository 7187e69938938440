//! Topic-based event bus implementation.

use serde::Serialize;
use tokio::sync::broadcast;

use super::types::{BattleEvent, LobbyEvent, OutcomeEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize)]
pub enum Topic {
    /// Round-level battle events
    Battle,
    /// Battle start and end, with rewards
    Outcome,
    /// Invites
    Lobby,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Event {
    Battle(BattleEvent),
    Outcome(OutcomeEvent),
    Lobby(LobbyEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Battle(_) => Topic::Battle,
            Event::Outcome(_) => Topic::Outcome,
            Event::Lobby(_) => Topic::Lobby,
        }
    }
}

/// Topic-based event bus
///
/// Each topic has its own broadcast channel, so consumers only receive the
/// events they subscribed to. Publishing never blocks; slow subscribers lag.
#[derive(Clone)]
pub struct EventBus {
    battle: broadcast::Sender<Event>,
    outcome: broadcast::Sender<Event>,
    lobby: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a bus with `capacity` buffered events per topic.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            battle: broadcast::channel(capacity).0,
            outcome: broadcast::channel(capacity).0,
            lobby: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Battle => &self.battle,
            Topic::Outcome => &self.outcome,
            Topic::Lobby => &self.lobby,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "battle::events", ?topic, "no subscribers");
        }
    }

    pub fn publish_all(&self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.publish(event);
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::PlayerId;

    #[tokio::test]
    async fn subscribers_only_see_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut lobby = bus.subscribe(Topic::Lobby);
        let mut outcome = bus.subscribe(Topic::Outcome);

        let invite = Event::Lobby(LobbyEvent::InviteSent {
            from: PlayerId(1),
            to: PlayerId(2),
        });
        bus.publish(invite.clone());

        assert_eq!(lobby.recv().await.expect("lobby event"), invite);
        assert!(outcome.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_silent() {
        let bus = EventBus::new();
        bus.publish(Event::Lobby(LobbyEvent::InviteCancelled {
            from: PlayerId(1),
            to: PlayerId(2),
        }));
    }
}
