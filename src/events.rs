//! Death and attack-impact notifications.
//!
//! Explicit observer registration with subscribe/unsubscribe handles; there
//! is no global event bus. Subscribers are responsible for unsubscribing on
//! their own teardown so a destroyed listener is never notified.

use crate::components::AgentId;

/// Notifications the simulation emits toward a presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    /// An agent's hit points reached zero. Fired exactly once per agent.
    Death { agent: AgentId },
    /// An attacker's strike landed; its damage has been applied.
    AttackImpact { attacker: AgentId },
}

/// Handle returned by [`Observers::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&SimEvent)>;

/// Observer registry: a flat list of callbacks invoked in subscription order.
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback)>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback; the returned id unsubscribes it later.
    pub fn subscribe(&mut self, callback: impl FnMut(&SimEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscription. Returns false when the id is unknown
    /// (already unsubscribed or cleared).
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    /// Notify every subscriber, in subscription order.
    pub fn emit(&mut self, event: &SimEvent) {
        for (_, callback) in &mut self.subscribers {
            callback(event);
        }
    }

    /// Drop all subscriptions.
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn subscribers_receive_emitted_events() {
        let mut observers = Observers::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        observers.subscribe(move |event| sink.borrow_mut().push(*event));

        observers.emit(&SimEvent::Death { agent: AgentId(3) });
        observers.emit(&SimEvent::AttackImpact {
            attacker: AgentId(1),
        });

        assert_eq!(
            *seen.borrow(),
            vec![
                SimEvent::Death { agent: AgentId(3) },
                SimEvent::AttackImpact {
                    attacker: AgentId(1)
                }
            ]
        );
    }

    #[test]
    fn unsubscribed_callbacks_are_not_notified() {
        let mut observers = Observers::new();
        let count = Rc::new(RefCell::new(0));

        let sink = Rc::clone(&count);
        let id = observers.subscribe(move |_| *sink.borrow_mut() += 1);

        observers.emit(&SimEvent::Death { agent: AgentId(0) });
        assert!(observers.unsubscribe(id));
        observers.emit(&SimEvent::Death { agent: AgentId(0) });

        assert_eq!(*count.borrow(), 1);
        assert!(!observers.unsubscribe(id), "double unsubscribe");
    }

    #[test]
    fn clear_drops_every_subscription() {
        let mut observers = Observers::new();
        observers.subscribe(|_| {});
        observers.subscribe(|_| {});
        assert_eq!(observers.len(), 2);
        observers.clear();
        assert!(observers.is_empty());
    }
}
