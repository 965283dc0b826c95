//! Local notifier - announces executed command ids to in-process subscribers.

use std::collections::HashMap;

/// Handle returned by [`LocalNotifier::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&str)>;

/// Publish/subscribe keyed by event id.
///
/// The dispatcher fires one event per successfully executed command, named
/// after the command id. Subscribers only get the id; anything else they
/// need they read from the simulation state the handler changed.
#[derive(Default)]
pub struct LocalNotifier {
    subscribers: HashMap<String, Vec<(SubscriptionId, Callback)>>,
    next_id: u64,
}

impl LocalNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        event_id: impl Into<String>,
        callback: impl FnMut(&str) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers
            .entry(event_id.into())
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        let mut removed = false;
        for callbacks in self.subscribers.values_mut() {
            let before = callbacks.len();
            callbacks.retain(|(id, _)| *id != subscription);
            removed |= callbacks.len() != before;
        }
        self.subscribers.retain(|_, callbacks| !callbacks.is_empty());
        removed
    }

    /// Call every subscriber of `event_id` in subscription order.
    pub fn dispatch(&mut self, event_id: &str) {
        if let Some(callbacks) = self.subscribers.get_mut(event_id) {
            for (_, callback) in callbacks.iter_mut() {
                callback(event_id);
            }
        }
    }

    pub fn subscriber_count(&self, event_id: &str) -> usize {
        self.subscribers.get(event_id).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for LocalNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut counts: Vec<(&str, usize)> = self
            .subscribers
            .iter()
            .map(|(event, callbacks)| (event.as_str(), callbacks.len()))
            .collect();
        counts.sort();
        f.debug_struct("LocalNotifier").field("subscribers", &counts).finish()
    }
}
