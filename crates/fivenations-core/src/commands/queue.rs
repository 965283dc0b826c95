//! FIFO command queue with a thread-safe producer handle.

use std::collections::VecDeque;

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Command;

/// Pending commands in insertion order.
///
/// Producers on the simulation thread call [`CommandQueue::add`] directly.
/// Producers elsewhere hold a [`CommandSender`]; whatever they sent is
/// appended to the tail each time the queue is read, so every producer's own
/// order is kept and the dispatcher stays the only consumer.
#[derive(Debug)]
pub struct CommandQueue {
    pending: VecDeque<Command>,
    inbox: Receiver<Command>,
    outbox: Sender<Command>,
}

/// Cloneable, `Send` handle for adding commands from other threads.
#[derive(Debug, Clone)]
pub struct CommandSender {
    outbox: Sender<Command>,
}

impl CommandSender {
    pub fn send(&self, command: Command) {
        // The receiver lives as long as the queue; once it is gone there is nobody to deliver to.
        let _ = self.outbox.send(command);
    }
}

impl CommandQueue {
    pub fn new() -> Self {
        let (outbox, inbox) = unbounded();
        Self {
            pending: VecDeque::new(),
            inbox,
            outbox,
        }
    }

    pub fn sender(&self) -> CommandSender {
        CommandSender {
            outbox: self.outbox.clone(),
        }
    }

    /// Append to the tail.
    pub fn add(&mut self, command: Command) {
        self.collect_sent();
        self.pending.push_back(command);
    }

    pub fn extend(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.collect_sent();
        self.pending.extend(commands);
    }

    /// Pop the head, `None` once drained.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<Command> {
        self.collect_sent();
        self.pending.pop_front()
    }

    /// Drop every pending command, including ones sent but not yet collected.
    pub fn reset(&mut self) {
        self.pending.clear();
        while self.inbox.try_recv().is_ok() {}
    }

    pub fn len(&self) -> usize {
        self.pending.len() + self.inbox.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn collect_sent(&mut self) {
        self.pending.extend(self.inbox.try_iter());
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
