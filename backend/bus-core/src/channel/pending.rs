use models::{Command, CommandName};

use std::collections::{HashSet, VecDeque};

/// Bounded FIFO of commands sent while disconnected.
#[derive(Debug)]
pub(crate) struct PendingQueue {
    items: VecDeque<Command>,
    capacity: usize,
}

impl PendingQueue {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append `command`, returning the oldest entry if it had to be evicted.
    pub(crate) fn push(&mut self, command: Command) -> Option<Command> {
        let evicted = if self.items.len() >= self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(command);
        evicted
    }

    /// Put `sync` ahead of the backlog, in order.
    ///
    /// Queued entries sharing a name with a sync command carry an older value of the same
    /// setting and are removed. If the result exceeds capacity the oldest backlog entries
    /// go first. Returns how many backlog entries were dropped.
    pub(crate) fn put_ahead(&mut self, sync: Vec<Command>) -> usize {
        let before = self.items.len();
        let names: HashSet<CommandName> = sync.iter().map(Command::name).collect();
        self.items.retain(|queued| !names.contains(&queued.name()));

        let sync_len = sync.len();
        for command in sync.into_iter().rev() {
            self.items.push_front(command);
        }
        while self.items.len() > self.capacity && self.items.len() > sync_len {
            self.items.remove(sync_len);
        }

        (before + sync_len).saturating_sub(self.items.len())
    }

    /// Remove every entry, returning how many were discarded.
    pub(crate) fn clear(&mut self) -> usize {
        let discarded = self.items.len();
        self.items.clear();
        discarded
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = Command> + '_ {
        self.items.drain(..)
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }
}
