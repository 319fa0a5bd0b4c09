use foldhash::{HashSet, HashSetExt};

use crate::HandlerId;

/// The handlers registered with one event channel, in subscription order.
///
/// Besides the ordered entries, the registry tracks the set of live IDs (for the ID
/// allocator) and the set of one-shot IDs that are to be removed once they have fired.
///
/// Invariants:
/// * `live_ids` contains exactly the IDs of `entries`.
/// * `one_shot_ids` is a subset of `live_ids`.
#[derive(Debug)]
pub(crate) struct HandlerRegistry<H> {
    entries: Vec<Entry<H>>,
    live_ids: HashSet<HandlerId>,
    one_shot_ids: HashSet<HandlerId>,
}

#[derive(Debug)]
struct Entry<H> {
    id: HandlerId,
    handler: H,
}

impl<H> HandlerRegistry<H> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            live_ids: HashSet::new(),
            one_shot_ids: HashSet::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn contains(&self, id: HandlerId) -> bool {
        self.live_ids.contains(&id)
    }

    /// Appends a handler under an ID that is not yet in use.
    pub(crate) fn insert(&mut self, id: HandlerId, handler: H, one_shot: bool) {
        let newly_inserted = self.live_ids.insert(id);
        assert!(newly_inserted, "handler ID {id} is already in use");

        self.entries.push(Entry { id, handler });

        if one_shot {
            self.one_shot_ids.insert(id);
        }
    }

    /// Removes the handler with the given ID. Returns `false` if there was no such handler.
    pub(crate) fn remove(&mut self, id: HandlerId) -> bool {
        if !self.live_ids.remove(&id) {
            return false;
        }

        self.one_shot_ids.remove(&id);
        self.entries.retain(|entry| entry.id != id);

        true
    }

    /// Calls `invoke` for every handler in subscription order, then removes the one-shot
    /// handlers that were invoked.
    ///
    /// If `invoke` panics, the handlers after the panicking one are skipped. The one-shot
    /// handlers invoked up to and including the panicking one are still removed before the
    /// panic continues to unwind.
    pub(crate) fn dispatch(&mut self, mut invoke: impl FnMut(&mut H)) {
        let mut pass = scopeguard::guard((self, 0_usize), |(registry, invoked_count)| {
            registry.remove_fired_one_shots(invoked_count);
        });

        let (registry, invoked_count) = &mut *pass;

        for (index, entry) in registry.entries.iter_mut().enumerate() {
            // Counted before the call, so a panicking handler counts as fired.
            *invoked_count = index.saturating_add(1);
            invoke(&mut entry.handler);
        }
    }

    /// Removes the one-shot handlers among the first `invoked_count` entries.
    fn remove_fired_one_shots(&mut self, invoked_count: usize) {
        if self.one_shot_ids.is_empty() {
            return;
        }

        let fired: HashSet<HandlerId> = self
            .entries
            .iter()
            .take(invoked_count)
            .map(|entry| entry.id)
            .filter(|id| self.one_shot_ids.contains(id))
            .collect();

        if fired.is_empty() {
            return;
        }

        self.entries.retain(|entry| !fired.contains(&entry.id));

        for id in &fired {
            self.live_ids.remove(id);
            self.one_shot_ids.remove(id);
        }
    }

    #[cfg(test)]
    fn ids(&self) -> Vec<HandlerId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    #[cfg(test)]
    fn one_shot_count(&self) -> usize {
        self.one_shot_ids.len()
    }
}
