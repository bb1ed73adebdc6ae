use std::collections::BTreeMap;

use crate::events::EventId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Stopped,
    Started,
}

#[derive(Debug, Clone, Copy, Default)]
struct Entry {
    state: LifecycleState,
    updated: bool,
}

/// Started/stopped state of every event the loop has touched.
///
/// Each tick the loop calls [`EventLifecycle::touch`] for every event it
/// renders, then [`EventLifecycle::finish_tick`], which stops the started
/// events that were not touched.
#[derive(Debug, Default)]
pub struct EventLifecycle {
    entries: BTreeMap<EventId, Entry>,
}

impl EventLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `id` as updated this tick. Returns `true` when the event just
    /// moved to `Started` and needs its start notification.
    pub fn touch(&mut self, id: &EventId) -> bool {
        let entry = self.entries.entry(id.clone()).or_default();
        entry.updated = true;
        if entry.state == LifecycleState::Started {
            return false;
        }
        entry.state = LifecycleState::Started;
        true
    }

    /// Ends the tick and returns the events that must be notified of their
    /// stop.
    pub fn finish_tick(&mut self) -> Vec<EventId> {
        let mut stopped = Vec::new();
        for (id, entry) in &mut self.entries {
            if entry.state == LifecycleState::Started && !entry.updated {
                entry.state = LifecycleState::Stopped;
                stopped.push(id.clone());
            }
            entry.updated = false;
        }
        self.entries
            .retain(|_, entry| entry.state == LifecycleState::Started);
        stopped
    }

    pub fn state(&self, id: &EventId) -> LifecycleState {
        self.entries
            .get(id)
            .map(|entry| entry.state)
            .unwrap_or_default()
    }

    /// Stops everything, e.g. on shutdown.
    pub fn stop_all(&mut self) -> Vec<EventId> {
        let stopped = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.state == LifecycleState::Started)
            .map(|(id, _)| id.clone())
            .collect();
        self.entries.clear();
        stopped
    }

    pub fn forget(&mut self, id: &EventId) {
        self.entries.remove(id);
    }
}
