use std::collections::HashMap;

use crate::model::ObjectiveId;

/// One keyed slot of asynchronous AI work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKey {
    Feedback(ObjectiveId),
    Validation(ObjectiveId),
    Suggestion(ObjectiveId),
    Alignment,
    Improve,
    ContentAnalysis,
    Generation,
}

impl RequestKey {
    /// Per-objective requests are not re-issued while one is in flight.
    /// Collection-wide requests supersede the older one instead.
    pub fn dedupes_in_flight(&self) -> bool {
        matches!(
            self,
            RequestKey::Feedback(_) | RequestKey::Validation(_) | RequestKey::Suggestion(_)
        )
    }

    pub fn objective(&self) -> Option<ObjectiveId> {
        match self {
            RequestKey::Feedback(id) | RequestKey::Validation(id) | RequestKey::Suggestion(id) => {
                Some(*id)
            }
            _ => None,
        }
    }
}

/// Monotonic generation per slot, used to reject stale completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub key: RequestKey,
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct RequestRegistry {
    generations: HashMap<RequestKey, u64>,
    in_flight: HashMap<RequestKey, u64>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self, key: &RequestKey) -> bool {
        self.in_flight.contains_key(key)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Claims the slot. `None` when the key dedupes and is already busy.
    pub fn begin(&mut self, key: RequestKey) -> Option<Ticket> {
        if key.dedupes_in_flight() && self.is_in_flight(&key) {
            return None;
        }
        let generation = self.generations.entry(key).or_insert(0);
        *generation += 1;
        self.in_flight.insert(key, *generation);
        Some(Ticket {
            key,
            generation: *generation,
        })
    }

    /// Releases the slot. True when the ticket is still the current one.
    pub fn finish(&mut self, ticket: Ticket) -> bool {
        let current = self.generations.get(&ticket.key).copied() == Some(ticket.generation);
        if current {
            self.in_flight.remove(&ticket.key);
        }
        current
    }

    /// Makes every outstanding ticket for `key` stale.
    pub fn invalidate(&mut self, key: RequestKey) {
        if self.in_flight.remove(&key).is_some() {
            *self.generations.entry(key).or_insert(0) += 1;
        }
    }

    pub fn invalidate_objective(&mut self, id: ObjectiveId) {
        for key in [
            RequestKey::Feedback(id),
            RequestKey::Validation(id),
            RequestKey::Suggestion(id),
        ] {
            self.invalidate(key);
        }
    }
}
