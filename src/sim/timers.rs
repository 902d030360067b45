//! Deferred one-shot actions
//!
//! Delayed transitions (boss arrival after the warning, next wave after a
//! clear) are queued here and fired from inside the tick. Nothing runs while
//! the tick is not being called, so pausing freezes every pending action.

use serde::{Deserialize, Serialize};

/// Handle for cancelling a scheduled action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Pending<A> {
    id: TimerId,
    remaining: f32,
    action: A,
}

/// Queue of pending one-shot actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timers<A> {
    pending: Vec<Pending<A>>,
    next_id: u32,
}

impl<A> Default for Timers<A> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 1,
        }
    }
}

impl<A> Timers<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `action` to fire after `delay` seconds
    pub fn schedule(&mut self, delay: f32, action: A) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.pending.push(Pending {
            id,
            remaining: delay.max(0.0),
            action,
        });
        id
    }

    /// Drop a pending action. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Count down and return due actions in scheduling order
    pub fn advance(&mut self, dt: f32) -> Vec<A> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            self.pending[i].remaining -= dt;
            if self.pending[i].remaining <= 0.0 {
                due.push(self.pending.remove(i).action);
            } else {
                i += 1;
            }
        }
        due
    }

    /// Seconds until `id` fires
    pub fn remaining(&self, id: TimerId) -> Option<f32> {
        self.pending.iter().find(|p| p.id == id).map(|p| p.remaining)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
