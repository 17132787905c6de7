//! Named one-shot timers
//!
//! Level intros and outros schedule a few delayed steps. Each purpose has
//! one id and setting an id again replaces the pending one, so two timers
//! for the same step can never both fire.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerId {
    /// Spawn the level's COLLECT and AVOID groups
    LevelIntroAddObstacles,
    /// Start fading the overlay text out
    TextFadeOut,
    /// Intro over, start the clock
    LevelIntroEnd,
    /// Outro over, move to the next level
    LevelOutroEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Pending {
    id: TimerId,
    due_ms: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timers {
    pending: Vec<Pending>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `id` to fire `delay_ms` after `now_ms`, replacing any pending one
    pub fn set(&mut self, id: TimerId, now_ms: f64, delay_ms: f64) {
        self.cancel(id);
        self.pending.push(Pending {
            id,
            due_ms: now_ms + delay_ms,
        });
    }

    pub fn cancel(&mut self, id: TimerId) {
        self.pending.retain(|p| p.id != id);
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return every timer due at `now_ms`, earliest first
    pub fn take_due(&mut self, now_ms: f64) -> Vec<TimerId> {
        let mut due: Vec<Pending> = Vec::new();
        self.pending.retain(|p| {
            if p.due_ms <= now_ms {
                due.push(*p);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));
        due.into_iter().map(|p| p.id).collect()
    }
}
