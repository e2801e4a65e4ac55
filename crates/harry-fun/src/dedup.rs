//! Suppression of duplicate command deliveries.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::bounded::BoundedMap;
use crate::traits::Clock;

/// Default window in which a repeated invocation id is a duplicate.
pub const DEDUP_WINDOW: Duration = Duration::from_secs(5);

/// Remembers recent command invocation ids.
pub struct InteractionDedup {
    window: Duration,
    clock: Arc<dyn Clock>,
    seen: Mutex<BoundedMap<u64, Duration>>,
}

impl std::fmt::Debug for InteractionDedup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionDedup")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

impl InteractionDedup {
    /// Creates a dedup filter with the given window.
    pub fn new(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            window,
            clock,
            seen: Mutex::new(BoundedMap::default()),
        }
    }

    /// Returns `true` the first time `id` is seen within the window and
    /// records it; returns `false` for a duplicate.
    pub fn check_and_record(&self, id: u64) -> bool {
        let now = self.clock.now();
        let mut seen = self.seen.lock();
        if let Some(&at) = seen.get(&id) {
            if now.saturating_sub(at) < self.window {
                debug!("Ignoring duplicate interaction {}", id);
                return false;
            }
        }
        seen.insert(id, now);
        true
    }

    /// Number of remembered ids.
    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    /// Whether nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }
}
