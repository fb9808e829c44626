//! Per-request `randomKey` values.
//!
//! The gateway expects an epoch-millisecond string. Two requests issued in
//! the same millisecond would otherwise share a key, so the sequence bumps
//! to `last + 1` whenever the clock has not moved past the previous value.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use iyzipay_crypto::{Clock, SystemClock};

/// Strictly increasing millisecond keys.
#[derive(Debug)]
pub struct RandomKeySequence {
    clock: Arc<dyn Clock>,
    last: AtomicI64,
}

impl Default for RandomKeySequence {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl RandomKeySequence {
    /// Sequence driven by `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: AtomicI64::new(0),
        }
    }

    /// Next key; never equal to or less than a previously returned one.
    pub fn next_key(&self) -> String {
        let now = self.clock.now_millis();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev.saturating_add(1));
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate.to_string(),
                Err(actual) => prev = actual,
            }
        }
    }
}
