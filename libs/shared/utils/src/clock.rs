use std::sync::{Arc, RwLock};

use chrono::{Duration, Local, NaiveDateTime};

/// Source of "now" for scheduling code.
///
/// All scheduling runs on clinic wall-clock time, so the clock hands out a
/// `NaiveDateTime`. Nothing below the service layer reads the system time;
/// services take the timestamp from here and pass it down explicitly.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at a given instant; can be moved forward by hand.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<RwLock<NaiveDateTime>>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now: Arc::new(RwLock::new(now)) }
    }

    pub fn set(&self, now: NaiveDateTime) {
        match self.now.write() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }

    pub fn advance(&self, by: Duration) {
        let next = self.now() + by;
        self.set(next);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        match self.now.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
