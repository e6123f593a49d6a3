use std::cell::Cell;
use std::time::{Duration, Instant};

/// Monotonic time source sampled on every animation tick.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock advanced by hand; for deterministic drivers and tests.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            origin: Instant::now(),
            offset: Cell::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }
}

/// Handle given to the timer driving one animation run. Ticks carrying a
/// handle from an earlier run are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickHandle {
    generation: u64,
}

impl TickHandle {
    pub(crate) fn new(generation: u64) -> Self {
        TickHandle { generation }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A fixed-duration linear animation sampled at most once per poll interval.
#[derive(Debug, Clone)]
pub struct AnimationTask {
    handle: TickHandle,
    started_at: Instant,
    duration: Duration,
    poll_interval: Duration,
    last_sample: Option<Instant>,
    progress: f64,
    cancelled: bool,
}

impl AnimationTask {
    pub fn start(handle: TickHandle, now: Instant, duration: Duration, poll_interval: Duration) -> Self {
        AnimationTask {
            handle,
            started_at: now,
            duration,
            poll_interval,
            last_sample: None,
            progress: 0.0,
            cancelled: false,
        }
    }

    pub fn handle(&self) -> TickHandle {
        self.handle
    }

    /// Recompute progress from elapsed time. Samples closer than the poll
    /// interval to the previous one keep the previous value. A cancelled task
    /// never reports progress again.
    pub fn sample(&mut self, now: Instant) -> Option<f64> {
        if self.cancelled {
            return None;
        }
        let due = match self.last_sample {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.poll_interval,
        };
        if due {
            self.last_sample = Some(now);
            let elapsed = now.saturating_duration_since(self.started_at);
            self.progress = if self.duration.is_zero() {
                1.0
            } else {
                (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
            };
        }
        Some(self.progress)
    }

    /// When the next sample would be taken.
    pub fn next_due(&self) -> Option<Instant> {
        if self.cancelled || self.is_finished() {
            return None;
        }
        Some(match self.last_sample {
            Some(last) => last + self.poll_interval,
            None => self.started_at,
        })
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_finished(&self) -> bool {
        self.progress >= 1.0
    }
}
