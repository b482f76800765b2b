//! Scene-owned timers multiplexed onto the frame clock
//!
//! Each scene owns one [`Scheduler`]. Timers never outlive it: exiting the
//! scene calls [`Scheduler::cancel_all`], and dropping it drops every timer.
//!
//! Firing is pull-based so handlers can reconfigure the scheduler between
//! firings:
//!
//! ```
//! use shoot_your_shot::sim::Scheduler;
//!
//! let mut timers = Scheduler::new();
//! let spawn = timers.add_loop("spawn", 400);
//! timers.advance(1000.0);
//! let mut fired = 0;
//! while let Some(kind) = timers.poll() {
//!     assert_eq!(kind, "spawn");
//!     fired += 1;
//! }
//! assert_eq!(fired, 2);
//! timers.cancel(spawn);
//! ```

/// Handle to a registered timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u32);

#[derive(Debug, Clone)]
struct Timer<K> {
    id: TimerId,
    kind: K,
    /// Loop period; `None` for one-shot timers
    period_ms: Option<u32>,
    due_ms: f64,
}

#[derive(Debug, Clone)]
pub struct Scheduler<K> {
    timers: Vec<Timer<K>>,
    /// Scheduler clock (ms since creation)
    now_ms: f64,
    /// Poll horizon set by the last `advance`
    horizon_ms: f64,
    next_id: u32,
}

impl<K: Copy> Default for Scheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy> Scheduler<K> {
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            now_ms: 0.0,
            horizon_ms: 0.0,
            next_id: 1,
        }
    }

    fn register(&mut self, kind: K, first_in_ms: u32, period_ms: Option<u32>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            kind,
            period_ms,
            due_ms: self.now_ms + first_in_ms as f64,
        });
        id
    }

    /// Fire `kind` every `period_ms` (first firing one period from now)
    pub fn add_loop(&mut self, kind: K, period_ms: u32) -> TimerId {
        self.register(kind, period_ms.max(1), Some(period_ms.max(1)))
    }

    /// Fire `kind` once after `delay_ms`
    pub fn add_once(&mut self, kind: K, delay_ms: u32) -> TimerId {
        self.register(kind, delay_ms, None)
    }

    /// Cancel one timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Period of a loop timer
    pub fn period(&self, id: TimerId) -> Option<u32> {
        self.timers.iter().find(|t| t.id == id).and_then(|t| t.period_ms)
    }

    /// Milliseconds elapsed on the scheduler clock
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Move the poll horizon forward by `dt_ms`
    pub fn advance(&mut self, dt_ms: f64) {
        self.horizon_ms += dt_ms.max(0.0);
    }

    /// Pop the earliest timer due at or before the horizon.
    ///
    /// Ties go to the timer registered first. Loop timers are rescheduled one
    /// period after their due time, one-shots are removed. When nothing more
    /// is due the clock catches up with the horizon.
    pub fn poll(&mut self) -> Option<K> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= self.horizon_ms)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.id.0.cmp(&b.id.0)))
            .map(|(i, _)| i);

        let Some(idx) = idx else {
            self.now_ms = self.horizon_ms;
            return None;
        };

        let timer = &mut self.timers[idx];
        let kind = timer.kind;
        self.now_ms = timer.due_ms;
        match timer.period_ms {
            Some(period) => timer.due_ms += period as f64,
            None => {
                self.timers.remove(idx);
            }
        }
        Some(kind)
    }
}
