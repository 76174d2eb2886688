//! Priority-aware, frame-paced render scheduling.
//!
//! Render requests are queued in a min-heap and executed at most one per
//! display tick. Bursts of same-priority requests coalesce: only the first
//! queued task of a priority class runs per scheduling pass, later
//! duplicates of that pass are dropped, not merged.

use crate::render::heap::MinHeap;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Priority classes: urgent sorts before normal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RenderPriority {
    /// User-initiated forced redraw
    Urgent = 0,
    /// Ordinary tile-arrival redraw
    Normal = 1,
}

/// Something that can delay execution until the next display refresh
pub trait FrameClock: Send + Sync {
    fn wait_for_frame(&self);
}

/// Frame pacing against a fixed refresh interval
pub struct IntervalClock {
    interval: Duration,
    last_tick: Mutex<Instant>,
}

impl IntervalClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_tick: Mutex::new(Instant::now()),
        }
    }

    /// 60 Hz pacing
    pub fn sixty_hz() -> Self {
        Self::new(Duration::from_nanos(16_666_667))
    }
}

impl FrameClock for IntervalClock {
    fn wait_for_frame(&self) {
        if let Ok(mut last) = self.last_tick.lock() {
            let next = *last + self.interval;
            let now = Instant::now();
            if next > now {
                std::thread::sleep(next - now);
            }
            *last = Instant::now();
        }
    }
}

/// Clock that fires immediately; for tests and headless use
pub struct ImmediateClock;

impl FrameClock for ImmediateClock {
    fn wait_for_frame(&self) {}
}

struct RenderTask {
    priority: RenderPriority,
    sequence: u64,
    render_fn: Box<dyn FnOnce() + Send>,
}

impl PartialEq for RenderTask {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl Eq for RenderTask {}

impl PartialOrd for RenderTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RenderTask {
    fn cmp(&self, other: &Self) -> Ordering {
        // Urgent first, then earlier submission
        match self.priority.cmp(&other.priority) {
            Ordering::Equal => self.sequence.cmp(&other.sequence),
            other => other,
        }
    }
}

/// Coalescing render queue with a single-slot serial execution gate.
///
/// At most one render runs at a time; a `next` call issued while another
/// render is in flight waits for it before pacing its own frame.
pub struct RenderScheduler {
    queue: Mutex<MinHeap<RenderTask>>,
    sequence: AtomicU64,
    in_flight: Mutex<bool>,
    idle: Condvar,
    clock: Box<dyn FrameClock>,
}

impl RenderScheduler {
    pub fn new(clock: Box<dyn FrameClock>) -> Self {
        Self {
            queue: Mutex::new(MinHeap::new()),
            sequence: AtomicU64::new(0),
            in_flight: Mutex::new(false),
            idle: Condvar::new(),
            clock,
        }
    }

    /// Scheduler paced at the display's 60 Hz refresh cadence
    pub fn with_display_pacing() -> Self {
        Self::new(Box::new(IntervalClock::sixty_hz()))
    }

    /// Queue a render request
    pub fn push(&self, render_fn: impl FnOnce() + Send + 'static, urgent: bool) {
        let priority = if urgent {
            RenderPriority::Urgent
        } else {
            RenderPriority::Normal
        };
        let task = RenderTask {
            priority,
            sequence: self.sequence.fetch_add(1, AtomicOrdering::Relaxed),
            render_fn: Box::new(render_fn),
        };
        if let Ok(mut queue) = self.queue.lock() {
            queue.push(task);
        }
    }

    /// Execute one scheduling pass.
    ///
    /// Pops the highest-priority task, drops every queued task of the same
    /// priority class (the coalescing rule: first survivor wins), waits for
    /// the serial gate and the next frame tick, then runs the task to
    /// completion. Returns false when the queue was empty.
    pub fn next(&self) -> bool {
        let task = {
            let Ok(mut queue) = self.queue.lock() else {
                return false;
            };
            let Some(task) = queue.pop() else {
                return false;
            };
            while queue
                .peek()
                .map(|next| next.priority == task.priority)
                .unwrap_or(false)
            {
                // Same pass, same class: dropped without executing
                queue.pop();
            }
            task
        };

        if !self.enter_gate() {
            return false;
        }
        self.clock.wait_for_frame();
        (task.render_fn)();
        self.leave_gate();
        true
    }

    /// Drop every pending task without executing any of them
    pub fn clear(&self) -> usize {
        if let Ok(mut queue) = self.queue.lock() {
            queue.drain().len()
        } else {
            0
        }
    }

    /// Block until no render is in flight
    pub fn wait_idle(&self) {
        if let Ok(mut busy) = self.in_flight.lock() {
            while *busy {
                busy = match self.idle.wait(busy) {
                    Ok(guard) => guard,
                    Err(_) => return,
                };
            }
        }
    }

    pub fn len(&self) -> usize {
        self.queue.lock().map(|queue| queue.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn enter_gate(&self) -> bool {
        let Ok(mut busy) = self.in_flight.lock() else {
            return false;
        };
        while *busy {
            busy = match self.idle.wait(busy) {
                Ok(guard) => guard,
                Err(_) => return false,
            };
        }
        *busy = true;
        true
    }

    fn leave_gate(&self) {
        if let Ok(mut busy) = self.in_flight.lock() {
            *busy = false;
        }
        self.idle.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn scheduler() -> RenderScheduler {
        RenderScheduler::new(Box::new(ImmediateClock))
    }

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        (count, move || {
            inner.fetch_add(1, AtomicOrdering::SeqCst);
        })
    }

    #[test]
    fn test_coalescing_runs_first_of_class_only() {
        let scheduler = scheduler();
        let (first, first_fn) = counter();
        let (second, second_fn) = counter();
        let (third, third_fn) = counter();

        scheduler.push(first_fn, false);
        scheduler.push(second_fn, false);
        scheduler.push(third_fn, false);

        assert!(scheduler.next());
        assert_eq!(first.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(second.load(AtomicOrdering::SeqCst), 0);
        assert_eq!(third.load(AtomicOrdering::SeqCst), 0);
        assert!(scheduler.is_empty());
        assert!(!scheduler.next());
    }

    #[test]
    fn test_urgent_preempts_normal() {
        let scheduler = scheduler();
        let order = Arc::new(Mutex::new(Vec::new()));

        let log = order.clone();
        scheduler.push(move || log.lock().unwrap().push("normal"), false);
        let log = order.clone();
        scheduler.push(move || log.lock().unwrap().push("urgent"), true);

        assert!(scheduler.next());
        assert!(scheduler.next());
        assert_eq!(*order.lock().unwrap(), vec!["urgent", "normal"]);
    }

    #[test]
    fn test_coalescing_is_per_class() {
        let scheduler = scheduler();
        let (urgent, urgent_fn) = counter();
        let (normal_a, normal_a_fn) = counter();
        let (normal_b, normal_b_fn) = counter();

        scheduler.push(normal_a_fn, false);
        scheduler.push(normal_b_fn, false);
        scheduler.push(urgent_fn, true);

        // First pass runs the urgent task; normals stay queued
        assert!(scheduler.next());
        assert_eq!(urgent.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(scheduler.len(), 2);

        // Second pass runs the first normal, drops the second
        assert!(scheduler.next());
        assert_eq!(normal_a.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(normal_b.load(AtomicOrdering::SeqCst), 0);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_clear_drops_without_executing() {
        let scheduler = scheduler();
        let (count, count_fn) = counter();
        scheduler.push(count_fn, false);
        scheduler.push(|| {}, true);

        assert_eq!(scheduler.clear(), 2);
        assert!(!scheduler.next());
        assert_eq!(count.load(AtomicOrdering::SeqCst), 0);
        scheduler.wait_idle();
    }

    #[test]
    fn test_renders_never_overlap() {
        let scheduler = Arc::new(RenderScheduler::new(Box::new(ImmediateClock)));
        let active = Arc::new(AtomicUsize::new(0));
        let overlaps = Arc::new(AtomicUsize::new(0));

        for _ in 0..4 {
            let active_job = active.clone();
            let overlaps_job = overlaps.clone();
            scheduler.push(
                move || {
                    if active_job.fetch_add(1, AtomicOrdering::SeqCst) > 0 {
                        overlaps_job.fetch_add(1, AtomicOrdering::SeqCst);
                    }
                    std::thread::sleep(Duration::from_millis(20));
                    active_job.fetch_sub(1, AtomicOrdering::SeqCst);
                },
                false,
            );
            let active = active.clone();
            let overlaps = overlaps.clone();
            scheduler.push(
                move || {
                    if active.fetch_add(1, AtomicOrdering::SeqCst) > 0 {
                        overlaps.fetch_add(1, AtomicOrdering::SeqCst);
                    }
                    std::thread::sleep(Duration::from_millis(20));
                    active.fetch_sub(1, AtomicOrdering::SeqCst);
                },
                true,
            );
        }

        let mut handles = Vec::new();
        for _ in 0..3 {
            let scheduler = scheduler.clone();
            handles.push(std::thread::spawn(move || while scheduler.next() {}));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(overlaps.load(AtomicOrdering::SeqCst), 0);
        scheduler.wait_idle();
    }

    #[test]
    fn test_interval_clock_paces() {
        let clock = IntervalClock::new(Duration::from_millis(10));
        let start = Instant::now();
        clock.wait_for_frame();
        clock.wait_for_frame();
        // Two ticks cannot complete faster than one full interval
        assert!(start.elapsed() >= Duration::from_millis(10));
    }
}
