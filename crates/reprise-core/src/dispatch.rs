//! # Task queue
//!
//! Reprise is single threaded: everything that touches composition state runs
//! on the UI thread. Asynchronous work completes by posting a task back to
//! this queue, which the host drains between frames (see
//! [`Scheduler::pump`](crate::Scheduler::pump)).
//!
//! ```rust
//! use reprise_core::*;
//! use web_time::Duration;
//!
//! let hits = signal(0);
//! post({
//!     let hits = hits.clone();
//!     move || hits.update(|n| *n += 1)
//! });
//! post_delayed(Duration::from_secs(60), || unreachable!());
//!
//! assert_eq!(run_ready(), 1);
//! assert_eq!(hits.get(), 1);
//! assert!(next_deadline().is_some());
//! ```

use std::cell::RefCell;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};

use web_time::{Duration, Instant};

use crate::clock;

type Task = Box<dyn FnOnce()>;

struct Timer {
    due: Instant,
    seq: u64,
    task: Task,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}
impl Eq for Timer {}
impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .cmp(&other.due)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

#[derive(Default)]
struct TaskQueue {
    ready: VecDeque<Task>,
    timers: BinaryHeap<Reverse<Timer>>,
    seq: u64,
}

thread_local! {
    static QUEUE: RefCell<TaskQueue> = RefCell::new(TaskQueue::default());
}

/// Runs `task` on the next tick.
pub fn post(task: impl FnOnce() + 'static) {
    QUEUE.with(|q| q.borrow_mut().ready.push_back(Box::new(task)));
}

/// Runs `task` once `delay` has elapsed on the installed clock.
pub fn post_delayed(delay: Duration, task: impl FnOnce() + 'static) {
    if delay.is_zero() {
        return post(task);
    }
    let due = clock::now() + delay;
    QUEUE.with(|q| {
        let mut q = q.borrow_mut();
        q.seq += 1;
        let seq = q.seq;
        q.timers.push(Reverse(Timer {
            due,
            seq,
            task: Box::new(task),
        }));
    });
}

/// Moves due timers to the ready list, then runs everything that is ready,
/// including tasks posted by the tasks themselves. Returns how many ran.
pub fn run_ready() -> usize {
    let now = clock::now();
    QUEUE.with(|q| {
        let mut q = q.borrow_mut();
        while q.timers.peek().is_some_and(|Reverse(t)| t.due <= now) {
            if let Some(Reverse(t)) = q.timers.pop() {
                q.ready.push_back(t.task);
            }
        }
    });

    let mut ran = 0;
    loop {
        // Never hold the queue borrow while a task runs: tasks post.
        let next = QUEUE.with(|q| q.borrow_mut().ready.pop_front());
        let Some(task) = next else { break };
        task();
        ran += 1;
    }
    ran
}

/// Earliest pending timer, if any. Hosts sleep until then when idle.
pub fn next_deadline() -> Option<Instant> {
    QUEUE.with(|q| q.borrow().timers.peek().map(|Reverse(t)| t.due))
}

pub fn has_pending() -> bool {
    QUEUE.with(|q| {
        let q = q.borrow();
        !q.ready.is_empty() || !q.timers.is_empty()
    })
}
