//! Repeating timers for the shell and for hosted windows.
//!
//! Nothing runs on its own: the event loop calls [`Scheduler::due`] on every
//! idle tick and delivers the returned task ids. Every task has an owner so
//! the shell can sweep all timers of a window when it closes, and every
//! window-owned task is also held by a [`TaskGuard`] that cancels it when the
//! owning application is dropped.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use crate::window::WindowId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOwner {
    Shell,
    Window(WindowId),
}

#[derive(Debug)]
struct Task {
    owner: TaskOwner,
    interval: Duration,
    next_due: Instant,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    tasks: BTreeMap<TaskId, Task>,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    inner: Rc<RefCell<Inner>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a task that first fires `interval` after `now` and then keeps
    /// firing every `interval` until cancelled.
    pub fn repeat(&self, owner: TaskOwner, interval: Duration, now: Instant) -> TaskGuard {
        let interval = interval.max(Duration::from_millis(1));
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = TaskId(inner.next_id);
        inner.tasks.insert(
            id,
            Task {
                owner,
                interval,
                next_due: now + interval,
            },
        );
        tracing::trace!(task = ?id, ?owner, ?interval, "scheduled task");
        TaskGuard {
            id,
            scheduler: Rc::downgrade(&self.inner),
        }
    }

    pub fn cancel(&self, id: TaskId) -> bool {
        self.inner.borrow_mut().tasks.remove(&id).is_some()
    }

    /// Cancel every task owned by `owner`. Returns how many were removed.
    pub fn cancel_owner(&self, owner: TaskOwner) -> usize {
        let mut inner = self.inner.borrow_mut();
        let before = inner.tasks.len();
        inner.tasks.retain(|_, task| task.owner != owner);
        let removed = before - inner.tasks.len();
        if removed > 0 {
            tracing::debug!(?owner, removed, "cancelled owner tasks");
        }
        removed
    }

    pub fn is_active(&self, id: TaskId) -> bool {
        self.inner.borrow().tasks.contains_key(&id)
    }

    pub fn owner_of(&self, id: TaskId) -> Option<TaskOwner> {
        self.inner.borrow().tasks.get(&id).map(|task| task.owner)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count_for(&self, owner: TaskOwner) -> usize {
        self.inner
            .borrow()
            .tasks
            .values()
            .filter(|task| task.owner == owner)
            .count()
    }

    /// Collect the tasks whose deadline has passed and push their next
    /// deadline forward. A task that missed several periods fires once.
    pub fn due(&self, now: Instant) -> Vec<(TaskId, TaskOwner)> {
        let mut inner = self.inner.borrow_mut();
        let mut fired = Vec::new();
        for (id, task) in inner.tasks.iter_mut() {
            if task.next_due > now {
                continue;
            }
            fired.push((*id, task.owner));
            task.next_due += task.interval;
            if task.next_due <= now {
                task.next_due = now + task.interval;
            }
        }
        fired
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.inner
            .borrow()
            .tasks
            .values()
            .map(|task| task.next_due)
            .min()
    }
}

/// Cancels its task when dropped.
#[derive(Debug)]
pub struct TaskGuard {
    id: TaskId,
    scheduler: Weak<RefCell<Inner>>,
}

impl TaskGuard {
    pub fn id(&self) -> TaskId {
        self.id
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.scheduler.upgrade()
            && let Ok(mut inner) = inner.try_borrow_mut()
        {
            inner.tasks.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(100);

    #[test]
    fn fires_after_interval_and_repeats() {
        let s = Scheduler::new();
        let t0 = Instant::now();
        let guard = s.repeat(TaskOwner::Shell, TICK, t0);
        assert!(s.due(t0).is_empty());
        assert_eq!(s.due(t0 + TICK), vec![(guard.id(), TaskOwner::Shell)]);
        assert!(s.due(t0 + TICK).is_empty());
        assert_eq!(s.due(t0 + TICK * 2).len(), 1);
    }

    #[test]
    fn missed_periods_fire_once() {
        let s = Scheduler::new();
        let t0 = Instant::now();
        let _guard = s.repeat(TaskOwner::Shell, TICK, t0);
        assert_eq!(s.due(t0 + TICK * 10).len(), 1);
        assert!(s.due(t0 + TICK * 10).is_empty());
    }

    #[test]
    fn dropping_guard_cancels() {
        let s = Scheduler::new();
        let guard = s.repeat(TaskOwner::Shell, TICK, Instant::now());
        let id = guard.id();
        assert!(s.is_active(id));
        drop(guard);
        assert!(!s.is_active(id));
        assert!(s.is_empty());
    }

    #[test]
    fn cancel_owner_only_touches_that_owner() {
        let s = Scheduler::new();
        let now = Instant::now();
        let a = TaskOwner::Window(WindowId::new(1));
        let b = TaskOwner::Window(WindowId::new(2));
        let _g1 = s.repeat(a, TICK, now);
        let _g2 = s.repeat(a, TICK, now);
        let g3 = s.repeat(b, TICK, now);
        assert_eq!(s.cancel_owner(a), 2);
        assert_eq!(s.count_for(a), 0);
        assert!(s.is_active(g3.id()));
        // guards of already-swept tasks drop quietly
    }

    #[test]
    fn guard_outliving_scheduler_is_harmless() {
        let guard = {
            let s = Scheduler::new();
            s.repeat(TaskOwner::Shell, TICK, Instant::now())
        };
        drop(guard);
    }
}
