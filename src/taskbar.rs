//! Taskbar registry: the ordered set of windows that get a taskbar control.
//!
//! The registry only stores ids. Labels are derived from the live windows on
//! every projection, so an id whose window has gone away simply produces no
//! entry.

use crate::window::{Window, WindowId};

/// One rendered taskbar control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskbarEntry {
    pub id: WindowId,
    pub label: String,
    pub minimized: bool,
}

#[derive(Debug, Default, Clone)]
pub struct Taskbar {
    order: Vec<WindowId>,
}

impl Taskbar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `id` unless it is already tracked. Returns `true` on insert.
    pub fn register(&mut self, id: WindowId) -> bool {
        if self.order.contains(&id) {
            return false;
        }
        self.order.push(id);
        true
    }

    /// Drop `id`. Returns `false` when it was not tracked.
    pub fn unregister(&mut self, id: WindowId) -> bool {
        let before = self.order.len();
        self.order.retain(|tracked| *tracked != id);
        self.order.len() != before
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.order.contains(&id)
    }

    pub fn ids(&self) -> &[WindowId] {
        &self.order
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    /// Project the registry onto the live windows, in registration order.
    pub fn entries<'a, F>(&self, lookup: F) -> Vec<TaskbarEntry>
    where
        F: Fn(WindowId) -> Option<&'a Window>,
    {
        self.order
            .iter()
            .filter_map(|id| lookup(*id))
            .filter(|window| !window.is_closed())
            .map(|window| TaskbarEntry {
                id: window.id(),
                label: window.taskbar_label(),
                minimized: window.is_minimized(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::window::Point;

    fn windows(titles: &[&str]) -> BTreeMap<WindowId, Window> {
        titles
            .iter()
            .enumerate()
            .map(|(i, title)| {
                let id = WindowId::new(i as u64 + 1);
                (id, Window::create(id, *title, "", Point::default()))
            })
            .collect()
    }

    #[test]
    fn register_is_idempotent_and_ordered() {
        let mut bar = Taskbar::new();
        let a = WindowId::new(1);
        let b = WindowId::new(2);
        assert!(bar.register(b));
        assert!(bar.register(a));
        assert!(!bar.register(b));
        assert_eq!(bar.ids(), &[b, a]);
    }

    #[test]
    fn unregister_missing_is_noop() {
        let mut bar = Taskbar::new();
        assert!(!bar.unregister(WindowId::new(9)));
        bar.register(WindowId::new(1));
        assert!(bar.unregister(WindowId::new(1)));
        assert!(bar.is_empty());
    }

    #[test]
    fn entries_skip_dangling_ids_and_mark_minimized() {
        let mut live = windows(&["Notes", "Calculator"]);
        let mut bar = Taskbar::new();
        bar.register(WindowId::new(2));
        bar.register(WindowId::new(1));
        bar.register(WindowId::new(7));
        if let Some(w) = live.get_mut(&WindowId::new(1)) {
            w.minimize();
        }
        let labels: Vec<String> = bar
            .entries(|id| live.get(&id))
            .into_iter()
            .map(|e| e.label)
            .collect();
        assert_eq!(labels, vec!["Calculator", "Notes (minimized)"]);
    }
}
