//! Dock: the row of launchable applications at the bottom of the desktop.

use crate::apps::{AppDescriptor, AppFactory};

#[derive(Clone)]
pub struct DockEntry {
    pub id: String,
    pub label: String,
    pub icon: String,
    pub factory: AppFactory,
}

impl DockEntry {
    pub fn from_descriptor(descriptor: &AppDescriptor) -> Self {
        Self {
            id: descriptor.id.to_string(),
            label: descriptor.label.to_string(),
            icon: descriptor.icon.to_string(),
            factory: descriptor.factory.clone(),
        }
    }
}

impl std::fmt::Debug for DockEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockEntry")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("icon", &self.icon)
            .finish_non_exhaustive()
    }
}

/// Outcome of [`Dock::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockInsert {
    Added,
    AlreadyPresent,
}

#[derive(Debug, Default, Clone)]
pub struct Dock {
    entries: Vec<DockEntry>,
}

impl Dock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry` unless an entry with the same id exists; in that case
    /// the dock is left untouched.
    pub fn add(&mut self, entry: DockEntry) -> DockInsert {
        if self.contains(&entry.id) {
            return DockInsert::AlreadyPresent;
        }
        tracing::debug!(app = %entry.id, "dock entry added");
        self.entries.push(entry);
        DockInsert::Added
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        let removed = self.entries.len() != before;
        if removed {
            tracing::debug!(app = %id, "dock entry removed");
        }
        removed
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&DockEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn entries(&self) -> &[DockEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::{builtin, ids};

    fn entry(id: &str) -> DockEntry {
        let descriptor = builtin(id).expect("builtin");
        DockEntry::from_descriptor(&descriptor)
    }

    #[test]
    fn duplicate_ids_are_reported_and_ignored() {
        let mut dock = Dock::new();
        assert_eq!(dock.add(entry(ids::NOTES)), DockInsert::Added);
        assert_eq!(dock.add(entry(ids::CALCULATOR)), DockInsert::Added);
        assert_eq!(dock.add(entry(ids::NOTES)), DockInsert::AlreadyPresent);
        assert_eq!(dock.len(), 2);
        assert_eq!(dock.entries()[0].id, ids::NOTES);
    }

    #[test]
    fn remove_reports_presence() {
        let mut dock = Dock::new();
        dock.add(entry(ids::NOTES));
        assert!(dock.remove(ids::NOTES));
        assert!(!dock.remove(ids::NOTES));
        assert!(dock.is_empty());
    }
}
