//! Launcher: the dock plus the store catalog, resolving app ids to factories.

use crate::apps::{self, AppFactory};
use crate::catalog::{Catalog, InstallOutcome, StoreError};
use crate::dock::{Dock, DockEntry, DockInsert};

/// Everything needed to open a window for an app.
#[derive(Clone)]
pub struct LaunchSpec {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub factory: AppFactory,
}

#[derive(Debug, Default, Clone)]
pub struct Launcher {
    dock: Dock,
    catalog: Catalog,
}

impl Launcher {
    pub fn new(dock: Dock, catalog: Catalog) -> Self {
        Self { dock, catalog }
    }

    /// Dock populated with the preinstalled applications and the stock
    /// catalog.
    pub fn with_defaults() -> Self {
        let mut dock = Dock::new();
        for id in apps::PREINSTALLED {
            if let Some(descriptor) = apps::builtin(id) {
                dock.add(DockEntry::from_descriptor(&descriptor));
            }
        }
        Self::new(dock, Catalog::builtin())
    }

    pub fn dock(&self) -> &Dock {
        &self.dock
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn add_dock_entry(&mut self, entry: DockEntry) -> DockInsert {
        self.dock.add(entry)
    }

    pub fn remove_dock_entry(&mut self, id: &str) -> bool {
        self.dock.remove(id)
    }

    /// Install a catalog app and pin it to the dock. Re-installing leaves the
    /// dock alone.
    pub fn install(&mut self, id: &str) -> Result<InstallOutcome, StoreError> {
        let outcome = self.catalog.install(id)?;
        if outcome == InstallOutcome::Installed
            && let Some(descriptor) = self.catalog.get(id)
        {
            self.dock.add(DockEntry::from_descriptor(descriptor));
        }
        tracing::info!(app = %id, ?outcome, "install");
        Ok(outcome)
    }

    /// Resolve an id: dock entries first, then installed catalog apps, then
    /// the builtin table.
    pub fn resolve(&self, id: &str) -> Option<LaunchSpec> {
        if let Some(entry) = self.dock.get(id) {
            return Some(LaunchSpec {
                id: entry.id.clone(),
                title: entry.label.clone(),
                icon: entry.icon.clone(),
                factory: entry.factory.clone(),
            });
        }
        let descriptor = match self.catalog.get(id) {
            Some(d) if self.catalog.is_installed(id) => d.clone(),
            Some(_) => return None,
            None => apps::builtin(id)?,
        };
        Some(LaunchSpec {
            id: descriptor.id.to_string(),
            title: descriptor.label.to_string(),
            icon: descriptor.icon.to_string(),
            factory: descriptor.factory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::ids;

    #[test]
    fn defaults_pin_eight_apps_in_order() {
        let launcher = Launcher::with_defaults();
        let ids: Vec<&str> = launcher
            .dock()
            .entries()
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, apps::PREINSTALLED.to_vec());
    }

    #[test]
    fn install_pins_once() {
        let mut launcher = Launcher::with_defaults();
        let before = launcher.dock().len();
        assert_eq!(
            launcher.install(ids::TICTACTOE),
            Ok(InstallOutcome::Installed)
        );
        assert_eq!(
            launcher.install(ids::TICTACTOE),
            Ok(InstallOutcome::AlreadyInstalled)
        );
        assert_eq!(launcher.dock().len(), before + 1);
        // already-installed catalog apps that are pinned stay single
        assert_eq!(
            launcher.install(ids::CONTACTS),
            Ok(InstallOutcome::AlreadyInstalled)
        );
        assert_eq!(launcher.dock().len(), before + 1);
    }

    #[test]
    fn reinstall_does_not_repin_removed_entry() {
        let mut launcher = Launcher::with_defaults();
        assert!(launcher.remove_dock_entry(ids::CONTACTS));
        let before = launcher.dock().len();
        assert_eq!(
            launcher.install(ids::CONTACTS),
            Ok(InstallOutcome::AlreadyInstalled)
        );
        assert_eq!(launcher.dock().len(), before);
        assert!(launcher.dock().get(ids::CONTACTS).is_none());
    }

    #[test]
    fn uninstalled_catalog_apps_do_not_resolve() {
        let mut launcher = Launcher::with_defaults();
        assert!(launcher.resolve(ids::WHITEBOARD).is_none());
        launcher.install(ids::WHITEBOARD).unwrap();
        let descriptor = launcher.resolve(ids::WHITEBOARD).expect("installed");
        assert_eq!(descriptor.title, "Whiteboard Pro+Mega");
        assert!(launcher.resolve("missing").is_none());
    }

    #[test]
    fn removed_dock_entry_still_resolves_from_builtins() {
        let mut launcher = Launcher::with_defaults();
        assert!(launcher.remove_dock_entry(ids::NOTES));
        assert!(launcher.resolve(ids::NOTES).is_some());
    }
}
