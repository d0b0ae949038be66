//! Store catalog: applications that can be installed at runtime.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::apps::{self, AppDescriptor};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("'{0}' is not in the store.")]
    UnknownApp(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    AlreadyInstalled,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    available: Vec<AppDescriptor>,
    installed: BTreeSet<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    pub fn new(available: Vec<AppDescriptor>) -> Self {
        Self {
            available,
            installed: BTreeSet::new(),
        }
    }

    /// The stock catalog, with the apps that ship installed already marked.
    pub fn builtin() -> Self {
        let available = apps::CATALOG.iter().filter_map(|id| apps::builtin(id)).collect();
        let mut catalog = Self::new(available);
        for id in apps::CATALOG_PREINSTALLED {
            catalog.installed.insert(id.to_string());
        }
        catalog
    }

    pub fn items(&self) -> &[AppDescriptor] {
        &self.available
    }

    pub fn get(&self, id: &str) -> Option<&AppDescriptor> {
        self.available.iter().find(|d| d.id == id)
    }

    pub fn is_installed(&self, id: &str) -> bool {
        self.installed.contains(id)
    }

    /// Mark `id` installed. Installing twice is not an error.
    pub fn install(&mut self, id: &str) -> Result<InstallOutcome, StoreError> {
        if self.get(id).is_none() {
            return Err(StoreError::UnknownApp(id.to_string()));
        }
        if self.installed.insert(id.to_string()) {
            Ok(InstallOutcome::Installed)
        } else {
            Ok(InstallOutcome::AlreadyInstalled)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::ids;

    #[test]
    fn builtin_marks_contacts_and_video_call_installed() {
        let catalog = Catalog::builtin();
        assert!(catalog.is_installed(ids::CONTACTS));
        assert!(catalog.is_installed(ids::VIDEO_CALL));
        assert!(!catalog.is_installed(ids::TICTACTOE));
        assert_eq!(catalog.items().len(), apps::CATALOG.len());
    }

    #[test]
    fn install_reports_repeat_and_unknown() {
        let mut catalog = Catalog::builtin();
        assert_eq!(
            catalog.install(ids::TICTACTOE),
            Ok(InstallOutcome::Installed)
        );
        assert_eq!(
            catalog.install(ids::TICTACTOE),
            Ok(InstallOutcome::AlreadyInstalled)
        );
        assert_eq!(
            catalog.install("doom"),
            Err(StoreError::UnknownApp("doom".into()))
        );
    }
}
