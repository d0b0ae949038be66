//! Per-run application state: accounts, the logged-in user and the data the
//! hosted applications share (notes, contacts, the virtual filesystem, the
//! desktop theme). Nothing here outlives the process.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::theme::ThemeKind;
use crate::vfs::VirtualFs;

pub const GUEST_USER: &str = "Guest";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("Username and password cannot be empty.")]
    EmptyCredentials,
    #[error("Username already exists.")]
    UsernameTaken,
    #[error("Invalid username or password.")]
    InvalidCredentials,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("Contact name cannot be empty.")]
    EmptyName,
    #[error("Contact already exists.")]
    AlreadyExists,
    #[error("Contact does not exist.")]
    NotFound,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    pub handle: String,
    pub notes: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    user: Option<String>,
    accounts: BTreeMap<String, String>,
    pub notes: BTreeMap<String, String>,
    pub contacts: BTreeMap<String, Contact>,
    pub fs: VirtualFs,
    pub theme: ThemeKind,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Logged-out session with the `demo`/`demo` account available.
    pub fn new() -> Self {
        let mut session = Self {
            user: None,
            accounts: BTreeMap::new(),
            notes: BTreeMap::new(),
            contacts: BTreeMap::new(),
            fs: VirtualFs::seeded(),
            theme: ThemeKind::default(),
        };
        session.ensure_default_account();
        session
    }

    /// Session already logged in as `user`, bypassing credentials.
    pub fn with_user(user: impl Into<String>) -> Self {
        let mut session = Self::new();
        session.user = Some(user.into());
        session
    }

    fn ensure_default_account(&mut self) {
        if self.accounts.is_empty() {
            self.accounts.insert("demo".into(), "demo".into());
        }
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Name shown in the chrome; `Guest` while nobody is logged in.
    pub fn display_user(&self) -> &str {
        self.user.as_deref().unwrap_or(GUEST_USER)
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn has_account(&self, username: &str) -> bool {
        self.accounts.contains_key(username)
    }

    pub fn signup(&mut self, username: &str, password: &str) -> Result<(), AccountError> {
        let username = username.trim();
        let password = password.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AccountError::EmptyCredentials);
        }
        if self.accounts.contains_key(username) {
            return Err(AccountError::UsernameTaken);
        }
        self.accounts.insert(username.into(), password.into());
        tracing::info!(user = %username, "account created");
        Ok(())
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<(), AccountError> {
        let username = username.trim();
        let password = password.trim();
        match self.accounts.get(username) {
            Some(stored) if stored == password => {
                self.user = Some(username.to_string());
                tracing::info!(user = %username, "logged in");
                Ok(())
            }
            _ => {
                tracing::warn!(user = %username, "login rejected");
                Err(AccountError::InvalidCredentials)
            }
        }
    }

    pub fn login_as_guest(&mut self) {
        self.user = Some(GUEST_USER.to_string());
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            tracing::info!(user = %user, "logged out");
        }
    }

    pub fn add_contact(&mut self, name: &str, handle: &str) -> Result<(), ContactError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ContactError::EmptyName);
        }
        if self.contacts.contains_key(name) {
            return Err(ContactError::AlreadyExists);
        }
        self.contacts.insert(
            name.to_string(),
            Contact {
                handle: handle.trim().to_string(),
                notes: String::new(),
            },
        );
        Ok(())
    }

    pub fn update_contact(
        &mut self,
        name: &str,
        handle: &str,
        notes: &str,
    ) -> Result<(), ContactError> {
        let contact = self.contacts.get_mut(name).ok_or(ContactError::NotFound)?;
        contact.handle = handle.trim().to_string();
        contact.notes = notes.trim().to_string();
        Ok(())
    }
}
