use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    // Window focus and state
    FocusNext,
    FocusPrev,
    CloseWindow,
    MinimizeWindow,
    ToggleMaximize,
    ToggleFullscreen,
    OpenSystemLog,
    // Login overlay
    ToggleSignup,
    // Confirm dialog navigation/actions
    ConfirmToggle,
    ConfirmLeft,
    ConfirmRight,
    ConfirmAccept,
    ConfirmCancel,
}

impl Action {
    /// Actions the shell consumes before the focused application sees a key.
    pub const GLOBAL: [Action; 8] = [
        Action::Quit,
        Action::FocusNext,
        Action::FocusPrev,
        Action::CloseWindow,
        Action::MinimizeWindow,
        Action::ToggleMaximize,
        Action::ToggleFullscreen,
        Action::OpenSystemLog,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Quit => "Quit",
            Action::FocusNext => "Focus next window",
            Action::FocusPrev => "Focus previous window",
            Action::CloseWindow => "Close window",
            Action::MinimizeWindow => "Minimize window",
            Action::ToggleMaximize => "Maximize / restore window",
            Action::ToggleFullscreen => "Toggle fullscreen",
            Action::OpenSystemLog => "Open System Log",
            Action::ToggleSignup => "Switch login / sign up",
            Action::ConfirmToggle => "Confirm toggle (Tab)",
            Action::ConfirmLeft => "Confirm left",
            Action::ConfirmRight => "Confirm right",
            Action::ConfirmAccept => "Confirm accept",
            Action::ConfirmCancel => "Confirm cancel",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.code && key.modifiers == self.mods
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.mods.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        let code = match self.code {
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => "BackTab".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::F(n) => format!("F{}", n),
            _ => format!("{:?}", self.code),
        };
        parts.push(code);
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use Action::*;
        let none = KeyModifiers::NONE;
        let mut kb = Self::new();
        kb.add(Quit, KeyCombo::new(KeyCode::Char('q'), KeyModifiers::CONTROL));
        kb.add(FocusNext, KeyCombo::new(KeyCode::F(6), none));
        kb.add(FocusPrev, KeyCombo::new(KeyCode::F(6), KeyModifiers::SHIFT));
        kb.add(
            CloseWindow,
            KeyCombo::new(KeyCode::Char('w'), KeyModifiers::CONTROL),
        );
        kb.add(MinimizeWindow, KeyCombo::new(KeyCode::F(9), none));
        kb.add(ToggleMaximize, KeyCombo::new(KeyCode::F(10), none));
        kb.add(ToggleFullscreen, KeyCombo::new(KeyCode::F(11), none));
        kb.add(OpenSystemLog, KeyCombo::new(KeyCode::F(12), none));
        kb.add(ToggleSignup, KeyCombo::new(KeyCode::F(2), none));
        // Confirm overlay
        kb.add(ConfirmToggle, KeyCombo::new(KeyCode::Tab, none));
        kb.add(ConfirmToggle, KeyCombo::new(KeyCode::BackTab, none));
        kb.add(ConfirmLeft, KeyCombo::new(KeyCode::Left, none));
        kb.add(ConfirmRight, KeyCombo::new(KeyCode::Right, none));
        kb.add(ConfirmAccept, KeyCombo::new(KeyCode::Enter, none));
        kb.add(ConfirmAccept, KeyCombo::new(KeyCode::Char('y'), none));
        kb.add(ConfirmCancel, KeyCombo::new(KeyCode::Esc, none));
        kb.add(ConfirmCancel, KeyCombo::new(KeyCode::Char('n'), none));
        kb
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        self.map
            .get(&action)
            .is_some_and(|list| list.iter().any(|c| c.matches(key)))
    }

    /// First global action bound to `key`, checked in [`Action::GLOBAL`] order.
    pub fn global_action(&self, key: &KeyEvent) -> Option<Action> {
        Action::GLOBAL
            .into_iter()
            .find(|action| self.matches(*action, key))
    }

    /// Return the display strings for all combos mapped to `action`.
    pub fn combos_for(&self, action: Action) -> Vec<String> {
        self.map
            .get(&action)
            .map(|list| list.iter().map(|c| c.display()).collect())
            .unwrap_or_default()
    }

    /// Return the first `KeyCombo` mapped to `action`, if any.
    pub fn first_combo(&self, action: Action) -> Option<KeyCombo> {
        self.map.get(&action).and_then(|list| list.first().cloned())
    }
}
