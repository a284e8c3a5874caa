//! Keybinding registry: maps actions to key events with config overrides.
//!
//! Modal overlays (forms, the delete prompt, help) read raw keys; everything
//! else dispatches through this registry so users can remap it in config.toml.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    NavLeft,
    NavRight,
    Select,
    Back,
    Refresh,
    AddItem,
    EditItem,
    DeleteItem,
    OpenImage,
    EnterSearch,
    ClearSearch,
    ExitSearch,
    CommitSearch,
    Signup,
    CycleTheme,
    ShowHelp,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Navigate down",
            Self::NavUp => "Navigate up",
            Self::NavLeft => "Navigate left",
            Self::NavRight => "Navigate right",
            Self::Select => "Open category",
            Self::Back => "Back to categories",
            Self::Refresh => "Reload inventory",
            Self::AddItem => "Add item",
            Self::EditItem => "Edit selected item",
            Self::DeleteItem => "Delete selected item",
            Self::OpenImage => "Open item image in browser",
            Self::EnterSearch => "Search items",
            Self::ClearSearch => "Clear search",
            Self::ExitSearch => "Cancel search",
            Self::CommitSearch => "Keep search and return",
            Self::Signup => "Create an account",
            Self::CycleTheme => "Cycle theme",
            Self::ShowHelp => "Show help",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context; determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Categories,
    Items,
    Search,
}

impl Context {
    pub fn name(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Categories => "Categories",
            Self::Items => "Items",
            Self::Search => "Search",
        }
    }
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Backspace", "Delete"
/// - Modifier combos: "Ctrl+r"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        let c = chars.next()?;
        return chars.next().is_none().then(|| KeySpec::ctrl(c));
    }

    match s.to_lowercase().as_str() {
        "enter" | "return" => return Some(KeySpec::plain(KeyCode::Enter)),
        "esc" | "escape" => return Some(KeySpec::plain(KeyCode::Esc)),
        "tab" => return Some(KeySpec::plain(KeyCode::Tab)),
        "up" => return Some(KeySpec::plain(KeyCode::Up)),
        "down" => return Some(KeySpec::plain(KeyCode::Down)),
        "left" => return Some(KeySpec::plain(KeyCode::Left)),
        "right" => return Some(KeySpec::plain(KeyCode::Right)),
        "backspace" => return Some(KeySpec::plain(KeyCode::Backspace)),
        "delete" | "del" => return Some(KeySpec::plain(KeyCode::Delete)),
        "space" => return Some(KeySpec::plain(KeyCode::Char(' '))),
        _ => {}
    }

    if let Some(n) = s.strip_prefix(['F', 'f']).and_then(|n| n.parse::<u8>().ok()) {
        if (1..=12).contains(&n) {
            return Some(KeySpec::plain(KeyCode::F(n)));
        }
        return None;
    }

    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then(|| KeySpec::plain(KeyCode::Char(c)))
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
///
/// The same key can map to different actions in different contexts; lookups
/// fall back to `Global` when the context has no binding of its own.
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings, in registration order, for the help screen
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        use KeyCode::*;

        // === Global ===
        let global = [
            (Char('q'), Action::Quit),
            (Char('j'), Action::NavDown),
            (Down, Action::NavDown),
            (Char('k'), Action::NavUp),
            (Up, Action::NavUp),
            (Enter, Action::Select),
            (Esc, Action::Back),
            (Char('r'), Action::Refresh),
            (Char('a'), Action::AddItem),
            (Char('/'), Action::EnterSearch),
            (Char('x'), Action::ClearSearch),
            (Char('S'), Action::Signup),
            (Char('t'), Action::CycleTheme),
            (Char('?'), Action::ShowHelp),
        ];
        for (code, action) in global {
            self.bind(Context::Global, KeySpec::plain(code), action);
        }
        self.bind(Context::Global, KeySpec::ctrl('r'), Action::Refresh);

        // === Category grid ===
        for (code, action) in [
            (Char('h'), Action::NavLeft),
            (Left, Action::NavLeft),
            (Char('l'), Action::NavRight),
            (Right, Action::NavRight),
        ] {
            self.bind(Context::Categories, KeySpec::plain(code), action);
        }

        // === Item table ===
        for (code, action) in [
            (Char('e'), Action::EditItem),
            (Char('d'), Action::DeleteItem),
            (Delete, Action::DeleteItem),
            (Char('o'), Action::OpenImage),
            (Char('h'), Action::Back),
            (Left, Action::Back),
            (Backspace, Action::Back),
        ] {
            self.bind(Context::Items, KeySpec::plain(code), action);
        }

        // === Search mode ===
        self.bind(Context::Search, KeySpec::plain(Esc), Action::ExitSearch);
        self.bind(Context::Search, KeySpec::plain(Enter), Action::CommitSearch);
    }

    /// Apply user overrides from the config `[keybindings]` table.
    ///
    /// Keys in the map are action names (e.g., "quit", "add_item").
    /// Values are key strings (e.g., "q", "Ctrl+r", "F5").
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            // Rebind in every context the action was bound in
            let mut contexts: Vec<Context> = self
                .bindings
                .iter()
                .filter(|(_, _, a)| *a == action)
                .map(|(c, _, _)| *c)
                .collect();
            contexts.dedup();

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Look up the action for a given key in a given context.
    ///
    /// Tries the specific context first, then falls back to Global.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        // Shift is already folded into the character ('S', '?')
        let modifiers = match code {
            KeyCode::Char(_) => modifiers - KeyModifiers::SHIFT,
            _ => modifiers,
        };
        let key = KeySpec::new(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }
        // Search mode captures typing; it never falls through to Global
        if context != Context::Global && context != Context::Search {
            return self.lookup.get(&(Context::Global, key)).copied();
        }
        None
    }

    /// First key bound to `action` in any context, for inline hints.
    pub fn key_for(&self, action: Action) -> Option<String> {
        self.bindings
            .iter()
            .find(|(_, _, a)| *a == action)
            .map(|(_, key, _)| format_key(key))
    }

    /// All bindings for the help screen as (context, key, action, description).
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action enum.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "navdown" | "down" => Some(Action::NavDown),
        "nav_up" | "navup" | "up" => Some(Action::NavUp),
        "nav_left" | "navleft" | "left" => Some(Action::NavLeft),
        "nav_right" | "navright" | "right" => Some(Action::NavRight),
        "select" | "enter" => Some(Action::Select),
        "back" => Some(Action::Back),
        "refresh" | "reload" => Some(Action::Refresh),
        "add_item" | "additem" | "add" => Some(Action::AddItem),
        "edit_item" | "edititem" | "edit" => Some(Action::EditItem),
        "delete_item" | "deleteitem" | "delete" => Some(Action::DeleteItem),
        "open_image" | "openimage" | "open" => Some(Action::OpenImage),
        "enter_search" | "entersearch" | "search" => Some(Action::EnterSearch),
        "clear_search" | "clearsearch" => Some(Action::ClearSearch),
        "exit_search" | "exitsearch" => Some(Action::ExitSearch),
        "commit_search" | "commitsearch" => Some(Action::CommitSearch),
        "signup" | "sign_up" => Some(Action::Signup),
        "cycle_theme" | "cycletheme" | "theme" => Some(Action::CycleTheme),
        "show_help" | "showhelp" | "help" => Some(Action::ShowHelp),
        _ => None,
    }
}
