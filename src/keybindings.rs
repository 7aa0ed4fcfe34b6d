//! Keybinding registry: maps key events to session actions, with config
//! overrides.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// Everything a key press can ask the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    NextFeed,
    PrevFeed,
    ToggleHelp,
    Quit,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,
    Top,
    Bottom,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::MoveLeft => "Previous article",
            Self::MoveRight => "Next article",
            Self::NextFeed => "Next feed",
            Self::PrevFeed => "Previous feed",
            Self::ToggleHelp => "Toggle help",
            Self::Quit => "Quit",
            Self::ScrollUp => "Scroll up one line",
            Self::ScrollDown => "Scroll down one line",
            Self::PageUp => "Page up",
            Self::PageDown => "Page down",
            Self::HalfPageUp => "Half page up",
            Self::HalfPageDown => "Half page down",
            Self::Top => "Go to top",
            Self::Bottom => "Go to bottom",
        }
    }

    /// Section of the help screen this action is listed under.
    pub fn group(self) -> &'static str {
        match self {
            Self::MoveLeft | Self::MoveRight | Self::NextFeed | Self::PrevFeed => "Navigation",
            Self::ScrollUp
            | Self::ScrollDown
            | Self::PageUp
            | Self::PageDown
            | Self::HalfPageUp
            | Self::HalfPageDown
            | Self::Top
            | Self::Bottom => "Scrolling",
            Self::ToggleHelp | Self::Quit => "General",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context: determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    /// Reading frame; also the fallback for every other context
    Global,
    /// Help overlay
    Help,
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

    /// Terminals report `G` as `Shift+G`; the case of the char already
    /// carries the shift, so it is dropped for lookup.
    fn normalized(self) -> Self {
        match self.code {
            KeyCode::Char(_) => Self::new(self.code, self.modifiers.difference(KeyModifiers::SHIFT)),
            _ => self,
        }
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "?"
/// - Named keys: "Enter", "Esc", "Up", "PageDown", "Home", "Space"
/// - Modifier combos: "Ctrl+d", "Ctrl+u"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    // Named keys (case-insensitive)
    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "pageup" | "pgup" => Some(KeyCode::PageUp),
        "pagedown" | "pgdn" => Some(KeyCode::PageDown),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "backspace" => Some(KeyCode::Backspace),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    // Function keys
    if let Some(n) = s.strip_prefix(&['F', 'f'][..]).and_then(|n| n.parse::<u8>().ok()) {
        return (1..=12)
            .contains(&n)
            .then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::plain(KeyCode::Char(c))),
        _ => None,
    }
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
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::PageUp => "PgUp".to_string(),
        KeyCode::PageDown => "PgDn".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
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
/// Context-aware: a key bound in [`Context::Help`] shadows its global
/// binding while help is shown.
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// Registration order, for the help screen
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

    fn bind_all(&mut self, context: Context, keys: &[KeySpec], action: Action) {
        for &key in keys {
            self.bind(context, key, action);
        }
    }

    fn register_defaults(&mut self) {
        use KeyCode::{Char, Down, End, Esc, Home, Left, PageDown, PageUp, Right, Up};
        let p = KeySpec::plain;

        // Navigation
        self.bind_all(Context::Global, &[p(Char('h')), p(Left)], Action::MoveLeft);
        self.bind_all(Context::Global, &[p(Char('l')), p(Right)], Action::MoveRight);
        self.bind(Context::Global, p(Char(']')), Action::NextFeed);
        self.bind(Context::Global, p(Char('[')), Action::PrevFeed);

        // Scrolling
        self.bind_all(Context::Global, &[p(Char('k')), p(Up)], Action::ScrollUp);
        self.bind_all(Context::Global, &[p(Char('j')), p(Down)], Action::ScrollDown);
        self.bind_all(Context::Global, &[p(PageUp), p(Char('b'))], Action::PageUp);
        self.bind_all(
            Context::Global,
            &[p(PageDown), p(Char('f')), p(Char(' '))],
            Action::PageDown,
        );
        self.bind_all(
            Context::Global,
            &[p(Char('u')), KeySpec::ctrl('u')],
            Action::HalfPageUp,
        );
        self.bind_all(
            Context::Global,
            &[p(Char('d')), KeySpec::ctrl('d')],
            Action::HalfPageDown,
        );
        self.bind_all(Context::Global, &[p(Char('g')), p(Home)], Action::Top);
        self.bind_all(Context::Global, &[p(Char('G')), p(End)], Action::Bottom);

        // General
        self.bind(Context::Global, p(Char('?')), Action::ToggleHelp);
        self.bind_all(
            Context::Global,
            &[p(Char('q')), p(Esc), KeySpec::ctrl('c')],
            Action::Quit,
        );

        // Esc dismisses the help overlay instead of quitting
        self.bind(Context::Help, p(Esc), Action::ToggleHelp);
    }

    /// Apply user overrides from the config `[keybindings]` table.
    ///
    /// Keys in the map are action names (e.g., "quit", "move_left").
    /// Values are one key string or several separated by commas
    /// (e.g., "q", "Ctrl+d", "h, Left"). The new keys replace every default
    /// binding of that action, in the contexts it was bound in.
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        // sorted so overlapping overrides resolve the same way on every run
        let mut entries: Vec<_> = overrides.iter().collect();
        entries.sort();

        for (action_name, key_str) in entries {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let keys: Option<Vec<KeySpec>> = key_str.split(',').map(parse_key_string).collect();
            let keys = match keys {
                Some(keys) if !keys.is_empty() => keys,
                _ => {
                    warnings.push(format!(
                        "Cannot parse key '{}' for action '{}', ignoring",
                        key_str, action_name
                    ));
                    continue;
                }
            };

            let mut contexts: Vec<Context> = Vec::new();
            for (ctx, _, a) in &self.bindings {
                if *a == action && !contexts.contains(ctx) {
                    contexts.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind_all(ctx, &keys, action);
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
        let key = KeySpec::new(code, modifiers).normalized();

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        if context != Context::Global {
            return self.lookup.get(&(Context::Global, key)).copied();
        }

        None
    }

    /// Global bindings grouped by action, in registration order.
    ///
    /// Returns `(group, keys, description)` rows, one per action, with all
    /// of its keys joined for display.
    pub fn help_rows(&self) -> Vec<(&'static str, String, &'static str)> {
        let mut order: Vec<Action> = Vec::new();
        let mut keys: HashMap<Action, Vec<String>> = HashMap::new();
        for (ctx, key, action) in &self.bindings {
            if *ctx != Context::Global {
                continue;
            }
            if !order.contains(action) {
                order.push(*action);
            }
            keys.entry(*action).or_default().push(format_key(key));
        }

        order
            .into_iter()
            .map(|action| {
                let display = keys.remove(&action).unwrap_or_default().join("/");
                (action.group(), display, action.describe())
            })
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
        "move_left" | "moveleft" | "left" | "prev_article" => Some(Action::MoveLeft),
        "move_right" | "moveright" | "right" | "next_article" => Some(Action::MoveRight),
        "next_feed" | "nextfeed" => Some(Action::NextFeed),
        "prev_feed" | "prevfeed" => Some(Action::PrevFeed),
        "toggle_help" | "togglehelp" | "help" => Some(Action::ToggleHelp),
        "quit" => Some(Action::Quit),
        "scroll_up" | "scrollup" | "up" => Some(Action::ScrollUp),
        "scroll_down" | "scrolldown" | "down" => Some(Action::ScrollDown),
        "page_up" | "pageup" => Some(Action::PageUp),
        "page_down" | "pagedown" => Some(Action::PageDown),
        "half_page_up" | "halfpageup" => Some(Action::HalfPageUp),
        "half_page_down" | "halfpagedown" => Some(Action::HalfPageDown),
        "top" => Some(Action::Top),
        "bottom" => Some(Action::Bottom),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
