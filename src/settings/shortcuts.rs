//! Persistent keyboard shortcut registry.
//!
//! Views register each action once with a default binding; the registry
//! resolves the persisted override from the settings store, keeps the list
//! the options dialog edits, and answers per-frame "was this triggered"
//! queries. Rebinding writes straight back into the settings map so the
//! change survives a restart.

use eframe::egui::{Context, Key, Modifiers};

use super::store::Settings;

/// A key plus modifier set, parseable from strings like "Space" or "Ctrl+O".
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyBinding {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyBinding {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Parse a binding string. Tokens are separated by `+`; the last token
    /// is the key name, the rest are modifiers.
    pub fn parse(text: &str) -> Option<Self> {
        let mut modifiers = Modifiers::NONE;
        let mut key = None;
        let tokens: Vec<&str> = text.split('+').map(str::trim).collect();
        let (mod_tokens, key_token) = tokens.split_at(tokens.len().checked_sub(1)?);

        for token in mod_tokens {
            match token.to_ascii_lowercase().as_str() {
                "ctrl" | "cmd" => modifiers = modifiers | Modifiers::COMMAND,
                "shift" => modifiers = modifiers | Modifiers::SHIFT,
                "alt" => modifiers = modifiers | Modifiers::ALT,
                _ => return None,
            }
        }

        if let [token] = key_token {
            key = Key::from_name(*token);
        }
        key.map(|key| Self { key, modifiers })
    }

    /// Human-readable (and re-parseable) form of the binding.
    pub fn label(&self) -> String {
        let mut parts = Vec::new();
        if self.modifiers.command || self.modifiers.ctrl || self.modifiers.mac_cmd {
            parts.push("Ctrl");
        }
        if self.modifiers.shift {
            parts.push("Shift");
        }
        if self.modifiers.alt {
            parts.push("Alt");
        }
        parts.push(self.key.name());
        parts.join("+")
    }
}

/// One registered action.
pub struct Shortcut {
    pub action: String,
    pub description: String,
    pub binding: KeyBinding,
}

/// Process-wide action -> key-binding registry.
#[derive(Default)]
pub struct ShortcutRegistry {
    entries: Vec<Shortcut>,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action with its default binding, preferring a persisted
    /// override from the settings store. Unparseable defaults are skipped
    /// with a log message.
    pub fn register(
        &mut self,
        settings: &Settings,
        action: &str,
        description: &str,
        default_binding: &str,
    ) {
        let binding = settings
            .shortcuts
            .get(action)
            .and_then(|text| {
                let parsed = KeyBinding::parse(text);
                if parsed.is_none() {
                    log::warn!("ignoring bad shortcut override for {action}: {text:?}");
                }
                parsed
            })
            .or_else(|| KeyBinding::parse(default_binding));

        match binding {
            Some(binding) => self.entries.push(Shortcut {
                action: action.to_string(),
                description: description.to_string(),
                binding,
            }),
            None => log::warn!("unparseable default binding for {action}: {default_binding:?}"),
        }
    }

    /// Whether the action's binding was pressed this frame. Consumes the key
    /// event so it does not double-trigger text fields.
    pub fn triggered(&self, ctx: &Context, action: &str) -> bool {
        let Some(entry) = self.entries.iter().find(|s| s.action == action) else {
            return false;
        };
        ctx.input_mut(|i| i.consume_key(entry.binding.modifiers, entry.binding.key))
    }

    /// Current binding for an action, if registered.
    pub fn binding(&self, action: &str) -> Option<KeyBinding> {
        self.entries
            .iter()
            .find(|s| s.action == action)
            .map(|s| s.binding)
    }

    /// Replace a binding and persist the override. The caller saves the
    /// settings file.
    pub fn rebind(&mut self, settings: &mut Settings, action: &str, binding: KeyBinding) {
        if let Some(entry) = self.entries.iter_mut().find(|s| s.action == action) {
            entry.binding = binding;
            settings
                .shortcuts
                .insert(action.to_string(), binding.label());
        }
    }

    pub fn entries(&self) -> &[Shortcut] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_keys() {
        assert_eq!(
            KeyBinding::parse("Space"),
            Some(KeyBinding::new(Key::Space, Modifiers::NONE))
        );
        assert_eq!(
            KeyBinding::parse("4"),
            Some(KeyBinding::new(Key::Num4, Modifiers::NONE))
        );
    }

    #[test]
    fn test_parse_with_modifiers() {
        let binding = KeyBinding::parse("Ctrl+O").unwrap();
        assert_eq!(binding.key, Key::O);
        assert!(binding.modifiers.command);

        let binding = KeyBinding::parse("Ctrl+Shift+S").unwrap();
        assert!(binding.modifiers.shift);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(KeyBinding::parse(""), None);
        assert_eq!(KeyBinding::parse("NotAKey"), None);
        assert_eq!(KeyBinding::parse("Hyper+X"), None);
    }

    #[test]
    fn test_label_roundtrips() {
        for text in ["Space", "1", "Ctrl+O", "Ctrl+Shift+S", "Alt+F"] {
            let binding = KeyBinding::parse(text).unwrap();
            assert_eq!(KeyBinding::parse(&binding.label()), Some(binding));
        }
    }

    #[test]
    fn test_register_uses_default_without_override() {
        let settings = Settings::default();
        let mut registry = ShortcutRegistry::new();
        registry.register(&settings, "playpause", "toggle animation", "Space");
        assert_eq!(
            registry.binding("playpause"),
            Some(KeyBinding::new(Key::Space, Modifiers::NONE))
        );
    }

    #[test]
    fn test_register_prefers_override() {
        let mut settings = Settings::default();
        settings
            .shortcuts
            .insert("playpause".to_string(), "P".to_string());
        let mut registry = ShortcutRegistry::new();
        registry.register(&settings, "playpause", "toggle animation", "Space");
        assert_eq!(registry.binding("playpause").unwrap().key, Key::P);
    }

    #[test]
    fn test_bad_override_falls_back_to_default() {
        let mut settings = Settings::default();
        settings
            .shortcuts
            .insert("playpause".to_string(), "Bogus".to_string());
        let mut registry = ShortcutRegistry::new();
        registry.register(&settings, "playpause", "toggle animation", "Space");
        assert_eq!(registry.binding("playpause").unwrap().key, Key::Space);
    }

    #[test]
    fn test_rebind_persists_override() {
        let mut settings = Settings::default();
        let mut registry = ShortcutRegistry::new();
        registry.register(&settings, "centerview", "center view", "0");

        let new_binding = KeyBinding::new(Key::C, Modifiers::NONE);
        registry.rebind(&mut settings, "centerview", new_binding);

        assert_eq!(registry.binding("centerview"), Some(new_binding));
        assert_eq!(settings.shortcuts.get("centerview").unwrap(), "C");
    }
}
