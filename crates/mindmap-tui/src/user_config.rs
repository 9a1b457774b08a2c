//! User configuration.
//!
//! TOML on disk (default path under the platform config directory), layered
//! with environment overrides through the `config` crate. Runtime changes go
//! through [`SettingsStore`], which publishes a typed `SettingChanged` event
//! per key — consumers are wired to keys explicitly at construction, never
//! discovered by name at runtime.

use std::cell::RefCell;
use std::rc::Rc;

use mindmap_core::Input;
use serde::{Deserialize, Serialize};

use crate::event_bus::{DEFAULT_EVENT_PRIORITY, EmitterId, Event, EventBus, EventKind};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct UserConfig {
    /// How long a committed-but-extendable mapping waits for more input
    /// before it is taken as final.
    #[serde(default = "default_mapping_delay_ms")]
    pub mapping_delay_ms: u64,
    /// Priority for input stack events; keep it below the default priority
    /// (50) so input resolution preempts ordinary traffic.
    #[serde(default = "default_input_event_priority")]
    pub input_event_priority: i32,
    /// The input that opens free typing, kept on the stack as the visible
    /// prompt.
    #[serde(default = "default_free_typing_trigger")]
    pub free_typing_trigger: Input,
    #[serde(default)]
    pub keymaps: Vec<Keymap>,
}

/// One mapping entry in input notation, e.g.
/// `{ keys = "gg", replacement = ":center<CR>" }`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Keymap {
    pub keys: String,
    pub replacement: String,
}

fn default_mapping_delay_ms() -> u64 {
    1000
}

fn default_input_event_priority() -> i32 {
    crate::event_bus::INPUT_EVENT_PRIORITY
}

fn default_free_typing_trigger() -> Input {
    Input::char(':')
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            mapping_delay_ms: default_mapping_delay_ms(),
            input_event_priority: default_input_event_priority(),
            free_typing_trigger: default_free_typing_trigger(),
            keymaps: Vec::new(),
        }
    }
}

impl UserConfig {
    /// Loads the layered configuration: file (optional) under the default
    /// path, then `MINDMAP_*` environment overrides. Falls back to defaults
    /// when nothing parses.
    pub fn load() -> UserConfig {
        config::Config::builder()
            .add_source(config::File::from(Self::default_config_path()).required(false))
            .add_source(config::Environment::with_prefix("MINDMAP").separator("__"))
            .build()
            .and_then(|cfg| cfg.try_deserialize::<UserConfig>())
            .unwrap_or_else(|err| {
                tracing::warn!(%err, "failed to load configuration, using defaults");
                UserConfig::default()
            })
    }

    /// Merges in the curated default keymaps without overriding user entries
    /// for the same key sequence.
    pub fn with_default_keymaps(mut self) -> Self {
        for (keys, replacement) in [("q", ":quit<CR>"), ("s", ":save<CR>"), ("gc", ":center<CR>")] {
            if !self.keymaps.iter().any(|k| k.keys == keys) {
                self.keymaps.push(Keymap {
                    keys: keys.to_string(),
                    replacement: replacement.to_string(),
                });
            }
        }
        self
    }

    /// Atomically writes the configuration as pretty TOML.
    pub fn save_to_path(&self, path: &std::path::Path) -> std::io::Result<()> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let dir = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| std::path::PathBuf::from("."));
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        use std::io::Write as _;
        tmp.write_all(toml_str.as_bytes())?;
        tmp.flush()?;
        tmp.persist(path)?;
        Ok(())
    }

    pub fn load_from_path(path: &std::path::Path) -> std::io::Result<UserConfig> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Default config.toml path: `~/.config/mindmap/config.toml`.
    pub fn default_config_path() -> std::path::PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("mindmap")
            .join("config.toml")
    }
}

/// A single live-updatable setting, as carried by `SettingChanged` events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting {
    MappingDelayMs(u64),
    InputEventPriority(i32),
}

/// Holds the current configuration and broadcasts typed change events.
pub struct SettingsStore {
    bus: Rc<EventBus>,
    emitter: EmitterId,
    config: RefCell<UserConfig>,
}

impl SettingsStore {
    pub const EVENT_KINDS: &'static [EventKind] = &[EventKind::SettingChanged];

    pub fn new(bus: Rc<EventBus>, config: UserConfig) -> Rc<Self> {
        let emitter = EmitterId::mint();
        bus.register_emitter(emitter, Self::EVENT_KINDS)
            .expect("freshly minted emitter id");
        Rc::new(Self {
            bus,
            emitter,
            config: RefCell::new(config),
        })
    }

    pub fn emitter(&self) -> EmitterId {
        self.emitter
    }

    pub fn snapshot(&self) -> UserConfig {
        self.config.borrow().clone()
    }

    pub fn set_mapping_delay_ms(&self, delay_ms: u64) {
        self.config.borrow_mut().mapping_delay_ms = delay_ms;
        self.emit(Setting::MappingDelayMs(delay_ms));
    }

    pub fn set_input_event_priority(&self, priority: i32) {
        self.config.borrow_mut().input_event_priority = priority;
        self.emit(Setting::InputEventPriority(priority));
    }

    fn emit(&self, setting: Setting) {
        tracing::debug!(?setting, "setting changed");
        self.bus
            .publish(
                self.emitter,
                Event::SettingChanged { setting },
                DEFAULT_EVENT_PRIORITY,
            )
            .expect("settings store emitter registered at construction");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = UserConfig::default();
        assert_eq!(cfg.mapping_delay_ms, 1000);
        assert_eq!(cfg.input_event_priority, 20);
        assert_eq!(cfg.free_typing_trigger, Input::char(':'));
        assert!(cfg.keymaps.is_empty());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: UserConfig = toml::from_str(
            r#"
            mapping_delay_ms = 250

            [[keymaps]]
            keys = "gg"
            replacement = ":center<CR>"
            "#,
        )
        .expect("parses");
        assert_eq!(cfg.mapping_delay_ms, 250);
        assert_eq!(cfg.input_event_priority, 20);
        assert_eq!(cfg.keymaps.len(), 1);
        assert_eq!(cfg.keymaps[0].keys, "gg");
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = UserConfig::default().with_default_keymaps();
        cfg.mapping_delay_ms = 42;
        cfg.free_typing_trigger = Input::char(';');
        cfg.save_to_path(&path).expect("saves");

        let loaded = UserConfig::load_from_path(&path).expect("loads");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn default_keymaps_do_not_override_user_entries() {
        let cfg = UserConfig {
            keymaps: vec![Keymap {
                keys: "q".into(),
                replacement: ":close<CR>".into(),
            }],
            ..Default::default()
        }
        .with_default_keymaps();

        let q: Vec<_> = cfg.keymaps.iter().filter(|k| k.keys == "q").collect();
        assert_eq!(q.len(), 1);
        assert_eq!(q[0].replacement, ":close<CR>");
    }

    #[test]
    fn store_publishes_typed_change_events() {
        let bus = Rc::new(EventBus::new());
        let store = SettingsStore::new(Rc::clone(&bus), UserConfig::default());

        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen2 = Rc::clone(&seen);
            bus.subscribe(
                store.emitter(),
                EventKind::SettingChanged,
                Rc::new(move |_, event| {
                    if let Event::SettingChanged { setting } = event {
                        seen2.borrow_mut().push(setting.clone());
                    }
                }),
            )
            .unwrap();
        }

        store.set_mapping_delay_ms(10);
        store.set_input_event_priority(5);
        assert_eq!(store.snapshot().mapping_delay_ms, 10);
        assert_eq!(store.snapshot().input_event_priority, 5);
        assert_eq!(
            *seen.borrow(),
            vec![Setting::MappingDelayMs(10), Setting::InputEventPriority(5)]
        );
    }
}
