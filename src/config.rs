//! User preferences persisted next to the journal.

use serde::{Deserialize, Serialize};

use crate::error::QuestResult;
use crate::storage::KeyValueStore;
use crate::theme::Theme;
use crate::timer::TimerSettings;

pub const PREFERENCES_KEY: &str = "hypnagogicPreferences";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub theme: Theme,
    pub timer: TimerSettings,
    pub log_level: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            timer: TimerSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Preferences {
    pub fn load(store: &impl KeyValueStore) -> Self {
        let Some(raw) = store.get(PREFERENCES_KEY) else {
            return Self::default();
        };
        match serde_json::from_str::<Preferences>(&raw) {
            Ok(mut prefs) => {
                prefs.timer = prefs.timer.normalized();
                prefs
            }
            Err(err) => {
                log::warn!("ignoring unreadable {PREFERENCES_KEY}: {err}");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &impl KeyValueStore) -> QuestResult<()> {
        let raw = serde_json::to_string(self)?;
        store.set(PREFERENCES_KEY, &raw)
    }

    /// Console log level; unknown names fall back to `Info`.
    pub fn level(&self) -> log::Level {
        parse_level(&self.log_level).unwrap_or(log::Level::Info)
    }
}

pub fn parse_level(name: &str) -> Option<log::Level> {
    match name.trim().to_ascii_lowercase().as_str() {
        "error" => Some(log::Level::Error),
        "warn" | "warning" => Some(log::Level::Warn),
        "info" => Some(log::Level::Info),
        "debug" => Some(log::Level::Debug),
        "trace" => Some(log::Level::Trace),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::timer::TimerTheme;

    #[test]
    fn partial_json_falls_back_field_by_field() {
        let store = MemoryStore::new();
        store
            .set(PREFERENCES_KEY, r#"{"theme":"ocean","timer":{"duration":600}}"#)
            .unwrap();
        let prefs = Preferences::load(&store);
        assert_eq!(prefs.theme, Theme::Ocean);
        assert_eq!(prefs.timer.duration, 600);
        assert_eq!(prefs.timer.reminder_interval, 60);
        assert_eq!(prefs.timer.theme, TimerTheme::Sleep);
        assert_eq!(prefs.level(), log::Level::Info);
    }

    #[test]
    fn save_then_load() {
        let store = MemoryStore::new();
        let mut prefs = Preferences::default();
        prefs.theme = Theme::Aurora;
        prefs.timer.auto_start = true;
        prefs.log_level = "debug".into();
        prefs.save(&store).unwrap();
        let back = Preferences::load(&store);
        assert_eq!(back, prefs);
        assert_eq!(back.level(), log::Level::Debug);
    }

    #[test]
    fn garbage_yields_defaults() {
        let store = MemoryStore::new();
        store.set(PREFERENCES_KEY, "nope").unwrap();
        assert_eq!(Preferences::load(&store), Preferences::default());
        assert_eq!(parse_level("loud"), None);
    }
}
