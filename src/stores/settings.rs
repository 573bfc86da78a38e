use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

use crate::bridge::Bridge;
use crate::messages::{AppSettings, Command};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("设置项 {key} 的值无效: {source}")]
    InvalidValue {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("设置序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Flat user preferences. Every change persists the whole snapshot.
#[derive(Clone)]
pub struct SettingsStore {
    bridge: Bridge,
    state: Arc<watch::Sender<AppSettings>>,
}

impl SettingsStore {
    pub fn new(bridge: Bridge) -> Self {
        let (state, _) = watch::channel(AppSettings::default());
        Self {
            bridge,
            state: Arc::new(state),
        }
    }

    pub fn settings(&self) -> AppSettings {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppSettings> {
        self.state.subscribe()
    }

    /// Sets one preference by its wire name (e.g. `"autoAdvance"`).
    ///
    /// Unknown keys are ignored and return `Ok(false)`; a value of the wrong type
    /// is rejected and leaves the settings untouched.
    pub fn update_setting(&self, key: &str, value: Value) -> SettingsResult<bool> {
        let mut outcome = Ok(false);
        self.state
            .send_if_modified(|current| match with_setting(current, key, value) {
                Ok(Some(updated)) => {
                    *current = updated;
                    outcome = Ok(true);
                    true
                }
                Ok(None) => {
                    debug!(key, "unknown setting ignored");
                    false
                }
                Err(err) => {
                    outcome = Err(err);
                    false
                }
            });

        if matches!(outcome, Ok(true)) {
            self.save_to_backend();
        }
        outcome
    }

    pub fn reset_to_defaults(&self) {
        self.state.send_replace(AppSettings::default());
        self.save_to_backend();
    }

    pub fn save_to_backend(&self) {
        self.bridge.send(Command::SaveAppSettings(self.settings()));
    }

    /// Merges settings received from the backend; unknown keys are dropped and
    /// nothing is sent back.
    pub fn load_from_backend(&self, settings: &Value) -> SettingsResult<()> {
        let Value::Object(incoming) = settings else {
            return Ok(());
        };

        let mut outcome = Ok(());
        self.state
            .send_if_modified(|current| match merge_known(current, incoming) {
                Ok(merged) => {
                    let changed = *current != merged;
                    *current = merged;
                    changed
                }
                Err(err) => {
                    outcome = Err(err);
                    false
                }
            });
        outcome
    }
}

// The merge helpers run under the store's write lock, so a concurrent update
// always starts from the latest snapshot.

/// `None` when `key` is not a setting.
fn with_setting(current: &AppSettings, key: &str, value: Value) -> SettingsResult<Option<AppSettings>> {
    let Value::Object(mut fields) = serde_json::to_value(current)? else {
        return Ok(None);
    };

    match fields.get_mut(key) {
        Some(slot) if !slot.is_null() => *slot = value,
        _ => return Ok(None),
    }

    serde_json::from_value(Value::Object(fields))
        .map(Some)
        .map_err(|source| SettingsError::InvalidValue {
            key: key.to_string(),
            source,
        })
}

fn merge_known(current: &AppSettings, incoming: &Map<String, Value>) -> SettingsResult<AppSettings> {
    let Value::Object(mut fields) = serde_json::to_value(current)? else {
        return Ok(current.clone());
    };
    for (key, value) in incoming {
        if let Some(slot) = fields.get_mut(key) {
            *slot = value.clone();
        }
    }
    Ok(serde_json::from_value(Value::Object(fields))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{ChannelHost, HostCapabilities, DEFAULT_SIMULATOR_DELAY};
    use serde_json::json;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn store() -> (SettingsStore, UnboundedReceiver<String>) {
        let (host, rx) = ChannelHost::new();
        let bridge = Bridge::new(
            HostCapabilities::none().with_chromium(Arc::new(host)),
            DEFAULT_SIMULATOR_DELAY,
        );
        (SettingsStore::new(bridge), rx)
    }

    fn last_sent(rx: &mut UnboundedReceiver<String>) -> Option<Value> {
        let mut last = None;
        while let Ok(text) = rx.try_recv() {
            last = Some(serde_json::from_str(&text).unwrap());
        }
        last
    }

    #[test]
    fn test_defaults() {
        let settings = AppSettings::default();
        assert!(settings.auto_advance);
        assert_eq!(settings.auto_advance_delay, 1500);
        assert!(!settings.case_sensitive);
        assert_eq!(settings.default_file_format, "json");
    }

    #[test]
    fn test_update_known_key_persists_full_snapshot() {
        let (store, mut rx) = store();
        assert!(store.update_setting("caseSensitive", json!(true)).unwrap());
        assert!(store.settings().case_sensitive);

        let message = last_sent(&mut rx).unwrap();
        assert_eq!(message["method"], "saveAppSettings");
        assert_eq!(message["data"]["caseSensitive"], true);
        assert_eq!(message["data"]["autoAdvanceDelay"], 1500);
        assert_eq!(message["data"]["defaultFileFormat"], "json");
    }

    #[test]
    fn test_unknown_key_is_noop() {
        let (store, mut rx) = store();
        assert!(!store.update_setting("fontSize", json!(14)).unwrap());
        assert_eq!(store.settings(), AppSettings::default());
        assert!(last_sent(&mut rx).is_none());
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let (store, mut rx) = store();
        let err = store
            .update_setting("autoAdvanceDelay", json!("slow"))
            .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { ref key, .. } if key == "autoAdvanceDelay"));
        assert_eq!(store.settings().auto_advance_delay, 1500);
        assert!(last_sent(&mut rx).is_none());
    }

    #[test]
    fn test_reset_to_defaults_persists() {
        let (store, mut rx) = store();
        store.update_setting("showExamples", json!(false)).unwrap();
        store.reset_to_defaults();
        assert!(store.settings().show_examples);
        assert_eq!(last_sent(&mut rx).unwrap()["data"]["showExamples"], true);
    }

    #[test]
    fn test_load_from_backend_merges_quietly() {
        let (store, mut rx) = store();
        store
            .load_from_backend(&json!({"enableHints": false, "unknown": 1}))
            .unwrap();
        let settings = store.settings();
        assert!(!settings.enable_hints);
        assert!(settings.show_derivatives);
        assert!(last_sent(&mut rx).is_none());

        assert!(store.load_from_backend(&json!({"enableHints": "nope"})).is_err());
        assert!(!store.settings().enable_hints);
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let (store, _rx) = store();
        let barrier = std::sync::Barrier::new(2);

        for round in 0..50 {
            let flag = round % 2 == 0;
            std::thread::scope(|scope| {
                scope.spawn(|| {
                    barrier.wait();
                    store.update_setting("caseSensitive", json!(flag)).unwrap();
                });
                scope.spawn(|| {
                    barrier.wait();
                    store
                        .load_from_backend(&json!({"enableHints": !flag}))
                        .unwrap();
                });
            });

            let settings = store.settings();
            assert_eq!(settings.case_sensitive, flag, "round {round}");
            assert_eq!(settings.enable_hints, !flag, "round {round}");
        }
    }
}
