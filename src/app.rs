use tracing::info;

use crate::bridge::{Bridge, HostCapabilities, TransportKind};
use crate::config::{Config, APP_NAME, APP_VERSION};
use crate::stores::{ColorScheme, LearningStore, SettingsStore, ThemeStore};

/// Application context: one bridge and one instance of each store, built once at
/// startup and handed to consumers by reference or clone.
pub struct App {
    bridge: Bridge,
    learning: LearningStore,
    settings: SettingsStore,
    theme: ThemeStore,
}

impl App {
    pub fn new(config: &Config, host: HostCapabilities) -> Self {
        let bridge = Bridge::new(host, config.simulator_delay);
        let learning = LearningStore::new(bridge.clone());
        let settings = SettingsStore::new(bridge.clone());
        let theme = ThemeStore::new(bridge.clone(), &config.default_theme);

        info!(
            app = APP_NAME,
            version = APP_VERSION,
            transport = ?bridge.transport_kind(),
            "app constructed"
        );

        Self {
            bridge,
            learning,
            settings,
            theme,
        }
    }

    /// Installs the learning handlers (which also requests stats) and starts
    /// following the system colour scheme.
    pub fn start(&self, color_scheme: &ColorScheme) {
        self.learning.initialize();
        self.theme.initialize(color_scheme);
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    pub fn learning(&self) -> &LearningStore {
        &self.learning
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    pub fn is_simulated(&self) -> bool {
        self.bridge.transport_kind() == TransportKind::Simulator
    }

    pub fn shutdown(&self) {
        self.release();
        info!("app shut down");
    }

    /// Handlers hold store clones and the stores hold the bridge, so the graph
    /// stays alive until the handlers are dropped.
    fn release(&self) {
        self.theme.stop_following_scheme();
        self.bridge.clear_handlers();
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.release();
    }
}
