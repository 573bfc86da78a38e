use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Deserialize;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::bridge::Bridge;
use crate::messages::{Command, ThemeSettings};
use crate::theme_config::{self, CustomColors, Presentation, DEFAULT_PALETTE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorKind {
    Pos,
    Correct,
    Error,
    Answer,
}

impl FromStr for ColorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "posColor" => Ok(ColorKind::Pos),
            "correctColor" => Ok(ColorKind::Correct),
            "errorColor" => Ok(ColorKind::Error),
            "answerColor" => Ok(ColorKind::Answer),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeState {
    pub dark_mode: bool,
    pub current_theme: String,
    pub custom_colors: CustomColors,
}

impl ThemeState {
    pub fn palette(&self) -> &'static theme_config::Palette {
        theme_config::palette_or_default(&self.current_theme)
    }

    pub fn presentation(&self) -> Presentation {
        theme_config::derive_presentation(&self.current_theme, self.dark_mode, &self.custom_colors)
    }

    pub fn to_settings(&self) -> ThemeSettings {
        ThemeSettings {
            dark_mode: self.dark_mode,
            color_theme: self.current_theme.clone(),
            pos_color: self.custom_colors.pos_color.clone(),
            correct_color: self.custom_colors.correct_color.clone(),
            error_color: self.custom_colors.error_color.clone(),
            answer_color: self.custom_colors.answer_color.clone(),
        }
    }
}

impl Default for ThemeState {
    fn default() -> Self {
        Self {
            dark_mode: false,
            current_theme: DEFAULT_PALETTE.to_string(),
            custom_colors: CustomColors::default(),
        }
    }
}

/// Theme settings as stored by the backend; any field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeSettingsPatch {
    pub dark_mode: Option<bool>,
    pub color_theme: Option<String>,
    pub pos_color: Option<String>,
    pub correct_color: Option<String>,
    pub error_color: Option<String>,
    pub answer_color: Option<String>,
}

/// Host view of the OS colour-scheme preference. The host pushes changes with
/// [`ColorScheme::set_prefers_dark`].
#[derive(Clone)]
pub struct ColorScheme {
    prefers_dark: Arc<watch::Sender<bool>>,
}

impl ColorScheme {
    pub fn new(prefers_dark: bool) -> Self {
        let (tx, _) = watch::channel(prefers_dark);
        Self {
            prefers_dark: Arc::new(tx),
        }
    }

    pub fn prefers_dark(&self) -> bool {
        *self.prefers_dark.borrow()
    }

    pub fn set_prefers_dark(&self, dark: bool) {
        self.prefers_dark.send_if_modified(|current| {
            let changed = *current != dark;
            *current = dark;
            changed
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.prefers_dark.subscribe()
    }
}

#[derive(Clone)]
pub struct ThemeStore {
    bridge: Bridge,
    state: Arc<watch::Sender<ThemeState>>,
    scheme_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ThemeStore {
    /// Starts on `theme` if it names a palette, otherwise on the default one.
    pub fn new(bridge: Bridge, theme: &str) -> Self {
        let current_theme = if theme_config::is_known_palette(theme) {
            theme.to_string()
        } else {
            DEFAULT_PALETTE.to_string()
        };
        let (state, _) = watch::channel(ThemeState {
            current_theme,
            ..ThemeState::default()
        });
        Self {
            bridge,
            state: Arc::new(state),
            scheme_task: Arc::new(Mutex::new(None)),
        }
    }

    pub fn state(&self) -> ThemeState {
        self.state.borrow().clone()
    }

    pub fn presentation(&self) -> Presentation {
        self.state.borrow().presentation()
    }

    pub fn subscribe(&self) -> watch::Receiver<ThemeState> {
        self.state.subscribe()
    }

    /// Reads the system preference once, then follows its changes.
    ///
    /// System-driven changes are not persisted. Needs a Tokio runtime to follow
    /// changes; without one only the initial probe applies.
    pub fn initialize(&self, scheme: &ColorScheme) {
        let mut changes = scheme.subscribe();
        if *changes.borrow_and_update() {
            self.state.send_modify(|s| s.dark_mode = true);
        }

        let Ok(handle) = Handle::try_current() else {
            warn!("no async runtime; not following system colour scheme");
            return;
        };

        let state = Arc::clone(&self.state);
        let task = handle.spawn(async move {
            while changes.changed().await.is_ok() {
                let dark = *changes.borrow_and_update();
                debug!(dark, "system colour scheme changed");
                state.send_modify(|s| s.dark_mode = dark);
            }
        });

        if let Some(previous) = self.scheme_task.lock().replace(task) {
            previous.abort();
        }
    }

    pub fn stop_following_scheme(&self) {
        if let Some(task) = self.scheme_task.lock().take() {
            task.abort();
        }
    }

    pub fn toggle_dark_mode(&self) {
        self.state.send_modify(|s| s.dark_mode = !s.dark_mode);
        self.save_to_backend();
    }

    /// No-op for names that are not in the palette table.
    pub fn set_theme(&self, name: &str) -> bool {
        if !theme_config::is_known_palette(name) {
            debug!(name, "unknown palette ignored");
            return false;
        }
        self.state.send_modify(|s| s.current_theme = name.to_string());
        self.save_to_backend();
        true
    }

    pub fn set_custom_color(&self, kind: ColorKind, value: impl Into<String>) {
        let value = value.into();
        self.state.send_modify(|s| {
            let slot = match kind {
                ColorKind::Pos => &mut s.custom_colors.pos_color,
                ColorKind::Correct => &mut s.custom_colors.correct_color,
                ColorKind::Error => &mut s.custom_colors.error_color,
                ColorKind::Answer => &mut s.custom_colors.answer_color,
            };
            *slot = value;
        });
        self.save_to_backend();
    }

    pub fn save_to_backend(&self) {
        let settings = self.state.borrow().to_settings();
        self.bridge.send(Command::SaveSettings(settings));
    }

    /// Applies stored theme settings without sending them back. Empty strings
    /// count as missing.
    pub fn load_from_backend(&self, patch: ThemeSettingsPatch) {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        self.state.send_modify(|s| {
            if let Some(dark) = patch.dark_mode {
                s.dark_mode = dark;
            }
            if let Some(theme) = non_empty(patch.color_theme) {
                s.current_theme = theme;
            }
            if let Some(c) = non_empty(patch.pos_color) {
                s.custom_colors.pos_color = c;
            }
            if let Some(c) = non_empty(patch.correct_color) {
                s.custom_colors.correct_color = c;
            }
            if let Some(c) = non_empty(patch.error_color) {
                s.custom_colors.error_color = c;
            }
            if let Some(c) = non_empty(patch.answer_color) {
                s.custom_colors.answer_color = c;
            }
        });
    }
}
