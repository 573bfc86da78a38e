//! UI state containers
//!
//! Each store keeps its snapshot in a `tokio::sync::watch` channel: readers take
//! a clone or subscribe, actions mutate and notify. Derived values are plain
//! functions over the snapshot.

pub mod learning;
pub mod settings;
pub mod theme;

pub use learning::{Feedback, FeedbackType, LearningPhase, LearningSnapshot, LearningStore};
pub use settings::{SettingsError, SettingsStore};
pub use theme::{ColorKind, ColorScheme, ThemeSettingsPatch, ThemeState, ThemeStore};
