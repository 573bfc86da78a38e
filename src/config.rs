use std::path::Path;
use std::time::Duration;

use crate::theme_config::DEFAULT_PALETTE;

pub const APP_NAME: &str = "Word Memorizer";
pub const APP_VERSION: &str = "2.1.1";
pub const DEFAULT_FILE_FORMAT: &str = "json";
pub const SUPPORTED_FILE_FORMATS: [&str; 3] = ["json", "csv", "txt"];

/// 单词表文件扩展名
pub const WORD_LIST_EXTENSIONS: [&str; 2] = [".txt", ".wdlst"];

const DEFAULT_SIMULATOR_DELAY_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub simulator_delay: Duration,
    pub default_theme: String,
}

impl Config {
    pub fn from_env() -> Self {
        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let simulator_delay = std::env::var("DANCI_SIMULATOR_DELAY_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(DEFAULT_SIMULATOR_DELAY_MS));

        let default_theme = std::env::var("DANCI_DEFAULT_THEME")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PALETTE.to_string());

        Self {
            log_level,
            simulator_delay,
            default_theme,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            simulator_delay: Duration::from_millis(DEFAULT_SIMULATOR_DELAY_MS),
            default_theme: DEFAULT_PALETTE.to_string(),
        }
    }
}

/// Whether `filename` carries one of the word-list extensions (case-insensitive).
pub fn is_word_list_file(filename: &str) -> bool {
    let Some(ext) = Path::new(filename).extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let ext = format!(".{}", ext.to_ascii_lowercase());
    WORD_LIST_EXTENSIONS.contains(&ext.as_str())
}
