//! 主题配置
//!
//! Palette tables and the pure derivation from (palette, dark flag, custom
//! colours) to presentation values. Unknown names fall back to `blue`.

use serde::{Deserialize, Serialize};

use crate::color;

pub const DEFAULT_PALETTE: &str = "blue";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub key: &'static str,
    pub name: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
}

const fn palette_entry(
    key: &'static str,
    primary: &'static str,
    secondary: &'static str,
    accent: &'static str,
    name: &'static str,
) -> Palette {
    Palette {
        key,
        name,
        primary,
        secondary,
        accent,
    }
}

/// 颜色主题映射，第一项为默认主题
pub static PALETTES: [Palette; 10] = [
    palette_entry("blue", "#3498db", "#2980b9", "#74b9ff", "蓝色主题"),
    palette_entry("red", "#e74c3c", "#c0392b", "#ff6b6b", "红色主题"),
    palette_entry("orange", "#e67e22", "#d35400", "#ffa726", "橙色主题"),
    palette_entry("green", "#2ecc71", "#27ae60", "#4cd964", "绿色主题"),
    palette_entry("cyan", "#1abc9c", "#16a085", "#4ecdc4", "青色主题"),
    palette_entry("yellow", "#f1c40f", "#f39c12", "#ffeaa7", "黄色主题"),
    palette_entry("brown", "#a0522d", "#8b4513", "#d2691e", "棕色主题"),
    palette_entry("mono", "#7f8c8d", "#34495e", "#95a5a6", "黑白主题"),
    palette_entry("purple", "#9b59b6", "#8e44ad", "#a29bfe", "紫色主题"),
    palette_entry("pink", "#e91e63", "#ad1457", "#fd79a8", "粉色主题"),
];

// 深色模式背景色
static DARK_BACKGROUNDS: [(&str, &str); 10] = [
    ("blue", "#0f141a"),
    ("red", "#161111"),
    ("orange", "#1a140f"),
    ("green", "#0f160f"),
    ("cyan", "#0f1616"),
    ("yellow", "#16160f"),
    ("brown", "#161310"),
    ("mono", "#0a0a0a"),
    ("purple", "#161016"),
    ("pink", "#160f13"),
];

// 浅色模式背景色
static LIGHT_BACKGROUNDS: [(&str, &str); 10] = [
    ("blue", "#f0f8ff"),
    ("red", "#fae6e6"),
    ("orange", "#fff4e6"),
    ("green", "#e6f7e6"),
    ("cyan", "#e6f7f7"),
    ("yellow", "#fffde6"),
    ("brown", "#f7f3e6"),
    ("mono", "#f5f5f5"),
    ("purple", "#f3e6f7"),
    ("pink", "#fce6f5"),
];

const LIGHT_TEXT: &str = "#1a202c";
const DARK_TEXT: &str = "#f7fafc";
const LIGHT_SURFACE: &str = "#ffffff";
const LIGHT_BORDER: &str = "#e2e8f0";

/// User-adjustable accent colours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomColors {
    pub pos_color: String,
    pub correct_color: String,
    pub error_color: String,
    pub answer_color: String,
}

impl Default for CustomColors {
    fn default() -> Self {
        Self {
            pos_color: "rgb(52,152,219)".to_string(),
            correct_color: "rgb(46,204,113)".to_string(),
            error_color: "rgb(231,76,60)".to_string(),
            answer_color: "rgb(155,89,182)".to_string(),
        }
    }
}

pub fn palette(name: &str) -> Option<&'static Palette> {
    PALETTES.iter().find(|p| p.key == name)
}

pub fn palette_or_default(name: &str) -> &'static Palette {
    palette(name).unwrap_or(&PALETTES[0])
}

pub fn is_known_palette(name: &str) -> bool {
    palette(name).is_some()
}

pub fn background(name: &str, dark: bool) -> &'static str {
    let table = if dark {
        &DARK_BACKGROUNDS
    } else {
        &LIGHT_BACKGROUNDS
    };
    let lookup = |key: &str| table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v);
    lookup(name)
        .or_else(|| lookup(DEFAULT_PALETTE))
        .unwrap_or(LIGHT_SURFACE)
}

/// Derived presentation values for one theme state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub pos: String,
    pub correct: String,
    pub error: String,
    pub answer: String,
    pub app_background: String,
    pub main_background: String,
    pub card_background: String,
    pub border: String,
    pub text: String,
}

pub fn derive_presentation(theme: &str, dark: bool, colors: &CustomColors) -> Presentation {
    let palette = palette_or_default(theme);
    let app_background = background(theme, dark).to_string();

    let (main_background, card_background, border, text) = if dark {
        (
            app_background.clone(),
            app_background.replacen("0f", "1e", 1),
            app_background.replacen("0f", "3a", 1),
            DARK_TEXT.to_string(),
        )
    } else {
        (
            LIGHT_SURFACE.to_string(),
            LIGHT_SURFACE.to_string(),
            LIGHT_BORDER.to_string(),
            LIGHT_TEXT.to_string(),
        )
    };

    Presentation {
        primary: palette.primary.to_string(),
        secondary: palette.secondary.to_string(),
        accent: palette.accent.to_string(),
        pos: colors.pos_color.clone(),
        correct: colors.correct_color.clone(),
        error: colors.error_color.clone(),
        answer: colors.answer_color.clone(),
        app_background,
        main_background,
        card_background,
        border,
        text,
    }
}

impl Presentation {
    /// Text colour readable on top of the primary colour.
    pub fn on_primary(&self) -> &'static str {
        color::contrast_color(&self.primary)
    }

    pub fn css_variables(&self) -> Vec<(&'static str, String)> {
        let mut vars = vec![
            ("--color-primary", self.primary.clone()),
            ("--color-secondary", self.secondary.clone()),
            ("--color-accent", self.accent.clone()),
            ("--color-pos", self.pos.clone()),
            ("--color-correct", self.correct.clone()),
            ("--color-error", self.error.clone()),
            ("--color-answer", self.answer.clone()),
            ("--app-bg-color", self.app_background.clone()),
            ("--main-bg-color", self.main_background.clone()),
            ("--text-color", self.text.clone()),
            ("--card-bg-color", self.card_background.clone()),
            ("--border-color", self.border.clone()),
            ("--color-on-primary", self.on_primary().to_string()),
        ];
        if let Some(variants) = color::variants(&self.primary) {
            vars.push(("--color-primary-light", variants.light));
            vars.push(("--color-primary-dark", variants.dark));
        }
        vars
    }
}
