// 颜色工具函数
// Only `#rrggbb` input is understood; anything else yields None.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorVariants {
    pub light: String,
    pub dark: String,
    pub lighter: String,
    pub darker: String,
}

pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    Some(((value >> 16) as u8, (value >> 8 & 0xff) as u8, (value & 0xff) as u8))
}

/// `"r, g, b"` for use inside `rgba(...)`; malformed input renders as black.
pub fn rgb_triplet(hex: &str) -> String {
    let (r, g, b) = hex_to_rgb(hex).unwrap_or((0, 0, 0));
    format!("{r}, {g}, {b}")
}

pub fn lighten(hex: &str, percent: u8) -> Option<String> {
    shift(hex, i32::from(step(percent)))
}

pub fn darken(hex: &str, percent: u8) -> Option<String> {
    shift(hex, -i32::from(step(percent)))
}

pub fn variants(hex: &str) -> Option<ColorVariants> {
    Some(ColorVariants {
        light: lighten(hex, 20)?,
        dark: darken(hex, 20)?,
        lighter: lighten(hex, 40)?,
        darker: darken(hex, 40)?,
    })
}

/// Black or white, whichever reads better on `background`.
pub fn contrast_color(background: &str) -> &'static str {
    let Some((r, g, b)) = hex_to_rgb(background) else {
        return "#000000";
    };
    let brightness = (u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000;
    if brightness > 128 {
        "#000000"
    } else {
        "#ffffff"
    }
}

fn step(percent: u8) -> u8 {
    (2.55 * f64::from(percent.min(100))).round() as u8
}

fn shift(hex: &str, amount: i32) -> Option<String> {
    let (r, g, b) = hex_to_rgb(hex)?;
    let channel = |c: u8| (i32::from(c) + amount).clamp(0, 255);
    Some(format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b)))
}
