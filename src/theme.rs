//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::grid::BlockType;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const fn hex(rgb: u32) -> Color {
    Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

/// One Dark colours for blocks, the player and the chrome around the playfield.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Block colours indexed by [`Theme::block_color`]: normal, bomb, freeze, laser-h, laser-v.
    pub blocks: [Color; 5],
    pub player: Color,
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (time, cooldowns).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text and spent gauges.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    /// Hardcoded One Dark defaults, exact hex values from onedark.theme.
    pub fn onedark_default() -> Self {
        Self {
            blocks: [
                hex(0xABB2BF), // main_fg / normal
                hex(0xE06C75), // cpu_end / red
                hex(0x56B6C2), // hi_fg / cyan
                hex(0xE5C07B), // title / yellow
                hex(0xC678DD), // net_box / magenta
            ],
            player: hex(0x98C379), // mem_box / green
            bg: hex(0x31353F),
            div_line: hex(0x3F444F),
            main_fg: hex(0xABB2BF),
            title: hex(0xE5C07B),
            inactive_fg: hex(0x5C6370),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file is missing.
    /// `palette` selects colour variant: Normal (theme), HighContrast, or Colorblind.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override block and player colours for high-contrast or colorblind.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.blocks = [
                    hex(0xFFFFFF),
                    hex(0xFF0000),
                    hex(0x00FFFF),
                    hex(0xFFFF00),
                    hex(0xFF00FF),
                ];
                self.player = hex(0x00FF00);
            }
            crate::Palette::Colorblind => {
                // Avoid red/green pairs; powers differ in hue and brightness.
                self.blocks = [
                    hex(0xBBBBBB),
                    hex(0xEE7733), // orange
                    hex(0x0077BB), // blue
                    hex(0xBBBB00), // yellow
                    hex(0xEE3377), // magenta
                ];
                self.player = hex(0x009988); // teal
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            map.get(key)
                .and_then(|v| parse_hex(v.trim_matches('"').trim_matches('\'').trim()).ok())
        };
        let d = Self::onedark_default();
        Self {
            blocks: [
                get("main_fg").unwrap_or(d.blocks[0]),
                get("cpu_end").or_else(|| get("temp_end")).unwrap_or(d.blocks[1]),
                get("hi_fg").or_else(|| get("proc_misc")).unwrap_or(d.blocks[2]),
                get("title").or_else(|| get("cpu_mid")).unwrap_or(d.blocks[3]),
                get("net_box").unwrap_or(d.blocks[4]),
            ],
            player: get("mem_box").or_else(|| get("cpu_start")).unwrap_or(d.player),
            bg: get("meter_bg").unwrap_or(d.bg),
            div_line: get("div_line").unwrap_or(d.div_line),
            main_fg: get("main_fg").unwrap_or(d.main_fg),
            title: get("title").unwrap_or(d.title),
            inactive_fg: get("inactive_fg").unwrap_or(d.inactive_fg),
        }
    }

    #[inline]
    pub fn block_color(&self, kind: BlockType) -> Color {
        let i = match kind {
            BlockType::Normal => 0,
            BlockType::Bomb => 1,
            BlockType::Freeze => 2,
            BlockType::LaserH => 3,
            BlockType::LaserV => 4,
        };
        self.blocks[i]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(eq) = rest.find('=') {
            let value = rest[eq + 1..]
                .trim()
                .trim_matches('"')
                .trim_matches('\'')
                .to_string();
            if !value.is_empty() {
                map.insert(key.to_string(), value);
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let bad = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(bad)
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 => (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17),
        _ => return Err(bad()),
    };
    Ok(Color::Rgb(r, g, b))
}
