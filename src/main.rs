//! Blockdrop: survive a falling-block storm in the terminal by breaking what lands on you.

mod app;
mod breaker;
mod cluster;
mod falling;
mod grid;
mod highscores;
mod input;
mod logging;
mod player;
mod power;
mod rows;
mod shape;
mod sim;
mod spawn;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::{Parser, ValueEnum};
use grid::GridDims;
use power::PowerTuning;
use spawn::SpawnTuning;
use thiserror::Error;

/// Game tunables derived from the CLI. `Default` holds the tuned values.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub cols: u16,
    pub rows: u16,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub break_cooldown: f32,
    pub freeze_duration: f32,
    pub bomb_radius: i32,
    pub spawn_interval: f32,
    /// Percent chance a spawn carries a power block.
    pub powerup_chance: u32,
    pub powerup_max_gap: f32,
    /// Fall speed in px/s at the start of a run.
    pub base_fall: f32,
    pub max_extra_fall: f32,
    /// Fall speed gained per second survived.
    pub fall_accel: f32,
    /// Largest frame delta the simulation accepts, in seconds.
    pub max_dt: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        let power = PowerTuning::default();
        let spawn = SpawnTuning::default();
        Self {
            cols: 16,
            rows: 20,
            seed: None,
            break_cooldown: 0.5,
            freeze_duration: power.freeze_duration,
            bomb_radius: power.bomb_radius,
            spawn_interval: spawn.interval,
            powerup_chance: spawn.powerup_chance,
            powerup_max_gap: spawn.powerup_max_gap,
            base_fall: 220.0,
            max_extra_fall: 60.0,
            fall_accel: 5.0,
            max_dt: 0.05,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("grid must be at least {min_cols}x{min_rows} cells, got {cols}x{rows}")]
    GridTooSmall {
        cols: u16,
        rows: u16,
        min_cols: u16,
        min_rows: u16,
    },
    #[error("grid must be at most {max_cols}x{max_rows} cells, got {cols}x{rows}")]
    GridTooLarge {
        cols: u16,
        rows: u16,
        max_cols: u16,
        max_rows: u16,
    },
    #[error("{name} must be a positive number of seconds, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[error("power-up chance is a percentage (0-100), got {0}")]
    ChanceOutOfRange(u32),
}

impl GameConfig {
    /// Smallest grid that still fits the widest spawn shape and a jump.
    pub const MIN_COLS: u16 = 4;
    pub const MIN_ROWS: u16 = 6;
    /// Largest grid; keeps cell counts and the doubled-width playfield well inside u16.
    pub const MAX_COLS: u16 = 200;
    pub const MAX_ROWS: u16 = 200;

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols < Self::MIN_COLS || self.rows < Self::MIN_ROWS {
            return Err(ConfigError::GridTooSmall {
                cols: self.cols,
                rows: self.rows,
                min_cols: Self::MIN_COLS,
                min_rows: Self::MIN_ROWS,
            });
        }
        if self.cols > Self::MAX_COLS || self.rows > Self::MAX_ROWS {
            return Err(ConfigError::GridTooLarge {
                cols: self.cols,
                rows: self.rows,
                max_cols: Self::MAX_COLS,
                max_rows: Self::MAX_ROWS,
            });
        }
        for (name, value) in [
            ("spawn interval", self.spawn_interval),
            ("max dt", self.max_dt),
            ("power-up gap", self.powerup_max_gap),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        for (name, value) in [
            ("break cooldown", self.break_cooldown),
            ("freeze duration", self.freeze_duration),
            ("bomb radius", self.bomb_radius as f32),
            ("base fall speed", self.base_fall),
            ("extra fall speed", self.max_extra_fall),
            ("fall acceleration", self.fall_accel),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::Negative { name, value });
            }
        }
        if self.powerup_chance > 100 {
            return Err(ConfigError::ChanceOutOfRange(self.powerup_chance));
        }
        Ok(())
    }

    pub fn dims(&self) -> GridDims {
        GridDims::new(self.cols, self.rows)
    }

    pub fn power_tuning(&self) -> PowerTuning {
        PowerTuning {
            bomb_radius: self.bomb_radius,
            freeze_duration: self.freeze_duration,
        }
    }

    pub fn spawn_tuning(&self) -> SpawnTuning {
        SpawnTuning {
            interval: self.spawn_interval,
            powerup_chance: self.powerup_chance,
            powerup_max_gap: self.powerup_max_gap,
        }
    }
}

impl From<&Args> for GameConfig {
    fn from(args: &Args) -> Self {
        let d = Self::default();
        Self {
            cols: args.width,
            rows: args.height,
            seed: args.seed,
            break_cooldown: args.break_cooldown.unwrap_or(d.break_cooldown),
            freeze_duration: args.freeze.unwrap_or(d.freeze_duration),
            bomb_radius: args.bomb_radius.unwrap_or(d.bomb_radius),
            spawn_interval: args.spawn_interval.unwrap_or(d.spawn_interval),
            powerup_chance: args.powerup_chance.unwrap_or(d.powerup_chance),
            max_dt: args.max_dt.unwrap_or(d.max_dt),
            ..d
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        logging::init_file(path, args.log_level())?;
    }
    let config = GameConfig::from(&args);
    config.validate()?;
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let mut app = App::new(config, theme);
    app.run()?;
    Ok(())
}

/// Falling-block survival game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blockdrop",
    version,
    about = "Falling-block survival in the terminal. Break blocks, trigger powers, clear rows, outlast the stack.",
    long_about = "Blockdrop is a terminal survival game. Shapes rain down onto a grid; you walk \
        and jump underneath them and break neighbouring blocks. Anything left hanging without \
        support falls again, full rows clear, and the game ends when the stack reaches the top.\n\n\
        Power blocks: <> bomb (clears an area), ** freeze (stops falling for a while), \
        == and || lasers (clear a row or a column).\n\n\
        CONTROLS:\n  A/D or H/L  Walk      Space/W/K  Jump\n  Arrows      Break     P          Pause\n  \
        R           Restart   Q / Esc    Quit\n\n\
        Use --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Playfield width in columns (grid cells).
    #[arg(long, default_value = "16", value_name = "COLS")]
    pub width: u16,

    /// Playfield height in rows (grid cells).
    #[arg(long, default_value = "20", value_name = "ROWS")]
    pub height: u16,

    /// RNG seed for a reproducible run.
    #[arg(short, long, value_name = "N")]
    pub seed: Option<u64>,

    /// Seconds before the same direction can break again. Default 0.5.
    #[arg(long, value_name = "SECS")]
    pub break_cooldown: Option<f32>,

    /// Seconds a freeze block stops falling blocks. Default 10.
    #[arg(long, value_name = "SECS")]
    pub freeze: Option<f32>,

    /// Bomb reach in cells (square). Default 5.
    #[arg(long, value_name = "CELLS")]
    pub bomb_radius: Option<i32>,

    /// Seconds between spawned shapes. Default 0.75.
    #[arg(long, value_name = "SECS")]
    pub spawn_interval: Option<f32>,

    /// Percent chance that a spawned shape carries a power block. Default 7.
    #[arg(long, value_name = "PERCENT")]
    pub powerup_chance: Option<u32>,

    /// Largest simulation step per frame, in seconds. Default 0.05.
    #[arg(long, value_name = "SECS")]
    pub max_dt: Option<f32>,

    /// Write log records to this file (truncated on start). Nothing is logged without it.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<std::path::PathBuf>,

    /// More log detail: -v for debug, -vv for trace.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
        assert_eq!(GameConfig::default().dims(), GridDims::default());
    }

    #[test]
    fn cli_overrides_map_into_config() {
        let args = Args::parse_from([
            "blockdrop",
            "--width",
            "10",
            "--seed",
            "42",
            "--freeze",
            "3",
            "--powerup-chance",
            "50",
        ]);
        let cfg = GameConfig::from(&args);
        assert_eq!(cfg.cols, 10);
        assert_eq!(cfg.rows, 20);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.freeze_duration, 3.0);
        assert_eq!(cfg.power_tuning().freeze_duration, 3.0);
        assert_eq!(cfg.spawn_tuning().powerup_chance, 50);
        assert_eq!(cfg.break_cooldown, 0.5);
    }

    #[test]
    fn rejects_bad_values() {
        let tiny = GameConfig { cols: 2, ..GameConfig::default() };
        assert!(matches!(tiny.validate(), Err(ConfigError::GridTooSmall { .. })));

        let huge = GameConfig { cols: u16::MAX, rows: u16::MAX, ..GameConfig::default() };
        assert!(matches!(huge.validate(), Err(ConfigError::GridTooLarge { .. })));
        let tall = GameConfig { rows: GameConfig::MAX_ROWS + 1, ..GameConfig::default() };
        assert!(matches!(tall.validate(), Err(ConfigError::GridTooLarge { rows: 201, .. })));
        let widest = GameConfig {
            cols: GameConfig::MAX_COLS,
            rows: GameConfig::MAX_ROWS,
            ..GameConfig::default()
        };
        assert_eq!(widest.validate(), Ok(()));
        assert_eq!(widest.dims().cell_count(), 40_000);

        let stalled = GameConfig { spawn_interval: 0.0, ..GameConfig::default() };
        assert!(matches!(stalled.validate(), Err(ConfigError::NonPositive { .. })));

        let nan = GameConfig { max_dt: f32::NAN, ..GameConfig::default() };
        assert!(nan.validate().is_err());

        let neg = GameConfig { bomb_radius: -1, ..GameConfig::default() };
        assert!(matches!(neg.validate(), Err(ConfigError::Negative { name: "bomb radius", .. })));

        let odds = GameConfig { powerup_chance: 101, ..GameConfig::default() };
        assert_eq!(odds.validate(), Err(ConfigError::ChanceOutOfRange(101)));
    }

    #[test]
    fn log_flags() {
        let args = Args::parse_from(["blockdrop"]);
        assert_eq!(args.log_file, None);
        assert_eq!(args.log_level(), log::LevelFilter::Info);
        let args = Args::parse_from(["blockdrop", "--log-file", "run.log", "-vv"]);
        assert_eq!(args.log_file.as_deref(), Some(std::path::Path::new("run.log")));
        assert_eq!(args.log_level(), log::LevelFilter::Trace);
    }

    #[test]
    fn palette_aliases() {
        let args = Args::parse_from(["blockdrop", "--palette", "colourblind"]);
        assert_eq!(args.palette, Palette::Colorblind);
    }
}
