// Core game logic and configuration management
// Handles grid generation, cursor movement, game state transitions, and configuration persistence

use chrono::Local;
use directories::ProjectDirs;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Reference board size (both dimensions)
pub const DEFAULT_SIDE: usize = 20;
/// Largest accepted value for `rows` / `cols` in the config file
pub const MAX_SIDE: usize = 200;
/// Lower bound for the logger polling interval
pub const MIN_POLL_MS: u64 = 10;

/// Kind of a single tile on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    Safe,
    Mine,
    Bonus, // Cosmetic only, walks like Safe
}

/// Tile distribution presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Classic, // 70% Safe, 30% Mine
    Bonus,   // 60% Safe, the rest split 10/90 into Bonus/Mine
}

impl Serialize for Variant {
    /// Serialize variant as its name so the config stays readable
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Variant {
    fn deserialize<D>(deserializer: D) -> Result<Variant, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            x if x.eq_ignore_ascii_case(Variant::Classic.name()) => Ok(Variant::Classic),
            x if x.eq_ignore_ascii_case(Variant::Bonus.name()) => Ok(Variant::Bonus),
            _ => Err(serde::de::Error::custom("unknown variant")),
        }
    }
}

impl Variant {
    /// Config file identifier, keep stable across versions
    pub fn name(&self) -> &'static str {
        match self {
            Variant::Classic => "Classic",
            Variant::Bonus => "Bonus",
        }
    }

    /// Draw one non-spawn tile
    fn draw<R: Rng>(&self, rng: &mut R) -> TileKind {
        let p: u32 = rng.gen_range(0..100);
        match self {
            Variant::Classic => {
                if p < 70 { TileKind::Safe } else { TileKind::Mine }
            }
            Variant::Bonus => {
                if p < 60 {
                    return TileKind::Safe;
                }
                let q: u32 = rng.gen_range(0..100);
                if q < 10 { TileKind::Bonus } else { TileKind::Mine }
            }
        }
    }
}

/// Fixed-size row-major tile grid
#[derive(Debug, Clone)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    tiles: Vec<TileKind>,
}

impl Grid {
    /// Build a grid from independent per-cell draws
    /// Cell 0 is the spawn cell and is always Safe
    pub fn generate<R: Rng>(rows: usize, cols: usize, variant: Variant, rng: &mut R) -> Self {
        let n = rows * cols;
        let mut tiles = Vec::with_capacity(n);
        if n > 0 {
            tiles.push(TileKind::Safe);
        }
        for _ in 1..n {
            tiles.push(variant.draw(rng));
        }
        Grid { rows, cols, tiles }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn tile(&self, index: usize) -> TileKind {
        self.tiles[index]
    }

    /// Convert (row, col) to flat array index
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    #[cfg(test)]
    fn from_tiles(rows: usize, cols: usize, tiles: Vec<TileKind>) -> Self {
        assert_eq!(tiles.len(), rows * cols);
        Grid { rows, cols, tiles }
    }
}

/// Seed the process-wide generator once from the wall clock (second granularity)
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    let seed = seed.unwrap_or_else(|| Local::now().timestamp().unsigned_abs());
    StdRng::seed_from_u64(seed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Player intents produced by the key mapping in the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Move(Direction),
    Quit,
}

/// Game lifecycle; GameOver and Quit are terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    GameOver,
    Quit,
}

/// Main game state, exclusively owned by the render loop
#[derive(Debug, Clone)]
pub struct Game {
    pub grid: Grid,
    pub cursor: usize, // Flat index of the player
    pub state: State,
}

impl Game {
    pub fn new(grid: Grid) -> Self {
        Game {
            grid,
            cursor: 0,
            state: State::Running,
        }
    }

    /// Cursor index after a move, or None when the move would leave the grid
    /// Left/Right never wrap into the neighbouring row
    pub fn step(&self, dir: Direction) -> Option<usize> {
        let c = self.cursor;
        let cols = self.grid.cols;
        match dir {
            Direction::Up => c.checked_sub(cols),
            Direction::Down => Some(c + cols).filter(|&n| n < self.grid.len()),
            Direction::Left => (c % cols > 0).then(|| c - 1),
            Direction::Right => (c % cols < cols - 1).then(|| c + 1),
        }
    }

    /// Apply one input and return the resulting state
    /// Out-of-bounds moves are ignored; nothing changes once the game has ended
    pub fn apply(&mut self, input: Input) -> State {
        if self.state != State::Running {
            return self.state;
        }
        match input {
            Input::Quit => self.state = State::Quit,
            Input::Move(dir) => {
                if let Some(next) = self.step(dir) {
                    self.cursor = next;
                }
                if self.grid.tile(self.cursor) == TileKind::Mine {
                    self.state = State::GameOver;
                }
            }
        }
        self.state
    }
}

/// User configuration
/// Persisted to disk as TOML
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    // Board
    pub rows: usize,
    pub cols: usize,
    pub variant: Variant,
    pub seed: Option<u64>, // Fixed seed for a reproducible board; clock when absent

    // Position log
    pub log_path: String,
    pub poll_interval_ms: u64,

    // Preferences
    pub monochrome: bool, // Glyphs and reverse video only, no colors
    pub language: String, // Language code ("en" or "zh")
}

impl Default for Config {
    fn default() -> Self {
        // Auto-detect system language on first run
        let system_lang = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
        let lang = if system_lang.to_lowercase().starts_with("zh") {
            "zh".to_string()
        } else {
            "en".to_string()
        };

        Config {
            rows: DEFAULT_SIDE,
            cols: DEFAULT_SIDE,
            variant: Variant::Bonus,
            seed: None,
            log_path: "log.log".to_string(),
            poll_interval_ms: 1000,
            monochrome: false,
            language: lang,
        }
    }
}

impl Config {
    /// Clamp hand-edited values back into a playable range
    pub fn normalize(&mut self) {
        for side in [&mut self.rows, &mut self.cols] {
            if *side == 0 || *side > MAX_SIDE {
                *side = DEFAULT_SIDE;
            }
        }
        self.poll_interval_ms = self.poll_interval_ms.max(MIN_POLL_MS);
        if self.log_path.trim().is_empty() {
            self.log_path = "log.log".to_string();
        }
    }
}

/// Get the configuration file path
/// Uses platform-specific config directory (e.g., ~/.config/zerordead/zerordead.toml on Linux)
/// Falls back to current directory if ProjectDirs is unavailable
pub fn config_path() -> Option<PathBuf> {
    if let Ok(exe) = env::current_exe() {
        if let Some(name) = exe.file_stem().and_then(|s| s.to_str()) {
            if let Some(proj) = ProjectDirs::from("com", "xhbl", name) {
                let mut path = proj.config_dir().to_path_buf();
                path.push(format!("{}.toml", name));
                return Some(path);
            } else if let Ok(mut path) = env::current_dir() {
                path.push(format!("{}.toml", name));
                return Some(path);
            }
        }
    }
    None
}

/// Parse a config document, None if it is not valid TOML for this schema
pub fn parse_config(s: &str) -> Option<Config> {
    let mut cfg = toml::from_str::<Config>(s).ok()?;
    cfg.normalize();
    Some(cfg)
}

/// Load configuration from disk, or create default if not found
pub fn load_or_create_config() -> Config {
    if let Some(path) = config_path() {
        if path.exists() {
            if let Some(cfg) = fs::read_to_string(&path).ok().and_then(|s| parse_config(&s)) {
                return cfg;
            }
        }
        let cfg = Config::default();
        if let Ok(s) = toml::to_string(&cfg) {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = fs::write(&path, s);
        }
        return cfg;
    }
    Config::default()
}
