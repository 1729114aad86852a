/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// Structural invariants (stage size, speeds, gap geometry) are checked
/// once at startup via `validate()`; a bad value is a fatal error, never
/// a per-tick condition.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub world: WorldConfig,
    pub tick_rate_ms: u64,
    /// RNG seed for platform gap placement. None = seed from entropy.
    pub seed: Option<u64>,
}

/// Stage geometry and physics constants. Immutable for the session.
#[derive(Clone, Copy, Debug)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    pub player_w: f32,
    pub player_h: f32,
    pub player_speed: f32,
    pub gravity: f32,
    pub base_scroll_speed: f32,
    pub max_scroll_speed: f32,
    pub speed_increment: f32,
    pub platform_height: f32,
    pub platform_gap: f32,
    pub gap_margin: f32,
    pub settle_offset: f32,
    pub win_threshold: u32,
    /// Pointer control: per-axis offset from stage center below which
    /// no movement is applied.
    pub pointer_deadzone: f32,
}

impl WorldConfig {
    /// Narrowest gap any platform may carry. Always wider than the player.
    #[inline]
    pub fn min_gap_width(&self) -> f32 {
        self.player_w + self.gap_margin
    }

    /// Check structural invariants. Called once at startup.
    pub fn validate(&self) -> Result<(), String> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(format!(
                "stage size must be positive (got {}x{})",
                self.width, self.height
            ));
        }
        if self.player_w <= 0.0 || self.player_h <= 0.0 {
            return Err(format!(
                "player size must be positive (got {}x{})",
                self.player_w, self.player_h
            ));
        }
        if self.max_scroll_speed < self.base_scroll_speed {
            return Err(format!(
                "max_scroll_speed ({}) must be >= base_scroll_speed ({})",
                self.max_scroll_speed, self.base_scroll_speed
            ));
        }
        // Gap width is drawn from [min_gap_width, width/2]; the range must
        // be non-empty or platforms become impassable.
        if self.width / 2.0 < self.min_gap_width() {
            return Err(format!(
                "stage too narrow: width/2 ({}) < minimum gap width ({})",
                self.width / 2.0,
                self.min_gap_width()
            ));
        }
        if self.platform_gap <= self.player_h + self.platform_height {
            return Err(format!(
                "platform_gap ({}) must exceed player height + platform height ({})",
                self.platform_gap,
                self.player_h + self.platform_height
            ));
        }
        if self.gravity <= 0.0 {
            return Err(format!("gravity must be positive (got {})", self.gravity));
        }
        Ok(())
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    stage: TomlStage,
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    game: TomlGame,
}

#[derive(Deserialize, Debug)]
struct TomlStage {
    #[serde(default = "default_width")]
    width: f32,
    #[serde(default = "default_height")]
    height: f32,
    #[serde(default = "default_player_w")]
    player_w: f32,
    #[serde(default = "default_player_h")]
    player_h: f32,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_player_speed")]
    player_speed: f32,
    #[serde(default = "default_base_scroll")]
    base_scroll_speed: f32,
    #[serde(default = "default_max_scroll")]
    max_scroll_speed: f32,
    #[serde(default = "default_speed_increment")]
    speed_increment: f32,
    #[serde(default = "default_platform_height")]
    platform_height: f32,
    #[serde(default = "default_gap_margin")]
    gap_margin: f32,
    #[serde(default = "default_settle_offset")]
    settle_offset: f32,
    #[serde(default = "default_pointer_deadzone")]
    pointer_deadzone: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGame {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_win_threshold")]
    win_threshold: u32,
    /// Vertical platform spacing as a multiple of player height.
    #[serde(default = "default_gap_factor")]
    platform_gap_factor: f32,
    #[serde(default)]
    seed: Option<u64>,
}

// ── Defaults ──

fn default_width() -> f32 { 320.0 }
fn default_height() -> f32 { 480.0 }
fn default_player_w() -> f32 { 30.0 }
fn default_player_h() -> f32 { 30.0 }
fn default_gravity() -> f32 { 1.7 }
fn default_player_speed() -> f32 { 5.0 }
fn default_base_scroll() -> f32 { 2.0 }
fn default_max_scroll() -> f32 { 10.0 }
fn default_speed_increment() -> f32 { 0.1 }
fn default_platform_height() -> f32 { 10.0 }
fn default_gap_margin() -> f32 { 10.0 }
fn default_settle_offset() -> f32 { 2.0 }
fn default_pointer_deadzone() -> f32 { 20.0 }
fn default_tick_rate() -> u64 { 33 }
fn default_win_threshold() -> u32 { 100_000 }
fn default_gap_factor() -> f32 { 1.7 }

impl Default for TomlStage {
    fn default() -> Self {
        TomlStage {
            width: default_width(),
            height: default_height(),
            player_w: default_player_w(),
            player_h: default_player_h(),
        }
    }
}

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            gravity: default_gravity(),
            player_speed: default_player_speed(),
            base_scroll_speed: default_base_scroll(),
            max_scroll_speed: default_max_scroll(),
            speed_increment: default_speed_increment(),
            platform_height: default_platform_height(),
            gap_margin: default_gap_margin(),
            settle_offset: default_settle_offset(),
            pointer_deadzone: default_pointer_deadzone(),
        }
    }
}

impl Default for TomlGame {
    fn default() -> Self {
        TomlGame {
            tick_rate_ms: default_tick_rate(),
            win_threshold: default_win_threshold(),
            platform_gap_factor: default_gap_factor(),
            seed: None,
        }
    }
}

// ── Loading ──

fn build_config(toml_cfg: TomlConfig) -> GameConfig {
    GameConfig {
        world: WorldConfig {
            width: toml_cfg.stage.width,
            height: toml_cfg.stage.height,
            player_w: toml_cfg.stage.player_w,
            player_h: toml_cfg.stage.player_h,
            player_speed: toml_cfg.physics.player_speed,
            gravity: toml_cfg.physics.gravity,
            base_scroll_speed: toml_cfg.physics.base_scroll_speed,
            max_scroll_speed: toml_cfg.physics.max_scroll_speed,
            speed_increment: toml_cfg.physics.speed_increment,
            platform_height: toml_cfg.physics.platform_height,
            platform_gap: toml_cfg.stage.player_h * toml_cfg.game.platform_gap_factor,
            gap_margin: toml_cfg.physics.gap_margin,
            settle_offset: toml_cfg.physics.settle_offset,
            win_threshold: toml_cfg.game.win_threshold,
            pointer_deadzone: toml_cfg.physics.pointer_deadzone,
        },
        tick_rate_ms: toml_cfg.game.tick_rate_ms,
        seed: toml_cfg.game.seed,
    }
}

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        build_config(load_toml(&candidate_dirs()))
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        build_config(TomlConfig::default())
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        log::warn!("config.toml parse error: {e}; using defaults");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    log::warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = GameConfig::default();
        assert!(cfg.world.validate().is_ok());
    }

    #[test]
    fn default_min_gap_exceeds_player() {
        let w = GameConfig::default().world;
        assert!(w.min_gap_width() > w.player_w);
    }

    #[test]
    fn narrow_stage_is_rejected() {
        let mut w = GameConfig::default().world;
        // width/2 must cover the minimum gap width
        w.width = 70.0;
        assert!(w.validate().is_err());
    }

    #[test]
    fn inverted_speed_bounds_rejected() {
        let mut w = GameConfig::default().world;
        w.max_scroll_speed = 1.0;
        assert!(w.validate().is_err());
    }

    #[test]
    fn zero_stage_rejected() {
        let mut w = GameConfig::default().world;
        w.height = 0.0;
        assert!(w.validate().is_err());
    }

    #[test]
    fn toml_partial_fills_defaults() {
        let cfg: TomlConfig = toml::from_str("[physics]\ngravity = 2.5\n").unwrap();
        assert_eq!(cfg.physics.gravity, 2.5);
        assert_eq!(cfg.stage.width, 320.0);
        assert_eq!(cfg.game.win_threshold, 100_000);
    }
}
