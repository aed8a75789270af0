/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD or the XDG
/// data directory. Missing files or keys fall back to defaults; a broken
/// file is reported to the caller, which logs it once logging is up.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub gamepad: GamepadConfig,
    /// Explicit data directory; `None` means auto-detect.
    pub data_dir: Option<PathBuf>,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub tick_rate_ms: u64,
    pub snake_step_ms: u64,
    pub ai_think_ms: u64,
    pub card_reveal_ms: u64,
    pub rps_reveal_ms: u64,
    pub quiz_seconds: u64,
    /// How long status messages stay up, in ticks.
    pub message_ticks: u32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub action: Vec<String>,
    pub restart: Vec<String>,
    pub pause: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not valid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_snake_step")]
    snake_step_ms: u64,
    #[serde(default = "default_ai_think")]
    ai_think_ms: u64,
    #[serde(default = "default_card_reveal")]
    card_reveal_ms: u64,
    #[serde(default = "default_rps_reveal")]
    rps_reveal_ms: u64,
    #[serde(default = "default_quiz_seconds")]
    quiz_seconds: u64,
    #[serde(default = "default_message_ticks")]
    message_ticks: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_action")]
    action: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    data_dir: Option<String>,
    #[serde(default = "default_log_filter")]
    log_filter: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 50 }
fn default_snake_step() -> u64 { 150 }
fn default_ai_think() -> u64 { 500 }
fn default_card_reveal() -> u64 { 1000 }
fn default_rps_reveal() -> u64 { 1000 }
fn default_quiz_seconds() -> u64 { 30 }
fn default_message_ticks() -> u32 { 40 }   // 2s at 50ms

fn default_confirm() -> Vec<String> { vec!["A".into()] }
fn default_cancel() -> Vec<String> { vec!["B".into(), "Select".into()] }
fn default_action() -> Vec<String> { vec!["X".into()] }
fn default_restart() -> Vec<String> { vec!["Y".into()] }
fn default_pause() -> Vec<String> { vec!["Start".into()] }
fn default_log_filter() -> String { "info".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            snake_step_ms: default_snake_step(),
            ai_think_ms: default_ai_think(),
            card_reveal_ms: default_card_reveal(),
            rps_reveal_ms: default_rps_reveal(),
            quiz_seconds: default_quiz_seconds(),
            message_ticks: default_message_ticks(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            cancel: default_cancel(),
            action: default_action(),
            restart: default_restart(),
            pause: default_pause(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            data_dir: None,
            log_filter: default_log_filter(),
        }
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

impl GameConfig {
    /// Load config from the first `config.toml` found in the candidate dirs.
    /// A broken file yields defaults plus the error that caused it.
    pub fn load() -> (Self, Option<ConfigError>) {
        match load_toml(&candidate_dirs()) {
            Ok(cfg) => (cfg, None),
            Err(e) => (GameConfig::default(), Some(e)),
        }
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(GameConfig::from_toml)
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        GameConfig {
            timing: TimingConfig {
                // A zero tick would spin the loop.
                tick_rate_ms: cfg.timing.tick_rate_ms.max(1),
                snake_step_ms: cfg.timing.snake_step_ms.max(1),
                ai_think_ms: cfg.timing.ai_think_ms,
                card_reveal_ms: cfg.timing.card_reveal_ms,
                rps_reveal_ms: cfg.timing.rps_reveal_ms,
                quiz_seconds: cfg.timing.quiz_seconds.max(1),
                message_ticks: cfg.timing.message_ticks,
            },
            gamepad: GamepadConfig {
                confirm: cfg.gamepad.confirm,
                cancel: cfg.gamepad.cancel,
                action: cfg.gamepad.action,
                restart: cfg.gamepad.restart,
                pause: cfg.gamepad.pause,
            },
            data_dir: cfg.general.data_dir.filter(|d| !d.is_empty()).map(PathBuf::from),
            log_filter: cfg.general.log_filter,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/pocket-arcade)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/pocket-arcade");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn load_toml(search_dirs: &[PathBuf]) -> Result<GameConfig, ConfigError> {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
            return GameConfig::parse(&text).map_err(|source| ConfigError::Parse { path, source });
        }
    }
    Ok(GameConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::parse("").unwrap();
        assert_eq!(cfg.timing.tick_rate_ms, 50);
        assert_eq!(cfg.timing.quiz_seconds, 30);
        assert_eq!(cfg.gamepad.pause, vec!["Start".to_string()]);
        assert_eq!(cfg.data_dir, None);
        assert_eq!(cfg.log_filter, "info");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::parse(
            "[timing]\nsnake_step_ms = 90\n\n[general]\ndata_dir = \"/tmp/arcade\"\nlog_filter = \"debug\"\n",
        )
        .unwrap();
        assert_eq!(cfg.timing.snake_step_ms, 90);
        assert_eq!(cfg.timing.ai_think_ms, 500);
        assert_eq!(cfg.data_dir, Some(PathBuf::from("/tmp/arcade")));
        assert_eq!(cfg.log_filter, "debug");
    }

    #[test]
    fn zero_tick_is_clamped() {
        let cfg = GameConfig::parse("[timing]\ntick_rate_ms = 0\n").unwrap();
        assert_eq!(cfg.timing.tick_rate_ms, 1);
    }

    #[test]
    fn broken_file_is_an_error() {
        assert!(GameConfig::parse("[timing\n").is_err());
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "tick = [").unwrap();
        let err = load_toml(&[dir.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn load_reads_first_dir_with_a_file() {
        let empty = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[timing]\nquiz_seconds = 12\n").unwrap();
        let cfg = load_toml(&[empty.path().to_path_buf(), dir.path().to_path_buf()]).unwrap();
        assert_eq!(cfg.timing.quiz_seconds, 12);
        assert_eq!(cfg.timing.tick_rate_ms, 50);

        let none = load_toml(&[empty.path().to_path_buf()]).unwrap();
        assert_eq!(none.timing.quiz_seconds, 30);
    }
}
