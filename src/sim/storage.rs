/// Local persistence for the profile, leaderboard and settings.
///
/// ## Layout
///
///   <data dir>/profile.json
///   <data dir>/leaderboard.json
///   <data dir>/settings.json
///
/// Each document carries a `version` field. Loading never fails: a missing
/// file yields defaults, a corrupt one yields defaults plus a warning.
/// Writes go to a `.tmp` sibling first and are renamed into place.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::GameId;

pub const SCHEMA_VERSION: u32 = 1;
pub const LEADERBOARD_CAP: usize = 100;

const PROFILE_FILE: &str = "profile.json";
const LEADERBOARD_FILE: &str = "leaderboard.json";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no writable data directory")]
    NoDataDir,
}

// ══════════════════════════════════════════════════════════════
// Documents
// ══════════════════════════════════════════════════════════════

fn schema_version() -> u32 {
    SCHEMA_VERSION
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    #[serde(default = "schema_version")]
    pub version: u32,
    pub username: String,
    pub join_date: NaiveDate,
    /// Higher is better.
    pub best_scores: BTreeMap<GameId, u32>,
    /// Lower is better. Memory in seconds, reaction test in milliseconds.
    pub best_times: BTreeMap<GameId, u32>,
    pub games_played: u32,
    pub total_score: u32,
}

impl Default for Profile {
    fn default() -> Self {
        Profile {
            version: SCHEMA_VERSION,
            username: String::from("Player"),
            join_date: Local::now().date_naive(),
            best_scores: BTreeMap::new(),
            best_times: BTreeMap::new(),
            games_played: 0,
            total_score: 0,
        }
    }
}

impl Profile {
    /// Returns true when `score` is a new personal best.
    pub fn record_score(&mut self, game: GameId, score: u32) -> bool {
        let improved = self.best_scores.get(&game).map_or(true, |&best| score > best);
        if improved {
            self.best_scores.insert(game, score);
            self.total_score = self.best_scores.values().sum();
        }
        improved
    }

    /// Returns true when `value` is a new best (lowest) time.
    pub fn record_time(&mut self, game: GameId, value: u32) -> bool {
        let improved = self.best_times.get(&game).map_or(true, |&best| value < best);
        if improved {
            self.best_times.insert(game, value);
        }
        improved
    }

    pub fn best_score(&self, game: GameId) -> Option<u32> {
        self.best_scores.get(&game).copied()
    }

    pub fn best_time(&self, game: GameId) -> Option<u32> {
        self.best_times.get(&game).copied()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_name: String,
    pub score: u32,
    pub game: GameId,
    pub date: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Leaderboard {
    #[serde(default = "schema_version")]
    pub version: u32,
    pub entries: Vec<LeaderboardEntry>,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Leaderboard { version: SCHEMA_VERSION, entries: Vec::new() }
    }
}

impl Leaderboard {
    /// Insert keeping descending score order. Equal scores keep insertion
    /// order, so a newcomer ranks below existing ties.
    pub fn push(&mut self, entry: LeaderboardEntry) {
        self.entries.push(entry);
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(LEADERBOARD_CAP);
    }

    pub fn filtered(&self, game: Option<GameId>) -> impl Iterator<Item = &LeaderboardEntry> {
        self.entries.iter().filter(move |e| game.map_or(true, |g| e.game == g))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyScheme {
    Wasd,
    Arrows,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(default = "schema_version")]
    pub version: u32,
    pub theme: Theme,
    pub show_hints: bool,
    pub confirm_exit: bool,
    pub auto_save: bool,
    pub key_scheme: KeyScheme,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: SCHEMA_VERSION,
            theme: Theme::Dark,
            show_hints: true,
            confirm_exit: true,
            auto_save: true,
            key_scheme: KeyScheme::Arrows,
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Data directory
// ══════════════════════════════════════════════════════════════

/// Resolve where documents and the log live. An explicit override wins;
/// otherwise the executable's directory if writable, then
/// `~/.local/share/pocket-arcade`, then the working directory.
pub fn data_dir(override_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = override_dir {
        if std::fs::create_dir_all(dir).is_ok() {
            return dir.to_path_buf();
        }
    }

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            let probe = parent.join(".write_test_pocket_arcade");
            if std::fs::write(&probe, "").is_ok() {
                let _ = std::fs::remove_file(&probe);
                return parent.to_path_buf();
            }
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/pocket-arcade");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

// ══════════════════════════════════════════════════════════════
// Storage service
// ══════════════════════════════════════════════════════════════

pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Storage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load<T: DeserializeOwned + Default>(&self, file: &str) -> T {
        let path = self.dir.join(file);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no document yet, using defaults");
                return T::default();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable document, using defaults");
                return T::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt document, using defaults");
                T::default()
            }
        }
    }

    fn save<T: Serialize>(&self, file: &str, doc: &T) -> Result<(), StorageError> {
        if !self.dir.is_dir() {
            return Err(StorageError::NoDataDir);
        }
        let path = self.dir.join(file);
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(doc)?;
        std::fs::write(&tmp, data).map_err(|source| StorageError::Io { path: tmp.clone(), source })?;
        std::fs::rename(&tmp, &path).map_err(|source| StorageError::Io { path: path.clone(), source })?;
        debug!(path = %path.display(), "saved");
        Ok(())
    }

    pub fn load_profile(&self) -> Profile {
        self.load(PROFILE_FILE)
    }

    pub fn save_profile(&self, profile: &Profile) -> Result<(), StorageError> {
        self.save(PROFILE_FILE, profile)
    }

    pub fn load_leaderboard(&self) -> Leaderboard {
        let mut board: Leaderboard = self.load(LEADERBOARD_FILE);
        // Hand-edited files may be out of order or oversized.
        board.entries.sort_by(|a, b| b.score.cmp(&a.score));
        board.entries.truncate(LEADERBOARD_CAP);
        board
    }

    pub fn save_leaderboard(&self, board: &Leaderboard) -> Result<(), StorageError> {
        self.save(LEADERBOARD_FILE, board)
    }

    pub fn load_settings(&self) -> Settings {
        self.load(SETTINGS_FILE)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        self.save(SETTINGS_FILE, settings)
    }
}

// ══════════════════════════════════════════════════════════════
// Records: the in-memory documents plus their storage
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Recorded {
    /// `auto_save` is off; nothing was touched.
    Skipped,
    Saved { new_best: bool },
}

pub struct Records {
    pub storage: Storage,
    pub profile: Profile,
    pub leaderboard: Leaderboard,
    pub settings: Settings,
}

impl Records {
    pub fn load(storage: Storage) -> Self {
        Records {
            profile: storage.load_profile(),
            leaderboard: storage.load_leaderboard(),
            settings: storage.load_settings(),
            storage,
        }
    }

    /// A finished game. A score pushes a leaderboard entry and may raise the best
    /// score; a time keeps the lower best time. The game counts once either way.
    pub fn record_result(
        &mut self,
        game: GameId,
        score: Option<u32>,
        time: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<Recorded, StorageError> {
        if !self.settings.auto_save {
            return Ok(Recorded::Skipped);
        }
        let mut new_best = false;
        if let Some(score) = score {
            self.leaderboard.push(LeaderboardEntry {
                player_name: self.profile.username.clone(),
                score,
                game,
                date: now,
            });
            new_best |= self.profile.record_score(game, score);
        }
        if let Some(time) = time {
            new_best |= self.profile.record_time(game, time);
        }
        self.profile.games_played += 1;

        // Both documents are written even when the first write fails.
        let profile = self.storage.save_profile(&self.profile);
        let leaderboard = match score {
            Some(_) => self.storage.save_leaderboard(&self.leaderboard),
            None => Ok(()),
        };
        profile.and(leaderboard)?;
        Ok(Recorded::Saved { new_best })
    }

    pub fn rename(&mut self, username: &str) -> Result<(), StorageError> {
        self.profile.username = username.to_string();
        self.storage.save_profile(&self.profile)
    }

    pub fn save_settings(&self) -> Result<(), StorageError> {
        self.storage.save_settings(&self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn entry(name: &str, score: u32) -> LeaderboardEntry {
        LeaderboardEntry { player_name: name.into(), score, game: GameId::Snake, date: at(0) }
    }

    #[test]
    fn missing_files_yield_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let records = Records::load(Storage::new(dir.path()));
        assert_eq!(records.profile.username, "Player");
        assert!(records.leaderboard.entries.is_empty());
        assert_eq!(records.settings, Settings::default());
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{ not json").unwrap();
        let storage = Storage::new(dir.path());
        assert_eq!(storage.load_settings(), Settings::default());
    }

    #[test]
    fn partial_document_fills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), r#"{"theme":"light"}"#).unwrap();
        let s = Storage::new(dir.path()).load_settings();
        assert_eq!(s.theme, Theme::Light);
        assert!(s.auto_save);
        assert_eq!(s.version, SCHEMA_VERSION);
    }

    #[test]
    fn profile_survives_a_save() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let mut p = Profile::default();
        p.username = "ada".into();
        p.record_score(GameId::Tetris, 1200);
        p.record_time(GameId::Reaction, 215);
        storage.save_profile(&p).unwrap();
        assert_eq!(storage.load_profile(), p);
        assert!(!dir.path().join("profile.json.tmp").exists());
    }

    #[test]
    fn game_keys_are_map_keys_on_disk() {
        let mut p = Profile::default();
        p.record_score(GameId::RopeBridge, 3);
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains(r#""best_scores":{"ropebridge":3}"#));
    }

    #[test]
    fn save_without_directory_errors() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().join("gone"));
        assert!(matches!(storage.save_settings(&Settings::default()), Err(StorageError::NoDataDir)));
    }

    #[test]
    fn best_score_only_rises_and_total_follows() {
        let mut p = Profile::default();
        assert!(p.record_score(GameId::Snake, 50));
        assert!(!p.record_score(GameId::Snake, 30));
        assert!(p.record_score(GameId::Quiz, 6));
        assert_eq!(p.best_score(GameId::Snake), Some(50));
        assert_eq!(p.total_score, 56);
    }

    #[test]
    fn best_time_only_falls() {
        let mut p = Profile::default();
        assert!(p.record_time(GameId::Memory, 40));
        assert!(!p.record_time(GameId::Memory, 55));
        assert!(p.record_time(GameId::Memory, 31));
        assert_eq!(p.best_time(GameId::Memory), Some(31));
    }

    #[test]
    fn leaderboard_sorted_stable_and_capped() {
        let mut board = Leaderboard::default();
        board.push(entry("a", 10));
        board.push(entry("b", 30));
        board.push(entry("c", 10));
        let names: Vec<_> = board.entries.iter().map(|e| e.player_name.as_str()).collect();
        assert_eq!(names, ["b", "a", "c"]);

        for i in 0..150 {
            board.push(entry("x", i));
        }
        assert_eq!(board.entries.len(), LEADERBOARD_CAP);
        assert_eq!(board.entries[0].score, 149);
        assert!(board.entries.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn leaderboard_filter_by_game() {
        let mut board = Leaderboard::default();
        board.push(entry("a", 10));
        board.push(LeaderboardEntry { game: GameId::Quiz, ..entry("q", 5) });
        assert_eq!(board.filtered(None).count(), 2);
        assert_eq!(board.filtered(Some(GameId::Quiz)).count(), 1);
    }

    #[test]
    fn recorded_score_persists_both_documents() {
        let dir = tempfile::tempdir().unwrap();
        let mut records = Records::load(Storage::new(dir.path()));
        assert_eq!(
            records.record_result(GameId::Snake, Some(40), None, at(1)).unwrap(),
            Recorded::Saved { new_best: true }
        );
        assert_eq!(
            records.record_result(GameId::Snake, Some(20), None, at(2)).unwrap(),
            Recorded::Saved { new_best: false }
        );
        let reloaded = Records::load(Storage::new(dir.path()));
        assert_eq!(reloaded.profile.games_played, 2);
        assert_eq!(reloaded.profile.best_score(GameId::Snake), Some(40));
        assert_eq!(reloaded.leaderboard.entries.len(), 2);
        assert_eq!(reloaded.leaderboard.entries[0].date, at(1));
    }

    #[test]
    fn score_and_time_count_one_game() {
        let dir = tempfile::tempdir().unwrap();
        let mut records = Records::load(Storage::new(dir.path()));
        records.record_result(GameId::Reaction, Some(780), Some(220), at(0)).unwrap();
        assert_eq!(records.profile.games_played, 1);
        assert_eq!(records.profile.best_time(GameId::Reaction), Some(220));
        assert_eq!(records.profile.best_score(GameId::Reaction), Some(780));
    }

    #[test]
    fn failed_profile_save_still_writes_leaderboard() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("profile.json.tmp")).unwrap();
        let mut records = Records::load(Storage::new(dir.path()));
        let err = records.record_result(GameId::Snake, Some(40), None, at(1)).unwrap_err();
        assert!(err.to_string().contains("profile.json"));
        assert_eq!(records.profile.games_played, 1);

        let reloaded = Records::load(Storage::new(dir.path()));
        assert_eq!(reloaded.leaderboard.entries.len(), 1);
        assert_eq!(reloaded.leaderboard.entries[0].score, 40);
        assert!(!dir.path().join(PROFILE_FILE).exists());
    }

    #[test]
    fn auto_save_off_skips_recording() {
        let dir = tempfile::tempdir().unwrap();
        let mut records = Records::load(Storage::new(dir.path()));
        records.settings.auto_save = false;
        assert_eq!(records.record_result(GameId::Tetris, Some(900), None, at(0)).unwrap(), Recorded::Skipped);
        assert_eq!(records.profile.games_played, 0);
        assert!(records.leaderboard.entries.is_empty());
        assert!(!dir.path().join(PROFILE_FILE).exists());
    }
}
