//! Engine configuration: rating constants, format defaults, rotation timing and scheduling buffers.
//!
//! Every field has a default, so a partial JSON document (or none at all) is valid.
//! Environment overrides: `PTE_K_FACTOR`, `PTE_COURT_BUFFER`, `PTE_PLAYER_BUFFER`, `PTE_MATCH_MINUTES`.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub rating: RatingConfig,
    #[serde(default)]
    pub formats: FormatConfig,
    #[serde(default)]
    pub rotation: RotationConfig,
    #[serde(default)]
    pub scheduling: ScheduleConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rating: RatingConfig::default(),
            formats: FormatConfig::default(),
            rotation: RotationConfig::default(),
            scheduling: ScheduleConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingConfig {
    #[serde(default = "default_k_factor")]
    pub k_factor: f64,
    #[serde(default = "default_rating")]
    pub default_rating: i32,
    /// Also maintain Category-scope rows (Tournament and Global are always updated).
    #[serde(default)]
    pub track_category_scope: bool,
    #[serde(default)]
    pub rate_walkovers: bool,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            k_factor: default_k_factor(),
            default_rating: default_rating(),
            track_category_scope: false,
            rate_walkovers: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormatConfig {
    #[serde(default = "default_bracket_best_of")]
    pub bracket_best_of: u8,
    #[serde(default = "default_grand_final_best_of")]
    pub grand_final_best_of: u8,
    #[serde(default = "default_bracket_best_of")]
    pub round_robin_best_of: u8,
    #[serde(default = "default_americano_best_of")]
    pub americano_best_of: u8,
    #[serde(default = "default_group_size")]
    pub group_size: usize,
    #[serde(default = "default_qualifiers")]
    pub playoff_qualifiers_per_group: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            bracket_best_of: default_bracket_best_of(),
            grand_final_best_of: default_grand_final_best_of(),
            round_robin_best_of: default_bracket_best_of(),
            americano_best_of: default_americano_best_of(),
            group_size: default_group_size(),
            playoff_qualifiers_per_group: default_qualifiers(),
        }
    }
}

/// Americano/Mexicano timing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Per-match duration. Mexicano accepts 5..=30.
    #[serde(default = "default_match_minutes")]
    pub match_minutes: u32,
    #[serde(default = "default_rotation_buffer")]
    pub rotation_buffer_minutes: u32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            match_minutes: default_match_minutes(),
            rotation_buffer_minutes: default_rotation_buffer(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_best_of_1_minutes")]
    pub best_of_1_minutes: u32,
    #[serde(default = "default_best_of_3_minutes")]
    pub best_of_3_minutes: u32,
    #[serde(default = "default_best_of_5_minutes")]
    pub best_of_5_minutes: u32,
    /// Gap kept on a court between two matches.
    #[serde(default = "default_court_buffer")]
    pub court_buffer_minutes: u32,
    /// Rest a player gets between two matches.
    #[serde(default = "default_player_buffer")]
    pub player_buffer_minutes: u32,
    #[serde(default = "default_optimized_court_buffer")]
    pub optimized_court_buffer_minutes: u32,
    #[serde(default = "default_optimized_player_buffer")]
    pub optimized_player_buffer_minutes: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            best_of_1_minutes: default_best_of_1_minutes(),
            best_of_3_minutes: default_best_of_3_minutes(),
            best_of_5_minutes: default_best_of_5_minutes(),
            court_buffer_minutes: default_court_buffer(),
            player_buffer_minutes: default_player_buffer(),
            optimized_court_buffer_minutes: default_optimized_court_buffer(),
            optimized_player_buffer_minutes: default_optimized_player_buffer(),
        }
    }
}

impl ScheduleConfig {
    /// Estimated length of a best-of-`n` match.
    pub fn duration_for_best_of(&self, best_of: u8) -> u32 {
        match best_of {
            1 => self.best_of_1_minutes,
            3 => self.best_of_3_minutes,
            5 => self.best_of_5_minutes,
            n => u32::from(n.max(1)) * self.best_of_1_minutes,
        }
    }

    /// Same durations with the tighter buffers used by schedule optimization.
    pub fn tightened(&self) -> Self {
        Self {
            court_buffer_minutes: self.optimized_court_buffer_minutes,
            player_buffer_minutes: self.optimized_player_buffer_minutes,
            ..self.clone()
        }
    }
}

fn default_k_factor() -> f64 {
    24.0
}

fn default_rating() -> i32 {
    crate::models::DEFAULT_RATING
}

fn default_bracket_best_of() -> u8 {
    3
}

fn default_grand_final_best_of() -> u8 {
    5
}

fn default_americano_best_of() -> u8 {
    1
}

fn default_group_size() -> usize {
    4
}

fn default_qualifiers() -> usize {
    2
}

fn default_match_minutes() -> u32 {
    20
}

fn default_rotation_buffer() -> u32 {
    5
}

fn default_best_of_1_minutes() -> u32 {
    30
}

fn default_best_of_3_minutes() -> u32 {
    60
}

fn default_best_of_5_minutes() -> u32 {
    90
}

fn default_court_buffer() -> u32 {
    10
}

fn default_player_buffer() -> u32 {
    30
}

fn default_optimized_court_buffer() -> u32 {
    5
}

fn default_optimized_player_buffer() -> u32 {
    15
}

impl EngineConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config: {}", e))?;
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Defaults, overridden by any `PTE_*` variables that parse.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(k) = env_parse::<f64>("PTE_K_FACTOR") {
            config.rating.k_factor = k;
        }
        if let Some(buffer) = env_parse::<u32>("PTE_COURT_BUFFER") {
            config.scheduling.court_buffer_minutes = buffer;
        }
        if let Some(buffer) = env_parse::<u32>("PTE_PLAYER_BUFFER") {
            config.scheduling.player_buffer_minutes = buffer;
        }
        if let Some(minutes) = env_parse::<u32>("PTE_MATCH_MINUTES") {
            config.rotation.match_minutes = minutes;
        }
        config
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
