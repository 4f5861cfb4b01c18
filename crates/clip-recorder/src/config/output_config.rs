use crate::config::default_output_directory;

use clip_recorder_core::ConflictPolicy;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What to do when `recording.wav` already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSetting {
    /// Write `recording (1).wav`, `recording (2).wav`, ...
    #[default]
    Rename,
    /// Replace the existing file.
    Overwrite,
}

impl From<ConflictSetting> for ConflictPolicy {
    fn from(setting: ConflictSetting) -> Self {
        match setting {
            ConflictSetting::Rename => ConflictPolicy::Rename,
            ConflictSetting::Overwrite => ConflictPolicy::Overwrite,
        }
    }
}

/// Where saved recordings go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Target directory for `recording.wav`.
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,

    /// Naming policy when the file exists.
    #[serde(default)]
    pub on_conflict: ConflictSetting,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            on_conflict: ConflictSetting::default(),
        }
    }
}
