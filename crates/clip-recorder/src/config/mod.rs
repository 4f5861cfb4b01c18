mod behaviour_config;
mod capture_config;
#[allow(clippy::module_inception)]
mod config;
mod output_config;

pub(crate) use {
    behaviour_config::BehaviourConfig, capture_config::CaptureConfig, config::Config,
    output_config::OutputConfig,
};

#[cfg(test)]
pub(crate) use {capture_config::CaptureSourceSetting, output_config::ConflictSetting};

use std::path::PathBuf;

use directories::UserDirs;

pub(crate) const DEFAULT_CHUNK_INTERVAL_MS: u64 = 1000;
/// Longest accepted chunk interval (ten minutes).
pub(crate) const MAX_CHUNK_INTERVAL_MS: u64 = 600_000;
pub(crate) const DEFAULT_CONFIRM_DISCARD_UNSAVED: bool = false;

pub(crate) fn default_chunk_interval_ms() -> u64 {
    DEFAULT_CHUNK_INTERVAL_MS
}

pub(crate) fn default_confirm_discard_unsaved() -> bool {
    DEFAULT_CONFIRM_DISCARD_UNSAVED
}

/// The user's download folder, falling back to home, then the working
/// directory.
pub(crate) fn default_output_directory() -> PathBuf {
    UserDirs::new()
        .and_then(|dirs| {
            dirs.download_dir()
                .map(|d| d.to_path_buf())
                .or_else(|| Some(dirs.home_dir().to_path_buf()))
        })
        .unwrap_or_else(|| PathBuf::from("."))
}
