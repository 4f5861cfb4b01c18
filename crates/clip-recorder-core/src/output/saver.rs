//! Client-side file save for finished clips.
//!
//! A clip is encoded to a temporary `.part` file next to its destination
//! and then renamed into place, so a crash never leaves a truncated
//! `recording.wav` behind. The temporary file is removed on every path
//! that does not end in a successful rename.

use crate::{CoreResult, RecorderError, recording::Recording};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{debug, info, instrument, warn};

/// Fixed name every saved clip is written under.
pub const RECORDING_FILE_NAME: &str = "recording.wav";

/// What to do when the destination file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Pick `name (1).ext`, `name (2).ext`, ... like a browser download.
    #[default]
    Rename,
    /// Replace the existing file.
    Overwrite,
}

/// Writes a finished clip somewhere the user can pick it up.
pub trait FileSaver {
    /// Save `recording` as `file_name`, returning the final path.
    fn save(&mut self, recording: &Recording, file_name: &str) -> CoreResult<PathBuf>;
}

/// Saves clips as WAV files into a download directory.
#[derive(Debug, Clone)]
pub struct DownloadSaver {
    directory: PathBuf,
    on_conflict: ConflictPolicy,
}

impl DownloadSaver {
    /// Saver writing into `directory`.
    pub fn new(directory: impl Into<PathBuf>, on_conflict: ConflictPolicy) -> Self {
        Self {
            directory: directory.into(),
            on_conflict,
        }
    }

    /// Directory clips are written to.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn destination(&self, file_name: &str) -> PathBuf {
        match self.on_conflict {
            ConflictPolicy::Overwrite => self.directory.join(file_name),
            ConflictPolicy::Rename => unique_path(&self.directory, file_name),
        }
    }
}

impl FileSaver for DownloadSaver {
    #[track_caller]
    #[instrument(skip(self, recording), fields(session_id = %recording.session_id()))]
    fn save(&mut self, recording: &Recording, file_name: &str) -> CoreResult<PathBuf> {
        fs::create_dir_all(&self.directory).map_err(|source| RecorderError::SaveFailed {
            path: self.directory.clone(),
            source,
            location: ErrorLocation::from(Location::caller()),
        })?;

        let destination = self.destination(file_name);
        let temp = TempFileGuard::new(self.directory.join(format!(
            ".{}.{}.part",
            file_name,
            recording.session_id().simple()
        )));

        write_wav(temp.path(), recording)?;

        fs::rename(temp.path(), &destination).map_err(|source| RecorderError::SaveFailed {
            path: destination.clone(),
            source,
            location: ErrorLocation::from(Location::caller()),
        })?;
        temp.persist();

        info!(
            path = ?destination,
            bytes = recording.len(),
            duration_ms = recording.duration().as_millis(),
            "Recording saved"
        );

        Ok(destination)
    }
}

/// First free path for `file_name` in `directory`, browser style.
pub(crate) fn unique_path(directory: &Path, file_name: &str) -> PathBuf {
    let candidate = directory.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    let extension = name.extension().map(|e| e.to_string_lossy().into_owned());

    let mut index: u32 = 1;
    loop {
        let numbered = match &extension {
            Some(ext) => format!("{} ({}).{}", stem, index, ext),
            None => format!("{} ({})", stem, index),
        };
        let candidate = directory.join(numbered);
        if !candidate.exists() {
            return candidate;
        }
        index += 1;
    }
}

#[track_caller]
fn write_wav(path: &Path, recording: &Recording) -> CoreResult<()> {
    let format = recording.format();
    let spec = WavSpec {
        channels: format.channels,
        sample_rate: format.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(|e| RecorderError::EncodingFailed {
        reason: format!("Failed to create WAV file: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    for sample in recording.samples() {
        writer
            .write_sample(sample)
            .map_err(|e| RecorderError::EncodingFailed {
                reason: format!("Failed to write sample: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;
    }

    writer
        .finalize()
        .map_err(|e| RecorderError::EncodingFailed {
            reason: format!("Failed to finalize WAV file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    debug!(path = ?path, "Temporary WAV written");
    Ok(())
}

/// RAII guard that removes the temporary file unless it was persisted.
pub(crate) struct TempFileGuard {
    path: PathBuf,
    persisted: bool,
}

impl TempFileGuard {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            path,
            persisted: false,
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Mark the file as moved into place; drop becomes a no-op.
    pub(crate) fn persist(mut self) {
        self.persisted = true;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.persisted || !self.path.exists() {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = ?self.path, error = %e, "Failed to remove temporary file");
        }
    }
}
