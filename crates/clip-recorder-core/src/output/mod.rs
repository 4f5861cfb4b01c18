pub(crate) mod playback;
pub(crate) mod saver;

pub use {
    playback::{AudioPlayer, PlaybackSource},
    saver::{ConflictPolicy, DownloadSaver, FileSaver, RECORDING_FILE_NAME},
};
