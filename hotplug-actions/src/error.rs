use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by side-effect actions.
///
/// None of these are fatal to the dispatch loop; callers log them and move on.
#[derive(Error, Debug)]
pub enum ActionError {
    /// The notification daemon rejected or could not receive the notification
    #[error("Failed to show notification: {0}")]
    Notification(String),

    /// Reading a sound file from disk failed
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The sound data is not a playable WAV container
    #[error("WAV decode error: {0}")]
    Decode(String),

    /// A bundled asset identifier that is not in the asset table
    #[error("Unknown bundled asset: {0}")]
    UnknownAsset(String),

    /// No default audio output device is available
    #[error("No audio output device available")]
    NoOutputDevice,

    /// Opening or driving the output stream failed
    #[error("Audio playback error: {0}")]
    Playback(String),
}

pub type Result<T> = std::result::Result<T, ActionError>;

impl From<hound::Error> for ActionError {
    fn from(e: hound::Error) -> Self {
        ActionError::Decode(e.to_string())
    }
}
