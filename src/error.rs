use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetError {
    /// A catalog line that doesn't have the `file, N/D, pickup, key` shape.
    #[error("Malformed catalog line {line}: {message}")]
    CatalogFormat { line: usize, message: String },

    /// Unparseable, truncated or unsupported MIDI data.
    #[error("Failed to decode MIDI: {0}")]
    Decode(String),

    /// A referenced MIDI (or other asset) file does not exist.
    #[error("Missing asset: {}", .0.display())]
    AssetMissing(PathBuf),

    /// The MIDI file decoded fine but contains no note releases.
    #[error("Song '{0}' contains no playable notes")]
    EmptySong(String),

    #[error("No song with index {0} in the catalog")]
    UnknownSong(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SheetError>;
