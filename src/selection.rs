use crate::error::{Result, SheetError};
use crate::midi_importer::import_midi_file;
use crate::model::catalog::{menu_entries, read_catalog};
use crate::model::song::SongRecord;
use crate::timeline::{Session, build};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// The song menu: the catalog plus at most one loaded session.
#[derive(Debug)]
pub struct SongSelection {
    records: Vec<SongRecord>,
    midi_dir: PathBuf,
    session: Option<Session>,
}

impl SongSelection {
    pub fn new(records: Vec<SongRecord>, midi_dir: impl Into<PathBuf>) -> Self {
        Self {
            records,
            midi_dir: midi_dir.into(),
            session: None,
        }
    }

    pub fn open<P: AsRef<Path>>(catalog: P, midi_dir: impl Into<PathBuf>) -> Result<Self> {
        let records = read_catalog(catalog)?;
        Ok(Self::new(records, midi_dir))
    }

    pub fn records(&self) -> &[SongRecord] {
        &self.records
    }

    pub fn menu(&self) -> Vec<String> {
        menu_entries(&self.records)
    }

    pub fn record(&self, display_index: usize) -> Result<&SongRecord> {
        self.records
            .iter()
            .find(|r| r.display_index == display_index)
            .ok_or(SheetError::UnknownSong(display_index))
    }

    pub fn midi_path(&self, record: &SongRecord) -> PathBuf {
        self.midi_dir.join(&record.file_name)
    }

    /// Tears down the current session and loads the song at `display_index`.
    ///
    /// On failure nothing is loaded afterwards; the previous session is gone either way.
    pub fn select(&mut self, display_index: usize) -> Result<&mut Session> {
        self.close();

        match self.load(display_index) {
            Ok(session) => Ok(self.session.insert(session)),
            Err(why) => {
                warn!("Failed to load song {}: {}", display_index, why);
                Err(why)
            }
        }
    }

    pub fn current(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    /// Drops the loaded session, if any.
    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            debug!("Tearing down '{}'..!", session.title());
        }
    }

    fn load(&self, display_index: usize) -> Result<Session> {
        let record = self.record(display_index)?;
        let path = self.midi_path(record);

        info!("Importing MIDI file: '{}'...", path.display());
        let song = import_midi_file(&path)?;

        if song.metadata.time_signature != record.time_signature {
            debug!(
                "File declares {}, laying out in the catalog's {}..!",
                song.metadata.time_signature, record.time_signature
            );
        }

        build(record, &song.events, song.metadata.tempo)
    }
}
