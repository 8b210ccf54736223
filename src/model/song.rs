use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_TEMPO_BPM: u32 = 120;

const PITCH_LABELS: [&str; 12] = [
    "C", "C#/D♭", "D", "D#/E♭", "E", "F", "F#/G♭", "G", "G#/A♭", "A", "A#/B♭", "B",
];

/// Letter name of a MIDI note number's pitch class.
pub fn pitch_label(pitch: u8) -> &'static str {
    PITCH_LABELS[(pitch % 12) as usize]
}

/// A single released note, timed in beats since the start of the song.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NoteEvent {
    pub pitch: u8,
    pub length: f64,
    pub absolute_time: f64,
}

impl NoteEvent {
    pub fn label(&self) -> &'static str {
        pitch_label(self.pitch)
    }

    /// Beat at which the note starts sounding.
    pub fn onset(&self) -> f64 {
        self.absolute_time - self.length
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tempo {
    pub bpm: u32,
}

impl Tempo {
    pub fn new(bpm: u32) -> Self {
        Self { bpm: bpm.max(1) }
    }

    /// One animation frame; the loop runs `bpm` frames per second.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.bpm as f64)
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPO_BPM)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u8,
}

impl TimeSignature {
    pub fn new(numerator: u8, denominator: u8) -> Option<Self> {
        if numerator == 0 || denominator == 0 || !denominator.is_power_of_two() {
            return None;
        }

        Some(Self {
            numerator,
            denominator,
        })
    }

    /// How many quarter-note beats make up one beat unit of this signature.
    pub fn beat_unit_ratio(&self) -> f64 {
        self.denominator as f64 / 4.0
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
        }
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Whether black keys are spelled as sharps of the note below or flats of the note above.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spelling {
    Sharps,
    Flats,
    Natural,
}

/// The key signature token from the catalog, e.g. `Csharp`, `Bflat` or `C`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KeySignature {
    pub token: String,
}

impl KeySignature {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn is_sharp(&self) -> bool {
        self.token.to_lowercase().contains("sharp")
    }

    pub fn is_flat(&self) -> bool {
        self.token.to_lowercase().contains("flat")
    }

    pub fn spelling(&self) -> Spelling {
        if self.is_sharp() {
            Spelling::Sharps
        } else if self.is_flat() {
            Spelling::Flats
        } else {
            Spelling::Natural
        }
    }
}

impl fmt::Display for KeySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Metadata {
    pub title: Option<String>,
    pub tempo: Tempo,
    pub time_signature: TimeSignature,
}

/// Decoder output: the song's tempo and its note releases in musical order.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Song {
    pub metadata: Metadata,
    pub events: Vec<NoteEvent>,
}

impl Song {
    pub fn total_beats(&self) -> f64 {
        self.events.last().map(|e| e.absolute_time).unwrap_or(0.0)
    }
}

/// One entry of the song catalog.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SongRecord {
    pub file_name: String,
    pub time_signature: TimeSignature,
    /// Parsed but not acted upon yet.
    pub pickup_beats: i32,
    pub key_signature: KeySignature,
    pub display_index: usize,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pitch_labels() {
        assert_eq!(pitch_label(60), "C");
        assert_eq!(pitch_label(61), "C#/D♭");
        assert_eq!(pitch_label(64), "E");
        assert_eq!(pitch_label(70), "A#/B♭");
        assert_eq!(pitch_label(127), "G");
    }

    #[test]
    fn key_signature_spelling() {
        assert_eq!(KeySignature::new("Csharp").spelling(), Spelling::Sharps);
        assert_eq!(KeySignature::new("Bflat").spelling(), Spelling::Flats);
        assert_eq!(KeySignature::new("C").spelling(), Spelling::Natural);
        assert!(KeySignature::new("F_Sharp").is_sharp());
    }

    #[test]
    fn time_signature_validation() {
        assert_eq!(TimeSignature::new(3, 4), Some(TimeSignature { numerator: 3, denominator: 4 }));
        assert!(TimeSignature::new(6, 8).is_some());
        assert!(TimeSignature::new(0, 4).is_none());
        assert!(TimeSignature::new(4, 3).is_none());
        assert_eq!(TimeSignature::default().to_string(), "4/4");
    }

    #[test]
    fn tempo_frame_interval() {
        let tempo = Tempo::default();
        assert_eq!(tempo.bpm, 120);
        assert!((tempo.frame_interval().as_secs_f64() - 1.0 / 120.0).abs() < 1e-9);
        assert_eq!(Tempo::new(0).bpm, 1);
    }
}
