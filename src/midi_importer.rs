use crate::error::{Result, SheetError};
use crate::model::song::*;
use log::{debug, warn};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use std::fs;
use std::path::Path;

const DEFAULT_MPQN: u32 = 500_000;
const MICROSECONDS_PER_MINUTE: f64 = 60_000_000.0;

/// One event of the merged track stream, positioned by absolute tick.
struct MergedEvent<'a> {
    tick: u64,
    kind: TrackEventKind<'a>,
}

pub fn import_midi_file<P: AsRef<Path>>(path: P) -> Result<Song> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SheetError::AssetMissing(path.to_path_buf()));
    }

    let bytes = fs::read(path)?;
    let mut song = decode(&bytes)?;

    song.metadata.title = path
        .file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string());

    Ok(song)
}

/// Decodes a MIDI file into its tempo, time signature and note releases.
pub fn decode(bytes: &[u8]) -> Result<Song> {
    let smf = parse(bytes)?;

    let ticks_per_quarter = match smf.header.timing {
        Timing::Metrical(t) => t.as_int() as u64,
        Timing::Timecode(_fps, _subframe) => {
            return Err(SheetError::Decode(
                "SMPTE timecode midi timing is not supported".to_string(),
            ));
        }
    };

    if ticks_per_quarter == 0 {
        return Err(SheetError::Decode(
            "header declares 0 ticks per quarter note".to_string(),
        ));
    }

    debug!("Ticks per quarter note: {}", ticks_per_quarter);
    debug!(
        "MIDI format: {:?}, tracks: {}",
        smf.header.format,
        smf.tracks.len()
    );

    let tempo = find_tempo(&smf.tracks);
    let time_signature = find_time_signature(&smf.tracks);
    let events = collect_notes(&smf.tracks, ticks_per_quarter, tempo);

    debug!(
        "Decoded {} note(s) at {} bpm in {}..!",
        events.len(),
        tempo.bpm,
        time_signature
    );

    Ok(Song {
        metadata: Metadata {
            title: None,
            tempo,
            time_signature,
        },
        events,
    })
}

/// The first time signature declared in the file, or 4/4.
pub fn time_signature(bytes: &[u8]) -> Result<TimeSignature> {
    let smf = parse(bytes)?;
    Ok(find_time_signature(&smf.tracks))
}

fn parse(bytes: &[u8]) -> Result<Smf<'_>> {
    Smf::parse(bytes).map_err(|e| SheetError::Decode(e.to_string()))
}

fn mpqn_to_bpm(mpqn: u32) -> u32 {
    (MICROSECONDS_PER_MINUTE / mpqn as f64) as u32
}

fn find_tempo(tracks: &[Vec<TrackEvent<'_>>]) -> Tempo {
    for (track_idx, track) in tracks.iter().enumerate() {
        for event in track.iter() {
            if let TrackEventKind::Meta(MetaMessage::Tempo(micro)) = event.kind {
                let mpqn = micro.as_int();
                if mpqn == 0 {
                    warn!("Ignoring a zero tempo declaration in track {}..!", track_idx);
                    continue;
                }

                debug!("Tempo {} us/qn (track {})", mpqn, track_idx);
                return Tempo::new(mpqn_to_bpm(mpqn));
            }
        }
    }

    debug!("No tempo declared, defaulting to {} bpm..!", DEFAULT_TEMPO_BPM);
    Tempo::default()
}

fn find_time_signature(tracks: &[Vec<TrackEvent<'_>>]) -> TimeSignature {
    for track in tracks.iter() {
        for event in track.iter() {
            if let TrackEventKind::Meta(MetaMessage::TimeSignature(num, pow, _clocks, _n32)) =
                event.kind
            {
                let signature = 1u32
                    .checked_shl(pow as u32)
                    .and_then(|den| u8::try_from(den).ok())
                    .and_then(|den| TimeSignature::new(num, den));

                match signature {
                    Some(ts) => return ts,
                    None => warn!(
                        "Ignoring invalid time signature {}/2^{}..!",
                        num, pow
                    ),
                }
            }
        }
    }

    TimeSignature::default()
}

/// Merges all tracks by absolute tick, keeping file order for events on the same tick.
fn merge_tracks<'a>(tracks: &[Vec<TrackEvent<'a>>]) -> Vec<MergedEvent<'a>> {
    let mut merged: Vec<MergedEvent<'a>> = Vec::new();

    for track in tracks.iter() {
        let mut abs_tick: u64 = 0;
        for event in track.iter() {
            abs_tick = abs_tick.saturating_add(event.delta.as_int() as u64);
            merged.push(MergedEvent {
                tick: abs_tick,
                kind: event.kind,
            });
        }
    }

    merged.sort_by_key(|event| event.tick);
    merged
}

/// Every note release becomes a note whose length is the time elapsed since the previous
/// message. Time spent before a note-on (rests) is not counted.
fn collect_notes(
    tracks: &[Vec<TrackEvent<'_>>],
    ticks_per_quarter: u64,
    tempo: Tempo,
) -> Vec<NoteEvent> {
    let mut events: Vec<NoteEvent> = Vec::new();
    let mut absolute_time = 0.0;
    let mut last_tick: u64 = 0;
    let mut mpqn = DEFAULT_MPQN;

    for event in merge_tracks(tracks).into_iter() {
        let delta_ticks = event.tick - last_tick;
        last_tick = event.tick;

        // seconds are measured with the tempo in effect before this message
        let delta_secs =
            delta_ticks as f64 * mpqn as f64 / ticks_per_quarter as f64 / 1_000_000.0;

        let released = match event.kind {
            TrackEventKind::Meta(MetaMessage::Tempo(micro)) => {
                if micro.as_int() > 0 {
                    mpqn = micro.as_int();
                }
                None
            }
            TrackEventKind::Midi { message, .. } => match message {
                MidiMessage::NoteOff { key, .. } => Some(key.as_int()),
                MidiMessage::NoteOn { key, vel } if vel.as_int() == 0 => Some(key.as_int()),
                _ => None,
            },
            _ => None,
        };

        let Some(pitch) = released else {
            continue;
        };

        // releases sharing a tick (chords) come out with length 0
        let length = delta_secs * tempo.bpm as f64 / 60.0;
        if length == 0.0 {
            debug!(
                "Zero-length release of midi note {} at tick {}..!",
                pitch, event.tick
            );
        }

        absolute_time += length;
        events.push(NoteEvent {
            pitch,
            length,
            absolute_time,
        });
    }

    events
}
