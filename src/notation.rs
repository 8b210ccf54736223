//! Staff geometry: where a pitch sits vertically and where a beat sits horizontally.
//!
//! All positions are in surface coordinates (centre origin, y up) for a
//! `WINDOW_WIDTH` x `WINDOW_HEIGHT` window.

use crate::model::song::{KeySignature, TimeSignature};

pub const WINDOW_WIDTH: f64 = 1000.0;
pub const WINDOW_HEIGHT: f64 = 600.0;

pub const NOTE_SIZE: f64 = 3.0;
/// Vertical distance of one staff step (a line to the adjacent space).
pub const NOTE_DISTANCE: f64 = NOTE_SIZE * 5.91;
/// Horizontal distance of one beat.
pub const BEAT_DISTANCE: f64 = WINDOW_WIDTH / 8.0;
/// x of the first beat.
pub const FIRST_BEAT_X: f64 = -WINDOW_WIDTH / 5.0;

/// Step value that lands on the vertical centre of the window.
const CENTER_STEP: i32 = 91;
const OPTICAL_OFFSET: f64 = -3.0;
const BEAT_ROUNDING: f64 = 0.05;

const BLACK_KEY_CLASSES: [i32; 5] = [1, 3, 6, 8, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Note,
    Barline,
}

/// y of a notehead for `pitch` under `key`.
///
/// Black keys are respelled onto the neighbouring white key's line or space: down a
/// half-step in sharp keys, up a half-step in flat keys.
pub fn vertical_position(pitch: u8, key: &KeySignature) -> f64 {
    let mut step = pitch as i32;
    let pitch_class = step % 12;

    if BLACK_KEY_CLASSES.contains(&pitch_class) {
        if key.is_sharp() {
            step -= 1;
        }
        if key.is_flat() {
            step += 1;
        }
    }

    // two units per staff step, C4's octave is 0
    let octave = 2 * (step.div_euclid(12) - 5);

    // C..E sit one unit lower than F..B within an octave
    if pitch_class < 5 {
        step -= 1;
    }
    step += octave;

    WINDOW_HEIGHT / 2.0 + NOTE_DISTANCE * (step - CENTER_STEP) as f64 / 2.0 + OPTICAL_OFFSET
}

/// x of something at `beat` (beats since the start of the song).
///
/// Each beat is one `BEAT_DISTANCE` wide and every completed measure reserves one
/// more for its barline, which sits one slot before the note that follows it.
pub fn horizontal_position(beat: f64, time_signature: &TimeSignature, kind: ElementKind) -> f64 {
    let beat = (beat + BEAT_ROUNDING).floor().max(0.0) as u64;
    let numerator = time_signature.numerator.max(1) as u64;

    let mut x = FIRST_BEAT_X;
    for previous_beat in 1..=beat {
        x += BEAT_DISTANCE;
        if previous_beat % numerator == 0 {
            x += BEAT_DISTANCE;
        }
    }

    match kind {
        ElementKind::Note => x,
        ElementKind::Barline => x - BEAT_DISTANCE,
    }
}

/// y of the lowest staff line.
pub fn staff_bottom() -> f64 {
    WINDOW_HEIGHT / 2.0 - NOTE_DISTANCE * 15.0
}

/// y of the five staff lines, bottom to top.
pub fn staff_line_positions() -> [f64; 5] {
    let bottom = staff_bottom();
    std::array::from_fn(|line| bottom + NOTE_DISTANCE * 2.0 * line as f64)
}
