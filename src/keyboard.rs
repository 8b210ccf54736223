//! The clickable piano under the staff.
//!
//! White keys are `KEY_WIDTH` wide starting with F4 at x = 0; black keys are narrower
//! and sit in the upper band at fixed offsets within each octave.

use crate::engine::SoundEngine;
use crate::model::song::pitch_label;
use crate::surface::{Color, Drawable};
use crate::timeline::Session;
use log::{debug, warn};

pub const KEY_WIDTH: f64 = 23.0;
pub const OCTAVE_WIDTH: f64 = 162.0;

pub const KEYBOARD_TOP: f64 = -115.0;
pub const KEYBOARD_BOTTOM: f64 = -250.0;
/// Clicks above this line may land on a black key.
pub const BLACK_KEY_BOTTOM: f64 = -210.0;

const BLACK_KEY_HALF_WIDTH: f64 = 8.5;
/// Black key centres within one octave, measured from x = 0 modulo `OCTAVE_WIDTH`.
const BLACK_KEY_OFFSETS: [f64; 5] = [-47.0 + OCTAVE_WIDTH, -25.0 + OCTAVE_WIDTH, 22.0, 44.0, 67.0];
/// Black key centres of the C4 octave in order C#, D#, F#, G#, A#.
const BLACK_KEY_CENTERS: [f64; 5] = [-47.0, -25.0, 22.0, 44.0, 67.0];

const MIDDLE_C: i64 = 60;
/// Two slots per white key within the octave (C, D, E, F, G, A, B).
const DOUBLED_INTERVALS: [i64; 12] = [0, 1, 2, 3, 4, 6, 7, 8, 9, 10, 11, 12];

const WHITE_KEY_CLICK_Y: f64 = -230.0;
const BLACK_KEY_CLICK_Y: f64 = -160.0;
const DRAWN_WHITE_KEYS: i64 = 13;
const PROMPT: &str = "Click keys on the piano to play notes: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Judgement {
    /// Click outside the keyboard, or nothing left to play.
    Ignored,
    Correct(u8),
    Wrong(u8),
}

pub fn in_keyboard(y: f64) -> bool {
    y > KEYBOARD_BOTTOM && y < KEYBOARD_TOP
}

/// The MIDI pitch under a click at (`x`, `y`).
pub fn locate_pitch(x: f64, y: f64) -> Option<u8> {
    // doubled half-steps from middle C, white keys land on even slots
    let mut interval = 2 * ((x / KEY_WIDTH).floor() as i64 + 3);

    if y > BLACK_KEY_BOTTOM {
        let within_octave = x.rem_euclid(OCTAVE_WIDTH);
        let on_black_key = BLACK_KEY_OFFSETS.iter().any(|center| {
            within_octave >= center - BLACK_KEY_HALF_WIDTH
                && within_octave <= center + BLACK_KEY_HALF_WIDTH
        });

        if on_black_key {
            interval = 2 * (((x + BLACK_KEY_HALF_WIDTH) / KEY_WIDTH).floor() as i64 + 3) - 1;
        }
    }

    let octave = interval.div_euclid(14);
    let mut interval = interval.rem_euclid(14);

    // there is no black key between E-F and B-C
    if interval > 4 {
        interval -= 1;
    }
    if interval > 11 {
        interval -= 1;
    }

    u8::try_from(MIDDLE_C + interval + 12 * octave)
        .ok()
        .filter(|pitch| *pitch <= 127)
}

/// A click position that [`locate_pitch`] maps to `pitch`.
pub fn key_center(pitch: u8) -> Option<(f64, f64)> {
    let offset = pitch as i64 - MIDDLE_C;
    let octave = offset.div_euclid(12);
    let pitch_class = offset.rem_euclid(12) as usize;
    let slot = DOUBLED_INTERVALS[pitch_class];

    let center = if slot % 2 == 0 {
        let white_index = (slot + 14 * octave) / 2 - 3;
        (white_index as f64 * KEY_WIDTH + KEY_WIDTH / 2.0, WHITE_KEY_CLICK_Y)
    } else {
        let black_index = match pitch_class {
            1 => 0,
            3 => 1,
            6 => 2,
            8 => 3,
            _ => 4,
        };
        (
            BLACK_KEY_CENTERS[black_index] + OCTAVE_WIDTH * octave as f64,
            BLACK_KEY_CLICK_Y,
        )
    };

    (locate_pitch(center.0, center.1) == Some(pitch)).then_some(center)
}

/// Compares `pitch` with the session's gating note and marks it played on a match.
pub fn check_correct<E: SoundEngine>(session: &mut Session, pitch: u8, engine: &E) -> Judgement {
    let Some(note) = session.gating_note_mut() else {
        warn!("Played {} but there is nothing left to play..!", pitch);
        return Judgement::Ignored;
    };

    if note.pitch() != pitch {
        debug!(
            "Wrong key: played {} ({}), expected {} ({})",
            pitch_label(pitch),
            pitch,
            note.label(),
            note.pitch()
        );
        return Judgement::Wrong(pitch);
    }

    note.mark_played();
    if let Err(why) = engine.play_sound(pitch) {
        warn!("Failed to play {} | why: {:?}", pitch, why);
    }

    debug!("Correct: {} ({})", pitch_label(pitch), pitch);
    Judgement::Correct(pitch)
}

/// Handles a click anywhere on the surface; clicks off the keyboard are ignored.
pub fn judge_click<E: SoundEngine>(session: &mut Session, x: f64, y: f64, engine: &E) -> Judgement {
    if !in_keyboard(y) {
        return Judgement::Ignored;
    }

    match locate_pitch(x, y) {
        Some(pitch) => check_correct(session, pitch, engine),
        None => Judgement::Ignored,
    }
}

/// Draws the prompt and the key outlines.
pub fn draw_keyboard(pen: &mut dyn Drawable) {
    pen.set_color(Color::Black);
    pen.move_to(-450.0, -100.0);
    pen.pen_down();
    pen.write_text(PROMPT, 15);
    pen.pen_up();

    let height = KEYBOARD_TOP - KEYBOARD_BOTTOM;
    for key in -DRAWN_WHITE_KEYS..DRAWN_WHITE_KEYS {
        draw_rect(pen, key as f64 * KEY_WIDTH, KEYBOARD_BOTTOM, KEY_WIDTH, height, false);
    }

    let left = -DRAWN_WHITE_KEYS as f64 * KEY_WIDTH;
    let right = DRAWN_WHITE_KEYS as f64 * KEY_WIDTH;
    for octave in -3..=2 {
        for center in BLACK_KEY_CENTERS {
            let x = center + OCTAVE_WIDTH * octave as f64 - BLACK_KEY_HALF_WIDTH;
            if x >= left && x + 2.0 * BLACK_KEY_HALF_WIDTH <= right {
                draw_rect(
                    pen,
                    x,
                    BLACK_KEY_BOTTOM,
                    2.0 * BLACK_KEY_HALF_WIDTH,
                    KEYBOARD_TOP - BLACK_KEY_BOTTOM,
                    true,
                );
            }
        }
    }
}

fn draw_rect(pen: &mut dyn Drawable, x: f64, y: f64, width: f64, height: f64, filled: bool) {
    pen.move_to(x, y);
    if filled {
        pen.begin_fill();
    }

    pen.pen_down();
    for (heading, length) in [(0.0, width), (90.0, height), (180.0, width), (270.0, height)] {
        pen.set_heading(heading);
        pen.draw_line(length);
    }
    pen.pen_up();

    if filled {
        pen.end_fill();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::song::{Tempo, TimeSignature};
    use crate::surface::{DrawOp, HeadlessSurface, Surface};
    use crate::timeline::build;
    use crate::timeline::test::{events, record};
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingEngine {
        played: RefCell<Vec<u8>>,
    }

    impl SoundEngine for RecordingEngine {
        fn play_sound(&self, pitch: u8) -> anyhow::Result<()> {
            self.played.borrow_mut().push(pitch);
            Ok(())
        }
    }

    fn session(notes: &[(u8, f64)]) -> Session {
        build(
            &record(TimeSignature::default(), "C"),
            &events(notes),
            Tempo::default(),
        )
        .unwrap()
    }

    #[test]
    fn white_keys_around_middle_c() {
        let expected = [
            (-69.0, 60u8),
            (-46.0, 62),
            (-23.0, 64),
            (0.0, 65),
            (23.0, 67),
            (46.0, 69),
            (69.0, 71),
            (92.0, 72),
        ];

        for (left_edge, pitch) in expected {
            assert_eq!(locate_pitch(left_edge + 11.5, -230.0), Some(pitch), "x {}", left_edge);
        }
    }

    #[test]
    fn black_keys_in_upper_band() {
        assert_eq!(locate_pitch(-47.0, -150.0), Some(61));
        assert_eq!(locate_pitch(-25.0, -150.0), Some(63));
        assert_eq!(locate_pitch(22.0, -150.0), Some(66));
        assert_eq!(locate_pitch(44.0, -150.0), Some(68));
        assert_eq!(locate_pitch(67.0, -150.0), Some(70));
        assert_eq!(locate_pitch(115.0, -150.0), Some(73));

        // same x in the lower band is the white key underneath
        assert_eq!(locate_pitch(22.0, -230.0), Some(65));
    }

    #[test]
    fn key_centers_map_back() {
        for pitch in 36..=96u8 {
            let (x, y) = key_center(pitch).unwrap_or_else(|| panic!("no key for {}", pitch));
            assert!(in_keyboard(y));
            assert_eq!(locate_pitch(x, y), Some(pitch));
        }
    }

    #[test]
    fn out_of_range_pitches() {
        assert_eq!(locate_pitch(-10_000.0, -230.0), None);
        assert_eq!(locate_pitch(10_000.0, -230.0), None);
    }

    #[test]
    fn wrong_key_never_matches() {
        env_logger::try_init().unwrap_or(());

        let engine = RecordingEngine::default();
        let mut session = session(&[(60, 1.0)]);

        // C#4 against a gating C4
        assert_eq!(judge_click(&mut session, -47.0, -150.0, &engine), Judgement::Wrong(61));
        assert!(!session.notes()[0].is_played());
        assert!(engine.played.borrow().is_empty());
    }

    #[test]
    fn correct_key_marks_played() {
        env_logger::try_init().unwrap_or(());

        let engine = RecordingEngine::default();
        let mut session = session(&[(60, 1.0), (64, 1.0)]);

        let (x, y) = key_center(60).unwrap();
        assert_eq!(judge_click(&mut session, x, y, &engine), Judgement::Correct(60));
        assert!(session.notes()[0].is_played());
        assert_eq!(session.gating_note().map(|n| n.pitch()), Some(64));
        assert_eq!(*engine.played.borrow(), vec![60]);

        assert_eq!(check_correct(&mut session, 64, &engine), Judgement::Correct(64));
        assert_eq!(check_correct(&mut session, 64, &engine), Judgement::Ignored);
    }

    #[test]
    fn clicks_off_keyboard_are_ignored() {
        let engine = RecordingEngine::default();
        let mut session = session(&[(65, 1.0)]);

        assert_eq!(judge_click(&mut session, 11.5, 0.0, &engine), Judgement::Ignored);
        assert_eq!(judge_click(&mut session, 11.5, -250.0, &engine), Judgement::Ignored);
        assert_eq!(judge_click(&mut session, 11.5, -115.0, &engine), Judgement::Ignored);
        assert!(!session.notes()[0].is_played());
    }

    #[test]
    fn keyboard_drawing() {
        let mut surface = HeadlessSurface::new();
        let recorder = surface.recorder();
        let mut pen = surface.create_drawable();

        draw_keyboard(&mut pen);
        assert_eq!(recorder.texts(), vec![PROMPT.to_string()]);
        assert!(recorder.ops().iter().any(|op| *op == DrawOp::BeginFill));
    }
}
