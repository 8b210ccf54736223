use crate::error::{Result, SheetError};
use crate::model::catalog::song_title;
use crate::model::song::{KeySignature, NoteEvent, SongRecord, Tempo, TimeSignature, pitch_label};
use crate::notation::{
    ElementKind, NOTE_DISTANCE, NOTE_SIZE, WINDOW_WIDTH, horizontal_position, staff_bottom,
    vertical_position,
};
use crate::surface::{Color, Drawable};
use log::{debug, info};

/// Elements left of this are gone for good.
pub const RETIRE_X: f64 = -WINDOW_WIDTH / 2.0 + 210.0;
/// Elements right of this are off screen and not drawn.
pub const VISIBLE_X: f64 = WINDOW_WIDTH / 2.0 + 50.0;

const LEDGER_LOW: u8 = 60;
const LEDGER_HIGH: u8 = 81;
const FILLED_BELOW: f64 = 1.01;
const STEMLESS_FROM: f64 = 3.99;
const LABEL_FONT_SIZE: u32 = 30;

/// Something on the staff that scrolls left and disappears at the left edge.
pub trait Scrolling {
    fn x(&self) -> f64;

    fn advance(&mut self, dx: f64);

    fn draw(&self, pen: &mut dyn Drawable);

    fn should_retire(&self) -> bool {
        self.x() < RETIRE_X
    }

    fn is_visible(&self) -> bool {
        self.x() < VISIBLE_X
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualNote {
    pitch: u8,
    length: f64,
    absolute_time: f64,
    x: f64,
    y: f64,
    needs_ledger_line: bool,
    is_played: bool,
}

impl VisualNote {
    pub fn new(event: &NoteEvent, time_signature: &TimeSignature, key: &KeySignature) -> Self {
        Self {
            pitch: event.pitch,
            length: event.length,
            absolute_time: event.absolute_time,
            x: horizontal_position(event.onset(), time_signature, ElementKind::Note),
            y: vertical_position(event.pitch, key),
            needs_ledger_line: event.pitch <= LEDGER_LOW || event.pitch >= LEDGER_HIGH,
            is_played: false,
        }
    }

    pub fn pitch(&self) -> u8 {
        self.pitch
    }

    pub fn label(&self) -> &'static str {
        pitch_label(self.pitch)
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn absolute_time(&self) -> f64 {
        self.absolute_time
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn needs_ledger_line(&self) -> bool {
        self.needs_ledger_line
    }

    pub fn is_played(&self) -> bool {
        self.is_played
    }

    pub(crate) fn mark_played(&mut self) {
        self.is_played = true;
    }

    /// Writes the note's letter name under it.
    pub fn draw_label(&self, pen: &mut dyn Drawable) {
        pen.move_to(self.x + NOTE_SIZE * 2.0 - 25.0, self.y - 80.0);
        pen.set_color(Color::CadetBlue);
        pen.pen_down();
        pen.write_text(self.label(), LABEL_FONT_SIZE);
        pen.pen_up();
        pen.set_color(Color::Black);
    }

    fn draw_head(&self, pen: &mut dyn Drawable) {
        pen.move_to(self.x, self.y);

        // quarter notes and shorter get a filled head
        let filled = self.length < FILLED_BELOW;
        if filled {
            pen.begin_fill();
        }

        pen.pen_down();
        pen.set_heading(150.0);
        for _ in 0..2 {
            pen.draw_arc(10.0 * NOTE_SIZE, 90.0);
            pen.draw_arc(4.0 * NOTE_SIZE, 90.0);
        }
        pen.pen_up();

        if filled {
            pen.end_fill();
        }
    }

    fn draw_stem(&self, pen: &mut dyn Drawable) {
        // whole notes have no stem
        if self.length >= STEMLESS_FROM {
            return;
        }

        pen.move_to(self.x + NOTE_SIZE * 2.0, self.y - NOTE_SIZE * 2.0);
        pen.pen_down();
        pen.set_heading(90.0);
        pen.draw_line(40.0 * NOTE_SIZE);
        pen.pen_up();
    }

    fn draw_ledger_line(&self, pen: &mut dyn Drawable) {
        pen.move_to(self.x + NOTE_SIZE * 2.0 + 20.0, self.y - NOTE_SIZE * 2.0 - 8.0);
        pen.pen_down();
        pen.set_heading(180.0);
        pen.draw_line(30.0 * NOTE_SIZE);
        pen.pen_up();
    }
}

impl Scrolling for VisualNote {
    fn x(&self) -> f64 {
        self.x
    }

    fn advance(&mut self, dx: f64) {
        self.x -= dx;
    }

    fn draw(&self, pen: &mut dyn Drawable) {
        pen.set_color(if self.is_played {
            Color::Green
        } else {
            Color::Black
        });

        self.draw_head(pen);
        self.draw_stem(pen);
        if self.needs_ledger_line {
            self.draw_ledger_line(pen);
        }

        pen.set_color(Color::Black);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualBarline {
    /// May carry a `+ 0.1` tag for the second stroke of a double barline.
    beat: f64,
    x: f64,
    y: f64,
}

impl VisualBarline {
    pub fn new(beat: f64, time_signature: &TimeSignature) -> Self {
        Self {
            beat,
            x: horizontal_position(beat, time_signature, ElementKind::Barline),
            y: staff_bottom(),
        }
    }

    pub fn beat(&self) -> f64 {
        self.beat
    }
}

impl Scrolling for VisualBarline {
    fn x(&self) -> f64 {
        self.x
    }

    fn advance(&mut self, dx: f64) {
        self.x -= dx;
    }

    fn draw(&self, pen: &mut dyn Drawable) {
        pen.move_to(self.x, self.y);
        pen.pen_down();
        pen.set_heading(90.0);
        pen.draw_line(NOTE_DISTANCE * 8.0);
        pen.pen_up();
    }
}

/// Everything on screen for one loaded song. Dropping it tears the song down.
#[derive(Debug, Clone)]
pub struct Session {
    record: SongRecord,
    title: String,
    tempo: Tempo,
    notes: Vec<VisualNote>,
    barlines: Vec<VisualBarline>,
}

/// Lays a decoded song out on the staff using the catalog's time and key signature.
pub fn build(record: &SongRecord, events: &[NoteEvent], tempo: Tempo) -> Result<Session> {
    let title = song_title(&record.file_name);
    let Some(last) = events.last() else {
        return Err(SheetError::EmptySong(title));
    };

    let time_signature = &record.time_signature;
    let notes: Vec<VisualNote> = events
        .iter()
        .map(|event| VisualNote::new(event, time_signature, &record.key_signature))
        .collect();

    let total_beats = (last.absolute_time * time_signature.beat_unit_ratio()).floor() as u64;
    let numerator = time_signature.numerator as u64;

    let mut barlines: Vec<VisualBarline> = (1..=total_beats)
        .filter(|beat| beat % numerator == 0)
        .map(|beat| VisualBarline::new(beat as f64, time_signature))
        .collect();

    // closing double barline
    let closing = (total_beats + 1) as f64;
    barlines.push(VisualBarline::new(closing, time_signature));
    barlines.push(VisualBarline::new(closing + 0.1, time_signature));

    if record.pickup_beats != 0 {
        debug!(
            "'{}' declares a {} beat pickup, which is not laid out separately..!",
            title, record.pickup_beats
        );
    }

    info!(
        "Built '{}': {} note(s), {} barline(s), {} bpm, {} in {}..!",
        title,
        notes.len(),
        barlines.len(),
        tempo.bpm,
        time_signature,
        record.key_signature
    );

    Ok(Session {
        record: record.clone(),
        title,
        tempo,
        notes,
        barlines,
    })
}

impl Session {
    pub fn record(&self) -> &SongRecord {
        &self.record
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn notes(&self) -> &[VisualNote] {
        &self.notes
    }

    pub fn barlines(&self) -> &[VisualBarline] {
        &self.barlines
    }

    /// The earliest note still on the staff that hasn't been played yet.
    pub fn gating_note(&self) -> Option<&VisualNote> {
        self.notes.iter().find(|note| !note.is_played)
    }

    pub(crate) fn gating_note_mut(&mut self) -> Option<&mut VisualNote> {
        self.notes.iter_mut().find(|note| !note.is_played)
    }

    pub fn is_finished(&self) -> bool {
        self.notes.is_empty() && self.barlines.is_empty()
    }

    pub fn advance(&mut self, dx: f64) {
        self.notes.iter_mut().for_each(|note| note.advance(dx));
        self.barlines.iter_mut().for_each(|barline| barline.advance(dx));
    }

    /// Drops every element past the left edge; returns how many went.
    pub fn retire(&mut self) -> usize {
        retire(&mut self.notes) + retire(&mut self.barlines)
    }

    pub fn draw(&self, pen: &mut dyn Drawable) {
        for barline in self.barlines.iter().filter(|b| b.is_visible()) {
            barline.draw(pen);
        }
        for note in self.notes.iter().filter(|n| n.is_visible()) {
            note.draw(pen);
        }
    }
}

fn retire<T: Scrolling>(elements: &mut Vec<T>) -> usize {
    let before = elements.len();
    elements.retain(|element| !element.should_retire());
    before - elements.len()
}
