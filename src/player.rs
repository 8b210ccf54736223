use crate::engine::SoundEngine;
use crate::keyboard::{Judgement, check_correct, draw_keyboard, judge_click, key_center};
use crate::notation::{NOTE_DISTANCE, WINDOW_HEIGHT, WINDOW_WIDTH, staff_line_positions};
use crate::surface::{Color, Drawable, Surface};
use crate::timeline::{Scrolling, Session};
use log::{debug, info, warn};
use spin_sleep::{SpinSleeper, SpinStrategy};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};

/// A note that reaches this x unplayed stops the scroll.
pub const JUDGE_X: f64 = -WINDOW_WIDTH / 2.0 + 270.0;
/// Distance everything moves per frame.
pub const SCROLL_STEP: f64 = 1.0;
/// How long note names stay up when asked for.
pub const NOTE_NAMES_HOLD: Duration = Duration::from_millis(500);

const TITLE_FONT_SIZE: u32 = 18;

/// Messages other threads (Ctrl-C, stdin) can send to a running player.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlMsg {
    Stop,
    Click { x: f64, y: f64 },
    ShowNoteNames,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Running,
    WaitingForInput,
    Finished,
}

/// Scrolls one session across the surface, one frame per tick.
pub struct Player<'a, S: Surface, E: SoundEngine> {
    surface: &'a mut S,
    engine: &'a E,
    session: &'a mut Session,
    state: PlaybackState,
    autoplay: bool,
    verbose: bool,
    delay: u64,
    frames: u64,
    notes: S::Pen,
    labels: S::Pen,
    _staff: S::Pen,
    _keyboard: S::Pen,
    control_tx: Sender<ControlMsg>,
    control_rx: Receiver<ControlMsg>,
}

impl<'a, S: Surface, E: SoundEngine> Player<'a, S, E> {
    pub fn new(surface: &'a mut S, engine: &'a E, session: &'a mut Session) -> Self {
        let mut staff = surface.create_drawable();
        draw_staff(&mut staff, session.title());

        let mut keyboard = surface.create_drawable();
        draw_keyboard(&mut keyboard);

        let notes = surface.create_drawable();
        let labels = surface.create_drawable();
        let (control_tx, control_rx) = mpsc::channel::<ControlMsg>();

        let mut player = Self {
            surface,
            engine,
            session,
            state: PlaybackState::Running,
            autoplay: false,
            verbose: false,
            delay: 0,
            frames: 0,
            notes,
            labels,
            _staff: staff,
            _keyboard: keyboard,
            control_tx,
            control_rx,
        };

        player.refresh_gate();
        player.render();
        player
    }

    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Waits `delay` seconds before the first frame.
    pub fn with_delay(mut self, delay: u64) -> Self {
        self.delay = delay;
        self
    }

    /// A handle other threads can use to stop the player or feed it clicks.
    pub fn controller(&self) -> Sender<ControlMsg> {
        self.control_tx.clone()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn session(&self) -> &Session {
        &*self.session
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Runs frames at the song's tempo until the song ends or a `Stop` arrives.
    pub fn play(&mut self) -> PlaybackState {
        let sleeper = SpinSleeper::new(100_000).with_spin_strategy(SpinStrategy::YieldThread);
        let frame = self.session.tempo().frame_interval();

        info!(
            "Playing '{}' at {} frames per second {}..!",
            self.session.title(),
            self.session.tempo().bpm,
            if self.delay > 0 {
                format!("in {} seconds", self.delay)
            } else {
                "now".to_owned()
            }
        );

        if self.delay > 0 {
            sleeper.sleep(Duration::from_secs(self.delay));
        }

        let start = Instant::now();
        let mut next_frame = start;

        while self.state != PlaybackState::Finished {
            if self.process_controls() {
                warn!(
                    "Playback stopped via control message after {} seconds..!",
                    start.elapsed().as_secs()
                );
                return self.state;
            }

            if self.autoplay {
                self.autoplay_step();
            }

            self.tick();

            next_frame += frame;
            let now = Instant::now();
            if next_frame > now {
                sleeper.sleep(next_frame - now);
            } else {
                // fell behind; don't try to catch up
                next_frame = now;
            }
        }

        info!(
            "Finished '{}' after {} frames ({:.1}s)..!",
            self.session.title(),
            self.frames,
            start.elapsed().as_secs_f64()
        );

        self.state
    }

    /// Advances the animation by one frame.
    pub fn tick(&mut self) -> PlaybackState {
        if self.state == PlaybackState::Finished {
            return self.state;
        }

        if self.state == PlaybackState::Running {
            self.session.advance(SCROLL_STEP);
        }

        let retired = self.session.retire();
        if retired > 0 && self.verbose {
            debug!("Retired {} element(s) at frame {}", retired, self.frames);
        }

        self.refresh_gate();
        self.render();
        self.frames += 1;

        self.state
    }

    /// Judges a click and resumes the scroll if it released the gate.
    pub fn handle_click(&mut self, x: f64, y: f64) -> Judgement {
        let judgement = judge_click(self.session, x, y, self.engine);
        if let Judgement::Correct(_) = judgement {
            self.refresh_gate();
        }

        judgement
    }

    /// Briefly writes every note's letter under it. Blocks the loop while shown.
    pub fn show_note_names(&mut self, hold: Duration) {
        for note in self.session.notes() {
            note.draw_label(&mut self.labels);
        }
        self.surface.present_frame();

        spin_sleep::sleep(hold);

        self.labels.clear();
        self.surface.present_frame();
    }

    fn refresh_gate(&mut self) {
        let next = if self.session.is_finished() {
            PlaybackState::Finished
        } else {
            match self.session.gating_note() {
                Some(note) if note.x() < JUDGE_X => PlaybackState::WaitingForInput,
                _ => PlaybackState::Running,
            }
        };

        if next != self.state {
            debug!(
                "{:?} -> {:?} at frame {}",
                self.state, next, self.frames
            );
            self.state = next;
        }
    }

    /// Returns true once a stop has been requested.
    fn process_controls(&mut self) -> bool {
        for (x, y) in self.surface.drain_clicks() {
            self.handle_click(x, y);
        }

        loop {
            match self.control_rx.try_recv() {
                Ok(ControlMsg::Stop) => return true,
                Ok(ControlMsg::Click { x, y }) => {
                    self.handle_click(x, y);
                }
                Ok(ControlMsg::ShowNoteNames) => self.show_note_names(NOTE_NAMES_HOLD),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn autoplay_step(&mut self) {
        if self.state != PlaybackState::WaitingForInput {
            return;
        }

        let Some(pitch) = self.session.gating_note().map(|note| note.pitch()) else {
            return;
        };

        match key_center(pitch) {
            Some((x, y)) => {
                if self.verbose {
                    info!("Autoplay clicking {} at ({:.1}, {:.1})", pitch, x, y);
                }
                self.handle_click(x, y);
            }
            None => {
                warn!("Midi {} is off the keyboard, playing it directly..!", pitch);
                check_correct(self.session, pitch, self.engine);
                self.refresh_gate();
            }
        }
    }

    fn render(&mut self) {
        self.notes.clear();
        self.session.draw(&mut self.notes);
        self.surface.present_frame();
    }
}

fn draw_staff(pen: &mut dyn Drawable, title: &str) {
    pen.set_color(Color::Black);
    for y in staff_line_positions() {
        pen.move_to(-WINDOW_WIDTH / 2.0, y);
        pen.pen_down();
        pen.set_heading(0.0);
        pen.draw_line(WINDOW_WIDTH);
        pen.pen_up();
    }

    pen.move_to(-WINDOW_WIDTH / 2.3, staff_line_positions()[0] + NOTE_DISTANCE * 3.25);
    pen.write_text("𝄞", 60);

    pen.move_to(-375.0, WINDOW_HEIGHT / 2.0 - 50.0);
    pen.write_text(title, TITLE_FONT_SIZE);
}
