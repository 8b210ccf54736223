use super::{Color, Drawable, Surface};
use log::trace;
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    MoveTo(f64, f64),
    PenDown,
    PenUp,
    Heading(f64),
    Arc { radius: f64, degrees: f64 },
    Line(f64),
    BeginFill,
    EndFill,
    Color(Color),
    Text(String),
}

#[derive(Debug, Default)]
struct Canvas {
    layers: BTreeMap<usize, Vec<DrawOp>>,
    next_id: usize,
    frames: usize,
}

/// Shared view of everything drawn on a [`HeadlessSurface`].
#[derive(Debug, Clone, Default)]
pub struct Recorder(Rc<RefCell<Canvas>>);

impl Recorder {
    /// All operations still on screen, oldest drawable first.
    pub fn ops(&self) -> Vec<DrawOp> {
        self.0.borrow().layers.values().flatten().cloned().collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                DrawOp::Text(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn frames(&self) -> usize {
        self.0.borrow().frames
    }

    pub fn live_drawables(&self) -> usize {
        self.0.borrow().layers.len()
    }

    fn push(&self, id: usize, op: DrawOp) {
        trace!("pen {}: {:?}", id, op);
        self.0.borrow_mut().layers.entry(id).or_default().push(op);
    }
}

/// A surface with no window behind it. Draw calls are recorded and logged at trace level,
/// clicks are queued with [`HeadlessSurface::push_click`].
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    recorder: Recorder,
    clicks: VecDeque<(f64, f64)>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorder(&self) -> Recorder {
        self.recorder.clone()
    }

    pub fn push_click(&mut self, x: f64, y: f64) {
        self.clicks.push_back((x, y));
    }
}

impl Surface for HeadlessSurface {
    type Pen = HeadlessPen;

    fn create_drawable(&mut self) -> HeadlessPen {
        let id = {
            let mut canvas = self.recorder.0.borrow_mut();
            let id = canvas.next_id;
            canvas.next_id += 1;
            canvas.layers.insert(id, Vec::new());
            id
        };

        HeadlessPen {
            id,
            recorder: self.recorder.clone(),
        }
    }

    fn drain_clicks(&mut self) -> Vec<(f64, f64)> {
        self.clicks.drain(..).collect()
    }

    fn present_frame(&mut self) {
        let mut canvas = self.recorder.0.borrow_mut();
        canvas.frames += 1;
        trace!(
            "Presented frame {} ({} drawables)",
            canvas.frames,
            canvas.layers.len()
        );
    }
}

#[derive(Debug)]
pub struct HeadlessPen {
    id: usize,
    recorder: Recorder,
}

impl Drawable for HeadlessPen {
    fn move_to(&mut self, x: f64, y: f64) {
        self.recorder.push(self.id, DrawOp::MoveTo(x, y));
    }

    fn pen_down(&mut self) {
        self.recorder.push(self.id, DrawOp::PenDown);
    }

    fn pen_up(&mut self) {
        self.recorder.push(self.id, DrawOp::PenUp);
    }

    fn set_heading(&mut self, degrees: f64) {
        self.recorder.push(self.id, DrawOp::Heading(degrees));
    }

    fn draw_arc(&mut self, radius: f64, degrees: f64) {
        self.recorder.push(self.id, DrawOp::Arc { radius, degrees });
    }

    fn draw_line(&mut self, length: f64) {
        self.recorder.push(self.id, DrawOp::Line(length));
    }

    fn begin_fill(&mut self) {
        self.recorder.push(self.id, DrawOp::BeginFill);
    }

    fn end_fill(&mut self) {
        self.recorder.push(self.id, DrawOp::EndFill);
    }

    fn set_color(&mut self, color: Color) {
        self.recorder.push(self.id, DrawOp::Color(color));
    }

    fn write_text(&mut self, text: &str, _font_size: u32) {
        self.recorder.push(self.id, DrawOp::Text(text.to_string()));
    }

    fn clear(&mut self) {
        if let Some(layer) = self.recorder.0.borrow_mut().layers.get_mut(&self.id) {
            layer.clear();
        }
    }
}

impl Drop for HeadlessPen {
    fn drop(&mut self) {
        self.recorder.0.borrow_mut().layers.remove(&self.id);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pens_record_and_clear() {
        let mut surface = HeadlessSurface::new();
        let recorder = surface.recorder();

        let mut pen = surface.create_drawable();
        pen.move_to(1.0, 2.0);
        pen.write_text("C", 30);
        assert_eq!(recorder.texts(), vec!["C".to_string()]);

        pen.clear();
        assert!(recorder.ops().is_empty());
        assert_eq!(recorder.live_drawables(), 1);

        drop(pen);
        assert_eq!(recorder.live_drawables(), 0);
    }

    #[test]
    fn clicks_drain_in_order() {
        let mut surface = HeadlessSurface::new();
        surface.push_click(1.0, -200.0);
        surface.push_click(2.0, -150.0);

        assert_eq!(surface.drain_clicks(), vec![(1.0, -200.0), (2.0, -150.0)]);
        assert!(surface.drain_clicks().is_empty());

        surface.present_frame();
        assert_eq!(surface.recorder().frames(), 1);
    }
}
