mod headless;

pub use headless::{DrawOp, HeadlessSurface, Recorder};

/// Colors the core draws with. Named after the Tk palette entries they stand for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    Green,
    CadetBlue,
}

/// A turtle-style pen. Coordinates are centre-origin with y pointing up,
/// headings are degrees counter-clockwise from east.
///
/// Dropping a drawable removes everything it drew.
pub trait Drawable {
    fn move_to(&mut self, x: f64, y: f64);

    fn pen_down(&mut self);

    fn pen_up(&mut self);

    fn set_heading(&mut self, degrees: f64);

    /// Arc of `degrees` around a centre `radius` to the pen's left.
    fn draw_arc(&mut self, radius: f64, degrees: f64);

    /// Straight line of `length` along the current heading.
    fn draw_line(&mut self, length: f64);

    fn begin_fill(&mut self);

    fn end_fill(&mut self);

    fn set_color(&mut self, color: Color);

    fn write_text(&mut self, text: &str, font_size: u32);

    /// Erase everything this drawable has drawn so far.
    fn clear(&mut self);
}

pub trait Surface {
    type Pen: Drawable;

    fn create_drawable(&mut self) -> Self::Pen;

    /// Clicks delivered since the last call, in arrival order.
    fn drain_clicks(&mut self) -> Vec<(f64, f64)>;

    fn present_frame(&mut self);
}
