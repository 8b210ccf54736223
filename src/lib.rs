#![allow(non_snake_case)]

mod engine;
mod error;
mod keyboard;
mod midi_importer;
mod model;
mod notation;
mod player;
mod selection;
mod surface;
mod timeline;
mod util;

pub use engine::*;
pub use error::*;
pub use keyboard::*;
pub use midi_importer::*;
pub use model::catalog::*;
pub use model::config::*;
pub use model::song::*;
pub use notation::*;
pub use player::*;
pub use selection::*;
pub use surface::*;
pub use timeline::*;
pub use util::*;
