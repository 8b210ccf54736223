use crate::model::song::pitch_label;
use log::debug;

/// Produces the sound of a key once it has been played correctly.
pub trait SoundEngine {
    fn play_sound(&self, pitch: u8) -> anyhow::Result<()>;
}

/// Makes no sound at all, it only logs what would have been played.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentEngine;

impl SoundEngine for SilentEngine {
    fn play_sound(&self, pitch: u8) -> anyhow::Result<()> {
        debug!("(silent) {} ({})", pitch_label(pitch), pitch);
        Ok(())
    }
}

impl<E: SoundEngine + ?Sized> SoundEngine for &E {
    fn play_sound(&self, pitch: u8) -> anyhow::Result<()> {
        (**self).play_sound(pitch)
    }
}
