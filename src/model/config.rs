use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "SHEET_SCROLL",
    about = "Sight-read scrolling sheet music on a clickable piano!"
)]
pub struct Args {
    /// Path to the song catalog (CSV: file, time signature, pickup, key signature).
    #[arg(default_value = "MidiFiles.csv")]
    pub catalog: PathBuf,

    /// Directory the catalog's MIDI files live in.
    #[arg(short, long = "midi-dir", default_value = "midi_files")]
    pub midi_dir: PathBuf,

    /// Menu number of the song to play. Lists the catalog when omitted.
    #[arg(short, long)]
    pub song: Option<usize>,

    /// Dry run (print first dry_run_max decoded notes and exit).
    #[arg(short, long, default_value_t = false)]
    pub dry_run: bool,

    /// Maximum notes to print in dry run.
    #[arg(long, default_value_t = 80)]
    pub dry_run_max: usize,

    /// Answers every waiting note with the right key.
    #[arg(short, long, default_value_t = false)]
    pub autoplay: bool,

    /// Prints extra information to the terminal.
    #[arg(short, long)]
    pub verbose: bool,

    /// Delays the first frame by N seconds.
    #[arg(long = "delay-start", default_value_t = 0)]
    pub delay_start: u64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["SHEET_SCROLL"]).unwrap();
        assert_eq!(args.catalog, PathBuf::from("MidiFiles.csv"));
        assert_eq!(args.midi_dir, PathBuf::from("midi_files"));
        assert_eq!(args.song, None);
        assert!(!args.dry_run && !args.autoplay && !args.verbose);
        assert_eq!(args.dry_run_max, 80);
        assert_eq!(args.delay_start, 0);
    }

    #[test]
    fn song_and_flags() {
        let args = Args::try_parse_from([
            "SHEET_SCROLL",
            "songs.csv",
            "--midi-dir",
            "assets",
            "--song",
            "3",
            "--autoplay",
            "--delay-start",
            "2",
        ])
        .unwrap();

        assert_eq!(args.catalog, PathBuf::from("songs.csv"));
        assert_eq!(args.midi_dir, PathBuf::from("assets"));
        assert_eq!(args.song, Some(3));
        assert!(args.autoplay);
        assert_eq!(args.delay_start, 2);
    }
}
