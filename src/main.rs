use SHEET_SCROLL::{
    Args, ControlMsg, HeadlessSurface, PlaybackState, Player, SilentEngine, SongSelection,
    import_midi_file, parse_command,
};
use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{debug, info, warn};
use std::io::{self, BufRead};
use std::sync::mpsc::Sender;
use std::thread;

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(if args.verbose {
        "debug"
    } else {
        "info"
    }))
    .init();

    let mut selection = SongSelection::open(&args.catalog, &args.midi_dir)
        .with_context(|| format!("Failed to open catalog '{}'", args.catalog.display()))?;

    let Some(index) = args.song else {
        info!("{} song(s) in '{}':", selection.records().len(), args.catalog.display());
        for entry in selection.menu() {
            info!("  {}", entry);
        }
        info!("Pick one with `--song <N>`..!");
        return Ok(());
    };

    if args.dry_run {
        let record = selection.record(index)?;
        let path = selection.midi_path(record);
        let song = import_midi_file(&path)?;

        info!(
            "'{}': {} bpm, {} in file, {} in catalog, key {}..!",
            song.metadata.title.as_deref().unwrap_or("<unknown>"),
            song.metadata.tempo.bpm,
            song.metadata.time_signature,
            record.time_signature,
            record.key_signature
        );
        info!("Previewing at most {} notes..!", args.dry_run_max);
        for (i, note) in song.events.iter().take(args.dry_run_max).enumerate() {
            info!(
                "Note {}: pitch={} ({}) onset={:.3} length={:.3} end={:.3}",
                i,
                note.pitch,
                note.label(),
                note.onset(),
                note.length,
                note.absolute_time
            );
        }
        return Ok(());
    }

    let session = selection.select(index)?;
    debug!(
        "Loaded '{}' with {} notes and {} barlines..!",
        session.title(),
        session.notes().len(),
        session.barlines().len()
    );

    let mut surface = HeadlessSurface::new();
    let engine = SilentEngine;
    let mut player = Player::new(&mut surface, &engine, session)
        .with_autoplay(args.autoplay)
        .with_verbose(args.verbose)
        .with_delay(args.delay_start);

    let stop_tx = player.controller();
    ctrlc::set_handler(move || {
        warn!("Ctrl-C received, stopping playback..!");
        let _ = stop_tx.send(ControlMsg::Stop);
    })
    .context("Error setting Ctrl-C handler..!")?;

    spawn_stdin_reader(player.controller());

    match player.play() {
        PlaybackState::Finished => info!("Playback finished, exiting..!"),
        state => info!("Playback ended while {:?}, exiting..!", state),
    }

    drop(player);
    selection.close();

    Ok(())
}

/// Forwards commands typed on stdin to the player until either side goes away.
fn spawn_stdin_reader(control_tx: Sender<ControlMsg>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };

            if let Some(msg) = parse_command(&line) {
                if control_tx.send(msg).is_err() {
                    break;
                }
            }
        }
    });
}
