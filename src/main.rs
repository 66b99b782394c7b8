mod terminal;

use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    terminal as term, ExecutableCommand,
};
use rand::Rng;

use c64_arcade::config::{Cli, GameKind};
use c64_arcade::entities::{BallGame, MeteorGame};
use c64_arcade::error::ArcadeError;
use c64_arcade::hal::{FrameClock, InputSource, LogAudio};
use c64_arcade::machine::{Game, Machine, MachineConfig};

use terminal::{spawn_event_reader, KeyboardInput, Screen, SleepClock};

// ── Logging ───────────────────────────────────────────────────────────────────

/// Log lines must never land on the alternate screen: with `--log-file`
/// they go to the file, otherwise logging stays off unless `RUST_LOG` asks.
fn init_logging(cli: &Cli) -> Result<(), ArcadeError> {
    let default_filter = if cli.log_file.is_some() { "debug" } else { "off" };
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if let Some(path) = &cli.log_file {
        let file = File::create(path).map_err(|source| ArcadeError::LogFile { path: path.clone(), source })?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    // A logger may already be installed; keep it.
    let _ = builder.try_init();
    Ok(())
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Frame-locked loop: wait, read input, step, draw.  Returns when quit is
/// pressed.
fn game_loop<G: Game, W: Write>(
    machine: &mut Machine<G>,
    screen: &mut Screen<W>,
    input: &mut KeyboardInput,
    clock: &mut SleepClock,
    rng: &mut impl Rng,
) -> Result<()> {
    let mut audio = LogAudio;
    loop {
        clock.wait_next_frame();
        let controls = input.poll();
        if controls.quit {
            break;
        }
        machine.step(controls, rng, &mut audio);
        machine.render(screen);
        screen.flush().context("drawing frame")?;
    }
    machine.sound.silence(&mut audio);
    Ok(())
}

fn play<G: Game, W: Write>(game: G, config: MachineConfig, cli: &Cli, out: W, rx: mpsc::Receiver<Event>) -> Result<()> {
    let mut rng = cli.rng();
    let frame = cli.frame_duration();
    let mut input = KeyboardInput::new(rx, frame);
    let mut clock = SleepClock::new(frame);
    let mut screen = Screen::new(out);
    screen.clear().context("clearing screen")?;

    let mut machine = Machine::new(game, config);
    if cli.demo {
        machine.start_demo(&mut rng);
    }
    game_loop(&mut machine, &mut screen, &mut input, &mut clock, &mut rng)
}

fn run<W: Write>(cli: &Cli, config: MachineConfig, out: W, rx: mpsc::Receiver<Event>) -> Result<()> {
    match cli.game {
        GameKind::Arkanoid => play(BallGame::arkanoid(config.lives), config, cli, out, rx),
        GameKind::Breakout => play(BallGame::breakout(config.lives), config, cli, out, rx),
        GameKind::Meteor => play(MeteorGame::new(config.lives), config, cli, out, rx),
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.machine_config()?;
    init_logging(&cli)?;
    log::info!("starting {:?}, seed {:?}, {} fps", cli.game, cli.seed, cli.fps);

    let mut out = BufWriter::new(stdout());

    term::enable_raw_mode().context("enabling raw mode")?;
    out.execute(term::EnterAlternateScreen).context("entering alternate screen")?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))
        .is_ok();

    let rx = spawn_event_reader();
    let result = run(&cli, config, &mut out, rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(term::LeaveAlternateScreen);
    let _ = term::disable_raw_mode();

    if let Err(e) = &result {
        log::error!("{e:#}");
    }
    result
}
