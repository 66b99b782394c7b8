//! Command-line configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{ArcadeError, Result};
use crate::machine::MachineConfig;

pub const MIN_LIVES: u8 = 1;
pub const MAX_LIVES: u8 = 9;
pub const MIN_FPS: u32 = 10;
pub const MAX_FPS: u32 = 120;
/// PAL frame rate.
pub const DEFAULT_FPS: u32 = 50;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameKind {
    Arkanoid,
    Breakout,
    /// Meteor Storm.
    Meteor,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "c64_arcade", version, about = "Frame-locked arcade games in the terminal")]
pub struct Cli {
    /// Which game to play
    #[arg(long, value_enum, default_value_t = GameKind::Arkanoid)]
    pub game: GameKind,

    /// Seed for a reproducible session
    #[arg(long)]
    pub seed: Option<u64>,

    /// Starting lives (1-9)
    #[arg(long, default_value_t = 3)]
    pub lives: u8,

    /// Frames per second (10-120)
    #[arg(long, default_value_t = DEFAULT_FPS)]
    pub fps: u32,

    /// Skip the title screen and start the demo
    #[arg(long)]
    pub demo: bool,

    /// Write log output to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_LIVES..=MAX_LIVES).contains(&self.lives) {
            return Err(ArcadeError::invalid(
                "lives",
                format!("{} is outside {MIN_LIVES}..={MAX_LIVES}", self.lives),
            ));
        }
        if !(MIN_FPS..=MAX_FPS).contains(&self.fps) {
            return Err(ArcadeError::invalid("fps", format!("{} is outside {MIN_FPS}..={MAX_FPS}", self.fps)));
        }
        Ok(())
    }

    pub fn machine_config(&self) -> Result<MachineConfig> {
        self.validate()?;
        Ok(MachineConfig { lives: self.lives, ..MachineConfig::default() })
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.fps.clamp(MIN_FPS, MAX_FPS)))
    }

    /// Seeded when `--seed` was given, otherwise from OS entropy.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
