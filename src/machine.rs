//! The phase machine every game runs under.
//!
//! `Machine` owns one game state and walks it through
//! Title → Launch → Playing → Dying/Won → … once per frame.  All
//! transitions are decided inside `step`; nothing blocks.

use rand::Rng;

use crate::display::{compose, Canvas, View};
use crate::entities::{Hud, Phase};
use crate::hal::{Audio, Controls, DisplaySurface, FrameClock, InputSource};
use crate::sound::{Jingle, SoundBoard};

/// What one frame of play ended in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    /// The player lost the ball or the ship.
    Died,
    /// Level or wave complete.
    Cleared,
}

/// The rules a concrete game plugs into the machine.
pub trait Game {
    fn name(&self) -> &'static str;
    /// "LEVEL" or "WAVE", for the HUD and the clear message.
    fn level_word(&self) -> &'static str;
    fn hud(&self) -> &Hud;
    fn hud_mut(&mut self) -> &mut Hud;

    /// Fresh game at level 1 with `lives`.
    fn new_game<R: Rng>(&mut self, lives: u8, rng: &mut R);
    /// Put the player back at the start position.
    fn reset_round(&mut self);
    /// Frames `Launch` waits before releasing by itself.
    fn serve_delay(&self) -> u16;
    /// One frame of `Launch`: the player may move, nothing else runs.
    fn hold(&mut self, controls: &Controls);
    fn launch(&mut self, sound: &mut SoundBoard);
    fn play<R: Rng>(&mut self, controls: &Controls, rng: &mut R, sound: &mut SoundBoard) -> Outcome;
    fn next_level<R: Rng>(&mut self, rng: &mut R);
    /// Demo-mode input.
    fn autopilot(&self, frame: u32) -> Controls;
    fn draw(&self, canvas: &mut Canvas);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MachineConfig {
    pub lives: u8,
    /// Idle title frames before the demo starts.
    pub title_timeout: u16,
    pub won_frames: u8,
    pub lost_frames: u8,
    /// Demo serves on every n-th frame.
    pub demo_serve_every: u32,
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            lives: 3,
            title_timeout: 300,
            won_frames: 180,
            lost_frames: 240,
            demo_serve_every: 64,
        }
    }
}

pub struct Machine<G: Game> {
    pub game: G,
    pub phase: Phase,
    pub demo: bool,
    /// Frames since the machine was created.
    pub frame: u32,
    pub sound: SoundBoard,
    config: MachineConfig,
    prev_fire: bool,
    canvas: Canvas,
}

impl<G: Game> Machine<G> {
    pub fn new(game: G, config: MachineConfig) -> Self {
        Machine {
            game,
            phase: Phase::Title { timer: 0 },
            demo: false,
            frame: 0,
            sound: SoundBoard::new(),
            config,
            prev_fire: false,
            canvas: Canvas::new(),
        }
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Start a game driven by the player.
    pub fn start_game<R: Rng>(&mut self, rng: &mut R) {
        self.begin(false, rng);
    }

    /// Start an unattended game driven by the autopilot.
    pub fn start_demo<R: Rng>(&mut self, rng: &mut R) {
        self.begin(true, rng);
    }

    /// Advance one frame and return the phase the machine is now in.
    pub fn step<R: Rng, A: Audio>(&mut self, input: Controls, rng: &mut R, audio: &mut A) -> Phase {
        self.sound.begin_frame(audio);
        self.frame = self.frame.wrapping_add(1);

        let pressed = input.fire && !self.prev_fire;
        self.prev_fire = input.fire;
        let controls = if self.demo { self.game.autopilot(self.frame) } else { input };

        let before = self.phase;
        let next = match before {
            Phase::Title { timer } => {
                let timer = timer.saturating_add(1);
                if pressed {
                    self.begin(false, rng);
                    self.phase
                } else if timer >= self.config.title_timeout {
                    self.begin(true, rng);
                    self.phase
                } else {
                    Phase::Title { timer }
                }
            }

            Phase::Launch { timer } => {
                if self.demo && pressed {
                    self.to_title(audio)
                } else {
                    self.game.hold(&controls);
                    let timer = timer.saturating_add(1);
                    let serve = if self.demo {
                        self.frame % self.config.demo_serve_every.max(1) == 0
                    } else {
                        pressed || timer >= self.game.serve_delay()
                    };
                    if serve {
                        self.game.launch(&mut self.sound);
                        Phase::Playing
                    } else {
                        Phase::Launch { timer }
                    }
                }
            }

            Phase::Playing => {
                if self.demo && pressed {
                    self.to_title(audio)
                } else {
                    match self.game.play(&controls, rng, &mut self.sound) {
                        Outcome::Continue => Phase::Playing,
                        Outcome::Died => {
                            let frames = self.sound.start_jingle(Jingle::Death);
                            log::debug!("player died, {} lives before the loss", self.game.hud().lives);
                            Phase::Dying { timer: frames.max(1) }
                        }
                        Outcome::Cleared => {
                            self.sound.start_jingle(Jingle::Victory);
                            log::debug!("{} {} cleared", self.game.level_word(), self.game.hud().level);
                            Phase::Won { timer: self.config.won_frames.max(1) }
                        }
                    }
                }
            }

            Phase::Dying { timer } if timer > 1 => Phase::Dying { timer: timer - 1 },
            Phase::Dying { .. } => self.lose_life(),

            Phase::Won { timer } if timer > 1 => Phase::Won { timer: timer - 1 },
            Phase::Won { .. } => {
                if self.demo {
                    self.to_title(audio)
                } else {
                    self.game.next_level(rng);
                    self.game.reset_round();
                    Phase::Launch { timer: 0 }
                }
            }

            Phase::Lost { timer } if timer > 1 => Phase::Lost { timer: timer - 1 },
            Phase::Lost { .. } => self.to_title(audio),
        };

        if std::mem::discriminant(&before) != std::mem::discriminant(&next) {
            log::debug!("phase {before:?} -> {next:?}");
        }
        self.phase = next;
        self.sound.end_frame(audio);
        next
    }

    /// Compose this frame and send the changes to `surface`.
    pub fn render(&mut self, surface: &mut impl DisplaySurface) -> usize {
        let view = View { phase: self.phase, demo: self.demo, frame: self.frame };
        compose(&mut self.canvas, &self.game, &view);
        self.canvas.present(surface)
    }

    fn begin<R: Rng>(&mut self, demo: bool, rng: &mut R) {
        self.demo = demo;
        self.game.new_game(self.config.lives, rng);
        self.game.reset_round();
        self.phase = Phase::Launch { timer: 0 };
        log::debug!("{} started{}", self.game.name(), if demo { " (demo)" } else { "" });
    }

    fn lose_life(&mut self) -> Phase {
        let hud = self.game.hud_mut();
        hud.lives = hud.lives.saturating_sub(1);
        if hud.lives > 0 {
            self.game.reset_round();
            Phase::Launch { timer: 0 }
        } else {
            log::debug!("game over, score {}", self.game.hud().score);
            Phase::Lost { timer: self.config.lost_frames.max(1) }
        }
    }

    fn to_title<A: Audio>(&mut self, audio: &mut A) -> Phase {
        self.demo = false;
        self.sound.silence(audio);
        Phase::Title { timer: 0 }
    }
}

/// Drive `machine` headless until `quit` is pressed or `max_frames` pass.
/// Returns the number of frames stepped.
pub fn run<G: Game, R: Rng>(
    machine: &mut Machine<G>,
    input: &mut impl InputSource,
    clock: &mut impl FrameClock,
    surface: &mut impl DisplaySurface,
    audio: &mut impl Audio,
    rng: &mut R,
    max_frames: Option<u64>,
) -> u64 {
    let mut frames = 0u64;
    while max_frames.map_or(true, |max| frames < max) {
        clock.wait_next_frame();
        let controls = input.poll();
        if controls.quit {
            break;
        }
        machine.step(controls, rng, audio);
        machine.render(surface);
        frames += 1;
    }
    machine.sound.silence(audio);
    frames
}
