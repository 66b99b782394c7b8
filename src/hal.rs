//! Hardware abstraction: the display surface, tone generator, input and
//! frame clock the game loop talks to.
//!
//! The coordinate system follows the C64 screen: a 40×25 character
//! grid, and sprites positioned in pixels where character column `c` starts
//! at x = 24 + 8c and character row `r` at y = 50 + 8r.

use std::collections::VecDeque;

// ── Geometry ─────────────────────────────────────────────────────────────────

pub const SCREEN_COLS: usize = 40;
pub const SCREEN_ROWS: usize = 25;

/// Pixel x of character column 0.
pub const SPRITE_X_OFFSET: i32 = 24;
/// Pixel y of character row 0.
pub const SPRITE_Y_OFFSET: i32 = 50;

pub const MAX_SPRITES: usize = 8;

pub const fn col_to_x(col: i32) -> i32 {
    SPRITE_X_OFFSET + col * 8
}

pub const fn row_to_y(row: i32) -> i32 {
    SPRITE_Y_OFFSET + row * 8
}

/// Character column under pixel `x` (floors for negative offsets).
pub const fn x_to_col(x: i32) -> i32 {
    (x - SPRITE_X_OFFSET) >> 3
}

pub const fn y_to_row(y: i32) -> i32 {
    (y - SPRITE_Y_OFFSET) >> 3
}

// ── Display ──────────────────────────────────────────────────────────────────

/// The sixteen-colour palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
    Red,
    Cyan,
    Purple,
    Green,
    Blue,
    Yellow,
    Orange,
    Brown,
    LightRed,
    Grey1,
    Grey2,
    LightGreen,
    LightBlue,
    Grey3,
}

/// What occupies a character cell.  Artwork for each glyph belongs to the
/// backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Glyph {
    Blank,
    Wall,
    Brick,
    Shield,
    MeteorLeft,
    MeteorRight,
    MeteorSmall,
    Explosion,
    ExplosionFading,
    StarDim,
    StarBright,
    Ground,
    /// Character-mode bullet (the second double-shot bullet).
    Shot,
    Text(char),
}

impl Glyph {
    pub fn is_star(self) -> bool {
        matches!(self, Glyph::StarDim | Glyph::StarBright)
    }

    pub fn is_explosion(self) -> bool {
        matches!(self, Glyph::Explosion | Glyph::ExplosionFading)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpriteId(pub u8);

impl SpriteId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Opaque sprite artwork.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpriteImage {
    /// Horizontal bar `width` pixels wide.
    Paddle { width: u8 },
    Ball,
    Ship,
    Bullet,
    PowerUp,
    Ufo,
}

pub trait DisplaySurface {
    fn set_cell(&mut self, col: usize, row: usize, glyph: Glyph, color: Color);
    fn get_cell(&self, col: usize, row: usize) -> Glyph;
    fn set_sprite_image(&mut self, id: SpriteId, image: SpriteImage, color: Color);
    fn set_sprite_position(&mut self, id: SpriteId, x: i32, y: i32);
    fn set_sprite_visible(&mut self, id: SpriteId, visible: bool);
}

// ── Audio ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Voice {
    One,
    Two,
    Three,
}

impl Voice {
    pub const ALL: [Voice; 3] = [Voice::One, Voice::Two, Voice::Three];

    pub fn index(self) -> usize {
        match self {
            Voice::One => 0,
            Voice::Two => 1,
            Voice::Three => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Waveform {
    Triangle,
    Sawtooth,
    Pulse,
    Noise,
}

/// Fire-and-forget tone generator.  `frequency` is the raw 16-bit
/// oscillator register value.
pub trait Audio {
    fn play_tone(&mut self, voice: Voice, waveform: Waveform, frequency: u16, gate_on: bool);
    fn stop(&mut self, voice: Voice);
}

// ── Input & timing ───────────────────────────────────────────────────────────

/// Joystick state sampled once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    /// Leave the program (keyboard only; a joystick has no such button).
    pub quit: bool,
}

impl Controls {
    pub const IDLE: Controls = Controls { left: false, right: false, fire: false, quit: false };

    pub fn left() -> Self {
        Controls { left: true, ..Self::IDLE }
    }

    pub fn right() -> Self {
        Controls { right: true, ..Self::IDLE }
    }

    pub fn fire() -> Self {
        Controls { fire: true, ..Self::IDLE }
    }
}

pub trait InputSource {
    fn poll(&mut self) -> Controls;
}

/// Blocks until the next vertical-blank-equivalent tick.
pub trait FrameClock {
    fn wait_next_frame(&mut self);
}

// ── In-memory implementations ────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteState {
    pub image: Option<SpriteImage>,
    pub color: Color,
    pub x: i32,
    pub y: i32,
    pub visible: bool,
}

impl Default for SpriteState {
    fn default() -> Self {
        SpriteState { image: None, color: Color::White, x: 0, y: 0, visible: false }
    }
}

/// A display surface held entirely in memory.  Counts cell writes so tests
/// can check that unchanged cells are not re-sent.
#[derive(Clone, Debug)]
pub struct CellBuffer {
    cells: Vec<(Glyph, Color)>,
    sprites: [SpriteState; MAX_SPRITES],
    writes: usize,
}

impl Default for CellBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl CellBuffer {
    pub fn new() -> Self {
        CellBuffer {
            cells: vec![(Glyph::Blank, Color::Black); SCREEN_COLS * SCREEN_ROWS],
            sprites: [SpriteState::default(); MAX_SPRITES],
            writes: 0,
        }
    }

    pub fn cell(&self, col: usize, row: usize) -> (Glyph, Color) {
        if col >= SCREEN_COLS || row >= SCREEN_ROWS {
            return (Glyph::Blank, Color::Black);
        }
        self.cells[row * SCREEN_COLS + col]
    }

    pub fn sprite(&self, id: SpriteId) -> SpriteState {
        self.sprites.get(id.index()).copied().unwrap_or_default()
    }

    /// Text characters on `row`; every non-text cell reads as a space.
    pub fn row_text(&self, row: usize) -> String {
        (0..SCREEN_COLS)
            .map(|col| match self.cell(col, row).0 {
                Glyph::Text(c) => c,
                _ => ' ',
            })
            .collect()
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn reset_write_count(&mut self) {
        self.writes = 0;
    }
}

impl DisplaySurface for CellBuffer {
    fn set_cell(&mut self, col: usize, row: usize, glyph: Glyph, color: Color) {
        if col >= SCREEN_COLS || row >= SCREEN_ROWS {
            return;
        }
        self.cells[row * SCREEN_COLS + col] = (glyph, color);
        self.writes += 1;
    }

    fn get_cell(&self, col: usize, row: usize) -> Glyph {
        self.cell(col, row).0
    }

    fn set_sprite_image(&mut self, id: SpriteId, image: SpriteImage, color: Color) {
        if let Some(s) = self.sprites.get_mut(id.index()) {
            s.image = Some(image);
            s.color = color;
        }
    }

    fn set_sprite_position(&mut self, id: SpriteId, x: i32, y: i32) {
        if let Some(s) = self.sprites.get_mut(id.index()) {
            s.x = x;
            s.y = y;
        }
    }

    fn set_sprite_visible(&mut self, id: SpriteId, visible: bool) {
        if let Some(s) = self.sprites.get_mut(id.index()) {
            s.visible = visible;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioEvent {
    Tone { voice: Voice, waveform: Waveform, frequency: u16, gate_on: bool },
    Stop(Voice),
}

/// Records every call, in order.
#[derive(Clone, Debug, Default)]
pub struct RecordingAudio {
    pub events: Vec<AudioEvent>,
}

impl RecordingAudio {
    pub fn tones_on(&self, voice: Voice) -> Vec<u16> {
        self.events
            .iter()
            .filter_map(|e| match *e {
                AudioEvent::Tone { voice: v, frequency, gate_on: true, .. } if v == voice => {
                    Some(frequency)
                }
                _ => None,
            })
            .collect()
    }
}

impl Audio for RecordingAudio {
    fn play_tone(&mut self, voice: Voice, waveform: Waveform, frequency: u16, gate_on: bool) {
        self.events.push(AudioEvent::Tone { voice, waveform, frequency, gate_on });
    }

    fn stop(&mut self, voice: Voice) {
        self.events.push(AudioEvent::Stop(voice));
    }
}

/// Audio sink for hosts without a tone generator: every call becomes a
/// `trace!` line.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogAudio;

impl Audio for LogAudio {
    fn play_tone(&mut self, voice: Voice, waveform: Waveform, frequency: u16, gate_on: bool) {
        log::trace!("tone {voice:?} {waveform:?} ${frequency:04X} gate={gate_on}");
    }

    fn stop(&mut self, voice: Voice) {
        log::trace!("stop {voice:?}");
    }
}

/// Replays a fixed list of frames, then reports idle controls forever.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    script: VecDeque<Controls>,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = Controls>) -> Self {
        ScriptedInput { script: frames.into_iter().collect() }
    }

    /// Append `count` frames of the same controls.
    pub fn hold(mut self, controls: Controls, count: usize) -> Self {
        self.script.extend(std::iter::repeat(controls).take(count));
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Controls {
        self.script.pop_front().unwrap_or_default()
    }
}

/// A clock that never sleeps; it only counts ticks.
#[derive(Clone, Copy, Debug, Default)]
pub struct ManualClock {
    pub ticks: u64,
}

impl FrameClock for ManualClock {
    fn wait_next_frame(&mut self) {
        self.ticks += 1;
    }
}
