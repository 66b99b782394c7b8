//! Terminal backend: the crossterm implementations of the display surface,
//! keyboard input and frame clock.
//!
//! The 40×25 character screen is kept in memory with a dirty flag per cell;
//! `flush` sends only dirty cells.  Sprites have no hardware here, so they
//! are drawn as glyph overlays at the character cell under their pixel
//! position.

use std::collections::HashMap;
use std::io::Write;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    style::{self, Color as TermColor, Print},
    terminal, QueueableCommand,
};

use c64_arcade::hal::{
    x_to_col, y_to_row, Color, Controls, DisplaySurface, FrameClock, Glyph, InputSource, SpriteId, SpriteImage,
    SpriteState, MAX_SPRITES, SCREEN_COLS, SCREEN_ROWS,
};

// ── Glyphs & colours ──────────────────────────────────────────────────────────

fn glyph_char(glyph: Glyph) -> char {
    match glyph {
        Glyph::Blank => ' ',
        Glyph::Wall => '█',
        Glyph::Brick => '▆',
        Glyph::Shield => '▓',
        Glyph::MeteorLeft => '(',
        Glyph::MeteorRight => ')',
        Glyph::MeteorSmall => 'o',
        Glyph::Explosion => '*',
        Glyph::ExplosionFading => '+',
        Glyph::StarDim => '.',
        Glyph::StarBright => '∙',
        Glyph::Ground => '▔',
        Glyph::Shot => '|',
        Glyph::Text(c) => c,
    }
}

fn term_color(color: Color) -> TermColor {
    match color {
        Color::Black => TermColor::Black,
        Color::White => TermColor::White,
        Color::Red => TermColor::DarkRed,
        Color::Cyan => TermColor::Cyan,
        Color::Purple => TermColor::Magenta,
        Color::Green => TermColor::DarkGreen,
        Color::Blue => TermColor::DarkBlue,
        Color::Yellow => TermColor::Yellow,
        Color::Orange => TermColor::Rgb { r: 0xdd, g: 0x88, b: 0x55 },
        Color::Brown => TermColor::Rgb { r: 0x66, g: 0x44, b: 0x00 },
        Color::LightRed => TermColor::Red,
        Color::Grey1 => TermColor::DarkGrey,
        Color::Grey2 => TermColor::Grey,
        Color::LightGreen => TermColor::Green,
        Color::LightBlue => TermColor::Blue,
        Color::Grey3 => TermColor::White,
    }
}

/// Characters a sprite covers, left to right.
fn sprite_text(image: SpriteImage) -> String {
    match image {
        SpriteImage::Paddle { width } => "=".repeat((usize::from(width) / 8).max(1)),
        SpriteImage::Ball => "●".to_string(),
        SpriteImage::Ship => "▲".to_string(),
        SpriteImage::Bullet => "║".to_string(),
        SpriteImage::PowerUp => "◆".to_string(),
        SpriteImage::Ufo => "<=>".to_string(),
    }
}

// ── Screen ────────────────────────────────────────────────────────────────────

pub struct Screen<W: Write> {
    out: W,
    cells: Vec<(Glyph, Color)>,
    dirty: Vec<bool>,
    sprites: [SpriteState; MAX_SPRITES],
    /// Cells covered by sprites at the last flush.
    overlay: Vec<usize>,
}

impl<W: Write> Screen<W> {
    pub fn new(out: W) -> Self {
        Screen {
            out,
            cells: vec![(Glyph::Blank, Color::Black); SCREEN_COLS * SCREEN_ROWS],
            dirty: vec![true; SCREEN_COLS * SCREEN_ROWS],
            sprites: [SpriteState::default(); MAX_SPRITES],
            overlay: Vec::new(),
        }
    }

    pub fn clear(&mut self) -> std::io::Result<()> {
        self.out.queue(terminal::Clear(terminal::ClearType::All))?;
        self.dirty.fill(true);
        Ok(())
    }

    /// Sprite glyphs for this frame, keyed by cell index.
    fn sprite_cells(&self) -> HashMap<usize, (char, Color)> {
        let mut cells = HashMap::new();
        for sprite in self.sprites.iter().filter(|s| s.visible) {
            let Some(image) = sprite.image else { continue };
            let col = x_to_col(sprite.x);
            let row = y_to_row(sprite.y);
            for (i, ch) in sprite_text(image).chars().enumerate() {
                let c = col + i as i32;
                if (0..SCREEN_COLS as i32).contains(&c) && (0..SCREEN_ROWS as i32).contains(&row) {
                    cells.insert(row as usize * SCREEN_COLS + c as usize, (ch, sprite.color));
                }
            }
        }
        cells
    }

    /// Write every dirty cell, with sprites on top.
    pub fn flush(&mut self) -> std::io::Result<()> {
        let sprites = self.sprite_cells();
        for i in self.overlay.drain(..) {
            self.dirty[i] = true;
        }
        for &i in sprites.keys() {
            self.dirty[i] = true;
        }

        for i in 0..self.cells.len() {
            if !self.dirty[i] {
                continue;
            }
            let (ch, color) = match sprites.get(&i) {
                Some(&s) => s,
                None => {
                    let (glyph, color) = self.cells[i];
                    (glyph_char(glyph), color)
                }
            };
            self.out.queue(cursor::MoveTo((i % SCREEN_COLS) as u16, (i / SCREEN_COLS) as u16))?;
            self.out.queue(style::SetForegroundColor(term_color(color)))?;
            self.out.queue(Print(ch))?;
            self.dirty[i] = false;
        }
        self.overlay = sprites.into_keys().collect();

        // Park cursor in a harmless spot and flush
        self.out.queue(style::ResetColor)?;
        self.out.queue(cursor::MoveTo(0, SCREEN_ROWS as u16))?;
        self.out.flush()
    }
}

impl<W: Write> DisplaySurface for Screen<W> {
    fn set_cell(&mut self, col: usize, row: usize, glyph: Glyph, color: Color) {
        if col >= SCREEN_COLS || row >= SCREEN_ROWS {
            return;
        }
        let i = row * SCREEN_COLS + col;
        if self.cells[i] != (glyph, color) {
            self.cells[i] = (glyph, color);
            self.dirty[i] = true;
        }
    }

    fn get_cell(&self, col: usize, row: usize) -> Glyph {
        if col >= SCREEN_COLS || row >= SCREEN_ROWS {
            return Glyph::Blank;
        }
        self.cells[row * SCREEN_COLS + col].0
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

// ── Keyboard ──────────────────────────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this long.  Covers terminals that don't emit key-release events: the OS
/// key-repeat rate is ≥ 15 Hz, so the window is refreshed before expiry.
const HOLD_TIME: Duration = Duration::from_millis(133);

/// Spawn the thread that blocks on terminal events and forwards them.
pub fn spawn_event_reader() -> mpsc::Receiver<Event> {
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = crossterm::event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });
    rx
}

/// Joystick emulation on the keyboard.
///
/// Each key maps to the frame it was last seen on (press or repeat); a key
/// counts as held while that frame is within the hold window, or until a
/// release event arrives on terminals that report them.  This lets fire
/// and a direction be held together.
pub struct KeyboardInput {
    rx: mpsc::Receiver<Event>,
    key_frame: HashMap<KeyCode, u64>,
    frame: u64,
    hold_window: u64,
    quit: bool,
}

impl KeyboardInput {
    pub fn new(rx: mpsc::Receiver<Event>, frame: Duration) -> Self {
        let hold_window = (HOLD_TIME.as_micros() / frame.as_micros().max(1)).max(2) as u64;
        KeyboardInput { rx, key_frame: HashMap::new(), frame: 0, hold_window, quit: false }
    }

    fn is_held(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|key| {
            self.key_frame
                .get(key)
                .map(|&last| self.frame.saturating_sub(last) <= self.hold_window)
                .unwrap_or(false)
        })
    }
}

impl InputSource for KeyboardInput {
    fn poll(&mut self) -> Controls {
        self.frame += 1;

        // Drain all pending input events (non-blocking)
        while let Ok(ev) = self.rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    self.key_frame.insert(code.clone(), self.frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.quit = true,
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => self.quit = true,
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    self.key_frame.insert(code, self.frame);
                }
                KeyEventKind::Release => {
                    self.key_frame.remove(&code);
                }
            }
        }

        Controls {
            left: self.is_held(&[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')]),
            right: self.is_held(&[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')]),
            fire: self.is_held(&[KeyCode::Char(' '), KeyCode::Up]),
            quit: self.quit,
        }
    }
}

// ── Frame clock ───────────────────────────────────────────────────────────────

/// Sleeps away whatever is left of the frame.
pub struct SleepClock {
    frame: Duration,
    last: Instant,
}

impl SleepClock {
    pub fn new(frame: Duration) -> Self {
        SleepClock { frame, last: Instant::now() }
    }
}

impl FrameClock for SleepClock {
    fn wait_next_frame(&mut self) {
        let elapsed = self.last.elapsed();
        if elapsed < self.frame {
            thread::sleep(self.frame - elapsed);
        }
        self.last = Instant::now();
    }
}
