//! Presentation layer: turns game state into cells and sprites.
//!
//! A frame is composed into a `Canvas` from scratch, then `present` sends
//! only the cells and sprites that differ from what the surface already
//! shows.  No game logic is performed here.

pub mod court;
pub mod storm;

use crate::entities::Phase;
use crate::hal::{Color, DisplaySurface, Glyph, SpriteId, SpriteImage, MAX_SPRITES, SCREEN_COLS, SCREEN_ROWS};
use crate::machine::Game;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HUD_SCORE: Color = Color::White;
const C_HUD_LEVEL: Color = Color::LightBlue;
const C_HUD_DEMO: Color = Color::Green;
const C_HUD_LIVES: Color = Color::Yellow;
const C_TITLE: Color = Color::Orange;
const C_HINT: Color = Color::Cyan;
const C_CLEAR: Color = Color::Yellow;
const C_GAME_OVER: Color = Color::Red;

pub const HUD_ROW: i32 = 0;
/// Row the centred phase messages start on.
pub const MESSAGE_ROW: i32 = 11;

// ── Canvas ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteView {
    pub image: SpriteImage,
    pub color: Color,
    pub x: i32,
    pub y: i32,
}

/// The frame being composed, plus a copy of what was last presented.
#[derive(Clone, Debug)]
pub struct Canvas {
    cells: Vec<(Glyph, Color)>,
    shown: Option<Vec<(Glyph, Color)>>,
    sprites: [Option<SpriteView>; MAX_SPRITES],
    shown_sprites: [Option<SpriteView>; MAX_SPRITES],
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    pub fn new() -> Self {
        Canvas {
            cells: vec![(Glyph::Blank, Color::Black); SCREEN_COLS * SCREEN_ROWS],
            shown: None,
            sprites: [None; MAX_SPRITES],
            shown_sprites: [None; MAX_SPRITES],
        }
    }

    /// Blank every cell and hide every sprite.
    pub fn clear(&mut self) {
        self.cells.fill((Glyph::Blank, Color::Black));
        self.sprites = [None; MAX_SPRITES];
    }

    /// Off-screen writes are dropped.
    pub fn put(&mut self, col: i32, row: i32, glyph: Glyph, color: Color) {
        if let Some(i) = index(col, row) {
            self.cells[i] = (glyph, color);
        }
    }

    pub fn get(&self, col: i32, row: i32) -> (Glyph, Color) {
        index(col, row).map(|i| self.cells[i]).unwrap_or((Glyph::Blank, Color::Black))
    }

    pub fn text(&mut self, col: i32, row: i32, text: &str, color: Color) {
        for (i, ch) in text.chars().enumerate() {
            let glyph = if ch == ' ' { Glyph::Blank } else { Glyph::Text(ch) };
            self.put(col + i as i32, row, glyph, color);
        }
    }

    /// Text centred on the 40-column screen.
    pub fn centered(&mut self, row: i32, text: &str, color: Color) {
        let len = text.chars().count() as i32;
        self.text((SCREEN_COLS as i32 - len) / 2, row, text, color);
    }

    pub fn sprite(&mut self, id: SpriteId, image: SpriteImage, color: Color, x: i32, y: i32) {
        if let Some(slot) = self.sprites.get_mut(id.index()) {
            *slot = Some(SpriteView { image, color, x, y });
        }
    }

    pub fn sprite_at(&self, id: SpriteId) -> Option<SpriteView> {
        self.sprites.get(id.index()).copied().flatten()
    }

    /// Send the differences since the last `present`.  Returns the number of
    /// cells written.
    pub fn present(&mut self, surface: &mut impl DisplaySurface) -> usize {
        let mut writes = 0;
        for (i, &(glyph, color)) in self.cells.iter().enumerate() {
            let changed = self.shown.as_ref().map_or(true, |shown| shown[i] != (glyph, color));
            if changed {
                surface.set_cell(i % SCREEN_COLS, i / SCREEN_COLS, glyph, color);
                writes += 1;
            }
        }
        self.shown = Some(self.cells.clone());

        for (n, (now, before)) in self.sprites.iter().zip(self.shown_sprites.iter()).enumerate() {
            let id = SpriteId(n as u8);
            match (now, before) {
                (None, Some(_)) => surface.set_sprite_visible(id, false),
                (Some(s), old) => {
                    if old.map_or(true, |o| o.image != s.image || o.color != s.color) {
                        surface.set_sprite_image(id, s.image, s.color);
                    }
                    if old.map_or(true, |o| o.x != s.x || o.y != s.y) {
                        surface.set_sprite_position(id, s.x, s.y);
                    }
                    if old.is_none() {
                        surface.set_sprite_visible(id, true);
                    }
                }
                (None, None) => {}
            }
        }
        self.shown_sprites = self.sprites;
        writes
    }
}

fn index(col: i32, row: i32) -> Option<usize> {
    if col < 0 || row < 0 || col >= SCREEN_COLS as i32 || row >= SCREEN_ROWS as i32 {
        return None;
    }
    Some(row as usize * SCREEN_COLS + col as usize)
}

// ── Frame composition ─────────────────────────────────────────────────────────

/// Machine state the presentation needs besides the game itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct View {
    pub phase: Phase,
    pub demo: bool,
    pub frame: u32,
}

/// Compose one complete frame.
pub fn compose<G: Game>(canvas: &mut Canvas, game: &G, view: &View) {
    canvas.clear();

    if let Phase::Title { .. } = view.phase {
        draw_title(canvas, game, view);
        return;
    }

    game.draw(canvas);
    draw_hud(canvas, game, view);

    match view.phase {
        Phase::Won { .. } => {
            let hud = game.hud();
            canvas.centered(MESSAGE_ROW, &format!("{} {} CLEAR!", game.level_word(), hud.level), C_CLEAR);
        }
        Phase::Lost { .. } => {
            canvas.centered(MESSAGE_ROW, "GAME  OVER", C_GAME_OVER);
            canvas.centered(MESSAGE_ROW + 2, &format!("FINAL SCORE: {:05}", game.hud().score), Color::White);
        }
        _ => {}
    }
}

fn draw_hud<G: Game>(canvas: &mut Canvas, game: &G, view: &View) {
    let hud = game.hud();
    canvas.text(0, HUD_ROW, &format!("SCORE:{:05}", hud.score), C_HUD_SCORE);
    if view.demo {
        canvas.text(15, HUD_ROW, "DEMO", C_HUD_DEMO);
    } else {
        canvas.text(15, HUD_ROW, &format!("{}:{}", game.level_word(), hud.level), C_HUD_LEVEL);
    }
    canvas.text(32, HUD_ROW, &format!("LIFE:{}", hud.lives), C_HUD_LIVES);
}

fn draw_title<G: Game>(canvas: &mut Canvas, game: &G, view: &View) {
    canvas.centered(6, game.name(), C_TITLE);
    // Blink the prompt twice a second.
    if view.frame & 0x10 == 0 {
        canvas.centered(14, "PRESS FIRE TO START", C_HINT);
    }
    canvas.centered(16, "OR WAIT FOR DEMO", C_HUD_DEMO);
    canvas.centered(20, "LEFT/RIGHT MOVE  SPACE FIRE  Q QUIT", Color::Grey1);
}
