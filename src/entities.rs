//! All game entity types: data plus small accessors, no frame logic.

use crate::fixed::Fixed;
use crate::hal::{col_to_x, row_to_y, Color, SCREEN_COLS};

// ── Shared ───────────────────────────────────────────────────────────────────

/// Five digits on the HUD.
pub const MAX_SCORE: u32 = 99_999;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hud {
    pub score: u32,
    pub lives: u8,
    /// Level (ball games) or wave (Meteor Storm), starting at 1.
    pub level: u8,
}

impl Hud {
    pub fn new(lives: u8) -> Self {
        Hud { score: 0, lives, level: 1 }
    }

    /// Saturates at `MAX_SCORE`.
    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points).min(MAX_SCORE);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for fire; `timer` counts frames towards demo mode.
    Title { timer: u16 },
    /// Ball held on the paddle / ship waiting to respawn.
    Launch { timer: u16 },
    Playing,
    /// Death tone playing; lives are taken when it ends.
    Dying { timer: u8 },
    /// Level cleared, message on screen.
    Won { timer: u8 },
    /// Game over, message on screen.
    Lost { timer: u8 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    None,
    Left,
    Right,
}

// ── Ball & paddle ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ball {
    pub x: Fixed,
    pub y: Fixed,
    pub dx: Fixed,
    pub dy: Fixed,
    pub active: bool,
}

impl Ball {
    pub fn at_px(x: i32, y: i32) -> Self {
        Ball {
            x: Fixed::from_px(x),
            y: Fixed::from_px(y),
            dx: Fixed::ZERO,
            dy: Fixed::ZERO,
            active: true,
        }
    }
}

/// Pixel limits for the ball.  Crossing `min_x`, `max_x` or `min_y`
/// bounces; there is no bottom wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Paddle {
    /// Left edge, pixels.
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub speed: i32,
    pub min_x: i32,
    pub max_x: i32,
}

impl Paddle {
    pub fn center(&self) -> i32 {
        self.x + self.width / 2
    }
}

/// How the paddle turns a hit position into a new ball velocity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BounceTuning {
    /// Raw 8.8 horizontal speed per pixel of offset from the paddle centre.
    pub gain: i32,
    pub min_dx: Fixed,
    pub max_dx: Fixed,
    /// Slowest allowed upward speed after a bounce.
    pub min_up: Fixed,
    /// Fastest upward speed the per-bounce speed-up can reach.
    pub max_up: Fixed,
    pub speedup: Fixed,
    /// The ball can be caught from this many pixels above the paddle row...
    pub band_above: i32,
    /// ...down to this many below it.
    pub band_below: i32,
    /// Where the ball is put after a bounce, in pixels above the paddle row.
    pub rest_above: i32,
}

// ── Brick grid ───────────────────────────────────────────────────────────────

pub const MAX_GRID_ROWS: usize = 6;
pub const MAX_GRID_COLS: usize = 8;

const ROW_COLORS: [Color; 5] = [Color::Red, Color::Orange, Color::Yellow, Color::Green, Color::Cyan];
const HP_COLORS: [Color; 4] = [Color::Grey2, Color::LightBlue, Color::Cyan, Color::White];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strike {
    Destroyed,
    Damaged { hp_left: u8 },
}

/// Destructible bricks, laid out on the character grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrickGrid {
    pub rows: usize,
    pub cols: usize,
    /// Screen column of brick column 0.
    pub origin_col: i32,
    /// Screen row of brick row 0.
    pub origin_row: i32,
    /// Characters per brick.
    pub cell_width: i32,
    hp: [[u8; MAX_GRID_COLS]; MAX_GRID_ROWS],
    remaining: u16,
}

impl BrickGrid {
    pub fn new(rows: usize, cols: usize, origin_col: i32, origin_row: i32, cell_width: i32) -> Self {
        BrickGrid {
            rows: rows.min(MAX_GRID_ROWS),
            cols: cols.min(MAX_GRID_COLS),
            origin_col,
            origin_row,
            cell_width,
            hp: [[0; MAX_GRID_COLS]; MAX_GRID_ROWS],
            remaining: 0,
        }
    }

    /// Replace every cell with `f(row, col)` and recount.
    pub fn fill(&mut self, mut f: impl FnMut(usize, usize) -> u8) {
        self.remaining = 0;
        for r in 0..self.rows {
            for c in 0..self.cols {
                let hp = f(r, c);
                self.hp[r][c] = hp;
                if hp > 0 {
                    self.remaining += 1;
                }
            }
        }
    }

    pub fn hp(&self, row: usize, col: usize) -> u8 {
        if row < self.rows && col < self.cols {
            self.hp[row][col]
        } else {
            0
        }
    }

    /// Bricks still standing.
    pub fn remaining(&self) -> u16 {
        self.remaining
    }

    /// Brick under a screen cell, live or not.
    pub fn locate(&self, col: i32, row: i32) -> Option<(usize, usize)> {
        if row < self.origin_row || row >= self.origin_row + self.rows as i32 {
            return None;
        }
        let rel = col - self.origin_col;
        if rel < 0 || rel >= self.cols as i32 * self.cell_width {
            return None;
        }
        Some(((row - self.origin_row) as usize, (rel / self.cell_width) as usize))
    }

    /// Take one hit-point.  `None` when the brick is already gone.
    pub fn strike(&mut self, row: usize, col: usize) -> Option<Strike> {
        if row >= self.rows || col >= self.cols || self.hp[row][col] == 0 {
            return None;
        }
        self.hp[row][col] -= 1;
        if self.hp[row][col] == 0 {
            self.remaining = self.remaining.saturating_sub(1);
            Some(Strike::Destroyed)
        } else {
            Some(Strike::Damaged { hp_left: self.hp[row][col] })
        }
    }

    /// Multi-hit bricks take their colour from hit-points, the rest from
    /// their row.
    pub fn color(&self, row: usize, col: usize) -> Color {
        let hp = self.hp(row, col) as usize;
        if hp > 1 {
            HP_COLORS[(hp - 1).min(HP_COLORS.len() - 1)]
        } else {
            ROW_COLORS[row % ROW_COLORS.len()]
        }
    }

    /// Screen column of the left edge of brick column `col`.
    pub fn screen_col(&self, col: usize) -> i32 {
        self.origin_col + col as i32 * self.cell_width
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelScheme {
    /// Harder layouts as the level rises.
    Progressive,
    /// Every brick one hit, every level.
    Uniform,
}

/// Everything that differs between the ball-and-paddle clones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaLayout {
    pub name: &'static str,
    pub wall_left_col: i32,
    pub wall_right_col: i32,
    pub wall_top_row: i32,
    pub bounds: Bounds,
    /// The ball is lost once its y reaches this line.
    pub death_y: i32,
    pub ball_size: i32,
    /// Gap between the paddle row and a ball waiting on it.
    pub serve_height: i32,
    pub launch_dx: Fixed,
    pub launch_dy: Fixed,
    pub paddle: Paddle,
    pub bounce: BounceTuning,
    pub grid_rows: usize,
    pub grid_cols: usize,
    pub grid_origin_col: i32,
    pub grid_origin_row: i32,
    pub brick_width: i32,
    pub scheme: LevelScheme,
    /// Bonus per level number when a level is cleared.
    pub clear_bonus: u32,
}

impl ArenaLayout {
    pub fn arkanoid() -> Self {
        ArenaLayout {
            name: "ARKANOID",
            wall_left_col: 1,
            wall_right_col: 27,
            wall_top_row: 2,
            bounds: Bounds { min_x: col_to_x(2), max_x: col_to_x(26), min_y: row_to_y(3) },
            death_y: row_to_y(24),
            ball_size: 5,
            serve_height: 8,
            launch_dx: Fixed::from_raw(0x0140),
            launch_dy: Fixed::from_raw(-0x0180),
            paddle: Paddle {
                x: col_to_x(12),
                y: row_to_y(22),
                width: 48,
                speed: 3,
                min_x: col_to_x(2),
                max_x: col_to_x(27) - 48,
            },
            bounce: BounceTuning {
                gain: 6,
                min_dx: Fixed::from_raw(0x0060),
                max_dx: Fixed::from_raw(0x0250),
                min_up: Fixed::from_raw(0x0100),
                max_up: Fixed::from_raw(0x0280),
                speedup: Fixed::from_raw(0x0008),
                band_above: 4,
                band_below: 2,
                rest_above: 5,
            },
            grid_rows: 6,
            grid_cols: 8,
            grid_origin_col: 3,
            grid_origin_row: 3,
            brick_width: 3,
            scheme: LevelScheme::Progressive,
            clear_bonus: 0,
        }
    }

    pub fn breakout() -> Self {
        ArenaLayout {
            name: "BREAKOUT",
            wall_left_col: 0,
            wall_right_col: 29,
            wall_top_row: 1,
            bounds: Bounds { min_x: col_to_x(2), max_x: col_to_x(27), min_y: row_to_y(1) },
            death_y: 237,
            ball_size: 8,
            serve_height: 12,
            launch_dx: Fixed::from_raw(0x0200),
            launch_dy: Fixed::from_raw(-0x0200),
            paddle: Paddle {
                x: col_to_x(1) + 90,
                y: 216,
                width: 18,
                speed: 4,
                min_x: col_to_x(1) + 4,
                max_x: 248 - 18 - 4,
            },
            bounce: BounceTuning {
                gain: 85,
                min_dx: Fixed::from_raw(0x0100),
                max_dx: Fixed::from_raw(0x0300),
                min_up: Fixed::from_raw(0x0200),
                max_up: Fixed::from_raw(0x0200),
                speedup: Fixed::ZERO,
                band_above: 10,
                band_below: 20,
                rest_above: 11,
            },
            grid_rows: 5,
            grid_cols: 7,
            grid_origin_col: 1,
            grid_origin_row: 3,
            brick_width: 4,
            scheme: LevelScheme::Uniform,
            clear_bonus: 100,
        }
    }

    pub fn empty_grid(&self) -> BrickGrid {
        BrickGrid::new(
            self.grid_rows,
            self.grid_cols,
            self.grid_origin_col,
            self.grid_origin_row,
            self.brick_width,
        )
    }
}

/// Paddle, ball and bricks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BallGame {
    pub layout: ArenaLayout,
    pub paddle: Paddle,
    pub ball: Ball,
    pub grid: BrickGrid,
    pub hud: Hud,
}

// ── Meteor Storm ─────────────────────────────────────────────────────────────

pub const MAX_METEORS: usize = 16;
pub const MAX_EXPLOSIONS: usize = 8;
pub const MAX_STARS: usize = 20;

pub const SHIELD_COUNT: usize = 4;
pub const SHIELD_WIDTH: usize = 4;
/// Top row of the shield bunkers; they are two rows tall.
pub const SHIELD_ROW: i32 = 20;
/// Character row the ship flies on.
pub const SHIP_ROW: i32 = 22;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeteorSize {
    /// Two cells wide, two hits, splits when destroyed.
    Large,
    Small,
}

impl MeteorSize {
    pub fn hit_points(self) -> u8 {
        match self {
            MeteorSize::Large => 2,
            MeteorSize::Small => 1,
        }
    }

    pub fn width(self) -> i32 {
        match self {
            MeteorSize::Large => 2,
            MeteorSize::Small => 1,
        }
    }

    /// Rightmost column the meteor's left cell may occupy.
    pub fn max_col(self) -> i32 {
        SCREEN_COLS as i32 - 1 - self.width()
    }
}

/// One slot of the meteor pool, in character coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Meteor {
    pub active: bool,
    pub col: i32,
    pub row: i32,
    /// -1, 0 or +1 columns per step.
    pub dx: i32,
    /// 1..=3; a meteor steps every `4 - speed` frames.
    pub speed: u8,
    pub size: MeteorSize,
    pub hp: u8,
}

impl Meteor {
    pub const EMPTY: Meteor = Meteor {
        active: false,
        col: 0,
        row: 0,
        dx: 0,
        speed: 1,
        size: MeteorSize::Small,
        hp: 0,
    };

    pub fn covers(&self, col: i32, row: i32) -> bool {
        self.active && row == self.row && col >= self.col && col < self.col + self.size.width()
    }
}

/// A bullet, in sprite pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Shot {
    pub active: bool,
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerUpKind {
    ShieldRepair,
    DoubleShot,
    /// Destroys every meteor on screen.
    Bomb,
}

impl PowerUpKind {
    pub fn color(self) -> Color {
        match self {
            PowerUpKind::ShieldRepair => Color::Green,
            PowerUpKind::DoubleShot => Color::Cyan,
            PowerUpKind::Bomb => Color::Red,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerUp {
    pub active: bool,
    pub kind: PowerUpKind,
    pub x: i32,
    pub y: i32,
}

impl Default for PowerUp {
    fn default() -> Self {
        PowerUp { active: false, kind: PowerUpKind::ShieldRepair, x: 0, y: 0 }
    }
}

/// Mystery ship crossing the top of the screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ufo {
    pub active: bool,
    pub x: i32,
    pub dx: i32,
    /// Frames since the last crossing.
    pub timer: u16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Explosion {
    pub col: i32,
    pub row: i32,
    /// Frames left; 0 means the slot is free.
    pub timer: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Star {
    pub col: i32,
    pub row: i32,
    /// 1 = slow, 3 = fast.
    pub speed: u8,
    pub bright: bool,
}

/// Shield bunker cells, two rows starting at `SHIELD_ROW`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shields {
    cells: [[bool; SCREEN_COLS]; 2],
}

impl Default for Shields {
    fn default() -> Self {
        Self::intact()
    }
}

impl Shields {
    /// Four bunkers, each with a two-cell notch in its lower row.
    pub fn intact() -> Self {
        let mut cells = [[false; SCREEN_COLS]; 2];
        for s in 0..SHIELD_COUNT {
            let left = Self::bunker_col(s);
            for x in left..left + SHIELD_WIDTH {
                cells[0][x] = true;
                cells[1][x] = true;
            }
            cells[1][left + 1] = false;
            cells[1][left + 2] = false;
        }
        Shields { cells }
    }

    pub fn bunker_col(index: usize) -> usize {
        2 + index * 10
    }

    pub fn is_live(&self, col: i32, row: i32) -> bool {
        self.slot(col, row).map(|(r, c)| self.cells[r][c]).unwrap_or(false)
    }

    /// Knock out one cell.  Returns whether there was anything there.
    pub fn hit(&mut self, col: i32, row: i32) -> bool {
        match self.slot(col, row) {
            Some((r, c)) if self.cells[r][c] => {
                self.cells[r][c] = false;
                true
            }
            _ => false,
        }
    }

    pub fn repair(&mut self) {
        *self = Self::intact();
    }

    pub fn live_cells(&self) -> usize {
        self.cells.iter().flatten().filter(|c| **c).count()
    }

    fn slot(&self, col: i32, row: i32) -> Option<(usize, usize)> {
        let r = row - SHIELD_ROW;
        if !(0..2).contains(&r) || col < 0 || col >= SCREEN_COLS as i32 {
            return None;
        }
        Some((r as usize, col as usize))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Combo {
    pub count: u8,
    /// Frames left before the chain breaks.
    pub timer: u8,
}

/// Ship, bullets, meteors, shields and the rest of Meteor Storm.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeteorGame {
    /// Ship sprite x, pixels.
    pub ship_x: i32,
    pub bullet: Shot,
    /// Second bullet while double-shot is active.
    pub bullet2: Shot,
    pub meteors: [Meteor; MAX_METEORS],
    pub shields: Shields,
    pub power_up: PowerUp,
    /// Frames of double-shot left.
    pub double_shot: u16,
    pub ufo: Ufo,
    pub explosions: [Explosion; MAX_EXPLOSIONS],
    pub stars: [Star; MAX_STARS],
    pub combo: Combo,
    /// Meteors in this wave.
    pub quota: u8,
    pub spawned: u8,
    pub spawn_timer: u8,
    pub frame: u32,
    pub hud: Hud,
}

impl MeteorGame {
    pub fn meteors_alive(&self) -> usize {
        self.meteors.iter().filter(|m| m.active).count()
    }
}
