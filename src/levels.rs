//! Level and wave generation.
//!
//! Layouts depend only on the level number and the injected RNG, so a
//! seeded RNG reproduces the same grid.

use rand::Rng;

use crate::entities::{BrickGrid, LevelScheme};

/// Hit-points for one brick.
pub fn brick_hp(scheme: LevelScheme, level: u8, row: usize, col: usize, rows: usize, rng: &mut impl Rng) -> u8 {
    if scheme == LevelScheme::Uniform {
        return 1;
    }
    match level {
        0 | 1 => 1,
        2 => {
            if row == 0 {
                2
            } else {
                1
            }
        }
        3 => {
            if (row + col) % 2 == 1 {
                2
            } else {
                1
            }
        }
        4 => rows.saturating_sub(row).clamp(1, 3) as u8,
        _ => {
            if rng.gen_ratio(1, 4) {
                3
            } else {
                2
            }
        }
    }
}

/// Refill `grid` for `level`.
pub fn generate(grid: &mut BrickGrid, scheme: LevelScheme, level: u8, rng: &mut impl Rng) {
    let rows = grid.rows;
    grid.fill(|r, c| brick_hp(scheme, level, r, c, rows, rng));
    log::debug!("level {level} generated: {} bricks", grid.remaining());
}

// ── Meteor waves ─────────────────────────────────────────────────────────────

/// Meteors in wave `wave`: 8, 12, 16 ... capped at 40.
pub fn wave_quota(wave: u8) -> u8 {
    let n = 8 + (u32::from(wave.max(1)) - 1) * 4;
    n.min(40) as u8
}

/// Frames between meteor spawns.
pub fn spawn_interval(wave: u8) -> u8 {
    match wave {
        0 | 1 => 40,
        2 | 3 => 30,
        4 | 5 => 22,
        6 | 7 => 16,
        _ => 12,
    }
}

/// Fall speed (1..=3) of a freshly spawned meteor.
pub fn fall_speed(wave: u8, rng: &mut impl Rng) -> u8 {
    match wave {
        0..=2 => 1,
        3 | 4 => 1 + u8::from(rng.gen_bool(0.5)),
        5 | 6 => 2,
        _ => 2 + u8::from(rng.gen_bool(0.5)),
    }
}
