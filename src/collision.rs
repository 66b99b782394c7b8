//! Collision detection and resolution.
//!
//! Ball games resolve the paddle first, then the brick grid.  Meteor Storm
//! bullets test the UFO, then meteors, then shields.  Only one target is
//! resolved per projectile per frame.

use crate::entities::{
    Ball, BounceTuning, BrickGrid, Meteor, Paddle, PowerUp, Shields, Shot, Strike, Ufo, MAX_METEORS,
    SHIP_ROW,
};
use crate::fixed::Fixed;
use crate::hal::{col_to_x, row_to_y, x_to_col, y_to_row};

// ── Paddle ───────────────────────────────────────────────────────────────────

/// Horizontal speed after a paddle hit at pixel `hit_x`.
///
/// Scales linearly with the offset from the paddle centre, then the
/// magnitude is clamped to `[min_dx, max_dx]`.  A dead-centre hit goes right
/// at `min_dx`, so the ball never travels straight up.
pub fn paddle_bounce_dx(hit_x: i32, paddle: &Paddle, tuning: &BounceTuning) -> Fixed {
    let offset = hit_x - paddle.center();
    Fixed::from_raw(offset * tuning.gain).clamp_magnitude(tuning.min_dx, tuning.max_dx)
}

/// Vertical speed after a paddle hit: reflected, at least `min_up`, then a
/// little faster up to `max_up`.
pub fn paddle_bounce_dy(dy: Fixed, tuning: &BounceTuning) -> Fixed {
    let up = (-dy).min(-tuning.min_up);
    if up > -tuning.max_up {
        (up - tuning.speedup).max(-tuning.max_up)
    } else {
        up
    }
}

/// Bounce the ball off the paddle if it is falling onto it.
pub fn resolve_paddle(ball: &mut Ball, paddle: &Paddle, ball_size: i32, tuning: &BounceTuning) -> bool {
    if !ball.dy.is_positive() {
        return false;
    }
    let by = ball.y.px();
    if by < paddle.y - tuning.band_above || by > paddle.y + tuning.band_below {
        return false;
    }
    let hit_x = ball.x.px() + ball_size / 2;
    if hit_x < paddle.x || hit_x > paddle.x + paddle.width {
        return false;
    }

    ball.dy = paddle_bounce_dy(ball.dy, tuning);
    ball.dx = paddle_bounce_dx(hit_x, paddle, tuning);
    ball.y = Fixed::from_px(paddle.y - tuning.rest_above);
    true
}

// ── Brick grid ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridHit {
    pub row: usize,
    pub col: usize,
    pub strike: Strike,
}

/// Screen cells tested for a ball: the one under its centre, then the
/// neighbour in its vertical direction of travel.
pub fn probe_cells(ball: &Ball, ball_size: i32) -> [(i32, i32); 2] {
    let half = ball_size / 2;
    let col = x_to_col(ball.x.px() + half);
    let row = y_to_row(ball.y.px() + half);
    let ahead = if ball.dy.is_negative() { row - 1 } else { row + 1 };
    [(col, row), (col, ahead)]
}

/// Strike the first live brick the ball touches and reflect its vertical
/// speed.
pub fn resolve_grid(ball: &mut Ball, grid: &mut BrickGrid, ball_size: i32) -> Option<GridHit> {
    for (col, row) in probe_cells(ball, ball_size) {
        let Some((r, c)) = grid.locate(col, row) else {
            continue;
        };
        if let Some(strike) = grid.strike(r, c) {
            ball.dy = -ball.dy;
            return Some(GridHit { row: r, col: c, strike });
        }
    }
    None
}

/// Points for a brick hit.
pub fn brick_score(strike: Strike, level: u8) -> u32 {
    match strike {
        Strike::Destroyed => 10 * u32::from(level),
        Strike::Damaged { .. } => 5,
    }
}

// ── Meteor Storm ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShotTarget {
    Ufo,
    Meteor(usize),
    Shield { col: i32, row: i32 },
}

/// What a bullet at pixel (`x`, `y`) hits, in priority order.
pub fn shot_target(shot: &Shot, ufo: &Ufo, meteors: &[Meteor; MAX_METEORS], shields: &Shields) -> Option<ShotTarget> {
    let col = x_to_col(shot.x);
    let row = y_to_row(shot.y);

    if ufo.active && row <= 2 && shot.x >= ufo.x - 8 && shot.x <= ufo.x + 16 {
        return Some(ShotTarget::Ufo);
    }
    if let Some(i) = meteors.iter().position(|m| m.covers(col, row)) {
        return Some(ShotTarget::Meteor(i));
    }
    if shields.is_live(col, row) {
        return Some(ShotTarget::Shield { col, row });
    }
    None
}

/// A meteor on the ship's row close enough to the ship sprite.
pub fn meteor_hits_ship(meteor: &Meteor, ship_x: i32) -> bool {
    if !meteor.active || meteor.row < SHIP_ROW {
        return false;
    }
    let mx = col_to_x(meteor.col);
    mx >= ship_x - 8 && mx <= ship_x + 12
}

/// The first shield cell under a meteor, if any.
pub fn meteor_shield_cell(meteor: &Meteor, shields: &Shields) -> Option<(i32, i32)> {
    (meteor.col..meteor.col + meteor.size.width())
        .map(|col| (col, meteor.row))
        .find(|&(col, row)| shields.is_live(col, row))
}

pub fn power_up_caught(power_up: &PowerUp, ship_x: i32) -> bool {
    let ship_y = row_to_y(SHIP_ROW);
    power_up.active
        && power_up.y >= ship_y - 8
        && power_up.y <= ship_y + 8
        && power_up.x >= ship_x - 8
        && power_up.x <= ship_x + 16
}
