//! Per-frame motion: advancing the ball, wall bounces, paddle steering.
//!
//! Clamp policy, used by every wall: when the ball's pixel position reaches
//! or crosses a wall, the matching velocity component is negated and the
//! ball is put one whole pixel inside that wall, so the same wall cannot
//! trigger again on the next frame.

use crate::entities::{Ball, Bounds, Direction, Paddle};
use crate::fixed::Fixed;
use crate::hal::Controls;

/// Which walls the ball bounced off this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WallHits {
    pub left: bool,
    pub right: bool,
    pub top: bool,
}

impl WallHits {
    pub fn any(&self) -> bool {
        self.left || self.right || self.top
    }

    pub fn count(&self) -> usize {
        [self.left, self.right, self.top].iter().filter(|h| **h).count()
    }
}

/// Move the ball by one frame of velocity.
pub fn advance(ball: &mut Ball) {
    ball.x += ball.dx;
    ball.y += ball.dy;
}

/// Bounce off the side and top walls.  Call after `advance`.
pub fn reflect_walls(ball: &mut Ball, bounds: &Bounds) -> WallHits {
    let mut hits = WallHits::default();

    let bx = ball.x.px();
    if bx <= bounds.min_x {
        ball.dx = -ball.dx;
        ball.x = Fixed::from_px(bounds.min_x) + Fixed::ONE;
        hits.left = true;
    } else if bx >= bounds.max_x {
        ball.dx = -ball.dx;
        ball.x = Fixed::from_px(bounds.max_x) - Fixed::ONE;
        hits.right = true;
    }

    if ball.y.px() <= bounds.min_y {
        ball.dy = -ball.dy;
        ball.y = Fixed::from_px(bounds.min_y) + Fixed::ONE;
        hits.top = true;
    }

    hits
}

/// Left wins when both directions are held.
pub fn direction(controls: &Controls) -> Direction {
    if controls.left {
        Direction::Left
    } else if controls.right {
        Direction::Right
    } else {
        Direction::None
    }
}

pub fn move_paddle(paddle: &mut Paddle, dir: Direction) {
    match dir {
        Direction::Left => paddle.x = (paddle.x - paddle.speed).max(paddle.min_x),
        Direction::Right => paddle.x = (paddle.x + paddle.speed).min(paddle.max_x),
        Direction::None => {}
    }
}

/// Park a ball on top of the paddle, centred, at rest.
pub fn hold_on_paddle(ball: &mut Ball, paddle: &Paddle, ball_size: i32, serve_height: i32) {
    ball.x = Fixed::from_px(paddle.center() - ball_size / 2);
    ball.y = Fixed::from_px(paddle.y - serve_height);
    ball.dx = Fixed::ZERO;
    ball.dy = Fixed::ZERO;
    ball.active = true;
}
