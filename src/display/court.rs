//! Ball-and-grid playfield: walls, bricks, paddle and ball.

use crate::entities::BallGame;
use crate::hal::{Color, Glyph, SpriteId, SpriteImage, SCREEN_ROWS};

use super::Canvas;

pub const SPRITE_PADDLE: SpriteId = SpriteId(0);
pub const SPRITE_BALL: SpriteId = SpriteId(1);

const C_WALL: Color = Color::Grey2;
const C_PADDLE: Color = Color::LightBlue;
const C_BALL: Color = Color::White;

pub fn draw(game: &BallGame, canvas: &mut Canvas) {
    let layout = &game.layout;

    for col in layout.wall_left_col..=layout.wall_right_col {
        canvas.put(col, layout.wall_top_row, Glyph::Wall, C_WALL);
    }
    for row in layout.wall_top_row..SCREEN_ROWS as i32 {
        canvas.put(layout.wall_left_col, row, Glyph::Wall, C_WALL);
        canvas.put(layout.wall_right_col, row, Glyph::Wall, C_WALL);
    }

    let grid = &game.grid;
    for r in 0..grid.rows {
        for c in 0..grid.cols {
            if grid.hp(r, c) == 0 {
                continue;
            }
            let color = grid.color(r, c);
            let left = grid.screen_col(c);
            for dx in 0..grid.cell_width {
                canvas.put(left + dx, grid.origin_row + r as i32, Glyph::Brick, color);
            }
        }
    }

    let paddle = &game.paddle;
    canvas.sprite(
        SPRITE_PADDLE,
        SpriteImage::Paddle { width: paddle.width.clamp(0, u8::MAX as i32) as u8 },
        C_PADDLE,
        paddle.x,
        paddle.y,
    );
    if game.ball.active {
        canvas.sprite(SPRITE_BALL, SpriteImage::Ball, C_BALL, game.ball.x.px(), game.ball.y.px());
    }
}
