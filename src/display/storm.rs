//! Meteor Storm playfield.
//!
//! Draw order matters: stars first, so meteors, shields and explosions
//! cover them.

use crate::entities::{MeteorGame, MeteorSize, SHIELD_ROW};
use crate::hal::{x_to_col, y_to_row, Color, Glyph, SpriteId, SpriteImage, SCREEN_COLS};
use crate::meteor::{SHIP_Y, UFO_Y};

use super::Canvas;

pub const SPRITE_SHIP: SpriteId = SpriteId(0);
pub const SPRITE_BULLET: SpriteId = SpriteId(1);
pub const SPRITE_POWER_UP: SpriteId = SpriteId(2);
pub const SPRITE_UFO: SpriteId = SpriteId(3);

const GROUND_ROW: i32 = 23;
const STATUS_ROW: i32 = 24;

pub fn draw(game: &MeteorGame, canvas: &mut Canvas) {
    for star in &game.stars {
        let glyph = if star.bright { Glyph::StarBright } else { Glyph::StarDim };
        let color = match star.speed {
            3 => Color::White,
            2 => Color::Grey3,
            _ => Color::Grey1,
        };
        canvas.put(star.col, star.row, glyph, color);
    }

    for row in SHIELD_ROW..SHIELD_ROW + 2 {
        for col in 0..SCREEN_COLS as i32 {
            if game.shields.is_live(col, row) {
                canvas.put(col, row, Glyph::Shield, Color::Green);
            }
        }
    }

    let anim = (game.frame >> 3) & 1 == 1;
    for m in game.meteors.iter().filter(|m| m.active) {
        match m.size {
            MeteorSize::Large => {
                let color = if m.hp > 1 { Color::Orange } else { Color::LightRed };
                let (left, right) = if anim {
                    (Glyph::MeteorLeft, Glyph::MeteorRight)
                } else {
                    (Glyph::MeteorRight, Glyph::MeteorLeft)
                };
                canvas.put(m.col, m.row, left, color);
                canvas.put(m.col + 1, m.row, right, color);
            }
            MeteorSize::Small => canvas.put(m.col, m.row, Glyph::MeteorSmall, Color::Brown),
        }
    }

    for e in game.explosions.iter().filter(|e| e.timer > 0) {
        if e.timer > 4 {
            canvas.put(e.col, e.row, Glyph::Explosion, Color::Yellow);
        } else {
            canvas.put(e.col, e.row, Glyph::ExplosionFading, Color::LightRed);
        }
    }

    for col in 0..SCREEN_COLS as i32 {
        canvas.put(col, GROUND_ROW, Glyph::Ground, Color::LightBlue);
    }

    // The second bullet has no sprite slot left; it is drawn as a character.
    if game.bullet2.active {
        canvas.put(x_to_col(game.bullet2.x), y_to_row(game.bullet2.y), Glyph::Shot, Color::Yellow);
    }

    canvas.sprite(SPRITE_SHIP, SpriteImage::Ship, Color::White, game.ship_x, SHIP_Y);
    if game.bullet.active {
        canvas.sprite(SPRITE_BULLET, SpriteImage::Bullet, Color::Yellow, game.bullet.x, game.bullet.y);
    }
    if game.power_up.active {
        let p = &game.power_up;
        canvas.sprite(SPRITE_POWER_UP, SpriteImage::PowerUp, p.kind.color(), p.x, p.y);
    }
    if game.ufo.active {
        canvas.sprite(SPRITE_UFO, SpriteImage::Ufo, Color::Red, game.ufo.x, UFO_Y);
    }

    if game.double_shot > 0 {
        canvas.text(0, STATUS_ROW, "DBL", Color::Cyan);
    }
    if game.combo.count >= 3 && game.combo.timer > 0 {
        canvas.text(16, STATUS_ROW, &format!("COMBO x{}!", game.combo.count), Color::Yellow);
    }
    canvas.text(33, STATUS_ROW, &format!("{:02}/{:02}", game.spawned, game.quota), Color::Grey2);
}
