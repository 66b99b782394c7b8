//! Meteor Storm: a ship under a falling meteor swarm.
//!
//! Meteors live on the character grid and step every `4 - speed` frames;
//! the ship, bullets, power-up and UFO are sprites in pixel coordinates.
//! Large meteors take two hits and split into two small ones.

use rand::Rng;

use crate::collision::{meteor_hits_ship, meteor_shield_cell, power_up_caught, shot_target, ShotTarget};
use crate::display::{storm, Canvas};
use crate::entities::{
    Combo, Direction, Explosion, Hud, Meteor, MeteorGame, MeteorSize, PowerUp, PowerUpKind, Shields, Shot, Star,
    Ufo, MAX_METEORS, MAX_STARS, SHIELD_ROW, SHIP_ROW,
};
use crate::hal::{col_to_x, row_to_y, Controls, SCREEN_COLS, SCREEN_ROWS};
use crate::levels::{fall_speed, spawn_interval, wave_quota};
use crate::machine::{Game, Outcome};
use crate::physics::direction;
use crate::sound::{Effect, Jingle, SoundBoard};

// ── Tuning ───────────────────────────────────────────────────────────────────

pub const SHIP_MIN_X: i32 = col_to_x(1);
pub const SHIP_MAX_X: i32 = col_to_x(37);
pub const SHIP_START_X: i32 = col_to_x(19);
pub const SHIP_SPEED: i32 = 2;
pub const SHIP_Y: i32 = row_to_y(SHIP_ROW);

pub const BULLET_SPEED: i32 = 5;
/// Bullets vanish once they climb above this line.
pub const BULLET_TOP: i32 = row_to_y(1) + 4;

pub const POWER_UP_SPEED: i32 = 2;
pub const POWER_UP_FLOOR: i32 = row_to_y(23);
pub const DOUBLE_SHOT_FRAMES: u16 = 600;
pub const BOMB_SCORE: u32 = 50;

pub const UFO_INTERVAL: u16 = 800;
pub const UFO_Y: i32 = row_to_y(1);

pub const COMBO_WINDOW: u8 = 60;
pub const EXPLOSION_FRAMES: u8 = 8;
pub const WAVE_BONUS: u32 = 100;
/// Frames the ship waits before respawning by itself.
pub const RESPAWN_DELAY: u16 = 50;

/// Top row meteors spawn on and stars fall from.
const SKY_ROW: i32 = 2;
/// Meteors leave the play area once they reach this row.
const FLOOR_ROW: i32 = SCREEN_ROWS as i32 - 1;

// ── Constructors ─────────────────────────────────────────────────────────────

impl MeteorGame {
    pub fn new(lives: u8) -> Self {
        MeteorGame {
            ship_x: SHIP_START_X,
            bullet: Shot::default(),
            bullet2: Shot::default(),
            meteors: [Meteor::EMPTY; MAX_METEORS],
            shields: Shields::intact(),
            power_up: PowerUp::default(),
            double_shot: 0,
            ufo: Ufo::default(),
            explosions: Default::default(),
            stars: [Star::default(); MAX_STARS],
            combo: Combo::default(),
            quota: wave_quota(1),
            spawned: 0,
            spawn_timer: 0,
            frame: 0,
            hud: Hud::new(lives),
        }
    }
}

/// Clear every pool for the wave in `hud.level`.
pub fn init_wave(game: &mut MeteorGame, rng: &mut impl Rng) {
    game.meteors = [Meteor::EMPTY; MAX_METEORS];
    game.quota = wave_quota(game.hud.level);
    game.spawned = 0;
    game.spawn_timer = 0;
    game.bullet = Shot::default();
    game.bullet2 = Shot::default();
    game.power_up = PowerUp::default();
    game.ufo = Ufo::default();
    game.combo = Combo::default();
    game.explosions = Default::default();
    game.shields = Shields::intact();
    init_stars(game, rng);
    log::debug!("wave {} ({} meteors)", game.hud.level, game.quota);
}

pub fn init_stars(game: &mut MeteorGame, rng: &mut impl Rng) {
    for star in game.stars.iter_mut() {
        let speed = rng.gen_range(1..=3);
        *star = Star {
            col: rng.gen_range(0..SCREEN_COLS as i32),
            row: SKY_ROW + rng.gen_range(0..17),
            speed,
            bright: rng.gen_bool(0.5),
        };
    }
}

// ── Ship & bullets ───────────────────────────────────────────────────────────

pub fn move_ship(game: &mut MeteorGame, dir: Direction) {
    match dir {
        Direction::Left => game.ship_x = (game.ship_x - SHIP_SPEED).max(SHIP_MIN_X),
        Direction::Right => game.ship_x = (game.ship_x + SHIP_SPEED).min(SHIP_MAX_X),
        Direction::None => {}
    }
}

/// Fire when the primary bullet is free; double-shot adds the second one.
pub fn fire(game: &mut MeteorGame, sound: &mut SoundBoard) {
    if game.bullet.active {
        return;
    }
    game.bullet = Shot { active: true, x: game.ship_x + 4, y: SHIP_Y - 10 };
    sound.play(Effect::Shoot);
    if game.double_shot > 0 && !game.bullet2.active {
        game.bullet2 = Shot { active: true, x: game.ship_x + 10, y: SHIP_Y - 10 };
    }
}

fn bump_combo(game: &mut MeteorGame, sound: &mut SoundBoard) {
    game.combo.count = game.combo.count.saturating_add(1);
    game.combo.timer = COMBO_WINDOW;
    if game.combo.count >= 3 {
        game.hud.add_score(5 * u32::from(game.combo.count));
        sound.play(Effect::Combo(game.combo.count));
    }
}

/// Move one bullet and resolve what it hits.
fn update_shot(game: &mut MeteorGame, second: bool, rng: &mut impl Rng, sound: &mut SoundBoard) {
    let mut shot = if second { game.bullet2 } else { game.bullet };
    if !shot.active {
        return;
    }
    if shot.y <= BULLET_TOP {
        shot.active = false;
    } else {
        shot.y -= BULLET_SPEED;
        if let Some(target) = shot_target(&shot, &game.ufo, &game.meteors, &game.shields) {
            apply_hit(game, target, rng, sound);
            shot.active = false;
        }
    }
    if second {
        game.bullet2 = shot;
    } else {
        game.bullet = shot;
    }
}

fn apply_hit(game: &mut MeteorGame, target: ShotTarget, rng: &mut impl Rng, sound: &mut SoundBoard) {
    let wave = u32::from(game.hud.level);
    match target {
        ShotTarget::Ufo => {
            game.ufo.active = false;
            game.hud.add_score(100 + rng.gen_range(0..128));
            sound.play(Effect::ExplodeLarge);
            bump_combo(game, sound);
        }
        ShotTarget::Meteor(i) => {
            let m = game.meteors[i];
            match m.size {
                MeteorSize::Large if m.hp > 1 => {
                    game.meteors[i].hp -= 1;
                    game.hud.add_score(10);
                    sound.play(Effect::ExplodeSmall);
                }
                MeteorSize::Large => {
                    game.meteors[i].active = false;
                    split(game, &m, sound);
                    game.hud.add_score(25 * wave);
                    explode(game, m.col, m.row);
                    sound.play(Effect::ExplodeLarge);
                    maybe_drop_power_up(game, m.col, m.row, rng);
                }
                MeteorSize::Small => {
                    game.meteors[i].active = false;
                    game.hud.add_score(10 * wave);
                    explode(game, m.col, m.row);
                    sound.play(Effect::ExplodeSmall);
                }
            }
            bump_combo(game, sound);
        }
        ShotTarget::Shield { col, row } => {
            game.shields.hit(col, row);
        }
    }
}

// ── Meteors ──────────────────────────────────────────────────────────────────

fn free_meteor(game: &MeteorGame) -> Option<usize> {
    game.meteors.iter().position(|m| !m.active)
}

/// Drop a new large meteor at the top of the screen.
pub fn spawn_meteor(game: &mut MeteorGame, rng: &mut impl Rng) -> bool {
    let Some(slot) = free_meteor(game) else {
        log::trace!("meteor pool full, spawn skipped");
        return false;
    };
    game.meteors[slot] = Meteor {
        active: true,
        col: 2 + rng.gen_range(0..34),
        row: SKY_ROW,
        dx: rng.gen_range(-1..=1),
        speed: fall_speed(game.hud.level, rng),
        size: MeteorSize::Large,
        hp: MeteorSize::Large.hit_points(),
    };
    game.spawned = game.spawned.saturating_add(1);
    true
}

/// Two small meteors fanning out from where `parent` was.
pub fn split(game: &mut MeteorGame, parent: &Meteor, sound: &mut SoundBoard) {
    sound.play(Effect::Split);
    let children = [
        ((parent.col - 1).max(1), -1),
        ((parent.col + 2).min(MeteorSize::Small.max_col() - 1), 1),
    ];
    for (col, dx) in children {
        let Some(slot) = free_meteor(game) else {
            log::trace!("meteor pool full, split child dropped");
            return;
        };
        game.meteors[slot] = Meteor {
            active: true,
            col,
            row: parent.row,
            dx,
            speed: parent.speed,
            size: MeteorSize::Small,
            hp: MeteorSize::Small.hit_points(),
        };
    }
}

/// Step every meteor that is due this frame.  Returns `Died` when one
/// reaches the ship.
pub fn move_meteors(game: &mut MeteorGame, sound: &mut SoundBoard) -> Outcome {
    for i in 0..MAX_METEORS {
        let mut m = game.meteors[i];
        if !m.active {
            continue;
        }
        let period = u32::from(4 - m.speed.clamp(1, 3));
        if game.frame % period != 0 {
            continue;
        }

        let max_col = m.size.max_col();
        if m.dx < 0 && m.col > 1 {
            m.col -= 1;
        } else if m.dx > 0 && m.col < max_col {
            m.col += 1;
        }
        m.row += 1;
        if m.col <= 1 {
            m.dx = 1;
        }
        if m.col >= max_col {
            m.dx = -1;
        }

        if let Some((col, row)) = meteor_shield_cell(&m, &game.shields) {
            game.shields.hit(col, row);
            game.meteors[i].active = false;
            explode(game, col, row);
            sound.play(Effect::ExplodeSmall);
            continue;
        }

        if meteor_hits_ship(&m, game.ship_x) {
            game.meteors[i].active = false;
            return Outcome::Died;
        }

        if m.row >= FLOOR_ROW {
            m.active = false;
        }
        game.meteors[i] = m;
    }
    Outcome::Continue
}

// ── Power-ups, UFO, explosions, stars ────────────────────────────────────────

fn maybe_drop_power_up(game: &mut MeteorGame, col: i32, row: i32, rng: &mut impl Rng) {
    if game.power_up.active || !rng.gen_ratio(1, 4) {
        return;
    }
    let kind = match rng.gen_range(0..3) {
        0 => PowerUpKind::ShieldRepair,
        1 => PowerUpKind::DoubleShot,
        _ => PowerUpKind::Bomb,
    };
    game.power_up = PowerUp { active: true, kind, x: col_to_x(col), y: row_to_y(row) };
}

/// Apply a collected power-up.
pub fn collect(game: &mut MeteorGame, kind: PowerUpKind, sound: &mut SoundBoard) {
    match kind {
        PowerUpKind::ShieldRepair => {
            game.shields.repair();
            sound.play(Effect::PowerUp);
        }
        PowerUpKind::DoubleShot => {
            game.double_shot = DOUBLE_SHOT_FRAMES;
            sound.play(Effect::PowerUp);
        }
        PowerUpKind::Bomb => {
            for i in 0..MAX_METEORS {
                let m = game.meteors[i];
                if m.active {
                    game.meteors[i].active = false;
                    explode(game, m.col, m.row);
                }
            }
            game.hud.add_score(BOMB_SCORE);
            sound.start_jingle(Jingle::Bomb);
        }
    }
    log::debug!("power-up {kind:?} collected");
}

fn update_power_up(game: &mut MeteorGame, sound: &mut SoundBoard) {
    if !game.power_up.active {
        return;
    }
    game.power_up.y += POWER_UP_SPEED;
    if game.power_up.y >= POWER_UP_FLOOR {
        game.power_up.active = false;
        return;
    }
    if power_up_caught(&game.power_up, game.ship_x) {
        let kind = game.power_up.kind;
        game.power_up.active = false;
        collect(game, kind, sound);
    }
}

fn update_ufo(game: &mut MeteorGame, rng: &mut impl Rng, sound: &mut SoundBoard) {
    let ufo = &mut game.ufo;
    if !ufo.active {
        ufo.timer = ufo.timer.saturating_add(1);
        if ufo.timer > UFO_INTERVAL {
            ufo.timer = 0;
            ufo.active = true;
            if rng.gen_bool(0.5) {
                ufo.x = col_to_x(1);
                ufo.dx = 1;
            } else {
                ufo.x = col_to_x(37);
                ufo.dx = -1;
            }
        }
        return;
    }
    ufo.x += ufo.dx;
    sound.play(Effect::UfoHum(game.frame as u8));
    if ufo.x <= col_to_x(0) || ufo.x >= col_to_x(38) {
        ufo.active = false;
    }
}

/// Start an explosion in the first free slot.
pub fn explode(game: &mut MeteorGame, col: i32, row: i32) {
    if row < SKY_ROW || row >= SCREEN_ROWS as i32 || col < 0 || col >= SCREEN_COLS as i32 {
        return;
    }
    match game.explosions.iter_mut().find(|e| e.timer == 0) {
        Some(slot) => *slot = Explosion { col, row, timer: EXPLOSION_FRAMES },
        None => log::trace!("explosion pool full"),
    }
}

fn update_explosions(game: &mut MeteorGame) {
    for e in game.explosions.iter_mut() {
        e.timer = e.timer.saturating_sub(1);
    }
}

fn update_stars(game: &mut MeteorGame, rng: &mut impl Rng) {
    let phase = (game.frame & 3) as u8;
    for star in game.stars.iter_mut() {
        if phase >= star.speed {
            continue;
        }
        star.row += 1;
        if star.row >= SHIELD_ROW {
            star.row = SKY_ROW;
            star.col = rng.gen_range(0..SCREEN_COLS as i32);
            star.speed = rng.gen_range(1..=3);
            star.bright = star.speed == 3;
        }
    }
}

// ── Frame step ───────────────────────────────────────────────────────────────

/// One frame of play.
pub fn step(game: &mut MeteorGame, controls: &Controls, rng: &mut impl Rng, sound: &mut SoundBoard) -> Outcome {
    game.frame = game.frame.wrapping_add(1);

    if game.combo.timer > 0 {
        game.combo.timer -= 1;
        if game.combo.timer == 0 {
            game.combo.count = 0;
        }
    }
    game.double_shot = game.double_shot.saturating_sub(1);

    move_ship(game, direction(controls));
    if controls.fire {
        fire(game, sound);
    }

    game.spawn_timer = game.spawn_timer.saturating_add(1);
    if game.spawn_timer >= spawn_interval(game.hud.level) && game.spawned < game.quota {
        spawn_meteor(game, rng);
        game.spawn_timer = 0;
    }

    if move_meteors(game, sound) == Outcome::Died {
        return Outcome::Died;
    }

    update_shot(game, false, rng, sound);
    update_shot(game, true, rng, sound);
    update_power_up(game, sound);
    update_ufo(game, rng, sound);
    update_stars(game, rng);
    update_explosions(game);

    if game.spawned >= game.quota && game.meteors_alive() == 0 {
        game.hud.add_score(WAVE_BONUS * u32::from(game.hud.level));
        return Outcome::Cleared;
    }
    Outcome::Continue
}

/// Chase the lowest meteor and shoot when lined up.
pub fn autopilot(game: &MeteorGame, frame: u32) -> Controls {
    let lowest = game.meteors.iter().filter(|m| m.active).max_by_key(|m| m.row);
    let Some(target) = lowest else {
        return if game.ship_x < col_to_x(19) {
            Controls::right()
        } else if game.ship_x > col_to_x(21) {
            Controls::left()
        } else {
            Controls::IDLE
        };
    };

    let target_x = col_to_x(target.col);
    let mut controls = if game.ship_x < target_x - 4 {
        Controls::right()
    } else if game.ship_x > target_x + 4 {
        Controls::left()
    } else {
        Controls::IDLE
    };
    controls.fire = (game.ship_x - target_x).abs() <= 8 && frame & 3 == 0;
    controls
}

impl Game for MeteorGame {
    fn name(&self) -> &'static str {
        "METEOR STORM"
    }

    fn level_word(&self) -> &'static str {
        "WAVE"
    }

    fn hud(&self) -> &Hud {
        &self.hud
    }

    fn hud_mut(&mut self) -> &mut Hud {
        &mut self.hud
    }

    fn new_game<R: Rng>(&mut self, lives: u8, rng: &mut R) {
        *self = MeteorGame::new(lives);
        init_wave(self, rng);
    }

    fn reset_round(&mut self) {
        self.ship_x = SHIP_START_X;
        self.bullet = Shot::default();
        self.bullet2 = Shot::default();
    }

    fn serve_delay(&self) -> u16 {
        RESPAWN_DELAY
    }

    fn hold(&mut self, controls: &Controls) {
        move_ship(self, direction(controls));
    }

    fn launch(&mut self, _sound: &mut SoundBoard) {}

    fn play<R: Rng>(&mut self, controls: &Controls, rng: &mut R, sound: &mut SoundBoard) -> Outcome {
        step(self, controls, rng, sound)
    }

    fn next_level<R: Rng>(&mut self, rng: &mut R) {
        self.hud.level = self.hud.level.saturating_add(1);
        init_wave(self, rng);
    }

    fn autopilot(&self, frame: u32) -> Controls {
        autopilot(self, frame)
    }

    fn draw(&self, canvas: &mut Canvas) {
        storm::draw(self, canvas);
    }
}
