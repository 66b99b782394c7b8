//! Ball-and-grid frame logic, shared by the Arkanoid and Breakout presets.
//!
//! Everything mutates a `BallGame` in place; the only side channels are the
//! injected RNG (level generation) and the `SoundBoard`.

use rand::Rng;

use crate::collision::{brick_score, resolve_grid, resolve_paddle};
use crate::display::{court, Canvas};
use crate::entities::{ArenaLayout, Ball, BallGame, Hud, Strike};
use crate::hal::Controls;
use crate::levels;
use crate::machine::{Game, Outcome};
use crate::physics::{advance, direction, hold_on_paddle, move_paddle, reflect_walls};
use crate::sound::{Effect, SoundBoard};

/// Frames the ball waits on the paddle before serving itself.
pub const SERVE_DELAY: u16 = 250;

/// Demo paddle ignores the ball while it is this close to the paddle middle.
const AUTOPILOT_DEADZONE: i32 = 4;

// ── Constructors ─────────────────────────────────────────────────────────────

impl BallGame {
    /// A game on `layout` with an empty grid; `new_game` fills it.
    pub fn new(layout: ArenaLayout, lives: u8) -> Self {
        let grid = layout.empty_grid();
        let paddle = layout.paddle;
        let mut game = BallGame {
            layout,
            paddle,
            ball: Ball::at_px(0, 0),
            grid,
            hud: Hud::new(lives),
        };
        game.reset_round();
        game
    }

    pub fn arkanoid(lives: u8) -> Self {
        Self::new(ArenaLayout::arkanoid(), lives)
    }

    pub fn breakout(lives: u8) -> Self {
        Self::new(ArenaLayout::breakout(), lives)
    }
}

// ── Frame step ───────────────────────────────────────────────────────────────

/// Ball rides the paddle while it moves.
pub fn hold(game: &mut BallGame, controls: &Controls) {
    move_paddle(&mut game.paddle, direction(controls));
    hold_on_paddle(&mut game.ball, &game.paddle, game.layout.ball_size, game.layout.serve_height);
}

/// Release the ball with the layout's serve velocity.
pub fn launch(game: &mut BallGame) {
    game.ball.dx = game.layout.launch_dx;
    game.ball.dy = game.layout.launch_dy;
    game.ball.active = true;
}

/// One frame of play: paddle, ball, walls, death line, paddle, bricks.
pub fn step(game: &mut BallGame, controls: &Controls, sound: &mut SoundBoard) -> Outcome {
    move_paddle(&mut game.paddle, direction(controls));
    if !game.ball.active {
        return Outcome::Continue;
    }

    advance(&mut game.ball);
    let walls = reflect_walls(&mut game.ball, &game.layout.bounds);
    for _ in 0..walls.count() {
        sound.play(Effect::WallBounce);
    }

    if game.ball.y.px() >= game.layout.death_y {
        game.ball.active = false;
        return Outcome::Died;
    }

    let layout = &game.layout;
    if resolve_paddle(&mut game.ball, &game.paddle, layout.ball_size, &layout.bounce) {
        sound.play(Effect::Paddle);
        return Outcome::Continue;
    }

    // A top-wall bounce already flipped dy this frame.
    if walls.top {
        return Outcome::Continue;
    }

    if let Some(hit) = resolve_grid(&mut game.ball, &mut game.grid, layout.ball_size) {
        game.hud.add_score(brick_score(hit.strike, game.hud.level));
        match hit.strike {
            Strike::Destroyed => sound.play(Effect::BrickBreak),
            Strike::Damaged { .. } => sound.play(Effect::BrickDamage),
        }
        if game.grid.remaining() == 0 {
            game.hud.add_score(layout.clear_bonus * u32::from(game.hud.level));
            return Outcome::Cleared;
        }
    }

    Outcome::Continue
}

/// Level +1 and a freshly generated grid.
pub fn next_level(game: &mut BallGame, rng: &mut impl Rng) {
    game.hud.level = game.hud.level.saturating_add(1);
    levels::generate(&mut game.grid, game.layout.scheme, game.hud.level, rng);
}

/// Follow the ball with the paddle middle.
pub fn autopilot(game: &BallGame) -> Controls {
    let target = game.ball.x.px() + game.layout.ball_size / 2;
    let middle = game.paddle.center();
    if target < middle - AUTOPILOT_DEADZONE {
        Controls::left()
    } else if target > middle + AUTOPILOT_DEADZONE {
        Controls::right()
    } else {
        Controls::IDLE
    }
}

impl Game for BallGame {
    fn name(&self) -> &'static str {
        self.layout.name
    }

    fn level_word(&self) -> &'static str {
        "LEVEL"
    }

    fn hud(&self) -> &Hud {
        &self.hud
    }

    fn hud_mut(&mut self) -> &mut Hud {
        &mut self.hud
    }

    fn new_game<R: Rng>(&mut self, lives: u8, rng: &mut R) {
        self.hud = Hud::new(lives);
        levels::generate(&mut self.grid, self.layout.scheme, self.hud.level, rng);
    }

    fn reset_round(&mut self) {
        self.paddle = self.layout.paddle;
        hold_on_paddle(&mut self.ball, &self.paddle, self.layout.ball_size, self.layout.serve_height);
    }

    fn serve_delay(&self) -> u16 {
        SERVE_DELAY
    }

    fn hold(&mut self, controls: &Controls) {
        hold(self, controls);
    }

    fn launch(&mut self, _sound: &mut SoundBoard) {
        launch(self);
    }

    fn play<R: Rng>(&mut self, controls: &Controls, _rng: &mut R, sound: &mut SoundBoard) -> Outcome {
        step(self, controls, sound)
    }

    fn next_level<R: Rng>(&mut self, rng: &mut R) {
        next_level(self, rng);
    }

    fn autopilot(&self, _frame: u32) -> Controls {
        autopilot(self)
    }

    fn draw(&self, canvas: &mut Canvas) {
        court::draw(self, canvas);
    }
}
