use c64_arcade::collision::*;
use c64_arcade::compute::*;
use c64_arcade::entities::*;
use c64_arcade::fixed::Fixed;
use c64_arcade::hal::Controls;
use c64_arcade::levels;
use c64_arcade::machine::{Game, Outcome};
use c64_arcade::sound::{Effect, SoundBoard};

use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// Arkanoid at level 1, every brick one hit.
fn make_game() -> BallGame {
    let mut game = BallGame::arkanoid(3);
    game.new_game(3, &mut seeded_rng());
    game
}

fn ball(x: i32, y: i32, dx: i32, dy: i32) -> Ball {
    Ball {
        x: Fixed::from_px(x),
        y: Fixed::from_px(y),
        dx: Fixed::from_raw(dx),
        dy: Fixed::from_raw(dy),
        active: true,
    }
}

// ── Setup ─────────────────────────────────────────────────────────────────────

#[test]
fn new_game_fills_the_grid() {
    let game = make_game();
    assert_eq!(game.grid.remaining(), 48);
    assert_eq!(game.hud, Hud { score: 0, lives: 3, level: 1 });
}

#[test]
fn reset_round_parks_ball_on_paddle() {
    let mut game = make_game();
    game.paddle.x = 60;
    game.ball = ball(100, 100, 0x100, 0x100);
    game.reset_round();
    assert_eq!(game.paddle, game.layout.paddle);
    assert_eq!(game.ball.x.px(), game.paddle.center() - 2);
    assert_eq!(game.ball.y.px(), game.paddle.y - game.layout.serve_height);
    assert_eq!(game.ball.dx, Fixed::ZERO);
    assert_eq!(game.ball.dy, Fixed::ZERO);
}

#[test]
fn hold_carries_ball_with_paddle() {
    let mut game = make_game();
    let x0 = game.paddle.x;
    hold(&mut game, &Controls::right());
    assert_eq!(game.paddle.x, x0 + 3);
    assert_eq!(game.ball.x.px(), game.paddle.center() - 2);
}

#[test]
fn launch_uses_serve_velocity() {
    let mut game = make_game();
    launch(&mut game);
    assert_eq!(game.ball.dx, Fixed::from_raw(0x140));
    assert_eq!(game.ball.dy, Fixed::from_raw(-0x180));
}

// ── Bricks ────────────────────────────────────────────────────────────────────

#[test]
fn brick_hit_clears_cell_and_scores() {
    let mut game = make_game();
    let mut sound = SoundBoard::new();
    // Centre lands in screen cell (4, 3): brick row 0, column 0.
    game.ball = ball(56, 80, 0, -0x100);

    let outcome = step(&mut game, &Controls::IDLE, &mut sound);

    assert_eq!(outcome, Outcome::Continue);
    assert_eq!(game.grid.hp(0, 0), 0);
    assert_eq!(game.grid.remaining(), 47);
    assert_eq!(game.hud.score, 10 * u32::from(game.hud.level));
    assert_eq!(game.ball.dy, Fixed::from_raw(0x100));
    assert_eq!(sound.fired(), &[Effect::BrickBreak]);
}

#[test]
fn multi_hit_brick_is_damaged_first() {
    let mut game = make_game();
    game.hud.level = 2;
    levels::generate(&mut game.grid, game.layout.scheme, 2, &mut seeded_rng());
    let mut sound = SoundBoard::new();
    game.ball = ball(56, 80, 0, -0x100);

    step(&mut game, &Controls::IDLE, &mut sound);

    assert_eq!(game.grid.hp(0, 0), 1);
    assert_eq!(game.grid.remaining(), 48);
    assert_eq!(game.hud.score, 5);
    assert_eq!(sound.fired(), &[Effect::BrickDamage]);
}

#[test]
fn only_one_brick_per_frame() {
    let mut game = make_game();
    let mut sound = SoundBoard::new();
    // Centre in brick row 1; the row above is live too.
    game.ball = ball(56, 88, 0, -0x100);
    step(&mut game, &Controls::IDLE, &mut sound);
    assert_eq!(game.grid.remaining(), 47);
    assert_eq!(game.grid.hp(1, 0), 0);
    assert_eq!(game.grid.hp(0, 0), 1);
}

#[test]
fn probe_looks_ahead_in_direction_of_travel() {
    let mut game = make_game();
    let mut sound = SoundBoard::new();
    // Centre sits one row below the grid, moving up: the row above is hit.
    game.ball = ball(56, 126, 0, -0x100);
    step(&mut game, &Controls::IDLE, &mut sound);
    assert_eq!(game.grid.hp(5, 0), 0);
}

#[test]
fn destroyed_brick_never_collides_again() {
    let mut game = make_game();
    let mut sound = SoundBoard::new();
    game.grid.fill(|r, c| if r == 3 && c == 3 { 0 } else { 1 });
    let remaining = game.grid.remaining();
    // Brick (3, 3) covers screen columns 12..=14, row 6.
    game.ball = ball(127, 101, 0, -0x100);
    step(&mut game, &Controls::IDLE, &mut sound);
    assert_eq!(game.grid.remaining(), remaining - 1);
    assert_eq!(game.grid.hp(2, 3), 0); // the brick ahead took the hit
}

#[test]
fn last_brick_clears_the_level() {
    let mut game = make_game();
    let mut sound = SoundBoard::new();
    game.grid.fill(|r, c| u8::from(r == 0 && c == 0));
    game.ball = ball(56, 80, 0, -0x100);
    assert_eq!(step(&mut game, &Controls::IDLE, &mut sound), Outcome::Cleared);
    assert_eq!(game.grid.remaining(), 0);
}

#[test]
fn breakout_clear_awards_level_bonus() {
    let mut game = BallGame::breakout(3);
    game.new_game(3, &mut seeded_rng());
    game.grid.fill(|r, c| u8::from(r == 0 && c == 0));
    let mut sound = SoundBoard::new();
    // Breakout brick (0, 0) covers screen columns 1..=4, row 3; ball is 8 px.
    game.ball = ball(44, 77, 0, -0x100);
    assert_eq!(step(&mut game, &Controls::IDLE, &mut sound), Outcome::Cleared);
    assert_eq!(game.hud.score, 10 + 100);
}

#[test]
fn next_level_regenerates_grid() {
    let mut game = make_game();
    game.grid.fill(|_, _| 0);
    next_level(&mut game, &mut seeded_rng());
    assert_eq!(game.hud.level, 2);
    assert_eq!(game.grid.remaining(), 48);
    assert_eq!(game.grid.hp(0, 3), 2);
    assert_eq!(game.grid.hp(1, 3), 1);
}

// ── Paddle ────────────────────────────────────────────────────────────────────

#[test]
fn centre_paddle_hit_gives_minimum_dx() {
    let layout = ArenaLayout::arkanoid();
    let paddle = Paddle { x: 76, width: 48, ..layout.paddle }; // centred at 100
    assert_eq!(paddle.center(), 100);
    assert_eq!(paddle_bounce_dx(100, &paddle, &layout.bounce), Fixed::from_raw(0x60));
}

#[test]
fn paddle_bounce_dx_is_monotonic_and_bounded() {
    for layout in [ArenaLayout::arkanoid(), ArenaLayout::breakout()] {
        let paddle = layout.paddle;
        let t = layout.bounce;
        let mut prev = None;
        for hit in paddle.x..=paddle.x + paddle.width {
            let dx = paddle_bounce_dx(hit, &paddle, &t);
            assert!(dx.abs() >= t.min_dx && dx.abs() <= t.max_dx, "{} at {hit}", layout.name);
            if let Some(p) = prev {
                assert!(dx >= p, "{} not monotonic at {hit}", layout.name);
            }
            prev = Some(dx);
        }
    }
}

#[test]
fn paddle_sends_ball_back_up_faster() {
    let mut game = make_game();
    let mut sound = SoundBoard::new();
    let centre = game.paddle.center();
    game.ball = ball(centre - 2, 223, 0, 0x180);

    step(&mut game, &Controls::IDLE, &mut sound);

    assert_eq!(game.ball.dy, Fixed::from_raw(-0x188));
    assert_eq!(game.ball.dx, Fixed::from_raw(0x60));
    assert_eq!(game.ball.y.px(), game.paddle.y - 5);
    assert_eq!(sound.fired(), &[Effect::Paddle]);
}

#[test]
fn paddle_bounce_upward_speed_is_capped() {
    let t = ArenaLayout::arkanoid().bounce;
    assert_eq!(paddle_bounce_dy(Fixed::from_raw(0x40), &t), Fixed::from_raw(-0x108));
    assert_eq!(paddle_bounce_dy(Fixed::from_raw(0x27c), &t), Fixed::from_raw(-0x280));
    assert_eq!(paddle_bounce_dy(Fixed::from_raw(0x300), &t), Fixed::from_raw(-0x300));
}

#[test]
fn rising_ball_passes_through_paddle() {
    let game = make_game();
    let centre = game.paddle.center();
    let mut b = ball(centre - 2, 226, 0, -0x100);
    assert!(!resolve_paddle(&mut b, &game.paddle, 5, &game.layout.bounce));
    assert_eq!(b.dy, Fixed::from_raw(-0x100));
}

#[test]
fn ball_missing_the_paddle_dies() {
    let mut game = make_game();
    let mut sound = SoundBoard::new();
    game.ball = ball(50, 240, 0, 0x200);
    assert_eq!(step(&mut game, &Controls::IDLE, &mut sound), Outcome::Died);
    assert!(!game.ball.active);
}

// ── Walls ─────────────────────────────────────────────────────────────────────

#[test]
fn wall_bounce_fires_one_cue_per_wall() {
    let mut game = make_game();
    let mut sound = SoundBoard::new();
    game.grid.fill(|_, _| 0);
    let b = game.layout.bounds;
    // Heading into the top-left corner.
    game.ball = ball(b.min_x + 1, b.min_y + 1, -0x200, -0x200);
    step(&mut game, &Controls::IDLE, &mut sound);
    assert_eq!(sound.fired(), &[Effect::WallBounce, Effect::WallBounce]);
    assert_eq!(game.ball.dx, Fixed::from_raw(0x200));
    assert_eq!(game.ball.dy, Fixed::from_raw(0x200));
}

// ── Autopilot ─────────────────────────────────────────────────────────────────

#[test]
fn autopilot_tracks_the_ball() {
    let mut game = make_game();
    let centre = game.paddle.center();
    game.ball = ball(centre - 40, 150, 0, 0x100);
    assert_eq!(autopilot(&game), Controls::left());
    game.ball = ball(centre + 40, 150, 0, 0x100);
    assert_eq!(autopilot(&game), Controls::right());
    game.ball = ball(centre - 2, 150, 0, 0x100);
    assert_eq!(autopilot(&game), Controls::IDLE);
}
