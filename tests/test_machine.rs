use c64_arcade::entities::*;
use c64_arcade::fixed::Fixed;
use c64_arcade::hal::*;
use c64_arcade::machine::*;

use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn make_machine(lives: u8) -> Machine<BallGame> {
    Machine::new(BallGame::arkanoid(lives), MachineConfig { lives, ..MachineConfig::default() })
}

/// Step `n` frames with the same controls; returns the last phase.
fn step_n(machine: &mut Machine<BallGame>, controls: Controls, n: usize, rng: &mut StdRng) -> Phase {
    let mut audio = RecordingAudio::default();
    let mut phase = machine.phase;
    for _ in 0..n {
        phase = machine.step(controls, rng, &mut audio);
    }
    phase
}

/// A player game in `Playing`, ball sent from wherever the test puts it.
fn playing_machine(lives: u8, rng: &mut StdRng) -> Machine<BallGame> {
    let mut machine = make_machine(lives);
    machine.start_game(rng);
    machine.phase = Phase::Playing;
    machine
}

fn falling_ball() -> Ball {
    Ball { dy: Fixed::from_raw(0x200), ..Ball::at_px(50, 240) }
}

// ── Title ─────────────────────────────────────────────────────────────────────

#[test]
fn title_times_out_into_demo() {
    let mut rng = seeded_rng();
    let mut machine = make_machine(3);
    assert_eq!(step_n(&mut machine, Controls::IDLE, 299, &mut rng), Phase::Title { timer: 299 });
    assert!(!machine.demo);
    assert_eq!(step_n(&mut machine, Controls::IDLE, 1, &mut rng), Phase::Launch { timer: 0 });
    assert!(machine.demo);
}

#[test]
fn fire_on_title_starts_a_game() {
    let mut rng = seeded_rng();
    let mut machine = make_machine(3);
    step_n(&mut machine, Controls::IDLE, 10, &mut rng);
    assert_eq!(step_n(&mut machine, Controls::fire(), 1, &mut rng), Phase::Launch { timer: 0 });
    assert!(!machine.demo);
    assert_eq!(machine.game.hud, Hud { score: 0, lives: 3, level: 1 });
    assert_eq!(machine.game.grid.remaining(), 48);
}

// ── Launch ────────────────────────────────────────────────────────────────────

#[test]
fn ball_serves_itself_after_the_delay() {
    let mut rng = seeded_rng();
    let mut machine = make_machine(3);
    step_n(&mut machine, Controls::fire(), 1, &mut rng);
    assert_eq!(step_n(&mut machine, Controls::IDLE, 249, &mut rng), Phase::Launch { timer: 249 });
    assert_eq!(step_n(&mut machine, Controls::IDLE, 1, &mut rng), Phase::Playing);
    assert_eq!(machine.game.ball.dy, machine.game.layout.launch_dy);
}

#[test]
fn holding_fire_does_not_serve_twice() {
    let mut rng = seeded_rng();
    let mut machine = make_machine(3);
    // The press that started the game is still held: no serve.
    assert_eq!(step_n(&mut machine, Controls::fire(), 5, &mut rng), Phase::Launch { timer: 4 });
    step_n(&mut machine, Controls::IDLE, 1, &mut rng);
    assert_eq!(step_n(&mut machine, Controls::fire(), 1, &mut rng), Phase::Playing);
}

#[test]
fn paddle_carries_the_ball_before_serve() {
    let mut rng = seeded_rng();
    let mut machine = make_machine(3);
    step_n(&mut machine, Controls::fire(), 1, &mut rng);
    let x0 = machine.game.paddle.x;
    step_n(&mut machine, Controls::left(), 4, &mut rng);
    assert_eq!(machine.game.paddle.x, x0 - 12);
    assert_eq!(machine.game.ball.x.px(), machine.game.paddle.center() - 2);
}

#[test]
fn demo_serves_on_its_own_beat() {
    let mut rng = seeded_rng();
    let mut machine = make_machine(3);
    machine.start_demo(&mut rng);
    assert!(matches!(step_n(&mut machine, Controls::IDLE, 63, &mut rng), Phase::Launch { .. }));
    assert_eq!(step_n(&mut machine, Controls::IDLE, 1, &mut rng), Phase::Playing);
}

#[test]
fn fire_leaves_the_demo() {
    let mut rng = seeded_rng();
    let mut machine = make_machine(3);
    machine.start_demo(&mut rng);
    step_n(&mut machine, Controls::IDLE, 100, &mut rng);
    assert_eq!(step_n(&mut machine, Controls::fire(), 1, &mut rng), Phase::Title { timer: 0 });
    assert!(!machine.demo);
}

// ── Dying / Lost ──────────────────────────────────────────────────────────────

#[test]
fn last_life_ends_the_game() {
    let mut rng = seeded_rng();
    let mut machine = playing_machine(1, &mut rng);
    machine.game.ball = falling_ball();

    assert_eq!(step_n(&mut machine, Controls::IDLE, 1, &mut rng), Phase::Dying { timer: 22 });
    assert!(machine.sound.jingle_playing());
    assert_eq!(step_n(&mut machine, Controls::IDLE, 21, &mut rng), Phase::Dying { timer: 1 });
    assert_eq!(step_n(&mut machine, Controls::IDLE, 1, &mut rng), Phase::Lost { timer: 240 });
    assert_eq!(machine.game.hud.lives, 0);

    assert_eq!(step_n(&mut machine, Controls::IDLE, 239, &mut rng), Phase::Lost { timer: 1 });
    assert_eq!(step_n(&mut machine, Controls::IDLE, 1, &mut rng), Phase::Title { timer: 0 });
}

#[test]
fn losing_a_life_puts_the_ball_back() {
    let mut rng = seeded_rng();
    let mut machine = playing_machine(3, &mut rng);
    machine.game.ball = falling_ball();
    machine.game.paddle.x += 30;

    assert_eq!(step_n(&mut machine, Controls::IDLE, 23, &mut rng), Phase::Launch { timer: 0 });
    assert_eq!(machine.game.hud.lives, 2);
    assert_eq!(machine.game.paddle, machine.game.layout.paddle);
    assert!(machine.game.ball.active);
    assert_eq!(machine.game.ball.dy, Fixed::ZERO);
}

// ── Won ───────────────────────────────────────────────────────────────────────

#[test]
fn clearing_the_grid_moves_to_the_next_level() {
    let mut rng = seeded_rng();
    let mut machine = playing_machine(3, &mut rng);
    machine.game.grid.fill(|r, c| u8::from(r == 0 && c == 0));
    machine.game.ball = Ball { dy: Fixed::from_raw(-0x100), ..Ball::at_px(56, 80) };

    assert_eq!(step_n(&mut machine, Controls::IDLE, 1, &mut rng), Phase::Won { timer: 180 });
    assert_eq!(machine.game.hud.score, 10);
    assert_eq!(step_n(&mut machine, Controls::IDLE, 179, &mut rng), Phase::Won { timer: 1 });
    assert_eq!(step_n(&mut machine, Controls::IDLE, 1, &mut rng), Phase::Launch { timer: 0 });
    assert_eq!(machine.game.hud.level, 2);
    assert_eq!(machine.game.grid.remaining(), 48);
    assert_eq!(machine.game.hud.score, 10);
}

#[test]
fn demo_returns_to_title_after_a_clear() {
    let mut rng = seeded_rng();
    let mut machine = make_machine(3);
    machine.start_demo(&mut rng);
    machine.phase = Phase::Won { timer: 1 };
    assert_eq!(step_n(&mut machine, Controls::IDLE, 1, &mut rng), Phase::Title { timer: 0 });
    assert!(!machine.demo);
}

// ── Headless run ──────────────────────────────────────────────────────────────

struct Session {
    machine: Machine<BallGame>,
    screen: CellBuffer,
    audio: RecordingAudio,
    frames: u64,
    ticks: u64,
}

fn run_session(seed: u64, input: ScriptedInput, max_frames: u64) -> Session {
    let mut machine = make_machine(3);
    let mut input = input;
    let mut clock = ManualClock::default();
    let mut screen = CellBuffer::new();
    let mut audio = RecordingAudio::default();
    let mut rng = StdRng::seed_from_u64(seed);
    let frames = run(&mut machine, &mut input, &mut clock, &mut screen, &mut audio, &mut rng, Some(max_frames));
    Session { machine, screen, audio, frames, ticks: clock.ticks }
}

#[test]
fn same_seed_and_input_give_the_same_session() {
    let script = || ScriptedInput::new([Controls::fire()]).hold(Controls::IDLE, 40).hold(Controls::right(), 200);
    let a = run_session(7, script(), 1_500);
    let b = run_session(7, script(), 1_500);

    assert_eq!(a.frames, 1_500);
    assert_eq!(a.ticks, 1_500);
    assert_eq!(a.machine.game, b.machine.game);
    assert_eq!(a.machine.phase, b.machine.phase);
    assert_eq!(a.audio.events, b.audio.events);
    for row in 0..SCREEN_ROWS {
        assert_eq!(a.screen.row_text(row), b.screen.row_text(row));
    }
}

#[test]
fn quit_stops_the_run() {
    let quit = Controls { quit: true, ..Controls::IDLE };
    let session = run_session(1, ScriptedInput::new([Controls::IDLE, Controls::IDLE, quit]), 100);
    assert_eq!(session.frames, 2);
    // The clock ticked for the frame that read the quit.
    assert_eq!(session.ticks, 3);
}

#[test]
fn long_demo_keeps_ball_and_paddle_in_bounds() {
    let mut rng = seeded_rng();
    let mut audio = RecordingAudio::default();
    let mut machine = make_machine(3);
    machine.start_demo(&mut rng);

    let bounds = machine.game.layout.bounds;
    let mut prev_phase = machine.phase;
    let mut prev_hp = total_hp(&machine.game.grid);
    for _ in 0..20_000 {
        let phase = machine.step(Controls::IDLE, &mut rng, &mut audio);
        let game = &machine.game;

        let p = game.paddle;
        assert!(p.min_x <= p.x && p.x <= p.max_x);
        let x = game.ball.x.px();
        assert!(bounds.min_x <= x && x <= bounds.max_x, "ball x {x}");

        let hp = total_hp(&game.grid);
        // Only starting a game refills the grid.
        if !matches!(prev_phase, Phase::Title { .. }) {
            assert!(hp <= prev_hp, "bricks grew from {prev_hp} to {hp}");
        }
        prev_hp = hp;
        prev_phase = phase;
    }
}

fn total_hp(grid: &BrickGrid) -> u32 {
    (0..grid.rows).flat_map(|r| (0..grid.cols).map(move |c| u32::from(grid.hp(r, c)))).sum()
}
