use c64_arcade::hal::*;
use c64_arcade::sound::*;

use pretty_assertions::assert_eq;

fn make_board() -> (SoundBoard, RecordingAudio) {
    (SoundBoard::new(), RecordingAudio::default())
}

// ── Cues ──────────────────────────────────────────────────────────────────────

#[test]
fn paddle_cue() {
    assert_eq!(
        Effect::Paddle.cue(),
        Cue { voice: Voice::One, waveform: Waveform::Sawtooth, frequency: 0x1800, frames: 4 }
    );
}

#[test]
fn combo_pitch_rises_with_count() {
    assert_eq!(Effect::Combo(3).cue().frequency, 0x2400);
    assert_eq!(Effect::Combo(4).cue().frequency, 0x2800);
    assert_eq!(Effect::Combo(255).cue().frequency, 0xFF00);
}

#[test]
fn ufo_hum_wobbles() {
    assert_eq!(Effect::UfoHum(0).cue().frequency, 0x3000);
    assert_eq!(Effect::UfoHum(7).cue().frequency, 0x3700);
    assert_eq!(Effect::UfoHum(8).cue().frequency, 0x3000);
}

// ── SoundBoard ────────────────────────────────────────────────────────────────

#[test]
fn effect_is_sent_at_end_of_frame() {
    let (mut board, mut audio) = make_board();
    board.begin_frame(&mut audio);
    board.play(Effect::Paddle);
    assert!(audio.events.is_empty());
    board.end_frame(&mut audio);
    assert_eq!(
        audio.events,
        vec![AudioEvent::Tone { voice: Voice::One, waveform: Waveform::Sawtooth, frequency: 0x1800, gate_on: true }]
    );
    assert_eq!(board.fired(), &[Effect::Paddle]);
}

#[test]
fn voice_stops_when_its_timer_runs_out() {
    let (mut board, mut audio) = make_board();
    board.play(Effect::Paddle);
    board.end_frame(&mut audio);
    audio.events.clear();

    for _ in 0..3 {
        board.begin_frame(&mut audio);
        board.end_frame(&mut audio);
    }
    assert!(audio.events.is_empty());
    assert_eq!(board.timer(Voice::One), 1);

    board.begin_frame(&mut audio);
    assert_eq!(audio.events, vec![AudioEvent::Stop(Voice::One)]);
    assert_eq!(board.timer(Voice::One), 0);

    // Nothing more once the voice is idle.
    board.begin_frame(&mut audio);
    assert_eq!(audio.events.len(), 1);
}

#[test]
fn replaying_a_voice_restarts_its_timer() {
    let (mut board, mut audio) = make_board();
    board.play(Effect::BrickBreak);
    board.begin_frame(&mut audio);
    board.begin_frame(&mut audio);
    board.play(Effect::BrickBreak);
    assert_eq!(board.timer(Voice::Two), 5);
}

#[test]
fn begin_frame_forgets_fired_effects() {
    let (mut board, mut audio) = make_board();
    board.play(Effect::Shoot);
    board.play(Effect::Split);
    assert_eq!(board.fired(), &[Effect::Shoot, Effect::Split]);
    board.begin_frame(&mut audio);
    assert!(board.fired().is_empty());
}

// ── Jingles ───────────────────────────────────────────────────────────────────

#[test]
fn death_jingle_descends_then_stops() {
    let (mut board, mut audio) = make_board();
    let frames = board.start_jingle(Jingle::Death);
    assert_eq!(frames, 22);
    assert!(board.jingle_playing());

    for _ in 0..frames {
        board.begin_frame(&mut audio);
        board.end_frame(&mut audio);
    }
    let tones = audio.tones_on(Voice::One);
    assert_eq!(tones.len(), 22);
    assert_eq!(tones.first(), Some(&0x3000));
    assert_eq!(tones.last(), Some(&0x0600));
    assert!(tones.windows(2).all(|w| w[1] < w[0]));

    board.begin_frame(&mut audio);
    board.end_frame(&mut audio);
    assert_eq!(audio.events.last(), Some(&AudioEvent::Stop(Voice::One)));
    assert!(!board.jingle_playing());
}

#[test]
fn victory_jingle_ascends() {
    let sweep = Sweep::for_jingle(Jingle::Victory);
    assert_eq!(sweep.frames(), 16);
    let (mut board, mut audio) = make_board();
    board.start_jingle(Jingle::Victory);
    board.end_frame(&mut audio);
    board.end_frame(&mut audio);
    assert_eq!(audio.tones_on(Voice::One), vec![0x1000, 0x1300]);
}

#[test]
fn bomb_sweep_length() {
    assert_eq!(Sweep::for_jingle(Jingle::Bomb).frames(), 16);
}

#[test]
fn silence_stops_everything() {
    let (mut board, mut audio) = make_board();
    board.play(Effect::Paddle);
    board.play(Effect::PowerUp);
    board.start_jingle(Jingle::Death);
    board.silence(&mut audio);
    assert_eq!(
        audio.events,
        vec![AudioEvent::Stop(Voice::One), AudioEvent::Stop(Voice::Two), AudioEvent::Stop(Voice::Three)]
    );
    assert!(!board.jingle_playing());
    assert_eq!(board.timer(Voice::Three), 0);

    // Pending tones were dropped too.
    board.end_frame(&mut audio);
    assert_eq!(audio.events.len(), 3);
}
