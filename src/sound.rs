//! Sound effects as short gated tones.
//!
//! Game code never talks to the tone generator directly: it asks the
//! `SoundBoard` for an `Effect`, and the board turns that into a gate-on
//! tone plus a per-voice countdown.  When a countdown runs out the voice is
//! stopped, which stands in for real envelope control.  Multi-frame
//! `Jingle`s step a voice through a frequency ramp, one step per frame.

use crate::hal::{Audio, Voice, Waveform};

/// A single gated tone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cue {
    pub voice: Voice,
    pub waveform: Waveform,
    pub frequency: u16,
    /// Frames until the voice is silenced.
    pub frames: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Ball off a wall.
    WallBounce,
    Paddle,
    BrickBreak,
    /// Brick hit but still standing.
    BrickDamage,
    Shoot,
    ExplodeSmall,
    ExplodeLarge,
    /// Large meteor breaking in two.
    Split,
    PowerUp,
    /// Rising pitch with the combo count.
    Combo(u8),
    /// UFO engine hum, wobbling with the frame counter.
    UfoHum(u8),
}

impl Effect {
    pub fn cue(self) -> Cue {
        let (voice, waveform, hi, frames) = match self {
            Effect::WallBounce => (Voice::One, Waveform::Noise, 0x30, 3),
            Effect::Paddle => (Voice::One, Waveform::Sawtooth, 0x18, 4),
            Effect::BrickBreak => (Voice::Two, Waveform::Triangle, 0x28, 5),
            Effect::BrickDamage => (Voice::One, Waveform::Noise, 0x30, 3),
            Effect::Shoot => (Voice::One, Waveform::Noise, 0x28, 3),
            Effect::ExplodeSmall => (Voice::Two, Waveform::Noise, 0x15, 5),
            Effect::ExplodeLarge => (Voice::Two, Waveform::Noise, 0x0A, 8),
            Effect::Split => (Voice::Three, Waveform::Sawtooth, 0x30, 4),
            Effect::PowerUp => (Voice::Three, Waveform::Triangle, 0x20, 8),
            Effect::Combo(n) => (Voice::Three, Waveform::Triangle, 0x18u8.saturating_add(n.saturating_mul(4)), 3),
            Effect::UfoHum(frame) => (Voice::Three, Waveform::Pulse, 0x30 + (frame & 0x07), 2),
        };
        Cue { voice, waveform, frequency: u16::from(hi) << 8, frames }
    }
}

/// Multi-frame frequency ramps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Jingle {
    /// Descending tone when the player dies.
    Death,
    /// Ascending run when a level is cleared.
    Victory,
    /// Noise sweep for the screen-clearing bomb.
    Bomb,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sweep {
    pub voice: Voice,
    pub waveform: Waveform,
    /// Current oscillator high byte.
    pub hi: u8,
    /// The ramp stops before reaching this value.
    pub end: u8,
    pub step: i8,
}

impl Sweep {
    pub fn for_jingle(jingle: Jingle) -> Self {
        match jingle {
            Jingle::Death => Sweep { voice: Voice::One, waveform: Waveform::Sawtooth, hi: 0x30, end: 0x05, step: -2 },
            Jingle::Victory => Sweep { voice: Voice::One, waveform: Waveform::Triangle, hi: 0x10, end: 0x40, step: 3 },
            Jingle::Bomb => Sweep { voice: Voice::One, waveform: Waveform::Noise, hi: 0x30, end: 0x02, step: -3 },
        }
    }

    pub fn running(&self) -> bool {
        if self.step < 0 {
            self.hi > self.end
        } else {
            self.hi < self.end
        }
    }

    /// Number of frames the ramp plays for.
    pub fn frames(&self) -> u8 {
        let mut probe = *self;
        let mut n = 0u8;
        while probe.running() {
            probe.advance();
            n = n.saturating_add(1);
        }
        n
    }

    fn advance(&mut self) {
        self.hi = if self.step < 0 {
            self.hi.saturating_sub(self.step.unsigned_abs())
        } else {
            self.hi.saturating_add(self.step as u8)
        };
    }
}

#[derive(Clone, Debug, Default)]
pub struct SoundBoard {
    timers: [u8; 3],
    pending: Vec<Cue>,
    sweep: Option<Sweep>,
    fired: Vec<Effect>,
}

impl SoundBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an effect for this frame.
    pub fn play(&mut self, effect: Effect) {
        let cue = effect.cue();
        self.timers[cue.voice.index()] = cue.frames;
        self.pending.push(cue);
        self.fired.push(effect);
    }

    /// Start a jingle and return how many frames it lasts.
    pub fn start_jingle(&mut self, jingle: Jingle) -> u8 {
        let sweep = Sweep::for_jingle(jingle);
        self.timers[sweep.voice.index()] = 0;
        self.sweep = Some(sweep);
        sweep.frames()
    }

    pub fn jingle_playing(&self) -> bool {
        self.sweep.is_some()
    }

    /// Effects queued since the last `begin_frame`.
    pub fn fired(&self) -> &[Effect] {
        &self.fired
    }

    pub fn timer(&self, voice: Voice) -> u8 {
        self.timers[voice.index()]
    }

    /// Count down running voices and silence the ones that expire.  Called
    /// at the top of a frame, before any new effect is queued.
    pub fn begin_frame(&mut self, audio: &mut impl Audio) {
        self.fired.clear();
        for voice in Voice::ALL {
            let t = &mut self.timers[voice.index()];
            if *t > 0 {
                *t -= 1;
                if *t == 0 {
                    audio.stop(voice);
                }
            }
        }
    }

    /// Send this frame's tones and step the running jingle.
    pub fn end_frame(&mut self, audio: &mut impl Audio) {
        for cue in self.pending.drain(..) {
            audio.play_tone(cue.voice, cue.waveform, cue.frequency, true);
        }
        if let Some(mut sweep) = self.sweep.take() {
            if sweep.running() {
                audio.play_tone(sweep.voice, sweep.waveform, u16::from(sweep.hi) << 8, true);
                sweep.advance();
                self.sweep = Some(sweep);
            } else {
                audio.stop(sweep.voice);
            }
        }
    }

    /// Stop every voice immediately.
    pub fn silence(&mut self, audio: &mut impl Audio) {
        self.pending.clear();
        self.sweep = None;
        self.timers = [0; 3];
        for voice in Voice::ALL {
            audio.stop(voice);
        }
    }
}
