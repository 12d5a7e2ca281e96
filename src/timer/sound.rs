// Oscillator tones and vibration feedback for timer cues.

use web_sys::{AudioContext, OscillatorType};

use super::{Cue, TimerSettings, Tone, Waveform};

const PEAK_GAIN: f32 = 0.3;
const FLOOR_GAIN: f32 = 0.01;

/// Lazily created audio context shared by every cue of one timer view.
#[derive(Default)]
pub struct CuePlayer {
    context: Option<AudioContext>,
}

impl CuePlayer {
    pub fn new() -> Self {
        Self { context: None }
    }

    fn context(&mut self) -> Option<&AudioContext> {
        if self.context.is_none() {
            match AudioContext::new() {
                Ok(ctx) => self.context = Some(ctx),
                Err(err) => {
                    log::error!("timer audio context: {}", crate::error::describe_js(&err));
                    return None;
                }
            }
        }
        let ctx = self.context.as_ref()?;
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        Some(ctx)
    }

    pub fn play(&mut self, cue: Cue, settings: &TimerSettings) {
        log::debug!("timer cue {cue:?}");
        if settings.sound_enabled {
            if let Some(ctx) = self.context() {
                let now = ctx.current_time();
                for t in cue.tones() {
                    play_tone(ctx, t, now);
                }
            }
        }
        if settings.vibration_enabled {
            vibrate(cue.vibration());
        }
    }

    pub fn close(&mut self) {
        if let Some(ctx) = self.context.take() {
            let _ = ctx.close();
        }
    }
}

fn play_tone(ctx: &AudioContext, tone: &Tone, now: f64) {
    let Ok(osc) = ctx.create_oscillator() else {
        return;
    };
    let Ok(gain) = ctx.create_gain() else {
        return;
    };
    if osc.connect_with_audio_node(&gain).is_err()
        || gain.connect_with_audio_node(&ctx.destination()).is_err()
    {
        return;
    }
    let start = now + tone.offset_s;
    let end = start + tone.duration_s;
    osc.set_type(match tone.waveform {
        Waveform::Sine => OscillatorType::Sine,
        Waveform::Triangle => OscillatorType::Triangle,
    });
    let _ = osc.frequency().set_value_at_time(tone.frequency, start);
    let _ = gain.gain().set_value_at_time(PEAK_GAIN, start);
    let _ = gain.gain().exponential_ramp_to_value_at_time(FLOOR_GAIN, end);
    let _ = osc.start_with_when(start);
    let _ = osc.stop_with_when(end);
}

fn vibrate(pattern: &[u32]) {
    if pattern.is_empty() {
        return;
    }
    let Some(win) = web_sys::window() else {
        return;
    };
    let nav = win.navigator();
    // Browsers without the Vibration API lack the method entirely.
    let supported = js_sys::Reflect::has(&nav, &"vibrate".into()).unwrap_or(false);
    if !supported {
        return;
    }
    let arr = js_sys::Array::new();
    for ms in pattern {
        arr.push(&(*ms).into());
    }
    nav.vibrate_with_pattern(&arr);
}
