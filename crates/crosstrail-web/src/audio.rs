use std::cell::RefCell;
use std::rc::Rc;

use crosstrail_core::{
    db_to_gain, next_strike, AudioEngine, AudioError, Envelope, VoiceConfig, VoicePart, Waveform,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

use crate::constants::{MASTER_GAIN, NOTE_PEAK_GAIN, NOTE_STOP_PAD_SEC, SCHEDULE_LOOKAHEAD_SEC};

// Oscillators kept for "release all notes": the current strike plus one tail.
const MAX_TRACKED_NOTES: usize = 8;

type ActiveNotes = Rc<RefCell<Vec<web::OscillatorNode>>>;

/// One participant's sound: chord loop -> synth bus -> volume -> master.
pub struct WebVoice {
    volume: web::GainNode,
    synth: web::GainNode,
    level_gain: f32,
    interval_handle: Option<i32>,
    loop_closure: Option<Closure<dyn FnMut()>>,
    notes: ActiveNotes,
}

/// WebAudio backend. The context is only created from a user gesture, so
/// voices cannot be built before [`WebAudioEngine::resume`].
#[derive(Default)]
pub struct WebAudioEngine {
    ctx: Option<web::AudioContext>,
    master: Option<web::GainNode>,
}

fn js_err(e: JsValue) -> String {
    format!("{:?}", e)
}

fn create_gain(
    ctx: &web::AudioContext,
    value: f32,
    node: &'static str,
) -> Result<web::GainNode, AudioError> {
    let g = web::GainNode::new(ctx).map_err(|e| AudioError::Create {
        node,
        reason: js_err(e),
    })?;
    g.gain().set_value(value);
    Ok(g)
}

fn oscillator_type(waveform: Waveform) -> web::OscillatorType {
    match waveform {
        Waveform::Triangle => web::OscillatorType::Triangle,
        Waveform::Sine => web::OscillatorType::Sine,
        Waveform::Sawtooth => web::OscillatorType::Sawtooth,
    }
}

/// Strikes every chord note at `t0` and holds it for `hold_sec` before release.
#[allow(clippy::too_many_arguments)]
fn strike_chord(
    ctx: &web::AudioContext,
    synth: &web::GainNode,
    freqs: &[f32],
    waveform: Waveform,
    env: Envelope,
    t0: f64,
    hold_sec: f64,
    notes: &ActiveNotes,
) {
    let attack_end = t0 + env.attack as f64;
    let decay_end = attack_end + env.decay as f64;
    let release_start = (t0 + hold_sec).max(decay_end);
    let release_end = release_start + env.release as f64;
    let sustain = NOTE_PEAK_GAIN * env.sustain;

    for &freq in freqs {
        let Ok(src) = web::OscillatorNode::new(ctx) else {
            log::warn!("OscillatorNode creation failed; skipping note");
            continue;
        };
        let Ok(g) = web::GainNode::new(ctx) else {
            continue;
        };
        src.set_type(oscillator_type(waveform));
        src.frequency().set_value(freq);
        let gain = g.gain();
        let _ = gain.set_value_at_time(0.0, t0);
        let _ = gain.linear_ramp_to_value_at_time(NOTE_PEAK_GAIN, attack_end);
        let _ = gain.linear_ramp_to_value_at_time(sustain, decay_end);
        let _ = gain.set_value_at_time(sustain, release_start);
        let _ = gain.linear_ramp_to_value_at_time(0.0, release_end);
        let _ = src.connect_with_audio_node(&g);
        let _ = g.connect_with_audio_node(synth);
        let _ = src.start_with_when(t0);
        let _ = src.stop_with_when(release_end + NOTE_STOP_PAD_SEC);

        let mut tracked = notes.borrow_mut();
        tracked.push(src);
        let excess = tracked.len().saturating_sub(MAX_TRACKED_NOTES);
        tracked.drain(..excess);
    }
}

fn silence(notes: &ActiveNotes) {
    for src in notes.borrow_mut().drain(..) {
        // Already-finished oscillators throw here; that is fine.
        let _ = src.stop();
    }
}

fn start_loop(tick: &Closure<dyn FnMut()>, period_ms: i32) -> Result<i32, AudioError> {
    let window = web::window().ok_or_else(|| AudioError::Create {
        node: "loop",
        reason: "no window".into(),
    })?;
    window
        .set_interval_with_callback_and_timeout_and_arguments_0(
            tick.as_ref().unchecked_ref(),
            period_ms,
        )
        .map_err(|e| AudioError::Create {
            node: "loop",
            reason: js_err(e),
        })
}

impl WebAudioEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates (or resumes) the AudioContext. Must run inside a user gesture.
    pub fn resume(&mut self) -> anyhow::Result<()> {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
            return Ok(());
        }
        let ctx = web::AudioContext::new().map_err(|e| anyhow::anyhow!(js_err(e)))?;
        let master = create_gain(&ctx, MASTER_GAIN, "master gain")?;
        master
            .connect_with_audio_node(&ctx.destination())
            .map_err(|e| anyhow::anyhow!(js_err(e)))?;
        self.ctx = Some(ctx);
        self.master = Some(master);
        Ok(())
    }

    fn context(&self) -> Result<(&web::AudioContext, &web::GainNode), AudioError> {
        match (&self.ctx, &self.master) {
            (Some(ctx), Some(master)) => Ok((ctx, master)),
            _ => Err(AudioError::Create {
                node: "voice",
                reason: "audio context not started".into(),
            }),
        }
    }
}

impl AudioEngine for WebAudioEngine {
    type Voice = WebVoice;

    fn create_voice(&mut self, config: &VoiceConfig) -> Result<WebVoice, AudioError> {
        let (ctx, master) = self.context()?;
        let level_gain = db_to_gain(config.volume_db);
        let volume = create_gain(ctx, level_gain, "volume")?;
        let synth = create_gain(ctx, 1.0, "synth bus")?;
        if let Err(e) = synth
            .connect_with_audio_node(&volume)
            .and_then(|_| volume.connect_with_audio_node(master))
        {
            let _ = synth.disconnect();
            let _ = volume.disconnect();
            return Err(AudioError::Create {
                node: "voice routing",
                reason: js_err(e),
            });
        }

        let notes: ActiveNotes = Rc::new(RefCell::new(Vec::new()));
        let freqs = config.chord_hz();
        let period = config.interval.seconds() as f64;
        let first = ctx.current_time() + config.start_offset_sec as f64;

        strike_chord(
            ctx,
            &synth,
            &freqs,
            config.waveform,
            config.envelope,
            first,
            period,
            &notes,
        );

        // Strikes stay `period` apart from the offset start. A late tick
        // resumes at the lookahead.
        let loop_closure = {
            let ctx = ctx.clone();
            let synth = synth.clone();
            let notes = notes.clone();
            let waveform = config.waveform;
            let env = config.envelope;
            let mut next = first;
            Closure::wrap(Box::new(move || {
                let earliest = ctx.current_time() + SCHEDULE_LOOKAHEAD_SEC;
                next = next_strike(next, period, earliest);
                strike_chord(&ctx, &synth, &freqs, waveform, env, next, period, &notes);
            }) as Box<dyn FnMut()>)
        };
        let period_ms = (period * 1000.0) as i32;
        let interval_handle = match start_loop(&loop_closure, period_ms) {
            Ok(handle) => handle,
            Err(e) => {
                silence(&notes);
                let _ = synth.disconnect();
                let _ = volume.disconnect();
                return Err(e);
            }
        };

        Ok(WebVoice {
            volume,
            synth,
            level_gain,
            interval_handle: Some(interval_handle),
            loop_closure: Some(loop_closure),
            notes,
        })
    }

    fn cancel_ramps(&mut self, voice: &mut WebVoice) -> Result<(), AudioError> {
        let (ctx, _) = self.context()?;
        let now = ctx.current_time();
        let gain = voice.volume.gain();
        let held = gain.value();
        gain.cancel_scheduled_values(now)
            .and_then(|_| gain.set_value_at_time(held, now))
            .map_err(|e| AudioError::Automation(js_err(e)))?;
        voice.level_gain = held;
        Ok(())
    }

    fn ramp_volume(
        &mut self,
        voice: &mut WebVoice,
        db: f32,
        duration_sec: f64,
        delay_sec: f64,
    ) -> Result<(), AudioError> {
        let (ctx, _) = self.context()?;
        let start = ctx.current_time() + delay_sec;
        let target = db_to_gain(db);
        let gain = voice.volume.gain();
        // Anchor at the level the previous ramp ends on.
        gain.set_value_at_time(voice.level_gain, start)
            .and_then(|_| gain.linear_ramp_to_value_at_time(target, start + duration_sec))
            .map_err(|e| AudioError::Automation(js_err(e)))?;
        voice.level_gain = target;
        Ok(())
    }

    fn release(&mut self, voice: &mut WebVoice, part: VoicePart) -> Result<(), AudioError> {
        let failed = |e: JsValue| AudioError::Release {
            part,
            reason: js_err(e),
        };
        match part {
            VoicePart::Notes => {
                silence(&voice.notes);
                Ok(())
            }
            VoicePart::Synth => voice.synth.disconnect().map_err(failed),
            VoicePart::Volume => voice.volume.disconnect().map_err(failed),
            VoicePart::Loop => {
                if let (Some(handle), Some(w)) = (voice.interval_handle.take(), web::window()) {
                    w.clear_interval_with_handle(handle);
                }
                voice.loop_closure = None;
                Ok(())
            }
        }
    }
}
