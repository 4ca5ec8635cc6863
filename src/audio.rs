//! Audio playback using Web Audio and SpeechSynthesis
//!
//! Sound effects are procedurally generated - no external files needed.
//! Speech uses the browser's built-in voices.

use web_sys::{
    AudioContext, GainNode, OscillatorNode, OscillatorType, SpeechSynthesis,
    SpeechSynthesisUtterance,
};

use crate::settings::Settings;
use crate::speech::{Cue, SoundEffect, Utterance, VOICE_LANG};

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    synth: Option<SpeechSynthesis>,
    /// Volumes, rate and mute
    settings: Settings,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - sound effects disabled");
        }
        let synth = web_sys::window().and_then(|w| w.speech_synthesis().ok());
        if synth.is_none() {
            log::warn!("SpeechSynthesis unavailable - speech disabled");
        }
        Self {
            ctx,
            synth,
            settings: settings.clone(),
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Mute/unmute all audio; muting also cuts off speech in progress
    pub fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
        if muted {
            if let Some(synth) = &self.synth {
                synth.cancel();
            }
        }
    }

    /// Play one queued cue
    pub fn play_cue(&self, cue: &Cue) {
        match cue {
            Cue::Speak(utterance) => self.speak(utterance),
            Cue::Sound(effect) => self.play(*effect),
        }
    }

    /// Speak a line, queued behind current speech unless it interrupts
    pub fn speak(&self, utterance: &Utterance) {
        let volume = self.settings.effective_speech_volume();
        if volume <= 0.0 {
            return;
        }
        let Some(synth) = &self.synth else { return };
        let Ok(utt) = SpeechSynthesisUtterance::new_with_text(&utterance.text) else {
            return;
        };

        utt.set_lang(VOICE_LANG);
        utt.set_rate(utterance.rate * self.settings.speech_rate);
        utt.set_pitch(utterance.pitch);
        utt.set_volume(volume);

        if utterance.interrupt {
            synth.cancel();
        }
        synth.speak(&utt);
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.settings.effective_sfx_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::Pick => self.play_pick(ctx, vol),
            SoundEffect::Munch => self.play_munch(ctx, vol),
            SoundEffect::Wrong => self.play_wrong(ctx, vol),
            SoundEffect::Success => self.play_success(ctx, vol),
            SoundEffect::LevelUp => self.play_level_up(ctx, vol),
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Short rising pluck at time offset `at`
    fn note(&self, ctx: &AudioContext, vol: f32, freq: f32, at: f64, len: f64) {
        let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time() + at;

        gain.gain().set_value_at_time(0.0, t).ok();
        gain.gain().linear_ramp_to_value_at_time(vol, t + 0.02).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + len)
            .ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + len + 0.02).ok();
    }

    /// Apple snapped off a branch - woody knock
    fn play_pick(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 320.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.5, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.12)
            .ok();
        osc.frequency().set_value_at_time(320.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(140.0, t + 0.12)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.15).ok();
    }

    /// Hedgehog eats - two quick low chomps
    fn play_munch(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [180.0, 150.0].into_iter().enumerate() {
            let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Square) else {
                return;
            };
            let t = ctx.current_time() + i as f64 * 0.14;

            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.09)
                .ok();

            osc.start_with_when(t).ok();
            osc.stop_with_when(t + 0.1).ok();
        }
    }

    /// Wrong answer - soft falling tone
    fn play_wrong(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 330.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.35)
            .ok();
        osc.frequency().set_value_at_time(330.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(220.0, t + 0.3)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.4).ok();
    }

    /// Correct answer - major arpeggio
    fn play_success(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [523.25, 659.25, 783.99].into_iter().enumerate() {
            self.note(ctx, vol * 0.35, freq, i as f64 * 0.1, 0.25);
        }
    }

    /// Level up - longer fanfare ending on the octave
    fn play_level_up(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [392.0, 523.25, 659.25, 783.99, 1046.5]
            .into_iter()
            .enumerate()
        {
            self.note(ctx, vol * 0.35, freq, i as f64 * 0.12, 0.3);
        }
    }
}
