//! Audio system using Web Audio API
//!
//! Sound effects are synthesized; only the background music is a file.

use web_sys::{AudioContext, GainNode, HtmlAudioElement, OscillatorNode, OscillatorType};

use crate::effects::SoundEffect;
use crate::settings::Settings;

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    music: Option<HtmlAudioElement>,
    /// Master and effect volumes combined
    sfx_volume: f32,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            music: None,
            sfx_volume: settings.effective_sfx_volume(),
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Start a music track. `volume` already includes the master volume.
    pub fn play_music(&mut self, src: &str, volume: f32, looped: bool) {
        self.stop_music();
        let Ok(music) = HtmlAudioElement::new_with_src(src) else {
            log::warn!("Could not create audio element for {}", src);
            return;
        };
        music.set_loop(looped);
        music.set_volume(volume.clamp(0.0, 1.0) as f64);
        if let Err(e) = music.play() {
            log::warn!("Music playback refused: {:?}", e);
        }
        self.music = Some(music);
    }

    fn stop_music(&mut self) {
        if let Some(music) = self.music.take() {
            let _ = music.pause();
        }
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.sfx_volume;
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::Launch => self.play_launch(ctx, vol),
            SoundEffect::Miss => self.play_miss(ctx, vol),
            SoundEffect::Bullseye => self.play_bullseye(ctx, vol),
            SoundEffect::Rejected => self.play_rejected(ctx, vol),
            SoundEffect::HeartHit => self.play_heart_hit(ctx, vol),
            SoundEffect::Escalate => self.play_escalate(ctx, vol),
            SoundEffect::Lovestruck => self.play_lovestruck(ctx, vol),
            SoundEffect::TimeUp => self.play_time_up(ctx, vol),
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

    /// Short notes one after another
    fn arpeggio(&self, ctx: &AudioContext, vol: f32, notes: &[f32], spacing: f64, osc_type: OscillatorType) {
        for (i, freq) in notes.iter().enumerate() {
            let delay = i as f64 * spacing;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, osc_type) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + spacing * 3.0)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + spacing * 4.0).ok();
            }
        }
    }

    /// Bow release - quick whoosh up
    fn play_launch(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 200.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.2)
            .ok();
        osc.frequency().set_value_at_time(200.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(600.0, t + 0.15)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.25).ok();
    }

    /// Arrow flew off screen - falling whistle
    fn play_miss(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 700.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.2, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.35)
            .ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(250.0, t + 0.35)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.4).ok();
    }

    /// YES hit - thunk then a bright chord
    fn play_bullseye(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();
        if let Some((osc, gain)) = self.create_osc(ctx, 120.0, OscillatorType::Sine) {
            gain.gain().set_value_at_time(vol * 0.5, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }
        self.arpeggio(ctx, vol, &[523.0, 659.0, 784.0, 1047.0], 0.08, OscillatorType::Triangle);
    }

    /// NO hit - two low buzzes
    fn play_rejected(&self, ctx: &AudioContext, vol: f32) {
        self.arpeggio(ctx, vol * 0.8, &[220.0, 165.0], 0.15, OscillatorType::Square);
    }

    /// Heart caught - soft blip
    fn play_heart_hit(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 880.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.1)
            .ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(1320.0, t + 0.05)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.12).ok();
    }

    /// Spawn rate doubled - rising siren
    fn play_escalate(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 300.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.15, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.5)
            .ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(900.0, t + 0.45)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.5).ok();
    }

    /// Fifteen hearts - celebratory run
    fn play_lovestruck(&self, ctx: &AudioContext, vol: f32) {
        self.arpeggio(
            ctx,
            vol,
            &[500.0, 600.0, 700.0, 800.0, 1000.0],
            0.08,
            OscillatorType::Triangle,
        );
    }

    /// Clock ran out - sad descending
    fn play_time_up(&self, ctx: &AudioContext, vol: f32) {
        self.arpeggio(ctx, vol, &[400.0, 350.0, 300.0, 200.0], 0.2, OscillatorType::Sine);
    }
}
