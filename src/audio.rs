//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed!
//! Playback is fire-and-forget: the simulation only raises `SoundEffect`s.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Two tiles start trading places
    Swap,
    /// Swap made no match and slides back
    Revert,
    /// Matched tiles pop ("eat")
    Pop,
    /// No moves left
    GameOver,
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::SoundEffect;

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl AudioManager {
        pub fn new(volume: f32) -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: volume.clamp(0.0, 1.0),
            }
        }

        /// Resume audio context (browsers keep it suspended until a user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.volume;
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Swap => self.play_swap(ctx, vol),
                SoundEffect::Revert => self.play_revert(ctx, vol),
                SoundEffect::Pop => self.play_pop(ctx, vol),
                SoundEffect::GameOver => self.play_game_over(ctx, vol),
            }
        }

        // === Sound generators ===

        /// One oscillator voice routed through its own gain stage
        fn voice(
            &self,
            ctx: &AudioContext,
            wave: OscillatorType,
            freq: f32,
        ) -> Option<(OscillatorNode, GainNode)> {
            let gain = ctx.create_gain().ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;
            let osc = ctx.create_oscillator().ok()?;
            osc.set_type(wave);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            Some((osc, gain))
        }

        /// Swap - soft wooden tap
        fn play_swap(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.voice(ctx, OscillatorType::Triangle, 320.0) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.25, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.06)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.08).ok();
        }

        /// Revert - short falling buzz
        fn play_revert(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.voice(ctx, OscillatorType::Square, 220.0) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                .ok();
            osc.frequency().set_value_at_time(220.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(110.0, t + 0.15)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.18).ok();
        }

        /// Pop - bubbly upward chirp with a click on top
        fn play_pop(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((osc, gain)) = self.voice(ctx, OscillatorType::Sine, 300.0) {
                gain.gain().set_value_at_time(vol * 0.4, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                    .ok();
                osc.frequency().set_value_at_time(300.0, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(900.0, t + 0.08)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.15).ok();
            }

            if let Some((osc, gain)) = self.voice(ctx, OscillatorType::Triangle, 1800.0) {
                gain.gain().set_value_at_time(vol * 0.1, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.03)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.05).ok();
            }
        }

        /// Game over - minor arpeggio falling to a held low note
        fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
            const NOTES: [(f32, f64); 4] = [(523.3, 0.12), (415.3, 0.12), (349.2, 0.12), (261.6, 0.6)];
            let mut t = ctx.current_time();
            for (freq, len) in NOTES {
                if let Some((osc, gain)) = self.voice(ctx, OscillatorType::Triangle, freq) {
                    gain.gain().set_value_at_time(0.0, t).ok();
                    gain.gain().linear_ramp_to_value_at_time(vol * 0.35, t + 0.02).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + len)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + len + 0.05).ok();
                }
                t += len * 0.9;
            }
        }
    }
}
