// SPDX-License-Identifier: LGPL-3.0-or-later

//! Top-level bypass: a ramped dry/wet crossfade.
//!
//! The whole stage is bypassed by fading between the processed signal
//! and a dry copy of the input over a short ramp, never by switching
//! buffers. Once the fade has fully landed on dry, the caller can skip
//! the band split entirely and only pay for the copy.

use mbd_dsp::units::seconds_to_samples;

/// Crossfades between processed and dry signal.
#[derive(Debug, Clone)]
pub struct Bypass {
    /// 0 = effect fully engaged, 1 = fully bypassed.
    gain: f32,
    /// Per-sample gain change while ramping; sign follows the target.
    delta: f32,
    step: f32,
    target_on: bool,
}

impl Default for Bypass {
    fn default() -> Self {
        Self::new()
    }
}

impl Bypass {
    pub fn new() -> Self {
        Self {
            gain: 0.0,
            delta: 0.0,
            step: 0.0,
            target_on: false,
        }
    }

    /// Set the ramp time. Any fade in progress keeps its position but
    /// adopts the new rate.
    pub fn init(&mut self, sample_rate: f32, ramp_seconds: f32) {
        let length = seconds_to_samples(sample_rate, ramp_seconds).max(1.0);
        self.step = 1.0 / length;
        self.delta = if self.target_on { self.step } else { -self.step };
    }

    /// Request bypass on or off. Returns true if the target changed.
    pub fn set_bypass(&mut self, on: bool) -> bool {
        if on == self.target_on {
            return false;
        }
        self.target_on = on;
        self.delta = if on { self.step } else { -self.step };
        true
    }

    /// Fully bypassed, fade complete.
    pub fn on(&self) -> bool {
        self.target_on && self.gain >= 1.0
    }

    /// Fully engaged, fade complete.
    pub fn off(&self) -> bool {
        !self.target_on && self.gain <= 0.0
    }

    /// A fade is in progress.
    pub fn active(&self) -> bool {
        !self.on() && !self.off()
    }

    /// Snap to the target position, cancelling any fade.
    pub fn reset(&mut self) {
        self.gain = if self.target_on { 1.0 } else { 0.0 };
    }

    /// Crossfade `dst` (holding the processed signal) toward `dry`.
    pub fn process(&mut self, dst: &mut [f32], dry: &[f32]) {
        if self.off() {
            return;
        }
        if self.on() {
            dst.copy_from_slice(&dry[..dst.len()]);
            return;
        }
        for (d, &x) in dst.iter_mut().zip(dry.iter()) {
            self.gain = (self.gain + self.delta).clamp(0.0, 1.0);
            // Additive stepping leaves rounding residue at the rails;
            // within half a step of either end the fade has landed.
            if self.gain <= 0.5 * self.step {
                self.gain = 0.0;
            } else if self.gain >= 1.0 - 0.5 * self.step {
                self.gain = 1.0;
            }
            *d = *d * (1.0 - self.gain) + x * self.gain;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    #[test]
    fn disengaged_bypass_leaves_signal_untouched() {
        let mut b = Bypass::new();
        b.init(SR, 0.01);

        let dry = vec![1.0f32; 64];
        let mut wet = vec![0.5f32; 64];
        b.process(&mut wet, &dry);
        assert!(wet.iter().all(|&s| s == 0.5));
        assert!(b.off());
    }

    #[test]
    fn engaged_bypass_outputs_dry() {
        let mut b = Bypass::new();
        b.init(SR, 0.01);
        b.set_bypass(true);

        // Run past the ramp
        let dry = vec![1.0f32; 1024];
        let mut wet = vec![0.0f32; 1024];
        b.process(&mut wet, &dry);
        assert!(b.on(), "10 ms ramp must complete within 1024 samples at 48 kHz");

        let mut wet = vec![0.25f32; 64];
        b.process(&mut wet, &dry[..64]);
        assert!(wet.iter().all(|&s| s == 1.0), "fully bypassed output must equal dry");
    }

    #[test]
    fn fade_is_monotonic_and_bounded() {
        let mut b = Bypass::new();
        b.init(SR, 0.01);
        b.set_bypass(true);

        let dry = vec![1.0f32; 480];
        let mut wet = vec![0.0f32; 480];
        b.process(&mut wet, &dry);

        let mut prev = 0.0;
        for (i, &s) in wet.iter().enumerate() {
            assert!(s >= prev - 1e-6, "fade must be monotonic at {i}: {prev} -> {s}");
            assert!((0.0..=1.0).contains(&s));
            prev = s;
        }
        // 10 ms at 48 kHz is exactly 480 samples
        assert!((wet[479] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn set_bypass_reports_changes_only() {
        let mut b = Bypass::new();
        b.init(SR, 0.01);
        assert!(b.set_bypass(true));
        assert!(!b.set_bypass(true));
        assert!(b.set_bypass(false));
    }

    #[test]
    fn repeated_partial_fades_land_exactly() {
        let mut b = Bypass::new();
        b.init(SR, 0.01);

        // Odd-length blocks never divide the ramp evenly, so any rounding
        // residue in the gain accumulator would pile up across cycles.
        let dry = vec![1.0f32; 37];
        for _ in 0..50 {
            b.set_bypass(true);
            let mut wet = vec![0.0f32; 37];
            b.process(&mut wet, &dry);
            b.set_bypass(false);
            let mut wet = vec![0.0f32; 37];
            b.process(&mut wet, &dry);
        }
        assert!(b.off(), "symmetric up/down fades must return to fully engaged");
    }

    #[test]
    fn fade_reverses_mid_ramp_without_jump() {
        let mut b = Bypass::new();
        b.init(SR, 0.01);
        b.set_bypass(true);

        let dry = vec![1.0f32; 240];
        let mut wet = vec![0.0f32; 240];
        b.process(&mut wet, &dry);
        let mid = wet[239];
        assert!(mid > 0.4 && mid < 0.6, "halfway through the ramp, got {mid}");

        b.set_bypass(false);
        let mut wet2 = vec![0.0f32; 240];
        b.process(&mut wet2, &dry);
        assert!(
            (wet2[0] - mid).abs() < 0.01,
            "reversal must continue from {mid}, got {}",
            wet2[0]
        );
        assert!(b.off(), "fade back must complete in the same number of samples");
    }
}
