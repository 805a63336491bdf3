// SPDX-License-Identifier: LGPL-3.0-or-later

//! Feed-forward compressor with independent attack/release ballistics.

use std::f32::consts::FRAC_1_SQRT_2;

use crate::consts::GAIN_AMP_M_72_DB;
use crate::units::{db_to_gain, millis_to_samples};

/// Minimum attack/release time in milliseconds.
const TIME_MIN_MS: f32 = 0.01;

/// Hard-knee feed-forward compressor.
///
/// The envelope follower tracks the rectified input with separate attack
/// and release coefficients. With release times well above the signal
/// period it behaves as a near-peak detector. Gain above threshold
/// follows the hard-knee law
///
/// ```text
/// gain = (T * (env / T)^(1/ratio)) / env
/// ```
///
/// which maps an input level of `L` dB to `T + (L - T) / ratio` dB out.
#[derive(Debug, Clone)]
pub struct Compressor {
    sample_rate: f32,
    threshold_db: f32,
    attack_ms: f32,
    release_ms: f32,
    ratio: f32,
    dirty: bool,

    // Derived on update_settings
    threshold: f32,
    tau_attack: f32,
    tau_release: f32,

    envelope: f32,
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compressor {
    pub fn new() -> Self {
        Self {
            sample_rate: 48000.0,
            threshold_db: 0.0,
            attack_ms: 50.0,
            release_ms: 250.0,
            ratio: 1.0,
            dirty: true,
            threshold: 1.0,
            tau_attack: 0.0,
            tau_release: 0.0,
            envelope: 0.0,
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) -> &mut Self {
        if sample_rate != self.sample_rate {
            self.sample_rate = sample_rate;
            self.dirty = true;
        }
        self
    }

    /// Set the threshold in dBFS.
    pub fn set_threshold(&mut self, threshold_db: f32) -> &mut Self {
        if threshold_db != self.threshold_db {
            self.threshold_db = threshold_db;
            self.dirty = true;
        }
        self
    }

    /// Set the attack time in milliseconds, floored to a small positive value.
    pub fn set_attack(&mut self, attack_ms: f32) -> &mut Self {
        let attack_ms = attack_ms.max(TIME_MIN_MS);
        if attack_ms != self.attack_ms {
            self.attack_ms = attack_ms;
            self.dirty = true;
        }
        self
    }

    /// Set the release time in milliseconds, floored to a small positive value.
    pub fn set_release(&mut self, release_ms: f32) -> &mut Self {
        let release_ms = release_ms.max(TIME_MIN_MS);
        if release_ms != self.release_ms {
            self.release_ms = release_ms;
            self.dirty = true;
        }
        self
    }

    /// Set the compression ratio, floored to 1 (no compression).
    pub fn set_ratio(&mut self, ratio: f32) -> &mut Self {
        let ratio = ratio.max(1.0);
        if ratio != self.ratio {
            self.ratio = ratio;
            self.dirty = true;
        }
        self
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    pub fn threshold(&self) -> f32 {
        self.threshold_db
    }

    /// Current envelope follower value (linear amplitude).
    pub fn envelope(&self) -> f32 {
        self.envelope
    }

    /// The envelope reaches 1/sqrt(2) of a step after `samples` samples.
    fn calculate_tau(&self, time_ms: f32) -> f32 {
        let samples = millis_to_samples(self.sample_rate, time_ms).max(1.0);
        1.0 - ((1.0 - FRAC_1_SQRT_2).ln() / samples).exp()
    }

    /// Recompute derived coefficients if any parameter changed.
    pub fn update_settings(&mut self) {
        if !self.dirty {
            return;
        }
        self.threshold = db_to_gain(self.threshold_db);
        self.tau_attack = self.calculate_tau(self.attack_ms);
        self.tau_release = self.calculate_tau(self.release_ms);
        self.dirty = false;
    }

    /// Reset the envelope follower. Parameters are kept.
    pub fn clear(&mut self) {
        self.envelope = 0.0;
    }

    /// Gain for the current envelope value.
    #[inline]
    fn gain(&self) -> f32 {
        if self.envelope <= self.threshold || self.envelope < GAIN_AMP_M_72_DB {
            return 1.0;
        }
        let t = self.threshold;
        t * (self.envelope / t).powf(1.0 / self.ratio) / self.envelope
    }

    /// Process one sample.
    #[inline]
    pub fn process_single(&mut self, s: f32) -> f32 {
        let d = s.abs() - self.envelope;
        let tau = if d > 0.0 { self.tau_attack } else { self.tau_release };
        self.envelope += tau * d;
        s * self.gain()
    }

    /// Process a buffer in place, recomputing coefficients first if needed.
    pub fn process_inplace(&mut self, buf: &mut [f32]) {
        self.update_settings();
        for s in buf.iter_mut() {
            *s = self.process_single(*s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{db_to_gain, gain_to_db};
    use std::f32::consts::PI;

    const SR: f32 = 48000.0;

    fn sine(freq: f32, amp: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| amp * (2.0 * PI * freq * i as f32 / SR).sin())
            .collect()
    }

    fn peak(buf: &[f32]) -> f32 {
        buf.iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }

    #[test]
    fn unity_below_threshold() {
        let mut c = Compressor::new();
        c.set_sample_rate(SR).set_threshold(0.0).set_ratio(4.0);

        let input = sine(440.0, 0.1, 4096);
        let mut buf = input.clone();
        c.process_inplace(&mut buf);
        assert_eq!(buf, input, "signal below threshold must pass unchanged");
    }

    #[test]
    fn ratio_one_is_transparent() {
        let mut c = Compressor::new();
        c.set_sample_rate(SR).set_threshold(-40.0).set_ratio(1.0);

        let input = sine(440.0, 0.9, 4096);
        let mut buf = input.clone();
        c.process_inplace(&mut buf);
        for (i, (a, b)) in buf.iter().zip(input.iter()).enumerate() {
            assert!((a - b).abs() < 1e-5, "sample {i}: {a} vs {b}");
        }
    }

    #[test]
    fn steady_state_level_follows_hard_knee_law() {
        // -10 dBFS sine, threshold -20 dB, ratio 4: output settles at
        // -20 + 10/4 = -17.5 dBFS. Release is kept well above attack so
        // the follower reads the tone's peak, not some inter-cycle average.
        let mut c = Compressor::new();
        c.set_sample_rate(SR)
            .set_threshold(-20.0)
            .set_attack(5.0)
            .set_release(500.0)
            .set_ratio(4.0);

        let mut buf = sine(1000.0, db_to_gain(-10.0), 2 * SR as usize);
        c.process_inplace(&mut buf);

        let out_db = gain_to_db(peak(&buf[buf.len() - 4800..]));
        assert!(
            (out_db - -17.5).abs() < 0.5,
            "settled level should be -17.5 dBFS, got {out_db}"
        );
    }

    #[test]
    fn envelope_attack_time_constant() {
        let mut c = Compressor::new();
        c.set_sample_rate(SR)
            .set_threshold(24.0)
            .set_attack(10.0)
            .set_release(500.0)
            .set_ratio(1.0);
        c.update_settings();

        // Unit step: after exactly the attack time the envelope must sit
        // at 1/sqrt(2) of the step height.
        let attack_samples = (SR * 0.010) as usize;
        for _ in 0..attack_samples {
            c.process_single(1.0);
        }
        let env = c.envelope();
        assert!(
            (env - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.01,
            "envelope after one attack period should be ~0.707, got {env}"
        );
    }

    #[test]
    fn envelope_releases_toward_zero() {
        let mut c = Compressor::new();
        c.set_sample_rate(SR)
            .set_attack(1.0)
            .set_release(10.0)
            .set_ratio(1.0);
        c.update_settings();

        for _ in 0..2000 {
            c.process_single(1.0);
        }
        let high = c.envelope();
        for _ in 0..(SR * 0.2) as usize {
            c.process_single(0.0);
        }
        let low = c.envelope();
        assert!(high > 0.9, "envelope should charge near 1.0, got {high}");
        assert!(low < 1e-3, "envelope should discharge toward zero, got {low}");
    }

    #[test]
    fn zero_input_is_stable() {
        let mut c = Compressor::new();
        c.set_sample_rate(SR)
            .set_threshold(-60.0)
            .set_ratio(100.0);

        let mut buf = vec![0.0f32; 10 * SR as usize];
        c.process_inplace(&mut buf);
        assert!(buf.iter().all(|s| *s == 0.0), "zero input must produce zero output");
        assert_eq!(c.envelope(), 0.0);
    }

    #[test]
    fn clear_resets_envelope_not_params() {
        let mut c = Compressor::new();
        c.set_sample_rate(SR).set_threshold(-10.0).set_ratio(4.0);

        let mut buf = sine(440.0, 1.0, 4096);
        c.process_inplace(&mut buf);
        assert!(c.envelope() > 0.0);

        c.clear();
        assert_eq!(c.envelope(), 0.0);
        assert_eq!(c.ratio(), 4.0);
        assert_eq!(c.threshold(), -10.0);
    }

    #[test]
    fn ratio_and_times_are_sanitized() {
        let mut c = Compressor::new();
        c.set_ratio(0.25);
        assert_eq!(c.ratio(), 1.0, "ratio below 1 must clamp to 1");
        c.set_attack(-5.0).set_release(0.0);
        c.update_settings();
        // Negative or zero times must not produce NaN coefficients
        let out = c.process_single(0.5);
        assert!(out.is_finite());
    }

    #[test]
    fn higher_ratio_compresses_more() {
        let run = |ratio: f32| -> f32 {
            let mut c = Compressor::new();
            c.set_sample_rate(SR)
                .set_threshold(-20.0)
                .set_attack(10.0)
                .set_release(100.0)
                .set_ratio(ratio);
            let mut buf = sine(1000.0, 1.0, SR as usize);
            c.process_inplace(&mut buf);
            peak(&buf[buf.len() - 4800..])
        };

        let r2 = run(2.0);
        let r10 = run(10.0);
        assert!(r10 < r2, "ratio 10 ({r10}) should give lower output than ratio 2 ({r2})");
    }
}
