// SPDX-License-Identifier: LGPL-3.0-or-later

//! Stateful biquad filter with click-free parameter updates.

use crate::consts::{FREQ_EPSILON, FREQ_MAX_FRACTION, FREQ_MIN};
use crate::filters::coeffs::{calc_biquad_coeffs, BiquadCoeffs, FilterType};

/// Biquad processing state: coefficients plus the two delay elements of
/// the transposed direct-form II topology.
///
/// Updating `coeffs` while leaving `d` untouched is the click-free
/// parameter-change path: the delay state carries over and the output
/// glides to the new response within a couple of samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct Biquad {
    pub coeffs: BiquadCoeffs,
    d: [f32; 2],
}

impl Biquad {
    /// Zero the delay elements without touching the coefficients.
    pub fn clear(&mut self) {
        self.d = [0.0; 2];
    }

    /// Process one sample through the transposed direct-form II structure.
    #[inline]
    pub fn process_single(&mut self, s: f32) -> f32 {
        let c = &self.coeffs;
        let s2 = c.b0 * s + self.d[0];
        let p1 = c.b1 * s + c.a1 * s2;
        let p2 = c.b2 * s + c.a2 * s2;
        self.d[0] = self.d[1] + p1;
        self.d[1] = p2;
        s2
    }

    /// Process a buffer in place.
    pub fn process_inplace(&mut self, buf: &mut [f32]) {
        for s in buf.iter_mut() {
            *s = self.process_single(*s);
        }
    }
}

/// A single configurable biquad filter.
///
/// Setters mark the filter dirty; coefficients are recomputed lazily in
/// [`update_settings`](Filter::update_settings), which processing calls
/// before touching samples. Recomputing never resets the delay state, so
/// parameter changes during playback stay click-free.
#[derive(Debug, Clone)]
pub struct Filter {
    filter_type: FilterType,
    sample_rate: f32,
    frequency: f32,
    q: f32,
    dirty: bool,
    biquad: Biquad,
}

impl Default for Filter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter {
    pub fn new() -> Self {
        Self {
            filter_type: FilterType::Off,
            sample_rate: 48000.0,
            frequency: 1000.0,
            q: std::f32::consts::FRAC_1_SQRT_2,
            dirty: true,
            biquad: Biquad::default(),
        }
    }

    pub fn set_filter_type(&mut self, filter_type: FilterType) -> &mut Self {
        if filter_type != self.filter_type {
            self.filter_type = filter_type;
            self.dirty = true;
        }
        self
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) -> &mut Self {
        if sample_rate != self.sample_rate {
            self.sample_rate = sample_rate;
            self.dirty = true;
        }
        self
    }

    /// Set the cutoff/center frequency in Hz.
    ///
    /// The value is clamped to `[FREQ_MIN, FREQ_MAX_FRACTION * sr]`.
    /// Changes smaller than [`FREQ_EPSILON`] are ignored so per-block
    /// smoothed frequency values do not trigger a recompute every block.
    pub fn set_frequency(&mut self, frequency: f32) -> &mut Self {
        let frequency = frequency.clamp(FREQ_MIN, FREQ_MAX_FRACTION * self.sample_rate);
        if (frequency - self.frequency).abs() > FREQ_EPSILON {
            self.frequency = frequency;
            self.dirty = true;
        }
        self
    }

    pub fn set_q(&mut self, q: f32) -> &mut Self {
        if q != self.q {
            self.q = q;
            self.dirty = true;
        }
        self
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Recompute coefficients if any parameter changed since the last call.
    ///
    /// Delay state is preserved.
    pub fn update_settings(&mut self) {
        if !self.dirty {
            return;
        }
        self.biquad.coeffs =
            calc_biquad_coeffs(self.filter_type, self.sample_rate, self.frequency, self.q);
        self.dirty = false;
    }

    /// Reset processing state. Parameters and coefficients are kept.
    pub fn clear(&mut self) {
        self.biquad.clear();
    }

    /// Process a buffer in place, recomputing coefficients first if needed.
    pub fn process_inplace(&mut self, buf: &mut [f32]) {
        self.update_settings();
        self.biquad.process_inplace(buf);
    }

    /// Process a single sample, recomputing coefficients first if needed.
    #[inline]
    pub fn process_single(&mut self, s: f32) -> f32 {
        self.update_settings();
        self.biquad.process_single(s)
    }

    /// Complex frequency response at `freq` Hz as (magnitude, phase).
    pub fn freq_response(&self, freq: f32) -> (f32, f32) {
        let c = calc_biquad_coeffs(self.filter_type, self.sample_rate, self.frequency, self.q);
        let w = 2.0 * std::f32::consts::PI * freq / self.sample_rate;
        let (cos_w, sin_w) = (w.cos(), w.sin());
        let (cos_2w, sin_2w) = ((2.0 * w).cos(), (2.0 * w).sin());

        let num_re = c.b0 + c.b1 * cos_w + c.b2 * cos_2w;
        let num_im = -c.b1 * sin_w - c.b2 * sin_2w;
        let den_re = 1.0 - c.a1 * cos_w - c.a2 * cos_2w;
        let den_im = c.a1 * sin_w + c.a2 * sin_2w;

        let den_sq = den_re * den_re + den_im * den_im;
        let re = (num_re * den_re + num_im * den_im) / den_sq;
        let im = (num_im * den_re - num_re * den_im) / den_sq;

        ((re * re + im * im).sqrt(), im.atan2(re))
    }
}
