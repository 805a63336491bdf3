// SPDX-License-Identifier: LGPL-3.0-or-later

//! Linkwitz-Riley crossover network for phase-coherent band splitting.
//!
//! Each split point is a 4th-order Linkwitz-Riley (LR4) pair: two cascaded
//! 2nd-order Butterworth sections per path, -6 dB at the cutoff, and a
//! magnitude-flat sum. In the 3-band configuration the low band runs
//! through a 2nd-order allpass at the upper cutoff so its phase matches
//! the mid/high paths and the bands still sum flat.

use std::f32::consts::FRAC_1_SQRT_2;

use crate::consts::{FREQ_MAX_FRACTION, FREQ_MIN};
use crate::filters::coeffs::FilterType;
use crate::filters::filter::Filter;

/// Maximum number of output bands.
pub const MAX_BANDS: usize = 3;

/// Successive split frequencies are kept at least this factor apart, so
/// user controls can never drive them across each other.
pub const MIN_SPLIT_RATIO: f32 = 1.02;

/// Role of one stage in a band's filter chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// LR4 low-pass: two cascaded Butterworth low-pass sections.
    Lowpass,
    /// LR4 high-pass: two cascaded Butterworth high-pass sections.
    Highpass,
    /// 2nd-order allpass for phase compensation, single section.
    ///
    /// The magnitude-flat sum of an LR4 pair equals a 2nd-order allpass
    /// at the crossover frequency, so one section is exactly what the
    /// low band needs to stay aligned with the upper split.
    Allpass,
}

/// One stage of a band chain: up to two biquad sections at a shared cutoff.
#[derive(Debug, Clone)]
struct CrossoverStage {
    kind: StageKind,
    sections: [Filter; 2],
}

impl CrossoverStage {
    fn new(kind: StageKind, sample_rate: f32, frequency: f32) -> Self {
        let filter_type = match kind {
            StageKind::Lowpass => FilterType::Lowpass,
            StageKind::Highpass => FilterType::Highpass,
            StageKind::Allpass => FilterType::Allpass,
        };
        let mut sections = [Filter::new(), Filter::new()];
        for s in sections.iter_mut() {
            s.set_filter_type(filter_type)
                .set_sample_rate(sample_rate)
                .set_frequency(frequency)
                .set_q(FRAC_1_SQRT_2);
        }
        Self { kind, sections }
    }

    fn active_sections(&self) -> usize {
        match self.kind {
            StageKind::Allpass => 1,
            _ => 2,
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        for s in self.sections.iter_mut() {
            s.set_sample_rate(sample_rate);
        }
    }

    fn set_frequency(&mut self, frequency: f32) {
        for s in self.sections.iter_mut() {
            s.set_frequency(frequency);
        }
    }

    fn clear(&mut self) {
        for s in self.sections.iter_mut() {
            s.clear();
        }
    }

    fn process_inplace(&mut self, buf: &mut [f32]) {
        let n = self.active_sections();
        for s in self.sections[..n].iter_mut() {
            s.process_inplace(buf);
        }
    }
}

/// Splits a signal into 2 or 3 phase-coherent frequency bands.
///
/// Band chains for the 3-band configuration, with split frequencies
/// `f1 < f2`:
///
/// | band | chain                  |
/// |------|------------------------|
/// | low  | LR4-LP(f1), AP(f2)     |
/// | mid  | LR4-HP(f1), LR4-LP(f2) |
/// | high | LR4-HP(f1), LR4-HP(f2) |
///
/// The 2-band configuration drops the second split: low = LR4-LP(f1),
/// high = LR4-HP(f1).
#[derive(Debug, Clone)]
pub struct CrossoverNetwork {
    num_bands: usize,
    sample_rate: f32,
    frequencies: [f32; MAX_BANDS - 1],
    chains: Vec<Vec<CrossoverStage>>,
}

impl CrossoverNetwork {
    /// Create a network with `num_bands` outputs (2 or 3, clamped).
    pub fn new(num_bands: usize, sample_rate: f32) -> Self {
        let num_bands = num_bands.clamp(2, MAX_BANDS);
        let frequencies = [400.0, 2000.0];

        let chains = match num_bands {
            2 => vec![
                vec![CrossoverStage::new(StageKind::Lowpass, sample_rate, frequencies[0])],
                vec![CrossoverStage::new(StageKind::Highpass, sample_rate, frequencies[0])],
            ],
            _ => vec![
                vec![
                    CrossoverStage::new(StageKind::Lowpass, sample_rate, frequencies[0]),
                    CrossoverStage::new(StageKind::Allpass, sample_rate, frequencies[1]),
                ],
                vec![
                    CrossoverStage::new(StageKind::Highpass, sample_rate, frequencies[0]),
                    CrossoverStage::new(StageKind::Lowpass, sample_rate, frequencies[1]),
                ],
                vec![
                    CrossoverStage::new(StageKind::Highpass, sample_rate, frequencies[0]),
                    CrossoverStage::new(StageKind::Highpass, sample_rate, frequencies[1]),
                ],
            ],
        };

        Self {
            num_bands,
            sample_rate,
            frequencies,
            chains,
        }
    }

    pub fn num_bands(&self) -> usize {
        self.num_bands
    }

    pub fn frequencies(&self) -> &[f32] {
        &self.frequencies[..self.num_bands - 1]
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        for chain in self.chains.iter_mut() {
            for stage in chain.iter_mut() {
                stage.set_sample_rate(sample_rate);
            }
        }
        // Re-apply so the upper clamp tracks the new rate
        let freqs = self.frequencies;
        self.set_frequencies(&freqs[..self.num_bands - 1]);
    }

    /// Set the split frequencies, lowest first.
    ///
    /// Each value is clamped into `[FREQ_MIN, FREQ_MAX_FRACTION * sr]` and
    /// forced at least [`MIN_SPLIT_RATIO`] above its predecessor, so the
    /// splits can never cross no matter what the caller hands in.
    pub fn set_frequencies(&mut self, frequencies: &[f32]) {
        let n = frequencies.len().min(self.num_bands - 1);
        let mut floor = FREQ_MIN;
        for i in 0..n {
            let f = frequencies[i]
                .max(floor)
                .clamp(FREQ_MIN, FREQ_MAX_FRACTION * self.sample_rate);
            self.frequencies[i] = f;
            floor = f * MIN_SPLIT_RATIO;
        }
        self.apply_frequencies();
    }

    fn apply_frequencies(&mut self) {
        match self.num_bands {
            2 => {
                let f1 = self.frequencies[0];
                self.chains[0][0].set_frequency(f1);
                self.chains[1][0].set_frequency(f1);
            }
            _ => {
                let (f1, f2) = (self.frequencies[0], self.frequencies[1]);
                self.chains[0][0].set_frequency(f1);
                self.chains[0][1].set_frequency(f2);
                self.chains[1][0].set_frequency(f1);
                self.chains[1][1].set_frequency(f2);
                self.chains[2][0].set_frequency(f1);
                self.chains[2][1].set_frequency(f2);
            }
        }
    }

    /// Reset all filter state. Frequencies and band count are kept.
    pub fn clear(&mut self) {
        for chain in self.chains.iter_mut() {
            for stage in chain.iter_mut() {
                stage.clear();
            }
        }
    }

    /// Extract one band of `input` into `out`.
    ///
    /// Bands are independent filter chains, so callers that know a band's
    /// output will be discarded (a muted band) can simply skip it.
    pub fn process_band(&mut self, band: usize, input: &[f32], out: &mut [f32]) {
        debug_assert!(band < self.num_bands);
        let out = &mut out[..input.len()];
        out.copy_from_slice(input);
        for stage in self.chains[band].iter_mut() {
            stage.process_inplace(out);
        }
    }

    /// Split `input` into per-band buffers.
    ///
    /// `outputs` must hold exactly `num_bands` buffers, each at least as
    /// long as `input`. Output buffers are overwritten.
    pub fn process(&mut self, input: &[f32], outputs: &mut [&mut [f32]]) {
        debug_assert_eq!(outputs.len(), self.num_bands);
        for (band, out) in outputs.iter_mut().enumerate() {
            let out = &mut out[..input.len()];
            out.copy_from_slice(input);
            for stage in self.chains[band].iter_mut() {
                stage.process_inplace(out);
            }
        }
    }
}
