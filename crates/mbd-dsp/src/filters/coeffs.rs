// SPDX-License-Identifier: LGPL-3.0-or-later

//! Biquad coefficient calculation using the RBJ Audio EQ Cookbook.
//!
//! Coefficient calculation is a pure function of the filter parameters,
//! separate from the stateful [`Filter`](super::filter::Filter), so it can
//! be unit-tested without touching live audio state.
//!
//! The `a1`/`a2` coefficients are **pre-negated** relative to the standard
//! cookbook formulas: the processing loop accumulates with addition
//! (`p1 = b1*x + a1*y`), so the sign flip is baked in here.

use std::f32::consts::PI;

/// Supported biquad filter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    /// Bypass (identity): passes signal unchanged.
    Off,
    /// Second-order low-pass filter.
    Lowpass,
    /// Second-order high-pass filter.
    Highpass,
    /// All-pass filter (phase shift only).
    Allpass,
}

/// Normalized biquad coefficients (a0 divided out, a1/a2 pre-negated).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl Default for BiquadCoeffs {
    /// Identity coefficients (pass-through).
    fn default() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }
}

/// Calculate biquad coefficients for the given filter type.
///
/// # Parameters
///
/// - `filter_type` -- type of filter to compute
/// - `sample_rate` -- sample rate in Hz (must be > 0)
/// - `freq` -- center or cutoff frequency in Hz
/// - `q` -- quality factor (must be > 0)
pub fn calc_biquad_coeffs(filter_type: FilterType, sample_rate: f32, freq: f32, q: f32) -> BiquadCoeffs {
    if filter_type == FilterType::Off {
        return BiquadCoeffs::default();
    }

    let w0 = 2.0 * PI * freq / sample_rate;
    let cos_w0 = w0.cos();
    let sin_w0 = w0.sin();
    let alpha = sin_w0 / (2.0 * q);

    let (b0, b1, b2, a0, a1_std, a2_std) = match filter_type {
        FilterType::Off => unreachable!(),

        FilterType::Lowpass => {
            let b1 = 1.0 - cos_w0;
            let b0 = b1 / 2.0;
            let b2 = b0;
            (b0, b1, b2, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
        }

        FilterType::Highpass => {
            let b1 = -(1.0 + cos_w0);
            let b0 = (1.0 + cos_w0) / 2.0;
            let b2 = b0;
            (b0, b1, b2, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
        }

        FilterType::Allpass => {
            let b0 = 1.0 - alpha;
            let b1 = -2.0 * cos_w0;
            let b2 = 1.0 + alpha;
            (b0, b1, b2, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
        }
    };

    let inv_a0 = 1.0 / a0;

    BiquadCoeffs {
        b0: b0 * inv_a0,
        b1: b1 * inv_a0,
        b2: b2 * inv_a0,
        // Pre-negated for the additive processing loop
        a1: -a1_std * inv_a0,
        a2: -a2_std * inv_a0,
    }
}
