// SPDX-License-Identifier: LGPL-3.0-or-later

//! Gain and frequency constants shared across the DSP units.

/// -6 dB amplitude gain (~0.5)
pub const GAIN_AMP_M_6_DB: f32 = 0.501_187_2;

/// -72 dB amplitude gain, used as a floor for envelope/log math
pub const GAIN_AMP_M_72_DB: f32 = 2.511_886_5e-4;

/// Lowest cutoff frequency accepted by the filter units (Hz).
pub const FREQ_MIN: f32 = 10.0;

/// Fraction of the sample rate used as the upper cutoff bound.
///
/// Keeping cutoffs below 0.45 * sr avoids severe bilinear-transform
/// warping close to Nyquist.
pub const FREQ_MAX_FRACTION: f32 = 0.45;

/// Cutoff change (Hz) below which coefficients are not recomputed.
pub const FREQ_EPSILON: f32 = 1e-2;
