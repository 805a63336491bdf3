// SPDX-License-Identifier: LGPL-3.0-or-later

//! Unit conversion functions: time/sample counts and dB/linear gain.

/// Convert milliseconds to a sample count.
#[inline]
pub fn millis_to_samples(sr: f32, time_ms: f32) -> f32 {
    time_ms * sr / 1000.0
}

/// Convert seconds to a sample count.
#[inline]
pub fn seconds_to_samples(sr: f32, time: f32) -> f32 {
    time * sr
}

/// Convert decibels to linear gain (amplitude ratio).
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    (db * (std::f32::consts::LN_10 / 20.0)).exp()
}

/// Convert linear gain (amplitude ratio) to decibels.
///
/// Returns negative infinity for zero or negative gain.
#[inline]
pub fn gain_to_db(gain: f32) -> f32 {
    if gain > 0.0 {
        gain.ln() * (20.0 / std::f32::consts::LN_10)
    } else {
        f32::NEG_INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_to_samples_known_values() {
        assert_eq!(millis_to_samples(48000.0, 10.0), 480.0);
        assert_eq!(millis_to_samples(44100.0, 1000.0), 44100.0);
    }

    #[test]
    fn seconds_to_samples_basic() {
        assert_eq!(seconds_to_samples(44100.0, 2.0), 88200.0);
    }

    #[test]
    fn db_gain_known_values() {
        assert!((db_to_gain(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_gain(-6.0) - 0.501_187_2).abs() < 1e-4);
        assert!((db_to_gain(20.0) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn gain_db_round_trip() {
        for &db in &[-60.0, -20.0, -6.0, 0.0, 6.0, 24.0] {
            let back = gain_to_db(db_to_gain(db));
            assert!(
                (back - db).abs() < 1e-3,
                "round trip failed for {db} dB: got {back}"
            );
        }
    }

    #[test]
    fn gain_to_db_zero_is_neg_infinity() {
        assert_eq!(gain_to_db(0.0), f32::NEG_INFINITY);
        assert_eq!(gain_to_db(-1.0), f32::NEG_INFINITY);
    }
}
